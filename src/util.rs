/// Turns `two-sum-ii` into `Two Sum Ii`: dashes become spaces and every
/// character starting a word is upper-cased.
pub fn slug_to_title(slug: &str) -> String {
    let mut title = String::with_capacity(slug.len());
    let mut prev_is_word = false;

    for c in slug.chars() {
        let c = if c == '-' { ' ' } else { c };
        let is_word = c.is_ascii_alphanumeric() || c == '_';

        if is_word && !prev_is_word {
            title.push(c.to_ascii_uppercase());
        } else {
            title.push(c);
        }
        prev_is_word = is_word;
    }

    title
}

/// Renders a countdown as `MM:SS`. Minutes grow past two digits for long
/// sessions rather than rolling over into hours.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_to_title() {
        assert_eq!(slug_to_title("two-sum"), "Two Sum");
        assert_eq!(slug_to_title("lru-cache"), "Lru Cache");
        assert_eq!(slug_to_title("best-time-to-buy-and-sell-stock-ii"), "Best Time To Buy And Sell Stock Ii");
    }

    #[test]
    fn test_slug_to_title_digits_and_edges() {
        assert_eq!(slug_to_title("3sum"), "3sum");
        assert_eq!(slug_to_title("4sum-ii"), "4sum Ii");
        assert_eq!(slug_to_title(""), "");
        assert_eq!(slug_to_title("-a"), " A");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(3599), "59:59");
        assert_eq!(format_clock(6000), "100:00");
    }
}
