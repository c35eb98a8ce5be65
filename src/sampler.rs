use rand::Rng;
use std::collections::HashSet;

use crate::error::SelectionError;
use crate::problem::{Difficulty, Mix, Pool, Problem};

/// Draw `mix` problems from `pool`, preferring problems whose slug is not in
/// `recent`.
///
/// Each difficulty is sampled on its own. When too few unseen problems are
/// left in a difficulty, that difficulty alone falls back to its full set, so
/// recency avoidance never makes a draw impossible. The combined draw is
/// shuffled once more so the output order says nothing about difficulty.
pub fn select_problems<R: Rng + ?Sized>(
    pool: &Pool,
    recent: &[String],
    mix: &Mix,
    rng: &mut R,
) -> Result<Vec<Problem>, SelectionError> {
    if pool.is_empty() {
        return Err(SelectionError::EmptyPool);
    }

    let recent: HashSet<&str> = recent.iter().map(String::as_str).collect();
    // Counts come from user input; a draw never holds more than the pool
    let mut picks = Vec::with_capacity(mix.total().min(pool.len()));

    for difficulty in Difficulty::ALL {
        let wanted = mix.count(difficulty);
        let candidates = candidates_for(pool, difficulty, &recent, wanted);

        if candidates.len() < wanted {
            return Err(SelectionError::InsufficientPool {
                difficulty,
                requested: wanted,
                available: candidates.len(),
            });
        }

        tracing::debug!(
            %difficulty,
            wanted,
            candidates = candidates.len(),
            "sampling stratum"
        );
        picks.extend(sample_unique(candidates, wanted, rng));
    }

    Ok(shuffle(picks, rng).into_iter().cloned().collect())
}

/// Unseen members of the stratum, or the whole stratum when the unseen ones
/// cannot cover `wanted`.
fn candidates_for<'a>(
    pool: &'a Pool,
    difficulty: Difficulty,
    recent: &HashSet<&str>,
    wanted: usize,
) -> Vec<&'a Problem> {
    let preferred: Vec<&Problem> = pool
        .stratum(difficulty)
        .filter(|p| !recent.contains(p.slug.as_str()))
        .collect();

    if preferred.len() >= wanted {
        return preferred;
    }

    tracing::debug!(%difficulty, "not enough unseen problems, falling back to full stratum");
    pool.stratum(difficulty).collect()
}

/// Fisher-Yates shuffle: walk from the back, swapping each slot with a
/// uniformly chosen slot at or before it.
pub fn shuffle<T, R: Rng + ?Sized>(mut items: Vec<T>, rng: &mut R) -> Vec<T> {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
    items
}

/// `k` distinct items drawn uniformly without replacement.
///
/// Callers check `k <= items.len()`; a larger `k` yields every item.
pub fn sample_unique<T, R: Rng + ?Sized>(items: Vec<T>, k: usize, rng: &mut R) -> Vec<T> {
    let mut shuffled = shuffle(items, rng);
    shuffled.truncate(k);
    shuffled
}
