use rand::Rng;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use webbrowser::Browser;

use crate::{
    app::App,
    problem::Difficulty,
    session::ContestPhase,
    storage::StateStore,
    timer::Clock,
    util::format_clock,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

fn difficulty_color(difficulty: Difficulty) -> Color {
    match difficulty {
        Difficulty::Easy => Color::Green,
        Difficulty::Medium => Color::Yellow,
        Difficulty::Hard => Color::Red,
    }
}

fn legend(phase: ContestPhase) -> String {
    let open = if Browser::is_available() {
        " / (enter) open"
    } else {
        ""
    };
    match phase {
        ContestPhase::NotStarted => "(s)tart / (q)uit".to_string(),
        ContestPhase::InProgress | ContestPhase::TimeUp => format!(
            "(r)egenerate / (e)nd / (space) mark solved{open} / (q)uit"
        ),
    }
}

impl<S: StateStore + Clone, C: Clock, R: Rng> Widget for &App<S, C, R> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let contest = &self.contest;
        let phase = contest.phase();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(3), // timer
                Constraint::Min(1),    // problems
                Constraint::Length(1), // status
                Constraint::Length(1), // legend
            ])
            .split(area);

        let title = match &contest.pool().name {
            Some(name) => format!("Mock Contest: {name}"),
            None => "Mock Contest".to_string(),
        };

        let (clock_text, clock_style) = match phase {
            ContestPhase::NotStarted => (
                format!("{} min", self.duration_override.unwrap_or(contest.duration_minutes())),
                dim_style,
            ),
            ContestPhase::InProgress => (
                format_clock(contest.timer().remaining_secs()),
                bold_style.fg(Color::Cyan),
            ),
            ContestPhase::TimeUp => (format_clock(0), bold_style.fg(Color::Red)),
        };

        Paragraph::new(Span::styled(clock_text, clock_style))
            .block(Block::default().borders(Borders::ALL).title(title))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        let lines: Vec<Line> = if contest.problems().is_empty() {
            let hint = match phase {
                ContestPhase::NotStarted => "Press (s) to draw problems and start the clock",
                _ => "No problems drawn yet. Press (r) to draw",
            };
            vec![Line::from(Span::styled(hint, italic_style))]
        } else {
            contest
                .problems()
                .iter()
                .enumerate()
                .map(|(idx, entry)| {
                    let marker = if entry.solved { "[x] " } else { "[ ] " };
                    let mut title_style =
                        Style::default().fg(difficulty_color(entry.problem.difficulty));
                    if entry.solved {
                        title_style = title_style.add_modifier(Modifier::CROSSED_OUT | Modifier::DIM);
                    }
                    if idx == self.selected {
                        title_style = title_style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
                    }

                    Line::from(vec![
                        Span::styled(marker, bold_style),
                        Span::styled(entry.problem.title(), title_style),
                        Span::styled(format!("  {}", entry.problem.difficulty), dim_style),
                    ])
                })
                .collect()
        };

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(chunks[1], buf);

        if let Some(status) = &self.status {
            let style = if phase == ContestPhase::TimeUp {
                bold_style.fg(Color::Red)
            } else {
                Style::default().fg(Color::Yellow)
            };
            Paragraph::new(Span::styled(status.as_str(), style))
                .alignment(Alignment::Center)
                .render(chunks[2], buf);
        }

        Paragraph::new(Span::styled(legend(phase), italic_style)).render(chunks[3], buf);
    }
}
