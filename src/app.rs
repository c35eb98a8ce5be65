use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::Rng;

use crate::session::{Contest, ContestPhase};
use crate::storage::StateStore;
use crate::timer::{Clock, TimerState};

pub const TIMES_UP_MESSAGE: &str = "Time is up!";

/// What the terminal loop should do after a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    None,
    Quit,
    OpenUrl(String),
}

/// Interactive state around a [`Contest`]: the cursor and the status line
#[derive(Debug)]
pub struct App<S: StateStore + Clone, C: Clock, R: Rng> {
    pub contest: Contest<S, C, R>,
    pub selected: usize,
    pub status: Option<String>,
    /// Shown on the idle screen next to the start key
    pub duration_override: Option<u64>,
}

impl<S: StateStore + Clone, C: Clock, R: Rng> App<S, C, R> {
    pub fn new(contest: Contest<S, C, R>) -> Self {
        Self {
            contest,
            selected: 0,
            status: None,
            duration_override: None,
        }
    }

    pub fn with_duration_override(mut self, minutes: Option<u64>) -> Self {
        self.duration_override = minutes;
        self
    }

    /// Bring back a countdown from an earlier run
    pub fn restore(&mut self) {
        if let TimerState::Running { .. } = self.contest.restore() {
            self.status = Some("Resumed running contest. (r) draws a fresh problem list".to_string());
        }
    }

    /// Advance the countdown. Returns true on the tick the contest ran out of
    /// time.
    pub fn on_tick(&mut self) -> bool {
        if self.contest.phase() != ContestPhase::InProgress {
            return false;
        }

        let tick = self.contest.tick();
        if tick.expired {
            self.status = Some(TIMES_UP_MESSAGE.to_string());
        }
        tick.expired
    }

    pub fn on_key(&mut self, key: KeyEvent) -> AppAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppAction::Quit;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let last = self.contest.problems().len().saturating_sub(1);
                self.selected = (self.selected + 1).min(last);
            }
            KeyCode::Char(' ') => {
                self.contest.toggle_solved(self.selected);
            }
            KeyCode::Enter => {
                if let Some(entry) = self.contest.problems().get(self.selected) {
                    return AppAction::OpenUrl(entry.problem.url());
                }
            }
            KeyCode::Char('s') if self.contest.phase() == ContestPhase::NotStarted => {
                self.start();
            }
            KeyCode::Char('r') if self.contest.phase() != ContestPhase::NotStarted => {
                self.regenerate();
            }
            KeyCode::Char('e') if self.contest.phase() != ContestPhase::NotStarted => {
                self.contest.end();
                self.selected = 0;
                self.status = None;
            }
            _ => {}
        }

        AppAction::None
    }

    fn start(&mut self) {
        self.selected = 0;
        match self.contest.start(self.duration_override) {
            Ok(_) => self.status = None,
            Err(err) => {
                tracing::error!(error = %err, "could not start contest");
                self.status = Some(format!("Error loading questions: {err}"));
            }
        }
    }

    fn regenerate(&mut self) {
        self.selected = 0;
        match self.contest.regenerate() {
            Ok(()) => {
                if self.contest.phase() == ContestPhase::InProgress {
                    self.status = None;
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "could not regenerate problems");
                self.status = Some(format!("Error loading questions: {err}"));
            }
        }
    }
}
