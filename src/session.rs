use rand::Rng;

use crate::error::{ContestError, SelectionError};
use crate::problem::{Mix, Pool, Problem};
use crate::recency::RecencyStore;
use crate::sampler::select_problems;
use crate::storage::StateStore;
use crate::timer::{Clock, SessionTimer, Tick, TimerState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestProblem {
    pub problem: Problem,
    pub solved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContestPhase {
    NotStarted,
    InProgress,
    TimeUp,
}

/// One practice contest: the drawn problem list plus its countdown.
///
/// Drawing and timing are triggered by the same actions but never share
/// data. The recency history and the timer persist through the same store.
#[derive(Debug)]
pub struct Contest<S: StateStore + Clone, C: Clock, R: Rng> {
    pool: Pool,
    mix: Mix,
    duration_minutes: u64,
    recency: RecencyStore<S>,
    timer: SessionTimer<S, C>,
    rng: R,
    problems: Vec<ContestProblem>,
}

impl<S: StateStore + Clone, C: Clock, R: Rng> Contest<S, C, R> {
    pub fn new(pool: Pool, store: S, clock: C, rng: R) -> Self {
        Self {
            pool,
            mix: Mix::default(),
            duration_minutes: crate::timer::DEFAULT_DURATION_MINUTES,
            recency: RecencyStore::new(store.clone()),
            timer: SessionTimer::new(store, clock),
            rng,
            problems: Vec::new(),
        }
    }

    pub fn with_mix(mut self, mix: Mix) -> Self {
        self.mix = mix;
        self
    }

    pub fn with_duration(mut self, duration_minutes: u64) -> Self {
        self.duration_minutes = duration_minutes;
        self
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn mix(&self) -> Mix {
        self.mix
    }

    pub fn duration_minutes(&self) -> u64 {
        self.duration_minutes
    }

    pub fn problems(&self) -> &[ContestProblem] {
        &self.problems
    }

    pub fn timer(&self) -> &SessionTimer<S, C> {
        &self.timer
    }

    pub fn recency(&self) -> &RecencyStore<S> {
        &self.recency
    }

    pub fn phase(&self) -> ContestPhase {
        match self.timer.state() {
            TimerState::Idle => ContestPhase::NotStarted,
            TimerState::Running { .. } => ContestPhase::InProgress,
            TimerState::Expired { .. } => ContestPhase::TimeUp,
        }
    }

    /// Draw a problem list and start the countdown. A failed draw leaves the
    /// timer alone. `duration_minutes` overrides the configured duration.
    pub fn start(&mut self, duration_minutes: Option<u64>) -> Result<i64, ContestError> {
        self.draw()?;
        let minutes = duration_minutes.unwrap_or(self.duration_minutes);
        Ok(self.timer.start(Some(minutes))?)
    }

    /// Replace the problem list without touching the countdown
    pub fn regenerate(&mut self) -> Result<(), SelectionError> {
        self.draw()
    }

    /// Stop the countdown and clear the list
    pub fn end(&mut self) {
        self.timer.cancel();
        self.problems.clear();
    }

    /// Flip the solved mark of one listed problem. Returns the new mark, or
    /// `None` when `index` is out of range.
    pub fn toggle_solved(&mut self, index: usize) -> Option<bool> {
        let entry = self.problems.get_mut(index)?;
        entry.solved = !entry.solved;
        Some(entry.solved)
    }

    /// Resume a countdown left running by an earlier process
    pub fn restore(&mut self) -> TimerState {
        self.timer.restore()
    }

    pub fn tick(&mut self) -> Tick {
        self.timer.tick()
    }

    fn draw(&mut self) -> Result<(), SelectionError> {
        let recent = self.recency.get_recent();
        let picks = select_problems(&self.pool, &recent, &self.mix, &mut self.rng)?;

        if let Err(err) = self.recency.record_selection(picks.iter().map(|p| p.slug.as_str())) {
            tracing::warn!(error = %err, "could not record recency history");
        }

        tracing::info!(count = picks.len(), "drew problems");
        self.problems = picks
            .into_iter()
            .map(|problem| ContestProblem {
                problem,
                solved: false,
            })
            .collect();
        Ok(())
    }
}
