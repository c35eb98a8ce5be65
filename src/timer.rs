use std::cell::Cell;
use std::num::IntErrorKind;
use std::rc::Rc;

use crate::error::StorageError;
use crate::storage::StateStore;

pub const END_AT_KEY: &str = "contestEndAt";
pub const DEFAULT_DURATION_MINUTES: u64 = 60;
/// Cadence the countdown is refreshed at
pub const TICK_INTERVAL_MS: u64 = 1000;

const MS_PER_MINUTE: i64 = 60_000;

/// Source of wall-clock time in epoch milliseconds
pub trait Clock {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Hand-driven clock. Clones share the same time, so a test can keep one
/// handle and advance the clock under a timer that owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<i64>>,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now: Rc::new(Cell::new(now_ms)),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.set(now_ms);
    }

    pub fn advance_ms(&self, ms: i64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    /// The single live countdown
    Running { deadline_ms: i64 },
    Expired { deadline_ms: i64 },
}

/// Result of one countdown refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub remaining_secs: u64,
    /// Set on the one tick that moved the countdown to expired
    pub expired: bool,
}

/// Integer-prefix parse of a user supplied duration. Leading whitespace and a
/// sign are accepted, trailing junk is ignored (`"25min"` is 25). Anything
/// without digits, zero or negative falls back to the default. Values past
/// `u64::MAX` saturate.
pub fn parse_duration_minutes(raw: &str) -> u64 {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());

    let minutes = match rest[..digits_end].parse::<u64>() {
        Ok(minutes) => minutes,
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => u64::MAX,
        Err(_) => 0,
    };

    if minutes > 0 && !negative {
        minutes
    } else {
        DEFAULT_DURATION_MINUTES
    }
}

/// Countdown anchored to an absolute deadline.
///
/// Only the deadline is persisted. Remaining time is recomputed from it on
/// every tick, so delayed ticks and process restarts cannot make it drift.
#[derive(Debug)]
pub struct SessionTimer<S: StateStore, C: Clock> {
    store: S,
    clock: C,
    state: TimerState,
}

impl<S: StateStore, C: Clock> SessionTimer<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            state: TimerState::Idle,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    pub fn deadline_ms(&self) -> Option<i64> {
        match self.state {
            TimerState::Running { deadline_ms } | TimerState::Expired { deadline_ms } => {
                Some(deadline_ms)
            }
            TimerState::Idle => None,
        }
    }

    /// Start a countdown of `duration_minutes` (default 60 when absent or
    /// zero) and persist its deadline. Any running countdown is replaced.
    pub fn start(&mut self, duration_minutes: Option<u64>) -> Result<i64, StorageError> {
        let minutes = duration_minutes
            .filter(|m| *m > 0)
            .unwrap_or(DEFAULT_DURATION_MINUTES);

        if self.is_running() {
            self.cancel();
        }

        let duration_ms = i64::try_from(minutes)
            .unwrap_or(i64::MAX)
            .saturating_mul(MS_PER_MINUTE);
        let deadline_ms = self.clock.now_ms().saturating_add(duration_ms);

        self.store.set(END_AT_KEY, &deadline_ms.to_string())?;
        self.state = TimerState::Running { deadline_ms };
        tracing::debug!(minutes, deadline_ms, "countdown started");

        Ok(deadline_ms)
    }

    /// Seconds left right now, without changing state
    pub fn remaining_secs(&self) -> u64 {
        match self.state {
            TimerState::Running { deadline_ms } => self.remaining_until(deadline_ms),
            _ => 0,
        }
    }

    /// Refresh the countdown. Reaching zero moves to [`TimerState::Expired`]
    /// and reports `expired` once; later ticks are inert.
    pub fn tick(&mut self) -> Tick {
        let TimerState::Running { deadline_ms } = self.state else {
            return Tick {
                remaining_secs: 0,
                expired: false,
            };
        };

        let remaining_secs = self.remaining_until(deadline_ms);
        let expired = remaining_secs == 0;
        if expired {
            self.state = TimerState::Expired { deadline_ms };
            tracing::info!(deadline_ms, "countdown expired");
        }

        Tick {
            remaining_secs,
            expired,
        }
    }

    /// Pick up a countdown persisted by an earlier process. A missing,
    /// unreadable or past deadline leaves the timer idle.
    pub fn restore(&mut self) -> TimerState {
        self.state = match self.read_deadline() {
            Some(deadline_ms) if deadline_ms > self.clock.now_ms() => {
                tracing::debug!(deadline_ms, "resuming countdown");
                TimerState::Running { deadline_ms }
            }
            _ => TimerState::Idle,
        };
        self.state
    }

    /// Stop the countdown and forget the persisted deadline
    pub fn cancel(&mut self) {
        if let Err(err) = self.store.remove(END_AT_KEY) {
            tracing::warn!(error = %err, "could not clear persisted deadline");
        }
        self.state = TimerState::Idle;
        tracing::debug!("countdown cancelled");
    }

    fn remaining_until(&self, deadline_ms: i64) -> u64 {
        let left_ms = deadline_ms.saturating_sub(self.clock.now_ms()).max(0);
        (left_ms / 1000) as u64
    }

    fn read_deadline(&self) -> Option<i64> {
        let raw = match self.store.get(END_AT_KEY) {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::warn!(error = %err, "could not read persisted deadline");
                return None;
            }
        };

        match raw.trim().parse::<i64>() {
            Ok(deadline_ms) => Some(deadline_ms),
            Err(_) => {
                tracing::warn!(value = %raw, "ignoring malformed persisted deadline");
                None
            }
        }
    }
}
