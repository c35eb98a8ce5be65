use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use mockcontest::app::{App, AppAction};
use mockcontest::runtime::{AppEvent, ChannelEventSource, FixedTicker, Runner};
use mockcontest::session::{Contest, ContestPhase};
use mockcontest::storage::SqliteStateStore;
use mockcontest::timer::{ManualClock, TimerState};
use mockcontest::{Difficulty, Pool, Problem};
use rand::{rngs::StdRng, SeedableRng};

const T0: i64 = 1_700_000_000_000;

fn fixture_pool() -> Pool {
    let mut problems = Vec::new();
    for difficulty in Difficulty::ALL {
        for i in 0..5 {
            problems.push(Problem::new(format!("{difficulty}-problem-{i}"), difficulty));
        }
    }
    Pool::new(problems)
}

fn key(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

// Headless integration using the internal runtime without a TTY.
// Drives start / mark solved / quit through Runner + ChannelEventSource.
#[test]
fn headless_contest_flow() {
    let store = Rc::new(SqliteStateStore::open_in_memory().unwrap());
    let clock = ManualClock::new(T0);
    let contest = Contest::new(fixture_pool(), store, clock.clone(), StdRng::seed_from_u64(9));
    let mut app = App::new(contest).with_duration_override(Some(25));

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        ChannelEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    tx.send(key('s')).unwrap();
    tx.send(key(' ')).unwrap();
    tx.send(key('q')).unwrap();

    let mut quit = false;
    for _ in 0..100u32 {
        match runner.step() {
            AppEvent::Tick => {
                app.on_tick();
            }
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if app.on_key(key) == AppAction::Quit {
                    quit = true;
                    break;
                }
            }
        }
    }

    assert!(quit, "loop should have seen the quit key");
    assert_eq!(app.contest.phase(), ContestPhase::InProgress);
    assert_eq!(app.contest.problems().len(), 4);
    assert!(app.contest.problems()[0].solved);
    assert_eq!(app.contest.timer().remaining_secs(), 25 * 60);
}

#[test]
fn headless_countdown_expires_once() {
    let store = Rc::new(SqliteStateStore::open_in_memory().unwrap());
    let clock = ManualClock::new(T0);
    let contest = Contest::new(fixture_pool(), store, clock.clone(), StdRng::seed_from_u64(9));
    let mut app = App::new(contest).with_duration_override(Some(1));
    app.on_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE));

    let (_tx, rx) = mpsc::channel();
    let runner = Runner::new(
        ChannelEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );

    // Each tick moves the wall clock 7s; ticks are never counted as time
    let mut alerts = 0;
    for _ in 0..20u32 {
        if let AppEvent::Tick = runner.step() {
            clock.advance_ms(7_000);
            if app.on_tick() {
                alerts += 1;
            }
        }
    }

    assert_eq!(alerts, 1);
    assert_eq!(app.contest.phase(), ContestPhase::TimeUp);
}

#[test]
fn countdown_survives_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("state.db");
    let clock = ManualClock::new(T0);

    let deadline = {
        let store = Rc::new(SqliteStateStore::open(&db).unwrap());
        let mut contest =
            Contest::new(fixture_pool(), store, clock.clone(), StdRng::seed_from_u64(1));
        contest.start(Some(25)).unwrap()
    };

    // The "reload": new connection, new contest, some wall time later
    clock.advance_ms(90_500);
    let store = Rc::new(SqliteStateStore::open(&db).unwrap());
    let mut contest = Contest::new(fixture_pool(), store, clock.clone(), StdRng::seed_from_u64(2));

    assert_eq!(
        contest.restore(),
        TimerState::Running {
            deadline_ms: deadline
        }
    );
    assert_eq!(contest.tick().remaining_secs, 1500 - 91);

    // Recent picks from the first process steer the second draw away
    let first_draw = contest.recency().get_recent();
    assert_eq!(first_draw.len(), 4);
    contest.regenerate().unwrap();
    for entry in contest.problems() {
        assert!(!first_draw.contains(&entry.problem.slug));
    }
}
