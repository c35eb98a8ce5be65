use chrono::{Local, TimeZone};
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use mockcontest::{
    app::{App, AppAction},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    pool::provider_for,
    problem::Mix,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    session::{Contest, ContestProblem},
    storage::{SqliteStateStore, StateStore},
    timer::{parse_duration_minutes, Clock, SystemClock, TimerState, TICK_INTERVAL_MS},
    util::format_clock,
};
use rand::Rng;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    path::PathBuf,
    rc::Rc,
    time::Duration,
};
use time_humanize::{Accuracy, HumanTime, Tense};
use webbrowser::Browser;

/// timed mock contests with fresh problems every time
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Draws a randomized, difficulty-balanced set of practice problems that avoids the ones you saw recently, and runs a contest countdown that survives restarts."
)]
pub struct Cli {
    /// problem pool json (a list of problems or an object with a `problems` field)
    #[clap(long, global = true)]
    pool: Option<PathBuf>,

    /// state database holding recent picks and the running countdown
    #[clap(long, global = true)]
    state_db: Option<PathBuf>,

    /// config file to use instead of the default location
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// contest length in minutes (invalid values fall back to 60)
    #[clap(short = 'd', long, global = true)]
    duration: Option<String>,

    /// number of easy problems to draw
    #[clap(long, global = true)]
    easy: Option<usize>,

    /// number of medium problems to draw
    #[clap(long, global = true)]
    medium: Option<usize>,

    /// number of hard problems to draw
    #[clap(long, global = true)]
    hard: Option<usize>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// draw one problem set and print it
    Pick {
        /// print as json
        #[clap(long)]
        json: bool,
    },
    /// draw problems and start the countdown without the TUI
    Start,
    /// show the running countdown, if any
    Status,
    /// stop the running countdown
    End,
    /// show recently drawn problems
    History {
        /// forget all recently drawn problems
        #[clap(long)]
        clear: bool,
    },
    /// show the config file, or save the given --pool/--duration/mix flags into it
    Config {
        /// write the flags given on this command line as the new defaults
        #[clap(long)]
        save: bool,
    },
}

impl Cli {
    fn duration_override(&self) -> Option<u64> {
        self.duration.as_deref().map(parse_duration_minutes)
    }

    fn apply_mix_overrides(&self, mix: Mix) -> Mix {
        Mix {
            easy: self.easy.unwrap_or(mix.easy),
            medium: self.medium.unwrap_or(mix.medium),
            hard: self.hard.unwrap_or(mix.hard),
        }
    }

    /// `config` with this command line's overrides folded in
    fn merge_into(&self, mut config: Config) -> Config {
        if let Some(pool) = &self.pool {
            config.pool_path = Some(pool.clone());
        }
        if let Some(minutes) = self.duration_override() {
            config.duration_minutes = Some(minutes);
        }
        if self.easy.is_some() || self.medium.is_some() || self.hard.is_some() {
            config.mix = Some(self.apply_mix_overrides(config.mix.unwrap_or_default()));
        }
        config
    }

    fn log_dir(&self) -> Option<PathBuf> {
        match &self.state_db {
            Some(path) => path.parent().map(|parent| parent.join("logs")),
            None => AppDirs::log_dir(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let _log_guard = cli.log_dir().and_then(|dir| logging::init(&dir));

    let config_store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let config = config_store.load();

    if let Some(Command::Config { save }) = &cli.command {
        return show_or_save_config(&cli, &config_store, config, *save);
    }

    let pool_path = cli.pool.clone().or_else(|| config.pool_path.clone());
    let pool = provider_for(pool_path.as_deref()).load()?;

    let store = Rc::new(match &cli.state_db {
        Some(path) => SqliteStateStore::open(path)?,
        None => SqliteStateStore::new()?,
    });

    let mix = cli.apply_mix_overrides(config.resolve_mix(&pool));
    let duration = config.resolve_duration(&pool);
    tracing::debug!(?mix, duration, problems = pool.len(), "configured contest");

    let mut contest = Contest::new(pool, store, SystemClock, rand::thread_rng())
        .with_mix(mix)
        .with_duration(duration);

    match cli.command.clone() {
        None => run_interactive(&cli, contest),
        Some(Command::Pick { json }) => {
            contest.regenerate()?;
            if json {
                let formatted: Vec<_> = contest
                    .problems()
                    .iter()
                    .map(|entry| entry.problem.formatted())
                    .collect();
                println!("{}", serde_json::to_string_pretty(&formatted)?);
            } else {
                print_problems(contest.problems());
            }
            Ok(())
        }
        Some(Command::Start) => {
            let deadline = contest.start(cli.duration_override())?;
            print_problems(contest.problems());
            println!();
            println!(
                "Contest running: {} left, ends at {}",
                format_clock(contest.timer().remaining_secs()),
                format_deadline(deadline)
            );
            Ok(())
        }
        Some(Command::Status) => {
            match contest.restore() {
                TimerState::Running { deadline_ms } => {
                    let remaining = contest.timer().remaining_secs();
                    let human = HumanTime::from(Duration::from_secs(remaining))
                        .to_text_en(Accuracy::Rough, Tense::Future);
                    println!(
                        "{} left, ends at {} ({human})",
                        format_clock(remaining),
                        format_deadline(deadline_ms)
                    );
                }
                _ => println!("No active contest"),
            }
            Ok(())
        }
        Some(Command::End) => {
            contest.end();
            println!("Contest ended");
            Ok(())
        }
        Some(Command::Config { .. }) => Ok(()),
        Some(Command::History { clear }) => {
            if clear {
                contest.recency().clear()?;
                println!("History cleared");
            } else {
                for slug in contest.recency().get_recent() {
                    println!("{slug}");
                }
            }
            Ok(())
        }
    }
}

fn show_or_save_config(
    cli: &Cli,
    store: &FileConfigStore,
    config: Config,
    save: bool,
) -> Result<(), Box<dyn Error>> {
    if save {
        let updated = cli.merge_into(config);
        store.save(&updated)?;
        tracing::info!(path = %store.path().display(), "saved config");
        println!("Saved {}", store.path().display());
    } else {
        println!("# {}", store.path().display());
        println!("{}", serde_json::to_string_pretty(&config)?);
    }
    Ok(())
}

fn print_problems(problems: &[ContestProblem]) {
    for (idx, entry) in problems.iter().enumerate() {
        println!(
            "{}. {} [{}] {}",
            idx + 1,
            entry.problem.title(),
            entry.problem.difficulty,
            entry.problem.url()
        );
    }
}

fn format_deadline(deadline_ms: i64) -> String {
    Local
        .timestamp_millis_opt(deadline_ms)
        .single()
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| deadline_ms.to_string())
}

fn run_interactive<S, C, R>(cli: &Cli, contest: Contest<S, C, R>) -> Result<(), Box<dyn Error>>
where
    S: StateStore + Clone,
    C: Clock,
    R: Rng,
{
    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(contest).with_duration_override(cli.duration_override());
    app.restore();

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B, S, C, R>(
    terminal: &mut Terminal<B>,
    app: &mut App<S, C, R>,
) -> Result<(), Box<dyn Error>>
where
    B: Backend,
    S: StateStore + Clone,
    C: Clock,
    R: Rng,
{
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_INTERVAL_MS)),
    );

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            AppEvent::Tick => {
                if app.on_tick() {
                    // Terminal bell as the time's up alert
                    let mut out = io::stdout();
                    out.write_all(b"\x07")?;
                    out.flush()?;
                }
            }
            AppEvent::Resize => {}
            AppEvent::Key(key) => match app.on_key(key) {
                AppAction::Quit => break,
                AppAction::OpenUrl(url) => {
                    if Browser::is_available() {
                        webbrowser::open(&url).unwrap_or_default();
                    }
                }
                AppAction::None => {}
            },
        }
    }

    Ok(())
}
