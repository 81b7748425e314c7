use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use guessr::{
    app::App,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    console::{ChannelLines, Console},
    difficulty::Difficulty,
    logging::init_logging,
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner},
    score::{FileScoreStore, Scoreboard},
    ui, TICK_RATE_MS,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

/// guess the number, with hints on how close you are
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Guess a secret number with directional and proximity hints. Your best score (fewest attempts) is kept between sessions."
)]
pub struct Cli {
    /// play in the plain line-based console instead of the full-screen UI
    #[clap(long)]
    console: bool,

    /// difficulty preset to start with (default: last one used)
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// smallest number the secret can be
    #[clap(long, allow_negative_numbers = true)]
    min: Option<i64>,

    /// largest number the secret can be
    #[clap(long, allow_negative_numbers = true)]
    max: Option<i64>,

    /// disable colored console output
    #[clap(long)]
    no_color: bool,

    /// fix the secret number (for scripted play)
    #[clap(long, hide = true, allow_negative_numbers = true)]
    secret: Option<i64>,
}

impl Cli {
    /// Layer CLI arguments over the stored defaults
    fn merge_into(&self, mut config: Config) -> Config {
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(min) = self.min {
            config.min = min;
        }
        if let Some(max) = self.max {
            config.max = max;
        }
        config
    }

    fn use_color(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").is_none()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let _logging = init_logging(AppDirs::log_dir().as_deref());

    let config_store = FileConfigStore::new();
    let config = cli.merge_into(config_store.load());
    if let Err(e) = config.validate() {
        Cli::command().error(ErrorKind::ValueValidation, e).exit();
    }
    if let Some(secret) = cli.secret {
        if !(config.min..=config.max).contains(&secret) {
            Cli::command()
                .error(
                    ErrorKind::ValueValidation,
                    format!("--secret must be between {} and {}", config.min, config.max),
                )
                .exit();
        }
    }

    let scoreboard = Scoreboard::load(Box::new(FileScoreStore::new()));

    let final_config = if cli.console {
        // Ctrl+C becomes a reply so the round can ask before quitting
        let mut console = Console::new(ChannelLines::stdin(), io::stdout(), config, scoreboard)
            .with_color(cli.use_color())
            .with_secret(cli.secret);
        console.run()?;
        console.config().clone()
    } else {
        if !stdin().is_tty() {
            let mut cmd = Cli::command();
            cmd.error(
                ErrorKind::Io,
                "stdin must be a tty (use --console for line-based play)",
            )
            .exit();
        }
        let mut app = App::new(config, scoreboard).with_secret(cli.secret);
        run_tui(&mut app)?;
        app.config
    };

    if let Err(e) = config_store.save(&final_config) {
        tracing::warn!("could not save config: {e}");
    }

    Ok(())
}

/// Set up the terminal, run the UI, and restore the terminal even on error.
fn run_tui(app: &mut App) -> Result<(), Box<dyn Error>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    // Dropping the runner stops the input thread.
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| ui::draw(app, f))?;

    while !app.should_quit {
        match runner.step() {
            GameEvent::Tick => {
                app.on_tick();
                if app.round.as_ref().is_some_and(|r| !r.is_over()) {
                    terminal.draw(|f| ui::draw(app, f))?;
                }
            }
            GameEvent::Resize => {
                terminal.draw(|f| ui::draw(app, f))?;
            }
            GameEvent::Key(key) => {
                app.on_key(key);
                terminal.draw(|f| ui::draw(app, f))?;
            }
            GameEvent::Closed => {
                tracing::warn!("terminal input closed, leaving the game");
                app.should_quit = true;
            }
        }
    }

    Ok(())
}
