use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    thread,
    time::{Duration, Instant},
};
use tapseq::{
    celebration::Celebration,
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    runtime::{crossterm_events, GameEvent, Runner},
    ui::{board::BoardProjection, screen_layout, GameView},
    Engine, EngineConfig, Status, TICK_RATE_MS,
};

/// click the numbered targets in ascending order before they fade
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A reflex game for the terminal: numbered targets appear on the board and must be clicked in ascending order. A wrong click ends the game; clearing the last target wins after a short confirmation delay."
)]
pub struct Cli {
    /// number of targets; starts a game right away
    #[clap(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
    count: Option<u32>,

    /// side length of the square board in board units
    #[clap(long)]
    board_size: Option<u32>,

    /// side length of a target in board units
    #[clap(long)]
    target_size: Option<u32>,

    /// how long a clicked target takes to fade out
    #[clap(long)]
    fade_ms: Option<u64>,

    /// delay between autoplay clicks
    #[clap(long)]
    autoplay_interval_ms: Option<u64>,

    /// wait after the last target before declaring all clear
    #[clap(long)]
    confirm_delay_ms: Option<u64>,

    /// turn autoplay on as soon as the game starts
    #[clap(long, requires = "count")]
    autoplay: bool,

    /// run without a terminal and print the final snapshot as JSON
    #[clap(long, requires = "count")]
    headless: bool,

    /// give up on a headless run after this many seconds
    #[clap(long, default_value_t = 120)]
    timeout_secs: u64,
}

impl Cli {
    /// CLI flags layered over the stored configuration
    fn engine_config(&self, base: EngineConfig) -> EngineConfig {
        EngineConfig {
            board_size: self.board_size.unwrap_or(base.board_size),
            target_size: self.target_size.unwrap_or(base.target_size),
            fade_duration_ms: self.fade_ms.unwrap_or(base.fade_duration_ms),
            autoplay_interval_ms: self
                .autoplay_interval_ms
                .unwrap_or(base.autoplay_interval_ms),
            confirmation_delay_ms: self.confirm_delay_ms.unwrap_or(base.confirmation_delay_ms),
            ..base
        }
    }
}

pub struct App {
    pub engine: Engine,
    pub input: String,
    pub setup: bool,
    pub celebration: Celebration,
    last_status: Status,
    store: FileConfigStore,
    stored: Config,
}

impl App {
    pub fn new(engine: Engine, store: FileConfigStore, stored: Config) -> Self {
        let input = stored.last_count.map(|c| c.to_string()).unwrap_or_default();
        Self {
            engine,
            input,
            setup: true,
            celebration: Celebration::new(),
            last_status: Status::Idle,
            store,
            stored,
        }
    }

    fn start(&mut self) {
        match self.engine.start_from_input(&self.input) {
            Ok(()) => {
                self.setup = false;
                self.celebration.stop();
                self.stored.last_count = self.engine.last_count();
                if let Err(err) = self.store.save(&self.stored) {
                    tracing::warn!(%err, "could not save config");
                }
            }
            Err(err) => tracing::debug!(%err, "start ignored"),
        }
    }

    /// Returns true when the app should quit
    fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            return true;
        }

        if self.setup {
            match key.code {
                // no leading zero, same rule as the input box
                KeyCode::Char(c) if c.is_ascii_digit() && !(c == '0' && self.input.is_empty()) => {
                    if self.input.len() < 4 {
                        self.input.push(c);
                    }
                }
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Enter => self.start(),
                _ => {}
            }
            return false;
        }

        match key.code {
            KeyCode::Char('a') => self.engine.toggle_autoplay(),
            KeyCode::Char('r') => {
                // restart stays locked while the last click awaits confirmation
                if !self.engine.session().pending_confirmation() {
                    self.start();
                }
            }
            KeyCode::Char('n') => {
                // the abandoned session must not keep ticking behind the prompt
                self.engine.shutdown();
                self.setup = true;
            }
            _ => {}
        }
        false
    }

    fn on_click(&mut self, column: u16, row: u16, screen: Rect) {
        if self.setup {
            return;
        }
        // hit-test against the cells as drawn, not the board geometry underneath
        let snapshot = self.engine.snapshot();
        let projection = BoardProjection::new(screen_layout(screen).board, snapshot.board_size);
        let Some(target) =
            projection.target_under(&snapshot.targets, snapshot.target_size, column, row)
        else {
            return;
        };

        if target.is_pending() {
            tracing::debug!(order = target.order, column, row, "target clicked");
            self.engine.click(target.order);
        } else {
            tracing::debug!(order = target.order, "fading target absorbed the click");
        }
    }

    fn on_tick(&mut self, screen: Rect) {
        self.engine.pump();
        self.celebration.update(Duration::from_millis(TICK_RATE_MS));

        let status = self.engine.status();
        if status != self.last_status && status == Status::AllClear {
            let board = screen_layout(screen).board;
            self.celebration.start(board.width, board.height);
        }
        self.last_status = status;
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Err(err) = logging::init() {
        eprintln!("logging disabled: {err}");
    }

    let store = FileConfigStore::new();
    let mut stored = store.load();
    let config = cli.engine_config(stored.engine);
    if let Err(err) = config.validate() {
        Cli::command().error(ErrorKind::ValueValidation, err).exit();
    }

    if cli.headless {
        return run_headless(&cli, config);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(count) = cli.count {
        stored.last_count = Some(count);
    }
    let mut app = App::new(Engine::new(config)?, store, stored);
    if cli.count.is_some() {
        app.start();
        if cli.autoplay {
            app.engine.toggle_autoplay();
        }
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);
    app.engine.shutdown();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen,
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(crossterm_events(), Duration::from_millis(TICK_RATE_MS));

    loop {
        let size = terminal.size()?;
        let screen = Rect::new(0, 0, size.width, size.height);

        match runner.step() {
            GameEvent::Tick => app.on_tick(screen),
            GameEvent::Resize => {}
            GameEvent::Click { column, row } => app.on_click(column, row, screen),
            GameEvent::Key(key) => {
                if app.on_key(key) {
                    break;
                }
            }
        }

        let snapshot = app.engine.snapshot();
        terminal.draw(|f| {
            let view = GameView {
                snapshot: &snapshot,
                input: &app.input,
                setup: app.setup,
                celebration: Some(&app.celebration),
            };
            f.render_widget(&view, f.area());
        })?;
    }

    Ok(())
}

/// Plays with real time and no terminal, printing the final snapshot
fn run_headless(cli: &Cli, config: EngineConfig) -> Result<(), Box<dyn Error>> {
    let mut engine = Engine::new(config)?;
    engine.start(cli.count.unwrap_or_default())?;
    if cli.autoplay {
        engine.toggle_autoplay();
    }

    let deadline = Instant::now() + Duration::from_secs(cli.timeout_secs);
    let nap = Duration::from_millis(config.clock_tick_ms.min(TICK_RATE_MS));
    let snapshot = loop {
        let snapshot = engine.snapshot();
        if snapshot.status.is_terminal() || Instant::now() >= deadline {
            break snapshot;
        }
        thread::sleep(nap);
    };

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
