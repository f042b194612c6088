use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableBracketedPaste, DisableFocusChange, EnableBracketedPaste, EnableFocusChange,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};
use typetrail::{
    app::{App, Control},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    passages::PassageSource,
    probe::FocusProbe,
    report::{ReportFormat, ScoreSink, WriterSink},
    runtime::{spawn_terminal_reader, EventPump},
    TICK_RATE_MS,
};

/// follow-along typing practice with live per-character feedback
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type along with a passage: every character is marked as you go, keystrokes, backspaces and enters are counted, and scoring pauses while the terminal loses focus."
)]
pub struct Cli {
    /// custom passage to practice
    #[clap(short = 'p', long, conflicts_with = "file")]
    prompt: Option<String>,

    /// file of passages separated by blank lines
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// how finished scores are printed on exit
    #[clap(long, value_enum)]
    format: Option<ReportFormat>,

    /// focus probe interval in milliseconds
    #[clap(long)]
    probe_interval_ms: Option<u64>,

    /// hide the input line under the passage
    #[clap(long)]
    hide_input: bool,

    /// write the effective settings to the config file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Command line flags take precedence over the config file
    fn apply(&self, mut config: Config) -> Config {
        if let Some(format) = self.format {
            config.report_format = format;
        }
        if let Some(ms) = self.probe_interval_ms {
            config.probe_interval_ms = ms;
        }
        if let Some(file) = &self.file {
            config.passage_file = Some(file.clone());
        }
        if self.hide_input {
            config.show_input = false;
        }
        config
    }

    fn passage_source(&self, config: &Config) -> typetrail::error::Result<PassageSource> {
        if let Some(prompt) = &self.prompt {
            return Ok(PassageSource::Fixed(prompt.clone()));
        }
        match &config.passage_file {
            Some(path) => PassageSource::from_file(path),
            None => Ok(PassageSource::builtin()),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Err(err) = init_tracing() {
        eprintln!("logging disabled: {err}");
    }

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    if cli.save_config {
        store.save(&config)?;
    }
    let source = cli.passage_source(&config)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableFocusChange,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(source, config.clone());
    let mut probe = FocusProbe::spawn(
        Arc::clone(&app.session),
        app.focus.clone(),
        config.probe_interval(),
    );

    let result = start_tui(&mut terminal, &mut app);
    probe.stop();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        DisableFocusChange,
        LeaveAlternateScreen,
    )?;
    terminal.show_cursor()?;

    result?;

    let mut sink = WriterSink::new(io::stdout(), config.report_format);
    for score in app.finished() {
        sink.deliver(score)?;
    }

    Ok(())
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let events = EventPump::new(
        spawn_terminal_reader(),
        Duration::from_millis(TICK_RATE_MS),
    );

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        if app.handle_event(events.next_event()) == Control::Quit {
            break;
        }
    }

    Ok(())
}

fn init_tracing() -> Result<(), Box<dyn Error>> {
    use std::fs::{self, File};
    use std::sync::Mutex;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let log_path = AppDirs::log_path().unwrap_or_else(|| PathBuf::from("typetrail.log"));
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::options().create(true).append(true).open(&log_path)?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("typetrail=info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .try_init()?;

    Ok(())
}
