use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{info, warn};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Arc,
};

use migration_mind::{
    app::{App, Control},
    app_dirs::AppDirs,
    commentary::{Commentator, GeminiCommentator, DEFAULT_MODEL},
    enrichment::Enricher,
    game::GameStatus,
    history::HistoryDb,
    ranking::{Leaderboard, LocalRankingStore, RankingStore, RemoteRankingStore},
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    settings::FileSettingsStore,
    stimulus::StimulusGenerator,
};

/// reaction time game: answer the central arrow, ignore the decoys
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A 30 second focus drill. Press the arrow key matching the central arrow while the surrounding decoys try to pull you off. Results go to a shared leaderboard when one is configured, and to a local top five otherwise."
)]
pub struct Cli {
    /// never contact the remote leaderboard
    #[clap(long)]
    offline: bool,

    /// base url of the hosted leaderboard
    #[clap(long, env = "MIGRATION_MIND_SUPABASE_URL")]
    supabase_url: Option<String>,

    /// api key for the hosted leaderboard
    #[clap(long, env = "MIGRATION_MIND_SUPABASE_KEY", hide_env_values = true)]
    supabase_key: Option<String>,

    /// api key for run commentary
    #[clap(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_key: Option<String>,

    /// model used for run commentary
    #[clap(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// keep settings, leaderboard cache, history and log under this directory
    #[clap(long)]
    data_dir: Option<PathBuf>,

    /// log filter, e.g. "debug" or "migration_mind=trace" (overrides RUST_LOG)
    #[clap(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Remote credentials, when both halves are present and we are not offline
    fn remote_credentials(&self) -> Option<(&str, &str)> {
        if self.offline {
            return None;
        }
        match (self.supabase_url.as_deref(), self.supabase_key.as_deref()) {
            (Some(url), Some(key)) if !url.trim().is_empty() && !key.trim().is_empty() => {
                Some((url, key))
            }
            _ => None,
        }
    }
}

fn init_logging(cli: &Cli, dirs: &AppDirs) {
    // the terminal belongs to the UI, so logs go to a file
    if let Err(e) = fs::create_dir_all(dirs.state_dir()) {
        eprintln!("Could not create {}: {e}", dirs.state_dir().display());
        return;
    }
    let file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(dirs.log_path())
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Could not open log file: {e}");
            return;
        }
    };

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(filter) = &cli.log_level {
        builder.parse_filters(filter);
    }
    if let Err(e) = builder
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
    {
        eprintln!("Could not install logger: {e}");
    }
}

fn build_leaderboard(cli: &Cli, dirs: &AppDirs) -> Leaderboard {
    let local = LocalRankingStore::with_path(dirs.leaderboard_path());
    match cli.remote_credentials() {
        Some((url, key)) => {
            info!("Using remote leaderboard at {url}");
            let remote: Box<dyn RankingStore> = Box::new(RemoteRankingStore::new(url, key));
            Leaderboard::new(Some(remote), local)
        }
        None => {
            info!("Remote leaderboard not configured, rankings stay local");
            Leaderboard::offline(local)
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let dirs = AppDirs::resolve(cli.data_dir.as_deref());
    init_logging(&cli, &dirs);

    let events = CrosstermEventSource::new();
    let leaderboard = Arc::new(build_leaderboard(&cli, &dirs));
    let commentator: Arc<dyn Commentator> =
        Arc::new(GeminiCommentator::new(cli.gemini_key.clone(), cli.model.clone()));
    let enricher = Enricher::new(leaderboard, commentator, events.sender());

    let history = match HistoryDb::open(dirs.history_path()) {
        Ok(db) => Some(db),
        Err(e) => {
            warn!("Run history disabled: {e}");
            None
        }
    };

    let mut app = App::new(
        StimulusGenerator::new(),
        Box::new(FileSettingsStore::with_path(dirs.settings_path())),
        Box::new(enricher),
        history,
    );
    app.init();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(events, FixedTicker::every_second());
    let outcome = start_tui(&mut terminal, &mut app, runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn start_tui<B: Backend + io::Write>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut runner: Runner<CrosstermEventSource, FixedTicker>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match runner.step() {
            AppEvent::Key(key) => {
                let before = app.game.session().id;
                if app.on_key(key) == Control::Quit {
                    info!("Quitting");
                    break;
                }
                if app.take_miss_cue() {
                    execute!(terminal.backend_mut(), Print('\x07'))?;
                }
                // a fresh run gets its full first second
                if app.game.session().id != before && app.status() == GameStatus::Playing {
                    runner.realign();
                }
            }
            AppEvent::Resize => {}
            AppEvent::Tick => app.on_tick(),
            AppEvent::Enriched(enrichment) => app.apply(enrichment),
        }

        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_offline_flag() {
        let cli = Cli::parse_from(["migration-mind", "--offline"]);
        assert!(cli.offline);
        assert_eq!(cli.remote_credentials(), None);
    }

    #[test]
    fn test_cli_default_model() {
        let cli = Cli::parse_from(["migration-mind"]);
        assert_eq!(cli.model, DEFAULT_MODEL);
        assert_eq!(cli.data_dir, None);
        assert_eq!(cli.log_level, None);
    }

    #[test]
    fn test_cli_remote_needs_url_and_key() {
        let cli = Cli::parse_from([
            "migration-mind",
            "--supabase-url",
            "https://example.supabase.co",
            "--supabase-key",
            "anon",
        ]);
        assert_eq!(
            cli.remote_credentials(),
            Some(("https://example.supabase.co", "anon"))
        );

        let cli = Cli::parse_from([
            "migration-mind",
            "--offline",
            "--supabase-url",
            "https://example.supabase.co",
            "--supabase-key",
            "anon",
        ]);
        assert_eq!(cli.remote_credentials(), None);

        let cli = Cli::parse_from([
            "migration-mind",
            "--supabase-url",
            "https://example.supabase.co",
            "--supabase-key",
            "  ",
        ]);
        assert_eq!(cli.remote_credentials(), None);
    }

    #[test]
    fn test_cli_data_dir_and_log_level() {
        let cli = Cli::parse_from([
            "migration-mind",
            "--data-dir",
            "/tmp/mm",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/mm")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_cli_rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["migration-mind", "--words", "3"]).is_err());
    }

    #[test]
    fn test_cli_model_override() {
        let cli = Cli::parse_from(["migration-mind", "--model", "gemini-2.0-flash"]);
        assert_eq!(cli.model, "gemini-2.0-flash");
    }
}
