use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, info, warn};

use crate::direction::Direction;
use crate::enrichment::{Dispatch, Enrichment, Job};
use crate::game::{Game, GameResult, GameStatus, InputOutcome, TickOutcome};
use crate::history::{HistoryDb, HistoryRecord};
use crate::ranking::{Connectivity, RankingEntry};
use crate::settings::{Settings, SettingsStore};
use crate::stimulus::{StimulusGenerator, StimulusSource};

/// What the event loop should do after handling a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// The game plus everything the screen shows around it
pub struct App<S: StimulusSource = StimulusGenerator> {
    pub game: Game<S>,
    pub settings: Settings,
    pub leaderboard: Vec<RankingEntry>,
    pub connectivity: Connectivity,
    /// Id of the player's own leaderboard row for the finished run
    pub highlight_id: Option<String>,
    pub commentary: Option<String>,
    pub ranking_pending: bool,
    pub commentary_pending: bool,
    pub last_outcome: Option<InputOutcome>,
    pub personal_best: Option<HistoryRecord>,
    pub runs_played: u64,
    miss_cue: bool,
    settings_store: Box<dyn SettingsStore>,
    dispatcher: Box<dyn Dispatch>,
    history: Option<HistoryDb>,
}

impl<S: StimulusSource> App<S> {
    pub fn new(
        source: S,
        settings_store: Box<dyn SettingsStore>,
        dispatcher: Box<dyn Dispatch>,
        history: Option<HistoryDb>,
    ) -> Self {
        let settings = settings_store.load();
        let mut app = Self {
            game: Game::new(source, settings.auto_restart),
            settings,
            leaderboard: Vec::new(),
            connectivity: Connectivity::Unknown,
            highlight_id: None,
            commentary: None,
            ranking_pending: false,
            commentary_pending: false,
            last_outcome: None,
            personal_best: None,
            runs_played: 0,
            miss_cue: false,
            settings_store,
            dispatcher,
            history,
        };
        app.refresh_history_stats();
        app
    }

    /// Kicks off the startup connectivity probe and leaderboard read
    pub fn init(&mut self) {
        self.ranking_pending = true;
        self.dispatcher.dispatch(Job::Refresh {
            session_id: self.game.session().id,
        });
    }

    pub fn is_syncing(&self) -> bool {
        self.ranking_pending
    }

    /// Starts a new run from any state, dropping the previous run's
    /// commentary and highlight
    pub fn start(&mut self) {
        self.game.start();
        self.clear_run_presentation();
    }

    fn clear_run_presentation(&mut self) {
        self.commentary = None;
        self.highlight_id = None;
        self.commentary_pending = false;
        self.last_outcome = None;
    }

    pub fn toggle_auto_restart(&mut self) {
        self.settings.auto_restart = !self.settings.auto_restart;
        self.game.set_auto_restart(self.settings.auto_restart);
        if let Err(e) = self.settings_store.save(&self.settings) {
            warn!("Could not persist settings: {e}");
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.kind != KeyEventKind::Press {
            return Control::Continue;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Control::Quit;
            }
            KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
            KeyCode::Char('r') | KeyCode::Char('R') => self.start(),
            KeyCode::Char('a') | KeyCode::Char('A') => self.toggle_auto_restart(),
            code => {
                if let Some(direction) = Direction::from_key(code) {
                    self.on_direction(direction);
                }
            }
        }

        Control::Continue
    }

    pub fn on_direction(&mut self, direction: Direction) {
        let outcome = self.game.submit_input(direction);
        if outcome == InputOutcome::Restarted {
            self.clear_run_presentation();
        }
        if matches!(outcome, InputOutcome::Incorrect | InputOutcome::Restarted) {
            self.miss_cue = true;
        }
        if outcome != InputOutcome::Ignored {
            self.last_outcome = Some(outcome);
        }
    }

    pub fn on_tick(&mut self) {
        if let TickOutcome::Expired { session_id, result } = self.game.tick() {
            self.finish(session_id, result);
        }
    }

    fn finish(&mut self, session_id: u64, result: GameResult) {
        info!(
            "Run {session_id} over: score {} accuracy {:.2} best streak {}",
            result.score, result.accuracy, result.max_streak
        );

        if let Some(db) = &self.history {
            if let Err(e) = db.record(&result, Utc::now()) {
                warn!("Could not record run in history: {e}");
            }
        }
        self.refresh_history_stats();

        self.ranking_pending = true;
        self.commentary_pending = true;
        self.dispatcher.dispatch(Job::GameOver { session_id, result });
    }

    fn refresh_history_stats(&mut self) {
        let Some(db) = &self.history else {
            return;
        };
        match (db.personal_best(), db.session_count()) {
            (Ok(best), Ok(count)) => {
                self.personal_best = best;
                self.runs_played = count;
            }
            (Err(e), _) | (_, Err(e)) => warn!("Could not read run history: {e}"),
        }
    }

    /// Applies background results. Anything computed for an older session is
    /// dropped, except the connectivity it observed.
    pub fn apply(&mut self, enrichment: Enrichment) {
        let session_id = enrichment.session_id();
        let current = session_id == self.game.session().id;

        match enrichment {
            Enrichment::Standings { standings, .. } => {
                self.connectivity = standings.connectivity;
                if current {
                    self.leaderboard = standings.entries;
                    self.ranking_pending = false;
                }
            }
            Enrichment::Ranked { submission, .. } => {
                self.connectivity = submission.standings.connectivity;
                if current {
                    self.leaderboard = submission.standings.entries;
                    self.highlight_id = Some(submission.entry_id);
                    self.ranking_pending = false;
                }
            }
            Enrichment::Commentary { text, .. } => {
                if current {
                    self.commentary = Some(text);
                    self.commentary_pending = false;
                }
            }
        }

        if !current {
            debug!("Ignoring background result for superseded session {session_id}");
        }
    }

    /// Whether a miss since the last call wants an audible cue. Clears the
    /// request.
    pub fn take_miss_cue(&mut self) -> bool {
        std::mem::take(&mut self.miss_cue)
    }

    pub fn status(&self) -> GameStatus {
        self.game.status()
    }
}
