use log::debug;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use crate::commentary::Commentator;
use crate::game::GameResult;
use crate::ranking::{Connectivity, Leaderboard, Standings, Submission, LEADERBOARD_SIZE};
use crate::runtime::AppEvent;

/// Background work requested by the app
#[derive(Clone, Debug, PartialEq)]
pub enum Job {
    /// Startup connectivity probe and first leaderboard read
    Refresh { session_id: u64 },
    /// Save the result and ask for commentary
    GameOver { session_id: u64, result: GameResult },
}

/// Finished background work, tagged with the session that asked for it
#[derive(Clone, Debug, PartialEq)]
pub enum Enrichment {
    Standings { session_id: u64, standings: Standings },
    Ranked { session_id: u64, submission: Submission },
    Commentary { session_id: u64, text: String },
}

impl Enrichment {
    pub fn session_id(&self) -> u64 {
        match self {
            Enrichment::Standings { session_id, .. }
            | Enrichment::Ranked { session_id, .. }
            | Enrichment::Commentary { session_id, .. } => *session_id,
        }
    }
}

/// Hands jobs to whatever runs them
pub trait Dispatch {
    fn dispatch(&self, job: Job);
}

/// Runs jobs on detached threads and posts the outcome back to the event loop
pub struct Enricher {
    leaderboard: Arc<Leaderboard>,
    commentator: Arc<dyn Commentator>,
    tx: Sender<AppEvent>,
}

impl Enricher {
    pub fn new(
        leaderboard: Arc<Leaderboard>,
        commentator: Arc<dyn Commentator>,
        tx: Sender<AppEvent>,
    ) -> Self {
        Self {
            leaderboard,
            commentator,
            tx,
        }
    }

    fn post(tx: &Sender<AppEvent>, enrichment: Enrichment) {
        // the loop is gone when the app is quitting
        if tx.send(AppEvent::Enriched(enrichment)).is_err() {
            debug!("Dropping background result: event loop has exited");
        }
    }

    fn refresh(&self, session_id: u64) {
        let leaderboard = Arc::clone(&self.leaderboard);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let standings = match leaderboard.probe() {
                Connectivity::Live => leaderboard.fetch_top(LEADERBOARD_SIZE),
                _ => leaderboard.cached(LEADERBOARD_SIZE),
            };
            Self::post(
                &tx,
                Enrichment::Standings {
                    session_id,
                    standings,
                },
            );
        });
    }

    fn game_over(&self, session_id: u64, result: GameResult) {
        let leaderboard = Arc::clone(&self.leaderboard);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let submission = leaderboard.submit(&result);
            Self::post(
                &tx,
                Enrichment::Ranked {
                    session_id,
                    submission,
                },
            );
        });

        let commentator = Arc::clone(&self.commentator);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let text = commentator.summarize(result.score, result.accuracy, result.max_streak);
            Self::post(&tx, Enrichment::Commentary { session_id, text });
        });
    }
}

impl Dispatch for Enricher {
    fn dispatch(&self, job: Job) {
        match job {
            Job::Refresh { session_id } => self.refresh(session_id),
            Job::GameOver { session_id, result } => self.game_over(session_id, result),
        }
    }
}
