use serde::{Deserialize, Serialize};

use crate::clock::GameClock;
use crate::direction::Direction;
use crate::stimulus::{Stimulus, StimulusGenerator, StimulusSource};

/// Points for a correct answer before the streak bonus
pub const BASE_POINTS: u32 = 100;
/// Extra points per answer already in the current streak
pub const STREAK_BONUS: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum GameStatus {
    Idle,
    Playing,
    GameOver,
}

/// What a single arrow press did to the session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputOutcome {
    /// Not playing; nothing changed
    Ignored,
    Correct { gained: u32 },
    Incorrect,
    /// Miss with auto-restart on: a fresh run has begun
    Restarted,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    Ignored,
    Running { remaining: u32 },
    Expired { session_id: u64, result: GameResult },
}

/// Final statistics of a completed run
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub score: u32,
    pub correct: u32,
    pub total: u32,
    pub accuracy: f64,
    pub max_streak: u32,
}

/// Mutable state of the current run
#[derive(Clone, Debug, PartialEq)]
pub struct GameSession {
    pub id: u64,
    pub status: GameStatus,
    pub score: u32,
    pub streak: u32,
    pub max_streak: u32,
    pub correct: u32,
    pub total: u32,
    pub clock: GameClock,
    pub stimulus: Stimulus,
}

impl GameSession {
    fn idle() -> Self {
        Self {
            id: 0,
            status: GameStatus::Idle,
            score: 0,
            streak: 0,
            max_streak: 0,
            correct: 0,
            total: 0,
            clock: GameClock::default(),
            stimulus: Stimulus::default(),
        }
    }

    /// Fraction of correct answers, 0 when nothing was answered
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    pub fn time_remaining(&self) -> u32 {
        self.clock.remaining()
    }

    pub fn result(&self) -> GameResult {
        GameResult {
            score: self.score,
            correct: self.correct,
            total: self.total,
            accuracy: self.accuracy(),
            max_streak: self.max_streak,
        }
    }
}

/// The idle → playing → game over state machine
#[derive(Debug)]
pub struct Game<S: StimulusSource = StimulusGenerator> {
    session: GameSession,
    source: S,
    auto_restart: bool,
}

impl<S: StimulusSource> Game<S> {
    pub fn new(source: S, auto_restart: bool) -> Self {
        Self {
            session: GameSession::idle(),
            source,
            auto_restart,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn status(&self) -> GameStatus {
        self.session.status
    }

    pub fn auto_restart(&self) -> bool {
        self.auto_restart
    }

    pub fn set_auto_restart(&mut self, enabled: bool) {
        self.auto_restart = enabled;
    }

    /// Begins a new run from any state
    pub fn start(&mut self) {
        let id = self.session.id + 1;
        let clock = {
            let mut c = self.session.clock;
            c.reset();
            c
        };
        self.session = GameSession {
            id,
            status: GameStatus::Playing,
            clock,
            stimulus: self.source.next_stimulus(),
            ..GameSession::idle()
        };
    }

    pub fn submit_input(&mut self, direction: Direction) -> InputOutcome {
        if self.session.status != GameStatus::Playing {
            return InputOutcome::Ignored;
        }

        let session = &mut self.session;
        session.total += 1;

        if direction == session.stimulus.center {
            let gained = BASE_POINTS + STREAK_BONUS * session.streak;
            session.correct += 1;
            session.score += gained;
            session.streak += 1;
            session.max_streak = session.max_streak.max(session.streak);
            session.stimulus = self.source.next_stimulus();
            InputOutcome::Correct { gained }
        } else {
            session.streak = 0;
            if self.auto_restart {
                self.start();
                InputOutcome::Restarted
            } else {
                session.stimulus = self.source.next_stimulus();
                InputOutcome::Incorrect
            }
        }
    }

    /// Advances the clock by one second while playing. The tick that reaches
    /// zero ends the run and hands back its result.
    pub fn tick(&mut self) -> TickOutcome {
        if self.session.status != GameStatus::Playing {
            return TickOutcome::Ignored;
        }

        let remaining = self.session.clock.tick();
        if remaining > 0 {
            return TickOutcome::Running { remaining };
        }

        self.session.status = GameStatus::GameOver;
        TickOutcome::Expired {
            session_id: self.session.id,
            result: self.session.result(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::GAME_DURATION_SECS;
    use assert_matches::assert_matches;
    use std::collections::VecDeque;

    /// Hands out a fixed list of stimuli, then repeats the last one
    struct Scripted {
        queue: VecDeque<Stimulus>,
        last: Stimulus,
    }

    impl Scripted {
        fn centers(centers: &[Direction]) -> Self {
            Self {
                queue: centers
                    .iter()
                    .map(|c| Stimulus {
                        center: *c,
                        decoy: *c,
                    })
                    .collect(),
                last: Stimulus::default(),
            }
        }
    }

    impl StimulusSource for Scripted {
        fn next_stimulus(&mut self) -> Stimulus {
            if let Some(s) = self.queue.pop_front() {
                self.last = s;
            }
            self.last
        }
    }

    fn assert_invariants(session: &GameSession) {
        assert!(session.correct <= session.total);
        assert!(session.streak <= session.max_streak);
    }

    #[test]
    fn new_game_is_idle() {
        let game = Game::new(Scripted::centers(&[]), false);
        let session = game.session();
        assert_eq!(session.status, GameStatus::Idle);
        assert_eq!(session.score, 0);
        assert_eq!(session.time_remaining(), GAME_DURATION_SECS);
        assert_eq!(session.accuracy(), 0.0);
    }

    #[test]
    fn start_enters_playing_with_fresh_counters() {
        let mut game = Game::new(Scripted::centers(&[Direction::Left]), false);
        game.start();

        let session = game.session();
        assert_eq!(session.status, GameStatus::Playing);
        assert_eq!(session.id, 1);
        assert_eq!(session.stimulus.center, Direction::Left);
        assert_eq!(session.time_remaining(), GAME_DURATION_SECS);
        assert_eq!((session.score, session.streak, session.total), (0, 0, 0));
    }

    #[test]
    fn five_correct_ups_score_600() {
        let mut game = Game::new(Scripted::centers(&[Direction::Up; 6]), false);
        game.start();

        for _ in 0..5 {
            assert_matches!(
                game.submit_input(Direction::Up),
                InputOutcome::Correct { .. }
            );
            assert_invariants(game.session());
        }

        let session = game.session();
        assert_eq!(session.score, 600);
        assert_eq!(session.max_streak, 5);
        assert_eq!(session.correct, 5);
        assert_eq!(session.total, 5);
    }

    #[test]
    fn consecutive_hits_follow_closed_form() {
        for k in 0..40u32 {
            let mut game = Game::new(Scripted::centers(&[Direction::Right]), false);
            game.start();
            for _ in 0..k {
                game.submit_input(Direction::Right);
            }
            assert_eq!(game.session().score, 100 * k + 5 * k * k.saturating_sub(1));
        }
    }

    #[test]
    fn streak_bonus_uses_streak_before_the_hit() {
        let mut game = Game::new(Scripted::centers(&[Direction::Down]), false);
        game.start();
        assert_eq!(
            game.submit_input(Direction::Down),
            InputOutcome::Correct { gained: 100 }
        );
        assert_eq!(
            game.submit_input(Direction::Down),
            InputOutcome::Correct { gained: 110 }
        );
    }

    #[test]
    fn miss_without_auto_restart_keeps_score_and_resets_streak() {
        let mut game = Game::new(
            Scripted::centers(&[Direction::Up, Direction::Up, Direction::Left]),
            false,
        );
        game.start();

        game.submit_input(Direction::Up);
        assert_eq!(game.submit_input(Direction::Down), InputOutcome::Incorrect);

        let session = game.session();
        assert_eq!(session.status, GameStatus::Playing);
        assert_eq!(session.score, 100);
        assert_eq!(session.streak, 0);
        assert_eq!(session.max_streak, 1);
        assert_eq!((session.correct, session.total), (1, 2));
        assert_eq!(session.stimulus.center, Direction::Left);
        assert_eq!(session.accuracy(), 0.5);
    }

    #[test]
    fn miss_with_auto_restart_is_a_fresh_start() {
        let mut game = Game::new(
            Scripted::centers(&[Direction::Up, Direction::Up, Direction::Right]),
            true,
        );
        game.start();
        game.submit_input(Direction::Up);
        game.tick();
        game.tick();
        let first_id = game.session().id;

        assert_eq!(game.submit_input(Direction::Left), InputOutcome::Restarted);

        let session = game.session();
        assert_eq!(session.status, GameStatus::Playing);
        assert_eq!(session.id, first_id + 1);
        assert_eq!((session.score, session.streak, session.max_streak), (0, 0, 0));
        assert_eq!((session.correct, session.total), (0, 0));
        assert_eq!(session.time_remaining(), GAME_DURATION_SECS);
        assert_eq!(session.stimulus.center, Direction::Right);
    }

    #[test]
    fn inputs_are_ignored_when_idle() {
        let mut game = Game::new(Scripted::centers(&[Direction::Up]), false);
        let before = game.session().clone();
        assert_eq!(game.submit_input(Direction::Up), InputOutcome::Ignored);
        assert_eq!(game.session(), &before);
    }

    #[test]
    fn inputs_and_ticks_are_ignored_after_game_over() {
        let mut game = Game::new(Scripted::centers(&[Direction::Up]), false);
        game.start();
        game.submit_input(Direction::Up);
        for _ in 0..GAME_DURATION_SECS {
            game.tick();
        }
        assert_eq!(game.status(), GameStatus::GameOver);

        let before = game.session().clone();
        assert_eq!(game.submit_input(Direction::Up), InputOutcome::Ignored);
        assert_eq!(game.tick(), TickOutcome::Ignored);
        assert_eq!(game.session(), &before);
    }

    #[test]
    fn clock_does_not_run_while_idle() {
        let mut game = Game::new(Scripted::centers(&[]), false);
        for _ in 0..5 {
            assert_eq!(game.tick(), TickOutcome::Ignored);
        }
        assert_eq!(game.session().time_remaining(), GAME_DURATION_SECS);
    }

    #[test]
    fn thirty_idle_ticks_end_the_game_with_zero_accuracy() {
        let mut game = Game::new(Scripted::centers(&[Direction::Up]), false);
        game.start();

        for i in 1..GAME_DURATION_SECS {
            assert_eq!(
                game.tick(),
                TickOutcome::Running {
                    remaining: GAME_DURATION_SECS - i
                }
            );
        }

        let outcome = game.tick();
        assert_matches!(outcome, TickOutcome::Expired { session_id: 1, result } => {
            assert_eq!(result.score, 0);
            assert_eq!(result.accuracy, 0.0);
            assert_eq!(result.total, 0);
        });
        assert_eq!(game.status(), GameStatus::GameOver);
        assert_eq!(game.session().time_remaining(), 0);
    }

    #[test]
    fn restart_after_game_over_gets_a_new_session_id() {
        let mut game = Game::new(Scripted::centers(&[Direction::Up]), false);
        game.start();
        for _ in 0..GAME_DURATION_SECS {
            game.tick();
        }
        game.start();
        assert_eq!(game.session().id, 2);
        assert_eq!(game.status(), GameStatus::Playing);
        assert_eq!(game.session().time_remaining(), GAME_DURATION_SECS);
    }

    #[test]
    fn invariants_hold_over_random_play() {
        let mut game = Game::new(StimulusGenerator::seeded(5), false);
        let mut presses = StimulusGenerator::seeded(6);
        game.start();
        for step in 0..500 {
            game.submit_input(presses.next().center);
            assert_invariants(game.session());
            if step % 20 == 0 {
                game.tick();
            }
        }
    }
}
