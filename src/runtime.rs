use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::enrichment::Enrichment;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    /// Result of background work started at game over
    Enriched(Enrichment),
}

/// Source of app events (keyboard, resize, background results)
pub trait AppEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source: crossterm input plus anything posted through
/// `sender()`
pub struct CrosstermEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) => input_tx.send(AppEvent::Key(key)),
                Ok(CtEvent::Resize(_, _)) => input_tx.send(AppEvent::Resize),
                Ok(_) => Ok(()),
                Err(e) => {
                    log::error!("Terminal input stopped: {e}");
                    break;
                }
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { tx, rx }
    }

    /// Handle for background workers to post their results
    pub fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// The game clock's one second beat
    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl AppEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time. Ticks are
/// scheduled against a deadline so a stream of key presses never delays them.
pub struct Runner<E: AppEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_tick: Instant,
}

impl<E: AppEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let next_tick = Instant::now() + ticker.interval();
        Self {
            event_source,
            ticker,
            next_tick,
        }
    }

    fn advance_deadline(&mut self, now: Instant) {
        self.next_tick += self.ticker.interval();
        if self.next_tick <= now {
            self.next_tick = now + self.ticker.interval();
        }
    }

    /// Restarts the tick schedule from now, so a run that starts mid-interval
    /// still gets a full first second
    pub fn realign(&mut self) {
        self.next_tick = Instant::now() + self.ticker.interval();
    }

    /// Blocks until the next event or the next tick deadline, whichever comes first
    pub fn step(&mut self) -> AppEvent {
        let now = Instant::now();
        if now >= self.next_tick {
            self.advance_deadline(now);
            return AppEvent::Tick;
        }

        match self.event_source.recv_timeout(self.next_tick - now) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => {
                self.advance_deadline(Instant::now());
                AppEvent::Tick
            }
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(self.next_tick.saturating_duration_since(Instant::now()));
                self.advance_deadline(Instant::now());
                AppEvent::Tick
            }
        }
    }
}
