// Library surface for headless/integration tests and reuse.
// The binary in main.rs only wires terminal, config and logging around it.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod commentary;
pub mod direction;
pub mod enrichment;
pub mod error;
pub mod game;
pub mod history;
pub mod ranking;
pub mod runtime;
pub mod settings;
pub mod stimulus;
pub mod ui;
