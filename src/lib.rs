// Library surface for the headless engine, the terminal host, and integration tests.
pub mod autoplay;
pub mod celebration;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod snapshot;
pub mod target;
pub mod time_source;
pub mod ui;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::EngineError;
pub use session::Status;
pub use snapshot::{Snapshot, TargetPhase, TargetView};

/// Host event loop cadence, matching the session clock tick
pub const TICK_RATE_MS: u64 = 100;
