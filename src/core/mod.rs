//! Core module - application infrastructure around the engine
//!
//! - [`error`] - [`AppError`] and [`AppResult`]
//! - [`settings_persistence`] - loading and saving [`chopsticks_engine::EngineConfig`]
//! - [`logging`] - `tracing` subscriber setup

pub mod error;
pub mod logging;
pub mod settings_persistence;

pub use error::{AppError, AppResult};
pub use logging::init_logging;
pub use settings_persistence::{default_settings_path, load_config, read_config, save_config};
