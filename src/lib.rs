pub mod cli;
pub mod core;

pub use crate::core::{AppError, AppResult};
