//! delve core library
//!
//! Foundational utilities shared by every delve crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, ResearchConfig, SearchConfig};
pub use error::{AppError, AppResult};
