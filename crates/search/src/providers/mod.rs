//! Search provider implementations.

pub mod exa;
pub mod searxng;

pub use exa::ExaProvider;
pub use searxng::SearxngProvider;
