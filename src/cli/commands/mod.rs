//! CLI command implementations

pub mod config;
pub mod info;
pub mod serve;

pub use config::execute as config;
pub use info::execute as info;
pub use serve::execute as serve;
