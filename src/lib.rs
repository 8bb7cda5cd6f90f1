//! pdf-preview - PDF preview host
//!
//! Serves document bytes to an isolated render surface with an LRU cache,
//! coalesced reads and a timed save handshake.

pub mod cache;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod host;
pub mod save;
pub mod session;
pub mod storage;
pub mod transport;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use error::{PreviewError, PreviewResult};
