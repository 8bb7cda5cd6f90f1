//! Save handshake between host and render surface

mod coordinator;

pub use coordinator::{SaveCoordinator, DEFAULT_SAVE_TIMEOUT};
