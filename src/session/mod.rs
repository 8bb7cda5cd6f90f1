//! Session tracking for open render surfaces

pub mod registry;
pub mod state;

pub use registry::SessionRegistry;
pub use state::{SaveReply, SaveTicket, SessionEntry, SessionInfo, SurfaceHandle};
