//! Open documents and where their bytes come from

pub mod access;
pub mod source;

pub use access::{DocumentAccess, SizeGuard};
pub use source::{DocumentId, DocumentSource, DEFAULT_IN_MEMORY_NAME};
