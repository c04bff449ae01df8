//! Core type definitions for dotsync

mod error;
mod mode;
mod record;

pub use error::{IdentityKind, SyncError};
pub use mode::Mode;
pub use record::{ExtendedSpec, SourceSpec, SyncRecord, SyncSettings};
