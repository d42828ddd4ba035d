//! The watched repository: listings, files and snapshots.
//!
//! A [`ListingSource`] produces raw `(folder, record)` pairs, a
//! [`DocumentFilter`] decides which of them are tracked documents, and the
//! survivors are grouped into a [`Snapshot`]. The difference between two
//! snapshots is what changed in between.

pub mod error;
mod file;
mod filter;
mod record;
mod snapshot;
pub mod source;

pub use crate::file::RepoFile;
pub use crate::filter::{DEFAULT_EXCLUDE, DEFAULT_EXTENSIONS, DocumentFilter};
pub use crate::record::ListingRecord;
pub use crate::snapshot::{Provenance, Snapshot};
pub use crate::source::ListingSource;
