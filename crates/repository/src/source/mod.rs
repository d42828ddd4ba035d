//! Repository listing sources.

#[cfg(feature = "mock")]
mod fixed;
mod svn;

#[cfg(feature = "mock")]
pub use self::fixed::StaticListing;
pub use self::svn::SvnListing;

use crate::error::Result;
use crate::filter::DocumentFilter;
use crate::record::ListingRecord;
use crate::snapshot::Snapshot;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::instrument;

/// Anything that can list the files of the repository, recursively.
///
/// Implementations yield every file they see as `(folder, record)`, with the
/// folder relative to the repository root; filtering is the caller's job. Any
/// failure to produce the complete listing is
/// [`Unavailable`](crate::error::ErrorKind::Unavailable).
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Name used for logging.
    fn name(&self) -> &str;

    async fn list(&self) -> Result<Vec<(PathBuf, ListingRecord)>>;

    /// Lists the repository and builds a [`Snapshot`] of the documents in it.
    #[instrument(level = "debug", skip_all, fields(source = self.name()))]
    async fn snapshot(&self, filter: &DocumentFilter) -> Result<Snapshot> {
        let listing = self.list().await?;
        tracing::debug!(entries = listing.len(), "Repository listed");
        Ok(Snapshot::from_listing(listing, filter))
    }
}
