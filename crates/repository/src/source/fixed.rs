use crate::ListingSource;
use crate::error::{ErrorKind, Result};
use crate::record::ListingRecord;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// A listing source that returns a fixed set of records, for tests.
///
/// The records can be replaced between passes with [`set`](Self::set), and
/// the source can be taken offline with [`set_available`](Self::set_available).
#[derive(Default)]
pub struct StaticListing {
    records: RwLock<Vec<(PathBuf, ListingRecord)>>,
    unavailable: AtomicBool,
}

impl StaticListing {
    pub fn new(records: impl IntoIterator<Item = (impl Into<PathBuf>, ListingRecord)>) -> Self {
        let listing = Self::default();
        listing.set(records);
        listing
    }

    pub fn set(&self, records: impl IntoIterator<Item = (impl Into<PathBuf>, ListingRecord)>) {
        let records = records.into_iter().map(|(folder, record)| (folder.into(), record)).collect();
        match self.records.write() {
            Ok(mut guard) => *guard = records,
            Err(poisoned) => *poisoned.into_inner() = records,
        }
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }
}

#[async_trait]
impl ListingSource for StaticListing {
    fn name(&self) -> &str {
        "static"
    }

    async fn list(&self) -> Result<Vec<(PathBuf, ListingRecord)>> {
        if self.unavailable.load(Ordering::SeqCst) {
            exn::bail!(ErrorKind::Unavailable("static listing is offline".to_string()));
        }
        let records = match self.records.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        Ok(records)
    }
}
