use crate::record::ListingRecord;
use docwatch_document::{Document, error::Result as DocumentResult, identify};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::hash::{Hash, Hasher};
use time::OffsetDateTime;

/// A single file in the repository, together with the document it names.
///
/// Two `RepoFile`s are equal when they share a filename and the revision that
/// last committed them; author, date and size are informational. A file that
/// was recommitted is therefore a *different* file, even if only its content
/// changed.
#[derive(Debug, Clone)]
pub struct RepoFile {
    pub name: String,
    pub author: String,
    pub commit_revision: u64,
    pub date: OffsetDateTime,
    pub size: u64,
    document: Document,
}
impl RepoFile {
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn to_record(&self) -> ListingRecord {
        ListingRecord {
            name: self.name.clone(),
            author: self.author.clone(),
            commit_revision: self.commit_revision,
            date: self.date,
            size: self.size,
        }
    }
}

impl TryFrom<ListingRecord> for RepoFile {
    type Error = docwatch_document::error::Error;

    /// Fails with [`NotADocument`](docwatch_document::error::ErrorKind::NotADocument)
    /// when the filename carries no symbol.
    fn try_from(record: ListingRecord) -> DocumentResult<Self> {
        let document = identify(&record.name)?;
        Ok(Self {
            name: record.name,
            author: record.author,
            commit_revision: record.commit_revision,
            date: record.date,
            size: record.size,
            document,
        })
    }
}

impl PartialEq for RepoFile {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.commit_revision == other.commit_revision
    }
}
impl Eq for RepoFile {}
impl Hash for RepoFile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.commit_revision.hash(state);
    }
}

// Persisted as the plain listing record; the document is derived again on
// the way back in.
impl Serialize for RepoFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_record().serialize(serializer)
    }
}
impl<'de> Deserialize<'de> for RepoFile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = ListingRecord::deserialize(deserializer)?;
        RepoFile::try_from(record).map_err(|err| serde::de::Error::custom(&*err))
    }
}
