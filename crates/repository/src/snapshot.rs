//! Point-in-time view of the repository, grouped by folder.

use crate::file::RepoFile;
use crate::filter::DocumentFilter;
use crate::record::ListingRecord;
use derive_more::Display;
use docwatch_document::Document;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::ops::Sub;
use std::path::{Path, PathBuf};

/// Where a [`Snapshot`] came from, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Provenance {
    #[display("current")]
    Current,
    #[display("memory")]
    Memory,
    #[display("difference")]
    Difference,
}

/// Repository files grouped by the folder that contains them.
///
/// Snapshots built from a listing and snapshots restored from memory are the
/// same structure. Folders are never present without files: reading a folder
/// that isn't there returns an empty slice and leaves the snapshot untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<PathBuf, Vec<RepoFile>>")]
pub struct Snapshot(BTreeMap<PathBuf, Vec<RepoFile>>);

impl From<BTreeMap<PathBuf, Vec<RepoFile>>> for Snapshot {
    fn from(mut folders: BTreeMap<PathBuf, Vec<RepoFile>>) -> Self {
        folders.retain(|_, files| !files.is_empty());
        Self(folders)
    }
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from raw `(folder, record)` listing pairs.
    ///
    /// Entries are skipped, in order, when the filename lacks an accepted
    /// extension, when the folder is excluded, or when the filename carries no
    /// document symbol.
    pub fn from_listing(listing: impl IntoIterator<Item = (PathBuf, ListingRecord)>, filter: &DocumentFilter) -> Self {
        let mut snapshot = Self::new();
        for (folder, record) in listing {
            if !filter.accepts(&folder, &record.name) {
                tracing::trace!(folder = %folder.display(), name = %record.name, "Skipping filtered listing entry");
                continue;
            }
            match RepoFile::try_from(record) {
                Ok(file) => snapshot.insert(folder, file),
                Err(err) if err.is_not_a_document() => {
                    tracing::trace!(folder = %folder.display(), reason = %*err, "Skipping listing entry");
                },
                Err(err) => tracing::debug!(folder = %folder.display(), reason = %*err, "Skipping unparseable listing entry"),
            }
        }
        snapshot
    }

    pub fn insert(&mut self, folder: impl Into<PathBuf>, file: RepoFile) {
        self.0.entry(folder.into()).or_default().push(file);
    }

    /// Files in `folder`, or an empty slice.
    pub fn get(&self, folder: impl AsRef<Path>) -> &[RepoFile] {
        self.0.get(folder.as_ref()).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &[RepoFile])> {
        self.0.iter().map(|(folder, files)| (folder.as_path(), files.as_slice()))
    }

    pub fn files(&self) -> impl Iterator<Item = &RepoFile> {
        self.0.values().flatten()
    }

    /// Files in `self` that `other` does not have in the same folder,
    /// compared by name and revision.
    ///
    /// Folders that end up with nothing are left out, so an empty result
    /// means "no change".
    pub fn difference(&self, other: &Snapshot) -> Snapshot {
        let mut difference = Snapshot::new();
        for (folder, files) in &self.0 {
            let known: HashSet<&RepoFile> = other.get(folder).iter().collect();
            for file in files.iter().filter(|file| !known.contains(file)) {
                difference.insert(folder.clone(), file.clone());
            }
        }
        difference
    }

    /// Every distinct document named anywhere in the snapshot.
    pub fn all_documents(&self) -> HashSet<Document> {
        self.files().map(|file| file.document().clone()).collect()
    }

    pub fn folder_count(&self) -> usize {
        self.0.len()
    }

    pub fn file_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn log(&self, provenance: Provenance) {
        tracing::info!(
            %provenance,
            folders = self.folder_count(),
            files = self.file_count(),
            "{provenance}: {} folders, {} files total",
            self.folder_count(),
            self.file_count(),
        );
    }
}

impl Sub for &Snapshot {
    type Output = Snapshot;
    fn sub(self, rhs: &Snapshot) -> Snapshot {
        self.difference(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::tests::{record, repo_file};

    fn snapshot(entries: &[(&str, &str, u64)]) -> Snapshot {
        let mut snapshot = Snapshot::new();
        for (folder, name, revision) in entries {
            snapshot.insert(*folder, repo_file(name, *revision));
        }
        snapshot
    }

    #[test]
    fn test_get_missing_folder_does_not_insert() {
        let snapshot = snapshot(&[("QA", "a 1.1.1.1.pdf", 1)]);
        assert!(snapshot.get("HR").is_empty());
        assert_eq!(snapshot.folder_count(), 1);
        assert_eq!(snapshot.get("QA").len(), 1);
    }

    #[test]
    fn test_difference_with_itself_is_empty() {
        let a = snapshot(&[("QA", "a 1.1.1.1.pdf", 1), ("HR", "b 2.1.1.1.pdf", 2)]);
        assert!((&a - &a).is_empty());
    }

    #[test]
    fn test_difference_keeps_new_files() {
        let a = snapshot(&[("f", "f1 1.1.1.1.pdf", 1), ("f", "f2 1.1.2.1.pdf", 1)]);
        let b = snapshot(&[("f", "f1 1.1.1.1.pdf", 1)]);
        assert_eq!(&a - &b, snapshot(&[("f", "f2 1.1.2.1.pdf", 1)]));
    }

    #[test]
    fn test_difference_keeps_recommitted_files() {
        let a = snapshot(&[("f", "f1 1.1.1.1.pdf", 2)]);
        let b = snapshot(&[("f", "f1 1.1.1.1.pdf", 1)]);
        let diff = &a - &b;
        assert_eq!(diff, snapshot(&[("f", "f1 1.1.1.1.pdf", 2)]));
        assert_eq!(diff.get("f")[0].commit_revision, 2);
    }

    #[test]
    fn test_difference_folders() {
        let a = snapshot(&[("only-a", "x 1.1.1.1.pdf", 1), ("both", "y 1.1.1.1.pdf", 1)]);
        let b = snapshot(&[("only-b", "z 1.1.1.1.pdf", 1), ("both", "y 1.1.1.1.pdf", 1)]);
        let diff = &a - &b;
        assert_eq!(diff, snapshot(&[("only-a", "x 1.1.1.1.pdf", 1)]));
        // Same filename in another folder is a different file.
        let moved = snapshot(&[("elsewhere", "y 1.1.1.1.pdf", 1)]);
        assert_eq!(&moved - &b, moved);
    }

    #[test]
    fn test_all_documents_and_counts() {
        let a = snapshot(&[
            ("QA", "Report 1.1.1.1.pdf", 1),
            ("QA", "nr 1.1.1.1 Report.pdf", 2),
            ("HR", "Manual 2.1.1.1.pdf", 3),
        ]);
        assert_eq!(a.folder_count(), 2);
        assert_eq!(a.file_count(), 3);
        assert_eq!(a.all_documents().len(), 2);
    }

    #[test]
    fn test_from_listing_filters() {
        let listing = vec![
            (PathBuf::from("QA"), record("Report 1.1.1.1.pdf", 1)),
            (PathBuf::from("QA"), record("Report 1.1.1.2.docx", 2)),
            (PathBuf::from("QA/old"), record("Report 1.1.1.0.pdf", 3)),
            (PathBuf::from("QA/Archiwum"), record("Report 1.1.0.9.pdf", 4)),
            (PathBuf::from("QA"), record("Notes.pdf", 5)),
            (PathBuf::from(""), record("Root 9.9.9.9.PDF", 6)),
        ];
        let snapshot = Snapshot::from_listing(listing, &DocumentFilter::default());
        assert_eq!(snapshot.folder_count(), 2);
        assert_eq!(snapshot.get("QA").len(), 1);
        assert_eq!(snapshot.get("QA")[0].name, "Report 1.1.1.1.pdf");
        assert_eq!(snapshot.get("")[0].commit_revision, 6);
    }

    #[test]
    fn test_serde_round_trip() {
        let a = snapshot(&[("QA/Procedures", "a 1.1.1.1.pdf", 1), ("", "b 2.1.1.1.pdf", 2)]);
        let json = serde_json::to_string(&a).unwrap();
        let restored: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, a);
        for ((folder_a, files_a), (folder_b, files_b)) in a.iter().zip(restored.iter()) {
            assert_eq!(folder_a, folder_b);
            assert_eq!(files_a.len(), files_b.len());
            for (x, y) in files_a.iter().zip(files_b) {
                assert_eq!((x.date, x.size, &x.author), (y.date, y.size, &y.author));
            }
        }
    }

    #[test]
    fn test_deserialize_drops_empty_folders() {
        let json = r#"{"QA": [], "HR": [{"name":"b 2.1.1.1.pdf","author":"x","commit_revision":2,"date":"2024-01-01T00:00:00Z","size":1}]}"#;
        let restored: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(restored.folder_count(), 1);
    }
}
