use crate::error::{ErrorKind, Result};
use docwatch_document::{Document, identify};
use docwatch_storage::BackendHandle;
use exn::ResultExt;
use futures::TryStreamExt;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::instrument;

/// A document file found on the secondary store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryEntry {
    pub folder: PathBuf,
    pub filename: String,
    document: Document,
}
impl SecondaryEntry {
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// `folder/filename`, relative to the store's root.
    pub fn path(&self) -> PathBuf {
        self.folder.join(&self.filename)
    }
}

/// Flat index of the documents on the secondary store.
///
/// Answers two questions about a set of changed repository documents: is any
/// of them already on the store ([`any_particular`](Self::any_particular)),
/// and which stored files are that document or an earlier version of it
/// ([`find`](Self::find)).
#[derive(Debug, Clone, Default)]
pub struct SecondaryIndex {
    name: String,
    entries: Vec<SecondaryEntry>,
}
impl SecondaryIndex {
    /// Walks the whole store. The backend decides which files are documents
    /// (see [`DocumentsOnlyBackend`](docwatch_storage::backend::DocumentsOnlyBackend));
    /// files without a document symbol are skipped.
    #[instrument(level = "debug", skip_all, fields(backend = backend.name()))]
    pub async fn build(backend: &BackendHandle) -> Result<Self> {
        let mut entries = Vec::new();
        let mut stream = backend.list_stream(None);
        while let Some(info) = stream.try_next().await.or_raise(|| ErrorKind::SecondaryUnavailable)? {
            let filename = info.filename();
            let Ok(document) = identify(&filename) else {
                tracing::trace!(path = %info.path.display(), "Skipping file without a document symbol");
                continue;
            };
            entries.push(SecondaryEntry {
                folder: info.folder().to_path_buf(),
                filename,
                document,
            });
        }
        Ok(Self {
            name: backend.name().to_string(),
            entries,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[SecondaryEntry] {
        &self.entries
    }

    /// Paths of every stored file whose document
    /// [precedes](Document::precedes) `document`: the same document at this or
    /// an earlier version, or its direct predecessor.
    pub fn find(&self, document: &Document) -> Vec<PathBuf> {
        self.entries
            .iter()
            .filter(|entry| entry.document.precedes(document))
            .map(SecondaryEntry::path)
            .collect()
    }

    /// Whether any stored file is exactly one of `documents`.
    pub fn any_particular(&self, documents: &HashSet<Document>) -> bool {
        self.entries.iter().any(|entry| documents.contains(&entry.document))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn log(&self) {
        tracing::info!(store = %self.name, files = self.len(), "{} files: {}", self.name, self.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docwatch_storage::backend::{DocumentsOnlyBackend, MockBackend};
    use std::path::Path;
    use std::sync::Arc;

    pub(crate) fn backend(paths: &[&str]) -> BackendHandle {
        let mock = MockBackend::with_files(paths.iter().map(|path| (*path, b"%PDF".to_vec()))).with_name("fileserver");
        Arc::new(DocumentsOnlyBackend::new(Arc::new(mock), ["pdf"]))
    }

    async fn index() -> SecondaryIndex {
        SecondaryIndex::build(&backend(&[
            "Procedury/PZ nr 1.1.11.27 Nadzor nad dokumentacja.pdf",
            "Procedury/PZ nr 1.1.11.28 Nadzor nad dokumentacja.pdf",
            "Procedury/PZ nr 1.1.11.30 Nadzor nad dokumentacja.pdf",
            "Procedury/PZ nr 1.1.10.3 Nadzor nad dokumentacja.pdf",
            "Procedury/PZ nr 1.2.11.27 Audyty.pdf",
            "Procedury/notatka.pdf",
            "Procedury/PZ nr 1.1.11.26 Nadzor nad dokumentacja.docx",
            "Regulamin 2.1.1.1.PDF",
        ]))
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_build_skips_non_documents() {
        let index = index().await;
        assert_eq!(index.name(), "fileserver");
        assert_eq!(index.len(), 6);
        assert!(index.entries().iter().any(|entry| entry.folder == Path::new("Procedury")));
        assert!(index.entries().iter().any(|entry| entry.folder == Path::new("")));
        assert!(!index.entries().iter().any(|entry| entry.filename == "notatka.pdf"));
    }

    #[tokio::test]
    async fn test_find_returns_earlier_versions_only() {
        let index = index().await;
        let current = identify("PZ nr 1.1.11.29 Nadzor nad dokumentacja.pdf").unwrap();
        let mut found = index.find(&current);
        found.sort();
        assert_eq!(
            found,
            [
                PathBuf::from("Procedury/PZ nr 1.1.10.3 Nadzor nad dokumentacja.pdf"),
                PathBuf::from("Procedury/PZ nr 1.1.11.27 Nadzor nad dokumentacja.pdf"),
                PathBuf::from("Procedury/PZ nr 1.1.11.28 Nadzor nad dokumentacja.pdf"),
            ]
        );
    }

    #[tokio::test]
    async fn test_find_unrelated_document() {
        let index = index().await;
        let unrelated = identify("IT 7.1.1.1 Backup.pdf").unwrap();
        assert!(index.find(&unrelated).is_empty());
    }

    #[tokio::test]
    async fn test_any_particular() {
        let index = index().await;
        let stored = identify("PZ nr 1.1.11.28 Nadzor nad dokumentacja.pdf").unwrap();
        let new = identify("PZ nr 1.1.11.29 Nadzor nad dokumentacja.pdf").unwrap();
        assert!(index.any_particular(&HashSet::from([stored, new.clone()])));
        assert!(!index.any_particular(&HashSet::from([new])));
        assert!(!index.any_particular(&HashSet::new()));
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let mock = MockBackend::default().failing();
        let err = SecondaryIndex::build(&(Arc::new(mock) as BackendHandle)).await.unwrap_err();
        assert!(err.is_source_unavailable());
    }
}
