use crate::error::{ErrorKind, Result};
use docwatch_document::Document;
use docwatch_repository::{RepoFile, Snapshot};
use exn::ResultExt;
use serde::Serialize;
use std::path::Path;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Everything the report template gets to see.
///
/// | Variable                       | Description                                        |
/// |--------------------------------|----------------------------------------------------|
/// | `subject`                      | Message subject                                    |
/// | `secondary`                    | Name of the secondary store                        |
/// | `has_previous`                 | A changed document is already on the secondary store |
/// | `generated`                    | When the report was rendered (UTC)                 |
/// | `folders[].path`               | Repository folder, starting with `/`               |
/// | `folders[].files[].name`       | File name                                          |
/// | `folders[].files[].revision`   | Last commit revision                               |
/// | `folders[].files[].author`     | Last commit author                                 |
/// | `folders[].files[].date`       | Last commit date (UTC)                             |
/// | `folders[].files[].size`       | Size in bytes (use the `filesize` formatter)       |
/// | `folders[].files[].previous`   | Secondary-store paths of this or earlier versions  |
/// | `folders[].files[].has_previous` | `previous` is not empty                          |
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub subject: String,
    pub secondary: String,
    pub has_previous: bool,
    pub generated: String,
    pub folders: Vec<FolderChanges>,
}
impl Report {
    /// Build the report for `difference`, asking `lookup` for the
    /// secondary-store paths related to each changed document.
    pub fn new(
        subject: impl Into<String>,
        secondary: impl Into<String>,
        has_previous: bool,
        difference: &Snapshot,
        lookup: impl Fn(&Document) -> Vec<String>,
    ) -> Result<Self> {
        let folders = difference
            .iter()
            .map(|(folder, files)| FolderChanges::new(folder, files, &lookup))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            subject: subject.into(),
            secondary: secondary.into(),
            has_previous,
            generated: timestamp(OffsetDateTime::now_utc())?,
            folders,
        })
    }

    pub fn file_count(&self) -> usize {
        self.folders.iter().map(|folder| folder.files.len()).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderChanges {
    pub path: String,
    pub files: Vec<ChangedFile>,
}
impl FolderChanges {
    fn new(folder: &Path, files: &[RepoFile], lookup: &impl Fn(&Document) -> Vec<String>) -> Result<Self> {
        Ok(Self {
            path: format!("/{}", folder.display()),
            files: files.iter().map(|file| ChangedFile::new(file, lookup)).collect::<Result<_>>()?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangedFile {
    pub name: String,
    pub revision: u64,
    pub author: String,
    pub date: String,
    pub size: u64,
    pub previous: Vec<String>,
    pub has_previous: bool,
}
impl ChangedFile {
    fn new(file: &RepoFile, lookup: &impl Fn(&Document) -> Vec<String>) -> Result<Self> {
        let previous = lookup(file.document());
        Ok(Self {
            name: file.name.clone(),
            revision: file.commit_revision,
            author: file.author.clone(),
            date: timestamp(file.date)?,
            size: file.size,
            has_previous: !previous.is_empty(),
            previous,
        })
    }
}

fn timestamp(date: OffsetDateTime) -> Result<String> {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute] UTC");
    date.to_offset(UtcOffset::UTC).format(&format).or_raise(|| ErrorKind::Template)
}
