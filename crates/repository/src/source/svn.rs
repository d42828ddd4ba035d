use crate::ListingSource;
use crate::error::{ErrorKind, Result};
use crate::record::ListingRecord;
use async_trait::async_trait;
use exn::ResultExt;
use serde::Deserialize;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::process::Command;
use tracing::instrument;

const SVN_EXECUTABLE: &str = "svn";

/// Lists a Subversion repository with the `svn` command line client.
///
/// Runs `svn list --recursive --xml --non-interactive <url>` and keeps the
/// `kind="file"` entries.
pub struct SvnListing {
    name: String,
    url: String,
    binary: PathBuf,
    credentials: Option<(String, String)>,
}

impl SvnListing {
    /// Create a listing for `url` using an explicit `svn` binary, or the first
    /// one found in `PATH`.
    pub fn new(url: impl Into<String>, binary: Option<PathBuf>) -> Result<Self> {
        let binary = match binary {
            Some(binary) => binary,
            None => which::which(SVN_EXECUTABLE).or_raise(|| ErrorKind::ClientNotFound(SVN_EXECUTABLE.to_string()))?,
        };
        tracing::trace!(svn = %binary.display(), "Using Subversion client");
        Ok(Self {
            name: "svn".to_string(),
            url: url.into(),
            binary,
            credentials: None,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command.args(["list", "--recursive", "--xml", "--non-interactive"]);
        if let Some((username, password)) = &self.credentials {
            command
                .args(["--no-auth-cache", "--username"])
                .arg(username)
                .arg("--password")
                .arg(password);
        }
        command.arg(&self.url).kill_on_drop(true);
        command
    }
}

impl Debug for SvnListing {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SvnListing")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("binary", &self.binary)
            .field("username", &self.credentials.as_ref().map(|(username, _)| username))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ListingSource for SvnListing {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(level = "debug", skip(self), fields(url = %self.url))]
    async fn list(&self) -> Result<Vec<(PathBuf, ListingRecord)>> {
        let output = self
            .command()
            .output()
            .await
            .or_raise(|| ErrorKind::Unavailable(format!("could not run {}", self.binary.display())))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            exn::bail!(ErrorKind::Unavailable(format!("svn exited with {}: {}", output.status, stderr.trim())));
        }
        let xml = String::from_utf8(output.stdout)
            .or_raise(|| ErrorKind::MalformedListing("svn output is not UTF-8".to_string()))?;
        parse_listing(&xml)
    }
}

#[derive(Debug, Deserialize)]
struct Lists {
    #[serde(rename = "list", default)]
    lists: Vec<List>,
}

#[derive(Debug, Deserialize)]
struct List {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(rename = "@kind")]
    kind: String,
    name: String,
    #[serde(default)]
    size: Option<u64>,
    commit: Commit,
}

#[derive(Debug, Deserialize)]
struct Commit {
    #[serde(rename = "@revision")]
    revision: u64,
    #[serde(default)]
    author: String,
    date: String,
}

/// Parses `svn list --xml` output into `(folder, record)` pairs, files only.
pub(crate) fn parse_listing(xml: &str) -> Result<Vec<(PathBuf, ListingRecord)>> {
    let lists: Lists =
        quick_xml::de::from_str(xml).or_raise(|| ErrorKind::MalformedListing("invalid svn list XML".to_string()))?;
    lists
        .lists
        .into_iter()
        .flat_map(|list| list.entries)
        .filter(|entry| entry.kind == "file")
        .map(|entry| {
            let path = Path::new(&entry.name);
            let folder = path.parent().map(Path::to_path_buf).unwrap_or_default();
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            let date = OffsetDateTime::parse(entry.commit.date.trim(), &Rfc3339)
                .or_raise(|| ErrorKind::MalformedListing(format!("invalid commit date for {}", entry.name)))?;
            let record = ListingRecord {
                name,
                author: entry.commit.author,
                commit_revision: entry.commit.revision,
                date,
                size: entry.size.unwrap_or_default(),
            };
            Ok((folder, record))
        })
        .collect()
}
