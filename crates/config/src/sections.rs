use crate::error::{ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use time::Time;
use time::macros::format_description;

/// Where the repository lives and how to list it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Repository URL, e.g. `https://svn.example.com/docs`.
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Path to the `svn` binary. Looked up in `PATH` when unset.
    pub svn: Option<PathBuf>,
}

/// The secondary file store, walked for existing renditions of documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondaryConfig {
    pub name: String,
    /// Absolute path of the store's root directory (usually a mount point).
    pub root: PathBuf,
}
impl Default for SecondaryConfig {
    fn default() -> Self {
        Self {
            name: "fileserver".to_string(),
            root: PathBuf::new(),
        }
    }
}

/// Which repository files count as documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    pub extensions: Vec<String>,
    /// Folder deny-list, matched case-insensitively as substrings.
    pub exclude: Vec<String>,
}
impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["pdf".to_string()],
            exclude: vec!["/old".to_string(), "archiwum".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// SQLite database file.
    pub database: PathBuf,
    pub key: String,
}
impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            database: crate::default_data_dir()
                .map(|dir| dir.join("docwatch.sqlite"))
                .unwrap_or_else(|| PathBuf::from("docwatch.sqlite")),
            key: "svn_files".to_string(),
        }
    }
}

/// Who gets told about changes, and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub subject: String,
    pub sender: String,
    pub recipients: Vec<String>,
    /// Send mail through the local `sendmail` binary.
    pub sendmail: bool,
    /// Path to the `sendmail` binary. Looked up in `PATH` when unset.
    pub sendmail_binary: Option<PathBuf>,
    /// Directory to keep a copy of every report in.
    pub archive: Option<PathBuf>,
    /// Report template overriding the built-in one.
    pub template: Option<PathBuf>,
}
impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            subject: "New documents in the repository".to_string(),
            sender: String::new(),
            recipients: Vec::new(),
            sendmail: true,
            sendmail_binary: None,
            archive: None,
            template: None,
        }
    }
}

/// When `watch` runs a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub every_hours: u64,
    /// Local time of day, `HH:MM`.
    pub start: String,
    /// Local time of day, `HH:MM`, inclusive.
    pub end: String,
    pub weekdays_only: bool,
}
impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            every_hours: 3,
            start: "06:00".to_string(),
            end: "18:00".to_string(),
            weekdays_only: true,
        }
    }
}
impl ScheduleConfig {
    pub fn start_time(&self) -> Result<Time> {
        parse_time("schedule.start", &self.start)
    }

    pub fn end_time(&self) -> Result<Time> {
        parse_time("schedule.end", &self.end)
    }
}

fn parse_time(field: &'static str, value: &str) -> Result<Time> {
    let format = format_description!("[hour]:[minute]");
    match Time::parse(value.trim(), &format) {
        Ok(time) => Ok(time),
        Err(err) => exn::bail!(ErrorKind::invalid(field, format!("expected HH:MM, found '{value}' ({err})"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::macros::time;

    #[rstest]
    #[case("06:00", time!(6:00))]
    #[case("18:30", time!(18:30))]
    #[case(" 07:05 ", time!(7:05))]
    #[case("00:00", time!(0:00))]
    fn test_parse_time(#[case] input: &str, #[case] expected: Time) {
        assert_eq!(parse_time("schedule.start", input).unwrap(), expected);
    }

    #[rstest]
    #[case("6")]
    #[case("25:00")]
    #[case("06:00:00")]
    #[case("")]
    fn test_parse_time_invalid(#[case] input: &str) {
        let err = parse_time("schedule.start", input).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid { field: "schedule.start", .. }));
    }
}
