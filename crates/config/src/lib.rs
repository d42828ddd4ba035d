//! Layered configuration.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. built-in defaults,
//! 2. a configuration file: the one passed explicitly, or `docwatch.toml` in
//!    the platform configuration directory if it exists (`.yaml`, `.yml` and
//!    `.json` files are read as such, anything else as TOML),
//! 3. environment variables prefixed with `DOCWATCH_`, nested with `__`
//!    (`DOCWATCH_REPOSITORY__URL`, `DOCWATCH_NOTIFY__RECIPIENTS='["a@example.com"]'`).

pub mod error;
mod sections;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
pub use sections::{DocumentsConfig, MemoryConfig, NotifyConfig, RepositoryConfig, ScheduleConfig, SecondaryConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "DOCWATCH_";
pub const CONFIG_FILENAME: &str = "docwatch.toml";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "docwatch")
}

/// Platform data directory, where the memory database lives by default.
pub fn default_data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// `docwatch.toml` in the platform configuration directory.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub repository: RepositoryConfig,
    pub secondary: SecondaryConfig,
    pub documents: DocumentsConfig,
    pub memory: MemoryConfig,
    pub notify: NotifyConfig,
    pub schedule: ScheduleConfig,
}

impl Config {
    /// Merge all sources without extracting or validating anything.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        match path {
            Some(path) if !path.exists() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading configuration file");
                figment = Self::merge_file(figment, path);
            },
            None => match default_config_path().filter(|path| path.exists()) {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "Loading default configuration file");
                    figment = Self::merge_file(figment, &path);
                },
                None => tracing::debug!("No configuration file; using defaults and environment"),
            },
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    fn merge_file(figment: Figment, path: &Path) -> Figment {
        match path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
            Some("json") => figment.merge(Json::file(path)),
            _ => figment.merge(Toml::file(path)),
        }
    }

    /// Load and validate the configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Config = Self::figment(path)?.extract().or_raise(|| ErrorKind::Extract)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks everything a pass needs up front, so that a bad value fails at
    /// start-up rather than hours later in `watch`.
    pub fn validate(&self) -> Result<()> {
        if self.repository.url.trim().is_empty() {
            exn::bail!(ErrorKind::invalid("repository.url", "must be set"));
        }
        if self.repository.password.is_some() && self.repository.username.is_none() {
            exn::bail!(ErrorKind::invalid("repository.username", "must be set when a password is given"));
        }
        if !self.secondary.root.is_absolute() {
            exn::bail!(ErrorKind::invalid(
                "secondary.root",
                format!("must be an absolute path, found '{}'", self.secondary.root.display())
            ));
        }
        if self.documents.extensions.iter().all(|ext| ext.trim_start_matches('.').trim().is_empty()) {
            exn::bail!(ErrorKind::invalid("documents.extensions", "at least one extension is required"));
        }
        if self.memory.key.trim().is_empty() {
            exn::bail!(ErrorKind::invalid("memory.key", "must not be empty"));
        }
        if !self.notify.sendmail && self.notify.archive.is_none() {
            exn::bail!(ErrorKind::invalid("notify", "enable sendmail or set an archive directory"));
        }
        if self.notify.sendmail {
            if self.notify.sender.trim().is_empty() {
                exn::bail!(ErrorKind::invalid("notify.sender", "must be set when sendmail is enabled"));
            }
            if self.notify.recipients.is_empty() {
                exn::bail!(ErrorKind::invalid("notify.recipients", "at least one recipient is required"));
            }
        }
        if let Some(address) = self.notify.recipients.iter().chain([&self.notify.sender]).find(|a| {
            let address = a.trim();
            !address.is_empty() && (!address.contains('@') || address.contains(['\r', '\n']))
        }) {
            exn::bail!(ErrorKind::invalid("notify.recipients", format!("not an email address: '{address}'")));
        }
        if let Some(archive) = self.notify.archive.as_deref().filter(|archive| !archive.is_absolute()) {
            exn::bail!(ErrorKind::invalid(
                "notify.archive",
                format!("must be an absolute path, found '{}'", archive.display())
            ));
        }
        if self.schedule.every_hours == 0 {
            exn::bail!(ErrorKind::invalid("schedule.every_hours", "must be at least 1"));
        }
        let (start, end) = (self.schedule.start_time()?, self.schedule.end_time()?);
        if start > end {
            exn::bail!(ErrorKind::invalid("schedule.end", "must not be earlier than schedule.start"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    const MINIMAL: &str = r#"
        [repository]
        url = "https://svn.example.com/docs"

        [secondary]
        root = "/mnt/fileserver/phocadownload"

        [notify]
        sender = "docwatch@example.com"
        recipients = ["qa@example.com"]
    "#;

    fn load(path: &str) -> figment::error::Result<Config> {
        Config::load(Some(Path::new(path))).map_err(|err| figment::Error::from(err.to_string()))
    }

    fn invalid_field(path: &str) -> &'static str {
        match &*Config::load(Some(Path::new(path))).unwrap_err() {
            ErrorKind::Invalid { field, .. } => *field,
            other => panic!("expected an invalid field, got {other}"),
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.documents.extensions, ["pdf"]);
        assert_eq!(config.documents.exclude, ["/old", "archiwum"]);
        assert_eq!(config.memory.key, "svn_files");
        assert_eq!(config.schedule.every_hours, 3);
        assert_eq!((config.schedule.start.as_str(), config.schedule.end.as_str()), ("06:00", "18:00"));
        assert!(config.schedule.weekdays_only);
        assert!(config.notify.sendmail);
        // Nothing to watch without a repository.
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("docwatch.toml", MINIMAL)?;
            let config = load("docwatch.toml")?;
            assert_eq!(config.repository.url, "https://svn.example.com/docs");
            assert_eq!(config.secondary.root, Path::new("/mnt/fileserver/phocadownload"));
            assert_eq!(config.secondary.name, "fileserver");
            assert_eq!(config.notify.recipients, ["qa@example.com"]);
            assert_eq!(config.documents, DocumentsConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("docwatch.toml", MINIMAL)?;
            jail.set_env("DOCWATCH_REPOSITORY__USERNAME", "reader");
            jail.set_env("DOCWATCH_REPOSITORY__PASSWORD", "s3cret");
            jail.set_env("DOCWATCH_NOTIFY__RECIPIENTS", r#"["qa@example.com", "hr@example.com"]"#);
            jail.set_env("DOCWATCH_SCHEDULE__EVERY_HOURS", "1");
            let config = load("docwatch.toml")?;
            assert_eq!(config.repository.username.as_deref(), Some("reader"));
            assert_eq!(config.repository.password.as_deref(), Some("s3cret"));
            assert_eq!(config.notify.recipients, ["qa@example.com", "hr@example.com"]);
            assert_eq!(config.schedule.every_hours, 1);
            Ok(())
        });
    }

    #[test]
    fn test_yaml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "docwatch.yaml",
                r#"
                repository:
                  url: https://svn.example.com/docs
                secondary:
                  root: /srv/files
                notify:
                  sendmail: false
                  archive: /var/lib/docwatch/reports
                "#,
            )?;
            let config = load("docwatch.yaml")?;
            assert!(!config.notify.sendmail);
            assert_eq!(config.notify.archive.as_deref(), Some(Path::new("/var/lib/docwatch/reports")));
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        Jail::expect_with(|_jail| {
            let err = Config::load(Some(Path::new("missing.toml"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::NotFound(_)));
            Ok(())
        });
    }

    #[test]
    fn test_validation() {
        Jail::expect_with(|jail| {
            jail.create_file("no-url.toml", "[secondary]\nroot = \"/srv\"")?;
            assert_eq!(invalid_field("no-url.toml"), "repository.url");

            jail.create_file("relative.toml", &MINIMAL.replace("/mnt/fileserver/phocadownload", "files"))?;
            assert_eq!(invalid_field("relative.toml"), "secondary.root");

            jail.create_file("no-recipients.toml", &MINIMAL.replace(r#"["qa@example.com"]"#, "[]"))?;
            assert_eq!(invalid_field("no-recipients.toml"), "notify.recipients");

            jail.create_file("bad-recipient.toml", &MINIMAL.replace("qa@example.com", "qa"))?;
            assert_eq!(invalid_field("bad-recipient.toml"), "notify.recipients");

            jail.create_file("archive.toml", &format!("{MINIMAL}archive = \"reports\""))?;
            assert_eq!(invalid_field("archive.toml"), "notify.archive");

            jail.create_file("backwards.toml", &format!("{MINIMAL}\n[schedule]\nstart = \"18:00\"\nend = \"06:00\""))?;
            assert_eq!(invalid_field("backwards.toml"), "schedule.end");

            jail.create_file("silent.toml", &format!("{MINIMAL}sendmail = false"))?;
            assert_eq!(invalid_field("silent.toml"), "notify");

            jail.create_file("never.toml", &format!("{MINIMAL}\n[schedule]\nevery_hours = 0"))?;
            assert_eq!(invalid_field("never.toml"), "schedule.every_hours");
            Ok(())
        });
    }
}
