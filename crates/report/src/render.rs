//! HTML rendering of a [`Report`] with [upon] templates.
//!
//! The built-in template is embedded at compile time; a template file can
//! replace it. Every value is HTML-escaped on output, and the `filesize`
//! formatter turns a byte count into something readable (`1.5 MiB`).

use crate::Report;
use crate::error::{Error, ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use rust_embed::Embed;
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;
use upon::{Engine, Template};

pub const BUILTIN_TEMPLATE: &str = "report.html";

#[derive(Embed)]
#[folder = "../../assets/templates/"]
struct Builtins;
impl Builtins {
    fn load(name: &str) -> Result<String> {
        let file = Self::get(name).ok_or_raise(|| ErrorKind::AssetNotFound(format!("builtin:{name}")))?;
        String::from_utf8(file.data.into_owned()).or_raise(|| ErrorKind::Template)
    }
}

/// Compiled report template.
pub struct Reporter {
    engine: Engine<'static>,
    template: Template<'static>,
}
impl FromStr for Reporter {
    type Err = Error;

    /// Compiles the given template source; syntax errors surface here rather
    /// than on the first report.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let template = engine.compile(s.to_string()).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template })
    }
}
impl Reporter {
    pub fn builtin() -> Result<Self> {
        Builtins::load(BUILTIN_TEMPLATE)?.parse()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .or_raise(|| ErrorKind::AssetNotFound(path.display().to_string()))?;
        source.parse()
    }

    /// The template file at `path` if given, the built-in template otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::builtin(),
        }
    }

    #[instrument(level = "debug", skip_all, fields(folders = report.folders.len(), files = report.file_count()))]
    pub fn render(&self, report: &Report) -> Result<String> {
        self.template.render(&self.engine, report).to_string().or_raise(|| ErrorKind::Template)
    }
}

mod addons {
    use std::fmt::Write;
    use upon::{Engine, Value, fmt as upon_fmt};

    /// Default formatter: HTML-escapes strings, leaves everything else alone.
    fn escape_html(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => {
                for c in s.chars() {
                    match c {
                        '&' => f.write_str("&amp;")?,
                        '<' => f.write_str("&lt;")?,
                        '>' => f.write_str("&gt;")?,
                        '"' => f.write_str("&quot;")?,
                        '\'' => f.write_str("&#x27;")?,
                        c => f.write_char(c)?,
                    }
                }
            },
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    fn filesize(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::Integer(bytes) if *bytes >= 0 => write!(f, "{}", human_size(bytes.unsigned_abs()))?,
            v => escape_html(f, v)?,
        };
        Ok(())
    }

    pub(crate) fn human_size(bytes: u64) -> String {
        const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];
        if bytes < 1024 {
            return format!("{bytes} B");
        }
        let mut size = bytes as f64 / 1024.0;
        let mut unit = 0;
        while size >= 1024.0 && unit < UNITS.len() - 1 {
            size /= 1024.0;
            unit += 1;
        }
        format!("{size:.1} {}", UNITS[unit])
    }

    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.set_default_formatter(&escape_html);
        engine.add_formatter("filesize", filesize);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::difference;
    use rstest::rstest;

    fn report(has_previous: bool) -> Report {
        Report::new("New <documents>", "fileserver", has_previous, &difference(), |document| {
            if document.title().contains("audyty") {
                vec!["Procedury/PZ nr 1.1.12.0 Audyty.pdf".to_string()]
            } else {
                vec![]
            }
        })
        .unwrap()
    }

    #[rstest]
    #[case(0, "0 B")]
    #[case(1023, "1023 B")]
    #[case(1024, "1.0 KiB")]
    #[case(1_572_864, "1.5 MiB")]
    #[case(5 * 1024 * 1024 * 1024, "5.0 GiB")]
    fn test_human_size(#[case] bytes: u64, #[case] expected: &str) {
        assert_eq!(addons::human_size(bytes), expected);
    }

    #[test]
    fn test_builtin_template_renders() {
        let html = Reporter::builtin().unwrap().render(&report(true)).unwrap();
        assert!(html.contains("<h2>/QA/Procedury</h2>"));
        assert!(html.contains("<h2>/HR</h2>"));
        assert!(html.contains("PZ nr 1.1.11.29 Nadzór nad dokumentacją.pdf"));
        assert!(html.contains("r121"));
        assert!(html.contains("1.5 MiB"));
        assert!(html.contains("<li>fileserver: Procedury/PZ nr 1.1.12.0 Audyty.pdf</li>"));
        assert!(html.contains("Some of them are already published on fileserver"));
    }

    #[test]
    fn test_intro_without_previous() {
        let html = Reporter::builtin().unwrap().render(&report(false)).unwrap();
        assert!(html.contains("None of them is published on fileserver yet"));
        assert!(!html.contains("Some of them are already published"));
    }

    #[test]
    fn test_values_are_escaped() {
        let html = Reporter::builtin().unwrap().render(&report(false)).unwrap();
        assert!(html.contains("<title>New &lt;documents&gt;</title>"));
        assert!(html.contains("Regulamin &lt;pracy&gt; 2.1.1.2.pdf"));
        assert!(!html.contains("<pracy>"));
    }

    #[test]
    fn test_template_file_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.html");
        std::fs::write(&path, "{% for folder in folders %}{{ folder.path }};{% endfor %}").unwrap();
        let html = Reporter::load(Some(&path)).unwrap().render(&report(false)).unwrap();
        assert_eq!(html, "/HR;/QA/Procedury;");
    }

    #[test]
    fn test_invalid_templates() {
        assert!(matches!(&*"{% if %}".parse::<Reporter>().err().unwrap(), ErrorKind::Template));
        let err = Reporter::from_file("/nonexistent/report.html").err().unwrap();
        assert!(matches!(&*err, ErrorKind::AssetNotFound(_)));
    }
}
