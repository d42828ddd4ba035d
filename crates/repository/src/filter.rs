use std::path::Path;

pub const DEFAULT_EXTENSIONS: &[&str] = &["pdf"];
pub const DEFAULT_EXCLUDE: &[&str] = &["/old", "archiwum"];

/// Decides which listing entries are documents worth tracking.
///
/// - `extensions`: accepted filename extensions, case-insensitive.
/// - `exclude`: folder deny-list; a folder is excluded when its lower-cased
///   path, with a leading `/`, contains any of the patterns. `/old` therefore
///   matches `QA/old/` and `QA/Older` but not `Gold`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFilter {
    extensions: Vec<String>,
    exclude: Vec<String>,
}
impl Default for DocumentFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS.iter().copied(), DEFAULT_EXCLUDE.iter().copied())
    }
}
impl DocumentFilter {
    pub fn new(
        extensions: impl IntoIterator<Item = impl Into<String>>,
        exclude: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.into().trim_start_matches('.').to_lowercase())
                .collect(),
            exclude: exclude.into_iter().map(|pattern| pattern.into().to_lowercase()).collect(),
        }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    pub fn is_document_name(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
    }

    pub fn is_excluded_folder(&self, folder: &Path) -> bool {
        let folder = folder.to_string_lossy().to_lowercase();
        let folder = if folder.starts_with('/') { folder } else { format!("/{folder}") };
        self.exclude.iter().any(|pattern| folder.contains(pattern.as_str()))
    }

    pub fn accepts(&self, folder: &Path, name: &str) -> bool {
        self.is_document_name(name) && !self.is_excluded_folder(folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a 1.1.1.1.pdf", true)]
    #[case("A 1.1.1.1.PDF", true)]
    #[case("a 1.1.1.1.docx", false)]
    #[case("a 1.1.1.1", false)]
    #[case("a.pdf.bak", false)]
    fn test_is_document_name(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(DocumentFilter::default().is_document_name(name), expected);
    }

    #[rstest]
    #[case("QA/Procedures", false)]
    #[case("", false)]
    #[case("old", true)]
    #[case("QA/old", true)]
    #[case("QA/OLD/2019", true)]
    #[case("QA/Older", true)]
    #[case("Gold", false)]
    #[case("QA/Archiwum 2020", true)]
    #[case("/QA/archiwum", true)]
    fn test_is_excluded_folder(#[case] folder: &str, #[case] expected: bool) {
        assert_eq!(DocumentFilter::default().is_excluded_folder(Path::new(folder)), expected);
    }

    #[test]
    fn test_custom_lists() {
        let filter = DocumentFilter::new([".DOCX", "pdf"], ["Draft"]);
        assert_eq!(filter.extensions(), ["docx", "pdf"]);
        assert!(filter.accepts(Path::new("QA/old"), "a.docx"));
        assert!(!filter.accepts(Path::new("QA/drafts"), "a.pdf"));
        assert!(!filter.accepts(Path::new("QA"), "a.txt"));
    }
}
