use super::{DocumentId, Symbol, Version};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Identification of a logical document and one specific revision of it.
///
/// Two documents are the *same document* when their normalized `title` and
/// `id` match (see [`same_document`](Self::same_document)); they are *equal*
/// only when their `version` matches too. Equality and hashing cover all
/// three fields, so a `Document` can be used directly as a set member or map
/// key.
///
/// Documents are derived from filenames by [`identify`](crate::identify) and
/// are never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Document {
    title: String,
    id: DocumentId,
    version: Version,
}
impl Document {
    /// Create a document from an already-normalized title and its symbol.
    pub fn new(title: impl Into<String>, symbol: Symbol) -> Self {
        Self {
            title: title.into(),
            id: symbol.id,
            version: symbol.version,
        }
    }

    /// Normalized title: lower-case, punctuation and numeric tokens removed.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn symbol(&self) -> Symbol {
        Symbol { id: self.id, version: self.version }
    }
}
impl AsRef<Document> for Document {
    fn as_ref(&self) -> &Document {
        self
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.title.is_empty() {
            write!(f, "{}", self.symbol())
        } else {
            write!(f, "{} ({})", self.title, self.symbol())
        }
    }
}
