//! Document/Version Comparison

use crate::models::Document;

impl Document {
    /// Same logical document, any revision: title and id match.
    pub fn same_document(&self, other: &Self) -> bool {
        self.title() == other.title() && self.id() == other.id()
    }

    /// Returns `true` if `candidate` is the revision directly after `self`.
    ///
    /// Only the numeric symbol is consulted (the title is ignored): ids must
    /// match, and the candidate version must be the next minor revision or the
    /// first minor revision of the next major, e.g. `1.1.11.29` or `1.1.12.1`
    /// directly follow `1.1.11.28`.
    pub fn is_directly_followed_by(&self, candidate: &Self) -> bool {
        self.id() == candidate.id() && self.version().is_followed_by(&candidate.version())
    }

    /// Returns `true` if `self` is an equal or earlier version of `other`, or
    /// its direct predecessor.
    ///
    /// This is deliberately looser than a total order. Lexicographically later
    /// versions are only accepted for the same document (title and id), while
    /// the one-step successor check only looks at the numbers. Versions more
    /// than one step ahead under a different title are never matched, which
    /// keeps lookups from latching on to unrelated future revisions.
    ///
    /// Not exposed as [`PartialOrd`] because the relation isn't consistent with
    /// [`PartialEq`].
    pub fn precedes(&self, other: &Self) -> bool {
        (self.same_document(other) && self.version() <= other.version()) || self.is_directly_followed_by(other)
    }
}
