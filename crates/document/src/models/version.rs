use std::fmt::{Display, Formatter, Result as FmtResult};

/// Revision counter of a document: the last two components of `a.b.c.d`.
///
/// Ordering is lexicographic (`major` first, then `minor`). Minor numbering
/// restarts at `1` whenever `major` is bumped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}
impl Version {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Returns `true` if `other` is exactly one step after `self`: either the
    /// next minor revision, or the first minor revision of the next major.
    ///
    /// `1.28 -> 1.29` and `1.28 -> 2.1` are next; `1.1 -> 1.3` is not.
    pub fn is_followed_by(&self, other: &Self) -> bool {
        let next_minor = self.minor.checked_add(1).is_some_and(|minor| other.major == self.major && other.minor == minor);
        let next_major = self.major.checked_add(1).is_some_and(|major| other.major == major && other.minor == 1);
        next_minor || next_major
    }
}
impl From<(u32, u32)> for Version {
    fn from((major, minor): (u32, u32)) -> Self {
        Self::new(major, minor)
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
