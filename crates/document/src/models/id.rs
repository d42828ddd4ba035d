use std::fmt::{Display, Formatter, Result as FmtResult};

/// Which document a symbol refers to, ignoring its revision: the first two
/// components of `a.b.c.d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId {
    pub major: u32,
    pub minor: u32,
}
impl DocumentId {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}
impl From<(u32, u32)> for DocumentId {
    fn from((major, minor): (u32, u32)) -> Self {
        Self::new(major, minor)
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
