use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use super::{DocumentId, Version};
use crate::error::{Error, ErrorKind};
use exn::ResultExt;

/// The four-part numeric identifier `a.b.c.d` embedded in a filename.
///
/// Components split left to right into the [`DocumentId`] `(a, b)` and the
/// [`Version`] `(c, d)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub id: DocumentId,
    pub version: Version,
}
impl Symbol {
    pub fn new(id: impl Into<DocumentId>, version: impl Into<Version>) -> Self {
        Self { id: id.into(), version: version.into() }
    }
}

impl FromStr for Symbol {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .trim()
            .split('.')
            .map(|part| {
                part.parse::<u32>().or_raise(|| ErrorKind::ParseError {
                    field: "symbol",
                    value: s.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        match parts.as_slice() {
            [id_major, id_minor, ver_major, ver_minor] => {
                Ok(Self::new((*id_major, *id_minor), (*ver_major, *ver_minor)))
            },
            _ => exn::bail!(ErrorKind::ParseError {
                field: "symbol",
                value: format!("expected four components: {s}"),
            }),
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}.{}", self.id, self.version)
    }
}
