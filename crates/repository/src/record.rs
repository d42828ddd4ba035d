use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One raw entry of a repository listing, as reported by the listing source.
///
/// `name` is the bare filename; the containing folder travels alongside the
/// record (see [`ListingSource`](crate::ListingSource)). Unknown fields are
/// ignored when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub name: String,
    #[serde(default)]
    pub author: String,
    pub commit_revision: u64,
    #[serde(with = "rfc3339")]
    pub date: OffsetDateTime,
    #[serde(default)]
    pub size: u64,
}

/// RFC 3339 (de)serialization for [`OffsetDateTime`].
pub(crate) mod rfc3339 {
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;
    use time::format_description::well_known::Rfc3339;

    pub fn serialize<S: Serializer>(date: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        let formatted = date.format(&Rfc3339).map_err(S::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        OffsetDateTime::parse(raw.trim(), &Rfc3339).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_unknown_fields_are_ignored() {
        let json = r#"{
            "name": "PZ nr 1.1.1.1.pdf",
            "author": "jkowalski",
            "commit_revision": 42,
            "date": "2024-03-01T09:30:00.123456Z",
            "size": 1024,
            "kind": "file",
            "is_directory": false
        }"#;
        let record: ListingRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name, "PZ nr 1.1.1.1.pdf");
        assert_eq!(record.commit_revision, 42);
        assert_eq!(record.date, datetime!(2024-03-01 09:30:00.123456 UTC));
        assert_eq!(record.size, 1024);
    }

    #[test]
    fn test_date_is_rfc3339() {
        let record = ListingRecord {
            name: "a 1.1.1.1.pdf".to_string(),
            author: String::new(),
            commit_revision: 1,
            date: datetime!(2024-03-01 09:30:00 +01:00),
            size: 0,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2024-03-01T09:30:00+01:00");
    }
}
