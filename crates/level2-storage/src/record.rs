//! Archive record identity.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, StorageError};

/// Suffix marking a metadata-only record (no radial data).
const METADATA_SUFFIX: &str = "_MDM";

/// Identity of one completed archive record.
///
/// Record names follow the `SITE_YYYYMMDD_HHMMSS_V06[_MDM]` convention
/// (older records use `SITEYYYYMMDD_HHMMSS...`; only the leading
/// site+date+time token is interpreted). Produced by listing the archive
/// bucket; consumed to fetch the record's bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordIdentifier {
    site: String,
    date: NaiveDate,
    name: String,
}

impl RecordIdentifier {
    pub fn new(site: String, date: NaiveDate, name: String) -> Self {
        Self { site, date, name }
    }

    /// Parse an identifier from a full archive key,
    /// `YYYY/MM/DD/SITE/NAME`.
    pub fn from_key(key: &str) -> Result<Self> {
        let malformed = || StorageError::MalformedKey(key.to_string());

        let mut parts = key.split('/');
        let year: i32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(malformed)?;
        let month: u32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(malformed)?;
        let day: u32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(malformed)?;
        let site = parts.next().ok_or_else(malformed)?;
        let name = parts.next().ok_or_else(malformed)?;
        if parts.next().is_some() || name.is_empty() {
            return Err(malformed());
        }

        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(malformed)?;
        Ok(Self::new(site.to_string(), date, name.to_string()))
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Record name, e.g. `KDMX20240309_120000_V06`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Time-of-record parsed from the name's `HHMMSS` token.
    pub fn time(&self) -> Option<NaiveTime> {
        let token = self.name.split('_').nth(1)?;
        NaiveTime::parse_from_str(token, "%H%M%S").ok()
    }

    /// Whether this is a metadata-only record.
    pub fn is_metadata(&self) -> bool {
        self.name.ends_with(METADATA_SUFFIX)
    }

    /// The record's full object key, `YYYY/MM/DD/SITE/NAME`.
    pub fn key(&self) -> String {
        format!("{}/{}", self.prefix(), self.name)
    }

    /// The listing prefix for this record's site and date.
    pub(crate) fn prefix(&self) -> String {
        date_site_prefix(&self.site, self.date)
    }
}

/// Archive listing prefix for a site and date.
pub(crate) fn date_site_prefix(site: &str, date: NaiveDate) -> String {
    format!("{}/{}", date.format("%Y/%m/%d"), site)
}

impl fmt::Display for RecordIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_key() {
        let id = RecordIdentifier::from_key("2024/03/09/KDMX/KDMX20240309_120512_V06").unwrap();
        assert_eq!(id.site(), "KDMX");
        assert_eq!(id.date(), NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(id.name(), "KDMX20240309_120512_V06");
        assert_eq!(
            id.time(),
            Some(NaiveTime::from_hms_opt(12, 5, 12).unwrap())
        );
        assert!(!id.is_metadata());
        assert_eq!(id.key(), "2024/03/09/KDMX/KDMX20240309_120512_V06");
    }

    #[test]
    fn metadata_suffix_is_recognized() {
        let id =
            RecordIdentifier::from_key("2024/03/09/KDMX/KDMX20240309_120512_V06_MDM").unwrap();
        assert!(id.is_metadata());
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(RecordIdentifier::from_key("not-a-key").is_err());
        assert!(RecordIdentifier::from_key("2024/13/40/KDMX/NAME").is_err());
        assert!(RecordIdentifier::from_key("2024/03/09/KDMX/").is_err());
    }
}
