//! Realtime chunk identity and payloads.

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use level2_common::VolumeIndex;

use crate::error::ReassemblyError;

/// Position of a chunk within its volume's transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChunkRole {
    Start,
    Intermediate,
    End,
}

impl ChunkRole {
    fn from_token(token: char) -> Option<Self> {
        match token {
            'S' => Some(ChunkRole::Start),
            'I' => Some(ChunkRole::Intermediate),
            'E' => Some(ChunkRole::End),
            _ => None,
        }
    }
}

/// Identity of one realtime chunk.
///
/// The sequence name is the feed's `YYYYMMDD-HHMMSS-NNN-R` token:
/// timestamp, 1-based sequence number, and role letter. Lexicographic
/// order on the name is transmission order by construction of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkIdentifier {
    site: String,
    volume: VolumeIndex,
    name: String,
}

impl ChunkIdentifier {
    pub fn new(site: String, volume: VolumeIndex, name: String) -> Self {
        Self { site, volume, name }
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn volume(&self) -> VolumeIndex {
        self.volume
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 1-based position within the volume, parsed from the name.
    pub fn sequence(&self) -> Result<u16, ReassemblyError> {
        self.name
            .split('-')
            .nth(2)
            .and_then(|s| s.parse::<u16>().ok())
            .ok_or_else(|| ReassemblyError::InvalidChunkName(self.name.clone()))
    }

    /// Role parsed from the name's trailing token.
    pub fn role(&self) -> Result<ChunkRole, ReassemblyError> {
        self.name
            .chars()
            .last()
            .and_then(ChunkRole::from_token)
            .ok_or_else(|| ReassemblyError::InvalidChunkName(self.name.clone()))
    }

    /// Upload timestamp parsed from the name's date/time tokens.
    pub fn date_time(&self) -> Option<DateTime<Utc>> {
        let mut parts = self.name.split('-');
        let date = NaiveDate::parse_from_str(parts.next()?, "%Y%m%d").ok()?;
        let time = NaiveTime::parse_from_str(parts.next()?, "%H%M%S").ok()?;
        Some(Utc.from_utc_datetime(&date.and_time(time)))
    }
}

impl fmt::Display for ChunkIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.site, self.volume, self.name)
    }
}

/// A chunk identifier plus its raw compressed payload.
///
/// The reassembler only reads chunks; ownership stays with the caller.
#[derive(Debug, Clone)]
pub struct Chunk {
    id: ChunkIdentifier,
    payload: Bytes,
}

impl Chunk {
    pub fn new(id: ChunkIdentifier, payload: Bytes) -> Self {
        Self { id, payload }
    }

    pub fn id(&self) -> &ChunkIdentifier {
        &self.id
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn id(name: &str) -> ChunkIdentifier {
        ChunkIdentifier::new(
            "KDMX".to_string(),
            VolumeIndex::new(42).unwrap(),
            name.to_string(),
        )
    }

    #[test]
    fn parses_sequence_and_role() {
        let chunk = id("20240309-120000-001-S");
        assert_eq!(chunk.sequence().unwrap(), 1);
        assert_eq!(chunk.role().unwrap(), ChunkRole::Start);

        let chunk = id("20240309-120301-014-E");
        assert_eq!(chunk.sequence().unwrap(), 14);
        assert_eq!(chunk.role().unwrap(), ChunkRole::End);
    }

    #[test]
    fn parses_timestamp() {
        let chunk = id("20240309-120301-014-I");
        let time = chunk.date_time().unwrap();
        assert_eq!(time.hour(), 12);
        assert_eq!(time.minute(), 3);
    }

    #[test]
    fn malformed_names_are_rejected() {
        assert!(id("garbage").sequence().is_err());
        assert!(id("20240309-120000-001-X").role().is_err());
    }

    #[test]
    fn names_sort_in_transmission_order() {
        let mut names = vec![
            "20240309-120301-003-I",
            "20240309-120000-001-S",
            "20240309-120100-002-I",
        ];
        names.sort();
        assert_eq!(
            names,
            vec![
                "20240309-120000-001-S",
                "20240309-120100-002-I",
                "20240309-120301-003-I",
            ]
        );
    }
}
