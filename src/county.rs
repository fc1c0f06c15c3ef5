//! County identity
//!
//! Counties are keyed by their five-digit FIPS code: a two-digit state code
//! followed by a three-digit county code (`"01001"` is Autauga County, AL).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Reasons a county identifier is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CountyIdError {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier {0:?} is not numeric")]
    NonNumeric(String),

    #[error("identifier {0:?} has the wrong number of digits")]
    WrongLength(String),

    #[error("state code {0} is out of range")]
    StateOutOfRange(u32),

    #[error("county code {0} is out of range")]
    CountyOutOfRange(u32),
}

/// Stable administrative identifier of a county
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountyId {
    state: u8,
    county: u16,
}

impl CountyId {
    /// Build an id from numeric state and county codes.
    pub fn new(state: u32, county: u32) -> Result<Self, CountyIdError> {
        if state == 0 || state > 99 {
            return Err(CountyIdError::StateOutOfRange(state));
        }
        if county == 0 || county > 999 {
            return Err(CountyIdError::CountyOutOfRange(county));
        }
        Ok(Self {
            state: state as u8,
            county: county as u16,
        })
    }

    /// Build an id from the zero-padded `STATEFP` / `COUNTYFP` pair.
    pub fn from_parts(state: &str, county: &str) -> Result<Self, CountyIdError> {
        let state = parse_code(state, 2)?;
        let county = parse_code(county, 3)?;
        Self::new(state, county)
    }

    pub fn state(&self) -> u32 {
        self.state as u32
    }

    pub fn county(&self) -> u32 {
        self.county as u32
    }

    /// Numeric GEOID (`state * 1000 + county`), used as the graph node id.
    pub fn as_u64(&self) -> u64 {
        self.state as u64 * 1000 + self.county as u64
    }

    /// Inverse of [`CountyId::as_u64`].
    pub fn from_u64(geoid: u64) -> Result<Self, CountyIdError> {
        let geoid = u32::try_from(geoid).map_err(|_| CountyIdError::WrongLength(geoid.to_string()))?;
        Self::new(geoid / 1000, geoid % 1000)
    }
}

/// Accepts unpadded codes up to `width` digits (CSV exports often drop the
/// leading zeros).
fn parse_code(raw: &str, width: usize) -> Result<u32, CountyIdError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CountyIdError::Empty);
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CountyIdError::NonNumeric(raw.to_string()));
    }
    if raw.len() > width {
        return Err(CountyIdError::WrongLength(raw.to_string()));
    }
    raw.parse()
        .map_err(|_| CountyIdError::NonNumeric(raw.to_string()))
}

impl FromStr for CountyId {
    type Err = CountyIdError;

    /// Parses a five-digit GEOID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CountyIdError::Empty);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CountyIdError::NonNumeric(s.to_string()));
        }
        if s.len() != 5 {
            return Err(CountyIdError::WrongLength(s.to_string()));
        }
        Self::from_parts(&s[..2], &s[2..])
    }
}

impl fmt::Display for CountyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:03}", self.state, self.county)
    }
}

impl Serialize for CountyId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CountyId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geoid_round_trip() {
        let id: CountyId = "01001".parse().unwrap();
        assert_eq!(id.state(), 1);
        assert_eq!(id.county(), 1);
        assert_eq!(id.to_string(), "01001");
        assert_eq!(id.as_u64(), 1001);
        assert_eq!(CountyId::from_u64(1001).unwrap(), id);
    }

    #[test]
    fn test_unpadded_parts() {
        let id = CountyId::from_parts("6", "37").unwrap();
        assert_eq!(id.to_string(), "06037");
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!("".parse::<CountyId>(), Err(CountyIdError::Empty));
        assert!(matches!("01A01".parse::<CountyId>(), Err(CountyIdError::NonNumeric(_))));
        assert!(matches!("1001".parse::<CountyId>(), Err(CountyIdError::WrongLength(_))));
        assert_eq!("00001".parse::<CountyId>(), Err(CountyIdError::StateOutOfRange(0)));
        assert_eq!("01000".parse::<CountyId>(), Err(CountyIdError::CountyOutOfRange(0)));
        assert!(matches!(CountyId::from_parts("1", "1234"), Err(CountyIdError::WrongLength(_))));
    }

    #[test]
    fn test_serde_as_string() {
        let id = CountyId::new(48, 201).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"48201\"");
        let back: CountyId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_ordering_follows_geoid() {
        let a = CountyId::new(1, 999).unwrap();
        let b = CountyId::new(2, 1).unwrap();
        assert!(a < b);
    }
}
