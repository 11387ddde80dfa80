use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error types for Graphid operations
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GraphidError {
    #[error("Local ID {0} is out of range (max: 2^48 - 1)")]
    LocidOutOfRange(u64),

    #[error("Malformed Graphid '{0}': expected <label>.<local>")]
    Malformed(String),
}

/// Graphid: 64-bit identifier for graph vertices and edges
///
/// Format: [16-bit label ID][48-bit local ID]
///
/// The textual form `"{labid}.{locid}"` is what appears in URLs, so
/// `Display` and `FromStr` must stay inverse to each other.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Graphid(u64);

impl Graphid {
    /// Maximum value for local ID (2^48 - 1)
    pub const MAX_LOCID: u64 = 0x0000_FFFF_FFFF_FFFF;

    /// Create a new Graphid from label ID and local ID
    pub fn new(labid: u16, locid: u64) -> Result<Self, GraphidError> {
        if locid > Self::MAX_LOCID {
            return Err(GraphidError::LocidOutOfRange(locid));
        }
        Ok(Self(((labid as u64) << 48) | locid))
    }

    /// Create a Graphid from its raw 64-bit value
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    pub fn as_raw(&self) -> u64 {
        self.0
    }

    /// Label ID (high 16 bits)
    pub fn labid(&self) -> u16 {
        (self.0 >> 48) as u16
    }

    /// Local ID (low 48 bits)
    pub fn locid(&self) -> u64 {
        self.0 & Self::MAX_LOCID
    }
}

impl fmt::Display for Graphid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.labid(), self.locid())
    }
}

impl FromStr for Graphid {
    type Err = GraphidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || GraphidError::Malformed(s.to_string());

        let (labid, locid) = s.split_once('.').ok_or_else(malformed)?;
        let labid: u16 = labid.parse().map_err(|_| malformed())?;
        let locid: u64 = locid.parse().map_err(|_| malformed())?;

        Self::new(labid, locid)
    }
}

impl From<Graphid> for u64 {
    fn from(id: Graphid) -> u64 {
        id.0
    }
}
