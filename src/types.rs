use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::flagged::{default_flagged_versions, FlaggedVersions};

/// Server software the fingerprinter knows how to match against the flagged table.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ServerKind {
    Nginx,
    Iis,
}

impl ServerKind {
    /// Match the name half of a `Server` header (case-insensitive).
    pub fn from_header_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "nginx" => Some(ServerKind::Nginx),
            "iis" | "microsoft-iis" => Some(ServerKind::Iis),
            _ => None,
        }
    }

    /// Parse a table identifier as written in a flagged-versions file.
    pub fn from_identifier(ident: &str) -> Option<Self> {
        Self::from_header_name(ident)
    }
}

impl fmt::Display for ServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerKind::Nginx => f.write_str("nginx"),
            ServerKind::Iis => f.write_str("iis"),
        }
    }
}

/// Outcome of the software fingerprint for one address.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Software {
    Nginx,
    Iis,
    /// Unknown software, or known software on an unflagged version.
    Other,
    /// No `Server` header.
    None,
    Error,
    Disabled,
}

impl From<ServerKind> for Software {
    fn from(kind: ServerKind) -> Self {
        match kind {
            ServerKind::Nginx => Software::Nginx,
            ServerKind::Iis => Software::Iis,
        }
    }
}

impl fmt::Display for Software {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Software::Nginx => "nginx",
            Software::Iis => "Microsoft IIS",
            Software::Other => "unflagged",
            Software::None => "none listed",
            Software::Error => "error occurred while checking this server for web server",
            Software::Disabled => "web server check disabled",
        };
        f.write_str(s)
    }
}

/// Outcome of the root directory listing check.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Listing {
    Available,
    Unavailable,
    Error,
    Disabled,
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Listing::Available => "available",
            Listing::Unavailable => "unavailable",
            Listing::Error => "error occurred while checking this server for dir listing",
            Listing::Disabled => "dir listing check disabled",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Good,
    BadAddress,
    BadRequest,
    BadResponseCode,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Good => "good",
            Status::BadAddress => "bad IP given",
            Status::BadRequest => "request failed",
            Status::BadResponseCode => "unexpected response code",
        };
        f.write_str(s)
    }
}

/// Per-address scan record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    #[serde(rename = "WebServerSoftware")]
    pub software: Software,
    #[serde(rename = "RootListing")]
    pub listing: Listing,
    #[serde(rename = "Status")]
    pub status: Status,
    #[serde(rename = "ErrorMsg")]
    pub detail: Option<String>,
}

impl ScanResult {
    pub fn good(software: Software, listing: Listing) -> Self {
        Self {
            software,
            listing,
            status: Status::Good,
            detail: None,
        }
    }

    /// Failed scan: both classifications collapse to `Error` whatever was requested.
    pub fn failed(status: Status, detail: Option<String>) -> Self {
        Self {
            software: Software::Error,
            listing: Listing::Error,
            status,
            detail,
        }
    }

    pub fn is_good(&self) -> bool {
        self.status == Status::Good
    }
}

/// Insertion-ordered mapping from address key to its result.
///
/// Re-inserting an existing key replaces the value but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultMap {
    entries: Vec<(String, ScanResult)>,
}

impl ResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, result: ScanResult) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = result,
            None => self.entries.push((key, result)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ScanResult> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScanResult)> {
        self.entries.iter().map(|(k, r)| (k.as_str(), r))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ResultMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, result) in &self.entries {
            map.serialize_entry(key, result)?;
        }
        map.end()
    }
}

/// Everything one scan call needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub addresses: Vec<String>,
    pub scan_software: bool,
    pub scan_root: bool,
    /// Key results by the input string instead of the normalized address.
    pub preserve_addresses: bool,
    pub flagged_versions: FlaggedVersions,
}

impl ScanConfig {
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            addresses: addresses.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            addresses: Vec::new(),
            scan_software: true,
            scan_root: true,
            preserve_addresses: true,
            flagged_versions: default_flagged_versions(),
        }
    }
}
