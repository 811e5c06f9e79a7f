use anyhow::{bail, Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::types::ServerKind;

/// Table of `major.minor` versions that count as a flagged hit, per server software.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlaggedVersions {
    table: BTreeMap<ServerKind, BTreeSet<String>>,
}

impl FlaggedVersions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a flagged `major.minor` version for `kind`. Returns false if it was already present.
    pub fn insert(&mut self, kind: ServerKind, version: impl Into<String>) -> bool {
        self.table.entry(kind).or_default().insert(version.into())
    }

    pub fn is_flagged(&self, kind: ServerKind, major_minor: &str) -> bool {
        self.table
            .get(&kind)
            .is_some_and(|versions| versions.contains(major_minor))
    }

    pub fn versions(&self, kind: ServerKind) -> impl Iterator<Item = &str> {
        self.table
            .get(&kind)
            .into_iter()
            .flat_map(|versions| versions.iter().map(String::as_str))
    }

    pub fn is_empty(&self) -> bool {
        self.table.values().all(BTreeSet::is_empty)
    }
}

impl<S: Into<String>> FromIterator<(ServerKind, S)> for FlaggedVersions {
    fn from_iter<I: IntoIterator<Item = (ServerKind, S)>>(iter: I) -> Self {
        let mut out = FlaggedVersions::new();
        for (kind, version) in iter {
            out.insert(kind, version);
        }
        out
    }
}

/// Parse a flagged-versions table.
///
/// Supported formats per line:
/// - `software: version[, version...]`, e.g. `nginx: 1.2, 1.4`
/// - software names are the header names the fingerprinter knows (`nginx`, `iis`, `microsoft-iis`)
/// - comments: everything after `#` is ignored
/// - whitespace and blank lines are ignored
///
/// Repeated lines for the same software accumulate.
pub fn parse_flagged_str(s: &str) -> Result<FlaggedVersions> {
    let mut out = FlaggedVersions::new();

    for (idx, raw_line) in s.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.split('#').next().map(str::trim).unwrap_or("");
        if line.is_empty() {
            continue;
        }

        let Some((name, versions)) = line.split_once(':') else {
            bail!("line {line_no}: expected `software: version[, version...]`, got: {line}");
        };
        let kind = ServerKind::from_identifier(name.trim())
            .with_context(|| format!("line {line_no}: unknown server software: {}", name.trim()))?;

        let mut any = false;
        for version in versions.split(',').map(str::trim).filter(|v| !v.is_empty()) {
            let version = parse_version_str(version)
                .with_context(|| format!("line {line_no}: invalid version: {version}"))?;
            out.insert(kind, version);
            any = true;
        }
        if !any {
            bail!("line {line_no}: no versions listed for {kind}");
        }
    }

    Ok(out)
}

/// Load a flagged-versions table from a file path. Errors if the file cannot be read or parsed.
pub fn load_flagged_from_path(path: impl AsRef<Path>) -> Result<FlaggedVersions> {
    let content = fs::read_to_string(path.as_ref()).with_context(|| {
        format!(
            "failed to read flagged versions file: {}",
            path.as_ref().display()
        )
    })?;
    parse_flagged_str(&content)
}

/// Load a flagged-versions table from a file, or return the default table if missing or empty.
pub fn load_flagged_or_default(path: impl AsRef<Path>) -> FlaggedVersions {
    match load_flagged_from_path(&path) {
        Ok(t) if !t.is_empty() => t,
        Ok(_) => default_flagged_versions(),
        Err(e) => {
            tracing::warn!("{e:#}; using default flagged versions");
            default_flagged_versions()
        }
    }
}

/// nginx 1.2 and IIS 7.0.
pub fn default_flagged_versions() -> FlaggedVersions {
    const DEFAULT: &[(ServerKind, &str)] = &[(ServerKind::Nginx, "1.2"), (ServerKind::Iis, "7.0")];
    DEFAULT.iter().copied().collect()
}

fn parse_version_str(s: &str) -> Result<String> {
    if s.chars().any(|c| c.is_whitespace() || c == '/') {
        bail!("version must be a single token");
    }
    if s.split('.').count() > 2 {
        bail!("only major.minor is compared, got {s}");
    }
    Ok(s.to_string())
}
