use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, error};

use crate::error::InvalidAddress;

const DEFAULT_SCHEME: &str = "http://";

// Octets are only checked for shape, not for the 0-255 range.
const ADDRESS_PATTERN: &str = r"^https?://[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}(?::[0-9]{1,5})?$";

fn address_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ADDRESS_PATTERN).expect("address pattern is valid"))
}

/// Prefix `http://` when no scheme is present, then check for
/// `http(s)://` + dotted quad + optional `:port` and nothing else.
///
/// `999.999.999.999` is accepted: only digit/dot shape is validated.
pub fn format_and_validate(address: &str) -> Result<String, InvalidAddress> {
    let normalized = if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        debug!(address, "no http(s):// prefix, adding one");
        format!("{DEFAULT_SCHEME}{address}")
    };

    if !address_regex().is_match(&normalized) {
        error!(address = %normalized, "address is not valid");
        return Err(InvalidAddress(normalized));
    }
    Ok(normalized)
}
