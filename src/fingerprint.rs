use tracing::{debug, info, warn};

use crate::flagged::FlaggedVersions;
use crate::transport::HttpResponse;
use crate::types::{Listing, ServerKind, Software};

/// Marker text of a typical autoindex page.
const LISTING_MARKER: &str = "Index of";

/// Classify the `Server` header against the flagged table.
///
/// - missing or empty header: `None`
/// - anything but exactly one `/` separator: `Other`
/// - unknown software, or known software on an unflagged `major.minor`: `Other`
pub fn server_software(resp: &HttpResponse, flagged: &FlaggedVersions) -> Software {
    let Some(server) = resp.server_header().filter(|s| !s.is_empty()) else {
        info!("no server field in HTTP header");
        return Software::None;
    };
    debug!(server = %server, "HTTP server header");
    classify_server_header(&server, flagged)
}

/// Header-value half of [`server_software`].
pub fn classify_server_header(server: &str, flagged: &FlaggedVersions) -> Software {
    let mut parts = server.split('/');
    let (name, version) = match (parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(version), None) => (name, version),
        _ => {
            warn!(server, "unparseable server header");
            return Software::Other;
        }
    };

    let Some(kind) = ServerKind::from_header_name(name) else {
        warn!("\"{name}\" is unsupported");
        return Software::Other;
    };

    let major_minor = major_minor(version);
    if flagged.is_flagged(kind, &major_minor) {
        debug!(%kind, version, "flagged version");
        Software::from(kind)
    } else {
        debug!(%kind, version, "version not flagged");
        Software::Other
    }
}

/// Very rudimentary check for a browsable index at `/`.
pub fn root_listing(resp: &HttpResponse) -> Listing {
    if resp.body.contains(LISTING_MARKER) {
        debug!("directory listing at root appears to be available");
        Listing::Available
    } else {
        debug!("directory listing at root appears to be unavailable");
        Listing::Unavailable
    }
}

fn major_minor(version: &str) -> String {
    version.split('.').take(2).collect::<Vec<_>>().join(".")
}
