//! Library crate for websrv-scan-rs: web server fingerprinting and root listing checks.
pub mod address;
pub mod error;
pub mod fingerprint;
pub mod flagged;
pub mod logging;
pub mod output;
pub mod scanner;
pub mod server;
pub mod transport;
pub mod types;

pub use error::{InvalidAddress, RequestError, ScanError};
pub use scanner::WebServerScanner;
pub use types::{Listing, ResultMap, ScanConfig, ScanResult, ServerKind, Software, Status};
