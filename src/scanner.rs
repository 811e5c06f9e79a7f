use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::address::format_and_validate;
use crate::error::ScanError;
use crate::fingerprint::{root_listing, server_software};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::{Listing, ResultMap, ScanConfig, ScanResult, Software, Status};

/// Scans each configured address in order for web server software and a root directory listing.
///
/// Per address: validate, GET, check the status code, then classify. Failures at any step
/// are recorded in that address's [`ScanResult`]; they never abort the rest of the batch.
#[derive(Clone)]
pub struct WebServerScanner {
    config: ScanConfig,
    transport: Arc<dyn HttpTransport>,
}

impl WebServerScanner {
    pub fn new(config: ScanConfig, transport: Arc<dyn HttpTransport>) -> Self {
        debug!(?config, "scanner created");
        Self { config, transport }
    }

    /// Scanner using [`ReqwestTransport`] with the fixed request timeout.
    pub fn with_default_transport(config: ScanConfig) -> Result<Self> {
        Ok(Self::new(config, Arc::new(ReqwestTransport::new()?)))
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Run the scan. Fails only when both checks are disabled.
    pub async fn run(&self) -> Result<ResultMap, ScanError> {
        let cfg = &self.config;
        if !cfg.scan_software && !cfg.scan_root {
            tracing::error!("invalid args: nothing to scan");
            return Err(ScanError::NothingToScan);
        }

        let mut results = ResultMap::new();
        for address in &cfg.addresses {
            let (key, result) = self.scan_one(address).await;
            log_scan_complete(&key, &result);
            results.insert(key, result);
        }
        Ok(results)
    }

    async fn scan_one(&self, address: &str) -> (String, ScanResult) {
        let cfg = &self.config;
        info!(address, "starting scan, address may change if not preserved");

        let normalized = match format_and_validate(address) {
            Ok(n) => n,
            Err(_) => {
                return (
                    address.to_string(),
                    ScanResult::failed(Status::BadAddress, None),
                )
            }
        };
        let key = if cfg.preserve_addresses {
            address.to_string()
        } else {
            normalized.clone()
        };

        let resp = match self.transport.get(&normalized).await {
            Ok(r) => r,
            Err(e) => {
                return (
                    key,
                    ScanResult::failed(Status::BadRequest, Some(e.to_string())),
                )
            }
        };
        if resp.status != 200 {
            return (
                key,
                ScanResult::failed(Status::BadResponseCode, Some(resp.status.to_string())),
            );
        }

        let software = if cfg.scan_software {
            server_software(&resp, &cfg.flagged_versions)
        } else {
            Software::Disabled
        };
        let listing = if cfg.scan_root {
            root_listing(&resp)
        } else {
            Listing::Disabled
        };
        (key, ScanResult::good(software, listing))
    }
}

fn log_scan_complete(key: &str, result: &ScanResult) {
    if result.is_good() {
        info!(
            address = key,
            software = ?result.software,
            listing = ?result.listing,
            "scan successful"
        );
    } else {
        warn!(
            address = key,
            status = ?result.status,
            detail = result.detail.as_deref().unwrap_or(""),
            "scan unsuccessful"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RequestError;
    use crate::transport::HttpResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers every GET with a fixed status and counts calls.
    struct CountingTransport {
        status: u16,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HttpTransport for CountingTransport {
        async fn get(&self, _url: &str) -> Result<HttpResponse, RequestError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(HttpResponse {
                status: self.status,
                ..Default::default()
            })
        }
    }

    fn scanner(config: ScanConfig, status: u16) -> (WebServerScanner, Arc<CountingTransport>) {
        let t = Arc::new(CountingTransport {
            status,
            calls: AtomicUsize::new(0),
        });
        (WebServerScanner::new(config, t.clone()), t)
    }

    #[tokio::test]
    async fn nothing_to_scan_makes_no_requests() {
        let mut cfg = ScanConfig::new(["127.0.0.1"]);
        cfg.scan_software = false;
        cfg.scan_root = false;
        let (s, t) = scanner(cfg, 200);
        assert_eq!(s.run().await, Err(ScanError::NothingToScan));
        assert_eq!(t.calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn bad_address_skips_request() {
        let (s, t) = scanner(ScanConfig::new(["example.com"]), 200);
        let res = s.run().await.unwrap();
        assert_eq!(
            res.get("example.com"),
            Some(&ScanResult::failed(Status::BadAddress, None))
        );
        assert_eq!(t.calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn non_200_is_bad_response_code() {
        let (s, _) = scanner(ScanConfig::new(["10.0.0.1"]), 404);
        let res = s.run().await.unwrap();
        assert_eq!(
            res.get("10.0.0.1"),
            Some(&ScanResult::failed(
                Status::BadResponseCode,
                Some("404".into())
            ))
        );
    }

    #[tokio::test]
    async fn normalized_keys_when_not_preserving() {
        let mut cfg = ScanConfig::new(["10.0.0.1", "0010.0.0.1"]);
        cfg.preserve_addresses = false;
        let (s, _) = scanner(cfg, 200);
        let res = s.run().await.unwrap();
        // invalid addresses keep their input key
        assert_eq!(
            res.keys().collect::<Vec<_>>(),
            vec!["http://10.0.0.1", "0010.0.0.1"]
        );
    }
}
