//! Address Lookup Client
//!
//! Minimal HTTPS GET client built on hyper with rustls. The lookup
//! services (ipify by default) answer with the bare address as the
//! response body, so a request is: connect, TLS handshake, one GET,
//! trim, parse.

use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::header::USER_AGENT;
use hyper::{Method, Request, Uri};
use rustls::ClientConfig;
use securevpn_core::ObservedAddress;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};

/// Lookup errors
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("TLS error: {0}")]
    TlsError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Body read error: {0}")]
    BodyError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service answered with something that is not an address: {0:?}")]
    BadAddress(String),
}

/// Lookup configuration
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// Service answering with the caller's IPv4
    pub v4_url: String,
    /// Service answering with the caller's IPv6
    pub v6_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// User-Agent string
    pub user_agent: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            v4_url: "https://api.ipify.org/".to_string(),
            v6_url: "https://api6.ipify.org/".to_string(),
            timeout: Duration::from_secs(5),
            user_agent: "SecureVPN/0.1".to_string(),
        }
    }
}

/// One-shot public address lookup
pub struct AddressLookup {
    config: LookupConfig,
}

impl AddressLookup {
    /// Create a new lookup client
    pub fn new(config: LookupConfig) -> Self {
        Self { config }
    }

    /// Create with default configuration
    pub fn with_defaults() -> Self {
        Self::new(LookupConfig::default())
    }

    /// Fetch both families concurrently
    ///
    /// Each failure is logged and mapped to the per-family
    /// "unavailable" sentinel; this call itself cannot fail.
    pub async fn observed_address(&self) -> ObservedAddress {
        let (v4, v6) = tokio::join!(self.public_v4(), self.public_v6());

        ObservedAddress {
            public_v4: v4
                .map_err(|e| warn!("IPv4 lookup failed: {}", e))
                .ok(),
            public_v6: v6
                .map_err(|e| warn!("IPv6 lookup failed: {}", e))
                .ok(),
        }
    }

    /// Fetch the caller's public IPv4
    pub async fn public_v4(&self) -> Result<Ipv4Addr, LookupError> {
        let body = self.get_text(&self.config.v4_url).await?;
        parse_v4(&body)
    }

    /// Fetch the caller's public IPv6
    pub async fn public_v6(&self) -> Result<Ipv6Addr, LookupError> {
        let body = self.get_text(&self.config.v6_url).await?;
        parse_v6(&body)
    }

    /// Perform a GET and return the body as text
    async fn get_text(&self, url: &str) -> Result<String, LookupError> {
        tokio::time::timeout(self.config.timeout, self.get_inner(url))
            .await
            .map_err(|_| LookupError::Timeout)?
    }

    async fn get_inner(&self, url: &str) -> Result<String, LookupError> {
        let uri: Uri = url
            .parse()
            .map_err(|e: hyper::http::uri::InvalidUri| LookupError::InvalidUrl(e.to_string()))?;

        let host = uri
            .host()
            .ok_or_else(|| LookupError::InvalidUrl("No host in URL".to_string()))?
            .to_string();
        let is_https = uri.scheme_str() == Some("https");
        let port = uri.port_u16().unwrap_or(if is_https { 443 } else { 80 });

        let request = Request::builder()
            .method(Method::GET)
            .uri(uri.clone())
            .header(USER_AGENT, &self.config.user_agent)
            .header("Host", &host)
            .body(Empty::<Bytes>::new())
            .map_err(|e| LookupError::HttpError(e.to_string()))?;

        let addr = format!("{}:{}", host, port);
        let stream = tokio::net::TcpStream::connect(&addr)
            .await
            .map_err(|e| LookupError::ConnectionFailed(e.to_string()))?;

        let response_result = if is_https {
            let mut root_store = rustls::RootCertStore::empty();
            root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

            let tls_config = ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth();

            let connector = TlsConnector::from(Arc::new(tls_config));
            let server_name = rustls::pki_types::ServerName::try_from(host.clone())
                .map_err(|_| LookupError::TlsError("Invalid server name".to_string()))?;

            let tls_stream = connector
                .connect(server_name, stream)
                .await
                .map_err(|e| LookupError::TlsError(e.to_string()))?;

            let io = hyper_util::rt::TokioIo::new(tls_stream);
            let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
                .await
                .map_err(|e| LookupError::HttpError(e.to_string()))?;

            tokio::spawn(async move {
                if let Err(e) = conn.await {
                    warn!("Connection error: {}", e);
                }
            });

            sender.send_request(request).await
        } else {
            let io = hyper_util::rt::TokioIo::new(stream);
            let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
                .await
                .map_err(|e| LookupError::HttpError(e.to_string()))?;

            tokio::spawn(async move {
                if let Err(e) = conn.await {
                    warn!("Connection error: {}", e);
                }
            });

            sender.send_request(request).await
        };

        let response = response_result.map_err(|e| LookupError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::HttpError(format!(
                "{} answered {}",
                host, status
            )));
        }

        let collected = response
            .into_body()
            .collect()
            .await
            .map_err(|e| LookupError::BodyError(e.to_string()))?;
        let body = String::from_utf8(collected.to_bytes().to_vec())
            .map_err(|e| LookupError::BodyError(e.to_string()))?;

        debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(body)
    }
}

/// Parse a lookup response body as an IPv4 address
fn parse_v4(body: &str) -> Result<Ipv4Addr, LookupError> {
    let trimmed = body.trim();
    trimmed
        .parse()
        .map_err(|_| LookupError::BadAddress(trimmed.to_string()))
}

/// Parse a lookup response body as an IPv6 address
fn parse_v6(body: &str) -> Result<Ipv6Addr, LookupError> {
    let trimmed = body.trim();
    trimmed
        .parse()
        .map_err(|_| LookupError::BadAddress(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LookupConfig::default();

        assert!(config.v4_url.starts_with("https://"));
        assert_ne!(config.v4_url, config.v6_url);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_parse_v4() {
        assert_eq!(
            parse_v4("203.0.113.7\n").unwrap(),
            Ipv4Addr::new(203, 0, 113, 7)
        );

        assert!(matches!(
            parse_v4("<html>not an ip</html>"),
            Err(LookupError::BadAddress(_))
        ));

        // A v6 answer on the v4 endpoint is still a bad address
        assert!(matches!(
            parse_v4("2001:db8::1"),
            Err(LookupError::BadAddress(_))
        ));
    }

    #[test]
    fn test_parse_v6() {
        assert_eq!(
            parse_v6(" 2001:db8::1 ").unwrap(),
            "2001:db8::1".parse::<Ipv6Addr>().unwrap()
        );

        assert!(matches!(
            parse_v6("203.0.113.7"),
            Err(LookupError::BadAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_lookup_against_live_service() {
        let lookup = AddressLookup::with_defaults();

        // Requires network access; in an offline environment both
        // families come back unavailable, which is also the contract
        let observed = lookup.observed_address().await;
        println!("observed: {}", observed);
    }

    #[tokio::test]
    async fn test_unreachable_service_maps_to_unavailable() {
        let lookup = AddressLookup::new(LookupConfig {
            // TEST-NET-1 is guaranteed unroutable
            v4_url: "http://192.0.2.1/".to_string(),
            v6_url: "http://192.0.2.2/".to_string(),
            timeout: Duration::from_millis(200),
            user_agent: "SecureVPN/0.1".to_string(),
        });

        let observed = lookup.observed_address().await;
        assert_eq!(observed.public_v4, None);
        assert_eq!(observed.public_v6, None);
        assert_eq!(observed.display_v4(), securevpn_core::UNAVAILABLE);
    }
}
