//! Grid Client
//!
//! Main client for interacting with a grid, combining the base address
//! and HTTP functionality.

use super::error::{GridError, Result};
use super::http::{Envelope, GridHttpClient};
use reqwest::Method;
use serde_json::Value;
use std::fmt;
use url::Url;

/// Base address of a grid: `scheme://host:port`, without trailing slash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridAddress(String);

impl GridAddress {
    /// Build an address from its parts; `secure` selects https
    pub fn new(host: &str, port: u16, secure: bool) -> Result<Self> {
        let scheme = if secure { "https" } else { "http" };
        Self::parse(&format!("{}://{}:{}", scheme, host, port))
    }

    /// Parse an arbitrary base URL (e.g. a mock server URI)
    pub fn parse(address: &str) -> Result<Self> {
        let invalid = |reason: String| GridError::InvalidAddress {
            address: address.to_string(),
            reason,
        };

        let url = Url::parse(address).map_err(|e| invalid(e.to_string()))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("query and fragment are not allowed".to_string()));
        }

        Ok(Self(address.trim_end_matches('/').to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_secure(&self) -> bool {
        self.0.starts_with("https://")
    }
}

impl fmt::Display for GridAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Main grid client, cheap to clone and shared by every task
#[derive(Clone, Debug)]
pub struct GridClient {
    pub address: GridAddress,
    pub http: GridHttpClient,
}

impl GridClient {
    /// Create a new grid client
    pub fn new(address: GridAddress) -> Result<Self> {
        let http = GridHttpClient::new()?;
        Ok(Self { address, http })
    }

    /// Dispatch a single request to an already resolved URL
    pub async fn execute(&self, method: Method, url: &str, payload: Option<&Value>) -> Result<Envelope> {
        self.http.execute(method, url, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_scheme_follows_secure_flag() {
        let plain = GridAddress::new("localhost", 5000, false).unwrap();
        assert_eq!(plain.as_str(), "http://localhost:5000");
        assert!(!plain.is_secure());

        let secure = GridAddress::new("grid.example.org", 443, true).unwrap();
        assert_eq!(secure.as_str(), "https://grid.example.org:443");
        assert!(secure.is_secure());
    }

    #[test]
    fn test_parse_strips_trailing_slash() {
        let address = GridAddress::parse("http://127.0.0.1:8080/").unwrap();
        assert_eq!(address.to_string(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        assert!(matches!(
            GridAddress::parse("ftp://localhost:21"),
            Err(GridError::InvalidAddress { .. })
        ));
        assert!(GridAddress::parse("not a url").is_err());
        assert!(GridAddress::parse("http://localhost:5000/?q=1").is_err());
    }

    #[test]
    fn test_new_rejects_bad_host() {
        assert!(GridAddress::new("bad host", 5000, false).is_err());
    }
}
