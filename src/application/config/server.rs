use std::env;
use std::net::{AddrParseError, SocketAddr};

use axum::http::HeaderValue;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins, parsed from `CASEDESK_ALLOWED_ORIGINS` (comma-separated).
    /// When empty, any origin is allowed.
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("CASEDESK_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("CASEDESK_API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(4000),
            allowed_origins: parse_origins(
                &env::var("CASEDESK_ALLOWED_ORIGINS").unwrap_or_default(),
            ),
        }
    }

    /// Listen address; bracketed or bare IPv6 hosts are both accepted
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let host = self.host.trim_start_matches('[').trim_end_matches(']');
        if host.contains(':') {
            format!("[{}]:{}", host, self.port).parse()
        } else {
            format!("{}:{}", host, self.port).parse()
        }
    }

    /// Origins as CORS header values, skipping any that are not valid headers
    pub fn origin_headers(&self) -> Vec<HeaderValue> {
        self.allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect()
    }
}

/// Split the origin list; browsers send `Origin` without a trailing slash,
/// so one copied from the client app's address bar is trimmed.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(host: &str) -> ServerConfig {
        ServerConfig {
            host: host.to_string(),
            port: 4000,
            allowed_origins: Vec::new(),
        }
    }

    #[test]
    fn test_parse_origins_trims_slashes_and_blanks() {
        let origins = parse_origins(" https://app.casedesk.io/ ,,http://localhost:5173");
        assert_eq!(origins, vec!["https://app.casedesk.io", "http://localhost:5173"]);
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_bind_addr_accepts_ipv4_and_ipv6() {
        assert_eq!(config("0.0.0.0").bind_addr().unwrap().to_string(), "0.0.0.0:4000");
        assert_eq!(config("::").bind_addr().unwrap().to_string(), "[::]:4000");
        assert_eq!(config("[::1]").bind_addr().unwrap().to_string(), "[::1]:4000");
        assert!(config("not a host").bind_addr().is_err());
    }

    #[test]
    fn test_origin_headers_skips_invalid_values() {
        let mut server = config("0.0.0.0");
        server.allowed_origins = vec!["https://app.casedesk.io".to_string(), "bad\norigin".to_string()];
        let headers = server.origin_headers();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0], "https://app.casedesk.io");
    }
}
