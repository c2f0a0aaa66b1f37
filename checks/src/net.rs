//! Endpoint reachability probing.
//!
//! A probe is a minimal blocking GET: any HTTP response at all, including
//! 4xx/5xx, proves the endpoint is reachable. Only transport-level failure
//! is reported, classified into a distinct issue code per failure signal so
//! the suggestion can name the actual remedy.

use std::error::Error as StdError;
use std::io::ErrorKind;
use std::time::Duration;

use rayon::prelude::*;
use tracing::debug;

use preflight_core::{Issue, IssueCode, ValidationResult};

/// One endpoint to probe.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Human label used in issue messages (e.g. `testnet RPC`).
    pub label: String,
    /// URL to probe.
    pub url: String,
}

impl Endpoint {
    pub fn new(label: &str, url: &str) -> Self {
        Self {
            label: label.to_string(),
            url: url.to_string(),
        }
    }
}

/// Probes one endpoint, returning an issue only on failure.
///
/// A malformed URL short-circuits to `INVALID_URL` without any connection
/// attempt.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use preflight_checks::net::check_endpoint;
/// use preflight_core::IssueCode;
///
/// let issue = check_endpoint("not a url", Duration::from_secs(1), "rpc").unwrap();
/// assert_eq!(issue.code, IssueCode::InvalidUrl);
/// ```
pub fn check_endpoint(url: &str, timeout: Duration, label: &str) -> Option<Issue> {
    let parsed = match url::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => parsed,
        Ok(parsed) => {
            return Some(
                Issue::error(
                    IssueCode::InvalidUrl,
                    format!("{label}: unsupported URL scheme {:?}", parsed.scheme()),
                )
                .with_field(label.to_string())
                .with_received(url.to_string())
                .with_expected("an http:// or https:// URL".to_string())
                .with_suggestion("Use an http:// or https:// endpoint".to_string()),
            );
        }
        Err(error) => {
            return Some(
                Issue::error(IssueCode::InvalidUrl, format!("{label}: invalid URL: {error}"))
                    .with_field(label.to_string())
                    .with_received(url.to_string())
                    .with_expected("an http:// or https:// URL".to_string())
                    .with_suggestion("Check the URL format".to_string()),
            );
        }
    };

    debug!(url = %parsed, label = label, timeout_ms = timeout.as_millis() as u64, "Probing endpoint");

    let client = match reqwest::blocking::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
    {
        Ok(client) => client,
        Err(error) => {
            return Some(transport_issue(IssueCode::NetworkError, label, url, &error, timeout));
        }
    };

    match client.get(parsed).send() {
        Ok(response) => {
            debug!(url = url, status = response.status().as_u16(), "Endpoint reachable");
            None
        }
        Err(error) => {
            let code = classify(&error);
            Some(transport_issue(code, label, url, &error, timeout))
        }
    }
}

/// Probes every endpoint concurrently, merging only the failures.
///
/// Success is silent: a clean run returns an empty result. Total wall time
/// is bounded by the slowest single probe, not the sum.
pub fn check_endpoints(endpoints: &[Endpoint], timeout: Duration) -> ValidationResult {
    let issues: Vec<Issue> = endpoints
        .par_iter()
        .filter_map(|endpoint| check_endpoint(&endpoint.url, timeout, &endpoint.label))
        .collect();
    ValidationResult::from_issues(issues)
}

fn transport_issue(
    code: IssueCode,
    label: &str,
    url: &str,
    error: &dyn StdError,
    timeout: Duration,
) -> Issue {
    let (summary, suggestion) = advice(code, timeout);
    Issue::error(code, format!("{label}: {summary} ({error})"))
        .with_field(label.to_string())
        .with_received(url.to_string())
        .with_suggestion(suggestion)
}

fn advice(code: IssueCode, timeout: Duration) -> (&'static str, String) {
    match code {
        IssueCode::NetworkTimeout => (
            "endpoint did not respond in time",
            format!(
                "No response within {}ms; check connectivity or raise the timeout",
                timeout.as_millis()
            ),
        ),
        IssueCode::ConnectionRefused => (
            "connection refused",
            "Nothing is listening on that host/port; check the URL or start the service"
                .to_string(),
        ),
        IssueCode::DnsResolutionFailed => (
            "hostname could not be resolved",
            "Check the hostname spelling and your DNS settings".to_string(),
        ),
        IssueCode::ConnectionReset => (
            "connection reset during probe",
            "The condition may be transient; retrying is reasonable".to_string(),
        ),
        IssueCode::TlsError => (
            "TLS handshake failed",
            "Check the endpoint certificate, or whether the URL should be http://".to_string(),
        ),
        _ => (
            "request failed",
            "The condition may be transient; retrying is reasonable".to_string(),
        ),
    }
}

/// Maps a transport error onto an issue code.
///
/// Prefers structured signals (`reqwest` timeout flag, `io::ErrorKind` found
/// in the source chain) and falls back to message text for failure modes
/// the chain does not expose structurally (DNS, TLS).
fn classify(error: &reqwest::Error) -> IssueCode {
    if error.is_timeout() {
        return IssueCode::NetworkTimeout;
    }

    let mut chain_text = error.to_string();
    let mut source = error.source();
    while let Some(current) = source {
        if let Some(io) = current.downcast_ref::<std::io::Error>() {
            match io.kind() {
                ErrorKind::ConnectionRefused => return IssueCode::ConnectionRefused,
                ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted => {
                    return IssueCode::ConnectionReset;
                }
                ErrorKind::TimedOut => return IssueCode::NetworkTimeout,
                _ => {}
            }
        }
        chain_text.push(' ');
        chain_text.push_str(&current.to_string());
        source = current.source();
    }

    classify_text(&chain_text)
}

fn classify_text(chain_text: &str) -> IssueCode {
    let text = chain_text.to_ascii_lowercase();
    if text.contains("dns") || text.contains("failed to lookup") || text.contains("name or service")
    {
        IssueCode::DnsResolutionFailed
    } else if text.contains("certificate") || text.contains("tls") || text.contains("ssl") {
        IssueCode::TlsError
    } else if text.contains("refused") {
        IssueCode::ConnectionRefused
    } else if text.contains("reset") {
        IssueCode::ConnectionReset
    } else if text.contains("timed out") || text.contains("timeout") {
        IssueCode::NetworkTimeout
    } else {
        IssueCode::NetworkError
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_url_short_circuits() {
        let issue = check_endpoint("definitely not a url", Duration::from_secs(1), "rpc").unwrap();
        assert_eq!(issue.code, IssueCode::InvalidUrl);
        assert_eq!(issue.field.as_deref(), Some("rpc"));
    }

    #[test]
    fn test_non_http_scheme_rejected_without_probe() {
        let issue = check_endpoint("ftp://host/file", Duration::from_secs(1), "rpc").unwrap();
        assert_eq!(issue.code, IssueCode::InvalidUrl);
    }

    #[test]
    fn test_classify_text_buckets() {
        let cases = [
            ("dns error: failed to lookup address", IssueCode::DnsResolutionFailed),
            ("invalid peer certificate contents", IssueCode::TlsError),
            ("connection refused by peer", IssueCode::ConnectionRefused),
            ("connection reset by peer", IssueCode::ConnectionReset),
            ("operation timed out", IssueCode::NetworkTimeout),
            ("something exploded", IssueCode::NetworkError),
        ];
        for (text, expected) in cases {
            assert_eq!(classify_text(text), expected, "{text}");
        }
    }

    #[test]
    fn test_unremediable_codes_mention_retrying() {
        for code in [IssueCode::ConnectionReset, IssueCode::NetworkError] {
            let (_, suggestion) = advice(code, Duration::from_secs(1));
            assert!(suggestion.contains("retrying"), "{code}");
        }
    }

    #[test]
    fn test_refused_port_classified() {
        // Port 1 on loopback is essentially never listening.
        let issue = check_endpoint("http://127.0.0.1:1", Duration::from_secs(2), "local").unwrap();
        assert_eq!(issue.code, IssueCode::ConnectionRefused);
    }

    #[test]
    fn test_unresolvable_host_classified() {
        // RFC 2606 reserves .invalid: resolution is guaranteed to fail.
        let issue = check_endpoint(
            "http://preflight-probe.invalid",
            Duration::from_secs(5),
            "rpc",
        )
        .unwrap();
        assert_eq!(issue.code, IssueCode::DnsResolutionFailed);
    }

    #[test]
    fn test_check_endpoints_merges_failures_only() {
        let endpoints = vec![
            Endpoint::new("bad-url", "nope"),
            Endpoint::new("refused", "http://127.0.0.1:1"),
        ];
        let result = check_endpoints(&endpoints, Duration::from_secs(2));
        assert_eq!(result.issues.len(), 2);
        let codes: Vec<_> = result.issues.iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![IssueCode::InvalidUrl, IssueCode::ConnectionRefused]
        );
    }

    #[test]
    fn test_empty_endpoint_list_is_clean() {
        let result = check_endpoints(&[], Duration::from_secs(1));
        assert!(result.is_empty());
    }
}
