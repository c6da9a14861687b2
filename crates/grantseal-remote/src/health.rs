//! Issuer health reports.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{FetchError, Result};

/// Health endpoint path, relative to the issuer origin.
pub const HEALTH_PATH: &str = "/health";

/// Body of the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub ok: bool,
    pub presign_enabled: bool,
    pub proxy_enabled: bool,
    pub ts: String,
}

/// A report reduced to a verdict and a list of human-readable issues.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HealthStatus {
    pub ok: bool,
    pub issues: Vec<String>,
}

impl HealthStatus {
    /// Status for a report that could not be fetched at all.
    pub fn unreachable() -> Self {
        Self {
            ok: false,
            issues: vec!["health fetch error".to_string()],
        }
    }
}

impl HealthReport {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// Turn an HTTP response into a report.
    pub fn from_response(status: u16, body: &[u8]) -> Result<Self> {
        if !(200..300).contains(&status) {
            return Err(FetchError::Status(status));
        }
        Self::from_json(body)
    }

    /// Healthy only if the server says so and every feature is on.
    pub fn assess(&self) -> HealthStatus {
        let mut issues = Vec::new();
        if !self.presign_enabled {
            issues.push("presign disabled".to_string());
        }
        if !self.proxy_enabled {
            issues.push("proxy disabled".to_string());
        }
        HealthStatus {
            ok: self.ok && issues.is_empty(),
            issues,
        }
    }
}

/// Anything that can produce a health report.
#[async_trait]
pub trait HealthSource: Send + Sync {
    async fn fetch_health(&self) -> Result<HealthReport>;
}

/// Fetch and assess once. Fetch failures become an unhealthy status.
pub async fn check_health<S>(source: &S) -> HealthStatus
where
    S: HealthSource + ?Sized,
{
    match source.fetch_health().await {
        Ok(report) => report.assess(),
        Err(e) => {
            tracing::warn!(error = %e, "health fetch failed");
            HealthStatus::unreachable()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(ok: bool, presign: bool, proxy: bool) -> HealthReport {
        HealthReport {
            ok,
            presign_enabled: presign,
            proxy_enabled: proxy,
            ts: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn test_assess() {
        assert_eq!(
            report(true, true, true).assess(),
            HealthStatus { ok: true, issues: vec![] }
        );
        assert_eq!(
            report(true, false, false).assess(),
            HealthStatus {
                ok: false,
                issues: vec!["presign disabled".into(), "proxy disabled".into()]
            }
        );
        let server_down = report(false, true, true).assess();
        assert!(!server_down.ok);
        assert!(server_down.issues.is_empty());
    }

    #[test]
    fn test_parse() {
        let body = br#"{"ok":true,"presign_enabled":true,"proxy_enabled":false,"ts":"x"}"#;
        let r = HealthReport::from_response(200, body).unwrap();
        assert_eq!(r.assess().issues, vec!["proxy disabled".to_string()]);

        assert!(matches!(HealthReport::from_response(500, body), Err(FetchError::Status(500))));
        assert!(matches!(HealthReport::from_json(b"{\"ok\":true}"), Err(FetchError::Decode(_))));
    }

    struct Fixed(Option<HealthReport>);

    #[async_trait]
    impl HealthSource for Fixed {
        async fn fetch_health(&self) -> Result<HealthReport> {
            self.0
                .clone()
                .ok_or_else(|| FetchError::Transport("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_check_health() {
        assert!(check_health(&Fixed(Some(report(true, true, true)))).await.ok);
        assert_eq!(check_health(&Fixed(None)).await, HealthStatus::unreachable());
    }
}
