//! Allow / ask outcomes.
//!
//! A server that refuses a request answers
//! `{"decision": "ASK", "poi": {"reason", "violations", "hints"}}` so the
//! client can fix the request or fetch a new grant.

use serde::{Deserialize, Serialize};

/// The "what to do about it" part of an `ASK` response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Poi {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub violations: Vec<String>,
    #[serde(default)]
    pub hints: Vec<String>,
}

/// Outcome of checking a verified grant against a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "UPPERCASE")]
pub enum Decision {
    Allow,
    Ask { poi: Poi },
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn poi(&self) -> Option<&Poi> {
        match self {
            Decision::Allow => None,
            Decision::Ask { poi } => Some(poi),
        }
    }
}

/// Read a server decision.
///
/// Only an explicit `ASK` carrying a `poi` object is a refusal; anything else
/// reads as allowed.
pub fn summarize_poi(response: &serde_json::Value) -> Decision {
    if response.get("decision").and_then(serde_json::Value::as_str) != Some("ASK") {
        return Decision::Allow;
    }
    match response.get("poi") {
        Some(poi @ serde_json::Value::Object(_)) => Decision::Ask {
            poi: serde_json::from_value(poi.clone()).unwrap_or_default(),
        },
        _ => Decision::Allow,
    }
}
