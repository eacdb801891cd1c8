//! Hypothesis-keyword indicator records (JSONL journal format).
//!
//! One record per "Generate Hypothesis Keywords" action, one JSON object per
//! line. Incoming bodies are loosely shaped (scalars where arrays belong,
//! stale timestamps, stray blanks), so everything funnels through
//! [`IndicatorRecord::normalize`] before it is appended to the journal.

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

/// One normalized journal record. Field order matches the wire format.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndicatorRecord {
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(default)]
    pub what: Vec<String>,
    #[serde(default)]
    pub who: Vec<String>,
    #[serde(default)]
    pub when: Vec<String>,
    #[serde(default, rename = "where")]
    pub location: Vec<String>,
    #[serde(default)]
    pub why: Vec<String>,
    #[serde(default)]
    pub how: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(rename = "appVersion", skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
}

fn created_at_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}").expect("valid pattern")
    })
}

/// Coerce a JSON value into a trimmed, blank-free string array.
/// Scalars become a one-element array; null and absent become empty.
fn to_string_array(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(json_value_to_trimmed)
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            let s = json_value_to_trimmed(other);
            if s.is_empty() {
                Vec::new()
            } else {
                vec![s]
            }
        }
    }
}

fn json_value_to_trimmed(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

fn optional_string(value: Option<&Value>) -> Option<String> {
    let s = json_value_to_trimmed(value?);
    if s.is_empty() || s == "null" {
        None
    } else {
        Some(s)
    }
}

impl IndicatorRecord {
    /// Normalize an arbitrary JSON body into a journal record.
    ///
    /// A `createdAt` that does not start with an ISO timestamp is replaced
    /// with `now`; optional string fields are kept only when non-blank.
    pub fn normalize(body: &Value, now: DateTime<Utc>) -> Self {
        let created_at = body
            .get("createdAt")
            .map(json_value_to_trimmed)
            .filter(|s| created_at_pattern().is_match(s))
            .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true));

        Self {
            created_at,
            what: to_string_array(body.get("what")),
            who: to_string_array(body.get("who")),
            when: to_string_array(body.get("when")),
            location: to_string_array(body.get("where")),
            why: to_string_array(body.get("why")),
            how: to_string_array(body.get("how")),
            id: optional_string(body.get("id")),
            evidence: optional_string(body.get("evidence")),
            session_id: optional_string(body.get("sessionId")),
            app_version: optional_string(body.get("appVersion")),
        }
    }

    /// Serialize as one JSONL line, trailing newline included.
    pub fn to_jsonl_line(&self) -> String {
        let mut line = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        line.push('\n');
        line
    }
}
