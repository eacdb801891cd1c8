//! Circle-boarding worksheet state.
//!
//! Six category lanes (who/what/why/when/where/how), six "So what?" lanes and
//! six trash lanes, each holding `{id, text}` items. Saved states arrive in
//! several vintages: bare strings instead of items, a single `so_what` array
//! instead of lanes, extra lanes beyond six. Normalization accepts all of
//! them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::forest::new_node_id;

pub const LANE_COUNT: usize = 6;

/// Category keys in lane order.
pub const CATEGORY_KEYS: [&str; LANE_COUNT] = ["who", "what", "why", "when", "where", "how"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardItem {
    pub id: String,
    pub text: String,
}

impl BoardItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: new_node_id(),
            text: text.into(),
        }
    }
}

/// Full board state as persisted by the save endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BoardState {
    pub who: Vec<BoardItem>,
    pub what: Vec<BoardItem>,
    pub why: Vec<BoardItem>,
    pub when: Vec<BoardItem>,
    #[serde(rename = "where")]
    pub location: Vec<BoardItem>,
    pub how: Vec<BoardItem>,
    #[serde(rename = "soWhatLanes")]
    pub so_what_lanes: Vec<Vec<BoardItem>>,
    #[serde(rename = "trashLanes")]
    pub trash_lanes: Vec<Vec<BoardItem>>,
}

impl BoardState {
    pub fn empty() -> Self {
        Self {
            so_what_lanes: vec![Vec::new(); LANE_COUNT],
            trash_lanes: vec![Vec::new(); LANE_COUNT],
            ..Self::default()
        }
    }

    fn category_mut(&mut self, key: &str) -> Option<&mut Vec<BoardItem>> {
        match key {
            "who" => Some(&mut self.who),
            "what" => Some(&mut self.what),
            "why" => Some(&mut self.why),
            "when" => Some(&mut self.when),
            "where" => Some(&mut self.location),
            "how" => Some(&mut self.how),
            _ => None,
        }
    }

    /// Build a fresh board from imported category labels. Imported
    /// `so_what` entries land in lane zero.
    pub fn from_categories(parsed: &ParsedCategories) -> Self {
        fn items(labels: &[String]) -> Vec<BoardItem> {
            labels.iter().map(BoardItem::new).collect()
        }
        let mut out = Self::empty();
        out.who = items(&parsed.who);
        out.what = items(&parsed.what);
        out.why = items(&parsed.why);
        out.when = items(&parsed.when);
        out.location = items(&parsed.location);
        out.how = items(&parsed.how);
        out.so_what_lanes[0] = items(&parsed.so_what);
        out
    }

    pub fn has_any_items(&self) -> bool {
        let categories = [
            &self.who,
            &self.what,
            &self.why,
            &self.when,
            &self.location,
            &self.how,
        ];
        categories.iter().any(|c| !c.is_empty())
            || self.so_what_lanes.iter().any(|l| !l.is_empty())
            || self.trash_lanes.iter().any(|l| !l.is_empty())
    }
}

/// Accept an item in any historical shape: `{id, text}` objects pass
/// through, bare strings get a fresh id, everything else is dropped.
fn ensure_item(value: &Value) -> Option<BoardItem> {
    match value {
        Value::String(s) => Some(BoardItem::new(s.clone())),
        Value::Object(map) => {
            let id = map.get("id")?.as_str()?.to_string();
            let text = map.get("text")?;
            let text = match text {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some(BoardItem { id, text })
        }
        _ => None,
    }
}

fn ensure_items(value: Option<&Value>) -> Vec<BoardItem> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(ensure_item).collect(),
        _ => Vec::new(),
    }
}

/// Normalize an arbitrary saved state. Lanes beyond six are dropped; a
/// legacy `so_what` array lands in lane zero.
pub fn normalize_state(raw: &Value) -> BoardState {
    let mut out = BoardState::empty();
    for key in CATEGORY_KEYS {
        let items = ensure_items(raw.get(key));
        if let Some(slot) = out.category_mut(key) {
            *slot = items;
        }
    }
    if let Some(Value::Array(lanes)) = raw.get("soWhatLanes") {
        for (i, lane) in lanes.iter().take(LANE_COUNT).enumerate() {
            out.so_what_lanes[i] = ensure_items(Some(lane));
        }
    } else if raw.get("so_what").is_some() {
        out.so_what_lanes[0] = ensure_items(raw.get("so_what"));
    }
    if let Some(Value::Array(lanes)) = raw.get("trashLanes") {
        for (i, lane) in lanes.iter().take(LANE_COUNT).enumerate() {
            out.trash_lanes[i] = ensure_items(Some(lane));
        }
    }
    out
}

/// Category labels parsed from one of the importable text shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCategories {
    pub who: Vec<String>,
    pub what: Vec<String>,
    pub why: Vec<String>,
    pub when: Vec<String>,
    pub location: Vec<String>,
    pub how: Vec<String>,
    pub so_what: Vec<String>,
}

impl ParsedCategories {
    fn slot_mut(&mut self, key: &str) -> Option<&mut Vec<String>> {
        match key {
            "who" => Some(&mut self.who),
            "what" => Some(&mut self.what),
            "why" => Some(&mut self.why),
            "when" => Some(&mut self.when),
            "where" => Some(&mut self.location),
            "how" => Some(&mut self.how),
            "so_what" => Some(&mut self.so_what),
            _ => None,
        }
    }
}

fn header_key(header: &str) -> Option<&'static str> {
    match header {
        "Who?" => Some("who"),
        "What?" => Some("what"),
        "Where?" => Some("where"),
        "When?" => Some("when"),
        "Why?" => Some("why"),
        "How?" => Some("how"),
        "So what?" => Some("so_what"),
        _ => None,
    }
}

/// Markdown-like shape: `Who?` headers followed by `- item` bullets.
pub fn parse_markdown_like(text: &str) -> ParsedCategories {
    let mut out = ParsedCategories::default();
    let mut current: Option<&'static str> = None;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.ends_with('?') && !trimmed.is_empty() {
            current = header_key(trimmed);
            continue;
        }
        if let (Some(key), Some(rest)) = (current, trimmed.strip_prefix("- ")) {
            if let Some(slot) = out.slot_mut(key) {
                slot.push(rest.trim().to_string());
            }
        }
    }
    out
}

/// Yaml-like shape: `who:` keys followed by `- item` bullets. Keys are
/// lowercased with whitespace collapsed to underscores.
pub fn parse_yaml_like(text: &str) -> ParsedCategories {
    let mut out = ParsedCategories::default();
    let mut current: Option<String> = None;
    for line in text.lines() {
        let trimmed_end = line.trim_end();
        if let Some(key) = trimmed_end.strip_suffix(':') {
            let normalized = key
                .trim()
                .to_lowercase()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("_");
            current = if out.slot_mut(&normalized).is_some() {
                Some(normalized)
            } else {
                None
            };
            continue;
        }
        let trimmed = line.trim_start();
        if let (Some(key), Some(rest)) = (current.as_deref(), trimmed.strip_prefix("- ")) {
            if let Some(slot) = out.slot_mut(key) {
                slot.push(rest.trim().to_string());
            }
        }
    }
    out
}

fn strings_of(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.to_string())
            .collect(),
        _ => Vec::new(),
    }
}

/// Dispatch on shape: JSON object, yaml-like, or markdown-like.
pub fn parse_import(text: &str) -> ParsedCategories {
    let raw = text.trim();
    if raw.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<Value>(raw) {
            return ParsedCategories {
                who: strings_of(value.get("who")),
                what: strings_of(value.get("what")),
                why: strings_of(value.get("why")),
                when: strings_of(value.get("when")),
                location: strings_of(value.get("where")),
                how: strings_of(value.get("how")),
                so_what: strings_of(value.get("so_what")),
            };
        }
        return parse_markdown_like(text);
    }
    if raw
        .lines()
        .any(|l| l.trim_end().ends_with(':') && !l.trim().starts_with('-'))
    {
        return parse_yaml_like(text);
    }
    parse_markdown_like(text)
}

/// Aggregate a JSONL indicator journal into one set of category labels.
/// Invalid lines are skipped.
pub fn parse_jsonl_indicators(text: &str) -> ParsedCategories {
    let mut out = ParsedCategories::default();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Ok(record) = serde_json::from_str::<Value>(trimmed) else {
            continue;
        };
        for (key, field) in [
            ("what", "what"),
            ("who", "who"),
            ("when", "when"),
            ("where", "where"),
            ("why", "why"),
            ("how", "how"),
        ] {
            let labels: Vec<String> = match record.get(field) {
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
                _ => Vec::new(),
            };
            if let Some(slot) = out.slot_mut(key) {
                slot.extend(labels);
            }
        }
    }
    out
}
