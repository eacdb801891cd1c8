//! Competing-hypotheses (ACH) file store.
//!
//! The ACH tool root carries four artifacts: the evidence tree at
//! `evidence_example.json` with its derived flat `evidence_list.jsonl`, the
//! ranked set at `hypothesis_example.json`, the staged input at
//! `input/hypothesis.json`, and the bridge payload at `hypothesis.json` that
//! the hypothesis-generation tool reads and merges into.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::evidence::{self, collect_evidence_value};
use crate::infrastructure::traits::FileSystem;

pub const EVIDENCE_JSON_FILE: &str = "evidence_example.json";
pub const EVIDENCE_JSONL_FILE: &str = "evidence_list.jsonl";
pub const HYPOTHESIS_JSON_FILE: &str = "hypothesis_example.json";
pub const INPUT_HYPOTHESIS_FILE: &str = "input/hypothesis.json";
pub const BRIDGE_FILE: &str = "hypothesis.json";

/// At most five slots in the bridge payload, keyed H1..H5.
pub const MAX_BRIDGE_SLOTS: usize = 5;

fn bridge_id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^H\d+$").expect("valid pattern"))
}

/// File store for the ACH worksheet.
pub struct AchStore {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
}

impl AchStore {
    pub fn new(fs: Arc<dyn FileSystem>, root: PathBuf) -> Self {
        Self { fs, root }
    }

    pub fn bridge_path(&self) -> PathBuf {
        self.root.join(BRIDGE_FILE)
    }

    pub fn evidence_json_path(&self) -> PathBuf {
        self.root.join(EVIDENCE_JSON_FILE)
    }

    pub fn evidence_jsonl_path(&self) -> PathBuf {
        self.root.join(EVIDENCE_JSONL_FILE)
    }

    fn write_pretty(&self, path: &PathBuf, value: &Value) -> ApplicationResult<()> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| ApplicationError::io("serialize payload", e.into()))?;
        self.fs
            .ensure_parent(path)
            .map_err(|e| ApplicationError::io(format!("create {}", path.display()), e))?;
        self.fs
            .write(path, &json)
            .map_err(|e| ApplicationError::io(format!("write {}", path.display()), e))
    }

    /// Current bridge payload. Absent, corrupt, and non-object files all
    /// yield an empty object so the reader never fails.
    pub fn load_bridge(&self) -> Value {
        let path = self.bridge_path();
        let content = match self.fs.read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return Value::Object(Map::new()),
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Value::Object(map),
            Ok(_) | Err(_) => {
                debug!("bridge payload unreadable: {}", path.display());
                Value::Object(Map::new())
            }
        }
    }

    /// Merge an update into the bridge payload and persist it.
    pub fn merge_bridge(&self, body: &Value) -> ApplicationResult<()> {
        let mut payload = match self.load_bridge() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        apply_bridge_update(&mut payload, body);
        self.write_pretty(&self.bridge_path(), &Value::Object(payload))
    }

    /// Persist the evidence tree verbatim (pretty-printed) and rewrite the
    /// derived JSONL of every node marked `evidence: "yes"`.
    pub fn save_evidence(&self, tree: &Value) -> ApplicationResult<()> {
        self.write_pretty(&self.evidence_json_path(), tree)?;
        let records = collect_evidence_value(tree);
        let jsonl = evidence::evidence_jsonl(&records);
        let path = self.evidence_jsonl_path();
        self.fs
            .write(&path, &jsonl)
            .map_err(|e| ApplicationError::io(format!("write {}", path.display()), e))
    }

    /// Drop the record with the given id from the evidence JSONL. A missing
    /// file reads as empty.
    pub fn remove_evidence(&self, id: &str) -> ApplicationResult<()> {
        let path = self.evidence_jsonl_path();
        let content = self.fs.read_to_string(&path).unwrap_or_default();
        let out = evidence::remove_from_jsonl(&content, id);
        self.fs
            .write(&path, &out)
            .map_err(|e| ApplicationError::io(format!("write {}", path.display()), e))
    }

    /// Persist the ranked hypothesis set. Callers guarantee an object body.
    pub fn save_hypothesis(&self, body: &Value) -> ApplicationResult<()> {
        self.write_pretty(&self.root.join(HYPOTHESIS_JSON_FILE), body)
    }

    /// Persist the staged input hypothesis set.
    pub fn save_input_hypothesis(&self, body: &Value) -> ApplicationResult<()> {
        self.write_pretty(&self.root.join(INPUT_HYPOTHESIS_FILE), body)
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

/// Merge one update body into a bridge payload.
///
/// `intelligence_requirement` is replaced when present. A `titles[]` array
/// fills slots H1..H5 in order, preserving each slot's existing description.
/// Otherwise a single `{id, title, description}` entry is stored when its id
/// matches `H<digits>`.
pub fn apply_bridge_update(payload: &mut Map<String, Value>, body: &Value) {
    if let Some(requirement) = body.get("intelligence_requirement") {
        let trimmed = match requirement {
            Value::String(s) => s.trim().to_string(),
            other => other.to_string().trim().to_string(),
        };
        payload.insert(
            "intelligence_requirement".to_string(),
            Value::String(trimmed),
        );
    }

    let titles: Option<Vec<String>> = match body.get("titles") {
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .map(|t| match t {
                    Value::String(s) => s.trim().to_string(),
                    Value::Null => String::new(),
                    other => other.to_string().trim().to_string(),
                })
                .collect(),
        ),
        _ => None,
    };

    if let Some(titles) = titles.filter(|t| !t.is_empty()) {
        for (i, title) in titles.iter().take(MAX_BRIDGE_SLOTS).enumerate() {
            let key = format!("H{}", i + 1);
            let existing_description = payload
                .get(&key)
                .and_then(|v| v.get("description"))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            payload.insert(
                key.clone(),
                serde_json::json!({
                    "id": key,
                    "title": title,
                    "description": existing_description,
                }),
            );
        }
        return;
    }

    if let Some(id) = str_field(body, "id").filter(|id| bridge_id_pattern().is_match(id)) {
        let title = str_field(body, "title").unwrap_or_default();
        let description = str_field(body, "description").unwrap_or_default();
        payload.insert(
            id.clone(),
            serde_json::json!({ "id": id, "title": title, "description": description }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::RealFileSystem;
    use serde_json::json;
    use tempfile::TempDir;

    fn store() -> (TempDir, AchStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = AchStore::new(Arc::new(RealFileSystem), dir.path().to_path_buf());
        (dir, store)
    }

    #[test]
    fn given_titles_when_merging_then_slots_capped_and_descriptions_kept() {
        let mut payload = Map::new();
        payload.insert(
            "H2".to_string(),
            json!({"id": "H2", "title": "old", "description": "kept"}),
        );
        let body = json!({"titles": ["a", "b", "c", "d", "e", "f", "g"]});
        apply_bridge_update(&mut payload, &body);
        assert_eq!(payload.len(), 5);
        assert_eq!(payload["H2"]["title"], "b");
        assert_eq!(payload["H2"]["description"], "kept");
        assert!(!payload.contains_key("H6"));
    }

    #[test]
    fn given_single_entry_when_merging_then_id_validated() {
        let mut payload = Map::new();
        apply_bridge_update(&mut payload, &json!({"id": "H3", "title": "t", "description": "d"}));
        assert_eq!(payload["H3"]["title"], "t");
        apply_bridge_update(&mut payload, &json!({"id": "X9", "title": "nope"}));
        assert_eq!(payload.len(), 1);
    }

    #[test]
    fn given_requirement_when_merging_then_trimmed_and_stored() {
        let mut payload = Map::new();
        apply_bridge_update(&mut payload, &json!({"intelligence_requirement": "  intent?  "}));
        assert_eq!(payload["intelligence_requirement"], "intent?");
    }

    #[test]
    fn given_corrupt_bridge_file_when_loading_then_empty_object() {
        let (_dir, store) = store();
        std::fs::write(store.bridge_path(), "[1, 2").expect("write");
        assert_eq!(store.load_bridge(), json!({}));
    }

    #[test]
    fn given_evidence_tree_when_saving_then_json_and_jsonl_written() {
        let (_dir, store) = store();
        let tree = json!({
            "id": "root", "name": "board", "evidence": "",
            "children": [
                {"id": "n1", "name": "sighting", "evidence": "YES", "source": "report"},
                {"id": "n2", "name": "rumor", "evidence": "no"}
            ]
        });
        store.save_evidence(&tree).expect("save");
        let jsonl = std::fs::read_to_string(store.evidence_jsonl_path()).expect("read");
        assert_eq!(jsonl.lines().count(), 1);
        assert!(jsonl.contains("\"evidence\":\"Yes\""));

        store.remove_evidence("n1").expect("remove");
        assert_eq!(
            std::fs::read_to_string(store.evidence_jsonl_path()).expect("read"),
            ""
        );
    }

    #[test]
    fn given_input_hypothesis_when_saving_then_parent_dir_created() {
        let (dir, store) = store();
        store
            .save_input_hypothesis(&json!({"H1": {"id": "H1", "title": "t"}}))
            .expect("save");
        assert!(dir.path().join(INPUT_HYPOTHESIS_FILE).is_file());
    }
}
