//! Nested export/evidence tree.
//!
//! The worksheet tools exchange one nested JSON document per board:
//! `{id, name, depth, evidence, children[], color, description, source,
//! date, time}`. The ACH evidence list flattens every node marked
//! `evidence: "yes"` into JSONL records; the hypothesis forest uses the same
//! shape for export/import.

use serde::{Deserialize, Serialize};

use crate::domain::forest::{new_node_id, Forest, WhatNode, WhoNode, WhyNode};
use crate::domain::{DomainError, DomainResult};

/// One node of the nested export document. Unknown fields in hand-edited
/// files are dropped on read; all fields are always written.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExportNode {
    pub id: String,
    pub name: String,
    pub depth: u32,
    pub evidence: String,
    pub children: Vec<ExportNode>,
    pub color: String,
    pub description: String,
    pub source: String,
    pub date: String,
    pub time: String,
}

impl ExportNode {
    fn leaf(name: &str, depth: u32) -> Self {
        Self {
            id: new_node_id(),
            name: name.to_string(),
            depth,
            ..Self::default()
        }
    }
}

/// Flattened record for one evidence-bearing node, as written to
/// `evidence_list.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub source: String,
    pub date: String,
    pub time: String,
    pub evidence: String,
}

/// Collect every node whose `evidence` field equals "yes" case-insensitively,
/// in depth-first document order.
pub fn collect_evidence(root: &ExportNode) -> Vec<EvidenceRecord> {
    let mut out = Vec::new();
    collect_into(root, &mut out);
    out
}

fn collect_into(node: &ExportNode, out: &mut Vec<EvidenceRecord>) {
    if node.evidence.trim().eq_ignore_ascii_case("yes") {
        out.push(EvidenceRecord {
            id: node.id.clone(),
            name: node.name.clone(),
            description: node.description.clone(),
            source: node.source.clone(),
            date: node.date.clone(),
            time: node.time.clone(),
            evidence: "Yes".to_string(),
        });
    }
    for child in &node.children {
        collect_into(child, out);
    }
}

/// Collect evidence records from an untyped JSON document. Saved files are
/// loosely shaped, so string fields are coerced and missing ones default to
/// empty.
pub fn collect_evidence_value(root: &serde_json::Value) -> Vec<EvidenceRecord> {
    fn field(node: &serde_json::Value, key: &str) -> String {
        match node.get(key) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    fn walk(node: &serde_json::Value, out: &mut Vec<EvidenceRecord>) {
        if field(node, "evidence").trim().eq_ignore_ascii_case("yes") {
            out.push(EvidenceRecord {
                id: field(node, "id"),
                name: field(node, "name"),
                description: field(node, "description"),
                source: field(node, "source"),
                date: field(node, "date"),
                time: field(node, "time"),
                evidence: "Yes".to_string(),
            });
        }
        if let Some(serde_json::Value::Array(children)) = node.get("children") {
            for child in children {
                walk(child, out);
            }
        }
    }

    let mut out = Vec::new();
    walk(root, &mut out);
    out
}

/// Render evidence records as JSONL: one object per line, trailing newline
/// only when at least one record exists.
pub fn evidence_jsonl(records: &[EvidenceRecord]) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(records.len());
    for record in records {
        match serde_json::to_string(record) {
            Ok(line) => lines.push(line),
            Err(_) => continue,
        }
    }
    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Drop every JSONL line whose record id matches. Blank lines are dropped;
/// unparseable lines are preserved untouched.
pub fn remove_from_jsonl(content: &str, id: &str) -> String {
    let kept: Vec<&str> = content
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return false;
            }
            match serde_json::from_str::<serde_json::Value>(trimmed) {
                Ok(value) => value.get("id").and_then(|v| v.as_str()) != Some(id),
                Err(_) => true,
            }
        })
        .collect();
    let mut out = kept.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Escape unescaped control characters inside JSON string literals so that
/// hand-edited documents still parse. Content outside strings is unchanged.
pub fn sanitize_json(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_string = false;
    let mut escaped = false;
    for c in raw.chars() {
        if escaped {
            out.push(c);
            escaped = false;
            continue;
        }
        if c == '\\' && in_string {
            out.push(c);
            escaped = true;
            continue;
        }
        if c == '"' {
            in_string = !in_string;
            out.push(c);
            continue;
        }
        if in_string && (c as u32) < 32 {
            match c {
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                _ => out.push(' '),
            }
            continue;
        }
        out.push(c);
    }
    out
}

impl Forest {
    /// Export the forest as one nested document. Who/What/Why map to depths
    /// 1/2/3 under a synthetic root; a Why's elaboration travels in
    /// `description`.
    pub fn to_export_tree(&self, root_name: &str) -> ExportNode {
        let mut root = ExportNode::leaf(root_name, 0);
        for who in &self.groups {
            let mut who_node = ExportNode::leaf(&who.label, 1);
            for what in &who.whats {
                let mut what_node = ExportNode::leaf(&what.label, 2);
                for why in &what.whys {
                    let mut why_node = ExportNode::leaf(&why.label, 3);
                    why_node.description = why.edit_value.clone();
                    what_node.children.push(why_node);
                }
                who_node.children.push(what_node);
            }
            root.children.push(who_node);
        }
        root
    }

    /// Rebuild a forest from an export document. The result is isomorphic to
    /// the exported forest (labels, structure, elaborations) but every node
    /// receives a fresh id. Nodes deeper than Why are rejected.
    pub fn from_export_tree(root: &ExportNode) -> DomainResult<Forest> {
        let mut forest = Forest::new();
        for who in &root.children {
            let mut who_node = WhoNode::new(who.name.clone());
            for what in &who.children {
                let mut what_node = WhatNode::new(what.name.clone());
                for why in &what.children {
                    if !why.children.is_empty() {
                        return Err(DomainError::InvalidExportTree(format!(
                            "node '{}' nests below the Why level",
                            why.name
                        )));
                    }
                    let mut why_node = WhyNode::new(why.name.clone());
                    why_node.edit_value = why.description.clone();
                    what_node.whys.push(why_node);
                }
                who_node.whats.push(what_node);
            }
            forest.groups.push(who_node);
        }
        Ok(forest)
    }
}
