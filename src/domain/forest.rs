//! The Who -> What -> Why hypothesis forest.
//!
//! A forest is an ordered list of [`WhoNode`] groups. Every node carries a
//! stable id and a display label; Why leaves additionally carry a free-text
//! elaboration (`edit_value`). Label uniqueness is scoped to siblings under
//! one parent, not global: the same label may appear as a Who and again as a
//! What under some other Who.
//!
//! All mutation here is pure data manipulation. Rendering and persistence are
//! the caller's concern (see `application::session`).

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Generate a fresh node id. Ids are never reused within a forest.
pub fn new_node_id() -> String {
    Uuid::new_v4().to_string()
}

/// Leaf node. `edit_value` holds the analyst's elaboration of the
/// permutation, distinct from the label itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WhyNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "editValue", default)]
    pub edit_value: String,
}

impl WhyNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: new_node_id(),
            label: label.into(),
            edit_value: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WhatNode {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub whys: Vec<WhyNode>,
}

impl WhatNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: new_node_id(),
            label: label.into(),
            whys: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WhoNode {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub whats: Vec<WhatNode>,
}

impl WhoNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: new_node_id(),
            label: label.into(),
            whats: Vec::new(),
        }
    }

    /// Deep-copy this group and regenerate every id in the copy.
    /// No id or reference is ever shared between two WhoNode instances.
    pub fn clone_with_fresh_ids(&self) -> Self {
        let mut copy = self.clone();
        copy.id = new_node_id();
        for what in &mut copy.whats {
            what.id = new_node_id();
            for why in &mut what.whys {
                why.id = new_node_id();
            }
        }
        copy
    }
}

/// Placement depth for fan-out adds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    Who,
    What,
    Why,
}

impl FromStr for Depth {
    type Err = DomainError;

    /// Only the exact lowercase tokens are recognized; anything else is
    /// rejected so a bad destination token never mutates the forest.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "who" => Ok(Depth::Who),
            "what" => Ok(Depth::What),
            "why" => Ok(Depth::Why),
            other => Err(DomainError::UnknownDepth(other.to_string())),
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Depth::Who => write!(f, "who"),
            Depth::What => write!(f, "what"),
            Depth::Why => write!(f, "why"),
        }
    }
}

/// Ordered collection of WhoNode groups for one generation session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Forest {
    pub groups: Vec<WhoNode>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Fan-out add of a single label at the chosen depth.
    ///
    /// - Who: one new group with no Whats.
    /// - What: one new WhatNode under every existing Who, unless that Who
    ///   already has a What with the same trimmed label.
    /// - Why: one new WhyNode under every existing What of every Who, with
    ///   the same per-What duplicate guard.
    ///
    /// Blank or whitespace-only labels are a silent no-op.
    pub fn add(&mut self, depth: Depth, label: &str) {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return;
        }
        match depth {
            Depth::Who => {
                self.groups.push(WhoNode::new(trimmed));
            }
            Depth::What => {
                for who in &mut self.groups {
                    let has_same = who.whats.iter().any(|w| w.label.trim() == trimmed);
                    if !has_same {
                        who.whats.push(WhatNode::new(trimmed));
                    }
                }
            }
            Depth::Why => {
                for who in &mut self.groups {
                    for what in &mut who.whats {
                        let has_same = what.whys.iter().any(|y| y.label.trim() == trimmed);
                        if !has_same {
                            what.whys.push(WhyNode::new(trimmed));
                        }
                    }
                }
            }
        }
    }

    /// Index of the reference group: the Who with the most Whats, ties broken
    /// by a left-to-right fold where last-max wins.
    fn reference_index(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, who) in self.groups.iter().enumerate() {
            match best {
                Some(b) if self.groups[b].whats.len() > who.whats.len() => {}
                _ => best = Some(i),
            }
        }
        best
    }

    /// Copy What/Why structure from the fullest group onto every group,
    /// filling gaps without discarding nodes or duplicating labels.
    ///
    /// Step 1 appends reference Whats at positions beyond the target's
    /// original What count, cloning the full Why list (skipped when the
    /// target already has a What with that trimmed label anywhere).
    /// Step 2 aligns Why lists position by position against the reference.
    /// The Why alignment is deliberately index-based rather than
    /// label-keyed: branches whose ordering diverged from the reference are
    /// compared by position, matching the saved states this format grew up
    /// with. Do not "fix" this into a label-keyed merge.
    ///
    /// Every appended node receives a fresh id; `edit_value` is carried over
    /// from the reference. No-op on an empty forest or when the reference
    /// has no Whats.
    pub fn sync_with_reference(&mut self) {
        let Some(ref_idx) = self.reference_index() else {
            return;
        };
        let reference = self.groups[ref_idx].clone();
        if reference.whats.is_empty() {
            return;
        }

        for who in &mut self.groups {
            // Step 1: fill in missing Whats beyond the current count.
            // The duplicate guard sees Whats appended earlier in this loop.
            let original_len = who.whats.len();
            for ref_what in reference.whats.iter().skip(original_len) {
                let ref_label = ref_what.label.trim();
                if who.whats.iter().any(|w| w.label.trim() == ref_label) {
                    continue;
                }
                who.whats.push(WhatNode {
                    id: new_node_id(),
                    label: ref_what.label.clone(),
                    whys: ref_what
                        .whys
                        .iter()
                        .map(|ref_why| WhyNode {
                            id: new_node_id(),
                            label: ref_why.label.clone(),
                            edit_value: ref_why.edit_value.clone(),
                        })
                        .collect(),
                });
            }

            // Step 2: position-indexed Why alignment.
            for (i, ref_what) in reference.whats.iter().enumerate() {
                let Some(what) = who.whats.get_mut(i) else {
                    continue;
                };
                for ref_why in ref_what.whys.iter().skip(what.whys.len()) {
                    let ref_label = ref_why.label.trim();
                    if what.whys.iter().any(|y| y.label.trim() == ref_label) {
                        continue;
                    }
                    what.whys.push(WhyNode {
                        id: new_node_id(),
                        label: ref_why.label.clone(),
                        edit_value: ref_why.edit_value.clone(),
                    });
                }
            }
        }
    }

    /// Cascade removal: delete every node at any depth whose trimmed label
    /// equals the given label. Whole groups go first, then Whats and Whys
    /// anywhere in the remaining forest. All matches are removed in one
    /// pass, not just the first.
    pub fn remove_label(&mut self, label: &str) {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return;
        }
        self.groups.retain(|w| w.label.trim() != trimmed);
        for who in &mut self.groups {
            who.whats.retain(|w| w.label.trim() != trimmed);
            for what in &mut who.whats {
                what.whys.retain(|y| y.label.trim() != trimmed);
            }
        }
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.groups.clear();
    }

    /// Every label present anywhere in the forest. Drives the "already
    /// generated" marker next to source items.
    pub fn generated_labels(&self) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        for who in &self.groups {
            set.insert(who.label.clone());
            for what in &who.whats {
                set.insert(what.label.clone());
                for why in &what.whys {
                    set.insert(why.label.clone());
                }
            }
        }
        set
    }

    /// Total node count across all depths.
    pub fn node_count(&self) -> usize {
        self.groups
            .iter()
            .map(|who| {
                1 + who
                    .whats
                    .iter()
                    .map(|what| 1 + what.whys.len())
                    .sum::<usize>()
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest_with(labels: &[(&str, &[&str])]) -> Forest {
        let mut forest = Forest::new();
        for (who, whats) in labels {
            let mut node = WhoNode::new(*who);
            for what in *whats {
                node.whats.push(WhatNode::new(*what));
            }
            forest.groups.push(node);
        }
        forest
    }

    #[test]
    fn given_blank_label_when_adding_then_forest_unchanged() {
        let mut forest = Forest::new();
        forest.add(Depth::Who, "   ");
        assert!(forest.is_empty());
    }

    #[test]
    fn given_unknown_depth_token_when_parsing_then_rejected() {
        assert!("WHO".parse::<Depth>().is_err());
        assert!("whose".parse::<Depth>().is_err());
        assert!("who".parse::<Depth>().is_ok());
    }

    #[test]
    fn given_two_groups_when_adding_what_then_fans_out_to_both() {
        let mut forest = forest_with(&[("Nation X", &[]), ("Nation Y", &[])]);
        forest.add(Depth::What, "Sabotage");
        assert_eq!(forest.groups[0].whats.len(), 1);
        assert_eq!(forest.groups[1].whats.len(), 1);
        assert_eq!(forest.groups[0].whats[0].label, "Sabotage");
        // ids must not be shared across the fan-out
        assert_ne!(forest.groups[0].whats[0].id, forest.groups[1].whats[0].id);
    }

    #[test]
    fn given_existing_label_when_adding_what_again_then_duplicate_guard_holds() {
        let mut forest = forest_with(&[("Nation X", &[]), ("Nation Y", &[])]);
        forest.add(Depth::What, "Sabotage");
        let before = forest.clone();
        forest.add(Depth::What, "Sabotage");
        // modulo ids nothing changed; compare structurally
        assert_eq!(forest.groups.len(), before.groups.len());
        for (a, b) in forest.groups.iter().zip(before.groups.iter()) {
            assert_eq!(a.whats.len(), b.whats.len());
        }
    }

    #[test]
    fn given_whitespace_variants_when_adding_then_trimmed_label_guard_applies() {
        let mut forest = forest_with(&[("A", &["Economic"])]);
        forest.add(Depth::What, "  Economic  ");
        assert_eq!(forest.groups[0].whats.len(), 1);
    }

    #[test]
    fn given_why_add_when_forest_has_whats_then_every_what_gains_leaf() {
        let mut forest = forest_with(&[("A", &["Economic", "Military"]), ("B", &["Economic"])]);
        forest.add(Depth::Why, "Deterrence");
        for who in &forest.groups {
            for what in &who.whats {
                assert_eq!(what.whys.len(), 1);
                assert_eq!(what.whys[0].label, "Deterrence");
                assert_eq!(what.whys[0].edit_value, "");
            }
        }
    }

    #[test]
    fn given_tied_what_counts_when_selecting_reference_then_last_max_wins() {
        let forest = forest_with(&[("A", &["x"]), ("B", &["y"])]);
        assert_eq!(forest.reference_index(), Some(1));
    }

    #[test]
    fn given_empty_forest_when_syncing_then_noop() {
        let mut forest = Forest::new();
        forest.sync_with_reference();
        assert!(forest.is_empty());
    }

    #[test]
    fn given_reference_without_whats_when_syncing_then_noop() {
        let mut forest = forest_with(&[("A", &[])]);
        let before = forest.clone();
        forest.sync_with_reference();
        assert_eq!(forest, before);
    }

    #[test]
    fn given_uneven_groups_when_syncing_then_gap_filled_with_fresh_ids() {
        let mut forest = forest_with(&[
            ("Nation X", &["Economic", "Military"]),
            ("Nation Y", &["Economic"]),
        ]);
        let economic_id = forest.groups[1].whats[0].id.clone();
        forest.sync_with_reference();

        let y = &forest.groups[1];
        assert_eq!(y.whats.len(), 2);
        assert_eq!(y.whats[1].label, "Military");
        assert!(y.whats[1].whys.is_empty());
        // existing node untouched, appended node has an id of its own
        assert_eq!(y.whats[0].id, economic_id);
        assert_ne!(y.whats[1].id, forest.groups[0].whats[1].id);
    }

    #[test]
    fn given_reference_with_whys_when_syncing_then_why_lists_carried_over() {
        let mut forest = forest_with(&[("A", &[]), ("B", &[])]);
        forest.groups[1].whats.push(WhatNode {
            id: new_node_id(),
            label: "Cyber".into(),
            whys: vec![WhyNode {
                id: new_node_id(),
                label: "Disruption".into(),
                edit_value: "grid attack".into(),
            }],
        });
        forest.sync_with_reference();

        let a = &forest.groups[0];
        assert_eq!(a.whats.len(), 1);
        assert_eq!(a.whats[0].whys.len(), 1);
        assert_eq!(a.whats[0].whys[0].label, "Disruption");
        assert_eq!(a.whats[0].whys[0].edit_value, "grid attack");
    }

    #[test]
    fn given_synced_forest_when_syncing_again_then_idempotent() {
        let mut forest = forest_with(&[
            ("Nation X", &["Economic", "Military"]),
            ("Nation Y", &["Economic"]),
        ]);
        forest.groups[0].whats[0]
            .whys
            .push(WhyNode::new("Pressure"));
        forest.sync_with_reference();
        let once = forest.clone();
        forest.sync_with_reference();
        assert_eq!(forest, once);
    }

    #[test]
    fn given_synced_forest_then_union_property_and_no_duplicate_siblings() {
        let mut forest = forest_with(&[
            ("A", &["Economic"]),
            ("B", &["Military", "Economic", "Cyber"]),
            ("C", &[]),
        ]);
        forest.sync_with_reference();

        let ref_labels: Vec<String> = forest.groups[1]
            .whats
            .iter()
            .map(|w| w.label.clone())
            .collect();
        for who in &forest.groups {
            let labels: Vec<&str> = who.whats.iter().map(|w| w.label.trim()).collect();
            for wanted in &ref_labels {
                assert!(
                    labels.contains(&wanted.trim()),
                    "{} missing {}",
                    who.label,
                    wanted
                );
            }
            let unique: BTreeSet<&&str> = labels.iter().collect();
            assert_eq!(unique.len(), labels.len(), "duplicate siblings in {}", who.label);
        }
    }

    #[test]
    fn given_add_then_cascade_remove_then_who_list_restored() {
        let mut forest = forest_with(&[("A", &["x"]), ("B", &[])]);
        let before: Vec<String> = forest.groups.iter().map(|w| w.label.clone()).collect();
        forest.add(Depth::Who, "Insider");
        forest.remove_label("Insider");
        let after: Vec<String> = forest.groups.iter().map(|w| w.label.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn given_label_at_every_depth_when_removing_then_all_occurrences_go() {
        let mut forest = forest_with(&[("Storm", &["Storm", "Other"])]);
        forest.groups[0].whats[1].whys.push(WhyNode::new("Storm"));
        forest.groups.push(WhoNode::new("Keep"));
        forest.groups[1].whats.push(WhatNode::new("Storm"));

        forest.remove_label("Storm");

        assert_eq!(forest.groups.len(), 1);
        assert_eq!(forest.groups[0].label, "Keep");
        assert!(forest.groups[0].whats.is_empty());
    }

    #[test]
    fn given_group_when_cloning_with_fresh_ids_then_no_id_survives() {
        let mut who = WhoNode::new("A");
        who.whats.push(WhatNode::new("w"));
        who.whats[0].whys.push(WhyNode::new("y"));

        let copy = who.clone_with_fresh_ids();

        assert_ne!(copy.id, who.id);
        assert_ne!(copy.whats[0].id, who.whats[0].id);
        assert_ne!(copy.whats[0].whys[0].id, who.whats[0].whys[0].id);
        assert_eq!(copy.whats[0].whys[0].label, "y");
    }

    #[test]
    fn given_forest_when_collecting_generated_labels_then_all_depths_present() {
        let mut forest = forest_with(&[("A", &["w"])]);
        forest.groups[0].whats[0].whys.push(WhyNode::new("y"));
        let labels = forest.generated_labels();
        assert!(labels.contains("A"));
        assert!(labels.contains("w"));
        assert!(labels.contains("y"));
    }

    #[test]
    fn given_snapshot_json_without_edit_value_when_deserializing_then_defaults_empty() {
        let raw = r#"[{"id":"1","label":"A","whats":[{"id":"2","label":"w","whys":[{"id":"3","label":"y"}]}]}]"#;
        let forest: Forest = serde_json::from_str(raw).expect("parse");
        assert_eq!(forest.groups[0].whats[0].whys[0].edit_value, "");
    }
}
