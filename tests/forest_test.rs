//! End-to-end properties of the hypothesis forest.

use rstest::rstest;

use satbench::domain::{Depth, Forest};

fn labels(forest: &Forest) -> Vec<&str> {
    forest.groups.iter().map(|w| w.label.as_str()).collect()
}

/// Build the two-nation scenario: Nation X has been fleshed out, Nation Y
/// was added later and is still empty.
fn two_nations() -> Forest {
    let mut forest = Forest::new();
    forest.add(Depth::Who, "Nation X");
    forest.add(Depth::What, "Economic");
    forest.add(Depth::What, "Military");
    forest.add(Depth::Why, "Deterrence");
    forest.add(Depth::Who, "Nation Y");
    forest
}

#[test]
fn given_fresh_who_when_syncing_then_reference_structure_copied() {
    let mut forest = two_nations();
    forest.sync_with_reference();

    let nation_y = &forest.groups[1];
    assert_eq!(nation_y.label, "Nation Y");
    assert_eq!(nation_y.whats.len(), 2);
    assert_eq!(nation_y.whats[0].label, "Economic");
    assert_eq!(nation_y.whats[1].label, "Military");
    assert_eq!(nation_y.whats[0].whys[0].label, "Deterrence");

    // Copied nodes never share ids with the reference.
    let nation_x = &forest.groups[0];
    assert_ne!(nation_x.whats[0].id, nation_y.whats[0].id);
    assert_ne!(nation_x.whats[0].whys[0].id, nation_y.whats[0].whys[0].id);
}

#[test]
fn given_synced_forest_when_syncing_again_then_unchanged() {
    let mut forest = two_nations();
    forest.sync_with_reference();
    let before = forest.clone();
    forest.sync_with_reference();
    assert_eq!(forest, before);
}

#[test]
fn given_sync_then_every_group_covers_reference_labels() {
    let mut forest = two_nations();
    forest.add(Depth::Who, "Nation Z");
    forest.sync_with_reference();

    for who in &forest.groups {
        let what_labels: Vec<&str> = who.whats.iter().map(|w| w.label.as_str()).collect();
        assert!(what_labels.contains(&"Economic"));
        assert!(what_labels.contains(&"Military"));
        // No duplicated siblings.
        let mut sorted = what_labels.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), what_labels.len());
    }
}

#[test]
fn given_whatless_reference_when_syncing_then_no_op() {
    let mut forest = Forest::new();
    forest.add(Depth::Who, "Alpha");
    forest.add(Depth::Who, "Beta");
    let before = forest.clone();
    forest.sync_with_reference();
    assert_eq!(forest, before);
}

#[rstest]
#[case("who")]
#[case("what")]
#[case("why")]
fn given_blank_label_when_adding_then_silent_no_op(#[case] depth: &str) {
    let mut forest = two_nations();
    let before = forest.clone();
    forest.add(depth.parse().expect("depth token"), "   ");
    assert_eq!(forest, before);
}

#[test]
fn given_add_then_cascade_remove_then_who_list_restored() {
    let mut forest = two_nations();
    let before = labels(&forest)
        .into_iter()
        .map(String::from)
        .collect::<Vec<_>>();

    forest.add(Depth::Who, "Nation Q");
    forest.remove_label("Nation Q");
    assert_eq!(labels(&forest), before);
}

#[test]
fn given_shared_label_when_removing_then_cascades_every_depth() {
    let mut forest = two_nations();
    forest.add(Depth::What, "Deterrence");
    forest.remove_label("Deterrence");

    for who in &forest.groups {
        for what in &who.whats {
            assert_ne!(what.label, "Deterrence");
            assert!(what.whys.iter().all(|y| y.label != "Deterrence"));
        }
    }
}

#[test]
fn given_duplicate_what_when_adding_then_guarded_per_parent() {
    let mut forest = two_nations();
    let counts: Vec<usize> = forest.groups.iter().map(|w| w.whats.len()).collect();
    forest.add(Depth::What, "  Economic  ");
    // Nation X already has Economic; Nation Y gains it.
    assert_eq!(forest.groups[0].whats.len(), counts[0]);
    assert_eq!(forest.groups[1].whats.len(), counts[1] + 1);
}

#[test]
fn given_forest_when_exporting_then_import_is_isomorphic() {
    let mut forest = two_nations();
    forest.sync_with_reference();
    forest.groups[0].whats[0].whys[0].edit_value = "sanction leverage".into();

    let exported = forest.to_export_tree("hypotheses");
    let rebuilt = Forest::from_export_tree(&exported).expect("import");

    assert_eq!(rebuilt.node_count(), forest.node_count());
    assert_eq!(rebuilt.generated_labels(), forest.generated_labels());
    assert_eq!(
        rebuilt.groups[0].whats[0].whys[0].edit_value,
        "sanction leverage"
    );
    assert_ne!(rebuilt.groups[0].id, forest.groups[0].id);
}
