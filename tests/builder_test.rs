//! Tests for building trees from flat entity forests.

use rstest::rstest;

use entitree::application::sample_forests;
use entitree::domain::{
    build_tree, BusinessUnitInfo, CompanyInfo, EntityData, EntityNode, Level, TreeBuilder,
    ValidationIssue,
};
use entitree::util::testing;

fn forest(divisions: &[(&str, &str)], units: &[(&str, &str)], plants: &[(&str, &str)]) -> EntityData {
    let rows = |pairs: &[(&str, &str)]| -> Vec<BusinessUnitInfo> {
        pairs
            .iter()
            .map(|(name, parent)| BusinessUnitInfo::named(*name, *parent))
            .collect()
    };
    EntityData {
        level2: rows(divisions),
        level3: rows(units),
        level4: rows(plants),
        ..EntityData::new(CompanyInfo::named("Acme"))
    }
}

/// Every non-root node sits under the node its source record names as parent.
fn assert_parents_match_source(data: &EntityData, node: &EntityNode) {
    for child in &node.children {
        let record = &data.units(child.level)[child.index];
        assert_eq!(record.entity_name, child.name);
        assert_eq!(record.parent, node.name, "parent of {}", child.name);
        assert_eq!(child.level.parent(), Some(node.level));
        assert_parents_match_source(data, child);
    }
}

#[test]
fn given_sample_forest_when_building_then_every_edge_matches_source() {
    testing::init_test_setup();
    for data in sample_forests() {
        let tree = build_tree(&data);
        assert!(!tree.is_error());
        assert_parents_match_source(&data, &tree);
    }
}

#[test]
fn given_well_formed_forest_when_building_then_children_keep_source_order() {
    // Arrange
    let data = forest(
        &[("APAC", "Acme"), ("EMEA", "Acme")],
        &[("France", "EMEA"), ("India", "APAC"), ("Japan", "APAC")],
        &[("Pune Plant", "India")],
    );

    // Act
    let tree = build_tree(&data);

    // Assert
    assert_eq!(tree.level, Level::Company);
    assert_eq!(tree.child_names(), vec!["APAC", "EMEA"]);
    let apac = tree.child("APAC").unwrap();
    assert_eq!(apac.child_names(), vec!["India", "Japan"]);
    assert_eq!(apac.child("Japan").unwrap().index, 2);
    assert_eq!(tree.count(), 7);
    assert_parents_match_source(&data, &tree);
}

#[test]
fn given_orphans_when_building_then_dropped_and_reported() {
    let data = forest(
        &[("APAC", "Acme")],
        &[("India", "APAC"), ("Brazil", "LATAM")],
        &[("Pune Plant", "India"), ("Sao Paulo Plant", "Brazil")],
    );

    let build = TreeBuilder::new().build(&data).unwrap();

    let names: Vec<_> = build.tree.iter().map(|(_, n)| n.data.name.clone()).collect();
    assert_eq!(names, vec!["Acme", "APAC", "India", "Pune Plant"]);
    assert_eq!(
        build.issues,
        vec![
            ValidationIssue::Orphan {
                level: Level::BusinessUnit,
                name: "Brazil".into(),
                parent: "LATAM".into()
            },
            ValidationIssue::Orphan {
                level: Level::Plant,
                name: "Sao Paulo Plant".into(),
                parent: "Brazil".into()
            },
        ]
    );
}

#[test]
fn given_duplicate_names_when_building_then_all_kept_and_children_join_last() {
    let data = forest(
        &[("APAC", "Acme"), ("APAC", "Acme")],
        &[("India", "APAC")],
        &[],
    );

    let build = TreeBuilder::new().build(&data).unwrap();
    let node = build.tree.to_entity_node().unwrap();

    assert_eq!(node.child_names(), vec!["APAC", "APAC"]);
    assert!(node.children[0].children.is_empty());
    assert_eq!(node.children[1].child_names(), vec!["India"]);
    assert_eq!(
        build.issues,
        vec![ValidationIssue::DuplicateName {
            level: Level::Division,
            name: "APAC".into()
        }]
    );
}

#[rstest]
#[case::plant_under_division(&[("APAC", "Acme")], &[], &[("Pune Plant", "APAC")])]
#[case::unit_under_company(&[("APAC", "Acme")], &[("India", "Acme")], &[])]
fn given_parent_on_wrong_level_when_building_then_orphan(
    #[case] divisions: &[(&str, &str)],
    #[case] units: &[(&str, &str)],
    #[case] plants: &[(&str, &str)],
) {
    let data = forest(divisions, units, plants);

    let result = TreeBuilder::new().build_checked(&data);

    match result {
        Err(issues) => {
            assert_eq!(issues.len(), 1);
            assert!(matches!(issues[0], ValidationIssue::Orphan { .. }));
        }
        Ok(_) => panic!("expected an orphan"),
    }
    assert_eq!(build_tree(&data).child_names(), vec!["APAC"]);
}

#[test]
fn given_pending_rows_when_building_then_skipped_silently() {
    let mut data = forest(&[("APAC", "Acme")], &[], &[]);
    data.level2.push(BusinessUnitInfo::pending());
    data.level3.push(BusinessUnitInfo::pending());

    let tree = TreeBuilder::new().build_checked(&data).unwrap();

    assert_eq!(tree.len(), 2);
    assert_eq!(tree.depth(), 2);
    assert_eq!(tree.leaf_nodes(), vec!["APAC"]);
}

#[test]
fn given_built_tree_when_locating_node_then_path_runs_from_company() {
    let data = forest(
        &[("APAC", "Acme")],
        &[("India", "APAC")],
        &[("Pune Plant", "India")],
    );

    let tree = TreeBuilder::new().build_checked(&data).unwrap();
    let plant = tree.find(Level::Plant, "Pune Plant").unwrap();

    assert_eq!(tree.path_to(plant), vec!["Acme", "APAC", "India", "Pune Plant"]);
    let post: Vec<_> = tree
        .iter_postorder()
        .map(|(_, n)| n.data.name.as_str())
        .collect();
    assert_eq!(post, vec!["Pune Plant", "India", "APAC", "Acme"]);
}

#[test]
fn given_empty_company_name_when_building_then_error_node_with_fault() {
    let mut data = forest(&[("APAC", "")], &[], &[]);
    data.company_info.company_name = String::new();

    let tree = build_tree(&data);

    assert_eq!(tree.name, EntityNode::ERROR_LABEL);
    assert_eq!(tree.level, Level::Company);
    assert!(tree.fault.unwrap().contains("company name is empty"));
}
