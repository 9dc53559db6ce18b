//! Tree builder turning a flat `EntityData` forest into a navigable tree.

use std::collections::{HashMap, HashSet};

use generational_arena::Index;
use tracing::{debug, error, warn};

use crate::domain::arena::{NodeData, TreeArena};
use crate::domain::entities::{EntityData, EntityNode, Level};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::validation::ValidationIssue;

/// A built tree plus the referential issues met while building it.
#[derive(Debug)]
pub struct TreeBuild {
    pub tree: TreeArena,
    pub issues: Vec<ValidationIssue>,
}

/// Constructs arena trees from entity forests.
///
/// Parents are looked up by name on the level directly above, so a plant can
/// only hang under a business unit even if a division shares that name.
pub struct TreeBuilder {
    nodes: HashMap<(Level, String), Index>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    /// Build the tree, reporting orphans and duplicate names instead of failing.
    ///
    /// Orphans are left out of the tree. When a name repeats within a level
    /// every record still gets a node, and children attach to the last one.
    /// Pending rows have no name yet and are skipped.
    pub fn build(&mut self, data: &EntityData) -> DomainResult<TreeBuild> {
        self.nodes.clear();

        let company = data.company_name();
        if company.trim().is_empty() {
            return Err(DomainError::MalformedForest(
                "company name is empty".to_string(),
            ));
        }

        let mut tree = TreeArena::new();
        let mut issues = Vec::new();
        let root = tree.insert_node(
            NodeData {
                name: company.to_string(),
                level: Level::Company,
                index: 0,
            },
            None,
        );
        self.nodes.insert((Level::Company, company.to_string()), root);

        for level in Level::UNITS {
            let Some(parent_level) = level.parent() else {
                continue;
            };
            let mut seen = HashSet::new();

            for (index, unit) in data.units(level).iter().enumerate() {
                if !unit.status.is_submitted() {
                    continue;
                }
                let name = unit.entity_name.as_str();
                if !seen.insert(name) {
                    warn!("{} '{}' is duplicated in {}", level, name, company);
                    let issue = ValidationIssue::DuplicateName {
                        level,
                        name: name.to_string(),
                    };
                    if !issues.contains(&issue) {
                        issues.push(issue);
                    }
                }

                let key = (parent_level, unit.parent.clone());
                let Some(&parent_idx) = self.nodes.get(&key) else {
                    warn!(
                        "{} '{}' dropped from {}: parent '{}' not found",
                        level, name, company, unit.parent
                    );
                    issues.push(ValidationIssue::Orphan {
                        level,
                        name: name.to_string(),
                        parent: unit.parent.clone(),
                    });
                    continue;
                };

                let idx = tree.insert_node(
                    NodeData {
                        name: name.to_string(),
                        level,
                        index,
                    },
                    Some(parent_idx),
                );
                self.nodes.insert((level, name.to_string()), idx);
            }
        }

        debug!(
            "built tree for {}: {} nodes, {} issues",
            company,
            tree.len(),
            issues.len()
        );
        Ok(TreeBuild { tree, issues })
    }

    /// Strict build: any orphan, duplicate or malformed root is an error.
    pub fn build_checked(&mut self, data: &EntityData) -> Result<TreeArena, Vec<ValidationIssue>> {
        match self.build(data) {
            Ok(TreeBuild { tree, issues }) if issues.is_empty() => Ok(tree),
            Ok(TreeBuild { issues, .. }) => Err(issues),
            Err(_) => Err(vec![ValidationIssue::EmptyCompanyName]),
        }
    }
}

/// Build the nested tree for one forest.
///
/// Never fails: a forest that cannot be built yields a single node labelled
/// `"Error"` carrying the fault message.
pub fn build_tree(data: &EntityData) -> EntityNode {
    match TreeBuilder::new().build(data) {
        Ok(build) => build
            .tree
            .to_entity_node()
            .unwrap_or_else(|| EntityNode::error("tree has no root")),
        Err(e) => {
            error!("cannot build tree: {}", e);
            EntityNode::error(e.to_string())
        }
    }
}
