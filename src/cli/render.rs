//! Terminal rendering of entity trees and lock summaries.

use colored::Colorize;
use termtree::Tree;

use crate::domain::{EntityNode, LockView};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for EntityNode {
    fn to_tree_string(&self) -> Tree<String> {
        let label = match &self.fault {
            Some(fault) => format!("{}: {}", self.name.red().bold(), fault),
            None => self.name.clone(),
        };
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree_string()).collect();
        Tree::new(label).with_leaves(leaves)
    }
}

/// One line per level: counts and whether rows can be added.
pub fn lock_lines(view: &LockView) -> Vec<String> {
    view.levels
        .iter()
        .map(|status| {
            let gate = if status.addable {
                "open".green()
            } else {
                "locked".yellow()
            };
            format!(
                "{} {:<14} submitted {:>3}  pending {:>3}  {}",
                status.level.number(),
                status.level.title(),
                status.submitted,
                status.pending,
                gate
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Level;

    #[test]
    fn given_nested_node_when_rendering_then_draws_all_names() {
        colored::control::set_override(false);
        let mut root = EntityNode::new("Acme", Level::Company, 0);
        let mut apac = EntityNode::new("APAC", Level::Division, 0);
        apac.children.push(EntityNode::new("India", Level::BusinessUnit, 0));
        root.children.push(apac);

        let rendered = root.to_tree_string().to_string();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Acme");
        assert!(lines[1].ends_with("APAC"));
        assert!(lines[2].ends_with("India"));
    }
}
