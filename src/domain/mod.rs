//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod amount;
pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod lenient;
pub mod lock;
pub mod mutation;
pub mod validation;

pub use arena::{NodeData, TreeArena, TreeNode};
pub use builder::{build_tree, TreeBuild, TreeBuilder};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use lock::{can_add, LevelStatus, LockView, SubmissionState};
pub use validation::{validate_collection, validate_forest, ValidationIssue};
