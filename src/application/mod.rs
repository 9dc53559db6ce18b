//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod migration;
pub mod seed;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use migration::{migrate, migrate_collection, split_collection};
pub use seed::{load_seed_file, merge_with_seed, sample_forests};
