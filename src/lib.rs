//! Entity hierarchy engine for a treasury back office.
//!
//! A collection of forests, one per company, each holding divisions, business
//! units and plants as flat per-level records linked by parent name. The
//! crate builds navigable trees from those records and keeps them consistent
//! under rename, delete, add and form submission.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
