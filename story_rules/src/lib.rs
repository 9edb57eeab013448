//! # Story Rules
//!
//! The "Storybook Bible" crate - contains the record types, identifiers and
//! naming grammar shared by every interlocking storybook in a set.
//! This crate is the single source of truth for what a record looks like and
//! does not contain any loading, validation policy or assembly logic.

pub mod entities;
pub mod naming;
pub mod nodes;
pub mod world;

pub use entities::*;
pub use naming::*;
pub use nodes::*;
pub use world::*;
