//! Flat role-based access control.
//!
//! Maps users to roles and roles to permissions. Identifiers are any
//! hashable type, so database ids, strings and enums all work.

pub mod flat;
pub mod memory;

pub use flat::FlatRbac;
pub use memory::MemoryRbac;
