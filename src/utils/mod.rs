//! Shared helpers.

pub mod exec;
mod plural;

pub use plural::plural_count;
