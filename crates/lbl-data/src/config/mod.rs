//! Settings persisted next to the table

pub mod settings;

pub use settings::*;
