//! Output formatting and persistence for CLI results

pub mod json;
pub mod table;
