//! Command implementations.

mod check;
pub mod render;

pub use check::execute as check_execute;
pub use check::{LoadedUnit, backup_path, load_unit};
