//! Command implementations
//!
//! Each submodule holds one area of commands; `core` carries the shared
//! store-opening helpers.

mod analyze;
mod core;
mod export;
mod serve;
mod summary;

pub use analyze::cmd_analyze;
pub use core::{
    cmd_add, cmd_budget, cmd_delete, cmd_edit, cmd_list, open_store, resolve_db_path,
};
pub use export::cmd_export;
pub use serve::cmd_serve;
pub use summary::{cmd_summary, cmd_watch};
