//! Role module

pub mod models;
pub mod table;

pub use models::Role;
pub use table::RoleTable;
