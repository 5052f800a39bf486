pub mod apply;
pub mod audit_helpers;
pub mod check;
pub mod config_helpers;
pub mod log;
pub mod plan;
pub mod versions;
