//! CLI command implementations

pub(crate) mod common;
pub(crate) mod create;
pub(crate) mod list;
pub(crate) mod log;
pub(crate) mod up;
