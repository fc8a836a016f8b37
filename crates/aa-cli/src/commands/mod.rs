//! CLI command implementations

pub(crate) mod apply;
pub(crate) mod common;
pub(crate) mod validate;
