//! CLI command implementations

pub(crate) mod add_to_release;
pub(crate) mod apply_patch;
pub(crate) mod bootstrap;
pub(crate) mod common;
pub(crate) mod create_patch;
pub(crate) mod init;
pub(crate) mod prepare_release;
pub(crate) mod promote_release;
pub(crate) mod reconcile;
pub(crate) mod status;
pub(crate) mod upgrade;
