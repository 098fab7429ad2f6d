//! CLI command implementations

pub mod annotators;
pub mod cluster;
pub mod deidentify;
pub mod init;
pub mod validate;
