//! CLI command implementations.

pub mod edit;
pub mod generate;
pub mod init;
pub mod serve;
