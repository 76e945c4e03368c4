//! Layout constants and process exit codes.

pub mod exit_codes;
pub mod fat12;
