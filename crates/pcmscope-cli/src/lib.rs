//! pcmscope CLI library.
//!
//! Configuration loading and the command implementations behind the
//! `pcmscope` binary.

pub mod commands;
pub mod config;
