//! `rigcert` command-line library.
//!
//! Provides configuration loading and the subcommand implementations used by
//! the `rigcert` binary.

#![deny(unsafe_code)]

pub mod commands;
pub mod config;
