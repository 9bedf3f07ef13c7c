//! Launcher for the gwbridge server: flag parsing, logging and wiring.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub mod bootstrap;
pub mod parser;

pub use bootstrap::{build_state, init_logging, load_env, run};
pub use parser::Cli;
