// ABOUTME: Library root for deploy-verify - exposes the pipeline stages for testing.
// ABOUTME: The main binary is in main.rs.

pub mod check;
pub mod compose;
pub mod config;
pub mod error;
pub mod metadata;
pub mod output;
pub mod ports;
pub mod prereq;
pub mod probe;
pub mod process;
pub mod types;
pub mod verifier;

pub use verifier::Verifier;
