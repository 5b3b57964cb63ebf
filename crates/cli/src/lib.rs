//! Cull CLI library surface
//!
//! The binary is a thin dispatcher; everything it runs lives here so
//! integration tests can drive the same pipeline.

pub mod cmd;
pub mod config;
pub mod engine;
pub mod locks;
pub mod logging;
pub mod report;
