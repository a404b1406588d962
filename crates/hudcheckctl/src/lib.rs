//! hudcheckctl library - exposes the CLI pieces for integration tests

pub mod cli;
pub mod commands;
pub mod display;
pub mod logging;
