//! Command implementations for the Packmind CLI

pub mod completions;
pub mod diff;
pub mod helpers;
pub mod install;
pub mod list;
pub mod show;
pub mod status;
pub mod uninstall;
