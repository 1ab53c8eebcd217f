#![warn(clippy::all)]

//! Windowed front door for `nortools.exe`.
//!
//! The launcher finds `nortools.exe` next to its own executable, hands it every
//! argument it was started with, runs it without a console window and exits
//! with the child's exit code.

pub mod command_line;
pub mod error;
pub mod install_dir;
#[cfg(windows)]
pub mod launcher;
pub mod logging;
#[cfg(windows)]
pub mod windows_api;

pub use error::LaunchError;
pub use install_dir::InstallDir;
#[cfg(windows)]
pub use launcher::ChildProcess;
#[cfg(windows)]
pub use launcher::Launcher;
#[cfg(windows)]
pub use launcher::launch;

/// File name of the console program started from the install directory.
pub const TARGET_EXE: &str = "nortools.exe";

pub const DIALOG_TITLE: &str = "NorTools Launcher";
pub const DIALOG_MESSAGE: &str = "Failed to start nortools.exe";

/// Exit status used whenever the child's own exit code is not available.
pub const FAILURE_EXIT_CODE: u32 = 1;
