use color_eyre::Report;

use crate::FAILURE_EXIT_CODE;

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("unable to split the process command line: {0}")]
    CommandLine(Report),
    #[error("unable to start {target}: {reason}")]
    Spawn { target: String, reason: Report },
    #[error("unable to retrieve the exit code of the child process: {0}")]
    ExitCode(Report),
}

impl LaunchError {
    /// Process exit status reported in place of the child's.
    #[must_use]
    pub const fn exit_code(&self) -> u32 {
        match self {
            Self::CommandLine(_) | Self::Spawn { .. } | Self::ExitCode(_) => FAILURE_EXIT_CODE,
        }
    }

    /// Only a failure to start the child is reported to the user with a dialog.
    #[must_use]
    pub const fn shows_dialog(&self) -> bool {
        matches!(self, Self::Spawn { .. })
    }
}
