use color_eyre::Result;
use widestring::U16CString;
use widestring::U16Str;
use widestring::U16String;
use windows::Win32::Foundation::HANDLE;
use windows::Win32::System::Threading::CREATE_NO_WINDOW;

use crate::DIALOG_MESSAGE;
use crate::DIALOG_TITLE;
use crate::command_line;
use crate::error::LaunchError;
use crate::install_dir::InstallDir;
use crate::windows_api::WindowsApi;

/// A running child process. Both of its handles are closed on drop.
#[derive(Debug)]
pub struct ChildProcess {
    process: HANDLE,
    thread: HANDLE,
    id: u32,
}

impl ChildProcess {
    /// Starts `application` with `command_line` in `current_dir`, without a
    /// console window.
    pub fn spawn(
        application: &U16Str,
        command_line: &U16Str,
        current_dir: &U16Str,
    ) -> Result<Self> {
        let application = U16CString::from_ustr(application)?;
        let command_line = U16CString::from_ustr(command_line)?;
        let current_dir = U16CString::from_ustr(current_dir)?;

        let information =
            WindowsApi::create_process(&application, command_line, &current_dir, CREATE_NO_WINDOW)?;

        Ok(Self {
            process: information.hProcess,
            thread: information.hThread,
            id: information.dwProcessId,
        })
    }

    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Blocks until the process terminates and returns its exit code.
    pub fn wait(&self) -> Result<u32> {
        WindowsApi::wait_for_process(self.process)?;
        WindowsApi::exit_code_process(self.process)
    }
}

impl Drop for ChildProcess {
    fn drop(&mut self) {
        for handle in [self.thread, self.process] {
            if let Err(error) = WindowsApi::close_handle(handle) {
                tracing::warn!("unable to close handle of process {}: {error}", self.id);
            }
        }
    }
}

pub struct Launcher {
    install_dir: InstallDir,
}

impl Launcher {
    #[must_use]
    pub const fn new(install_dir: InstallDir) -> Self {
        Self { install_dir }
    }

    /// Runs the target with everything in `argv` after argument 0 and returns
    /// the target's exit code once it has terminated.
    pub fn run(&self, argv: &[U16String]) -> Result<u32, LaunchError> {
        let target = self.install_dir.target();
        let command_line = command_line::build(&target, command_line::forwarded(argv));

        tracing::debug!(
            "install directory: {}",
            self.install_dir.as_ustr().to_string_lossy()
        );
        tracing::debug!("command line: {}", command_line.to_string_lossy());

        let child = ChildProcess::spawn(&target, &command_line, self.install_dir.as_ustr())
            .map_err(|reason| LaunchError::Spawn {
                target: target.to_string_lossy(),
                reason,
            })?;

        tracing::info!(
            "started {} with process id {}",
            target.to_string_lossy(),
            child.id()
        );

        let exit_code = child.wait().map_err(LaunchError::ExitCode)?;
        tracing::info!("process {} exited with code {exit_code}", child.id());

        Ok(exit_code)
    }
}

/// Runs the target next to the current executable with this process's own
/// arguments and returns the exit code to terminate with.
pub fn launch() -> u32 {
    let launcher = Launcher::new(InstallDir::current());

    let result = WindowsApi::command_line_args()
        .map_err(LaunchError::CommandLine)
        .and_then(|argv| launcher.run(&argv));

    match result {
        Ok(exit_code) => exit_code,
        Err(error) => {
            tracing::error!("{error}");
            if error.shows_dialog() {
                WindowsApi::error_dialog(DIALOG_TITLE, DIALOG_MESSAGE);
            }

            error.exit_code()
        }
    }
}
