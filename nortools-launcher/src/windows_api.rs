use color_eyre::Result;
use color_eyre::eyre::anyhow;
use widestring::U16CStr;
use widestring::U16CString;
use widestring::U16String;
use windows::Win32::Foundation::CloseHandle;
use windows::Win32::Foundation::HANDLE;
use windows::Win32::Foundation::HLOCAL;
use windows::Win32::Foundation::LocalFree;
use windows::Win32::Foundation::WAIT_FAILED;
use windows::Win32::System::Environment::GetCommandLineW;
use windows::Win32::System::Threading::CreateProcessW;
use windows::Win32::System::Threading::GetExitCodeProcess;
use windows::Win32::System::Threading::INFINITE;
use windows::Win32::System::Threading::PROCESS_CREATION_FLAGS;
use windows::Win32::System::Threading::PROCESS_INFORMATION;
use windows::Win32::System::Threading::STARTUPINFOW;
use windows::Win32::System::Threading::WaitForSingleObject;
use windows::Win32::UI::Shell::CommandLineToArgvW;
use windows::Win32::UI::WindowsAndMessaging::MB_ICONERROR;
use windows::Win32::UI::WindowsAndMessaging::MB_OK;
use windows::Win32::UI::WindowsAndMessaging::MessageBoxW;
use windows::core::HSTRING;
use windows::core::PCWSTR;
use windows::core::PWSTR;
use windows::core::Result as WindowsCrateResult;

pub trait ProcessWindowsCrateResult<T> {
    fn process(self) -> Result<T>;
}

impl<T> ProcessWindowsCrateResult<T> for WindowsCrateResult<T> {
    fn process(self) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(error) => Err(error.into()),
        }
    }
}

/// Owns the argument array returned by `CommandLineToArgvW`.
struct ArgvAllocation(*mut PWSTR);

impl Drop for ArgvAllocation {
    fn drop(&mut self) {
        unsafe {
            let _ = LocalFree(Some(HLOCAL(self.0.cast())));
        }
    }
}

pub struct WindowsApi;

impl WindowsApi {
    /// The arguments of the current process, split the way a console program
    /// splits its own command line. Argument 0 is included.
    pub fn command_line_args() -> Result<Vec<U16String>> {
        Self::command_line_to_argv(PCWSTR(unsafe { GetCommandLineW() }.0))
    }

    /// Splits `command_line` with the same rules as [`Self::command_line_args`].
    pub fn split_command_line(command_line: &U16CStr) -> Result<Vec<U16String>> {
        Self::command_line_to_argv(PCWSTR(command_line.as_ptr()))
    }

    fn command_line_to_argv(command_line: PCWSTR) -> Result<Vec<U16String>> {
        let mut argc = 0_i32;
        let argv = unsafe { CommandLineToArgvW(command_line, &mut argc) };
        if argv.is_null() {
            return Err(std::io::Error::last_os_error().into());
        }

        let allocation = ArgvAllocation(argv);
        let argv = unsafe { std::slice::from_raw_parts(allocation.0, usize::try_from(argc)?) };

        Ok(argv
            .iter()
            .map(|arg| U16String::from_vec(unsafe { arg.as_wide() }))
            .collect())
    }

    /// Starts `application_name` without inheriting any handles and returns
    /// both handles of the new process. The caller is responsible for closing them.
    pub fn create_process(
        application_name: &U16CStr,
        command_line: U16CString,
        current_directory: &U16CStr,
        creation_flags: PROCESS_CREATION_FLAGS,
    ) -> Result<PROCESS_INFORMATION> {
        // CreateProcessW may write to the command line buffer
        let mut command_line = command_line.into_vec_with_nul();

        let startup_info = STARTUPINFOW {
            cb: u32::try_from(std::mem::size_of::<STARTUPINFOW>())?,
            ..Default::default()
        };
        let mut process_information = PROCESS_INFORMATION::default();

        unsafe {
            CreateProcessW(
                PCWSTR(application_name.as_ptr()),
                Some(PWSTR(command_line.as_mut_ptr())),
                None,
                None,
                false,
                creation_flags,
                None,
                PCWSTR(current_directory.as_ptr()),
                &startup_info,
                &mut process_information,
            )
        }
        .process()?;

        Ok(process_information)
    }

    pub fn wait_for_process(handle: HANDLE) -> Result<()> {
        if unsafe { WaitForSingleObject(handle, INFINITE) } == WAIT_FAILED {
            return Err(std::io::Error::last_os_error().into());
        }

        Ok(())
    }

    pub fn exit_code_process(handle: HANDLE) -> Result<u32> {
        let mut exit_code = 0_u32;
        unsafe { GetExitCodeProcess(handle, &mut exit_code) }.process()?;

        Ok(exit_code)
    }

    pub fn close_handle(handle: HANDLE) -> Result<()> {
        if handle.is_invalid() {
            return Err(anyhow!("cannot close an invalid handle"));
        }

        unsafe { CloseHandle(handle) }.process()
    }

    /// Blocks until the user dismisses an error dialog.
    pub fn error_dialog(title: &str, message: &str) {
        unsafe {
            MessageBoxW(
                None,
                &HSTRING::from(message),
                &HSTRING::from(title),
                MB_OK | MB_ICONERROR,
            );
        }
    }
}
