use widestring::U16Str;
use widestring::U16String;

use crate::TARGET_EXE;

/// Image paths this long or longer are treated as unavailable.
pub const MAX_IMAGE_PATH: usize = 260;

/// The directory the launcher binary lives in, which is also where the target
/// executable is expected and the working directory handed to the child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallDir(U16String);

impl InstallDir {
    /// Resolves the directory of the running executable, falling back to `.`
    /// when the image path is unavailable.
    pub fn current() -> Self {
        match std::env::current_exe() {
            Ok(image_path) => {
                Self::from_image_path(&U16String::from_os_str(image_path.as_os_str()))
            }
            Err(error) => {
                tracing::warn!("unable to get exec path, using the current directory: {error}");
                Self::fallback()
            }
        }
    }

    /// Strips the file name from an executable path at the last `\` or `/`.
    /// Falls back to `.` for paths of [`MAX_IMAGE_PATH`] units or more.
    pub fn from_image_path(image_path: &U16Str) -> Self {
        if image_path.len() >= MAX_IMAGE_PATH {
            tracing::warn!(
                "exec path is {} units long, using the current directory",
                image_path.len()
            );
            return Self::fallback();
        }

        image_path
            .as_slice()
            .iter()
            .rposition(|unit| *unit == u16::from(b'\\') || *unit == u16::from(b'/'))
            .map_or_else(Self::fallback, |separator| {
                Self(U16String::from_vec(&image_path.as_slice()[..separator]))
            })
    }

    fn fallback() -> Self {
        Self(U16String::from_str("."))
    }

    /// Full path of the executable the launcher hands control to.
    #[must_use]
    pub fn target(&self) -> U16String {
        let mut target = self.0.clone();
        target.push_str("\\");
        target.push_str(TARGET_EXE);
        target
    }

    #[must_use]
    pub fn as_ustr(&self) -> &U16Str {
        &self.0
    }
}

impl From<U16String> for InstallDir {
    fn from(dir: U16String) -> Self {
        Self(dir)
    }
}
