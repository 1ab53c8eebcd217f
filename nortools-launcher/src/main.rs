#![warn(clippy::all)]
#![cfg_attr(windows, windows_subsystem = "windows")]

#[cfg(windows)]
fn main() {
    let exit_code = run();

    // ExitProcess takes the full u32 back from the i32 bit pattern
    #[allow(clippy::cast_possible_wrap)]
    std::process::exit(exit_code as i32);
}

#[cfg(windows)]
fn run() -> u32 {
    let _guard = nortools_launcher::logging::setup();

    tracing::debug!("nortools-launcher {}", env!("CARGO_PKG_VERSION"));

    nortools_launcher::launch()
}

#[cfg(not(windows))]
fn main() {
    eprintln!("nortools-launcher only runs on Windows");
    std::process::exit(nortools_launcher::FAILURE_EXIT_CODE as i32);
}
