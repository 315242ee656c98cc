//! Silences stderr while the audio host probes devices.
//!
//! ALSA prints "Unknown PCM" and similar noise on Linux while cpal enumerates
//! devices, which would corrupt the terminal UI.

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Runs `f` with stderr redirected to /dev/null on Linux.
///
/// If the redirect cannot be set up, `f` still runs with stderr untouched.
#[cfg(target_os = "linux")]
pub(crate) fn silenced<F, T>(f: F) -> T
where
    F: FnOnce() -> T,
{
    let dev_null = match OpenOptions::new().write(true).open("/dev/null") {
        Ok(file) => file,
        Err(e) => {
            tracing::debug!("Cannot open /dev/null, leaving stderr alone: {}", e);
            return f();
        }
    };

    let saved = unsafe { libc::dup(libc::STDERR_FILENO) };
    if saved == -1 {
        return f();
    }

    if unsafe { libc::dup2(dev_null.as_raw_fd(), libc::STDERR_FILENO) } == -1 {
        unsafe { libc::close(saved) };
        return f();
    }

    let result = f();

    unsafe {
        libc::dup2(saved, libc::STDERR_FILENO);
        libc::close(saved);
    }

    result
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn silenced<F, T>(f: F) -> T
where
    F: FnOnce() -> T,
{
    f()
}
