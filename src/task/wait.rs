// src/task/wait.rs

//! Non-blocking child status sampling via `waitpid(2)`.
//!
//! The OS offers no push notification for child lifecycle changes, so the
//! runner samples. `WUNTRACED` and `WCONTINUED` are included so stop and
//! resume are observable, not just exit; `Child::try_wait` style APIs cannot
//! report those.

use std::io;

use crate::signal::Signal;

/// One observation from a `WNOHANG` waitpid sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitSample {
    /// No state change since the last sample.
    Unchanged,
    /// Process exited normally with the given code. The child is reaped.
    Exited(i32),
    /// Process was killed by a signal. The child is reaped.
    Signaled(Signal),
    /// Process was stopped (suspended) by a signal.
    Stopped(Signal),
    /// A previously stopped process resumed.
    Continued,
}

/// Sample the current status of `pid` without blocking.
///
/// A reaping observation (`Exited` / `Signaled`) consumes the wait status;
/// callers must latch it and not sample the pid again.
pub fn sample(pid: u32) -> io::Result<WaitSample> {
    let mut status: libc::c_int = 0;
    let flags = libc::WNOHANG | libc::WUNTRACED | libc::WCONTINUED;

    // SAFETY: waitpid with a valid out-pointer on a pid we spawned.
    let ret = unsafe { libc::waitpid(pid as libc::pid_t, &mut status, flags) };

    if ret == 0 {
        return Ok(WaitSample::Unchanged);
    }
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(decode(status))
}

fn decode(status: libc::c_int) -> WaitSample {
    if libc::WIFEXITED(status) {
        WaitSample::Exited(libc::WEXITSTATUS(status))
    } else if libc::WIFSIGNALED(status) {
        WaitSample::Signaled(Signal::from_raw(libc::WTERMSIG(status)))
    } else if libc::WIFSTOPPED(status) {
        WaitSample::Stopped(Signal::from_raw(libc::WSTOPSIG(status)))
    } else if libc::WIFCONTINUED(status) {
        WaitSample::Continued
    } else {
        WaitSample::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn decodes_linux_wait_statuses() {
        // Raw encodings as produced by the kernel on Linux.
        assert_eq!(decode(3 << 8), WaitSample::Exited(3));
        assert_eq!(decode(15), WaitSample::Signaled(Signal::Term));
        assert_eq!(decode((19 << 8) | 0x7f), WaitSample::Stopped(Signal::Other(19)));
        assert_eq!(decode(0xffff), WaitSample::Continued);
    }

    #[test]
    fn samples_a_real_exit() -> Result<(), Box<dyn std::error::Error>> {
        let child = Command::new("sh").arg("-c").arg("exit 7").spawn()?;
        let pid = child.id();

        let mut observed = WaitSample::Unchanged;
        for _ in 0..200 {
            observed = sample(pid)?;
            if observed != WaitSample::Unchanged {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(observed, WaitSample::Exited(7));
        Ok(())
    }
}
