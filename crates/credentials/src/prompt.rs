//! Interactive terminal input with echo control.

use std::io::{self, BufRead, Write};

use crate::error::{CredentialError, CredentialResult};

/// Line-oriented user input.
pub trait Prompter: Send + Sync {
    /// Read one line with echo.
    fn read_line(&self, prompt: &str) -> CredentialResult<String>;

    /// Read one line without echoing it.
    fn read_secret(&self, prompt: &str) -> CredentialResult<String>;

    /// Ask a yes/no question; anything other than `y`/`yes` is no.
    fn confirm(&self, prompt: &str) -> CredentialResult<bool> {
        let answer = self.read_line(prompt)?;
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }
}

/// Prompts on stderr and reads from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn read_line(&self, prompt: &str) -> CredentialResult<String> {
        write_prompt(prompt)?;
        read_stdin_line()
    }

    fn read_secret(&self, prompt: &str) -> CredentialResult<String> {
        write_prompt(prompt)?;
        let _guard = EchoGuard::disable();
        read_stdin_line()
    }
}

fn write_prompt(prompt: &str) -> CredentialResult<()> {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt}")
        .and_then(|()| stderr.flush())
        .map_err(|e| CredentialError::Prompt(e.to_string()))
}

fn read_stdin_line() -> CredentialResult<String> {
    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| CredentialError::Prompt(e.to_string()))?;
    if read == 0 {
        return Err(CredentialError::Prompt("end of input".into()));
    }
    Ok(line.trim().to_string())
}

/// Turns terminal echo off for its lifetime. A no-op when stdin is not a
/// terminal.
struct EchoGuard {
    #[cfg(unix)]
    saved: Option<libc::termios>,
}

#[cfg(unix)]
impl EchoGuard {
    fn disable() -> Self {
        let fd = libc::STDIN_FILENO;
        // SAFETY: termios is plain data; tcgetattr fully initialises it on success.
        let mut term: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &mut term) } != 0 {
            return Self { saved: None };
        }

        let mut silent = term;
        silent.c_lflag &= !libc::ECHO;
        silent.c_lflag |= libc::ECHONL;
        // SAFETY: `silent` is a valid termios obtained from tcgetattr.
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &silent) } != 0 {
            return Self { saved: None };
        }
        Self { saved: Some(term) }
    }
}

#[cfg(unix)]
impl Drop for EchoGuard {
    fn drop(&mut self) {
        if let Some(term) = &self.saved {
            // SAFETY: restores the settings read in `disable`.
            unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, term) };
        }
    }
}

#[cfg(not(unix))]
impl EchoGuard {
    fn disable() -> Self {
        Self {}
    }
}
