//! The credential record and in-memory wiping of secrets.

use std::fmt;
use std::sync::atomic::{compiler_fence, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A login identifier and secret.
///
/// The password is overwritten with zeros when the record is dropped, and
/// `Debug` never prints it.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub timestamp: DateTime<Utc>,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            timestamp: Utc::now(),
        }
    }

    /// The password with all but its first character masked.
    pub fn masked_password(&self) -> String {
        let mut chars = self.password.chars();
        match chars.next() {
            Some(first) => format!("{first}{}", "*".repeat(chars.count())),
            None => String::new(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

impl Drop for Credentials {
    fn drop(&mut self) {
        // SAFETY: zero bytes are valid UTF-8, so the string stays well formed.
        wipe(unsafe { self.password.as_bytes_mut() });
    }
}

/// Overwrite `bytes` with zeros in a way the optimizer will not elide.
pub fn wipe(bytes: &mut [u8]) {
    for byte in bytes.iter_mut() {
        // SAFETY: `byte` is a valid, aligned, exclusive reference.
        unsafe { std::ptr::write_volatile(byte, 0) };
    }
    compiler_fence(Ordering::SeqCst);
}
