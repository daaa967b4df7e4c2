//! Credential type guard.
//!
//! Three wrapper types sit on the vault boundary:
//!
//! - [`Password`]: the operator password, held only for a session.
//! - [`Plaintext`]: a credential on its way *into* the vault.  This is the
//!   one place where copy-paste whitespace is trimmed.
//! - [`SecretValue`]: a credential on its way *out* of the vault.  It has no
//!   string surface at all, only [`SecretValue::reveal`].
//!
//! None of them implement `Display`, `Clone`, or `PartialEq`, and their
//! `Debug` output is redacted, so a credential cannot end up in a log line
//! or be compared against a plain string by accident.

use std::fmt;

use zeroize::{Zeroize, Zeroizing};

const REDACTED: &str = "[REDACTED]";

/// Operator-supplied vault password.  Zeroized on drop, never persisted.
pub struct Password(Zeroizing<String>);

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Self(Zeroizing::new(password.into()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in bytes, for minimum-length policy checks.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Password").field(&REDACTED).finish()
    }
}

/// A credential accepted for encryption at configuration time.
///
/// Construction trims leading and trailing whitespace exactly once.  The
/// value is never normalized again, in particular not at decrypt time.
pub struct Plaintext(Zeroizing<String>);

impl Plaintext {
    /// Accept raw operator input, trimming surrounding whitespace.
    ///
    /// The raw buffer is zeroized after the trimmed copy is taken.
    pub fn from_input(raw: impl Into<String>) -> Self {
        let mut raw = raw.into();
        let normalized = raw.trim().to_string();
        raw.zeroize();
        Self(Zeroizing::new(normalized))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Plaintext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Plaintext").field(&REDACTED).finish()
    }
}

/// A decrypted credential.
///
/// The only way to read it is [`reveal`](SecretValue::reveal), which
/// consumes the wrapper and hands ownership of a plain `String` to the
/// caller.  An unrevealed value is zeroized when dropped.
pub struct SecretValue(Zeroizing<String>);

impl SecretValue {
    pub(crate) fn new(value: String) -> Self {
        Self(Zeroizing::new(value))
    }

    /// Extract the plaintext.  The caller owns the returned string from here on.
    pub fn reveal(mut self) -> String {
        std::mem::take(&mut *self.0)
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretValue").field(&REDACTED).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plaintext_trims_surrounding_whitespace() {
        let p = Plaintext::from_input("  f4aa1ba3e3038adf  \n");
        assert_eq!(p.as_str(), "f4aa1ba3e3038adf");
    }

    #[test]
    fn plaintext_keeps_inner_whitespace() {
        let p = Plaintext::from_input("\tpass phrase with spaces ");
        assert_eq!(p.as_str(), "pass phrase with spaces");
    }

    #[test]
    fn whitespace_only_input_is_empty() {
        assert!(Plaintext::from_input(" \r\n ").is_empty());
    }

    #[test]
    fn secret_value_reveal_is_exact() {
        let v = SecretValue::new("  padded  ".to_string());
        assert_eq!(v.reveal(), "  padded  ");
    }

    #[test]
    fn debug_output_is_redacted() {
        let secret = SecretValue::new("sk-live-123".to_string());
        let plain = Plaintext::from_input("sk-live-123");
        let password = Password::new("hunter22");

        for rendered in [
            format!("{secret:?}"),
            format!("{plain:?}"),
            format!("{password:?}"),
        ] {
            assert!(!rendered.contains("sk-live"), "leaked: {rendered}");
            assert!(!rendered.contains("hunter"), "leaked: {rendered}");
            assert!(rendered.contains("REDACTED"));
        }
    }

    #[test]
    fn password_reports_length() {
        let pw = Password::new("abc");
        assert_eq!(pw.len(), 3);
        assert!(!pw.is_empty());
        assert!(Password::new("").is_empty());
    }
}
