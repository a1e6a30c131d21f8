//! Access tokens which must not leak into logs.

use std::{borrow::Cow, env::VarError, fmt, ops::Deref};

use serde::Deserialize;
use zeroize::Zeroize;

/// A token for a remote service.
///
/// The wrapper keeps the value out of `Debug` output and wipes owned
/// values from memory when dropped. Use [Secret::revealed] to get the
/// underlying value.
#[derive(Clone, Deserialize)]
#[serde(from = "String")]
pub struct Secret(Cow<'static, str>);

impl Secret {
    /// Read a secret from an environment variable.
    pub fn from_env(var: &str) -> Result<Self, VarError> {
        let value = std::env::var(var)?;
        Ok(Secret(value.into()))
    }

    /// Expose the underlying value of this secret.
    pub fn revealed(&self) -> &str {
        self.0.deref()
    }

    /// True when the secret holds no characters at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        if let Cow::Owned(ref mut s) = self.0 {
            s.zeroize()
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(****)")
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Secret(value.into())
    }
}

impl From<&'static str> for Secret {
    fn from(value: &'static str) -> Self {
        Secret(value.into())
    }
}
