//! Client secret handling.

use std::fmt;

use zeroize::Zeroize;

/// A client secret that is redacted from debug output and wiped on drop.
#[derive(Clone)]
pub struct ClientSecret(String);

impl ClientSecret {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientSecret(**redacted**)")
    }
}

impl Drop for ClientSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let secret = ClientSecret::new("hunter2");

        assert_eq!(format!("{secret:?}"), "ClientSecret(**redacted**)");
        assert_eq!(secret.expose(), "hunter2");
    }
}
