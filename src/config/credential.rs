use std::sync::{Arc, RwLock};

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Timebook API key, zeroed on drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Shared, swappable holder for the current access token.
///
/// The host delivers global settings asynchronously, so requests read the
/// token at send time rather than capturing it when the client is built.
#[derive(Clone, Default)]
pub struct Credential(Arc<RwLock<Option<AccessToken>>>);

impl Credential {
    /// Seeds the holder from a raw token, e.g. from the command line.
    /// Blank values leave it unset.
    pub fn from_raw(token: Option<&str>) -> Self {
        let credential = Self::default();
        credential.set(token);
        credential
    }

    pub fn get(&self) -> Option<AccessToken> {
        match self.0.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replaces the token. Empty strings clear it.
    pub fn set(&self, token: Option<&str>) {
        let next = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(AccessToken::new);
        match self.0.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Credential")
            .field(&if self.is_set() { "[REDACTED]" } else { "<unset>" })
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_debug_is_redacted() {
        let token = AccessToken::new("super-secret");
        assert_eq!(format!("{:?}", token), "[REDACTED]");
        assert_eq!(token.expose(), "super-secret");
    }

    #[test]
    fn test_credential_shared_between_clones() {
        let credential = Credential::default();
        let clone = credential.clone();
        assert!(!clone.is_set());

        credential.set(Some("abc"));
        assert_eq!(clone.get().unwrap().expose(), "abc");
    }

    #[test]
    fn test_from_raw_ignores_blank_tokens() {
        assert!(!Credential::from_raw(None).is_set());
        assert!(!Credential::from_raw(Some("")).is_set());
        assert!(!Credential::from_raw(Some("  \t")).is_set());

        let credential = Credential::from_raw(Some(" key-1 \n"));
        assert_eq!(credential.get().unwrap().expose(), "key-1");
    }

    #[test]
    fn test_blank_token_clears() {
        let credential = Credential::from_raw(Some("abc"));
        credential.set(Some("   "));
        assert!(!credential.is_set());
    }

    #[test]
    fn test_credential_debug_hides_value() {
        let credential = Credential::from_raw(Some("abc"));
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("abc"));
    }
}
