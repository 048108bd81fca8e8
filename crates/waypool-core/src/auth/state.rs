use crate::models::User;

/// Observable session snapshot.
///
/// `user` and `token` move together: both set while signed in, both
/// `None` otherwise, with `is_authenticated` reflecting exactly that.
/// Subscribers receive whole snapshots, never partial updates.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_loading: bool,
    pub is_authenticated: bool,
    pub error: Option<String>,
}

impl AuthState {
    /// State before the stored session has been examined
    pub(crate) fn unknown() -> Self {
        Self {
            user: None,
            token: None,
            is_loading: true,
            is_authenticated: false,
            error: None,
        }
    }

    /// Signed-out baseline
    pub(crate) fn unauthenticated() -> Self {
        Self {
            is_loading: false,
            ..Self::unknown()
        }
    }

    /// Install a signed-in identity, clearing loading and error
    pub(crate) fn establish(&mut self, user: User, token: String) {
        self.user = Some(user);
        self.token = Some(token);
        self.is_authenticated = true;
        self.is_loading = false;
        self.error = None;
    }

    /// Drop the identity, returning to the signed-out baseline
    pub(crate) fn sign_out(&mut self) {
        *self = Self::unauthenticated();
    }

    /// Identity coherence: authenticated exactly when both halves exist
    #[cfg(test)]
    pub(crate) fn identity_coherent(&self) -> bool {
        self.is_authenticated == (self.user.is_some() && self.token.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "2".to_string(),
            name: "Ana Gomez".to_string(),
            email: "ana@example.com".to_string(),
            avatar: None,
            rating: None,
            trips_count: None,
        }
    }

    #[test]
    fn test_unknown_is_loading_and_signed_out() {
        let state = AuthState::unknown();
        assert!(state.is_loading);
        assert!(!state.is_authenticated);
        assert!(state.user.is_none());
        assert!(state.token.is_none());
        assert!(state.error.is_none());
        assert!(state.identity_coherent());
    }

    #[test]
    fn test_establish_sets_identity_in_one_step() {
        let mut state = AuthState::unknown();
        state.error = Some("old failure".to_string());

        state.establish(sample_user(), "tok_abc".to_string());

        assert!(state.is_authenticated);
        assert!(!state.is_loading);
        assert!(state.error.is_none());
        assert_eq!(state.token.as_deref(), Some("tok_abc"));
        assert_eq!(state.user.as_ref().map(|u| u.id.as_str()), Some("2"));
        assert!(state.identity_coherent());
    }

    #[test]
    fn test_sign_out_clears_identity() {
        let mut state = AuthState::unknown();
        state.establish(sample_user(), "tok_abc".to_string());

        state.sign_out();

        assert!(!state.is_authenticated);
        assert!(state.user.is_none());
        assert!(state.token.is_none());
        assert!(!state.is_loading);
        assert!(state.identity_coherent());
    }
}
