//! Authentication collaborator.

use parking_lot::RwLock;

/// The authenticated user on whose behalf sync runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Owner id written to and filtered on the remote owner column.
    pub user_id: String,
}

impl Principal {
    /// Creates a principal.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Supplies the current principal, if any.
///
/// Sessions are managed elsewhere; sync only asks who is signed in.
pub trait AuthProvider: Send + Sync {
    /// Returns the signed-in principal, or `None`.
    fn current_principal(&self) -> Option<Principal>;
}

impl<A: AuthProvider + ?Sized> AuthProvider for &A {
    fn current_principal(&self) -> Option<Principal> {
        (**self).current_principal()
    }
}

impl<A: AuthProvider + ?Sized> AuthProvider for std::sync::Arc<A> {
    fn current_principal(&self) -> Option<Principal> {
        (**self).current_principal()
    }
}

/// An auth provider holding a fixed, replaceable principal.
#[derive(Debug, Default)]
pub struct StaticAuth {
    principal: RwLock<Option<Principal>>,
}

impl StaticAuth {
    /// Signed in as `user_id`.
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            principal: RwLock::new(Some(Principal::new(user_id))),
        }
    }

    /// Nobody signed in.
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Replaces the principal.
    pub fn set(&self, principal: Option<Principal>) {
        *self.principal.write() = principal;
    }
}

impl AuthProvider for StaticAuth {
    fn current_principal(&self) -> Option<Principal> {
        self.principal
            .read()
            .clone()
            .filter(|p| !p.user_id.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_auth() {
        let auth = StaticAuth::signed_in("u1");
        assert_eq!(auth.current_principal(), Some(Principal::new("u1")));
        auth.set(None);
        assert_eq!(auth.current_principal(), None);
    }

    #[test]
    fn blank_user_id_is_not_a_principal() {
        assert_eq!(StaticAuth::signed_in("  ").current_principal(), None);
        assert_eq!(StaticAuth::signed_out().current_principal(), None);
    }
}
