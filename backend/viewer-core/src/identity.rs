//! Identity token reported by `/who_am_i`.

use uuid::Uuid;

/// Supplies the opaque token a web client uses to confirm which host it reached.
pub trait IdentityProvider: Send + Sync {
    fn identity(&self) -> Option<Uuid>;
}

/// A fixed token, or none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticIdentity(pub Option<Uuid>);

impl IdentityProvider for StaticIdentity {
    fn identity(&self) -> Option<Uuid> {
        self.0
    }
}

/// Canonical dashed lowercase form, or an empty string when there is no token.
///
/// The nil UUID counts as "no token".
pub fn identity_text(provider: &dyn IdentityProvider) -> String {
    provider
        .identity()
        .filter(|id| !id.is_nil())
        .map(|id| id.hyphenated().to_string())
        .unwrap_or_default()
}
