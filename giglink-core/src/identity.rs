//! Verified external identities

use serde::{Deserialize, Serialize};

use crate::Provider;

/// An identity attested by an external provider's ID token.
///
/// Produced transiently per sign-in attempt and either merged into an
/// account or discarded. Serializable so it can be embedded in a
/// link-confirmation token while the user confirms the link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalIdentity {
    pub provider: Provider,

    /// The provider's stable subject identifier for this user
    pub subject: String,

    /// Email claim, if the provider released one
    pub email: Option<String>,

    /// Display name claim, if the provider released one
    pub display_name: Option<String>,
}
