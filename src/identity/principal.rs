//! # Principal Resolver
//!
//! Resolves the principal running the workflow from its Resource Manager token.

use std::sync::Arc;

use azure_core::credentials::{TokenCredential, TokenRequestOptions};
use tracing::debug;

use super::claims::{decode_claims, ClaimsError, TokenClaims};
use crate::constants::ARM_TOKEN_SCOPE;
use crate::model::PrincipalIdentity;

/// Reads the current principal from token claims, with an optional explicit override
#[derive(Clone)]
pub struct PrincipalResolver {
    credential: Arc<dyn TokenCredential>,
    object_id_override: Option<String>,
}

impl std::fmt::Debug for PrincipalResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrincipalResolver")
            .field("object_id_override", &self.object_id_override)
            .finish_non_exhaustive()
    }
}

impl PrincipalResolver {
    #[must_use]
    pub fn new(credential: Arc<dyn TokenCredential>, object_id_override: Option<String>) -> Self {
        Self {
            credential,
            object_id_override: object_id_override
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
        }
    }

    async fn claims(&self) -> Result<TokenClaims, ClaimsError> {
        let token = self
            .credential
            .get_token(&[ARM_TOKEN_SCOPE], Some(TokenRequestOptions::default()))
            .await
            .map_err(ClaimsError::TokenUnavailable)?;
        decode_claims(token.token.secret())
    }

    /// Object id of the running principal
    ///
    /// # Errors
    /// Returns a [`ClaimsError`] if no override is set and the token cannot be read or
    /// carries no `oid` claim.
    pub async fn current_principal_object_id(&self) -> Result<String, ClaimsError> {
        if let Some(id) = &self.object_id_override {
            debug!("Using principal object id from AZURE_PRINCIPAL_OBJECT_ID");
            return Ok(id.clone());
        }

        let claims = self.claims().await?;
        claims
            .object_id()
            .map(str::to_string)
            .ok_or(ClaimsError::MissingClaim("oid"))
    }

    /// Sign-in name of the running principal, if the token carries one
    ///
    /// Never fails: service principals have no email and that is not an error.
    pub async fn current_user_email_best_effort(&self) -> Option<String> {
        match self.claims().await {
            Ok(claims) => claims.email().map(str::to_string),
            Err(e) => {
                debug!("Could not read email claim from access token: {}", e);
                None
            }
        }
    }

    /// Object id plus display name
    ///
    /// # Errors
    /// Fails under the same conditions as [`Self::current_principal_object_id`].
    pub async fn current_principal(&self) -> Result<PrincipalIdentity, ClaimsError> {
        let object_id = self.current_principal_object_id().await?;
        let display_name = self.current_user_email_best_effort().await;
        Ok(PrincipalIdentity {
            object_id,
            display_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::StaticTokenCredential;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    fn resolver(payload: &str, override_id: Option<&str>) -> PrincipalResolver {
        let token = format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(b"{}"),
            URL_SAFE_NO_PAD.encode(payload)
        );
        PrincipalResolver::new(
            StaticTokenCredential::new(token),
            override_id.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn test_object_id_from_token() {
        let resolver = resolver(r#"{"oid":"abc","upn":"me@contoso.com"}"#, None);
        let principal = resolver.current_principal().await.expect("principal");
        assert_eq!(principal.object_id, "abc");
        assert_eq!(principal.display_name.as_deref(), Some("me@contoso.com"));
    }

    #[tokio::test]
    async fn test_override_skips_token_inspection() {
        let resolver = resolver("not json", Some(" override-id "));
        assert_eq!(
            resolver
                .current_principal_object_id()
                .await
                .expect("override is used"),
            "override-id"
        );
        assert_eq!(resolver.current_user_email_best_effort().await, None);
    }

    #[tokio::test]
    async fn test_missing_oid_is_an_error() {
        let resolver = resolver(r#"{"upn":"me@contoso.com"}"#, None);
        assert!(matches!(
            resolver.current_principal_object_id().await,
            Err(ClaimsError::MissingClaim("oid"))
        ));
    }
}
