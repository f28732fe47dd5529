use std::sync::{Arc, RwLock};

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use crate::config::{BackendSettings, QueryConfig, NOT_CONFIGURED};
use crate::error::{ApiErrorBody, DataError};

/// Auth-state transition published to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChange {
    Initial,
    SignedIn,
    SignedOut,
}

/// An authenticated session. The user id and expiry come from the access
/// token's claims, decoded locally — token verification is the backend's
/// job, the client only needs the subject.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    fn from_access_token(
        access_token: String,
        refresh_token: Option<String>,
    ) -> Result<Self, DataError> {
        let claims = decode_claims(&access_token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| DataError::Decode(format!("token subject is not a UUID: {}", claims.sub)))?;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| DataError::Decode("token exp out of range".to_string()))?;
        Ok(Self {
            access_token,
            refresh_token,
            user_id,
            expires_at,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    sub: String,
    exp: i64,
}

// Claim inspection only. Signature verification is deliberately disabled:
// the backend verifies every request's token; the client just needs sub/exp.
fn decode_claims(token: &str) -> Result<TokenClaims, DataError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| DataError::Decode(format!("malformed access token: {}", e)))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

/// Session store plus the password-grant corner of the hosted auth API.
///
/// Exactly one watch channel carries auth-state changes; the account
/// resolver subscribes once for its lifetime.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthInner>,
}

struct AuthInner {
    http: reqwest::Client,
    settings: Arc<BackendSettings>,
    config: QueryConfig,
    session: RwLock<Option<Session>>,
    changes: watch::Sender<AuthChange>,
}

impl AuthClient {
    pub(crate) fn new(
        http: reqwest::Client,
        settings: Arc<BackendSettings>,
        config: QueryConfig,
    ) -> Self {
        let (changes, _) = watch::channel(AuthChange::Initial);
        Self {
            inner: Arc::new(AuthInner {
                http,
                settings,
                config,
                session: RwLock::new(None),
                changes,
            }),
        }
    }

    /// Current session, or None when signed out or expired.
    pub fn session(&self) -> Option<Session> {
        let guard = self.inner.session.read().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().filter(|s| !s.is_expired()).cloned()
    }

    /// Subscribe to auth-state changes. Each call is an independent
    /// subscription; dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<AuthChange> {
        self.inner.changes.subscribe()
    }

    /// Exchange email/password for a session via the hosted token endpoint.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, DataError> {
        let base = self
            .inner
            .settings
            .url
            .as_deref()
            .ok_or(DataError::Configuration(NOT_CONFIGURED))?;
        let anon_key = self
            .inner
            .settings
            .anon_key
            .as_deref()
            .ok_or(DataError::Configuration(NOT_CONFIGURED))?;

        let response = self
            .inner
            .http
            .post(format!("{}/auth/v1/token", base))
            .query(&[("grant_type", "password")])
            .header("apikey", anon_key)
            .json(&PasswordGrant { email, password })
            .timeout(self.inner.config.request_timeout())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<ApiErrorBody>().await.unwrap_or_default();
            return Err(DataError::from_response(status.as_u16(), body));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| DataError::Decode(e.to_string()))?;
        let session = Session::from_access_token(token.access_token, token.refresh_token)?;
        self.install(session.clone());
        Ok(session)
    }

    /// Adopt an externally obtained access token as the current session.
    pub fn set_session(&self, access_token: &str) -> Result<Session, DataError> {
        let session = Session::from_access_token(access_token.to_string(), None)?;
        self.install(session.clone());
        Ok(session)
    }

    pub fn sign_out(&self) {
        let had_session = {
            let mut guard = self.inner.session.write().unwrap_or_else(|e| e.into_inner());
            guard.take().is_some()
        };
        if had_session {
            tracing::info!("session cleared");
            let _ = self.inner.changes.send(AuthChange::SignedOut);
        }
    }

    fn install(&self, session: Session) {
        tracing::info!(user_id = %session.user_id, "session established");
        {
            let mut guard = self.inner.session.write().unwrap_or_else(|e| e.into_inner());
            *guard = Some(session);
        }
        let _ = self.inner.changes.send(AuthChange::SignedIn);
    }
}
