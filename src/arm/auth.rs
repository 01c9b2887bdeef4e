//! Credentials
//!
//! The control plane only needs a credential to hand out a bearer token once,
//! when a client is constructed. Token refresh is not modelled.

use crate::error::{Error, Result};
use crate::fault::{FaultInjector, FaultProfile, OpKind};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default scope requested at client construction
pub const DEFAULT_SCOPES: &[&str] = &["https://management.azure.com/.default"];

/// Lifetime of issued tokens
const TOKEN_TTL_SECS: i64 = 3600;

/// Opaque bearer token with its absolute expiry
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_on
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Anything able to issue an access token
#[async_trait]
pub trait TokenCredential: Send + Sync {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken>;
}

/// Credential that issues mock tokens with simulated latency and failures
pub struct SimulatedCredential {
    faults: FaultInjector,
    rng: Mutex<StdRng>,
}

impl SimulatedCredential {
    /// Reference latency and a 2% authentication failure rate
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_profile(FaultProfile::reference(), seed)
    }

    pub fn with_profile(profile: FaultProfile, seed: Option<u64>) -> Self {
        let faults = FaultInjector::new(profile, seed);
        let rng = StdRng::seed_from_u64(faults.seed().wrapping_add(1));
        Self {
            faults,
            rng: Mutex::new(rng),
        }
    }
}

#[async_trait]
impl TokenCredential for SimulatedCredential {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken> {
        tracing::debug!("Requesting token for scopes {:?}", scopes);
        self.faults
            .evaluate(OpKind::GetToken, "Authentication failed - invalid credentials")
            .await?;

        let suffix: u32 = self.rng.lock().gen_range(100_000..=999_999);
        Ok(AccessToken {
            token: format!("mock_token_{}", suffix),
            expires_on: Utc::now() + Duration::seconds(TOKEN_TTL_SECS),
        })
    }
}

/// Credential that always returns the same token, or always fails
#[derive(Debug, Clone)]
pub struct StaticCredential {
    token: Option<String>,
}

impl StaticCredential {
    pub fn new(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
        }
    }

    /// Credential whose every request fails with an authentication error
    pub fn failing() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl TokenCredential for StaticCredential {
    async fn get_token(&self, _scopes: &[&str]) -> Result<AccessToken> {
        match &self.token {
            Some(token) => Ok(AccessToken {
                token: token.clone(),
                expires_on: Utc::now() + Duration::seconds(TOKEN_TTL_SECS),
            }),
            None => Err(Error::Authentication(
                "Authentication failed - invalid credentials".to_string(),
            )),
        }
    }
}
