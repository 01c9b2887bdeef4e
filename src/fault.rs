//! Fault Injection
//!
//! Simulated latency and transient failures for the operation services.
//! Each operation kind gets a latency range and an ordered list of failure
//! rules; the first rule that fires aborts the call.
//!
//! The injector owns its random source and is seeded at construction, so a
//! given seed always produces the same sequence of delays and failures.

use crate::error::{Error, ErrorKind, Result};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::time::Duration;

/// Operation kinds that can be delayed or failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    CreateResourceGroup,
    GetResourceGroup,
    DeleteResourceGroup,
    ListResourceGroups,
    CheckResourceGroupExistence,
    CreateResource,
    GetResource,
    DeleteResource,
    ListResources,
    CreateTags,
    GetTags,
    DeleteTags,
    GetToken,
}

/// Inclusive latency bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LatencyRange {
    min: Duration,
    max: Duration,
}

impl LatencyRange {
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn from_millis(min: u64, max: u64) -> Self {
        Self::new(Duration::from_millis(min), Duration::from_millis(max))
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn is_zero(&self) -> bool {
        self.max.is_zero()
    }

    /// Multiply both bounds by `factor` (negative factors clamp to zero)
    ///
    /// A factor that would overflow a `Duration` leaves the range unchanged.
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        let scale = |d: Duration| Duration::try_from_secs_f64(d.as_secs_f64() * factor).ok();
        match (scale(self.min), scale(self.max)) {
            (Some(min), Some(max)) => Self::new(min, max),
            _ => {
                tracing::warn!("Ignoring latency scale {} for {:?}", factor, self);
                *self
            }
        }
    }
}

/// A single failure rule
#[derive(Debug, Clone, PartialEq)]
pub struct FaultRule {
    /// Chance in `[0, 1]` that this rule fires
    pub probability: f64,
    pub kind: ErrorKind,
    /// Short error code prefixed to the failure message
    pub code: String,
}

impl FaultRule {
    pub fn new(probability: f64, kind: ErrorKind, code: &str) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
            kind,
            code: code.to_string(),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }
}

/// Latency and failure configuration for every operation kind
#[derive(Debug, Clone, Default)]
pub struct FaultProfile {
    /// Latency for kinds without an explicit entry
    pub default_latency: LatencyRange,
    pub latency: HashMap<OpKind, LatencyRange>,
    pub rules: HashMap<OpKind, Vec<FaultRule>>,
}

impl FaultProfile {
    /// No latency, no failures
    pub fn none() -> Self {
        Self::default()
    }

    /// Latency and failure rates modelled on a live control plane
    pub fn reference() -> Self {
        use ErrorKind::*;
        use OpKind::*;

        Self::none()
            .with_latency(CreateResourceGroup, LatencyRange::from_millis(500, 1500))
            .with_latency(GetResourceGroup, LatencyRange::from_millis(100, 300))
            .with_latency(DeleteResourceGroup, LatencyRange::from_millis(1000, 2000))
            .with_latency(CheckResourceGroupExistence, LatencyRange::from_millis(50, 100))
            .with_latency(CreateResource, LatencyRange::from_millis(100, 300))
            .with_latency(DeleteResource, LatencyRange::from_millis(200, 500))
            .with_latency(CreateTags, LatencyRange::from_millis(50, 150))
            .with_latency(GetToken, LatencyRange::from_millis(100, 300))
            .with_rule(CreateResourceGroup, FaultRule::new(0.05, ServiceUnavailable, "ServiceUnavailable"))
            .with_rule(CreateResource, FaultRule::new(0.02, Throttled, "QuotaExceeded"))
            .with_rule(CreateResource, FaultRule::new(0.01, Validation, "InvalidLocation"))
            .with_rule(CreateResource, FaultRule::new(0.015, Authorization, "AuthorizationFailed"))
            .with_rule(CreateResource, FaultRule::new(0.005, Internal, "InternalServerError"))
            .with_rule(CreateResource, FaultRule::new(0.05, Throttled, "RateLimited"))
            .with_rule(GetToken, FaultRule::new(0.02, Authentication, "InvalidCredentials"))
    }

    pub fn with_latency(mut self, op: OpKind, range: LatencyRange) -> Self {
        self.latency.insert(op, range);
        self
    }

    pub fn with_default_latency(mut self, range: LatencyRange) -> Self {
        self.default_latency = range;
        self
    }

    /// Append a rule; rules fire in the order they were added
    pub fn with_rule(mut self, op: OpKind, rule: FaultRule) -> Self {
        self.rules.entry(op).or_default().push(rule);
        self
    }

    /// Scale every latency bound
    pub fn scale_latency(mut self, factor: f64) -> Self {
        self.default_latency = self.default_latency.scaled(factor);
        for range in self.latency.values_mut() {
            *range = range.scaled(factor);
        }
        self
    }

    pub fn latency_for(&self, op: OpKind) -> LatencyRange {
        self.latency.get(&op).copied().unwrap_or(self.default_latency)
    }

    pub fn rules_for(&self, op: OpKind) -> &[FaultRule] {
        self.rules.get(&op).map(|r| r.as_slice()).unwrap_or(&[])
    }
}

/// Seeded latency and failure source
#[derive(Debug)]
pub struct FaultInjector {
    profile: FaultProfile,
    rng: Mutex<StdRng>,
    seed: u64,
}

impl FaultInjector {
    /// Create an injector; a missing seed is drawn from entropy
    pub fn new(profile: FaultProfile, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            profile,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            seed,
        }
    }

    /// Injector that never delays or fails
    pub fn disabled() -> Self {
        Self::new(FaultProfile::none(), Some(0))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn profile(&self) -> &FaultProfile {
        &self.profile
    }

    /// Draw a delay for `op`
    pub fn sample_delay(&self, op: OpKind) -> Duration {
        let range = self.profile.latency_for(op);
        if range.is_zero() {
            return Duration::ZERO;
        }
        let secs = self
            .rng
            .lock()
            .gen_range(range.min().as_secs_f64()..=range.max().as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    /// Sleep for a sampled delay. The rng lock is released before sleeping.
    pub async fn delay(&self, op: OpKind) {
        let delay = self.sample_delay(op);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Evaluate failure rules for `op` in declaration order
    pub fn check(&self, op: OpKind, operand: &str) -> Result<()> {
        let rules = self.profile.rules_for(op);
        if rules.is_empty() {
            return Ok(());
        }

        let mut rng = self.rng.lock();
        for rule in rules {
            let roll: f64 = rng.gen();
            if roll < rule.probability {
                tracing::warn!(
                    "Injected fault on {:?}: {} ({}) for {}",
                    op,
                    rule.code,
                    rule.status_code(),
                    operand
                );
                return Err(Error::new(rule.kind, format!("{}: {}", rule.code, operand)));
            }
        }
        Ok(())
    }

    /// Delay, then evaluate failure rules
    pub async fn evaluate(&self, op: OpKind, operand: &str) -> Result<()> {
        self.delay(op).await;
        self.check(op, operand)
    }
}

impl Default for FaultInjector {
    fn default() -> Self {
        Self::disabled()
    }
}
