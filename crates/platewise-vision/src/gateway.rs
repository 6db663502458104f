//! Credential failover for the vision provider
//!
//! The provider enforces a daily quota per API key. The gateway hides a pool
//! of keys behind a single `invoke` call: keys are tried in priority order,
//! a key that reports quota exhaustion is put into cooldown and the next one
//! is tried. Any other failure is returned to the caller untouched.
//!
//! Cooldowns live in memory for the lifetime of the gateway. The provider
//! remains the source of truth for quota, so losing them on restart costs at
//! most one wasted call per key.

use crate::credentials::{mask_secret, CredentialPool};
use crate::VisionError;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default cooldown applied to an exhausted credential (24 hours)
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(24 * 60 * 60);

/// Errors reported by [`KeyRotationGateway::invoke`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// No credential was configured at all
    #[error("No vision API credentials are configured")]
    NotConfigured,

    /// Every configured credential is cooling down
    #[error("All vision API credentials are rate limited; try again later")]
    AllCredentialsExhausted,

    /// The call failed for a reason other than quota exhaustion
    #[error("Vision call failed: {0}")]
    Call(#[from] VisionError),
}

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for deterministic tests
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    /// Create a clock frozen at the current instant
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap_or_else(PoisonError::into_inner) += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
struct CredentialSlot {
    id: usize,
    secret: String,
    cooldown_until: Option<Instant>,
}

impl CredentialSlot {
    /// Eligible when no cooldown is set or it has elapsed
    fn is_available(&self, now: Instant) -> bool {
        self.cooldown_until.map_or(true, |until| until <= now)
    }
}

/// Snapshot of a credential slot for display
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialStatus {
    /// Slot index (configuration order)
    pub id: usize,
    /// Masked secret
    pub masked: String,
    /// Remaining cooldown, if cooling down
    pub cooldown_remaining: Option<Duration>,
}

impl CredentialStatus {
    /// Whether the slot is currently usable
    pub fn is_available(&self) -> bool {
        self.cooldown_remaining.is_none()
    }
}

/// Round-robin-free failover over a fixed, ordered pool of credentials
///
/// Construct once at startup and share by `Arc`. The slot table sits behind
/// a mutex that is never held across an `.await`.
pub struct KeyRotationGateway {
    slots: Mutex<Vec<CredentialSlot>>,
    cooldown: Duration,
    clock: Arc<dyn Clock>,
}

impl KeyRotationGateway {
    /// Create a gateway over the pool using the wall clock
    pub fn new(pool: CredentialPool) -> Self {
        let slots = pool
            .into_secrets()
            .into_iter()
            .enumerate()
            .map(|(id, secret)| CredentialSlot {
                id,
                secret,
                cooldown_until: None,
            })
            .collect();

        Self {
            slots: Mutex::new(slots),
            cooldown: DEFAULT_COOLDOWN,
            clock: Arc::new(SystemClock),
        }
    }

    /// Override the cooldown applied to exhausted credentials
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Override the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Number of configured credentials
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    /// True when no credential is configured
    pub fn is_empty(&self) -> bool {
        self.slots().is_empty()
    }

    fn slots(&self) -> MutexGuard<'_, Vec<CredentialSlot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pick the first credential not cooling down
    fn select(&self) -> Result<(usize, String), GatewayError> {
        let now = self.clock.now();
        let mut slots = self.slots();

        if slots.is_empty() {
            return Err(GatewayError::NotConfigured);
        }

        for slot in slots.iter_mut() {
            if slot.is_available(now) {
                if slot.cooldown_until.take().is_some() {
                    info!(slot = slot.id, "Credential cooldown elapsed");
                }
                return Ok((slot.id, slot.secret.clone()));
            }
        }

        Err(GatewayError::AllCredentialsExhausted)
    }

    /// Put a credential into cooldown
    pub fn mark_exhausted(&self, id: usize) {
        let until = self.clock.now() + self.cooldown;
        if let Some(slot) = self.slots().iter_mut().find(|s| s.id == id) {
            slot.cooldown_until = Some(until);
            warn!(
                slot = id,
                cooldown_secs = self.cooldown.as_secs(),
                "Credential quota exhausted, cooling down"
            );
        }
    }

    /// When the credential's cooldown ends, if it is cooling down
    pub fn cooldown_until(&self, id: usize) -> Option<Instant> {
        let now = self.clock.now();
        self.slots()
            .iter()
            .find(|s| s.id == id)
            .and_then(|s| s.cooldown_until)
            .filter(|until| *until > now)
    }

    /// Snapshot of every slot
    pub fn status(&self) -> Vec<CredentialStatus> {
        let now = self.clock.now();
        self.slots()
            .iter()
            .map(|slot| CredentialStatus {
                id: slot.id,
                masked: mask_secret(&slot.secret),
                cooldown_remaining: slot
                    .cooldown_until
                    .filter(|until| *until > now)
                    .map(|until| until - now),
            })
            .collect()
    }

    /// Run `call` with the first eligible credential, failing over on quota exhaustion
    ///
    /// `call` receives the secret and is invoked at most once per configured
    /// credential, strictly one after another.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::NotConfigured`] when the pool is empty
    /// - [`GatewayError::AllCredentialsExhausted`] when every credential is
    ///   (or becomes) cooled down; no call is made if none is eligible
    /// - [`GatewayError::Call`] for any non-quota failure, without failover
    pub async fn invoke<T, F, Fut>(&self, mut call: F) -> Result<T, GatewayError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, VisionError>>,
    {
        let attempts = self.len();
        if attempts == 0 {
            return Err(GatewayError::NotConfigured);
        }

        for attempt in 1..=attempts {
            let (id, secret) = self.select()?;
            debug!(slot = id, attempt, of = attempts, "Invoking vision provider");

            match call(secret).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_quota_exhausted() => self.mark_exhausted(id),
                Err(e) => {
                    debug!(slot = id, error = %e, "Vision call failed without quota signal");
                    return Err(GatewayError::Call(e));
                }
            }
        }

        Err(GatewayError::AllCredentialsExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn gateway(keys: &[&str]) -> (KeyRotationGateway, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let gateway = KeyRotationGateway::new(CredentialPool::new(keys)).with_clock(clock.clone());
        (gateway, clock)
    }

    #[tokio::test]
    async fn test_first_credential_wins() {
        let (gateway, _) = gateway(&["key-one-1111", "key-two-2222"]);
        let result = gateway.invoke(|key| async move { Ok::<_, VisionError>(key) }).await;
        assert_eq!(result.unwrap(), "key-one-1111");
    }

    #[tokio::test]
    async fn test_not_configured() {
        let (gateway, _) = gateway(&[]);
        let calls = AtomicUsize::new(0);
        let result = gateway
            .invoke(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, VisionError>(()) }
            })
            .await;
        assert_eq!(result.unwrap_err(), GatewayError::NotConfigured);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_quota_error_does_not_fail_over() {
        let (gateway, _) = gateway(&["key-one-1111", "key-two-2222"]);
        let calls = AtomicUsize::new(0);
        let result: Result<(), _> = gateway
            .invoke(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(VisionError::Auth("API key not valid".into())) }
            })
            .await;

        assert!(matches!(result, Err(GatewayError::Call(VisionError::Auth(_)))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(gateway.cooldown_until(0).is_none());
    }

    #[tokio::test]
    async fn test_cooldown_elapses_lazily() {
        let (gateway, clock) = gateway(&["key-one-1111", "key-two-2222"]);
        gateway.mark_exhausted(0);

        let used = gateway.invoke(|key| async move { Ok::<_, VisionError>(key) }).await;
        assert_eq!(used.unwrap(), "key-two-2222");

        clock.advance(DEFAULT_COOLDOWN + Duration::from_secs(1));
        let used = gateway.invoke(|key| async move { Ok::<_, VisionError>(key) }).await;
        assert_eq!(used.unwrap(), "key-one-1111");
        assert!(gateway.status().iter().all(|s| s.is_available()));
    }

    #[tokio::test]
    async fn test_status_masks_secrets() {
        let (gateway, _) = gateway(&["AIzaSyAAAAAAAA1111", "AIzaSyBBBBBBBB2222"]);
        gateway.mark_exhausted(1);

        let status = gateway.status();
        assert_eq!(status.len(), 2);
        assert_eq!(status[0].masked, "AIza…1111");
        assert!(status[0].is_available());
        assert_eq!(status[1].cooldown_remaining, Some(DEFAULT_COOLDOWN));
    }

    #[tokio::test]
    async fn test_custom_cooldown() {
        let clock = Arc::new(ManualClock::new());
        let gateway = KeyRotationGateway::new(CredentialPool::new(["key-one-1111"]))
            .with_cooldown(Duration::from_secs(60))
            .with_clock(clock.clone());

        gateway.mark_exhausted(0);
        assert_eq!(gateway.cooldown_until(0), Some(clock.now() + Duration::from_secs(60)));
    }
}
