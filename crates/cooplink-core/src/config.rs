// ── Runtime configuration for the core components ──

use std::time::Duration;

use secrecy::SecretString;

/// Hard bounds on the poll interval. Values outside are clamped, not
/// rejected; the clamped value is the effective interval.
pub const MIN_POLL_SECS: u64 = 60;
pub const MAX_POLL_SECS: u64 = 86_400;
pub const DEFAULT_POLL_SECS: u64 = 300;

/// How often the engine polls the cloud API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollingInterval {
    /// No timer at all; refreshes happen only on demand or via webhook.
    Disabled,
    /// Poll every N seconds, clamped to `[MIN_POLL_SECS, MAX_POLL_SECS]`.
    Every(u64),
}

impl PollingInterval {
    /// The effective timer period, `None` when polling is disabled.
    pub fn effective(&self) -> Option<Duration> {
        match self {
            Self::Disabled => None,
            Self::Every(secs) => Some(Duration::from_secs(
                (*secs).clamp(MIN_POLL_SECS, MAX_POLL_SECS),
            )),
        }
    }
}

impl Default for PollingInterval {
    fn default() -> Self {
        Self::Every(DEFAULT_POLL_SECS)
    }
}

/// A setting family whose change only takes effect on a running unit
/// after an off/on cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleSetting {
    FanMode,
    FanManualSpeed,
    FanTimeSlot,
}

/// Tunables for command dispatch.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Setting families that require the off/settle/on compensation
    /// while the unit is running. Firmware-dependent, so data not code.
    pub cycle_required: Vec<CycleSetting>,
    /// Pause between the compensating off and on.
    pub settle_delay: Duration,
    /// Delays for the follow-up refreshes scheduled after a dispatch.
    pub followup_delays: Vec<Duration>,
    /// How long an optimistic override masks authoritative state.
    pub override_ttl: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            cycle_required: vec![
                CycleSetting::FanMode,
                CycleSetting::FanManualSpeed,
                CycleSetting::FanTimeSlot,
            ],
            settle_delay: Duration::from_millis(500),
            followup_delays: vec![
                Duration::from_millis(1500),
                Duration::from_secs(5),
                Duration::from_secs(15),
                Duration::from_secs(30),
            ],
            override_ttl: Duration::from_secs(20),
        }
    }
}

impl DispatchConfig {
    pub fn requires_cycle(&self, setting: CycleSetting) -> bool {
        self.cycle_required.contains(&setting)
    }
}

/// Webhook receiver configuration.
#[derive(Clone)]
pub struct WebhookConfig {
    /// Shared token callers must present. `None` accepts everything.
    pub token: Option<SecretString>,
    /// Events inside this window after a scheduled refresh are
    /// acknowledged without scheduling another.
    pub debounce: Duration,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            token: None,
            debounce: Duration::from_secs(1),
        }
    }
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("debounce", &self.debounce)
            .finish()
    }
}
