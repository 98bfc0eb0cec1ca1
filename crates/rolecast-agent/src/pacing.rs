use async_trait::async_trait;
use rolecast_core::RolecastResult;
use std::time::Duration;

/// Delay used between dialogue turns unless configured otherwise.
pub const DEFAULT_PACING: Duration = Duration::from_millis(1000);

/// Waits between consecutive model calls so a run does not hammer the API.
///
/// An error ends the dialogue loop early; the turns produced so far are kept.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Called after turn `turn_index` when another turn follows.
    async fn pause(&self, turn_index: usize) -> RolecastResult<()>;
}

/// Sleeps for a fixed duration.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    /// Sleep for `delay` between turns.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// The configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(DEFAULT_PACING)
    }
}

#[async_trait]
impl Pacer for FixedDelay {
    async fn pause(&self, _turn_index: usize) -> RolecastResult<()> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// Never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Pacer for NoDelay {
    async fn pause(&self, _turn_index: usize) -> RolecastResult<()> {
        Ok(())
    }
}

/// `FixedDelay` for a positive duration, `NoDelay` for zero.
pub fn pacer_from_millis(ms: u64) -> Box<dyn Pacer> {
    if ms == 0 {
        Box::new(NoDelay)
    } else {
        Box::new(FixedDelay::new(Duration::from_millis(ms)))
    }
}
