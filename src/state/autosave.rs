use std::time::{Duration, Instant};

/// Trailing-edge debounce for auto-save.
///
/// Every log mutation calls [`AutoSave::touch`]; once the log has been quiet
/// for the whole period, [`AutoSave::poll`] fires exactly once. Time is passed
/// in by the caller so the surface stays free of timers.
#[derive(Debug, Clone)]
pub struct AutoSave {
    quiet_period: Duration,
    enabled: bool,
    deadline: Option<Instant>,
}

impl AutoSave {
    pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(5000);

    pub fn new(quiet_period: Duration, enabled: bool) -> Self {
        Self {
            quiet_period,
            enabled,
            deadline: None,
        }
    }

    /// Restart the quiet period from `now`.
    pub fn touch(&mut self, now: Instant) {
        if !self.enabled {
            return;
        }
        if self.deadline.is_none() {
            log::debug!("auto-save scheduled in {:?}", self.quiet_period);
        }
        self.deadline = Some(now + self.quiet_period);
    }

    /// Returns true once when the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                log::info!("auto-save triggered");
                true
            }
            _ => false,
        }
    }

    /// Drop any pending save, e.g. when the surface goes away.
    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            log::debug!("pending auto-save cancelled");
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left until the pending save fires, for repaint scheduling.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|deadline| deadline.saturating_duration_since(now))
    }
}

impl Default for AutoSave {
    fn default() -> Self {
        Self::new(Self::DEFAULT_QUIET_PERIOD, true)
    }
}
