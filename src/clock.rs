use std::time::Duration;

/// Elapsed-time clock for a running session.
///
/// The displayed value only moves on [`SessionClock::tick`], which the engine
/// drives from its periodic clock task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionClock {
    started_at: Option<Duration>,
    elapsed: Duration,
    running: bool,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)starts from zero at `now`
    pub fn start(&mut self, now: Duration) {
        self.started_at = Some(now);
        self.elapsed = Duration::ZERO;
        self.running = true;
    }

    pub fn tick(&mut self, now: Duration) {
        if !self.running {
            return;
        }
        if let Some(started_at) = self.started_at {
            self.elapsed = now.saturating_sub(started_at);
        }
    }

    /// Freezes the elapsed value at `now`. Stopping twice is a no-op.
    pub fn stop(&mut self, now: Duration) {
        if !self.running {
            return;
        }
        self.tick(now);
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn started_at(&self) -> Option<Duration> {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}
