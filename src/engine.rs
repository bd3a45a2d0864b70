use rand::{rngs::StdRng, SeedableRng};
use std::time::Duration;
use tracing::{debug, info};

use crate::autoplay::AutoPlay;
use crate::clock::SessionClock;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::scheduler::{Fired, Scheduler, TaskKind};
use crate::session::{ClickOutcome, ConfirmOutcome, Session, Status};
use crate::snapshot::{Snapshot, TargetPhase, TargetView};
use crate::target::{TargetSet, TargetState};
use crate::time_source::{MonotonicTime, TimeSource};

/// Game engine facade.
///
/// Single-threaded and cooperative: timers only fire from [`Engine::pump`],
/// which every public operation calls first. Each scheduled task is tagged with
/// the session generation it was armed for, and handlers drop fires whose
/// generation no longer matches the live session.
#[derive(Debug)]
pub struct Engine<T: TimeSource = MonotonicTime> {
    config: EngineConfig,
    time: T,
    rng: StdRng,
    session: Session,
    clock: SessionClock,
    autoplay: AutoPlay,
    scheduler: Scheduler,
    next_generation: u64,
    last_count: Option<u32>,
}

impl Engine<MonotonicTime> {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_parts(config, MonotonicTime::new(), StdRng::from_entropy())
    }
}

impl<T: TimeSource> Engine<T> {
    pub fn with_parts(config: EngineConfig, time: T, rng: StdRng) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            time,
            rng,
            session: Session::idle(),
            clock: SessionClock::new(),
            autoplay: AutoPlay::new(),
            scheduler: Scheduler::new(),
            next_generation: 0,
            last_count: None,
        })
    }

    /// Deterministic engine for tests and replays
    pub fn with_seed(config: EngineConfig, time: T, seed: u64) -> Result<Self, EngineError> {
        Self::with_parts(config, time, StdRng::seed_from_u64(seed))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn time(&self) -> &T {
        &self.time
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn status(&self) -> Status {
        self.session.status()
    }

    pub fn autoplay_enabled(&self) -> bool {
        self.autoplay.is_enabled()
    }

    pub fn last_count(&self) -> Option<u32> {
        self.last_count
    }

    /// Starts a fresh session with `count` targets, discarding the previous one.
    ///
    /// `count` must be in `1..=max_targets`; anything else leaves the engine untouched.
    pub fn start(&mut self, count: u32) -> Result<(), EngineError> {
        if count == 0 || count > self.config.max_targets {
            return Err(EngineError::InvalidCount(count.to_string()));
        }
        self.pump();

        let now = self.time.now();
        self.scheduler.cancel_all();
        self.next_generation += 1;
        let generation = self.next_generation;

        let targets = TargetSet::generate(count, &self.config, &mut self.rng);
        self.session = Session::begin(generation, targets, now);
        self.last_count = Some(count);

        self.clock.start(now);
        let tick = self.config.clock_tick();
        self.scheduler
            .schedule_every(TaskKind::ClockTick, generation, now + tick, tick);
        if self.autoplay.is_enabled() {
            self.arm_autoplay(now);
        }

        info!(generation, count, autoplay = self.autoplay.is_enabled(), "session started");
        Ok(())
    }

    /// Parses a user-typed count; anything but a positive integer leaves the engine untouched
    pub fn start_from_input(&mut self, input: &str) -> Result<(), EngineError> {
        let count = input
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|c| *c > 0)
            .ok_or_else(|| EngineError::InvalidCount(input.to_string()))?;
        self.start(count)
            .map_err(|_| EngineError::InvalidCount(input.to_string()))
    }

    /// Starts again with the previous count
    pub fn restart(&mut self) -> Result<(), EngineError> {
        let count = self
            .last_count
            .ok_or_else(|| EngineError::InvalidCount(String::new()))?;
        self.start(count)
    }

    pub fn click(&mut self, order: u32) {
        self.pump();
        let now = self.time.now();
        self.apply_click(order, now);
    }

    /// Clicks whatever sits under a board coordinate.
    ///
    /// Returns the order that received the click. A fading target still covers
    /// its footprint but does not react, so `None` is returned for it.
    pub fn click_at(&mut self, x: u32, y: u32) -> Option<u32> {
        self.pump();
        let now = self.time.now();
        let view_at = self.session.view_time(now);
        let fade = self.config.fade_duration();

        let order = self
            .session
            .targets()
            .target_at(x, y, view_at, fade)
            .filter(|t| t.is_pending())
            .map(|t| t.order)?;
        self.apply_click(order, now);
        Some(order)
    }

    pub fn toggle_autoplay(&mut self) {
        self.pump();
        let now = self.time.now();

        if self.autoplay.is_enabled() {
            self.autoplay.disable();
            self.scheduler.cancel(TaskKind::AutoPlayTick);
            info!("autoplay disabled");
        } else if self.session.is_playing() {
            self.autoplay.enable();
            self.arm_autoplay(now);
            info!(generation = self.session.generation(), "autoplay enabled");
        } else {
            debug!(status = %self.session.status(), "autoplay needs a running session");
        }
    }

    /// Fires every task due by now, in due order. Returns how many fired.
    pub fn pump(&mut self) -> usize {
        let now = self.time.now();
        let mut fired = 0;
        while let Some(task) = self.scheduler.pop_due(now) {
            self.dispatch(task);
            fired += 1;
        }
        fired
    }

    /// Brings timers up to date, then captures the state
    pub fn snapshot(&mut self) -> Snapshot {
        self.pump();
        self.view()
    }

    /// State as of the last pump
    pub fn view(&self) -> Snapshot {
        let view_at = self.session.view_time(self.time.now());
        let fade = self.config.fade_duration();

        let targets = self
            .session
            .targets()
            .iter()
            .filter_map(|t| {
                let phase = match t.state_at(view_at, fade) {
                    TargetState::Expired => return None,
                    TargetState::Pending => TargetPhase::Pending,
                    TargetState::Clicked { .. } => TargetPhase::Fading {
                        opacity: t.opacity_at(view_at, fade),
                        remaining_secs: t
                            .remaining_fade_at(view_at, fade)
                            .unwrap_or_default()
                            .as_secs_f64(),
                    },
                };
                Some(TargetView {
                    order: t.order,
                    position: t.position,
                    phase,
                })
            })
            .collect();

        Snapshot {
            status: self.session.status(),
            targets,
            total_targets: self.session.last_order(),
            expected_order: self.session.expected_order(),
            elapsed_secs: self.clock.elapsed_secs(),
            autoplay_enabled: self.autoplay.is_enabled(),
            pending_confirmation: self.session.pending_confirmation(),
            board_size: self.config.board_size,
            target_size: self.config.target_size,
        }
    }

    /// Releases every outstanding timer; also run on drop
    pub fn shutdown(&mut self) {
        let now = self.time.now();
        self.scheduler.cancel_all();
        self.clock.stop(now);
        self.autoplay.disable();
    }

    fn arm_autoplay(&mut self, now: Duration) {
        let interval = self.config.autoplay_interval();
        self.scheduler.schedule_every(
            TaskKind::AutoPlayTick,
            self.session.generation(),
            now + interval,
            interval,
        );
    }

    fn dispatch(&mut self, task: Fired) {
        if task.generation != self.session.generation() {
            debug!(kind = %task.kind, generation = task.generation, "dropping stale timer");
            return;
        }

        match task.kind {
            TaskKind::ClockTick => self.clock.tick(task.due),
            TaskKind::AutoPlayTick => {
                if let Some(order) = self.autoplay.next_click(&self.session) {
                    debug!(order, "autoplay click");
                    self.apply_click(order, task.due);
                }
            }
            TaskKind::AllClearConfirmation => {
                match self.session.confirm_all_clear(task.generation, task.due) {
                    ConfirmOutcome::AllClear => {
                        self.leave_playing(task.due);
                        info!(
                            generation = task.generation,
                            elapsed_secs = self.clock.elapsed_secs(),
                            "all clear"
                        );
                    }
                    ConfirmOutcome::Stale => debug!("all-clear confirmation no longer applies"),
                }
            }
        }
    }

    fn apply_click(&mut self, order: u32, now: Duration) {
        match self.session.click(order, now) {
            ClickOutcome::Ignored => debug!(order, status = %self.session.status(), "click ignored"),
            ClickOutcome::Advanced { next } => debug!(order, next, "correct click"),
            ClickOutcome::LastAccepted => {
                let due = now + self.config.confirmation_delay();
                self.scheduler.schedule_once(
                    TaskKind::AllClearConfirmation,
                    self.session.generation(),
                    due,
                );
                debug!(order, "last target hit, awaiting confirmation");
            }
            ClickOutcome::GameOver => {
                self.leave_playing(now);
                info!(
                    order,
                    expected = self.session.expected_order(),
                    "out of order click, game over"
                );
            }
        }
    }

    /// Playing -> GameOver | AllClear releases the clock and the bot
    fn leave_playing(&mut self, now: Duration) {
        self.clock.stop(now);
        self.scheduler.cancel(TaskKind::ClockTick);
        self.scheduler.cancel(TaskKind::AutoPlayTick);
        self.scheduler.cancel(TaskKind::AllClearConfirmation);
        if self.autoplay.is_enabled() {
            self.autoplay.disable();
            debug!("autoplay disabled by game end");
        }
    }
}

impl<T: TimeSource> Drop for Engine<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
