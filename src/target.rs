use rand::Rng;
use serde::Serialize;
use std::time::Duration;

use crate::config::EngineConfig;

/// Top-left corner of a target on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

/// Lifecycle of a target: `Pending -> Clicked -> Expired`, never backwards.
///
/// `Expired` is never stored. It is derived from the click timestamp whenever
/// the target is inspected, so there is no per-target timer to cancel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetState {
    Pending,
    Clicked { at: Duration },
    Expired,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub order: u32,
    pub position: Position,
    clicked_at: Option<Duration>,
}

impl Target {
    pub fn new(order: u32, position: Position) -> Self {
        Self {
            order,
            position,
            clicked_at: None,
        }
    }

    pub fn clicked_at(&self) -> Option<Duration> {
        self.clicked_at
    }

    pub fn is_pending(&self) -> bool {
        self.clicked_at.is_none()
    }

    pub fn state_at(&self, now: Duration, fade: Duration) -> TargetState {
        match self.clicked_at {
            None => TargetState::Pending,
            Some(at) if now.saturating_sub(at) >= fade => TargetState::Expired,
            Some(at) => TargetState::Clicked { at },
        }
    }

    /// `max(0, 1 - since_click / fade)`, full opacity while pending
    pub fn opacity_at(&self, now: Duration, fade: Duration) -> f64 {
        match self.clicked_at {
            None => 1.0,
            Some(at) => {
                let since = now.saturating_sub(at).as_secs_f64();
                (1.0 - since / fade.as_secs_f64()).max(0.0)
            }
        }
    }

    /// Fade time left, `None` while pending
    pub fn remaining_fade_at(&self, now: Duration, fade: Duration) -> Option<Duration> {
        self.clicked_at
            .map(|at| fade.saturating_sub(now.saturating_sub(at)))
    }

    pub fn contains(&self, x: u32, y: u32, size: u32) -> bool {
        x >= self.position.x
            && x < self.position.x + size
            && y >= self.position.y
            && y < self.position.y + size
    }

    fn mark_clicked(&mut self, at: Duration) -> bool {
        if self.clicked_at.is_some() {
            return false;
        }
        self.clicked_at = Some(at);
        true
    }
}

/// The numbered targets of one session, stored by ascending order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetSet {
    targets: Vec<Target>,
    target_size: u32,
}

impl TargetSet {
    /// Spawns `count` targets with orders `1..=count`.
    ///
    /// Each coordinate is drawn independently from `[0, board_size - target_size)`.
    /// Targets may overlap.
    pub fn generate<R: Rng>(count: u32, config: &EngineConfig, rng: &mut R) -> Self {
        let extent = config.spawn_extent();
        let mut coord = || if extent == 0 { 0 } else { rng.gen_range(0..extent) };

        let targets = (1..=count)
            .map(|order| {
                let x = coord();
                let y = coord();
                Target::new(order, Position { x, y })
            })
            .collect();

        Self {
            targets,
            target_size: config.target_size,
        }
    }

    pub fn from_targets(targets: Vec<Target>, target_size: u32) -> Self {
        Self {
            targets,
            target_size,
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn target_size(&self) -> u32 {
        self.target_size
    }

    /// Highest order in the set, i.e. the final target
    pub fn last_order(&self) -> u32 {
        self.targets.len() as u32
    }

    pub fn get(&self, order: u32) -> Option<&Target> {
        let idx = order.checked_sub(1)? as usize;
        self.targets.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    /// Only a pending target can be clicked; returns whether it was
    pub fn mark_clicked(&mut self, order: u32, at: Duration) -> bool {
        let Some(idx) = order.checked_sub(1) else {
            return false;
        };
        self.targets
            .get_mut(idx as usize)
            .is_some_and(|t| t.mark_clicked(at))
    }

    /// Targets that have not expired yet
    pub fn active_at(&self, now: Duration, fade: Duration) -> impl Iterator<Item = &Target> {
        self.targets
            .iter()
            .filter(move |t| t.state_at(now, fade) != TargetState::Expired)
    }

    pub fn pending(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|t| t.is_pending())
    }

    /// Topmost non-expired target under the point.
    ///
    /// Lower orders stack above higher ones, so the lowest matching order wins.
    pub fn target_at(&self, x: u32, y: u32, now: Duration, fade: Duration) -> Option<&Target> {
        self.active_at(now, fade)
            .find(|t| t.contains(x, y, self.target_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn secs(v: f64) -> Duration {
        Duration::from_secs_f64(v)
    }

    const FADE: Duration = Duration::from_secs(3);

    #[test]
    fn generate_produces_dense_orders_within_bounds() {
        let config = EngineConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let set = TargetSet::generate(40, &config, &mut rng);

        assert_eq!(set.len(), 40);
        assert_eq!(set.last_order(), 40);
        let orders: Vec<u32> = set.iter().map(|t| t.order).collect();
        assert_eq!(orders, (1..=40).collect::<Vec<_>>());
        for t in set.iter() {
            assert!(t.position.x < 450 && t.position.y < 450);
            assert!(t.is_pending());
        }
    }

    #[test]
    fn generate_zero_targets_is_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let set = TargetSet::generate(0, &EngineConfig::default(), &mut rng);
        assert!(set.is_empty());
        assert_eq!(set.get(1), None);
    }

    #[test]
    fn lifecycle_is_monotonic() {
        let mut set = TargetSet::from_targets(vec![Target::new(1, Position { x: 0, y: 0 })], 50);
        let t0 = secs(10.0);

        assert_eq!(set.get(1).unwrap().state_at(t0, FADE), TargetState::Pending);
        assert!(set.mark_clicked(1, t0));
        assert!(!set.mark_clicked(1, secs(11.0)), "second click must not reset fade");

        let target = set.get(1).unwrap();
        assert_eq!(target.clicked_at(), Some(t0));
        assert_eq!(target.state_at(secs(12.9), FADE), TargetState::Clicked { at: t0 });
        assert_eq!(target.state_at(secs(13.0), FADE), TargetState::Expired);
        assert_eq!(target.state_at(secs(60.0), FADE), TargetState::Expired);
    }

    #[test]
    fn opacity_decays_linearly() {
        let mut target = Target::new(1, Position { x: 0, y: 0 });
        assert_eq!(target.opacity_at(secs(5.0), FADE), 1.0);

        target.mark_clicked(secs(0.0));
        assert!((target.opacity_at(secs(1.5), FADE) - 0.5).abs() < 1e-9);
        assert!((target.opacity_at(secs(2.7), FADE) - 0.1).abs() < 1e-9);
        assert_eq!(target.opacity_at(secs(3.0), FADE), 0.0);
        assert_eq!(target.opacity_at(secs(9.0), FADE), 0.0);
        assert_eq!(target.remaining_fade_at(secs(1.0), FADE), Some(secs(2.0)));
        assert_eq!(target.remaining_fade_at(secs(4.0), FADE), Some(Duration::ZERO));
    }

    #[test]
    fn expired_targets_leave_active_set() {
        let mut set = TargetSet::from_targets(
            vec![
                Target::new(1, Position { x: 0, y: 0 }),
                Target::new(2, Position { x: 100, y: 100 }),
            ],
            50,
        );
        set.mark_clicked(1, secs(0.0));

        let active: Vec<u32> = set.active_at(secs(2.0), FADE).map(|t| t.order).collect();
        assert_eq!(active, vec![1, 2]);
        let active: Vec<u32> = set.active_at(secs(3.0), FADE).map(|t| t.order).collect();
        assert_eq!(active, vec![2]);
        assert_eq!(set.pending().count(), 1);
    }

    #[test]
    fn hit_test_prefers_lower_order_on_overlap() {
        let mut set = TargetSet::from_targets(
            vec![
                Target::new(1, Position { x: 10, y: 10 }),
                Target::new(2, Position { x: 30, y: 30 }),
            ],
            50,
        );
        let now = secs(0.0);
        assert_eq!(set.target_at(40, 40, now, FADE).map(|t| t.order), Some(1));
        assert_eq!(set.target_at(70, 70, now, FADE).map(|t| t.order), Some(2));
        assert_eq!(set.target_at(5, 5, now, FADE), None);

        // once target 1 has faded away, target 2 is reachable through it
        set.mark_clicked(1, now);
        assert_eq!(set.target_at(40, 40, secs(1.0), FADE).map(|t| t.order), Some(1));
        assert_eq!(set.target_at(40, 40, secs(3.0), FADE).map(|t| t.order), Some(2));
    }
}
