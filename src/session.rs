use serde::Serialize;
use std::time::Duration;

use crate::target::TargetSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum Status {
    Idle,
    Playing,
    GameOver,
    AllClear,
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::GameOver | Status::AllClear)
    }
}

/// What a click did to the session, so the caller can arm or cancel timers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Ignored,
    Advanced { next: u32 },
    /// The final target was hit; all-clear is pending confirmation
    LastAccepted,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    AllClear,
    /// The world moved on since the confirmation was armed
    Stale,
}

/// One round of play, replaced wholesale on every start
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    generation: u64,
    status: Status,
    targets: TargetSet,
    expected_order: u32,
    started_at: Option<Duration>,
    ended_at: Option<Duration>,
    pending_confirmation: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::idle()
    }
}

impl Session {
    pub fn idle() -> Self {
        Self {
            generation: 0,
            status: Status::Idle,
            targets: TargetSet::default(),
            expected_order: 1,
            started_at: None,
            ended_at: None,
            pending_confirmation: false,
        }
    }

    pub fn begin(generation: u64, targets: TargetSet, now: Duration) -> Self {
        Self {
            generation,
            status: Status::Playing,
            targets,
            expected_order: 1,
            started_at: Some(now),
            ended_at: None,
            pending_confirmation: false,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    pub fn expected_order(&self) -> u32 {
        self.expected_order
    }

    pub fn started_at(&self) -> Option<Duration> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<Duration> {
        self.ended_at
    }

    pub fn pending_confirmation(&self) -> bool {
        self.pending_confirmation
    }

    pub fn is_playing(&self) -> bool {
        self.status == Status::Playing
    }

    pub fn last_order(&self) -> u32 {
        self.targets.last_order()
    }

    /// Instant at which target lifecycles are evaluated; frozen once the game ends
    pub fn view_time(&self, now: Duration) -> Duration {
        self.ended_at.unwrap_or(now)
    }

    pub fn click(&mut self, order: u32, now: Duration) -> ClickOutcome {
        if self.status != Status::Playing || self.targets.get(order).is_none() {
            return ClickOutcome::Ignored;
        }

        let last = self.last_order();
        if self.pending_confirmation && order == last {
            // the final click already armed the confirmation
            return ClickOutcome::Ignored;
        }

        if order != self.expected_order {
            self.status = Status::GameOver;
            self.ended_at = Some(now);
            self.pending_confirmation = false;
            return ClickOutcome::GameOver;
        }

        self.targets.mark_clicked(order, now);
        if order == last {
            self.pending_confirmation = true;
            ClickOutcome::LastAccepted
        } else {
            self.expected_order += 1;
            ClickOutcome::Advanced {
                next: self.expected_order,
            }
        }
    }

    /// Deadline check for the final click's confirmation delay
    pub fn confirm_all_clear(&mut self, generation: u64, now: Duration) -> ConfirmOutcome {
        if generation != self.generation {
            return ConfirmOutcome::Stale;
        }

        let still_valid = self.status == Status::Playing
            && self.pending_confirmation
            && self.expected_order == self.last_order();
        self.pending_confirmation = false;
        if !still_valid {
            return ConfirmOutcome::Stale;
        }

        self.status = Status::AllClear;
        self.ended_at = Some(now);
        ConfirmOutcome::AllClear
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{Position, Target, TargetState};
    use assert_matches::assert_matches;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn session(n: u32) -> Session {
        let targets = (1..=n)
            .map(|order| Target::new(order, Position { x: 0, y: 0 }))
            .collect();
        Session::begin(1, TargetSet::from_targets(targets, 50), ms(0))
    }

    #[test]
    fn idle_session_ignores_clicks() {
        let mut s = Session::idle();
        assert_eq!(s.status(), Status::Idle);
        assert_eq!(s.click(1, ms(0)), ClickOutcome::Ignored);
    }

    #[test]
    fn in_order_clicks_advance() {
        let mut s = session(3);
        assert_eq!(s.expected_order(), 1);
        assert_matches!(s.click(1, ms(10)), ClickOutcome::Advanced { next: 2 });
        assert_matches!(s.click(2, ms(20)), ClickOutcome::Advanced { next: 3 });
        assert_eq!(s.click(3, ms(30)), ClickOutcome::LastAccepted);
        assert!(s.pending_confirmation());
        assert_eq!(s.expected_order(), 3);
        assert_eq!(s.status(), Status::Playing);
    }

    #[test]
    fn out_of_order_click_ends_game_immediately() {
        let mut s = session(3);
        assert_eq!(s.click(2, ms(5)), ClickOutcome::GameOver);
        assert_eq!(s.status(), Status::GameOver);
        assert_eq!(s.ended_at(), Some(ms(5)));
        assert_eq!(s.click(1, ms(6)), ClickOutcome::Ignored);
        assert_eq!(s.status(), Status::GameOver);
    }

    #[test]
    fn clicking_an_already_clicked_target_is_out_of_order() {
        let mut s = session(3);
        s.click(1, ms(10));
        assert_eq!(s.click(1, ms(20)), ClickOutcome::GameOver);
        // target 1 keeps its original click time
        let t = s.targets().get(1).unwrap();
        assert_eq!(t.state_at(ms(20), ms(3000)), TargetState::Clicked { at: ms(10) });
    }

    #[test]
    fn unknown_orders_are_ignored() {
        let mut s = session(3);
        assert_eq!(s.click(0, ms(1)), ClickOutcome::Ignored);
        assert_eq!(s.click(4, ms(1)), ClickOutcome::Ignored);
        assert_eq!(s.status(), Status::Playing);
    }

    #[test]
    fn repeated_last_click_is_guarded() {
        let mut s = session(1);
        assert_eq!(s.click(1, ms(0)), ClickOutcome::LastAccepted);
        assert_eq!(s.click(1, ms(0)), ClickOutcome::Ignored);
        assert_eq!(s.status(), Status::Playing);
    }

    #[test]
    fn confirmation_declares_all_clear() {
        let mut s = session(2);
        s.click(1, ms(0));
        s.click(2, ms(100));
        assert_eq!(s.confirm_all_clear(1, ms(3100)), ConfirmOutcome::AllClear);
        assert_eq!(s.status(), Status::AllClear);
        assert!(!s.pending_confirmation());
        assert_eq!(s.view_time(ms(9999)), ms(3100));
    }

    #[test]
    fn game_over_during_confirmation_wins() {
        let mut s = session(2);
        s.click(1, ms(0));
        s.click(2, ms(100));
        assert_eq!(s.click(1, ms(200)), ClickOutcome::GameOver);
        assert_eq!(s.confirm_all_clear(1, ms(3100)), ConfirmOutcome::Stale);
        assert_eq!(s.status(), Status::GameOver);
    }

    #[test]
    fn confirmation_from_other_generation_is_stale() {
        let mut s = session(1);
        s.click(1, ms(0));
        assert_eq!(s.confirm_all_clear(0, ms(3000)), ConfirmOutcome::Stale);
        assert!(s.pending_confirmation(), "foreign fire must not touch state");
        assert_eq!(s.status(), Status::Playing);
    }

    #[test]
    fn status_display_names() {
        assert_eq!(Status::AllClear.to_string(), "AllClear");
        assert_eq!(Status::GameOver.to_string(), "GameOver");
        assert!(Status::AllClear.is_terminal());
        assert!(!Status::Playing.is_terminal());
    }
}
