use serde::Serialize;

use crate::session::Status;
use crate::target::Position;

/// How a visible target should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum TargetPhase {
    Pending,
    Fading { opacity: f64, remaining_secs: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetView {
    pub order: u32,
    pub position: Position,
    #[serde(flatten)]
    pub phase: TargetPhase,
}

impl TargetView {
    pub fn is_pending(&self) -> bool {
        matches!(self.phase, TargetPhase::Pending)
    }

    pub fn opacity(&self) -> f64 {
        match self.phase {
            TargetPhase::Pending => 1.0,
            TargetPhase::Fading { opacity, .. } => opacity,
        }
    }
}

/// Everything the presentation layer is allowed to read.
///
/// Expired targets are left out; `targets` is sorted by ascending order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub status: Status,
    pub targets: Vec<TargetView>,
    pub total_targets: u32,
    pub expected_order: u32,
    pub elapsed_secs: f64,
    pub autoplay_enabled: bool,
    pub pending_confirmation: bool,
    pub board_size: u32,
    pub target_size: u32,
}

impl Snapshot {
    pub fn target(&self, order: u32) -> Option<&TargetView> {
        self.targets.iter().find(|t| t.order == order)
    }

    pub fn pending_orders(&self) -> Vec<u32> {
        self.targets
            .iter()
            .filter(|t| t.is_pending())
            .map(|t| t.order)
            .collect()
    }
}
