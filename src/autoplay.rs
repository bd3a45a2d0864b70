use crate::session::Session;

/// Bot that plays the expected target on a fixed cadence.
///
/// Holds only the on/off switch; the engine owns the ticker and feeds the
/// chosen order back through the normal click path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutoPlay {
    enabled: bool,
}

impl AutoPlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Order to click on this tick, if any
    pub fn next_click(&self, session: &Session) -> Option<u32> {
        if !self.enabled || !session.is_playing() {
            return None;
        }
        session
            .targets()
            .get(session.expected_order())
            .filter(|t| t.is_pending())
            .map(|t| t.order)
    }
}
