//! Horizontal scroll state of the card row
//!
//! `target` jumps by whole scroll steps; `offset` is what gets drawn and
//! eases toward the target a few columns per UI tick.

/// Number of ticks an eased scroll takes to settle
const EASE_TICKS: u16 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardScroll {
    offset: u16,
    target: u16,
    delta: u16,
}

impl CardScroll {
    pub fn new(delta: u16) -> Self {
        Self {
            offset: 0,
            target: 0,
            delta: delta.max(1),
        }
    }

    /// Column offset to draw at
    pub fn offset(&self) -> u16 {
        self.offset
    }

    /// Column offset the row is easing toward
    pub fn target(&self) -> u16 {
        self.target
    }

    pub fn delta(&self) -> u16 {
        self.delta
    }

    pub fn is_settled(&self) -> bool {
        self.offset == self.target
    }

    /// Moves the target back by one step
    pub fn back(&mut self) {
        self.target = self.target.saturating_sub(self.delta);
    }

    /// Moves the target forward by one step, never past `max_offset`
    pub fn forward(&mut self, max_offset: u16) {
        self.target = self.target.saturating_add(self.delta).min(max_offset);
    }

    /// Sets the target directly, clamped to `max_offset`
    pub fn scroll_to(&mut self, target: u16, max_offset: u16) {
        self.target = target.min(max_offset);
    }

    /// Clamps both positions after the content shrank
    pub fn clamp(&mut self, max_offset: u16) {
        self.target = self.target.min(max_offset);
        self.offset = self.offset.min(max_offset);
    }

    pub fn reset(&mut self) {
        self.offset = 0;
        self.target = 0;
    }

    /// Advances the eased offset one tick; returns whether it moved
    pub fn tick(&mut self) -> bool {
        if self.is_settled() {
            return false;
        }
        let step = (self.delta / EASE_TICKS).max(1);
        if self.offset < self.target {
            self.offset = (self.offset + step).min(self.target);
        } else {
            self.offset = self.offset.saturating_sub(step).max(self.target);
        }
        true
    }
}
