//! Signed inventory tracking

use crate::exchange::Fill;

/// Owns the bot's signed position in the quoted outcome
///
/// Positive means net long, negative net short. Only confirmed fills move
/// the position, apart from an explicit `reconcile` against the venue.
#[derive(Debug, Clone)]
pub struct InventoryTracker {
    position: i64,
    rebalance_threshold: u64,
    max_inventory: u64,
}

impl InventoryTracker {
    /// Create a flat tracker
    pub fn new(rebalance_threshold: u64, max_inventory: u64) -> Self {
        Self {
            position: 0,
            rebalance_threshold,
            max_inventory,
        }
    }

    /// Current signed position
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Absolute position
    pub fn magnitude(&self) -> u64 {
        self.position.unsigned_abs()
    }

    /// Apply a confirmed fill and return the new position
    pub fn apply(&mut self, fill: &Fill) -> i64 {
        let delta = fill.side.sign() * fill.size as i64;
        self.position += delta;
        tracing::debug!(
            side = %fill.side,
            size = fill.size,
            position = self.position,
            "Inventory updated"
        );
        self.position
    }

    /// Overwrite the position with the venue's view
    ///
    /// Returns the previous position when it differed.
    pub fn reconcile(&mut self, venue_position: i64) -> Option<i64> {
        if venue_position == self.position {
            return None;
        }
        let previous = self.position;
        self.position = venue_position;
        Some(previous)
    }

    pub fn exceeds_rebalance_threshold(&self) -> bool {
        self.magnitude() > self.rebalance_threshold
    }

    pub fn exceeds_max_inventory(&self) -> bool {
        self.magnitude() >= self.max_inventory
    }

    pub fn rebalance_threshold(&self) -> u64 {
        self.rebalance_threshold
    }

    pub fn max_inventory(&self) -> u64 {
        self.max_inventory
    }
}
