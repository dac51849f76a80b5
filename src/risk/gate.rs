//! Inventory risk gate with hysteresis

use super::InventoryTracker;
use serde::Serialize;

/// Whether new quotes may be placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GateState {
    Active,
    Halted,
}

impl std::fmt::Display for GateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateState::Active => write!(f, "active"),
            GateState::Halted => write!(f, "halted"),
        }
    }
}

/// A state change reported by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateTransition {
    pub from: GateState,
    pub to: GateState,
    pub position: i64,
}

/// Halts quoting at `max_inventory`, resumes below `rebalance_threshold`
#[derive(Debug, Clone)]
pub struct RiskGate {
    state: GateState,
}

impl RiskGate {
    pub fn new() -> Self {
        Self {
            state: GateState::Active,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_halted(&self) -> bool {
        self.state == GateState::Halted
    }

    /// Re-check the inventory; returns the transition if one happened
    pub fn evaluate(&mut self, inventory: &InventoryTracker) -> Option<GateTransition> {
        let next = match self.state {
            GateState::Active if inventory.exceeds_max_inventory() => GateState::Halted,
            GateState::Halted if inventory.magnitude() < inventory.rebalance_threshold() => {
                GateState::Active
            }
            _ => return None,
        };

        let transition = GateTransition {
            from: self.state,
            to: next,
            position: inventory.position(),
        };
        self.state = next;

        match next {
            GateState::Halted => tracing::warn!(
                position = transition.position,
                max_inventory = inventory.max_inventory(),
                "Max inventory reached, halting quoting"
            ),
            GateState::Active => tracing::info!(
                position = transition.position,
                rebalance_threshold = inventory.rebalance_threshold(),
                "Inventory back under threshold, resuming quoting"
            ),
        }

        Some(transition)
    }
}

impl Default for RiskGate {
    fn default() -> Self {
        Self::new()
    }
}
