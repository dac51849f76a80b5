//! Risk management module
//!
//! Inventory tracking and the halt/resume gate guarding new quotes

mod gate;
mod inventory;

pub use gate::{GateState, GateTransition, RiskGate};
pub use inventory::InventoryTracker;
