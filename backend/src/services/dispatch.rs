//! Dispatch planning
//!
//! Driver/vehicle assignment is a side effect of fulfillment with no
//! bearing on inventory correctness, so it sits behind a small trait.

use std::sync::atomic::{AtomicUsize, Ordering};

use shared::{DispatchAssignment, Order};

/// Pluggable driver/vehicle assignment
pub trait DispatchPlanner: Send + Sync {
    fn assign(&self, order: &Order) -> DispatchAssignment;
}

/// Deterministic round-robin over a fixed fleet
pub struct RoundRobinDispatcher {
    fleet: Vec<(String, String)>,
    next: AtomicUsize,
}

impl RoundRobinDispatcher {
    pub fn new() -> Self {
        Self::with_fleet(vec![
            ("Arun".to_string(), "TRK-101".to_string()),
            ("Kavi".to_string(), "TRK-102".to_string()),
            ("Meena".to_string(), "TRK-103".to_string()),
        ])
    }

    pub fn with_fleet(fleet: Vec<(String, String)>) -> Self {
        Self {
            fleet,
            next: AtomicUsize::new(0),
        }
    }
}

impl Default for RoundRobinDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchPlanner for RoundRobinDispatcher {
    fn assign(&self, _order: &Order) -> DispatchAssignment {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.fleet.len();
        let (driver, vehicle) = &self.fleet[index];
        DispatchAssignment {
            driver: driver.clone(),
            vehicle: vehicle.clone(),
        }
    }
}
