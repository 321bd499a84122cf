//! End-of-shift settlement and the shift history board
//!
//! A settlement is the finalized pay ledger handed out when a shift stops.
//! The history keeps the ten best-paid shifts, persisted as JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ShiftError;
use crate::sim::{PayLedger, PayRates};

/// Maximum number of shifts to keep
pub const MAX_RECORDED_SHIFTS: usize = 10;

/// Finalized pay for one shift
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub completed_orders: u32,
    pub wasted_ingredients: u32,
    pub rates: PayRates,
    pub total_pay: i64,
}

impl Settlement {
    pub fn from_ledger(ledger: &PayLedger) -> Self {
        Self {
            completed_orders: ledger.completed_orders,
            wasted_ingredients: ledger.wasted_ingredients,
            rates: ledger.rates,
            total_pay: ledger.total_pay(),
        }
    }

    /// Pay earned from completed orders
    pub fn order_bonus(&self) -> i64 {
        self.completed_orders as i64 * self.rates.pay_per_order
    }

    /// Pay lost to waste
    pub fn waste_penalty(&self) -> i64 {
        self.wasted_ingredients as i64 * self.rates.penalty_per_waste
    }

    /// Multi-line pay slip
    pub fn summary(&self) -> String {
        format!(
            "Base pay:   {:>6}\nOrders x{:<3} {:>+6}\nWaste x{:<4} {:>+6}\nTotal:      {:>6}",
            self.rates.base_pay,
            self.completed_orders,
            self.order_bonus(),
            self.wasted_ingredients,
            -self.waste_penalty(),
            self.total_pay
        )
    }
}

/// A settled shift on the history board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftRecord {
    pub settlement: Settlement,
    /// Unix timestamp (ms) when the shift ended
    pub timestamp: f64,
}

/// Best shifts, sorted by total pay (highest first)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShiftHistory {
    pub entries: Vec<ShiftRecord>,
}

impl ShiftHistory {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Slot a pay amount would take; equal pay ranks below earlier shifts
    fn slot_for(&self, total_pay: i64) -> usize {
        self.entries
            .partition_point(|e| e.settlement.total_pay >= total_pay)
    }

    pub fn qualifies(&self, total_pay: i64) -> bool {
        self.slot_for(total_pay) < MAX_RECORDED_SHIFTS
    }

    /// 1-based rank this pay would reach, if it makes the board
    pub fn potential_rank(&self, total_pay: i64) -> Option<usize> {
        let slot = self.slot_for(total_pay);
        (slot < MAX_RECORDED_SHIFTS).then_some(slot + 1)
    }

    /// Put a settlement on the board, dropping whatever falls off the end
    pub fn record(&mut self, settlement: Settlement, timestamp: f64) -> Option<usize> {
        let rank = self.potential_rank(settlement.total_pay)?;
        self.entries.insert(
            rank - 1,
            ShiftRecord {
                settlement,
                timestamp,
            },
        );
        self.entries.truncate(MAX_RECORDED_SHIFTS);
        log::debug!("Shift recorded at #{}", rank);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best_pay(&self) -> Option<i64> {
        self.entries.first().map(|e| e.settlement.total_pay)
    }

    pub fn load_from(path: &Path) -> Result<Self, ShiftError> {
        let json = fs::read_to_string(path)?;
        let history: ShiftHistory = serde_json::from_str(&json)?;
        log::info!("Loaded {} recorded shifts", history.entries.len());
        Ok(history)
    }

    /// Load, or start fresh if the file is missing or unreadable
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(history) => history,
            Err(e) => {
                log::info!("No shift history at {} ({}), starting fresh", path.display(), e);
                Self::new()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ShiftError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Shift history saved ({} entries)", self.entries.len());
        Ok(())
    }
}
