//! Work session state machine and pay ledger
//!
//! The session controller is the single writer of the work state and the
//! pay ledger. Everyone else reads through its accessors or listens to its
//! signals.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::orders::OrderGenerator;
use super::signal::Signal;
use crate::consts::*;
use crate::settlement::Settlement;

/// What the player is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorkState {
    /// Off shift
    #[default]
    Idle,
    /// On shift, orders are running
    Working,
    /// At the chopping station (orders keep running)
    Chopping,
}

impl fmt::Display for WorkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkState::Idle => write!(f, "Idle"),
            WorkState::Working => write!(f, "Working"),
            WorkState::Chopping => write!(f, "Chopping"),
        }
    }
}

/// A real state transition, delivered to state listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub previous: WorkState,
    pub next: WorkState,
}

/// Pay constants for a shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayRates {
    pub base_pay: i64,
    pub pay_per_order: i64,
    pub penalty_per_waste: i64,
}

impl Default for PayRates {
    fn default() -> Self {
        Self {
            base_pay: BASE_PAY,
            pay_per_order: PAY_PER_ORDER,
            penalty_per_waste: PENALTY_PER_WASTE,
        }
    }
}

/// Read-only view of the ledger after a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaySnapshot {
    pub completed_orders: u32,
    pub wasted_ingredients: u32,
    pub total_pay: i64,
}

/// Completed / wasted counters and the pay derived from them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayLedger {
    pub rates: PayRates,
    pub completed_orders: u32,
    pub wasted_ingredients: u32,
}

impl PayLedger {
    pub fn new(rates: PayRates) -> Self {
        Self {
            rates,
            completed_orders: 0,
            wasted_ingredients: 0,
        }
    }

    /// Base pay plus order bonus minus waste penalty. Not floored.
    pub fn total_pay(&self) -> i64 {
        let earned = (self.completed_orders as i64).saturating_mul(self.rates.pay_per_order);
        let lost = (self.wasted_ingredients as i64).saturating_mul(self.rates.penalty_per_waste);
        self.rates.base_pay.saturating_add(earned).saturating_sub(lost)
    }

    pub fn reset(&mut self) {
        self.completed_orders = 0;
        self.wasted_ingredients = 0;
    }

    pub fn snapshot(&self) -> PaySnapshot {
        PaySnapshot {
            completed_orders: self.completed_orders,
            wasted_ingredients: self.wasted_ingredients,
            total_pay: self.total_pay(),
        }
    }
}

/// Owns the work state, the modal UI gate and the pay ledger
#[derive(Debug, Default)]
pub struct SessionController {
    state: WorkState,
    modal_ui_open: bool,
    ledger: PayLedger,
    /// Fired on every real state transition
    pub on_state_changed: Signal<StateChange>,
    /// Fired when the modal gate flips
    pub on_modal_ui_changed: Signal<bool>,
    /// Fired after every ledger change, including resets
    pub on_pay_changed: Signal<PaySnapshot>,
    /// Fired when a shift ends, with the finalized ledger
    pub on_settlement: Signal<Settlement>,
}

impl SessionController {
    pub fn new(rates: PayRates) -> Self {
        Self {
            state: WorkState::Idle,
            modal_ui_open: false,
            ledger: PayLedger::new(rates),
            on_state_changed: Signal::new(),
            on_modal_ui_changed: Signal::new(),
            on_pay_changed: Signal::new(),
            on_settlement: Signal::new(),
        }
    }

    pub fn state(&self) -> WorkState {
        self.state
    }

    pub fn ledger(&self) -> &PayLedger {
        &self.ledger
    }

    pub fn completed_orders(&self) -> u32 {
        self.ledger.completed_orders
    }

    pub fn wasted_ingredients(&self) -> u32 {
        self.ledger.wasted_ingredients
    }

    pub fn total_pay(&self) -> i64 {
        self.ledger.total_pay()
    }

    pub fn has_modal_ui_open(&self) -> bool {
        self.modal_ui_open
    }

    // === State transitions ===

    /// Reset pay, go to Working from any state and start handing out orders
    pub fn start_work(&mut self, orders: &mut OrderGenerator) {
        self.reset_pay();
        self.set_state(WorkState::Working);
        orders.begin_working();
        log::info!("Shift started");
    }

    /// Go Idle, stop the order stream and publish the settlement
    pub fn stop_work(&mut self, orders: &mut OrderGenerator) -> Settlement {
        self.set_state(WorkState::Idle);
        orders.end_working();

        let settlement = Settlement::from_ledger(&self.ledger);
        log::info!(
            "Shift ended: {} orders, {} wasted, pay {}",
            settlement.completed_orders,
            settlement.wasted_ingredients,
            settlement.total_pay
        );
        self.on_settlement.emit(&settlement);
        settlement
    }

    pub fn enter_chopping(&mut self) {
        self.set_state(WorkState::Chopping);
    }

    pub fn exit_chopping_to_working(&mut self) {
        self.set_state(WorkState::Working);
    }

    fn set_state(&mut self, next: WorkState) {
        if self.state == next {
            return;
        }

        let previous = self.state;
        self.state = next;
        log::debug!("Work state {} -> {}", previous, next);

        self.on_state_changed.emit(&StateChange { previous, next });
    }

    // === Modal UI gate ===
    // A single flag, not a counter: one exit clears it for every opener.

    pub fn enter_modal_ui(&mut self) {
        self.set_modal_ui(true);
    }

    pub fn exit_modal_ui(&mut self) {
        self.set_modal_ui(false);
    }

    fn set_modal_ui(&mut self, open: bool) {
        if self.modal_ui_open == open {
            return;
        }

        self.modal_ui_open = open;
        self.on_modal_ui_changed.emit(&open);
    }

    // === Pay ===

    pub fn reset_pay(&mut self) {
        self.ledger.reset();
        self.notify_pay();
    }

    pub fn add_completed_order(&mut self, count: i32) {
        self.ledger.completed_orders = self
            .ledger
            .completed_orders
            .saturating_add(count.max(0) as u32);
        self.notify_pay();
    }

    pub fn add_waste(&mut self, count: i32) {
        self.ledger.wasted_ingredients = self
            .ledger
            .wasted_ingredients
            .saturating_add(count.max(0) as u32);
        self.notify_pay();
    }

    fn notify_pay(&mut self) {
        let snapshot = self.ledger.snapshot();
        self.on_pay_changed.emit(&snapshot);
    }
}
