//! Order generation, countdown and submission
//!
//! The generator owns the single active order. It is the only component
//! that decides whether a plated ingredient counts toward that order.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::item::ItemHandle;
use super::session::SessionController;
use super::signal::Signal;
use crate::consts::*;

/// Order tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderSettings {
    /// Smallest quantity an order may ask for
    pub min_count: i32,
    /// Largest quantity an order may ask for
    pub max_count: i32,
    /// Seconds allowed per order
    pub time_limit: f32,
    /// Waste units charged when an order runs out of time
    pub timeout_penalty: i32,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            min_count: ORDER_MIN_COUNT,
            max_count: ORDER_MAX_COUNT,
            time_limit: ORDER_TIME_LIMIT,
            timeout_penalty: ORDER_TIMEOUT_PENALTY,
        }
    }
}

impl OrderSettings {
    /// Copy with bounds fixed up: `1 <= min <= max`, limit >= 1s, penalty >= 0
    pub fn normalized(&self) -> Self {
        let min_count = self.min_count.max(1);
        Self {
            min_count,
            max_count: self.max_count.max(min_count),
            time_limit: if self.time_limit.is_finite() {
                self.time_limit.max(1.0)
            } else {
                ORDER_TIME_LIMIT
            },
            timeout_penalty: self.timeout_penalty.max(0),
        }
    }
}

/// The active requirement: N units of one item before the clock runs out
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub item: ItemHandle,
    pub needed_count: u32,
    pub time_left: f32,
    pub time_limit: f32,
}

impl Order {
    /// Fraction of time remaining, 1.0 = fresh
    pub fn time_fraction(&self) -> f32 {
        if self.time_limit <= 0.0 {
            0.0
        } else {
            (self.time_left / self.time_limit).clamp(0.0, 1.0)
        }
    }
}

/// Order board feed
#[derive(Debug, Clone, PartialEq)]
pub enum BoardUpdate {
    /// Show (or refresh) the active order
    Show { item: ItemHandle, needed_count: u32 },
    /// No order
    Clear,
    /// Countdown changed
    Timer { time_left: f32, time_limit: f32 },
}

/// Outcome of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Submission {
    /// The item matched the active order and was counted
    pub accepted: bool,
    /// The submission finished the order
    pub completed_order: bool,
}

impl Submission {
    pub const REJECTED: Self = Self {
        accepted: false,
        completed_order: false,
    };
}

/// Narrow interface the chopping station plates into
pub trait OrderSubmitter {
    /// Offer `amount` units of `item`. Rejection never mutates anything.
    fn try_submit(&mut self, item: &ItemHandle, amount: i32) -> Submission;
}

/// Produces randomized orders and tracks the active one
#[derive(Debug)]
pub struct OrderGenerator {
    pool: Vec<ItemHandle>,
    settings: OrderSettings,
    rng: Pcg32,
    active: bool,
    current: Option<Order>,
    timeouts: u32,
    /// Order board feed (show / clear / timer)
    pub on_board: Signal<BoardUpdate>,
}

impl OrderGenerator {
    pub fn new(pool: Vec<ItemHandle>, settings: OrderSettings, seed: u64) -> Self {
        let normalized = settings.normalized();
        if normalized != settings {
            log::warn!("Order settings corrected: {:?} -> {:?}", settings, normalized);
        }

        Self {
            pool,
            settings: normalized,
            rng: Pcg32::seed_from_u64(seed),
            active: false,
            current: None,
            timeouts: 0,
            on_board: Signal::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current(&self) -> Option<&Order> {
        self.current.as_ref()
    }

    pub fn settings(&self) -> &OrderSettings {
        &self.settings
    }

    pub fn pool(&self) -> &[ItemHandle] {
        &self.pool
    }

    /// Orders lost to the clock since construction
    pub fn timeouts(&self) -> u32 {
        self.timeouts
    }

    /// Activate. Keeps an unfinished order (and its clock) if there is one.
    pub fn begin_working(&mut self) {
        self.active = true;

        let resumed = self
            .current
            .as_ref()
            .filter(|order| order.needed_count > 0)
            .map(|order| (order.item.clone(), order.needed_count, order.time_left, order.time_limit));

        match resumed {
            Some((item, needed_count, time_left, time_limit)) => {
                self.on_board.emit(&BoardUpdate::Show { item, needed_count });
                self.on_board.emit(&BoardUpdate::Timer {
                    time_left,
                    time_limit,
                });
            }
            None => self.generate_next_order(),
        }
    }

    /// Deactivate and drop the current order without penalty
    pub fn end_working(&mut self) {
        self.active = false;
        self.clear_order();
    }

    /// Replace the current order with a fresh random one
    pub fn generate_next_order(&mut self) {
        if !self.active {
            return;
        }

        if self.pool.is_empty() {
            log::error!("Order pool is empty, no order generated");
            self.clear_order();
            return;
        }

        let OrderSettings {
            min_count,
            max_count,
            time_limit,
            ..
        } = self.settings;

        let item = self.pool[self.rng.random_range(0..self.pool.len())].clone();
        let needed_count = self.rng.random_range(min_count..=max_count) as u32;

        log::debug!("New order: {} x{}", item, needed_count);
        self.current = Some(Order {
            item: item.clone(),
            needed_count,
            time_left: time_limit,
            time_limit,
        });

        self.on_board.emit(&BoardUpdate::Show { item, needed_count });
        self.on_board.emit(&BoardUpdate::Timer {
            time_left: time_limit,
            time_limit,
        });
    }

    /// Run the countdown. A timeout charges waste and rolls a new order at once.
    pub fn tick(&mut self, elapsed: f32, session: &mut SessionController) {
        if !self.active {
            return;
        }
        let Some(order) = self.current.as_mut() else {
            return;
        };

        order.time_left = (order.time_left - elapsed.max(0.0)).max(0.0);
        let (time_left, time_limit) = (order.time_left, order.time_limit);

        self.on_board.emit(&BoardUpdate::Timer {
            time_left,
            time_limit,
        });

        if time_left <= 0.0 {
            self.on_timeout(session);
        }
    }

    fn on_timeout(&mut self, session: &mut SessionController) {
        self.timeouts += 1;
        log::info!("Order timed out");

        if self.settings.timeout_penalty > 0 {
            session.add_waste(self.settings.timeout_penalty);
        }

        self.generate_next_order();
    }

    fn clear_order(&mut self) {
        self.current = None;
        self.on_board.emit(&BoardUpdate::Clear);
    }
}

impl OrderSubmitter for OrderGenerator {
    fn try_submit(&mut self, item: &ItemHandle, amount: i32) -> Submission {
        if !self.active {
            return Submission::REJECTED;
        }
        let Some(order) = self.current.as_mut() else {
            return Submission::REJECTED;
        };
        if !order.item.same_as(item) {
            return Submission::REJECTED;
        }

        let amount = amount.max(1) as u32;
        order.needed_count = order.needed_count.saturating_sub(amount);

        if order.needed_count == 0 {
            log::info!("Order for {} completed", item);
            self.generate_next_order();
            return Submission {
                accepted: true,
                completed_order: true,
            };
        }

        let needed_count = order.needed_count;
        let (time_left, time_limit) = (order.time_left, order.time_limit);
        self.on_board.emit(&BoardUpdate::Show {
            item: item.clone(),
            needed_count,
        });
        self.on_board.emit(&BoardUpdate::Timer {
            time_left,
            time_limit,
        });

        Submission {
            accepted: true,
            completed_order: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ItemDef;
    use crate::sim::session::PayRates;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn pool() -> Vec<ItemHandle> {
        vec![
            ItemDef::new("tomato", "Tomato", 2).into_handle(),
            ItemDef::new("onion", "Onion", 3).into_handle(),
            ItemDef::new("carrot", "Carrot", 4).into_handle(),
        ]
    }

    fn active_generator(settings: OrderSettings, seed: u64) -> OrderGenerator {
        let mut orders = OrderGenerator::new(pool(), settings, seed);
        orders.begin_working();
        orders
    }

    fn other_item(orders: &OrderGenerator) -> ItemHandle {
        let current = &orders.current().unwrap().item;
        orders
            .pool()
            .iter()
            .find(|i| !i.same_as(current))
            .unwrap()
            .clone()
    }

    #[test]
    fn test_inactive_generator_rejects_and_does_not_generate() {
        let mut orders = OrderGenerator::new(pool(), OrderSettings::default(), 1);
        orders.generate_next_order();
        assert!(orders.current().is_none());

        let item = orders.pool()[0].clone();
        assert_eq!(orders.try_submit(&item, 1), Submission::REJECTED);
    }

    #[test]
    fn test_mismatch_leaves_order_untouched() {
        let mut orders = active_generator(OrderSettings::default(), 3);
        let mut session = SessionController::new(PayRates::default());
        orders.tick(2.0, &mut session);
        let before = orders.current().unwrap().clone();

        let wrong = other_item(&orders);
        assert_eq!(orders.try_submit(&wrong, 1), Submission::REJECTED);
        assert_eq!(orders.current().unwrap(), &before);
    }

    #[test]
    fn test_partial_then_complete() {
        let settings = OrderSettings {
            min_count: 3,
            max_count: 3,
            ..Default::default()
        };
        let mut orders = active_generator(settings, 11);
        let item = orders.current().unwrap().item.clone();

        let partial = Submission {
            accepted: true,
            completed_order: false,
        };
        assert_eq!(orders.try_submit(&item, 1), partial);
        assert_eq!(orders.current().unwrap().needed_count, 2);
        assert_eq!(orders.try_submit(&item, 1), partial);
        assert_eq!(orders.current().unwrap().needed_count, 1);

        let done = orders.try_submit(&item, 1);
        assert_eq!(
            done,
            Submission {
                accepted: true,
                completed_order: true
            }
        );
        let next = orders.current().unwrap();
        assert_eq!(next.needed_count, 3);
        assert_eq!(next.time_left, next.time_limit);
    }

    #[test]
    fn test_submit_amount_is_at_least_one() {
        let settings = OrderSettings {
            min_count: 2,
            max_count: 2,
            ..Default::default()
        };
        let mut orders = active_generator(settings, 5);
        let item = orders.current().unwrap().item.clone();

        let result = orders.try_submit(&item, 0);
        assert!(result.accepted);
        assert_eq!(orders.current().unwrap().needed_count, 1);
    }

    #[test]
    fn test_oversized_submission_completes() {
        let settings = OrderSettings {
            min_count: 2,
            max_count: 2,
            ..Default::default()
        };
        let mut orders = active_generator(settings, 5);
        let item = orders.current().unwrap().item.clone();
        assert!(orders.try_submit(&item, 10).completed_order);
    }

    #[test]
    fn test_timeout_charges_penalty_once_and_regenerates() {
        let settings = OrderSettings {
            time_limit: 2.0,
            timeout_penalty: 5,
            ..Default::default()
        };
        let mut orders = active_generator(settings, 9);
        let mut session = SessionController::new(PayRates::default());

        orders.tick(1.5, &mut session);
        assert_eq!(session.wasted_ingredients(), 0);

        orders.tick(1.0, &mut session);
        assert_eq!(session.wasted_ingredients(), 5);
        assert_eq!(orders.timeouts(), 1);

        let fresh = orders.current().unwrap();
        assert_eq!(fresh.time_left, 2.0);

        orders.tick(0.5, &mut session);
        assert_eq!(session.wasted_ingredients(), 5);
    }

    #[test]
    fn test_zero_penalty_timeout_adds_no_waste() {
        let settings = OrderSettings {
            time_limit: 1.0,
            timeout_penalty: 0,
            ..Default::default()
        };
        let mut orders = active_generator(settings, 9);
        let mut session = SessionController::new(PayRates::default());
        orders.tick(3.0, &mut session);
        assert_eq!(session.wasted_ingredients(), 0);
        assert_eq!(orders.timeouts(), 1);
    }

    #[test]
    fn test_resume_keeps_order_and_clock() {
        let mut orders = active_generator(OrderSettings::default(), 21);
        let mut session = SessionController::new(PayRates::default());
        orders.tick(4.0, &mut session);
        let before = orders.current().unwrap().clone();

        orders.begin_working();
        assert_eq!(orders.current().unwrap(), &before);
    }

    #[test]
    fn test_end_working_clears_without_penalty() {
        let mut orders = active_generator(OrderSettings::default(), 21);
        let mut session = SessionController::new(PayRates::default());
        orders.end_working();
        orders.tick(100.0, &mut session);

        assert!(orders.current().is_none());
        assert_eq!(session.wasted_ingredients(), 0);
    }

    #[test]
    fn test_empty_pool_clears_order() {
        let mut orders = OrderGenerator::new(Vec::new(), OrderSettings::default(), 1);
        let updates = Rc::new(RefCell::new(Vec::new()));
        let u = Rc::clone(&updates);
        orders
            .on_board
            .subscribe(move |update| u.borrow_mut().push(update.clone()));

        orders.begin_working();
        orders.generate_next_order();

        assert!(orders.is_active());
        assert!(orders.current().is_none());
        assert!(updates.borrow().iter().all(|u| *u == BoardUpdate::Clear));
    }

    #[test]
    fn test_settings_are_normalized() {
        let orders = OrderGenerator::new(
            pool(),
            OrderSettings {
                min_count: 6,
                max_count: 2,
                time_limit: 0.2,
                timeout_penalty: -3,
            },
            1,
        );
        let s = orders.settings();
        assert_eq!((s.min_count, s.max_count), (6, 6));
        assert_eq!(s.time_limit, 1.0);
        assert_eq!(s.timeout_penalty, 0);
    }

    #[test]
    fn test_same_seed_same_orders() {
        let items = pool();
        let mut a = OrderGenerator::new(items.clone(), OrderSettings::default(), 42);
        let mut b = OrderGenerator::new(items, OrderSettings::default(), 42);
        a.begin_working();
        b.begin_working();

        for _ in 0..20 {
            let (oa, ob) = (a.current().unwrap().clone(), b.current().unwrap().clone());
            assert_eq!(oa, ob);
            a.try_submit(&oa.item, oa.needed_count as i32);
            b.try_submit(&ob.item, ob.needed_count as i32);
        }
    }

    proptest! {
        #[test]
        fn prop_needed_count_within_bounds(
            min in -3i32..6,
            max in -3i32..10,
            seed in any::<u64>(),
        ) {
            let settings = OrderSettings { min_count: min, max_count: max, ..Default::default() };
            let bounds = settings.normalized();
            let mut orders = active_generator(settings, seed);

            for _ in 0..10 {
                let order = orders.current().unwrap().clone();
                let need = order.needed_count as i32;
                prop_assert!(bounds.min_count <= need && need <= bounds.max_count);
                orders.try_submit(&order.item, need);
            }
        }

        #[test]
        fn prop_countdown_never_increases_or_goes_negative(
            steps in proptest::collection::vec(0.0f32..0.5, 1..200),
        ) {
            let settings = OrderSettings { time_limit: 3.0, timeout_penalty: 1, ..Default::default() };
            let mut orders = active_generator(settings, 77);
            let mut session = SessionController::new(PayRates::default());

            for dt in steps {
                let before = orders.current().unwrap().time_left;
                let timeouts = orders.timeouts();
                orders.tick(dt, &mut session);
                let after = orders.current().unwrap().time_left;

                prop_assert!(after >= 0.0);
                if orders.timeouts() == timeouts {
                    prop_assert!(after <= before);
                } else {
                    prop_assert_eq!(orders.timeouts(), timeouts + 1);
                    prop_assert_eq!(session.wasted_ingredients(), orders.timeouts());
                }
            }
        }
    }
}
