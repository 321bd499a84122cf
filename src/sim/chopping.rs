//! Chopping station minigame
//!
//! One round per ingredient: pull it from the prep queue, take the required
//! number of cuts, plate it into the active order, wait a beat, repeat.
//! Leaving mid-round throws the ingredient away.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::delay::Delay;
use super::item::ItemHandle;
use super::orders::OrderSubmitter;
use super::session::SessionController;
use super::signal::Signal;
use crate::consts::*;
use crate::error::VisualError;

/// Pending ingredients waiting for the station, oldest first
pub trait PrepSource {
    fn try_dequeue(&mut self) -> Option<ItemHandle>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Where prepared ingredients sit before they are chopped
pub trait StagingArea {
    /// Remove one unit of `item`. False if none was there.
    fn consume_one(&mut self, item: &ItemHandle) -> bool;
}

/// Fire-and-forget visuals. Errors are logged by the caller, never propagated.
pub trait VisualSink {
    fn show_placeholder(&mut self, item: &ItemHandle) -> Result<(), VisualError>;
    fn show_sliced(&mut self, item: &ItemHandle, stay_seconds: f32) -> Result<(), VisualError>;
    fn discard_placeholder(&mut self);
}

/// Free movement of the player character
pub trait PlayerControl {
    fn set_movement_enabled(&mut self, enabled: bool);
}

/// Everything the station talks to during one call
pub struct ChopContext<'a> {
    pub session: &'a mut SessionController,
    pub orders: &'a mut dyn OrderSubmitter,
    pub queue: &'a mut dyn PrepSource,
    pub staging: &'a mut dyn StagingArea,
    pub visuals: &'a mut dyn VisualSink,
    pub player: &'a mut dyn PlayerControl,
}

/// Station timing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChopSettings {
    /// Pause between plating and loading the next ingredient
    pub next_delay_seconds: f32,
    /// How long the sliced visual lingers
    pub sliced_stay_seconds: f32,
}

impl Default for ChopSettings {
    fn default() -> Self {
        Self {
            next_delay_seconds: NEXT_DELAY_SECONDS,
            sliced_stay_seconds: SLICED_STAY_SECONDS,
        }
    }
}

/// Edge-triggered station input for one tick
#[derive(Debug, Clone, Copy, Default)]
pub struct ChopInput {
    pub cut: bool,
    pub cancel: bool,
}

/// Per-ingredient state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoppingRound {
    pub item: Option<ItemHandle>,
    pub required_cuts: u32,
    pub current_cuts: u32,
    /// Set once an ingredient is drawn, even if staging had none to remove
    pub consumed_this_round: bool,
    pub waiting_for_item: bool,
    pub transitioning: bool,
}

impl ChoppingRound {
    /// Abandoning now would waste the ingredient
    pub fn is_waste_liable(&self) -> bool {
        !self.transitioning
            && self.consumed_this_round
            && self.item.is_some()
            && self.current_cuts < self.required_cuts
    }
}

/// Per-cut progress readout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutProgress {
    pub current_cuts: u32,
    pub required_cuts: u32,
}

/// What the station is showing
#[derive(Debug, Clone, PartialEq)]
pub enum ChopStatus {
    Closed,
    /// Open but the prep queue is empty
    Waiting,
    Cutting {
        item: ItemHandle,
        current_cuts: u32,
        required_cuts: u32,
    },
    /// Last ingredient counted toward the order
    Plated,
    /// Last ingredient did not match the order
    Mismatch,
}

impl ChopStatus {
    pub fn title(&self) -> String {
        match self {
            ChopStatus::Closed => String::new(),
            ChopStatus::Waiting => "Chop: (no items)".to_string(),
            ChopStatus::Cutting { item, .. } => format!("Chop: {}", item.display_name()),
            ChopStatus::Plated | ChopStatus::Mismatch => "Chop".to_string(),
        }
    }
}

impl fmt::Display for ChopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChopStatus::Closed => Ok(()),
            ChopStatus::Waiting => write!(f, "Waiting for ingredients... (Esc to exit)"),
            ChopStatus::Cutting {
                current_cuts,
                required_cuts,
                ..
            } => write!(f, "Cuts: {}/{}", current_cuts, required_cuts),
            ChopStatus::Plated => write!(f, "Plated!"),
            ChopStatus::Mismatch => write!(f, "Not matching current order"),
        }
    }
}

/// The chopping station
#[derive(Debug)]
pub struct ChoppingFlow {
    settings: ChopSettings,
    open: bool,
    round: ChoppingRound,
    pending_next: Delay,
    status: ChopStatus,
    /// Fired after every cut and when a new ingredient loads
    pub on_progress: Signal<CutProgress>,
}

impl Default for ChoppingFlow {
    fn default() -> Self {
        Self::new(ChopSettings::default())
    }
}

impl ChoppingFlow {
    pub fn new(settings: ChopSettings) -> Self {
        Self {
            settings,
            open: false,
            round: ChoppingRound::default(),
            pending_next: Delay::new(),
            status: ChopStatus::Closed,
            on_progress: Signal::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn round(&self) -> &ChoppingRound {
        &self.round
    }

    pub fn status(&self) -> &ChopStatus {
        &self.status
    }

    /// True while the post-plating pause is running
    pub fn is_delay_pending(&self) -> bool {
        self.pending_next.is_pending()
    }

    pub fn open(&mut self, ctx: &mut ChopContext<'_>) {
        if self.open {
            return;
        }
        self.open = true;

        ctx.session.enter_chopping();
        ctx.player.set_movement_enabled(false);

        self.next_food(ctx);
    }

    pub fn close(&mut self, ctx: &mut ChopContext<'_>) {
        if !self.open {
            return;
        }

        if self.round.is_waste_liable() {
            ctx.session.add_waste(1);
            log::info!("Left the station mid-round, ingredient wasted");
        }

        self.open = false;

        ctx.session.exit_chopping_to_working();
        ctx.visuals.discard_placeholder();
        self.pending_next.cancel();
        self.round = ChoppingRound::default();
        self.status = ChopStatus::Closed;

        ctx.player.set_movement_enabled(true);
    }

    /// Advance one frame
    pub fn tick(&mut self, ctx: &mut ChopContext<'_>, input: ChopInput, dt: f32) {
        if !self.open {
            return;
        }

        if input.cancel {
            self.close(ctx);
            return;
        }

        if self.pending_next.advance(dt) {
            self.next_food(ctx);
        }

        if self.round.waiting_for_item {
            if !ctx.queue.is_empty() {
                self.round.waiting_for_item = false;
                self.next_food(ctx);
            }
            return;
        }

        if input.cut {
            self.try_cut_once(ctx);
        }
    }

    /// Load the next ingredient from the prep queue, or wait for one
    fn next_food(&mut self, ctx: &mut ChopContext<'_>) {
        ctx.visuals.discard_placeholder();
        self.round = ChoppingRound::default();

        let Some(item) = ctx.queue.try_dequeue() else {
            log::debug!("Prep queue empty, waiting");
            self.round.waiting_for_item = true;
            self.status = ChopStatus::Waiting;
            return;
        };

        let required_cuts = item.def().cuts_needed();
        let removed = ctx.staging.consume_one(&item);
        log::debug!("Dequeued {} (staging consume: {})", item, removed);

        if let Err(e) = ctx.visuals.show_placeholder(&item) {
            log::error!("No placeholder for {}: {}", item, e);
        }

        self.round = ChoppingRound {
            item: Some(item.clone()),
            required_cuts,
            current_cuts: 0,
            consumed_this_round: true,
            waiting_for_item: false,
            transitioning: false,
        };
        self.status = ChopStatus::Cutting {
            item,
            current_cuts: 0,
            required_cuts,
        };
        self.emit_progress();
    }

    fn try_cut_once(&mut self, ctx: &mut ChopContext<'_>) {
        if self.round.waiting_for_item || self.round.transitioning || self.pending_next.is_pending() {
            return;
        }
        let Some(item) = self.round.item.clone() else {
            return;
        };

        self.round.current_cuts += 1;
        self.status = ChopStatus::Cutting {
            item: item.clone(),
            current_cuts: self.round.current_cuts,
            required_cuts: self.round.required_cuts,
        };
        self.emit_progress();

        if self.round.current_cuts < self.round.required_cuts {
            return;
        }

        self.round.transitioning = true;

        ctx.visuals.discard_placeholder();
        if let Err(e) = ctx.visuals.show_sliced(&item, self.settings.sliced_stay_seconds) {
            log::warn!("No sliced output for {}: {}", item, e);
        }

        let result = ctx.orders.try_submit(&item, 1);
        if result.accepted && result.completed_order {
            ctx.session.add_completed_order(1);
            log::info!("Order completed");
        } else if !result.accepted {
            ctx.session.add_waste(1);
            log::info!("{} does not match the current order, wasted", item);
        }

        self.status = if result.accepted {
            ChopStatus::Plated
        } else {
            ChopStatus::Mismatch
        };

        self.pending_next.schedule(self.settings.next_delay_seconds);
    }

    fn emit_progress(&mut self) {
        let progress = CutProgress {
            current_cuts: self.round.current_cuts,
            required_cuts: self.round.required_cuts,
        };
        self.on_progress.emit(&progress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kitchen::{HeadlessPlayer, HeadlessVisuals, PrepQueue, PrepSurface};
    use crate::sim::ItemDef;
    use crate::sim::orders::Submission;
    use crate::sim::session::{PayRates, WorkState};

    /// Submitter with a scripted answer, standing in for the order generator
    struct ScriptedOrders {
        answer: Submission,
        calls: Vec<(String, i32)>,
    }

    impl OrderSubmitter for ScriptedOrders {
        fn try_submit(&mut self, item: &ItemHandle, amount: i32) -> Submission {
            self.calls.push((item.key().to_string(), amount));
            self.answer
        }
    }

    struct Station {
        flow: ChoppingFlow,
        session: SessionController,
        orders: ScriptedOrders,
        queue: PrepQueue,
        staging: PrepSurface,
        visuals: HeadlessVisuals,
        player: HeadlessPlayer,
    }

    impl Station {
        fn new(answer: Submission) -> Self {
            let mut session = SessionController::new(PayRates::default());
            session.enter_chopping();
            session.exit_chopping_to_working();
            Self {
                flow: ChoppingFlow::new(ChopSettings {
                    next_delay_seconds: 0.35,
                    sliced_stay_seconds: 0.6,
                }),
                session,
                orders: ScriptedOrders {
                    answer,
                    calls: Vec::new(),
                },
                queue: PrepQueue::new(),
                staging: PrepSurface::new(),
                visuals: HeadlessVisuals::default(),
                player: HeadlessPlayer::default(),
            }
        }

        fn run(&mut self, input: ChopInput, dt: f32) {
            let mut ctx = ChopContext {
                session: &mut self.session,
                orders: &mut self.orders,
                queue: &mut self.queue,
                staging: &mut self.staging,
                visuals: &mut self.visuals,
                player: &mut self.player,
            };
            self.flow.tick(&mut ctx, input, dt);
        }

        fn open(&mut self) {
            let mut ctx = ChopContext {
                session: &mut self.session,
                orders: &mut self.orders,
                queue: &mut self.queue,
                staging: &mut self.staging,
                visuals: &mut self.visuals,
                player: &mut self.player,
            };
            self.flow.open(&mut ctx);
        }

        fn cut(&mut self) {
            self.run(
                ChopInput {
                    cut: true,
                    cancel: false,
                },
                0.0,
            );
        }

        fn cancel(&mut self) {
            self.run(
                ChopInput {
                    cut: false,
                    cancel: true,
                },
                0.0,
            );
        }
    }

    const COMPLETED: Submission = Submission {
        accepted: true,
        completed_order: true,
    };
    const PARTIAL: Submission = Submission {
        accepted: true,
        completed_order: false,
    };

    fn onion() -> ItemHandle {
        ItemDef::new("onion", "Onion", 3).into_handle()
    }

    #[test]
    fn test_open_without_items_waits() {
        let mut station = Station::new(COMPLETED);
        station.open();

        assert!(station.flow.is_open());
        assert!(station.flow.round().waiting_for_item);
        assert_eq!(station.flow.status(), &ChopStatus::Waiting);
        assert_eq!(station.session.state(), WorkState::Chopping);
        assert!(!station.player.movement_enabled);

        // Cuts are ignored while waiting
        station.cut();
        assert_eq!(station.flow.round().current_cuts, 0);
    }

    #[test]
    fn test_waiting_picks_up_new_item() {
        let mut station = Station::new(COMPLETED);
        station.open();
        station.queue.enqueue(onion());

        station.run(ChopInput::default(), 0.016);
        let round = station.flow.round();
        assert!(!round.waiting_for_item);
        assert_eq!(round.required_cuts, 3);
        assert!(round.consumed_this_round);
    }

    #[test]
    fn test_open_twice_is_noop() {
        let mut station = Station::new(COMPLETED);
        station.queue.enqueue(onion());
        station.queue.enqueue(onion());
        station.open();
        station.open();
        assert_eq!(station.queue.len(), 1);
    }

    #[test]
    fn test_cuts_then_completed_order() {
        let mut station = Station::new(COMPLETED);
        let item = onion();
        station.staging.place(item.clone());
        station.queue.enqueue(item);
        station.open();
        assert_eq!(station.staging.len(), 0);

        station.cut();
        station.cut();
        assert!(station.orders.calls.is_empty());

        station.cut();
        assert_eq!(station.orders.calls, vec![("onion".to_string(), 1)]);
        assert_eq!(station.session.completed_orders(), 1);
        assert_eq!(station.session.wasted_ingredients(), 0);
        assert!(station.flow.round().transitioning);
        assert_eq!(station.flow.status(), &ChopStatus::Plated);
        assert_eq!(station.visuals.sliced(), ["onion".to_string()]);
        assert!(station.visuals.placeholder().is_none());

        // No cuts while the delay is pending
        station.cut();
        assert_eq!(station.flow.round().current_cuts, 3);
        assert_eq!(station.orders.calls.len(), 1);
    }

    #[test]
    fn test_mismatch_is_waste() {
        let mut station = Station::new(Submission::REJECTED);
        station.queue.enqueue(ItemDef::new("leek", "Leek", 1).into_handle());
        station.open();
        station.cut();

        assert_eq!(station.session.wasted_ingredients(), 1);
        assert_eq!(station.session.completed_orders(), 0);
        assert_eq!(station.flow.status(), &ChopStatus::Mismatch);
    }

    #[test]
    fn test_partial_acceptance_scores_nothing() {
        let mut station = Station::new(PARTIAL);
        station.queue.enqueue(ItemDef::new("leek", "Leek", 1).into_handle());
        station.open();
        station.cut();

        assert_eq!(station.session.wasted_ingredients(), 0);
        assert_eq!(station.session.completed_orders(), 0);
    }

    #[test]
    fn test_delay_loads_next_item() {
        let mut station = Station::new(COMPLETED);
        station.queue.enqueue(ItemDef::new("leek", "Leek", 1).into_handle());
        station.queue.enqueue(onion());
        station.open();
        station.cut();
        assert!(station.flow.is_delay_pending());

        station.run(ChopInput::default(), 0.2);
        assert!(station.flow.round().transitioning);

        station.run(ChopInput::default(), 0.2);
        assert!(!station.flow.is_delay_pending());
        let round = station.flow.round();
        assert_eq!(round.item.as_ref().map(|i| i.key()), Some("onion"));
        assert_eq!(round.current_cuts, 0);
        assert!(!round.transitioning);
    }

    #[test]
    fn test_abandon_mid_round_wastes_once() {
        let mut station = Station::new(COMPLETED);
        station.queue.enqueue(onion());
        station.open();
        station.cut();
        station.cancel();

        assert_eq!(station.session.wasted_ingredients(), 1);
        assert!(!station.flow.is_open());
        assert_eq!(station.flow.round(), &ChoppingRound::default());
        assert_eq!(station.session.state(), WorkState::Working);
        assert!(station.player.movement_enabled);

        // Next visit starts clean: waiting, then leaving again costs nothing
        station.open();
        station.cancel();
        assert_eq!(station.session.wasted_ingredients(), 1);
    }

    #[test]
    fn test_waste_even_when_staging_had_nothing() {
        let mut station = Station::new(COMPLETED);
        station.queue.enqueue(onion());
        station.open();
        station.cancel();
        assert_eq!(station.session.wasted_ingredients(), 1);
    }

    #[test]
    fn test_close_during_delay_cancels_continuation() {
        let mut station = Station::new(COMPLETED);
        station.queue.enqueue(ItemDef::new("leek", "Leek", 1).into_handle());
        station.queue.enqueue(onion());
        station.open();
        station.cut();
        station.cancel();

        assert_eq!(station.session.wasted_ingredients(), 0);
        assert!(!station.flow.is_delay_pending());

        // The stale continuation must not dequeue anything
        station.run(ChopInput::default(), 1.0);
        assert_eq!(station.queue.len(), 1);
        assert!(station.flow.round().item.is_none());
    }

    #[test]
    fn test_close_when_closed_is_noop() {
        let mut station = Station::new(COMPLETED);
        station.cancel();
        assert_eq!(station.session.state(), WorkState::Working);
        assert!(station.player.movement_enabled);
    }

    #[test]
    fn test_missing_visual_does_not_block_round() {
        let mut station = Station::new(COMPLETED);
        station.visuals.mark_missing("leek");
        station.queue.enqueue(ItemDef::new("leek", "Leek", 1).into_handle());
        station.open();
        station.cut();
        assert_eq!(station.session.completed_orders(), 1);
    }

    #[test]
    fn test_progress_readout() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut station = Station::new(COMPLETED);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        station
            .flow
            .on_progress
            .subscribe(move |p| s.borrow_mut().push((p.current_cuts, p.required_cuts)));

        station.queue.enqueue(onion());
        station.open();
        station.cut();
        assert_eq!(*seen.borrow(), vec![(0, 3), (1, 3)]);
        assert_eq!(station.flow.status().to_string(), "Cuts: 1/3");
        assert_eq!(station.flow.status().title(), "Chop: Onion");
    }
}
