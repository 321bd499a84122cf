//! One kitchen shift and its frame driver
//!
//! [`Shift`] wires the session controller, order generator and chopping
//! station together with the headless kitchen. [`tick`] advances it by one
//! frame.

use std::cell::RefCell;
use std::rc::Rc;

use crate::board::OrderBoard;
use crate::error::ShiftError;
use crate::intro::StoryIntro;
use crate::kitchen::{HeadlessPlayer, HeadlessVisuals, PrepQueue, PrepSurface};
use crate::settings::ShiftSettings;
use crate::settlement::Settlement;
use crate::sim::{
    ChopContext, ChopInput, ChoppingFlow, ItemHandle, OrderGenerator, PlayerControl,
    SessionController, VisualSink, WorkState,
};

/// Input commands for a single tick (all edge-triggered)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Clock in
    pub start_work: bool,
    /// Clock out
    pub stop_work: bool,
    /// Step up to the chopping station
    pub open_station: bool,
    /// Knife down
    pub cut: bool,
    /// Leave the station
    pub cancel: bool,
    /// Click through the story intro
    pub advance_intro: bool,
}

/// Everything that lives for one shift
pub struct Shift {
    pub session: SessionController,
    pub orders: OrderGenerator,
    pub chopping: ChoppingFlow,
    pub intro: StoryIntro,
    pub queue: PrepQueue,
    pub surface: PrepSurface,
    pub visuals: Box<dyn VisualSink>,
    pub player: Box<dyn PlayerControl>,
    board: Rc<RefCell<OrderBoard>>,
    items: Vec<ItemHandle>,
    last_settlement: Option<Settlement>,
    /// Frames simulated
    pub time_ticks: u64,
}

impl Shift {
    /// Build a shift on the headless kitchen
    pub fn new(settings: &ShiftSettings) -> Self {
        Self::with_frontend(
            settings,
            Box::new(HeadlessVisuals::default()),
            Box::new(HeadlessPlayer::default()),
        )
    }

    pub fn with_frontend(
        settings: &ShiftSettings,
        visuals: Box<dyn VisualSink>,
        player: Box<dyn PlayerControl>,
    ) -> Self {
        let settings = settings.normalized();
        let items = settings.item_pool();
        if items.is_empty() {
            log::error!("Shift configured with no items, orders will not be generated");
        }

        let mut orders = OrderGenerator::new(items.clone(), settings.orders, settings.seed);
        let board = Rc::new(RefCell::new(OrderBoard::default()));
        let feed = Rc::clone(&board);
        orders
            .on_board
            .subscribe(move |update| feed.borrow_mut().apply(update));

        Self {
            session: SessionController::new(settings.pay),
            orders,
            chopping: ChoppingFlow::new(settings.chopping),
            intro: StoryIntro::new(settings.intro_pages),
            queue: PrepQueue::new(),
            surface: PrepSurface::new(),
            visuals,
            player,
            board,
            items,
            last_settlement: None,
            time_ticks: 0,
        }
    }

    /// Snapshot of the order board
    pub fn board(&self) -> OrderBoard {
        self.board.borrow().clone()
    }

    pub fn items(&self) -> &[ItemHandle] {
        &self.items
    }

    pub fn last_settlement(&self) -> Option<&Settlement> {
        self.last_settlement.as_ref()
    }

    /// Look up a pool item by key
    pub fn item(&self, key: &str) -> Result<ItemHandle, ShiftError> {
        self.items
            .iter()
            .find(|i| i.key() == key)
            .cloned()
            .ok_or_else(|| ShiftError::UnknownItem(key.to_string()))
    }

    /// Lay an ingredient on the prep surface and queue it for chopping
    pub fn prep(&mut self, item: ItemHandle) {
        self.surface.place(item.clone());
        self.queue.enqueue(item);
    }

    pub fn prep_by_key(&mut self, key: &str) -> Result<(), ShiftError> {
        let item = self.item(key)?;
        self.prep(item);
        Ok(())
    }

    pub fn show_intro(&mut self) {
        self.intro.open(&mut self.session, &mut *self.player);
    }

    /// Clock in. Leaves the station first; the fresh ledger drops whatever
    /// the abandoned round was charged.
    pub fn start_work(&mut self) {
        self.close_station();
        self.session.start_work(&mut self.orders);
    }

    /// Clock out. Leaves the station first, so an unfinished round is charged.
    pub fn stop_work(&mut self) -> Settlement {
        self.close_station();
        let settlement = self.session.stop_work(&mut self.orders);
        self.last_settlement = Some(settlement.clone());
        settlement
    }

    pub fn open_station(&mut self) {
        self.with_station(|flow, ctx| flow.open(ctx));
    }

    pub fn close_station(&mut self) {
        self.with_station(|flow, ctx| flow.close(ctx));
    }

    fn with_station<R>(
        &mut self,
        f: impl FnOnce(&mut ChoppingFlow, &mut ChopContext<'_>) -> R,
    ) -> R {
        let Shift {
            session,
            orders,
            chopping,
            queue,
            surface,
            visuals,
            player,
            ..
        } = self;

        let mut ctx = ChopContext {
            session,
            orders,
            queue,
            staging: surface,
            visuals: &mut **visuals,
            player: &mut **player,
        };
        f(chopping, &mut ctx)
    }
}

/// Advance the shift by one frame
pub fn tick(shift: &mut Shift, input: &TickInput, dt: f32) {
    shift.time_ticks += 1;

    if input.start_work {
        shift.start_work();
    }
    if input.stop_work && shift.session.state() != WorkState::Idle {
        shift.stop_work();
    }

    if input.advance_intro {
        shift
            .intro
            .advance(&mut shift.session, &mut *shift.player);
    }

    // A modal surface owns input; the clock keeps running underneath
    let gameplay_input = !shift.session.has_modal_ui_open();

    if gameplay_input && input.open_station && shift.session.state() == WorkState::Working {
        shift.open_station();
    }

    shift.orders.tick(dt, &mut shift.session);

    let chop_input = ChopInput {
        cut: gameplay_input && input.cut,
        cancel: gameplay_input && input.cancel,
    };
    shift.with_station(|flow, ctx| flow.tick(ctx, chop_input, dt));
}
