//! Shift simulation core
//!
//! The session state machine, the order generator and the chopping station.
//! Everything here is single-threaded and driven by the frame tick:
//! - No sleeping; delays and countdowns advance by `dt`
//! - Seeded RNG only
//! - Notifications are delivered synchronously, in subscription order
//! - No rendering or platform dependencies

pub mod chopping;
pub mod delay;
pub mod item;
pub mod orders;
pub mod session;
pub mod signal;

pub use chopping::{
    ChopContext, ChopInput, ChopSettings, ChopStatus, ChoppingFlow, ChoppingRound, CutProgress,
    PlayerControl, PrepSource, StagingArea, VisualSink,
};
pub use delay::Delay;
pub use item::{ItemDef, ItemHandle};
pub use orders::{BoardUpdate, Order, OrderGenerator, OrderSettings, OrderSubmitter, Submission};
pub use session::{PayLedger, PayRates, PaySnapshot, SessionController, StateChange, WorkState};
pub use signal::{Signal, SubscriptionId};
