//! Chop Shift - a timed order-fulfillment loop for a kitchen shift
//!
//! Core modules:
//! - `sim`: Session state machine, order generator, chopping station
//! - `shift`: Wires the core to a kitchen and drives it one frame at a time
//! - `kitchen`: Headless prep queue, prep surface, visuals and player
//! - `board`: Order board readout
//! - `intro`: Story intro slideshow (modal)
//! - `settings`: Shift configuration
//! - `settlement`: End-of-shift pay and the shift history board

pub mod board;
pub mod error;
pub mod intro;
pub mod kitchen;
pub mod settings;
pub mod settlement;
pub mod shift;
pub mod sim;

pub use error::{ShiftError, VisualError};
pub use settings::ShiftSettings;
pub use settlement::{Settlement, ShiftHistory};
pub use shift::{Shift, TickInput, tick};

/// Shift tuning constants
pub mod consts {
    /// Frame step used by the headless driver (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Pay defaults
    pub const BASE_PAY: i64 = 100;
    pub const PAY_PER_ORDER: i64 = 5;
    pub const PENALTY_PER_WASTE: i64 = 1;

    /// Order defaults
    pub const ORDER_MIN_COUNT: i32 = 1;
    pub const ORDER_MAX_COUNT: i32 = 4;
    /// Seconds per order
    pub const ORDER_TIME_LIMIT: f32 = 15.0;
    /// Waste units charged when an order times out
    pub const ORDER_TIMEOUT_PENALTY: i32 = 5;

    /// Chopping station defaults
    pub const NEXT_DELAY_SECONDS: f32 = 0.35;
    pub const SLICED_STAY_SECONDS: f32 = 0.6;

    /// Timer turns red at or below this fraction of the limit
    pub const DANGER_THRESHOLD: f32 = 0.25;
}
