//! Order board readout
//!
//! Turns the order generator's board feed into the text a HUD shows:
//! the wanted item, `×N`, and `Time: Ns` with a danger flag near the end.

use crate::consts::DANGER_THRESHOLD;
use crate::sim::{BoardUpdate, ItemHandle};

/// Logical state of the on-screen order board
#[derive(Debug, Clone)]
pub struct OrderBoard {
    visible: bool,
    item: Option<ItemHandle>,
    count_text: String,
    timer_text: String,
    danger: bool,
    /// Fraction of the time limit at or below which the timer turns red
    danger_threshold: f32,
}

impl Default for OrderBoard {
    fn default() -> Self {
        Self::new(DANGER_THRESHOLD)
    }
}

impl OrderBoard {
    pub fn new(danger_threshold: f32) -> Self {
        Self {
            visible: false,
            item: None,
            count_text: String::new(),
            timer_text: String::new(),
            danger: false,
            danger_threshold: danger_threshold.clamp(0.0, 1.0),
        }
    }

    pub fn apply(&mut self, update: &BoardUpdate) {
        match update {
            BoardUpdate::Show { item, needed_count } => self.show(item, *needed_count),
            BoardUpdate::Clear => self.clear(),
            BoardUpdate::Timer {
                time_left,
                time_limit,
            } => self.set_time_seconds(*time_left, *time_limit),
        }
    }

    pub fn show(&mut self, item: &ItemHandle, needed_count: u32) {
        self.item = Some(item.clone());
        self.count_text = format!("×{}", needed_count);
        self.visible = true;
    }

    pub fn clear(&mut self) {
        self.item = None;
        self.count_text.clear();
        self.timer_text.clear();
        self.danger = false;
        self.visible = false;
    }

    pub fn set_time_seconds(&mut self, time_left: f32, time_limit: f32) {
        let time_limit = time_limit.max(1.0);
        let time_left = time_left.clamp(0.0, time_limit);

        self.timer_text = format!("Time: {}s", time_left.ceil() as u32);
        self.danger = time_left / time_limit <= self.danger_threshold;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn item(&self) -> Option<&ItemHandle> {
        self.item.as_ref()
    }

    pub fn count_text(&self) -> &str {
        &self.count_text
    }

    pub fn timer_text(&self) -> &str {
        &self.timer_text
    }

    pub fn is_danger(&self) -> bool {
        self.danger
    }
}
