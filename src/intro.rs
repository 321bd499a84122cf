//! Story intro slideshow
//!
//! A click-through sequence of pages shown before the first shift. While it
//! is open it holds the modal UI gate and the player cannot move.

use crate::sim::{PlayerControl, SessionController};

#[derive(Debug, Clone, Default)]
pub struct StoryIntro {
    page_count: usize,
    index: usize,
    open: bool,
}

impl StoryIntro {
    pub fn new(page_count: usize) -> Self {
        Self {
            page_count,
            index: 0,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Current page, if the intro is showing one
    pub fn page(&self) -> Option<usize> {
        (self.open && self.index < self.page_count).then_some(self.index)
    }

    pub fn open(&mut self, session: &mut SessionController, player: &mut dyn PlayerControl) {
        if self.open {
            return;
        }
        self.open = true;
        self.index = 0;

        session.enter_modal_ui();
        player.set_movement_enabled(false);
    }

    /// Next page, or close after the last one
    pub fn advance(&mut self, session: &mut SessionController, player: &mut dyn PlayerControl) {
        if !self.open {
            return;
        }

        if self.index + 1 < self.page_count {
            self.index += 1;
        } else {
            self.close(session, player);
        }
    }

    pub fn close(&mut self, session: &mut SessionController, player: &mut dyn PlayerControl) {
        if !self.open {
            return;
        }
        self.open = false;

        player.set_movement_enabled(true);
        session.exit_modal_ui();
    }
}
