//! Headless kitchen collaborators
//!
//! In-memory stand-ins for the prep pipeline, the prep surface, the
//! renderer and the player controller. The binary and the tests run on
//! these; a real frontend supplies its own implementations of the traits.

use std::collections::{HashSet, VecDeque};

use crate::error::VisualError;
use crate::sim::{ItemHandle, PlayerControl, PrepSource, StagingArea, VisualSink};

/// FIFO of prepared ingredients waiting for the chopping station
#[derive(Debug, Clone, Default)]
pub struct PrepQueue {
    items: VecDeque<ItemHandle>,
}

impl PrepQueue {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub fn enqueue(&mut self, item: ItemHandle) {
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl PrepSource for PrepQueue {
    fn try_dequeue(&mut self) -> Option<ItemHandle> {
        self.items.pop_front()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// Stack of ingredients laid out on the prep surface
#[derive(Debug, Clone, Default)]
pub struct PrepSurface {
    stack: Vec<ItemHandle>,
}

impl PrepSurface {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn place(&mut self, item: ItemHandle) {
        self.stack.push(item);
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// How many units of `item` are on the surface
    pub fn count_of(&self, item: &ItemHandle) -> usize {
        self.stack.iter().filter(|i| i.same_as(item)).count()
    }
}

impl StagingArea for PrepSurface {
    /// Removes the topmost matching unit
    fn consume_one(&mut self, item: &ItemHandle) -> bool {
        match self.stack.iter().rposition(|i| i.same_as(item)) {
            Some(index) => {
                self.stack.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Renderer that only logs and remembers what it was asked to show
#[derive(Debug, Default)]
pub struct HeadlessVisuals {
    placeholder: Option<String>,
    sliced: Vec<String>,
    missing: HashSet<String>,
}

impl HeadlessVisuals {
    /// Pretend `key` has no placeholder asset
    pub fn mark_missing(&mut self, key: impl Into<String>) {
        self.missing.insert(key.into());
    }

    /// Key of the placeholder currently on the board
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    /// Keys of every sliced output shown so far
    pub fn sliced(&self) -> &[String] {
        &self.sliced
    }
}

impl VisualSink for HeadlessVisuals {
    fn show_placeholder(&mut self, item: &ItemHandle) -> Result<(), VisualError> {
        if self.missing.contains(item.key()) {
            return Err(VisualError::MissingAsset(item.key().to_string()));
        }
        log::trace!("Placeholder: {}", item);
        self.placeholder = Some(item.key().to_string());
        Ok(())
    }

    fn show_sliced(&mut self, item: &ItemHandle, stay_seconds: f32) -> Result<(), VisualError> {
        log::trace!("Sliced: {} ({:.2}s)", item, stay_seconds);
        self.sliced.push(item.key().to_string());
        Ok(())
    }

    fn discard_placeholder(&mut self) {
        self.placeholder = None;
    }
}

/// Player controller that just records whether movement is allowed
#[derive(Debug, Clone)]
pub struct HeadlessPlayer {
    pub movement_enabled: bool,
}

impl Default for HeadlessPlayer {
    fn default() -> Self {
        Self {
            movement_enabled: true,
        }
    }
}

impl PlayerControl for HeadlessPlayer {
    fn set_movement_enabled(&mut self, enabled: bool) {
        self.movement_enabled = enabled;
    }
}
