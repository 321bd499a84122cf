//! Ingredient definitions
//!
//! Items are shared by handle and compared by identity, never by value:
//! two definitions with the same key are still different ingredients.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Static description of an ingredient that can be ordered and chopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDef {
    /// Stable lookup key (used by settings and the prep pipeline)
    pub key: String,
    /// Name shown on the order board and the chopping station
    pub display_name: String,
    /// Cuts needed before the ingredient is plated (values < 1 count as 1)
    #[serde(default = "default_required_cuts")]
    pub required_cuts: i32,
}

fn default_required_cuts() -> i32 {
    1
}

impl ItemDef {
    pub fn new(key: impl Into<String>, display_name: impl Into<String>, required_cuts: i32) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            required_cuts,
        }
    }

    /// Effective cut count, never below one
    #[inline]
    pub fn cuts_needed(&self) -> u32 {
        self.required_cuts.max(1) as u32
    }

    /// Wrap into a shared handle
    pub fn into_handle(self) -> ItemHandle {
        ItemHandle(Rc::new(self))
    }
}

/// Shared, identity-compared reference to an [`ItemDef`]
#[derive(Clone)]
pub struct ItemHandle(Rc<ItemDef>);

impl ItemHandle {
    /// True when both handles point at the same definition
    #[inline]
    pub fn same_as(&self, other: &ItemHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn def(&self) -> &ItemDef {
        &self.0
    }

    pub fn key(&self) -> &str {
        &self.0.key
    }

    pub fn display_name(&self) -> &str {
        &self.0.display_name
    }
}

impl PartialEq for ItemHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for ItemHandle {}

impl fmt::Debug for ItemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemHandle({})", self.0.key)
    }
}

impl fmt::Display for ItemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.display_name)
    }
}
