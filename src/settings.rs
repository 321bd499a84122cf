//! Shift settings
//!
//! Everything a shift is configured with, read once at startup from a JSON
//! file. There is no runtime reconfiguration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ShiftError;
use crate::sim::{ChopSettings, ItemDef, ItemHandle, OrderSettings, PayRates};

/// Shift configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftSettings {
    // === Pay ===
    pub pay: PayRates,

    // === Orders ===
    pub orders: OrderSettings,

    // === Chopping station ===
    pub chopping: ChopSettings,

    /// Ingredients orders are drawn from
    pub items: Vec<ItemDef>,

    /// Pages in the story intro (0 = skip it)
    pub intro_pages: usize,

    /// RNG seed for order selection
    pub seed: u64,
}

impl Default for ShiftSettings {
    fn default() -> Self {
        Self {
            pay: PayRates::default(),
            orders: OrderSettings::default(),
            chopping: ChopSettings::default(),
            items: vec![
                ItemDef::new("tomato", "Tomato", 2),
                ItemDef::new("onion", "Onion", 3),
                ItemDef::new("carrot", "Carrot", 4),
                ItemDef::new("cabbage", "Cabbage", 5),
            ],
            intro_pages: 3,
            seed: 0x5EED,
        }
    }
}

impl ShiftSettings {
    /// Copy with order bounds corrected the way the generator will apply them
    pub fn normalized(&self) -> Self {
        let mut settings = self.clone();
        settings.orders = self.orders.normalized();
        settings.chopping.next_delay_seconds = self.chopping.next_delay_seconds.max(0.0);
        settings.chopping.sliced_stay_seconds = self.chopping.sliced_stay_seconds.max(0.0);
        settings
    }

    /// Build the shared item pool
    pub fn item_pool(&self) -> Vec<ItemHandle> {
        self.items.iter().cloned().map(ItemDef::into_handle).collect()
    }

    pub fn load_from(path: &Path) -> Result<Self, ShiftError> {
        let json = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ShiftError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
