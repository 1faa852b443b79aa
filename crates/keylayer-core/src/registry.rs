//! The hotkey registry.
//!
//! Maps key combination strings to the hotkey currently bound to them. It is
//! mutated only by the layer lifecycle handlers and read by the dispatcher,
//! all on one thread.
//!
//! Collisions are last-write-wins. Unloading a layer clears every key that
//! layer registered, even when another loaded layer also registered the same
//! key and would still want it. That gap is known and kept as is.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::HotkeyError;
use crate::hotkey::HotkeyDefinition;
use crate::layer::{Layer, LayerEvent};

pub type SharedRegistry = Rc<RefCell<HotkeyRegistry>>;

#[derive(Debug, Default)]
pub struct HotkeyRegistry {
    /// Cleared slots keep their key, mirroring how unload only blanks entries
    entries: IndexMap<String, Option<Rc<HotkeyDefinition>>>,
}

impl HotkeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedRegistry {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Bind `definition` to its key, returning whatever it replaced.
    pub fn register(&mut self, definition: Rc<HotkeyDefinition>) -> Option<Rc<HotkeyDefinition>> {
        let key = definition.key().to_string();
        let replaced = self.entries.insert(key.clone(), Some(definition)).flatten();
        if replaced.is_some() {
            debug!(key = %key, "hotkey replaced by later registration");
        } else {
            debug!(key = %key, "hotkey registered");
        }
        replaced
    }

    /// Clear the slot for `key`. The key itself stays known to the registry.
    pub fn unregister(&mut self, key: &str) -> Option<Rc<HotkeyDefinition>> {
        let cleared = self.entries.get_mut(key).and_then(Option::take);
        if cleared.is_some() {
            debug!(key = %key, "hotkey cleared");
        }
        cleared
    }

    pub fn lookup(&self, key: &str) -> Option<Rc<HotkeyDefinition>> {
        self.entries.get(key).cloned().flatten()
    }

    /// Whether `key` was ever registered, including slots cleared since.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// First candidate with a live binding, in candidate order.
    pub fn first_match(&self, candidates: &[String]) -> Option<Rc<HotkeyDefinition>> {
        candidates.iter().find_map(|candidate| self.lookup(candidate))
    }

    /// Register already-materialized hotkeys of a layer.
    pub fn register_all(&mut self, layer: &Layer, hotkeys: Vec<Rc<HotkeyDefinition>>) {
        debug!(layer = %layer.id, count = hotkeys.len(), "registering layer hotkeys");
        for definition in hotkeys {
            self.register(definition);
        }
    }

    /// Handle a "layer added" notification.
    ///
    /// All hotkeys are materialized before any is registered, so a layer whose
    /// hotkey fails to build registers nothing.
    pub fn on_layer_added(&mut self, layer: &Layer) -> Result<(), HotkeyError> {
        let hotkeys = layer.hotkeys()?;
        self.register_all(layer, hotkeys);
        Ok(())
    }

    /// Handle a "layer removed" notification.
    pub fn on_layer_removed(&mut self, layer: &Layer) {
        for key in removal_keys(layer) {
            self.unregister(&key);
        }
    }

    pub fn handle_layer_event(&mut self, event: &LayerEvent) -> Result<(), HotkeyError> {
        match event {
            LayerEvent::Added(layer) => self.on_layer_added(layer),
            LayerEvent::Removed(layer) => {
                self.on_layer_removed(layer);
                Ok(())
            }
        }
    }

    /// Live bindings in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rc<HotkeyDefinition>)> {
        self.entries
            .iter()
            .filter_map(|(key, slot)| slot.as_ref().map(|definition| (key.as_str(), definition)))
    }

    /// Bindings whose enable condition holds right now.
    pub fn enabled_hotkeys(&self) -> Vec<Rc<HotkeyDefinition>> {
        self.iter()
            .filter(|(_, definition)| definition.is_enabled())
            .map(|(_, definition)| Rc::clone(definition))
            .collect()
    }

    /// Enabled hotkeys chunked into rows for the info panel.
    pub fn hotkey_rows(&self, columns: usize) -> Vec<Vec<Rc<HotkeyDefinition>>> {
        self.enabled_hotkeys()
            .chunks(columns.max(1))
            .map(<[Rc<HotkeyDefinition>]>::to_vec)
            .collect()
    }

    /// Number of live bindings.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keys a removed layer should clear. Hotkeys that cannot be built are
/// skipped: they never made it into the registry.
fn removal_keys(layer: &Layer) -> Vec<String> {
    layer
        .lazy_hotkeys()
        .iter()
        .filter_map(|hotkey| match hotkey.definition() {
            Ok(definition) => Some(definition.key().to_string()),
            Err(e) => {
                warn!(layer = %layer.id, error = %e, "skipping unbuildable hotkey on unload");
                None
            }
        })
        .collect()
}

/// Apply a lifecycle event to a shared registry.
///
/// Hotkey options and conditions run before the registry is borrowed, so they
/// are free to read the registry themselves.
pub fn apply_layer_event(registry: &SharedRegistry, event: &LayerEvent) -> Result<(), HotkeyError> {
    match event {
        LayerEvent::Added(layer) => {
            let hotkeys = layer.hotkeys()?;
            registry.borrow_mut().register_all(layer, hotkeys);
        }
        LayerEvent::Removed(layer) => {
            let keys = removal_keys(layer);
            let mut registry = registry.borrow_mut();
            for key in keys {
                registry.unregister(&key);
            }
        }
    }
    Ok(())
}
