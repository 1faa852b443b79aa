//! Key-down dispatch.
//!
//! Every key-down is handled on its own; there is no held-key state, and
//! auto-repeat presses go through the same path as fresh ones. Guards are
//! checked in order and the first failing one ends the press without touching
//! the host's default handling:
//!
//! 1. key-downs aimed at a text input are left alone so typing works
//! 2. after a win, hotkeys are suspended unless the player chose to continue
//! 3. some resolver candidate must be registered
//! 4. the matched hotkey must be enabled at this instant
//!
//! Only a press that passes all four prevents the default action and runs
//! the hotkey, exactly once.

use tracing::debug;

use crate::computable::Computable;
use crate::error::DispatchError;
use crate::registry::SharedRegistry;
use crate::resolver::{candidates, KeyPress};

/// Where the key-down was aimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventTarget {
    #[default]
    Document,
    TextInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDown {
    pub press: KeyPress,
    pub target: EventTarget,
}

impl KeyDown {
    pub fn new(press: KeyPress) -> Self {
        Self {
            press,
            target: EventTarget::Document,
        }
    }

    pub fn in_text_input(press: KeyPress) -> Self {
        Self {
            press,
            target: EventTarget::TextInput,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    TextInput,
    GameWon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A guard stopped the press before resolution
    Ignored(IgnoreReason),
    /// No candidate is registered
    Unmatched,
    /// A hotkey matched but its enable condition is false
    Disabled { key: String },
    /// The hotkey under `key` ran
    Matched { key: String },
}

impl DispatchOutcome {
    /// Whether the host should suppress its default handling of the key.
    pub fn default_prevented(&self) -> bool {
        matches!(self, DispatchOutcome::Matched { .. })
    }
}

/// Read-only win signals. Both are read fresh on every press.
pub struct WinGate {
    won: Computable<bool>,
    continue_past_win: Computable<bool>,
}

impl WinGate {
    pub fn new(won: impl Into<Computable<bool>>, continue_past_win: impl Into<Computable<bool>>) -> Self {
        Self {
            won: won.into(),
            continue_past_win: continue_past_win.into(),
        }
    }

    /// A gate for hosts without a win state.
    pub fn open() -> Self {
        Self::new(false, false)
    }

    pub fn suspends_hotkeys(&self) -> bool {
        self.won.get() && !self.continue_past_win.get()
    }
}

impl Default for WinGate {
    fn default() -> Self {
        Self::open()
    }
}

pub struct DispatchController {
    registry: SharedRegistry,
    gate: WinGate,
}

impl DispatchController {
    pub fn new(registry: SharedRegistry, gate: WinGate) -> Self {
        Self { registry, gate }
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Process one key-down.
    ///
    /// The registry borrow ends before the hotkey's condition and action run,
    /// so an action may load or unload layers. Action errors are returned,
    /// not swallowed.
    pub fn dispatch(&self, event: &KeyDown) -> Result<DispatchOutcome, DispatchError> {
        if event.target == EventTarget::TextInput {
            return Ok(DispatchOutcome::Ignored(IgnoreReason::TextInput));
        }
        if self.gate.suspends_hotkeys() {
            debug!(press = %event.press, "hotkeys suspended after win");
            return Ok(DispatchOutcome::Ignored(IgnoreReason::GameWon));
        }

        let candidates = candidates(&event.press);
        let Some(hotkey) = self.registry.borrow().first_match(&candidates) else {
            return Ok(DispatchOutcome::Unmatched);
        };

        let key = hotkey.key().to_string();
        if !hotkey.is_enabled() {
            debug!(press = %event.press, key = %key, "matched hotkey is disabled");
            return Ok(DispatchOutcome::Disabled { key });
        }

        debug!(press = %event.press, key = %key, "dispatching hotkey");
        hotkey.press().map_err(|error| DispatchError::Action {
            key: key.clone(),
            error,
        })?;
        Ok(DispatchOutcome::Matched { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotkey::{create_hotkey, HotkeyOptions, LazyHotkey};
    use crate::layer::{Layer, LayerEvent};
    use crate::registry::{apply_layer_event, HotkeyRegistry};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// A hotkey that appends `tag` to `log` when pressed.
    fn logging_hotkey(key: &'static str, tag: &'static str, log: &Log) -> Rc<LazyHotkey> {
        let log = log.clone();
        create_hotkey(move |_| {
            let log = log.clone();
            Ok(HotkeyOptions::new(key, tag, move || {
                log.borrow_mut().push(tag.to_string());
                Ok(())
            }))
        })
    }

    fn load(registry: &SharedRegistry, layer: &Rc<Layer>) {
        apply_layer_event(registry, &LayerEvent::Added(layer.clone())).unwrap();
    }

    fn unload(registry: &SharedRegistry, layer: &Rc<Layer>) {
        apply_layer_event(registry, &LayerEvent::Removed(layer.clone())).unwrap();
    }

    fn controller() -> (DispatchController, Log) {
        (
            DispatchController::new(HotkeyRegistry::shared(), WinGate::open()),
            Rc::new(RefCell::new(Vec::new())),
        )
    }

    #[test]
    fn test_unregistered_key_is_noop() {
        let (controller, log) = controller();
        load(
            controller.registry(),
            &Rc::new(Layer::new("main", "Main").with_feature(logging_hotkey("p", "points", &log))),
        );

        let outcome = controller.dispatch(&KeyDown::new(KeyPress::new("z"))).unwrap();
        assert_eq!(outcome, DispatchOutcome::Unmatched);
        assert!(!outcome.default_prevented());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_shift_letter_matches_upper_registration() {
        let (controller, log) = controller();
        load(
            controller.registry(),
            &Rc::new(
                Layer::new("main", "Main")
                    .with_feature(logging_hotkey("shift+a", "lower", &log))
                    .with_feature(logging_hotkey("shift+A", "upper", &log)),
            ),
        );

        let outcome = controller
            .dispatch(&KeyDown::new(KeyPress::new("a").with_shift()))
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Matched { key: "shift+A".to_string() });
        assert!(outcome.default_prevented());
        assert_eq!(*log.borrow(), vec!["upper"]);
    }

    #[test]
    fn test_shifted_digit_prefers_literal_symbol() {
        let (controller, log) = controller();
        let layer = Rc::new(
            Layer::new("main", "Main")
                .with_feature(logging_hotkey("shift+1", "mnemonic", &log))
                .with_feature(logging_hotkey("!", "symbol", &log)),
        );
        load(controller.registry(), &layer);

        let press = KeyDown::new(KeyPress::new("!").with_shift());
        controller.dispatch(&press).unwrap();
        assert_eq!(*log.borrow(), vec!["symbol"]);

        // With only the mnemonic registered, the digit alias resolves.
        let mnemonic_only = Rc::new(
            Layer::new("digits", "Digits").with_feature(logging_hotkey("shift+1", "mnemonic", &log)),
        );
        unload(controller.registry(), &layer);
        load(controller.registry(), &mnemonic_only);
        let outcome = controller.dispatch(&press).unwrap();
        assert_eq!(outcome, DispatchOutcome::Matched { key: "shift+1".to_string() });
        assert_eq!(*log.borrow(), vec!["symbol", "mnemonic"]);
    }

    #[test]
    fn test_ctrl_shift_probe_order() {
        let (controller, log) = controller();
        let press = KeyDown::new(KeyPress::new("k").with_shift().with_ctrl());

        let lower = Rc::new(Layer::new("lower", "Lower").with_feature(logging_hotkey("shift+ctrl+k", "lower", &log)));
        load(controller.registry(), &lower);
        assert_eq!(
            controller.dispatch(&press).unwrap(),
            DispatchOutcome::Matched { key: "shift+ctrl+k".to_string() }
        );

        let upper = Rc::new(Layer::new("upper", "Upper").with_feature(logging_hotkey("shift+ctrl+K", "upper", &log)));
        load(controller.registry(), &upper);
        assert_eq!(
            controller.dispatch(&press).unwrap(),
            DispatchOutcome::Matched { key: "shift+ctrl+K".to_string() }
        );

        // A bare "k" never matches a ctrl+shift press.
        unload(controller.registry(), &lower);
        unload(controller.registry(), &upper);
        let bare = Rc::new(Layer::new("bare", "Bare").with_feature(logging_hotkey("k", "bare", &log)));
        load(controller.registry(), &bare);
        assert_eq!(controller.dispatch(&press).unwrap(), DispatchOutcome::Unmatched);
    }

    #[test]
    fn test_ctrl_only_ignores_bare_key() {
        let (controller, log) = controller();
        load(
            controller.registry(),
            &Rc::new(Layer::new("main", "Main").with_feature(logging_hotkey("s", "bare", &log))),
        );

        let outcome = controller
            .dispatch(&KeyDown::new(KeyPress::new("s").with_ctrl()))
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Unmatched);
    }

    #[test]
    fn test_removed_layer_stops_dispatching() {
        let (controller, log) = controller();
        let quitting = Rc::new(Layer::new("quit", "Quit").with_feature(logging_hotkey("Q", "quit", &log)));
        let other = Rc::new(Layer::new("other", "Other").with_feature(logging_hotkey("w", "wave", &log)));
        load(controller.registry(), &quitting);
        load(controller.registry(), &other);
        unload(controller.registry(), &quitting);

        let outcome = controller.dispatch(&KeyDown::new(KeyPress::new("Q"))).unwrap();
        assert_eq!(outcome, DispatchOutcome::Unmatched);
        controller.dispatch(&KeyDown::new(KeyPress::new("w"))).unwrap();
        assert_eq!(*log.borrow(), vec!["wave"]);
    }

    #[test]
    fn test_later_layer_wins_collision() {
        let (controller, log) = controller();
        load(
            controller.registry(),
            &Rc::new(Layer::new("first", "First").with_feature(logging_hotkey("R", "first", &log))),
        );
        load(
            controller.registry(),
            &Rc::new(Layer::new("second", "Second").with_feature(logging_hotkey("R", "second", &log))),
        );

        controller.dispatch(&KeyDown::new(KeyPress::new("R"))).unwrap();
        assert_eq!(*log.borrow(), vec!["second"]);
    }

    #[test]
    fn test_win_suspends_until_player_continues() {
        let won = Rc::new(Cell::new(true));
        let keep_playing = Rc::new(Cell::new(false));
        let gate = {
            let won = won.clone();
            let keep_playing = keep_playing.clone();
            WinGate::new(
                Computable::deferred(move || won.get()),
                Computable::deferred(move || keep_playing.get()),
            )
        };
        let controller = DispatchController::new(HotkeyRegistry::shared(), gate);
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        load(
            controller.registry(),
            &Rc::new(Layer::new("main", "Main").with_feature(logging_hotkey("p", "points", &log))),
        );
        let press = KeyDown::new(KeyPress::new("p"));

        assert_eq!(
            controller.dispatch(&press).unwrap(),
            DispatchOutcome::Ignored(IgnoreReason::GameWon)
        );
        assert!(log.borrow().is_empty());

        keep_playing.set(true);
        assert!(controller.dispatch(&press).unwrap().default_prevented());

        keep_playing.set(false);
        won.set(false);
        assert!(controller.dispatch(&press).unwrap().default_prevented());
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_text_input_target_is_ignored() {
        let (controller, log) = controller();
        load(
            controller.registry(),
            &Rc::new(Layer::new("main", "Main").with_feature(logging_hotkey("p", "points", &log))),
        );

        let outcome = controller
            .dispatch(&KeyDown::in_text_input(KeyPress::new("p")))
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Ignored(IgnoreReason::TextInput));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_enabled_reflects_current_state() {
        let unlocked = Rc::new(Cell::new(false));
        let presses = Rc::new(Cell::new(0));
        let hotkey = {
            let unlocked = unlocked.clone();
            let presses = presses.clone();
            create_hotkey(move |_| {
                let unlocked = unlocked.clone();
                let presses = presses.clone();
                Ok(HotkeyOptions::new("u", "Upgrade", move || {
                    presses.set(presses.get() + 1);
                    Ok(())
                })
                .enabled_when(move || unlocked.get()))
            })
        };
        let (controller, _) = controller();
        load(controller.registry(), &Rc::new(Layer::new("main", "Main").with_feature(hotkey)));
        let press = KeyDown::new(KeyPress::new("u"));

        assert_eq!(
            controller.dispatch(&press).unwrap(),
            DispatchOutcome::Disabled { key: "u".to_string() }
        );
        unlocked.set(true);
        assert!(controller.dispatch(&press).unwrap().default_prevented());
        unlocked.set(false);
        assert!(!controller.dispatch(&press).unwrap().default_prevented());
        assert_eq!(presses.get(), 1);
    }

    #[test]
    fn test_repeat_presses_fire_each_time() {
        let (controller, log) = controller();
        load(
            controller.registry(),
            &Rc::new(Layer::new("main", "Main").with_feature(logging_hotkey("p", "points", &log))),
        );

        for _ in 0..3 {
            controller.dispatch(&KeyDown::new(KeyPress::new("p"))).unwrap();
        }
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn test_action_error_propagates() {
        let (controller, _) = controller();
        let failing = create_hotkey(|_| Ok(HotkeyOptions::new("x", "Explode", || anyhow::bail!("boom"))));
        load(controller.registry(), &Rc::new(Layer::new("main", "Main").with_feature(failing)));

        let err = controller.dispatch(&KeyDown::new(KeyPress::new("x"))).unwrap_err();
        assert!(err.to_string().contains("'x'"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_action_may_load_layers() {
        let registry = HotkeyRegistry::shared();
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let bonus = Rc::new(Layer::new("bonus", "Bonus").with_feature(logging_hotkey("b", "bonus", &log)));
        let loader = {
            let registry = registry.clone();
            let bonus = bonus.clone();
            create_hotkey(move |_| {
                let registry = registry.clone();
                let bonus = bonus.clone();
                Ok(HotkeyOptions::new("l", "Load bonus", move || {
                    apply_layer_event(&registry, &LayerEvent::Added(bonus.clone()))?;
                    Ok(())
                }))
            })
        };
        let controller = DispatchController::new(registry, WinGate::open());
        load(controller.registry(), &Rc::new(Layer::new("main", "Main").with_feature(loader)));

        controller.dispatch(&KeyDown::new(KeyPress::new("l"))).unwrap();
        controller.dispatch(&KeyDown::new(KeyPress::new("b"))).unwrap();
        assert_eq!(*log.borrow(), vec!["bonus"]);
    }
}
