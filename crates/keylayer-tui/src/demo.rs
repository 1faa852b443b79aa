//! Demo layers: a small points game whose features are driven by hotkeys.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use keylayer_core::{create_hotkey, Computable, Feature, HotkeyOptions, Layer};

pub const MAIN_LAYER: &str = "main";
pub const PRESTIGE_LAYER: &str = "prestige";

pub const WIN_POINTS: u64 = 1000;
pub const PRESTIGE_UNLOCK: u64 = 50;
pub const MULTIPLIER_COST: u64 = 100;
const BONUS_POINTS: u64 = 10;

#[derive(Debug)]
pub struct GameState {
    points: Cell<u64>,
    multiplier: Cell<u64>,
    won: Cell<bool>,
    continue_past_win: Cell<bool>,
}

impl GameState {
    pub fn new(continue_past_win: bool) -> Self {
        Self {
            points: Cell::new(0),
            multiplier: Cell::new(1),
            won: Cell::new(false),
            continue_past_win: Cell::new(continue_past_win),
        }
    }

    pub fn points(&self) -> u64 {
        self.points.get()
    }

    pub fn multiplier(&self) -> u64 {
        self.multiplier.get()
    }

    pub fn has_won(&self) -> bool {
        self.won.get()
    }

    pub fn continue_past_win(&self) -> bool {
        self.continue_past_win.get()
    }

    pub fn set_continue_past_win(&self, value: bool) {
        self.continue_past_win.set(value);
    }

    pub fn add_points(&self, amount: u64) {
        self.points.set(self.points.get().saturating_add(amount));
        if self.points.get() >= WIN_POINTS && !self.won.get() {
            tracing::info!(points = self.points.get(), "game won");
            self.won.set(true);
        }
    }

    /// Spend `cost` points if affordable.
    pub fn spend(&self, cost: u64) -> bool {
        if self.points.get() < cost {
            return false;
        }
        self.points.set(self.points.get() - cost);
        true
    }

    pub fn double_multiplier(&self) {
        self.multiplier.set(self.multiplier.get().saturating_mul(2));
    }

    /// Back to zero. A win, once reached, stays reached.
    pub fn reset(&self) {
        self.points.set(0);
        self.multiplier.set(1);
    }
}

/// Requests from hotkey actions that need the whole app, handled after dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    LoadLayer(&'static str),
    UnloadLayer(&'static str),
    FocusInput,
    Quit,
}

pub type CommandQueue = Rc<RefCell<VecDeque<AppCommand>>>;

fn send(commands: &CommandQueue, command: AppCommand) -> anyhow::Result<()> {
    commands.borrow_mut().push_back(command);
    Ok(())
}

pub fn main_layer(game: &Rc<GameState>, commands: &CommandQueue) -> Layer {
    let gain = {
        let game = game.clone();
        create_hotkey(move |_| {
            let for_description = game.clone();
            let game = game.clone();
            Ok(HotkeyOptions::new(
                "p",
                Computable::deferred(move || match for_description.multiplier() {
                    1 => "Gain a point".to_string(),
                    n => format!("Gain {n} points"),
                }),
                move || {
                    game.add_points(game.multiplier());
                    Ok(())
                },
            ))
        })
    };

    // Registered under the digit mnemonic; the delivered "!" resolves to it.
    let bonus = {
        let game = game.clone();
        create_hotkey(move |this| {
            let game = game.clone();
            let this = this.clone();
            Ok(HotkeyOptions::new(
                "shift+1",
                format!("Bonus: {BONUS_POINTS} points"),
                move || {
                    tracing::debug!(key = ?this.key(), "bonus claimed");
                    game.add_points(BONUS_POINTS);
                    Ok(())
                },
            ))
        })
    };

    let unlock = {
        let game = game.clone();
        let commands = commands.clone();
        create_hotkey(move |_| {
            let game = game.clone();
            let commands = commands.clone();
            Ok(HotkeyOptions::new("shift+P", "Unlock prestige", move || {
                send(&commands, AppCommand::LoadLayer(PRESTIGE_LAYER))
            })
            .enabled_when(move || game.points() >= PRESTIGE_UNLOCK))
        })
    };

    let reset = {
        let game = game.clone();
        let commands = commands.clone();
        create_hotkey(move |_| {
            let game = game.clone();
            let commands = commands.clone();
            Ok(HotkeyOptions::new("ctrl+shift+R", "Reset progress", move || {
                game.reset();
                send(&commands, AppCommand::UnloadLayer(PRESTIGE_LAYER))
            }))
        })
    };

    let note = {
        let commands = commands.clone();
        create_hotkey(move |_| {
            let commands = commands.clone();
            Ok(HotkeyOptions::new("i", "Write a note", move || {
                send(&commands, AppCommand::FocusInput)
            }))
        })
    };

    let quit = {
        let commands = commands.clone();
        create_hotkey(move |_| {
            let commands = commands.clone();
            Ok(HotkeyOptions::new("q", "Quit", move || send(&commands, AppCommand::Quit)))
        })
    };

    Layer::new(MAIN_LAYER, "Points")
        .with_feature(gain)
        .with_feature(bonus)
        .with_feature(unlock)
        .with_feature(reset)
        .with_feature(Feature::group("misc", vec![note.into(), quit.into()]))
}

pub fn prestige_layer(game: &Rc<GameState>, commands: &CommandQueue) -> Layer {
    let multiply = {
        let game = game.clone();
        create_hotkey(move |_| {
            let for_enabled = game.clone();
            let game = game.clone();
            Ok(HotkeyOptions::new(
                "m",
                format!("Double multiplier ({MULTIPLIER_COST} points)"),
                move || {
                    if game.spend(MULTIPLIER_COST) {
                        game.double_multiplier();
                    }
                    Ok(())
                },
            )
            .enabled_when(move || for_enabled.points() >= MULTIPLIER_COST))
        })
    };

    let leave = {
        let commands = commands.clone();
        create_hotkey(move |_| {
            let commands = commands.clone();
            Ok(HotkeyOptions::new("ctrl+d", "Leave prestige", move || {
                send(&commands, AppCommand::UnloadLayer(PRESTIGE_LAYER))
            }))
        })
    };

    Layer::new(PRESTIGE_LAYER, "Prestige").with_feature(Feature::group(
        "upgrades",
        vec![
            Feature::other("upgrade", "Multiplier"),
            multiply.into(),
            leave.into(),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_threshold() {
        let game = GameState::new(false);
        game.add_points(WIN_POINTS - 1);
        assert!(!game.has_won());
        game.add_points(1);
        assert!(game.has_won());

        game.reset();
        assert_eq!(game.points(), 0);
        assert!(game.has_won());
    }

    #[test]
    fn test_spend_requires_funds() {
        let game = GameState::new(false);
        game.add_points(MULTIPLIER_COST - 1);
        assert!(!game.spend(MULTIPLIER_COST));
        game.add_points(1);
        assert!(game.spend(MULTIPLIER_COST));
        assert_eq!(game.points(), 0);
    }

    #[test]
    fn test_main_layer_hotkeys() {
        let game = Rc::new(GameState::new(false));
        let commands: CommandQueue = Rc::default();
        let layer = main_layer(&game, &commands);

        let keys: Vec<String> = layer
            .hotkeys()
            .unwrap()
            .iter()
            .map(|d| d.key().to_string())
            .collect();
        assert_eq!(keys, vec!["p", "shift+1", "shift+P", "ctrl+shift+R", "i", "q"]);
    }

    #[test]
    fn test_gain_description_follows_multiplier() {
        let game = Rc::new(GameState::new(false));
        let commands: CommandQueue = Rc::default();
        let layer = main_layer(&game, &commands);
        let gain = layer.hotkeys().unwrap().remove(0);

        assert_eq!(gain.description(), "Gain a point");
        game.double_multiplier();
        assert_eq!(gain.description(), "Gain 2 points");
    }
}
