use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use keylayer_core::{
    apply_layer_event, Computable, DispatchController, EventTarget, HotkeyDefinition,
    HotkeyRegistry, Layer, LayerEvent, SharedRegistry, WinGate,
};
use tracing::{debug, error};

use crate::demo::{self, AppCommand, CommandQueue, GameState};
use crate::input::key_down_from_crossterm;

pub struct App {
    pub game: Rc<GameState>,
    pub registry: SharedRegistry,
    controller: DispatchController,
    commands: CommandQueue,
    layers: HashMap<&'static str, Rc<Layer>>,
    loaded: Vec<&'static str>,
    pub panel_columns: usize,
    pub input: String,
    pub input_focused: bool,
    pub notes: Vec<String>,
    pub status: Option<String>,
    pub running: bool,
}

impl App {
    pub fn new(continue_past_win: bool, panel_columns: usize) -> Result<Self> {
        let game = Rc::new(GameState::new(continue_past_win));
        let registry = HotkeyRegistry::shared();
        let gate = {
            let won = game.clone();
            let keep_playing = game.clone();
            WinGate::new(
                Computable::deferred(move || won.has_won()),
                Computable::deferred(move || keep_playing.continue_past_win()),
            )
        };
        let controller = DispatchController::new(registry.clone(), gate);
        let commands = CommandQueue::default();

        let layers = HashMap::from([
            (demo::MAIN_LAYER, Rc::new(demo::main_layer(&game, &commands))),
            (demo::PRESTIGE_LAYER, Rc::new(demo::prestige_layer(&game, &commands))),
        ]);

        let mut app = Self {
            game,
            registry,
            controller,
            commands,
            layers,
            loaded: Vec::new(),
            panel_columns,
            input: String::new(),
            input_focused: false,
            notes: Vec::new(),
            status: None,
            running: true,
        };
        app.load_layer(demo::MAIN_LAYER)?;
        Ok(app)
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.loaded.iter().any(|loaded| *loaded == id)
    }

    pub fn loaded_layers(&self) -> impl Iterator<Item = &Layer> {
        self.loaded
            .iter()
            .filter_map(|id| self.layers.get(id).map(|layer| layer.as_ref()))
    }

    /// Enabled hotkeys grouped for the info panel.
    pub fn hotkey_rows(&self) -> Vec<Vec<Rc<HotkeyDefinition>>> {
        self.registry.borrow().hotkey_rows(self.panel_columns)
    }

    pub fn load_layer(&mut self, id: &'static str) -> Result<()> {
        if self.is_loaded(id) {
            return Ok(());
        }
        let layer = self
            .layers
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("Unknown layer: {id}"))?;
        apply_layer_event(&self.registry, &LayerEvent::Added(layer))?;
        self.loaded.push(id);
        debug!(layer = id, "layer loaded");
        Ok(())
    }

    pub fn unload_layer(&mut self, id: &'static str) -> Result<()> {
        if !self.is_loaded(id) {
            return Ok(());
        }
        let layer = self
            .layers
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("Unknown layer: {id}"))?;
        apply_layer_event(&self.registry, &LayerEvent::Removed(layer))?;
        self.loaded.retain(|loaded| *loaded != id);
        debug!(layer = id, "layer unloaded");
        Ok(())
    }

    fn run_commands(&mut self) -> Result<()> {
        loop {
            let command = self.commands.borrow_mut().pop_front();
            let Some(command) = command else {
                return Ok(());
            };
            match command {
                AppCommand::LoadLayer(id) => {
                    self.load_layer(id)?;
                    self.set_status(format!("Layer loaded: {id}"));
                }
                AppCommand::UnloadLayer(id) => {
                    if self.is_loaded(id) {
                        self.unload_layer(id)?;
                        self.set_status(format!("Layer unloaded: {id}"));
                    }
                }
                AppCommand::FocusInput => self.input_focused = true,
                AppCommand::Quit => self.running = false,
            }
        }
    }

    /// Route a terminal key event: hotkeys first, app keys for whatever
    /// the dispatcher leaves alone.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind == KeyEventKind::Release {
            return Ok(());
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.running = false;
            return Ok(());
        }

        let target = if self.input_focused {
            EventTarget::TextInput
        } else {
            EventTarget::Document
        };

        if let Some(key_down) = key_down_from_crossterm(&key, target) {
            let result = self.controller.dispatch(&key_down);
            self.run_commands()?;
            match result {
                Ok(outcome) => {
                    debug!(?outcome, "key dispatched");
                    if outcome.default_prevented() {
                        return Ok(());
                    }
                }
                Err(e) => {
                    // Action failures surface to the user, like any other unhandled error.
                    error!("{e}");
                    self.set_status(e.to_string());
                    return Ok(());
                }
            }
        }

        self.handle_default(key);
        Ok(())
    }

    fn handle_default(&mut self, key: KeyEvent) {
        if self.input_focused {
            match key.code {
                KeyCode::Esc => self.input_focused = false,
                KeyCode::Enter => {
                    let note = std::mem::take(&mut self.input);
                    if !note.trim().is_empty() {
                        self.notes.push(note);
                        self.set_status("Note saved");
                    }
                    self.input_focused = false;
                }
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) => self.input.push(c),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Enter if self.game.has_won() && !self.game.continue_past_win() => {
                self.game.set_continue_past_win(true);
                self.set_status("Continuing past the win");
            }
            KeyCode::Tab => self.input_focused = true,
            _ => {}
        }
    }
}
