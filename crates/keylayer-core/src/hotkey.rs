//! Hotkey definitions and their lazy factory.
//!
//! Feature authors describe a hotkey with a closure returning [`HotkeyOptions`].
//! The closure does not run when the hotkey is created; it runs the first time
//! anything asks for the [`HotkeyDefinition`], and the result is memoized.
//! The `enabled` and `description` fields stay live after that: they are
//! [`Computable`]s and are re-evaluated on every read.
//!
//! The options closure receives a [`HotkeyRef`] pointing back at the hotkey
//! being built, so its `enabled`, `description` and `on_press` closures can
//! refer to the finished definition.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::computable::Computable;
use crate::error::HotkeyError;
use crate::layer::FeatureType;

/// Side-effecting action run when the hotkey fires.
pub type HotkeyAction = Rc<dyn Fn() -> anyhow::Result<()>>;

type OptionsFn = Box<dyn Fn(&HotkeyRef) -> anyhow::Result<HotkeyOptions>>;

/// Partially specified hotkey, as produced by an options closure.
pub struct HotkeyOptions {
    /// Key combination string, e.g. `"ctrl+shift+A"`, `"shift+1"`, `"F"`
    pub key: String,
    /// Enable predicate, `true` when absent
    pub enabled: Option<Computable<bool>>,
    /// Human-readable label for the info panel
    pub description: Computable<String>,
    pub on_press: HotkeyAction,
}

impl HotkeyOptions {
    pub fn new(
        key: impl Into<String>,
        description: impl Into<Computable<String>>,
        on_press: impl Fn() -> anyhow::Result<()> + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            enabled: None,
            description: description.into(),
            on_press: Rc::new(on_press),
        }
    }

    pub fn enabled(mut self, enabled: impl Into<Computable<bool>>) -> Self {
        self.enabled = Some(enabled.into());
        self
    }

    /// Enable the hotkey only while `condition` holds. Checked on every press.
    pub fn enabled_when(mut self, condition: impl Fn() -> bool + 'static) -> Self {
        self.enabled = Some(Computable::deferred(condition));
        self
    }
}

/// A materialized hotkey. Immutable apart from its computed fields.
pub struct HotkeyDefinition {
    key: String,
    feature_type: FeatureType,
    enabled: Computable<bool>,
    description: Computable<String>,
    on_press: HotkeyAction,
}

impl HotkeyDefinition {
    fn from_options(options: HotkeyOptions) -> Result<Self, HotkeyError> {
        if options.key.is_empty() {
            return Err(HotkeyError::EmptyKey);
        }

        Ok(Self {
            key: options.key,
            feature_type: FeatureType::Hotkey,
            enabled: Computable::default_if_absent(options.enabled, true),
            description: options.description,
            on_press: options.on_press,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn feature_type(&self) -> FeatureType {
        self.feature_type
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn description(&self) -> String {
        self.description.get()
    }

    /// Run the action. Errors are returned to the caller untouched.
    pub fn press(&self) -> anyhow::Result<()> {
        (self.on_press)()
    }
}

impl fmt::Debug for HotkeyDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HotkeyDefinition")
            .field("key", &self.key)
            .field("feature_type", &self.feature_type)
            .field("enabled", &self.enabled)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

enum BuildState {
    Unbuilt,
    Building,
    Built(Rc<HotkeyDefinition>),
}

/// A hotkey whose options have not necessarily been evaluated yet.
pub struct LazyHotkey {
    options: OptionsFn,
    state: RefCell<BuildState>,
    this: Weak<LazyHotkey>,
}

impl LazyHotkey {
    pub fn new(
        options: impl Fn(&HotkeyRef) -> anyhow::Result<HotkeyOptions> + 'static,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            options: Box::new(options),
            state: RefCell::new(BuildState::Unbuilt),
            this: this.clone(),
        })
    }

    /// Materialize the hotkey, running the options closure on first use.
    ///
    /// A failed build leaves the hotkey unbuilt, so the next call runs the
    /// options closure again.
    pub fn definition(&self) -> Result<Rc<HotkeyDefinition>, HotkeyError> {
        {
            let mut state = self.state.borrow_mut();
            match &*state {
                BuildState::Built(definition) => return Ok(Rc::clone(definition)),
                BuildState::Building => return Err(HotkeyError::ReentrantBuild),
                BuildState::Unbuilt => {}
            }
            *state = BuildState::Building;
        }

        let handle = HotkeyRef(self.this.clone());
        let result = (self.options)(&handle)
            .map_err(HotkeyError::Options)
            .and_then(HotkeyDefinition::from_options);

        let mut state = self.state.borrow_mut();
        match result {
            Ok(definition) => {
                let definition = Rc::new(definition);
                *state = BuildState::Built(Rc::clone(&definition));
                Ok(definition)
            }
            Err(e) => {
                *state = BuildState::Unbuilt;
                Err(e)
            }
        }
    }

    /// The definition if it has already been built. Never runs the options.
    pub fn built(&self) -> Option<Rc<HotkeyDefinition>> {
        match &*self.state.borrow() {
            BuildState::Built(definition) => Some(Rc::clone(definition)),
            _ => None,
        }
    }

    pub fn is_built(&self) -> bool {
        matches!(*self.state.borrow(), BuildState::Built(_))
    }

    pub fn key(&self) -> Result<String, HotkeyError> {
        Ok(self.definition()?.key().to_string())
    }
}

impl fmt::Debug for LazyHotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.state.borrow() {
            BuildState::Unbuilt => "unbuilt".to_string(),
            BuildState::Building => "building".to_string(),
            BuildState::Built(definition) => format!("built({})", definition.key()),
        };
        f.debug_struct("LazyHotkey").field("state", &state).finish()
    }
}

/// Handle to the hotkey under construction, given to its options closure.
#[derive(Clone)]
pub struct HotkeyRef(Weak<LazyHotkey>);

impl HotkeyRef {
    /// The finished definition. `None` while the options are still running.
    pub fn get(&self) -> Option<Rc<HotkeyDefinition>> {
        self.0.upgrade()?.built()
    }

    pub fn key(&self) -> Option<String> {
        self.get().map(|definition| definition.key().to_string())
    }
}

/// Declare a hotkey. `options` runs on first access, not here.
pub fn create_hotkey(
    options: impl Fn(&HotkeyRef) -> anyhow::Result<HotkeyOptions> + 'static,
) -> Rc<LazyHotkey> {
    LazyHotkey::new(options)
}
