pub mod computable;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod hotkey;
pub mod layer;
pub mod registry;
pub mod resolver;
pub mod tracing_setup;

pub use computable::Computable;
pub use dispatch::{DispatchController, DispatchOutcome, EventTarget, IgnoreReason, KeyDown, WinGate};
pub use error::{DispatchError, HotkeyError};
pub use hotkey::{create_hotkey, HotkeyDefinition, HotkeyOptions, HotkeyRef, LazyHotkey};
pub use layer::{find_features, Feature, FeatureType, Layer, LayerEvent};
pub use registry::{apply_layer_event, HotkeyRegistry, SharedRegistry};
pub use resolver::{candidates, shifted_digit, KeyPress};
