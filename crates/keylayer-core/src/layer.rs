//! Layers and feature discovery.
//!
//! A layer is an independently loadable bundle of features. Its features form
//! a tree: groups may nest other features, and hotkeys sit anywhere in it.
//! The lifecycle bus that loads and unloads layers lives outside this crate;
//! it reports changes as [`LayerEvent`]s.

use std::rc::Rc;

use crate::error::HotkeyError;
use crate::hotkey::{HotkeyDefinition, LazyHotkey};

/// Kind tag carried by every feature in a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureType {
    Hotkey,
    /// Any non-hotkey feature kind, e.g. `"upgrade"` or `"tab"`
    Other(&'static str),
}

#[derive(Debug, Clone)]
pub enum Feature {
    Hotkey(Rc<LazyHotkey>),
    Group { name: String, children: Vec<Feature> },
    Other { feature_type: FeatureType, name: String },
}

impl Feature {
    pub fn feature_type(&self) -> Option<FeatureType> {
        match self {
            Feature::Hotkey(_) => Some(FeatureType::Hotkey),
            Feature::Group { .. } => None,
            Feature::Other { feature_type, .. } => Some(*feature_type),
        }
    }

    pub fn group(name: impl Into<String>, children: Vec<Feature>) -> Self {
        Feature::Group {
            name: name.into(),
            children,
        }
    }

    pub fn other(feature_type: &'static str, name: impl Into<String>) -> Self {
        Feature::Other {
            feature_type: FeatureType::Other(feature_type),
            name: name.into(),
        }
    }
}

impl From<Rc<LazyHotkey>> for Feature {
    fn from(hotkey: Rc<LazyHotkey>) -> Self {
        Feature::Hotkey(hotkey)
    }
}

#[derive(Debug, Clone)]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub features: Vec<Feature>,
}

impl Layer {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            features: Vec::new(),
        }
    }

    pub fn with_feature(mut self, feature: impl Into<Feature>) -> Self {
        self.features.push(feature.into());
        self
    }

    /// The layer's hotkeys, not yet materialized, in declaration order.
    pub fn lazy_hotkeys(&self) -> Vec<Rc<LazyHotkey>> {
        find_features(self, FeatureType::Hotkey)
            .into_iter()
            .filter_map(|feature| match feature {
                Feature::Hotkey(hotkey) => Some(Rc::clone(hotkey)),
                _ => None,
            })
            .collect()
    }

    /// Materialize every hotkey in the layer. Stops at the first failure.
    pub fn hotkeys(&self) -> Result<Vec<Rc<HotkeyDefinition>>, HotkeyError> {
        self.lazy_hotkeys()
            .iter()
            .map(|hotkey| hotkey.definition())
            .collect()
    }
}

/// Notification from the layer lifecycle bus.
#[derive(Debug, Clone)]
pub enum LayerEvent {
    Added(Rc<Layer>),
    Removed(Rc<Layer>),
}

/// Depth-first search of a layer's feature tree for one feature kind.
pub fn find_features(layer: &Layer, feature_type: FeatureType) -> Vec<&Feature> {
    fn walk<'a>(features: &'a [Feature], wanted: FeatureType, found: &mut Vec<&'a Feature>) {
        for feature in features {
            if let Feature::Group { children, .. } = feature {
                walk(children, wanted, found);
            } else if feature.feature_type() == Some(wanted) {
                found.push(feature);
            }
        }
    }

    let mut found = Vec::new();
    walk(&layer.features, feature_type, &mut found);
    found
}
