//! Named graph presets (§12): a saved, replayable sequence of node-graph
//! construction steps, "a saved set of `Insert` requests to replay at
//! boot." Adapted from the effect-chain preset shape this crate used to
//! carry to the node-graph snapshot model described by `thrum-dispatch`'s
//! [`RequestBody`](thrum_dispatch::RequestBody).
//!
//! A preset does not store [`thrum_core::NodeId`]s directly - those only
//! exist once a step has actually been submitted and the RT thread has
//! replied with one. Instead each [`GraphStep`] that needs a target refers
//! to an earlier step in the same preset by its position in
//! [`GraphPreset::steps`]. The replay loop (in `thrum-cli`) walks the steps
//! in order, resolves each `target` against the `NodeId`s collected from
//! earlier replies, and only then submits the step.

use serde::{Deserialize, Serialize};
use std::path::Path;

use thrum_core::{AddAction, AudioBusId, NodeId};
use thrum_dispatch::{ConfigArg, RequestBody};

use crate::error::ConfigError;

/// Serializable mirror of [`thrum_core::AddAction`]. `thrum-core` carries no
/// serde dependency (it is `no_std`-compatible), so config-facing types that
/// need to round-trip through TOML keep their own copy and convert.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepAddAction {
    /// Target must be a group; attach as its first child.
    AddToHead,
    /// Target must be a group; attach as its last child.
    #[default]
    AddToTail,
    /// Attach immediately before target, as its sibling.
    AddBefore,
    /// Attach immediately after target, as its sibling.
    AddAfter,
}

impl From<StepAddAction> for AddAction {
    fn from(action: StepAddAction) -> Self {
        match action {
            StepAddAction::AddToHead => AddAction::AddToHead,
            StepAddAction::AddToTail => AddAction::AddToTail,
            StepAddAction::AddBefore => AddAction::AddBefore,
            StepAddAction::AddAfter => AddAction::AddAfter,
        }
    }
}

/// Serializable mirror of [`thrum_dispatch::ConfigArg`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StepArg {
    /// A floating-point construction argument.
    Float(f32),
    /// An integer construction argument.
    Int(i64),
    /// A string construction argument.
    Text(String),
}

impl From<&StepArg> for ConfigArg {
    fn from(arg: &StepArg) -> Self {
        match arg {
            StepArg::Float(v) => ConfigArg::Float(*v),
            StepArg::Int(v) => ConfigArg::Int(*v),
            StepArg::Text(s) => ConfigArg::Text(s.clone()),
        }
    }
}

/// One step of a graph preset, matching the request bodies `thrum-dispatch`
/// recognizes: `Group`, `Synth`, `MapPort`, `SetControl` (§6). There is no
/// `Free` step - a preset only ever builds a graph, it never tears one down.
///
/// `target` fields refer to a previous step in the same [`GraphPreset`] by
/// index; `None` on a `Group`/`Synth` step targets the engine's root group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GraphStep {
    /// Create a group node.
    Group {
        /// Index of a previous step to target, or `None` for the root group.
        #[serde(default)]
        target: Option<usize>,
        /// Where to splice the new group relative to `target`.
        #[serde(default)]
        add_action: StepAddAction,
    },
    /// Create a synth node from a registered plugin URI.
    Synth {
        /// Index of a previous step to target, or `None` for the root group.
        #[serde(default)]
        target: Option<usize>,
        /// Where to splice the new node relative to `target`.
        #[serde(default)]
        add_action: StepAddAction,
        /// Synth-definition URI looked up in the plugin registry.
        plugin: String,
        /// Construction arguments forwarded to the plugin's `construct` step.
        #[serde(default)]
        args: Vec<StepArg>,
    },
    /// Bind one of an existing node's ports to a bus.
    MapPort {
        /// Index of the step that created the node being patched.
        target: usize,
        /// Port index on that node.
        index: u32,
        /// Bus to bind, or `None` to unbind the port.
        #[serde(default)]
        bus: Option<u32>,
    },
    /// Set a control-port constant value on an existing node.
    SetControl {
        /// Index of the step that created the node being patched.
        target: usize,
        /// Port index on that node.
        index: u32,
        /// Constant value to write.
        value: f32,
    },
}

impl GraphStep {
    /// The index of a previous step this step depends on, if any. Used by
    /// the replay loop to order submissions and to know which `NodeId` to
    /// resolve before submitting.
    #[must_use]
    pub fn depends_on(&self) -> Option<usize> {
        match self {
            GraphStep::Group { target, .. } | GraphStep::Synth { target, .. } => *target,
            GraphStep::MapPort { target, .. } | GraphStep::SetControl { target, .. } => {
                Some(*target)
            }
        }
    }

    /// Resolve this step into a concrete [`RequestBody`], given the
    /// already-resolved `NodeId` of [`GraphStep::depends_on`] (or the root
    /// group's id, for a `target: None` `Group`/`Synth` step).
    #[must_use]
    pub fn resolve(&self, target: Option<NodeId>) -> ResolvedStep {
        match self {
            GraphStep::Group { add_action, .. } => ResolvedStep {
                body_type: "Group",
                target,
                add_action: Some((*add_action).into()),
                plugin_uri: None,
                args: Vec::new(),
                port_index: None,
                bus: None,
                value: None,
            },
            GraphStep::Synth {
                add_action,
                plugin,
                args,
                ..
            } => ResolvedStep {
                body_type: "Synth",
                target,
                add_action: Some((*add_action).into()),
                plugin_uri: Some(plugin.clone()),
                args: args.iter().map(ConfigArg::from).collect(),
                port_index: None,
                bus: None,
                value: None,
            },
            GraphStep::MapPort { index, bus, .. } => ResolvedStep {
                body_type: "MapPort",
                target,
                add_action: None,
                plugin_uri: None,
                args: Vec::new(),
                port_index: Some(*index),
                bus: bus.map(AudioBusId::from_index),
                value: None,
            },
            GraphStep::SetControl { index, value, .. } => ResolvedStep {
                body_type: "SetControl",
                target,
                add_action: None,
                plugin_uri: None,
                args: Vec::new(),
                port_index: Some(*index),
                bus: None,
                value: Some(*value),
            },
        }
    }
}

/// A [`GraphStep`] with its `target` resolved to a concrete `NodeId`, ready
/// to submit through a `thrum_dispatch::Dispatcher`.
#[derive(Debug, Clone)]
pub struct ResolvedStep {
    body_type: &'static str,
    target: Option<NodeId>,
    add_action: Option<AddAction>,
    plugin_uri: Option<String>,
    args: Vec<ConfigArg>,
    port_index: Option<u32>,
    bus: Option<AudioBusId>,
    value: Option<f32>,
}

impl RequestBody for ResolvedStep {
    fn body_type(&self) -> &str {
        self.body_type
    }

    fn target(&self) -> Option<NodeId> {
        self.target
    }

    fn add_action(&self) -> Option<AddAction> {
        self.add_action
    }

    fn plugin_uri(&self) -> Option<&str> {
        self.plugin_uri.as_deref()
    }

    fn args(&self) -> &[ConfigArg] {
        &self.args
    }

    fn port_index(&self) -> Option<u32> {
        self.port_index
    }

    fn bus(&self) -> Option<AudioBusId> {
        self.bus
    }

    fn value(&self) -> Option<f32> {
        self.value
    }
}

/// A named, replayable graph preset.
///
/// # TOML Format
///
/// ```toml
/// name = "Sine through gain"
/// description = "test:sine feeding thrum:gain on bus 0"
///
/// [[steps]]
/// op = "synth"
/// plugin = "test:sine"
///
/// [[steps]]
/// op = "map_port"
/// target = 0
/// index = 0
/// bus = 0
///
/// [[steps]]
/// op = "synth"
/// plugin = "thrum:gain"
///
/// [[steps]]
/// op = "map_port"
/// target = 2
/// index = 0
/// bus = 0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GraphPreset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Ordered construction steps to replay.
    #[serde(default)]
    pub steps: Vec<GraphStep>,
}

impl GraphPreset {
    /// Create a new empty preset.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            steps: Vec::new(),
        }
    }

    /// Set the preset description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a step.
    #[must_use]
    pub fn with_step(mut self, step: GraphStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Ok(toml::from_str(&content)?)
    }

    /// Parse a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Serialize the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Number of steps in the preset.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the preset has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Check that every step's `target` refers to an earlier step, so a
    /// naive in-order replay never needs a `NodeId` it hasn't collected
    /// yet.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, step) in self.steps.iter().enumerate() {
            if let Some(target) = step.depends_on()
                && target >= index
            {
                return Err(ConfigError::ForwardReference { index, target });
            }
        }
        Ok(())
    }
}
