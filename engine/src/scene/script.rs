//! Input Scripts
//!
//! A JSON timeline of input changes for headless runs and tests. Each entry
//! fires at a scene step and only touches the inputs it names:
//!
//! ```json
//! {
//!   "name": "jump over the gap",
//!   "inputs": [
//!     { "step": 0,  "horizontal": 1.0 },
//!     { "step": 40, "jump": true },
//!     { "step": 52, "jump": false },
//!     { "step": 90, "horizontal": 0.0 }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::player::CharacterController;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse script JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("input #{index} at step {step} comes before the previous entry")]
    OutOfOrder { index: usize, step: u64 },
}

/// One input change.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptInput {
    /// Scene step the change applies before
    pub step: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical: Option<f32>,
    /// Jump button edge: true = press, false = release
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jump: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause: Option<bool>,
}

/// Ordered input timeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputScript {
    pub name: String,
    pub inputs: Vec<ScriptInput>,
}

impl InputScript {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
        }
    }

    /// Builder: hold a movement direction from `step` on.
    pub fn movement(mut self, step: u64, horizontal: f32, vertical: f32) -> Self {
        self.inputs.push(ScriptInput {
            step,
            horizontal: Some(horizontal),
            vertical: Some(vertical),
            ..ScriptInput::default()
        });
        self.inputs.sort_by_key(|input| input.step);
        self
    }

    /// Builder: press jump at `step`, release at `step + hold`.
    pub fn jump(mut self, step: u64, hold: u64) -> Self {
        self.inputs.push(ScriptInput {
            step,
            jump: Some(true),
            ..ScriptInput::default()
        });
        self.inputs.push(ScriptInput {
            step: step + hold,
            jump: Some(false),
            ..ScriptInput::default()
        });
        self.inputs.sort_by_key(|input| input.step);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ScriptError> {
        let script: Self = serde_json::from_str(json)?;
        script.validate()?;
        Ok(script)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let script = Self::from_json_str(&std::fs::read_to_string(path)?)?;
        tracing::info!(
            "loaded script '{}' ({} inputs) from {}",
            script.name,
            script.inputs.len(),
            path.display()
        );
        Ok(script)
    }

    /// Entries must be in non-decreasing step order.
    pub fn validate(&self) -> Result<(), ScriptError> {
        match self
            .inputs
            .windows(2)
            .position(|pair| pair[1].step < pair[0].step)
        {
            Some(i) => Err(ScriptError::OutOfOrder {
                index: i + 1,
                step: self.inputs[i + 1].step,
            }),
            None => Ok(()),
        }
    }

    /// Entries scheduled for `step`, in file order.
    pub fn inputs_at(&self, step: u64) -> &[ScriptInput] {
        let start = self.inputs.partition_point(|input| input.step < step);
        let end = self.inputs.partition_point(|input| input.step <= step);
        &self.inputs[start..end]
    }

    /// Apply every entry scheduled for `step` to the controller.
    pub fn apply(&self, step: u64, controller: &mut CharacterController) {
        for input in self.inputs_at(step) {
            if input.horizontal.is_some() || input.vertical.is_some() {
                let axes = controller.movement().axes();
                controller.set_movement_input(
                    input.horizontal.unwrap_or(axes.horizontal),
                    input.vertical.unwrap_or(axes.vertical),
                );
            }
            if let Some(pressed) = input.jump {
                controller.set_jump_edge(pressed);
            }
            if let Some(paused) = input.pause {
                controller.set_paused(paused);
            }
        }
    }

    /// Last scheduled step.
    pub fn last_step(&self) -> u64 {
        self.inputs.last().map_or(0, |input| input.step)
    }
}
