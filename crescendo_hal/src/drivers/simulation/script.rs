//! Scripted operator input.
//!
//! A script is a TOML list of steps. Each step holds an input snapshot
//! from its `tick` until the next step begins:
//!
//! ```toml
//! [[step]]
//! tick = 0
//! inputs = { drive = { translation = 0.8 } }
//!
//! [[step]]
//! tick = 100
//! inputs = { wants_intake = true }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crescendo_common::config::{ConfigError, ConfigLoader};
use crescendo_common::hal::driver::InputSource;
use crescendo_common::robot::input::OperatorInputs;

/// One scripted input segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputStep {
    /// First tick this snapshot applies to.
    pub tick: u64,
    /// Snapshot held until the next step.
    #[serde(default)]
    pub inputs: OperatorInputs,
}

#[derive(Debug, Deserialize)]
struct ScriptFile {
    #[serde(default, rename = "step")]
    steps: Vec<InputStep>,
}

/// `InputSource` replaying a fixed script, one tick per `poll()`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInputs {
    steps: Vec<InputStep>,
    cursor: usize,
    tick: u64,
}

impl ScriptedInputs {
    /// Script from in-memory steps. Steps must be sorted by `tick`.
    pub fn from_steps(steps: Vec<InputStep>) -> Result<Self, ConfigError> {
        if let Some(w) = steps.windows(2).find(|w| w[1].tick < w[0].tick) {
            return Err(ConfigError::ValidationError(format!(
                "script step at tick {} follows tick {}",
                w[1].tick, w[0].tick
            )));
        }
        Ok(Self {
            steps,
            cursor: 0,
            tick: 0,
        })
    }

    /// Load a script file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = ScriptFile::load(path)?;
        debug!(steps = file.steps.len(), path = %path.display(), "input script loaded");
        Self::from_steps(file.steps)
    }

    /// Parse script text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Self::from_steps(ScriptFile::parse(content)?.steps)
    }

    /// Tick of the last step, `None` for an empty script.
    pub fn last_tick(&self) -> Option<u64> {
        self.steps.last().map(|s| s.tick)
    }

    /// Ticks polled so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }
}

impl InputSource for ScriptedInputs {
    fn poll(&mut self) -> OperatorInputs {
        while self
            .steps
            .get(self.cursor + 1)
            .is_some_and(|next| next.tick <= self.tick)
        {
            self.cursor += 1;
        }

        let inputs = match self.steps.get(self.cursor) {
            Some(step) if step.tick <= self.tick => step.inputs,
            _ => OperatorInputs::default(),
        };
        self.tick += 1;
        inputs
    }
}
