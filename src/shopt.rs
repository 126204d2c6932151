use std::{fs, path::Path};

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ShErr, ShResult};

/// Interpreter options, loadable from a json file
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ShOpts {
	pub prompt: String,
	/// Builtin that lists background jobs
	pub jobs_cmd: String,
	/// Builtin that ends the interpreter
	pub exit_cmd: String,
	/// Trailing character that sends a command to the background
	pub bg_marker: char,
	/// Character that separates arguments
	pub delimiter: char,
}

impl ShOpts {
	pub fn new() -> Self {
		Self {
			prompt: "Shell> ".into(),
			jobs_cmd: "myjobs".into(),
			exit_cmd: "exit".into(),
			bg_marker: '&',
			delimiter: ' ',
		}
	}

	pub fn from_file(path: &Path) -> ShResult<Self> {
		let text = fs::read_to_string(path)
			.map_err(|e| ShErr::Config(format!("{}: {}", path.display(), e)))?;
		let opts = serde_json::from_str(&text)?;
		debug!("loaded options from {}: {:?}", path.display(), opts);
		Ok(opts)
	}

	/// Sets one option. The new value has to have the same shape as the old one.
	pub fn set(&mut self, key: &str, value: Value) -> ShResult<()> {
		let mut opts = serde_json::to_value(&*self)?;
		match opts.get_mut(key) {
			Some(slot) => *slot = value,
			None => return Err(ShErr::Config(format!("Invalid shopt key: {}", key))),
		}
		*self = serde_json::from_value(opts)
			.map_err(|e| ShErr::Config(format!("Invalid value for {}: {}", key, e)))?;
		Ok(())
	}

	/// Applies a `key=value` assignment as given on the command line.
	/// The value is read as json, falling back to a plain string.
	pub fn apply(&mut self, assignment: &str) -> ShResult<()> {
		let Some((key, raw)) = assignment.split_once('=') else {
			return Err(ShErr::Config(format!("Expected key=value, got: {}", assignment)))
		};
		let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
		self.set(key.trim(), value)
	}
}

impl Default for ShOpts {
	fn default() -> Self {
		Self::new()
	}
}
