use std::io::Write;

use log::{debug, info};
use rustyline::{error::ReadlineError, Config, DefaultEditor};

use crate::{
	error::ShResult,
	shell::{Flow, Shell},
};

fn init_prompt() -> ShResult<DefaultEditor> {
	let config = Config::builder()
		.auto_add_history(true)
		.build();
	Ok(DefaultEditor::with_config(config)?)
}

/// Reads lines until `exit` or end of input and hands each one to the dispatcher.
///
/// Returns the code the interpreter should exit with.
pub fn run_interactive<O: Write, E: Write>(shell: &mut Shell<O, E>) -> ShResult<i32> {
	let mut rl = init_prompt()?;
	info!("Starting read loop");
	loop {
		let prompt = shell.opts().prompt.clone();
		match rl.readline(&prompt) {
			Ok(line) => {
				if let Flow::Exit(code) = shell.dispatch(&line)? {
					return Ok(code)
				}
			}
			Err(ReadlineError::Interrupted) => {
				// Ctrl-C throws away the current line
				continue
			}
			Err(ReadlineError::Eof) => {
				debug!("end of input");
				return Ok(0)
			}
			Err(e) => return Err(e.into()),
		}
	}
}
