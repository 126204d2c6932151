use std::path::PathBuf;

use clap::Parser;
use log::debug;

use jobsh::{
	error::ShResult,
	prompt,
	shell::{Flow, Shell},
	shopt::ShOpts,
};

/// A small command interpreter with background job tracking
#[derive(Parser, Debug)]
#[command(name = "jobsh", version)]
struct Args {
	/// Run a single command line and exit
	#[arg(short = 'c', value_name = "COMMAND")]
	command: Option<String>,

	/// Load options from a json file
	#[arg(long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Override an option, e.g. `-o jobs_cmd=jobs`
	#[arg(short = 'o', value_name = "KEY=VALUE")]
	options: Vec<String>,
}

fn main() {
	env_logger::init();
	let args = Args::parse();
	debug!("{:?}", args);

	let code = match run(args) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("jobsh: {}", e);
			1
		}
	};
	std::process::exit(code)
}

fn run(args: Args) -> ShResult<i32> {
	let mut opts = match &args.config {
		Some(path) => ShOpts::from_file(path)?,
		None => ShOpts::new(),
	};
	for assignment in &args.options {
		opts.apply(assignment)?;
	}

	let mut shell = Shell::new(opts);
	match args.command {
		Some(command) => match shell.dispatch(&command)? {
			Flow::Exit(code) => Ok(code),
			Flow::Continue if shell.last_status() == 0 => Ok(0),
			Flow::Continue => Ok(1),
		},
		None => prompt::run_interactive(&mut shell),
	}
}
