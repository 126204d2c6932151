use std::io::{self, Stderr, Stdout, Write};

use bitflags::bitflags;
use log::{debug, info, trace};

use crate::{
	error::{ShErr, ShResult},
	jobs::{BackgroundProcess, JobTable},
	launch::{self, LaunchPlan},
	redir,
	shopt::ShOpts,
	token,
};

bitflags! {
	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	pub struct ExecFlags: u32 {
		const BACKGROUND = 0b00000000000000000000000000000001;
	}
}

/// What the read loop should do after a line has been dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
	Continue,
	Exit(i32),
}

/// The command dispatcher. Owns the job table and the streams reports are written to.
pub struct Shell<O: Write = Stdout, E: Write = Stderr> {
	opts: ShOpts,
	jobs: JobTable,
	last_status: i32,
	stdout: O,
	stderr: E,
}

impl Shell {
	pub fn new(opts: ShOpts) -> Self {
		Self::with_streams(opts, io::stdout(), io::stderr())
	}
}

impl<O: Write, E: Write> Shell<O, E> {
	pub fn with_streams(opts: ShOpts, stdout: O, stderr: E) -> Self {
		Self {
			opts,
			jobs: JobTable::new(),
			last_status: 0,
			stdout,
			stderr,
		}
	}

	pub fn opts(&self) -> &ShOpts {
		&self.opts
	}

	pub fn jobs(&self) -> &JobTable {
		&self.jobs
	}

	/// Exit code of the last foreground command, 0 after builtins and background spawns
	pub fn last_status(&self) -> i32 {
		self.last_status
	}

	pub fn stdout(&self) -> &O {
		&self.stdout
	}

	pub fn stderr(&self) -> &E {
		&self.stderr
	}

	/// Sweeps the job table, reporting any job whose status could not be checked
	pub fn reap_jobs(&mut self) -> ShResult<()> {
		for err in self.jobs.reap() {
			self.report(&err)?;
		}
		Ok(())
	}

	/// Handles one line of input.
	///
	/// Finished background jobs are reaped before anything else happens. Errors that belong
	/// to the command are reported on the error stream and do not end the loop; only a
	/// failure to write to the shell's own streams is returned.
	pub fn dispatch(&mut self, line: &str) -> ShResult<Flow> {
		self.reap_jobs()?;
		self.last_status = 0;

		let line = line.trim();
		trace!("dispatching {:?}", line);
		if line == self.opts.exit_cmd {
			info!("exiting with {} background job(s) still tracked", self.jobs.len());
			return Ok(Flow::Exit(0))
		}
		if line == self.opts.jobs_cmd {
			self.jobs.print_jobs(&mut self.stdout)?;
			self.stdout.flush()?;
			return Ok(Flow::Continue)
		}

		let (command, flags) = self.strip_bg_marker(line);
		if let Err(err) = self.exec_external(command, flags) {
			if err.is_fatal() {
				return Err(err)
			}
			if self.last_status == 0 {
				self.last_status = 1;
			}
			self.report(&err)?;
		}
		Ok(Flow::Continue)
	}

	fn strip_bg_marker<'a>(&self, line: &'a str) -> (&'a str, ExecFlags) {
		match line.strip_suffix(self.opts.bg_marker) {
			Some(command) => (command.trim_end(), ExecFlags::BACKGROUND),
			None => (line, ExecFlags::empty()),
		}
	}

	fn exec_external(&mut self, command: &str, flags: ExecFlags) -> ShResult<()> {
		let argv = token::split_on(command, self.opts.delimiter);
		let (parsed, errors) = redir::extract_redirs(argv);
		for err in errors {
			self.report(&err)?;
		}
		let plan = LaunchPlan::new(command, &parsed)?;

		// Anything still buffered would otherwise show up after the child's output
		self.stdout.flush()?;
		let pid = launch::launch(&plan)?;

		if flags.contains(ExecFlags::BACKGROUND) {
			self.jobs.insert_job(BackgroundProcess::new(pid, command));
			writeln!(self.stdout, "Background process started: {}", command)?;
			self.stdout.flush()?;
			return Ok(())
		}

		let status = launch::wait_fg(pid)?;
		self.last_status = launch::status_code(&status);
		debug!("foreground command {:?} finished with {}", command, self.last_status);
		if self.last_status != 0 {
			return Err(ShErr::NonZeroExit { command: command.to_string(), status: self.last_status })
		}
		Ok(())
	}

	fn report(&mut self, err: &ShErr) -> ShResult<()> {
		debug!("reporting: {:?}", err);
		writeln!(self.stderr, "{}", err)?;
		self.stderr.flush()?;
		Ok(())
	}
}
