use std::{fmt, io::Write};

use log::{debug, trace};
use nix::{
	sys::wait::{waitpid, WaitPidFlag, WaitStatus},
	unistd::Pid,
};

use crate::error::{ShErr, ShResult};

/// A command that was started in the background and has not been reaped yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundProcess {
	pid: Pid,
	command: String,
}

impl BackgroundProcess {
	pub fn new(pid: Pid, command: impl Into<String>) -> Self {
		Self { pid, command: command.into() }
	}
	pub fn pid(&self) -> Pid {
		self.pid
	}
	pub fn command(&self) -> &str {
		&self.command
	}
}

impl fmt::Display for BackgroundProcess {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "PID: {}, Command: {}", self.pid, self.command)
	}
}

/// Background jobs in the order they were started
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobTable {
	jobs: Vec<BackgroundProcess>,
}

impl JobTable {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert_job(&mut self, job: BackgroundProcess) {
		debug!("tracking background job {}", job);
		self.jobs.push(job);
	}

	pub fn jobs(&self) -> &[BackgroundProcess] {
		&self.jobs
	}

	pub fn len(&self) -> usize {
		self.jobs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.jobs.is_empty()
	}

	/// Drops every job whose process has exited.
	///
	/// Each pid gets one `waitpid(WNOHANG)`, so this never blocks. A job whose status check
	/// fails stays in the table and is checked again next time; the failures are returned
	/// so the caller can report them.
	pub fn reap(&mut self) -> Vec<ShErr> {
		let mut failures = vec![];
		self.jobs.retain(|job| {
			match waitpid(job.pid, Some(WaitPidFlag::WNOHANG)) {
				Ok(WaitStatus::StillAlive) => true,
				Ok(status @ (WaitStatus::Exited(..) | WaitStatus::Signaled(..))) => {
					debug!("reaped background job {}: {:?}", job, status);
					false
				}
				Ok(status) => {
					trace!("background job {} reported {:?}, keeping it", job, status);
					true
				}
				Err(errno) => {
					failures.push(ShErr::ReapCheckFailure { pid: job.pid, errno });
					true
				}
			}
		});
		failures
	}

	pub fn print_jobs<W: Write>(&self, mut out: W) -> ShResult<()> {
		writeln!(out, "Background processes:")?;
		for job in &self.jobs {
			writeln!(out, "{}", job)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use nix::errno::Errno;

	#[test]
	fn listing_format() {
		let mut table = JobTable::new();
		table.insert_job(BackgroundProcess::new(Pid::from_raw(4242), "sleep 5"));
		table.insert_job(BackgroundProcess::new(Pid::from_raw(4243), "yes > /dev/null"));

		let mut out = vec![];
		table.print_jobs(&mut out).unwrap();
		assert_eq!(
			String::from_utf8(out).unwrap(),
			"Background processes:\nPID: 4242, Command: sleep 5\nPID: 4243, Command: yes > /dev/null\n"
		);
	}

	#[test]
	fn empty_listing_is_just_the_header() {
		let mut out = vec![];
		JobTable::new().print_jobs(&mut out).unwrap();
		assert_eq!(String::from_utf8(out).unwrap(), "Background processes:\n");
	}

	#[test]
	fn failed_check_keeps_the_entry() {
		// pid 1 is never our child, so waitpid fails with ECHILD
		let mut table = JobTable::new();
		table.insert_job(BackgroundProcess::new(Pid::from_raw(1), "init"));

		let failures = table.reap();
		assert_eq!(failures.len(), 1);
		assert!(matches!(failures[0], ShErr::ReapCheckFailure { errno: Errno::ECHILD, .. }));
		assert_eq!(table.jobs()[0].pid(), Pid::from_raw(1));

		// and it is retried on the next sweep
		assert_eq!(table.reap().len(), 1);
		assert_eq!(table.len(), 1);
	}

	#[test]
	fn reaping_an_empty_table() {
		let mut table = JobTable::new();
		assert!(table.reap().is_empty());
		assert!(table.is_empty());
	}
}
