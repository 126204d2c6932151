use std::{ffi::CString, io, os::unix::ffi::OsStrExt, path::Path};

use libc::{STDIN_FILENO, STDOUT_FILENO};
use log::{debug, trace};
use nix::{
	errno::Errno,
	fcntl::{open, OFlag},
	sys::{
		stat::Mode,
		wait::{waitpid, WaitStatus},
	},
	unistd::{close, dup2, execvp, fork, write, ForkResult, Pid},
};

use crate::{
	error::{ShErr, ShResult},
	redir::{ParsedCommand, RedirKind},
};

/// Exit status of a child that could not open a redirection target
pub const REDIR_FAILED: i32 = 1;
/// Exit status of a child whose program could not be found
pub const NOT_FOUND: i32 = 127;
/// Exit status of a child whose program was found but could not be executed
pub const NOT_EXECUTABLE: i32 = 126;

/// The two continuations of a fork
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spawn {
	/// This process is the new child and must end in `exec_child`
	Child,
	/// This process is still the interpreter
	Parent { pid: Pid },
}

pub fn spawn() -> ShResult<Spawn> {
	// SAFETY: the child only runs exec_child(). Apart from the argv pointer array execvp
	// collects on the heap, it sticks to open/dup2/close/write/_exit. glibc resets the
	// malloc locks in the child after fork, so that one allocation is fine even when other
	// threads were holding them.
	match unsafe { fork() } {
		Ok(ForkResult::Child) => Ok(Spawn::Child),
		Ok(ForkResult::Parent { child }) => Ok(Spawn::Parent { pid: child }),
		Err(errno) => Err(ShErr::SpawnFailure(errno)),
	}
}

#[derive(Debug)]
struct RedirTarget {
	path: CString,
	on_failure: Vec<u8>,
}

impl RedirTarget {
	fn new(kind: RedirKind, path: &Path) -> ShResult<Self> {
		let on_failure = report_line(&ShErr::RedirTargetUnavailable {
			kind,
			path: path.to_string_lossy().into_owned(),
		});
		let path = CString::new(path.as_os_str().as_bytes())
			.map_err(|_| ShErr::RedirTargetUnavailable { kind, path: path.to_string_lossy().into_owned() })?;
		Ok(Self { path, on_failure })
	}
}

/// Everything a child needs between fork and exec.
///
/// Paths, arguments and error reports are built in the parent, so nothing is formatted after
/// the fork. The only allocation left in the child is the pointer array `execvp` builds.
#[derive(Debug)]
pub struct LaunchPlan {
	argv: Vec<CString>,
	infile: Option<RedirTarget>,
	outfile: Option<RedirTarget>,
	on_exec_failure: Vec<u8>,
}

impl LaunchPlan {
	/// `command` is the line the user typed, used to name the command in error reports
	pub fn new(command: &str, parsed: &ParsedCommand) -> ShResult<Self> {
		let argv = parsed.argv.iter()
			.map(|arg| CString::new(arg.as_bytes()))
			.collect::<Result<Vec<_>, _>>()
			.map_err(|_| ShErr::ExecFailure(command.to_string()))?;
		let infile = parsed.infile.as_deref()
			.map(|path| RedirTarget::new(RedirKind::Input, path))
			.transpose()?;
		let outfile = parsed.outfile.as_deref()
			.map(|path| RedirTarget::new(RedirKind::Output, path))
			.transpose()?;
		let on_exec_failure = report_line(&ShErr::ExecFailure(command.to_string()));
		Ok(Self { argv, infile, outfile, on_exec_failure })
	}
}

fn report_line(err: &ShErr) -> Vec<u8> {
	format!("{}\n", err).into_bytes()
}

/// Forks and launches `plan` in the child. Only the parent returns.
pub fn launch(plan: &LaunchPlan) -> ShResult<Pid> {
	match spawn()? {
		Spawn::Child => exec_child(plan),
		Spawn::Parent { pid } => {
			debug!("spawned child {} for {:?}", pid, plan.argv);
			Ok(pid)
		}
	}
}

/// Wires up redirections and replaces the process image. Never returns.
pub fn exec_child(plan: &LaunchPlan) -> ! {
	if let Some(target) = &plan.infile {
		redirect(target, OFlag::O_RDONLY, Mode::empty(), STDIN_FILENO);
	}
	if let Some(target) = &plan.outfile {
		let flags = OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC;
		let mode = Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP | Mode::S_IROTH;
		redirect(target, flags, mode, STDOUT_FILENO);
	}

	let Some(program) = plan.argv.first() else {
		report(&plan.on_exec_failure);
		_exit(NOT_FOUND)
	};
	let Err(errno) = execvp(program, &plan.argv);
	report(&plan.on_exec_failure);
	match errno {
		Errno::ENOENT => _exit(NOT_FOUND),
		_ => _exit(NOT_EXECUTABLE),
	}
}

fn redirect(target: &RedirTarget, flags: OFlag, mode: Mode, std_fd: i32) {
	let file_fd = match open(target.path.as_c_str(), flags, mode) {
		Ok(fd) => fd,
		Err(_) => {
			report(&target.on_failure);
			_exit(REDIR_FAILED)
		}
	};
	if file_fd == std_fd {
		return
	}
	if dup2(file_fd, std_fd).is_err() {
		report(&target.on_failure);
		_exit(REDIR_FAILED)
	}
	let _ = close(file_fd);
}

fn _exit(code: i32) -> ! {
	// SAFETY: ends the child without running atexit handlers or flushing stdio buffers
	// inherited from the parent
	unsafe { libc::_exit(code) }
}

fn report(msg: &[u8]) {
	// Nothing useful can be done if stderr itself is gone
	let _ = write(io::stderr(), msg);
}

/// Blocks until `pid` terminates
pub fn wait_fg(pid: Pid) -> ShResult<WaitStatus> {
	loop {
		match waitpid(pid, None) {
			Ok(status) => {
				trace!("foreground child {} finished: {:?}", pid, status);
				return Ok(status)
			}
			Err(Errno::EINTR) => continue,
			Err(errno) => return Err(ShErr::WaitFailure { pid, errno }),
		}
	}
}

/// Folds a wait status into a shell-style exit code
pub fn status_code(status: &WaitStatus) -> i32 {
	match status {
		WaitStatus::Exited(_, code) => *code,
		WaitStatus::Signaled(_, signal, _) => 128 + *signal as i32,
		_ => 0,
	}
}
