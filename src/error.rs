use std::fmt::{self, Display};

use nix::{errno::Errno, unistd::Pid};
use rustyline::error::ReadlineError;

use crate::redir::RedirKind;

pub type ShResult<T> = Result<T, ShErr>;

// Every variant but `IoError` is local to a single command.
// The dispatcher prints those and moves on to the next line.

#[derive(Debug)]
pub enum ShErr {
	/// fork() itself failed, nothing was spawned
	SpawnFailure(Errno),
	/// `<` or `>` was the last token on the line
	MalformedRedirection(RedirKind),
	/// The child could not open its redirection target
	RedirTargetUnavailable { kind: RedirKind, path: String },
	/// The program could not be executed
	ExecFailure(String),
	/// A foreground command finished unsuccessfully
	NonZeroExit { command: String, status: i32 },
	/// waitpid(WNOHANG) failed for a tracked job
	ReapCheckFailure { pid: Pid, errno: Errno },
	/// Waiting on a foreground child failed
	WaitFailure { pid: Pid, errno: Errno },
	IoError(std::io::Error),
	Config(String),
}

impl ShErr {
	/// Fatal errors end the read loop, everything else only skips the current line
	pub fn is_fatal(&self) -> bool {
		match self {
			ShErr::IoError(..) => true,
			ShErr::SpawnFailure(..) |
			ShErr::MalformedRedirection(..) |
			ShErr::RedirTargetUnavailable { .. } |
			ShErr::ExecFailure(..) |
			ShErr::NonZeroExit { .. } |
			ShErr::ReapCheckFailure { .. } |
			ShErr::WaitFailure { .. } |
			ShErr::Config(..) => false,
		}
	}
}

impl Display for ShErr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ShErr::SpawnFailure(errno) => write!(f, "Failed to create child process: {}", errno.desc()),
			ShErr::MalformedRedirection(kind) => write!(f, "Invalid {} redirection", kind.describe()),
			ShErr::RedirTargetUnavailable { kind, path } => write!(f, "Failed to open {} file: {}", kind.describe(), path),
			ShErr::ExecFailure(command) => write!(f, "Failed to execute command: {}", command),
			ShErr::NonZeroExit { command, .. } => write!(f, "Command exited with non-zero status: {}", command),
			ShErr::ReapCheckFailure { pid, errno } => write!(f, "Failed to check background process status: PID {} ({})", pid, errno.desc()),
			ShErr::WaitFailure { pid, errno } => write!(f, "Failed to wait for process: PID {} ({})", pid, errno.desc()),
			ShErr::IoError(error) => write!(f, "I/O Error: {}", error),
			ShErr::Config(msg) => write!(f, "Config Error: {}", msg),
		}
	}
}

impl std::error::Error for ShErr {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			ShErr::IoError(error) => Some(error),
			_ => None,
		}
	}
}

impl From<std::io::Error> for ShErr {
	fn from(error: std::io::Error) -> Self {
		Self::IoError(error)
	}
}

impl From<Errno> for ShErr {
	fn from(errno: Errno) -> Self {
		Self::IoError(std::io::Error::from(errno))
	}
}

impl From<ReadlineError> for ShErr {
	fn from(error: ReadlineError) -> Self {
		match error {
			ReadlineError::Io(error) => Self::IoError(error),
			other => Self::IoError(std::io::Error::other(other.to_string())),
		}
	}
}

impl From<serde_json::Error> for ShErr {
	fn from(error: serde_json::Error) -> Self {
		Self::Config(error.to_string())
	}
}
