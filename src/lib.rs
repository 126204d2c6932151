//! A small line-oriented command interpreter.
//!
//! Each line is either a builtin (`exit`, `myjobs`) or an external program, optionally
//! with `<`/`>` redirection and a trailing `&` to run it in the background. Background
//! processes are tracked in a [`jobs::JobTable`] and reaped without blocking before every
//! new line.

pub mod error;
pub mod jobs;
pub mod launch;
pub mod prompt;
pub mod redir;
pub mod shell;
pub mod shopt;
pub mod token;

pub use error::{ShErr, ShResult};
pub use shell::{Flow, Shell};
