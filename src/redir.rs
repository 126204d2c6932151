use std::path::PathBuf;

use log::trace;

use crate::error::ShErr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirKind {
	Input,
	Output,
}

impl RedirKind {
	pub fn operator(&self) -> &'static str {
		match self {
			RedirKind::Input => "<",
			RedirKind::Output => ">",
		}
	}
	pub fn describe(&self) -> &'static str {
		match self {
			RedirKind::Input => "input",
			RedirKind::Output => "output",
		}
	}
}

/// A tokenized command with its redirection targets pulled out of the argument vector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCommand {
	pub argv: Vec<String>,
	pub infile: Option<PathBuf>,
	pub outfile: Option<PathBuf>,
}

/// Pulls the first `<` and the first `>` (and their operands) out of `argv`.
///
/// A dangling operator is dropped and reported; the rest of the command is kept.
/// Any later `<` or `>` tokens are left in place and reach the program as plain arguments.
pub fn extract_redirs(mut argv: Vec<String>) -> (ParsedCommand, Vec<ShErr>) {
	let mut errors = vec![];
	let infile = take_target(&mut argv, RedirKind::Input, &mut errors);
	let outfile = take_target(&mut argv, RedirKind::Output, &mut errors);
	trace!("extracted redirs: argv={:?} infile={:?} outfile={:?}", argv, infile, outfile);
	(ParsedCommand { argv, infile, outfile }, errors)
}

fn take_target(argv: &mut Vec<String>, kind: RedirKind, errors: &mut Vec<ShErr>) -> Option<PathBuf> {
	let index = argv.iter().position(|arg| arg == kind.operator())?;
	if index + 1 < argv.len() {
		let target = argv.remove(index + 1);
		argv.remove(index);
		Some(PathBuf::from(target))
	} else {
		argv.remove(index);
		errors.push(ShErr::MalformedRedirection(kind));
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::token::split_on;

	fn parse(line: &str) -> (ParsedCommand, Vec<ShErr>) {
		extract_redirs(split_on(line, ' '))
	}

	#[test]
	fn input_and_output() {
		let (cmd, errors) = parse("sort < a.txt > b.txt");
		assert!(errors.is_empty());
		assert_eq!(cmd.argv, vec!["sort"]);
		assert_eq!(cmd.infile, Some(PathBuf::from("a.txt")));
		assert_eq!(cmd.outfile, Some(PathBuf::from("b.txt")));
	}

	#[test]
	fn output_before_input() {
		let (cmd, _) = parse("grep x > out.txt < in.txt");
		assert_eq!(cmd.argv, vec!["grep", "x"]);
		assert_eq!(cmd.infile, Some(PathBuf::from("in.txt")));
		assert_eq!(cmd.outfile, Some(PathBuf::from("out.txt")));
	}

	#[test]
	fn no_redirection() {
		let (cmd, errors) = parse("ls -la");
		assert!(errors.is_empty());
		assert_eq!(cmd.argv, vec!["ls", "-la"]);
		assert_eq!(cmd.infile, None);
		assert_eq!(cmd.outfile, None);
	}

	#[test]
	fn only_first_operator_is_honored() {
		let (cmd, errors) = parse("cat < a < b > c > d");
		assert!(errors.is_empty());
		assert_eq!(cmd.argv, vec!["cat", "<", "b", ">", "d"]);
		assert_eq!(cmd.infile, Some(PathBuf::from("a")));
		assert_eq!(cmd.outfile, Some(PathBuf::from("c")));
	}

	#[test]
	fn dangling_input_operator() {
		let (cmd, errors) = parse("<");
		assert!(cmd.argv.is_empty());
		assert_eq!(cmd.infile, None);
		assert_eq!(errors.len(), 1);
		assert!(matches!(errors[0], ShErr::MalformedRedirection(RedirKind::Input)));
	}

	#[test]
	fn dangling_output_keeps_input() {
		let (cmd, errors) = parse("wc -l < in.txt >");
		assert_eq!(cmd.argv, vec!["wc", "-l"]);
		assert_eq!(cmd.infile, Some(PathBuf::from("in.txt")));
		assert_eq!(cmd.outfile, None);
		assert!(matches!(errors.as_slice(), [ShErr::MalformedRedirection(RedirKind::Output)]));
	}

	#[test]
	fn operators_must_stand_alone() {
		let (cmd, errors) = parse("echo a>b");
		assert!(errors.is_empty());
		assert_eq!(cmd.argv, vec!["echo", "a>b"]);
		assert_eq!(cmd.outfile, None);
	}
}
