/// Splits `input` on every occurrence of `delim`.
///
/// Splitting is delimiter-exact: two delimiters in a row produce an empty token between
/// them. A trailing delimiter does not produce a trailing empty token, and an empty input
/// produces nothing at all. There is no quoting or escaping, so `echo "a b"` yields the
/// three tokens `echo`, `"a` and `b"`.
pub fn split_on(input: &str, delim: char) -> Vec<String> {
	let mut tokens: Vec<String> = input.split(delim).map(String::from).collect();
	// str::split always yields a final piece, which is empty when the input ends on the delimiter
	if tokens.last().is_some_and(|tk| tk.is_empty()) {
		tokens.pop();
	}
	tokens
}
