//! Boundary adapter turning raw command-line text into a command name plus
//! an ordered list of supplied arguments.
//!
//! The engine never sees a shell syntax tree. Whatever the host parses is
//! reduced to a [`ParsedCommand`] before resolution.

/// A single argument as the user typed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawArgument {
    /// A bare value bound by position.
    Positional { value: String },
    /// `-Name` or `-Name value` (also `-Name:value`).
    Named { name: String, value: Option<String> },
}

impl RawArgument {
    pub fn positional(value: impl Into<String>) -> Self {
        RawArgument::Positional { value: value.into() }
    }

    pub fn named(name: impl Into<String>, value: Option<&str>) -> Self {
        RawArgument::Named {
            name: name.into(),
            value: value.map(str::to_string),
        }
    }
}

/// The last command of a command line, split into its name and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub arguments: Vec<RawArgument>,
}

/// Parse the last command in `input`.
///
/// Pipelines and statement separators outside quotes start a new command, so
/// `Get-AzVM | Stop-AzVM -Force` yields `Stop-AzVM`. Returns `None` for input
/// without any command token.
pub fn parse_command_line(input: &str) -> Option<ParsedCommand> {
    let segment = last_segment(input);
    let mut tokens = tokenize(segment).into_iter();
    let name = tokens.next()?;

    let mut arguments = Vec::new();
    let mut pending: Option<String> = None;

    for token in tokens {
        if let Some(param) = parameter_name(&token) {
            if let Some(prev) = pending.take() {
                arguments.push(RawArgument::Named { name: prev, value: None });
            }
            match param.split_once(':') {
                Some((name, value)) if !value.is_empty() => {
                    arguments.push(RawArgument::named(name, Some(value)));
                }
                Some((name, _)) => pending = Some(name.to_string()),
                None => pending = Some(param.to_string()),
            }
        } else if let Some(prev) = pending.take() {
            arguments.push(RawArgument::Named { name: prev, value: Some(token) });
        } else {
            arguments.push(RawArgument::Positional { value: token });
        }
    }

    if let Some(prev) = pending {
        arguments.push(RawArgument::Named { name: prev, value: None });
    }

    Some(ParsedCommand { name, arguments })
}

/// Returns the parameter name when `token` looks like `-Name`.
/// Negative numbers and a lone dash are values.
fn parameter_name(token: &str) -> Option<&str> {
    let rest = token.strip_prefix('-')?;
    let first = rest.chars().next()?;
    if first.is_alphabetic() || first == '_' || first == '?' {
        Some(rest)
    } else {
        None
    }
}

/// Byte offset where the last command of `input` starts.
///
/// Everything before it (earlier pipeline stages, separators and the
/// whitespace that follows them) is what a completion must leave in place.
pub fn command_offset(input: &str) -> usize {
    let segment = last_segment(input);
    let leading = segment.len() - segment.trim_start().len();
    input.len() - segment.len() + leading
}

/// Slice of `input` after the last unquoted `|` or `;`.
fn last_segment(input: &str) -> &str {
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut depth = 0usize;

    for (idx, ch) in input.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '{' | '(') => depth += 1,
            (None, '}' | ')') => depth = depth.saturating_sub(1),
            (None, '|' | ';') if depth == 0 => start = idx + ch.len_utf8(),
            _ => {}
        }
    }

    &input[start..]
}

/// Split on whitespace, keeping quoted strings and `{...}`/`(...)` groups
/// as single tokens with their delimiters intact.
fn tokenize(segment: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;

    for ch in segment.chars() {
        match quote {
            Some(q) => {
                current.push(ch);
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                '{' | '(' => {
                    depth += 1;
                    current.push(ch);
                }
                '}' | ')' => {
                    depth = depth.saturating_sub(1);
                    current.push(ch);
                }
                c if c.is_whitespace() && depth == 0 => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                }
                c => current.push(c),
            },
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}
