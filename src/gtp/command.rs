//! GTP request line parsing.

/// A decoded request line: `[id] name [arg]*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub id: Option<i64>,
    /// Empty only when the line carried nothing but an id.
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    /// Borrowed view of the arguments, as handlers take them.
    #[must_use]
    pub fn arg_refs(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Split a line into optional id, command name and arguments.
///
/// Returns `None` for a line with no tokens. A leading token that parses as
/// a base-10 integer is taken as the id.
#[must_use]
pub fn parse_line(line: &str) -> Option<Command> {
    let mut tokens = line.split(is_separator).filter(|t| !t.is_empty()).peekable();
    let first = *tokens.peek()?;

    let id = first.parse::<i64>().ok();
    if id.is_some() {
        tokens.next();
    }
    let name = tokens.next().unwrap_or_default().to_string();
    let args = tokens.map(str::to_string).collect();

    Some(Command { id, name, args })
}
