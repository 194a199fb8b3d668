//! Classification of a single input line.

/// What the chat loop should do with one line of input.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// `/exit`, `/quit` or `q`.
    Exit,
    /// `/clear`: reset history to the system instruction.
    Clear,
    /// Empty or whitespace-only line.
    Blank,
    /// Anything else, kept exactly as typed.
    Chat(String),
}

pub fn parse(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Blank;
    }

    match trimmed.to_lowercase().as_str() {
        "/exit" | "/quit" | "q" => Command::Exit,
        "/clear" => Command::Clear,
        _ => Command::Chat(line.to_string()),
    }
}
