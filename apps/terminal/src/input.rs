use session_core::{commands::resolve_shortcut, HistoryDirection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Empty line: submits the recalled command, if any.
    Blank,
    Quit,
    Suggest(String),
    /// Zero-based path index.
    Choose(usize),
    Recall(HistoryDirection),
    Refresh,
    ShowStatus,
    Command(String),
}

pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Blank;
    }
    if let Some(prefix) = line.strip_prefix('?') {
        return Input::Suggest(prefix.trim().to_string());
    }
    if let Some(number) = line.strip_prefix('!') {
        return match number.trim().parse::<usize>() {
            Ok(n) if n >= 1 => Input::Choose(n - 1),
            _ => Input::Command(line.to_string()),
        };
    }
    match line {
        ":quit" | ":q" => return Input::Quit,
        ":up" => return Input::Recall(HistoryDirection::Older),
        ":down" => return Input::Recall(HistoryDirection::Newer),
        ":refresh" => return Input::Refresh,
        ":status" => return Input::ShowStatus,
        _ => {}
    }

    let mut chars = line.chars();
    if let (Some(key), None) = (chars.next(), chars.next()) {
        if let Some(command) = resolve_shortcut(key) {
            return Input::Command(command.to_string());
        }
    }
    Input::Command(line.to_string())
}

#[cfg(test)]
#[path = "tests/input_tests.rs"]
mod tests;
