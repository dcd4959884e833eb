//! Known player commands, used for input hints and shortcut keys only. The
//! backend interprets free text, so nothing here restricts what may be sent.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub shortcut: Option<char>,
}

const fn spec(name: &'static str, description: &'static str, shortcut: Option<char>) -> CommandSpec {
    CommandSpec {
        name,
        description,
        shortcut,
    }
}

pub const CATALOG: [CommandSpec; 16] = [
    spec("status", "view character status", Some('s')),
    spec("train", "meditate and cultivate", Some('c')),
    spec("explore", "explore the current area", Some('e')),
    spec("inventory", "view carried items", Some('b')),
    spec("skills", "view learned techniques", Some('k')),
    spec("map", "view the map", Some('m')),
    spec("help", "show help", Some('h')),
    spec("attack", "attack a target", Some('a')),
    spec("defend", "take a defensive stance", Some('d')),
    spec("use", "use an item", Some('u')),
    spec("talk", "talk to an npc", Some('t')),
    spec("shop", "browse the shop", None),
    spec("quests", "view quests", Some('q')),
    spec("achievements", "view achievements", None),
    spec("save", "save the game", None),
    spec("quit", "leave the game", None),
];

const COMMON: [&str; 5] = ["status", "train", "explore", "inventory", "help"];
pub const MAX_SUGGESTIONS: usize = 8;

pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    CATALOG.iter().find(|spec| spec.name == name)
}

/// Hints for partially typed input. Blank input lists the common commands.
pub fn suggest(input: &str) -> Vec<&'static CommandSpec> {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return COMMON.iter().filter_map(|name| lookup(name)).collect();
    }
    CATALOG
        .iter()
        .filter(|spec| spec.name.contains(&needle) || spec.description.contains(&needle))
        .take(MAX_SUGGESTIONS)
        .collect()
}

pub fn resolve_shortcut(key: char) -> Option<&'static str> {
    let key = key.to_ascii_lowercase();
    CATALOG
        .iter()
        .find(|spec| spec.shortcut == Some(key))
        .map(|spec| spec.name)
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
