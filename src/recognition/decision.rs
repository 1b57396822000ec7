//! Threshold decision and symbol to command resolution

use super::config::DEFAULT_THRESHOLD;
use super::matcher::BestMatch;
use std::collections::HashMap;
use std::fmt;

/// Abstract command a recognized symbol stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Left,
    Right,
    Up,
    Down,
    Front,
    Back,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::Left,
        Command::Right,
        Command::Up,
        Command::Down,
        Command::Front,
        Command::Back,
    ];

    /// Key identifier handed to the key-injection collaborator.
    pub fn key(&self) -> &'static str {
        match self {
            Command::Left => "left",
            Command::Right => "right",
            Command::Up => "up",
            Command::Down => "down",
            Command::Front => "w",
            Command::Back => "s",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Left => "LEFT",
            Command::Right => "RIGHT",
            Command::Up => "UP",
            Command::Down => "DOWN",
            Command::Front => "FRONT",
            Command::Back => "BACK",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of looking a symbol up in the command table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResolution {
    Mapped(Command),
    /// Recognized symbol without a table entry; acts as a no-op
    Unmapped,
}

impl CommandResolution {
    pub fn command(&self) -> Option<Command> {
        match self {
            CommandResolution::Mapped(command) => Some(*command),
            CommandResolution::Unmapped => None,
        }
    }
}

impl fmt::Display for CommandResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResolution::Mapped(command) => fmt::Display::fmt(command, f),
            CommandResolution::Unmapped => f.write_str("(none)"),
        }
    }
}

/// Read-only symbol to command table.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandTable {
    entries: HashMap<String, Command>,
}

impl Default for CommandTable {
    fn default() -> Self {
        let entries = ["A", "B", "C", "D", "E", "F"]
            .into_iter()
            .zip(Command::ALL)
            .map(|(symbol, command)| (symbol.to_string(), command))
            .collect();
        Self { entries }
    }
}

impl CommandTable {
    pub fn resolve(&self, symbol: &str) -> CommandResolution {
        self.entries
            .get(symbol)
            .copied()
            .map_or(CommandResolution::Unmapped, CommandResolution::Mapped)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of one classification after thresholding.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Accepted symbol, `None` when the best score fell below the threshold
    pub symbol: Option<String>,
    /// Best score seen, reported even on rejection
    pub score: f32,
}

impl MatchResult {
    pub fn is_recognized(&self) -> bool {
        self.symbol.is_some()
    }
}

/// Applies the acceptance threshold and resolves commands.
#[derive(Debug, Clone)]
pub struct DecisionPolicy {
    threshold: f32,
    commands: CommandTable,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, CommandTable::default())
    }
}

impl DecisionPolicy {
    pub fn new(threshold: f32, commands: CommandTable) -> Self {
        Self {
            threshold,
            commands,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn decide(&self, best: BestMatch) -> MatchResult {
        let accepted = best.score >= self.threshold;
        MatchResult {
            symbol: best.name.filter(|_| accepted),
            score: best.score,
        }
    }

    pub fn resolve(&self, symbol: &str) -> CommandResolution {
        self.commands.resolve(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn best(name: &str, score: f32) -> BestMatch {
        BestMatch {
            name: Some(name.to_string()),
            score,
        }
    }

    #[test]
    fn test_symbol_a_maps_to_left_key() {
        let policy = DecisionPolicy::default();
        let result = policy.decide(best("A", 0.91));
        assert_eq!(result.symbol.as_deref(), Some("A"));
        let resolution = policy.resolve("A");
        assert_eq!(resolution, CommandResolution::Mapped(Command::Left));
        assert_eq!(resolution.command().map(|c| c.key()), Some("left"));
    }

    #[test]
    fn test_full_command_and_key_tables() {
        let table = CommandTable::default();
        let expected = [
            ("A", "LEFT", "left"),
            ("B", "RIGHT", "right"),
            ("C", "UP", "up"),
            ("D", "DOWN", "down"),
            ("E", "FRONT", "w"),
            ("F", "BACK", "s"),
        ];
        assert_eq!(table.len(), expected.len());
        for (symbol, command, key) in expected {
            let resolved = table.resolve(symbol).command().unwrap();
            assert_eq!(resolved.to_string(), command);
            assert_eq!(resolved.key(), key);
        }
    }

    #[test]
    fn test_unknown_symbol_resolves_to_none() {
        let resolution = CommandTable::default().resolve("G");
        assert_eq!(resolution, CommandResolution::Unmapped);
        assert_eq!(resolution.to_string(), "(none)");
        assert_eq!(resolution.command(), None);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let policy = DecisionPolicy::default();
        assert!(policy.decide(best("B", 0.75)).is_recognized());
        assert!(!policy.decide(best("B", 0.7499)).is_recognized());
    }

    #[test]
    fn test_rejection_reports_true_maximum() {
        let policy = DecisionPolicy::default();
        let result = policy.decide(best("C", 0.5));
        assert_eq!(result.symbol, None);
        assert_eq!(result.score, 0.5);
    }

    #[test]
    fn test_no_templates_is_rejected() {
        let result = DecisionPolicy::new(-1.0, CommandTable::default()).decide(BestMatch {
            name: None,
            score: -1.0,
        });
        assert_eq!(result.symbol, None);
    }
}
