use futures_util::future::BoxFuture;

use super::context::Context;
use super::result::CommandOutcome;

/// Entry point of a leaf command. `args` are the words after the command path.
pub type Handler = for<'a> fn(&'a [String], &'a mut Context) -> BoxFuture<'a, CommandOutcome>;

/// A registry entry: either runnable or a group of subcommands.
pub enum Command {
    Leaf {
        help: &'static str,
        handler: Handler,
    },
    Container {
        help: &'static str,
        subcommands: Registry,
    },
}

impl Command {
    pub fn leaf(help: &'static str, handler: Handler) -> Self {
        Self::Leaf { help, handler }
    }

    pub fn container(help: &'static str, subcommands: Registry) -> Self {
        Self::Container { help, subcommands }
    }

    pub fn help(&self) -> &'static str {
        match self {
            Self::Leaf { help, .. } | Self::Container { help, .. } => help,
        }
    }

    pub fn subcommands(&self) -> Option<&Registry> {
        match self {
            Self::Leaf { .. } => None,
            Self::Container { subcommands, .. } => Some(subcommands),
        }
    }
}

/// How a command line maps onto the registry.
#[derive(Debug, Clone, Copy)]
pub enum Resolution<'r> {
    /// Run `handler` with the words from index `consumed` on.
    Run { handler: Handler, consumed: usize },
    /// The path ended on a container without a valid subcommand.
    MissingSubcommand,
    /// The first word names no command.
    Unknown(&'r str),
}

/// Insertion-ordered command table.
#[derive(Default)]
pub struct Registry {
    entries: Vec<(&'static str, Command)>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, name: &'static str, command: Command) -> Self {
        self.insert(name, command);
        self
    }

    /// Add `command`. A repeated name replaces the entry in place.
    pub fn insert(&mut self, name: &'static str, command: Command) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = command,
            None => self.entries.push((name, command)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, command)| command)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Command)> {
        self.entries.iter().map(|(name, command)| (*name, command))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resolve<'r>(&self, words: &'r [String]) -> Resolution<'r> {
        let Some(first) = words.first() else {
            return Resolution::MissingSubcommand;
        };
        let Some(mut command) = self.get(first) else {
            return Resolution::Unknown(first);
        };

        let mut consumed = 1;
        loop {
            match command {
                Command::Leaf { handler, .. } => {
                    return Resolution::Run {
                        handler: *handler,
                        consumed,
                    }
                }
                Command::Container { subcommands, .. } => {
                    match words.get(consumed).and_then(|w| subcommands.get(w)) {
                        Some(next) => {
                            command = next;
                            consumed += 1;
                        }
                        None => return Resolution::MissingSubcommand,
                    }
                }
            }
        }
    }

    /// Help text: each name, its help one level in, subcommands one level further.
    pub fn help_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.push_help(0, &mut lines);
        lines
    }

    fn push_help(&self, depth: usize, lines: &mut Vec<String>) {
        for (name, command) in self.iter() {
            lines.push(format!("{}{name}", indent(depth)));
            lines.push(format!("{}{}", indent(depth + 1), command.help()));
            if let Some(subcommands) = command.subcommands() {
                subcommands.push_help(depth + 1, lines);
            }
        }
    }
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, _)| name))
            .finish()
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Leaf { help, .. } => f.debug_struct("Leaf").field("help", help).finish(),
            Self::Container { help, subcommands } => f
                .debug_struct("Container")
                .field("help", help)
                .field("subcommands", subcommands)
                .finish(),
        }
    }
}
