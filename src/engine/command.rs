//! engine::command
//!
//! Typed commands and their outcomes.
//!
//! A command name plus a [`FlagMap`] is turned into one [`Command`] variant
//! before anything touches the graph. Unknown commands, unknown flags,
//! missing arguments and conflicting flags are all rejected here, so the
//! interpreter only ever sees well-formed requests.
//!
//! # Example
//!
//! ```
//! use gitsketch::engine::command::{Command, ResetMode};
//! use gitsketch::engine::flags::parse_flags;
//!
//! let flags = parse_flags(&["--hard", "HEAD~1"]);
//! let command = Command::parse("reset", &flags).unwrap();
//! assert_eq!(
//!     command,
//!     Command::Reset { target: Some("HEAD~1".into()), mode: ResetMode::Hard }
//! );
//! ```

use thiserror::Error;

use super::flags::{FlagMap, FlagValue};
use crate::core::graph::GraphError;
use crate::core::types::{RefName, TypeError};
use crate::core::verify::VerifyError;

/// Errors from parsing or executing a command.
///
/// Every variant is recoverable: a failed command leaves the state as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    InvalidName(#[from] TypeError),

    #[error("'{0}' is not a valid start point")]
    InvalidStartPoint(String),

    #[error("invalid flag combination: {0}")]
    InvalidFlagCombination(String),

    #[error("nothing to do: {0}")]
    UncommittedNoOp(String),

    #[error("unknown command: '{0}'")]
    UnknownCommand(String),

    #[error("{command}: unknown option '{flag}'")]
    UnknownFlag { command: String, flag: String },

    #[error("{command}: missing {what}")]
    MissingArgument { command: String, what: String },

    #[error("cannot delete branch '{0}': HEAD is on it")]
    CannotDeleteCurrentBranch(RefName),

    #[error("cannot force update the current branch '{0}'")]
    CannotForceCurrentBranch(RefName),

    #[error("the branch '{0}' is not fully merged; use -D to delete it anyway")]
    BranchNotMerged(RefName),

    #[error("'{0}' is a {1}, not a branch")]
    NotABranch(RefName, &'static str),

    #[error("no remote is configured")]
    NoRemote,

    #[error("'{0}' does not appear to be a remote")]
    UnknownRemote(String),

    #[error("push of '{0}' rejected: the remote has commits you do not have (use -f to overwrite)")]
    PushRejected(RefName),

    #[error("internal invariant violated: {0}")]
    Verify(#[from] VerifyError),
}

/// `reset` modes. Without a working tree they all move the same refs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetMode {
    Soft,
    #[default]
    Mixed,
    Hard,
}

/// What `branch` should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchAction {
    List { all: bool },
    Create {
        name: String,
        start: Option<String>,
        force: bool,
    },
    Delete { names: Vec<String>, force: bool },
}

/// What `tag` should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagAction {
    List,
    Create { name: String, target: Option<String> },
    Delete { names: Vec<String> },
}

/// Branch creation requested by `checkout -b/-B`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBranch {
    pub name: String,
    /// `-B`: reset the branch if it exists.
    pub force: bool,
}

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Commit {
        message: Option<String>,
        amend: bool,
    },
    Branch(BranchAction),
    Checkout {
        create: Option<CreateBranch>,
        target: Option<String>,
        detach: bool,
    },
    Merge {
        target: String,
        no_ff: bool,
        message: Option<String>,
    },
    Rebase {
        upstream: String,
    },
    Reset {
        target: Option<String>,
        mode: ResetMode,
    },
    Revert {
        target: String,
    },
    Tag(TagAction),
    CherryPick {
        revisions: Vec<String>,
    },
    Reflog {
        name: Option<String>,
    },
    Log {
        target: Option<String>,
    },
    Fetch,
    Push {
        remote: Option<String>,
        branch: Option<String>,
        force: bool,
    },
    Pull,
}

impl Command {
    /// Build a typed command from its name and parsed flags.
    ///
    /// `switch` is not known here; callers rewrite it into `checkout` first.
    pub fn parse(name: &str, flags: &FlagMap) -> Result<Self, CommandError> {
        match name {
            "checkout" => Self::parse_checkout(name, flags),
            "commit" => {
                allow(name, flags, &["m", "message", "amend"])?;
                Ok(Command::Commit {
                    message: value_of(name, flags, "m", "a message after -m")?,
                    amend: flags.has("amend"),
                })
            }
            "branch" => Self::parse_branch(flags),
            "merge" => {
                allow(name, flags, &["no-ff", "m", "message"])?;
                Ok(Command::Merge {
                    target: first(name, flags, "the branch or commit to merge")?,
                    no_ff: flags.has("no-ff"),
                    message: value_of(name, flags, "m", "a message after -m")?,
                })
            }
            "rebase" => {
                allow(name, flags, &[])?;
                Ok(Command::Rebase {
                    upstream: first(name, flags, "the upstream to rebase onto")?,
                })
            }
            "reset" => {
                allow(name, flags, &["soft", "mixed", "hard"])?;
                let mode = match flags.present(&["soft", "mixed", "hard"]).as_slice() {
                    [] | ["mixed"] => ResetMode::Mixed,
                    ["soft"] => ResetMode::Soft,
                    ["hard"] => ResetMode::Hard,
                    many => {
                        return Err(CommandError::InvalidFlagCombination(format!(
                            "--{} cannot be used together",
                            many.join(" and --")
                        )))
                    }
                };
                Ok(Command::Reset {
                    target: flags.positional.first().cloned(),
                    mode,
                })
            }
            "revert" => {
                allow(name, flags, &[])?;
                Ok(Command::Revert {
                    target: first(name, flags, "the commit to revert")?,
                })
            }
            "tag" => Self::parse_tag(flags),
            "cherry-pick" => {
                allow(name, flags, &[])?;
                if flags.positional.is_empty() {
                    return Err(missing(name, "the commits to pick"));
                }
                Ok(Command::CherryPick {
                    revisions: flags.positional.clone(),
                })
            }
            "reflog" => {
                allow(name, flags, &[])?;
                Ok(Command::Reflog {
                    name: flags.positional.first().cloned(),
                })
            }
            "log" => {
                allow(name, flags, &[])?;
                Ok(Command::Log {
                    target: flags.positional.first().cloned(),
                })
            }
            "fetch" => {
                allow(name, flags, &[])?;
                Ok(Command::Fetch)
            }
            "push" => {
                allow(name, flags, &["f", "force"])?;
                Ok(Command::Push {
                    remote: flags.positional.first().cloned(),
                    branch: flags.positional.get(1).cloned(),
                    force: flags.has("force"),
                })
            }
            "pull" => {
                allow(name, flags, &[])?;
                Ok(Command::Pull)
            }
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }

    fn parse_checkout(name: &str, flags: &FlagMap) -> Result<Self, CommandError> {
        allow(name, flags, &["b", "B", "detach"])?;
        let create = match (flags.flags.get("b"), flags.flags.get("B")) {
            (Some(_), Some(_)) => {
                return Err(CommandError::InvalidFlagCombination(
                    "-b and -B cannot be used together".into(),
                ))
            }
            (Some(FlagValue::Value(v)), None) => Some(CreateBranch {
                name: v.clone(),
                force: false,
            }),
            (None, Some(FlagValue::Value(v))) => Some(CreateBranch {
                name: v.clone(),
                force: true,
            }),
            (Some(FlagValue::Switch), None) | (None, Some(FlagValue::Switch)) => {
                return Err(CommandError::InvalidFlagCombination(
                    "creating a branch needs a branch name".into(),
                ))
            }
            (None, None) => None,
        };

        let detach = flags.has("detach");
        if detach && create.is_some() {
            return Err(CommandError::InvalidFlagCombination(
                "--detach cannot be used with -b".into(),
            ));
        }

        let target = flags.positional.first().cloned();
        if create.is_none() && target.is_none() {
            return Err(missing(name, "the branch or commit to check out"));
        }

        Ok(Command::Checkout {
            create,
            target,
            detach,
        })
    }

    fn parse_branch(flags: &FlagMap) -> Result<Self, CommandError> {
        let name = "branch";
        allow(name, flags, &["d", "delete", "D", "f", "force", "a", "all"])?;

        let deleting = flags.has("delete") || flags.has("D");
        if deleting {
            if flags.positional.is_empty() {
                return Err(missing(name, "the branch name to delete"));
            }
            return Ok(Command::Branch(BranchAction::Delete {
                names: flags.positional.clone(),
                force: flags.has("D") || flags.has("force"),
            }));
        }

        match flags.positional.as_slice() {
            [] => Ok(Command::Branch(BranchAction::List {
                all: flags.has("all"),
            })),
            [branch] => Ok(Command::Branch(BranchAction::Create {
                name: branch.clone(),
                start: None,
                force: flags.has("force"),
            })),
            [branch, start, ..] => Ok(Command::Branch(BranchAction::Create {
                name: branch.clone(),
                start: Some(start.clone()),
                force: flags.has("force"),
            })),
        }
    }

    fn parse_tag(flags: &FlagMap) -> Result<Self, CommandError> {
        let name = "tag";
        allow(name, flags, &["d", "delete"])?;

        if flags.has("delete") {
            if flags.positional.is_empty() {
                return Err(missing(name, "the tag name to delete"));
            }
            return Ok(Command::Tag(TagAction::Delete {
                names: flags.positional.clone(),
            }));
        }

        match flags.positional.as_slice() {
            [] => Ok(Command::Tag(TagAction::List)),
            [tag, rest @ ..] => Ok(Command::Tag(TagAction::Create {
                name: tag.clone(),
                target: rest.first().cloned(),
            })),
        }
    }

}

fn allow(command: &str, flags: &FlagMap, allowed: &[&str]) -> Result<(), CommandError> {
    match flags.names().find(|flag| !allowed.contains(flag)) {
        Some(flag) => Err(CommandError::UnknownFlag {
            command: command.to_string(),
            flag: flag.to_string(),
        }),
        None => Ok(()),
    }
}

fn first(command: &str, flags: &FlagMap, what: &str) -> Result<String, CommandError> {
    flags
        .positional
        .first()
        .cloned()
        .ok_or_else(|| missing(command, what))
}

fn value_of(
    command: &str,
    flags: &FlagMap,
    flag: &str,
    what: &str,
) -> Result<Option<String>, CommandError> {
    match flags.flags.get(flag) {
        Some(FlagValue::Value(v)) => Ok(Some(v.clone())),
        Some(FlagValue::Switch) => Err(missing(command, what)),
        None => Ok(None),
    }
}

fn missing(command: &str, what: &str) -> CommandError {
    CommandError::MissingArgument {
        command: command.to_string(),
        what: what.to_string(),
    }
}

/// Output from a command after execution.
///
/// This is what the coordinator shows the user and renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput<T> {
    /// Command succeeded with output.
    Success(T),

    /// Command failed; the state is unchanged.
    Failed {
        /// Error message.
        error: String,
    },
}

impl<T> CommandOutput<T> {
    /// Check if the command succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutput::Success(_))
    }

    /// Check if the command failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, CommandOutput::Failed { .. })
    }

    /// Convert to a Result.
    pub fn into_result(self) -> Result<T, String> {
        match self {
            CommandOutput::Success(v) => Ok(v),
            CommandOutput::Failed { error } => Err(error),
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for CommandOutput<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => CommandOutput::Success(v),
            Err(e) => CommandOutput::Failed {
                error: e.to_string(),
            },
        }
    }
}

/// What a successful command did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// The input line as typed.
    pub command: String,
    /// Summary line, e.g. `Fast-forward`.
    pub message: String,
    /// Listing output (`branch`, `log`, `reflog`, ...), one line each.
    pub lines: Vec<String>,
    /// Whether any state changed.
    pub changed: bool,
}

impl Outcome {
    pub fn changed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            changed: true,
            ..Self::default()
        }
    }

    pub fn unchanged(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn listing(lines: Vec<String>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    pub fn with_lines(mut self, lines: Vec<String>) -> Self {
        self.lines = lines;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::flags::parse_flags;

    fn parse(name: &str, words: &[&str]) -> Result<Command, CommandError> {
        Command::parse(name, &parse_flags(words))
    }

    mod parsing {
        use super::*;

        #[test]
        fn commit_with_message() {
            assert_eq!(
                parse("commit", &["-m", "hi"]).unwrap(),
                Command::Commit {
                    message: Some("hi".into()),
                    amend: false
                }
            );
        }

        #[test]
        fn commit_message_flag_needs_value() {
            assert!(matches!(
                parse("commit", &["-m"]),
                Err(CommandError::MissingArgument { .. })
            ));
        }

        #[test]
        fn unknown_command() {
            assert_eq!(
                parse("stash", &[]),
                Err(CommandError::UnknownCommand("stash".into()))
            );
        }

        #[test]
        fn unknown_flag() {
            assert!(matches!(
                parse("rebase", &["-i", "main"]),
                Err(CommandError::UnknownFlag { .. })
            ));
        }

        #[test]
        fn reset_modes_are_exclusive() {
            assert!(matches!(
                parse("reset", &["--soft", "--hard"]),
                Err(CommandError::InvalidFlagCombination(_))
            ));
            assert_eq!(
                parse("reset", &["--soft"]).unwrap(),
                Command::Reset {
                    target: None,
                    mode: ResetMode::Soft
                }
            );
        }

        #[test]
        fn branch_forms() {
            assert_eq!(
                parse("branch", &[]).unwrap(),
                Command::Branch(BranchAction::List { all: false })
            );
            assert_eq!(
                parse("branch", &["topic", "HEAD~1"]).unwrap(),
                Command::Branch(BranchAction::Create {
                    name: "topic".into(),
                    start: Some("HEAD~1".into()),
                    force: false
                })
            );
            assert_eq!(
                parse("branch", &["-D", "topic"]).unwrap(),
                Command::Branch(BranchAction::Delete {
                    names: vec!["topic".into()],
                    force: true
                })
            );
        }

        #[test]
        fn tag_forms() {
            assert_eq!(parse("tag", &[]).unwrap(), Command::Tag(TagAction::List));
            assert_eq!(
                parse("tag", &["-d", "v1"]).unwrap(),
                Command::Tag(TagAction::Delete {
                    names: vec!["v1".into()]
                })
            );
        }

        #[test]
        fn merge_requires_target() {
            assert!(matches!(
                parse("merge", &[]),
                Err(CommandError::MissingArgument { .. })
            ));
        }
    }

    mod checkout {
        use super::*;

        #[test]
        fn create_and_start_point() {
            assert_eq!(
                parse("checkout", &["-b", "feature", "base"]).unwrap(),
                Command::Checkout {
                    create: Some(CreateBranch {
                        name: "feature".into(),
                        force: false
                    }),
                    target: Some("base".into()),
                    detach: false,
                }
            );
        }

        #[test]
        fn both_create_flags_conflict() {
            assert!(matches!(
                parse("checkout", &["-b", "x", "-B", "y"]),
                Err(CommandError::InvalidFlagCombination(_))
            ));
        }

        #[test]
        fn needs_a_target() {
            assert!(matches!(
                parse("checkout", &[]),
                Err(CommandError::MissingArgument { .. })
            ));
        }

        #[test]
        fn create_flag_without_a_name_is_rejected() {
            for flag in ["-b", "-B"] {
                assert!(matches!(
                    parse("checkout", &[flag]),
                    Err(CommandError::InvalidFlagCombination(_))
                ));
            }
        }

        #[test]
        fn switch_is_not_parsed_directly() {
            assert!(matches!(
                parse("switch", &["feature"]),
                Err(CommandError::UnknownCommand(_))
            ));
        }
    }

    mod outputs {
        use super::*;

        #[test]
        fn result_converts() {
            let ok: CommandOutput<u8> = Ok::<u8, CommandError>(1).into();
            assert!(ok.is_success());
            let failed: CommandOutput<u8> =
                Err::<u8, _>(CommandError::NoRemote).into();
            assert_eq!(
                failed,
                CommandOutput::Failed {
                    error: "no remote is configured".into()
                }
            );
        }
    }
}
