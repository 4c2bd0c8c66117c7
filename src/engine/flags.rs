//! engine::flags
//!
//! Command-line tokenizing and flag parsing.
//!
//! A typed line such as `git checkout -b feature base` goes through two
//! steps before it reaches the interpreter:
//!
//! 1. [`tokenize`] splits it into words, honoring single and double quotes
//! 2. [`parse_flags`] turns the words after the command name into a
//!    [`FlagMap`]: flags by name (short and long aliases both present) and
//!    everything else collected positionally
//!
//! Flags listed in [`VALUE_FLAGS`] take the next word as their value; all
//! other flags are switches. Short switches may be clustered (`-fd`).
//!
//! # Example
//!
//! ```
//! use gitsketch::engine::flags::{parse_flags, tokenize, FlagValue};
//!
//! let words = tokenize(r#"commit -m "first commit" --amend"#).unwrap();
//! let flags = parse_flags(&words[1..]);
//! assert_eq!(flags.value("m"), Some("first commit"));
//! assert_eq!(flags.value("message"), Some("first commit"));
//! assert!(flags.has("amend"));
//! assert!(flags.positional.is_empty());
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

/// Errors from tokenizing a command line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlagError {
    #[error("unterminated quote in: {0}")]
    UnterminatedQuote(String),
}

/// Flags that consume the following word as their value.
pub const VALUE_FLAGS: &[&str] = &[
    "b",
    "B",
    "c",
    "C",
    "create",
    "force-create",
    "m",
    "message",
];

/// Short and long spellings of the same flag.
const ALIASES: &[(&str, &str)] = &[
    ("c", "create"),
    ("C", "force-create"),
    ("m", "message"),
    ("f", "force"),
    ("d", "delete"),
    ("a", "all"),
];

/// The value recorded for one flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    /// Present without a value (`--amend`).
    Switch,
    /// Present with a value (`-m msg`).
    Value(String),
}

/// Parsed flags and positional arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagMap {
    /// Words that are not flags or flag values, in order.
    pub positional: Vec<String>,
    /// Flags by name; aliases appear under every spelling.
    pub flags: BTreeMap<String, FlagValue>,
}

impl FlagMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from positionals alone.
    pub fn with_positional(positional: Vec<String>) -> Self {
        Self {
            positional,
            flags: BTreeMap::new(),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    /// The flag's value, if it was given one.
    pub fn value(&self, name: &str) -> Option<&str> {
        match self.flags.get(name) {
            Some(FlagValue::Value(v)) => Some(v),
            _ => None,
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FlagValue) {
        self.flags.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<FlagValue> {
        self.flags.remove(name)
    }

    /// Flag names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.flags.keys().map(String::as_str)
    }

    /// Names of the flags that are present out of `names`.
    pub fn present<'a>(&self, names: &[&'a str]) -> Vec<&'a str> {
        names.iter().copied().filter(|n| self.has(n)).collect()
    }
}

/// Split a line into words. Quotes group words and are removed.
pub fn tokenize(line: &str) -> Result<Vec<String>, FlagError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(FlagError::UnterminatedQuote(line.to_string()));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Parse the words after a command name into a [`FlagMap`].
///
/// A value flag at the end of the line with nothing after it is recorded
/// as a switch; the command decides whether that is an error.
pub fn parse_flags<S: AsRef<str>>(words: &[S]) -> FlagMap {
    let mut map = FlagMap::new();
    let mut iter = words.iter().map(|w| w.as_ref());

    while let Some(word) = iter.next() {
        if word == "--" {
            map.positional.extend(iter.by_ref().map(str::to_string));
            break;
        }

        if let Some(long) = word.strip_prefix("--") {
            match long.split_once('=') {
                Some((name, value)) => {
                    insert_aliased(&mut map, name, FlagValue::Value(value.into()))
                }
                None => {
                    let value = take_value(long, &mut iter);
                    insert_aliased(&mut map, long, value);
                }
            }
            continue;
        }

        match word.strip_prefix('-') {
            Some(shorts) if !shorts.is_empty() && !shorts.starts_with(char::is_numeric) => {
                let chars: Vec<char> = shorts.chars().collect();
                for (i, c) in chars.iter().enumerate() {
                    let name = c.to_string();
                    let last = i + 1 == chars.len();
                    if VALUE_FLAGS.contains(&name.as_str()) {
                        // `-mfix` carries its value inline; `-m fix` takes the next word.
                        let value = if last {
                            take_value(&name, &mut iter)
                        } else {
                            FlagValue::Value(chars[i + 1..].iter().collect())
                        };
                        insert_aliased(&mut map, &name, value);
                        break;
                    }
                    insert_aliased(&mut map, &name, FlagValue::Switch);
                }
            }
            _ => map.positional.push(word.to_string()),
        }
    }

    map
}

fn take_value<'a>(name: &str, iter: &mut impl Iterator<Item = &'a str>) -> FlagValue {
    if !VALUE_FLAGS.contains(&name) {
        return FlagValue::Switch;
    }
    match iter.next() {
        Some(value) => FlagValue::Value(value.to_string()),
        None => FlagValue::Switch,
    }
}

fn insert_aliased(map: &mut FlagMap, name: &str, value: FlagValue) {
    for (short, long) in ALIASES {
        if name == *short {
            map.insert(*long, value.clone());
        } else if name == *long {
            map.insert(*short, value.clone());
        }
    }
    map.insert(name, value);
}

/// Rewrite a `switch` invocation into the equivalent `checkout`.
///
/// With a creation flag (`-c`/`--create`, or `-C`/`--force-create`) the
/// flag is removed, its value moves to `b` (or `B`) and the remaining
/// positionals are forwarded as the arguments. A creation flag without a
/// name still moves, as a bare switch, so `checkout` rejects it. Without
/// one, the arguments are forwarded unchanged and become the positionals.
/// The graph is never touched.
///
/// # Example
///
/// ```
/// use gitsketch::engine::flags::{translate_switch, FlagMap, FlagValue};
///
/// let mut flags = FlagMap::with_positional(vec!["base".into()]);
/// flags.insert("c", FlagValue::Value("feature".into()));
///
/// let args: Vec<String> = vec!["-c".into(), "feature".into(), "base".into()];
/// let (args, flags) = translate_switch(&args, flags);
/// assert_eq!(args, vec!["base"]);
/// assert_eq!(flags.value("b"), Some("feature"));
/// assert!(!flags.has("c"));
/// ```
pub fn translate_switch(args: &[String], mut flags: FlagMap) -> (Vec<String>, FlagMap) {
    for (short, long, target) in [("c", "create", "b"), ("C", "force-create", "B")] {
        let removed: Vec<FlagValue> = [short, long]
            .into_iter()
            .filter_map(|name| flags.remove(name))
            .collect();
        if removed.is_empty() {
            continue;
        }
        let value = removed
            .into_iter()
            .find(|v| matches!(v, FlagValue::Value(_)))
            .unwrap_or(FlagValue::Switch);
        flags.insert(target, value);
        return (flags.positional.clone(), flags);
    }

    flags.positional = args.to_vec();
    (args.to_vec(), flags)
}
