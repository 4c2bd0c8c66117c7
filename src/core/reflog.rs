//! core::reflog
//!
//! The reflog: an append-only journal of ref and HEAD movements.
//!
//! Every time a branch, tag, remote-tracking ref or HEAD moves, the
//! interpreter appends one [`ReflogEntry`] per moved name, in the order the
//! names moved. HEAD is journaled under the name `"HEAD"`.
//!
//! # Invariants
//!
//! - Entries are never edited or removed, only appended
//! - Entries for one name keep their append order
//! - Relabeling rewrites names and reasons but keeps order
//!
//! # Example
//!
//! ```
//! use gitsketch::core::reflog::Reflog;
//! use gitsketch::core::types::CommitId;
//!
//! let mut reflog = Reflog::new();
//! let a = CommitId::new("a1b2c3d").unwrap();
//! reflog.append("main", None, a.clone(), "commit (initial): first");
//! reflog.append("HEAD", None, a, "commit (initial): first");
//!
//! assert_eq!(reflog.entries_for("main").len(), 1);
//! assert_eq!(reflog.display("HEAD")[0], "HEAD@{0}: commit (initial): first");
//! ```

use std::collections::BTreeMap;

use super::naming::Relabel;
use super::types::CommitId;

/// Name under which HEAD movements are recorded.
pub const HEAD: &str = "HEAD";

/// One ref movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflogEntry {
    /// The ref (or `HEAD`) that moved.
    pub name: String,
    /// Where it pointed before; `None` when it was created.
    pub previous: Option<CommitId>,
    /// Where it points now.
    pub new: CommitId,
    /// Why it moved, e.g. `commit: fix typo`.
    pub reason: String,
}

/// Per-name, append-only movement journal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reflog {
    logs: BTreeMap<String, Vec<ReflogEntry>>,
}

impl Reflog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry for `name`.
    pub fn append(
        &mut self,
        name: impl Into<String>,
        previous: Option<CommitId>,
        new: CommitId,
        reason: impl Into<String>,
    ) {
        let name = name.into();
        let entry = ReflogEntry {
            name: name.clone(),
            previous,
            new,
            reason: reason.into(),
        };
        self.logs.entry(name).or_default().push(entry);
    }

    /// Append a fully built entry (used when restoring saved state).
    pub fn push(&mut self, entry: ReflogEntry) {
        self.logs.entry(entry.name.clone()).or_default().push(entry);
    }

    /// Drop `name`'s whole log, as when its branch is deleted.
    pub fn remove(&mut self, name: &str) -> Vec<ReflogEntry> {
        self.logs.remove(name).unwrap_or_default()
    }

    /// Entries for `name`, oldest first. Empty if the name never moved.
    pub fn entries_for(&self, name: &str) -> &[ReflogEntry] {
        self.logs.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names with at least one entry, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.logs.keys().map(String::as_str)
    }

    /// All logs, sorted by name.
    pub fn logs(&self) -> impl Iterator<Item = (&str, &[ReflogEntry])> {
        self.logs.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.logs.values().all(Vec::is_empty)
    }

    /// Total number of entries across all names.
    pub fn len(&self) -> usize {
        self.logs.values().map(Vec::len).sum()
    }

    /// Render `name`'s log newest first, as `name@{n}: reason`.
    pub fn display(&self, name: &str) -> Vec<String> {
        self.entries_for(name)
            .iter()
            .rev()
            .enumerate()
            .map(|(n, entry)| format!("{name}@{{{n}}}: {}", entry.reason))
            .collect()
    }

    /// Rewrite a branch label in every name and reason.
    ///
    /// If both the old and the new name already have logs, the renamed log is
    /// appended after the existing one so neither loses its order.
    /// Applying the same relabel twice changes nothing the second time.
    pub fn relabel(&mut self, relabel: &Relabel<'_>) {
        if relabel.is_noop() {
            return;
        }

        let logs = std::mem::take(&mut self.logs);
        for (name, entries) in logs {
            let renamed = relabel.label_or_keep(&name);
            let target = self.logs.entry(renamed).or_default();
            target.extend(entries.into_iter().map(|entry| ReflogEntry {
                name: relabel.label_or_keep(&entry.name),
                previous: entry.previous,
                new: entry.new,
                reason: relabel.text(&entry.reason),
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> CommitId {
        CommitId::new(s).unwrap()
    }

    mod journal {
        use super::*;

        #[test]
        fn empty_name_has_no_entries() {
            let reflog = Reflog::new();
            assert!(reflog.entries_for("main").is_empty());
            assert!(reflog.is_empty());
        }

        #[test]
        fn removing_a_name_leaves_the_others() {
            let mut reflog = Reflog::new();
            reflog.append("main", None, id("c1"), "commit (initial): one");
            reflog.append("topic", None, id("c1"), "branch: Created from HEAD");

            assert_eq!(reflog.remove("topic").len(), 1);
            assert!(reflog.entries_for("topic").is_empty());
            assert_eq!(reflog.entries_for("main").len(), 1);
            assert!(reflog.remove("topic").is_empty());
        }

        #[test]
        fn entries_are_oldest_first() {
            let mut reflog = Reflog::new();
            reflog.append("main", None, id("c1"), "commit: one");
            reflog.append("main", Some(id("c1")), id("c2"), "commit: two");

            let entries = reflog.entries_for("main");
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].reason, "commit: one");
            assert_eq!(entries[1].previous, Some(id("c1")));
            assert_eq!(reflog.len(), 2);
        }

        #[test]
        fn display_is_newest_first() {
            let mut reflog = Reflog::new();
            reflog.append(HEAD, None, id("c1"), "commit: one");
            reflog.append(HEAD, Some(id("c1")), id("c2"), "commit: two");
            assert_eq!(
                reflog.display(HEAD),
                vec!["HEAD@{0}: commit: two", "HEAD@{1}: commit: one"]
            );
        }

        #[test]
        fn names_are_sorted() {
            let mut reflog = Reflog::new();
            reflog.append("topic", None, id("c1"), "branch: Created from HEAD");
            reflog.append(HEAD, None, id("c1"), "commit: one");
            reflog.append("main", None, id("c1"), "commit: one");
            let names: Vec<_> = reflog.names().collect();
            assert_eq!(names, vec!["HEAD", "main", "topic"]);
        }
    }

    mod relabel {
        use super::*;

        fn legacy() -> Relabel<'static> {
            Relabel::new("master", "main").with_remote("origin")
        }

        #[test]
        fn renames_keys_names_and_reasons() {
            let mut reflog = Reflog::new();
            reflog.append("master", None, id("c1"), "commit: one");
            reflog.append(HEAD, None, id("c1"), "checkout: moving from master to topic");
            reflog.relabel(&legacy());

            assert!(reflog.entries_for("master").is_empty());
            assert_eq!(reflog.entries_for("main")[0].name, "main");
            assert_eq!(
                reflog.entries_for(HEAD)[0].reason,
                "checkout: moving from main to topic"
            );
        }

        #[test]
        fn remote_tracking_log_is_renamed() {
            let mut reflog = Reflog::new();
            reflog.append("origin/master", None, id("c1"), "fetch: fast-forward");
            reflog.relabel(&legacy());
            assert_eq!(reflog.entries_for("origin/main").len(), 1);
        }

        #[test]
        fn collision_keeps_both_in_order() {
            let mut reflog = Reflog::new();
            reflog.append("main", None, id("c1"), "first");
            reflog.append("master", None, id("c2"), "second");
            reflog.relabel(&legacy());

            let reasons: Vec<_> = reflog
                .entries_for("main")
                .iter()
                .map(|e| e.reason.as_str())
                .collect();
            assert_eq!(reasons, vec!["first", "second"]);
        }

        #[test]
        fn idempotent() {
            let mut reflog = Reflog::new();
            reflog.append("master", None, id("c1"), "merge origin/master: Fast-forward");
            reflog.relabel(&legacy());
            let once = reflog.clone();
            reflog.relabel(&legacy());
            assert_eq!(reflog, once);
        }
    }
}
