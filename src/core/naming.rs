//! core::naming
//!
//! Default-branch relabeling.
//!
//! Older saved states call the default branch `master`; current ones call it
//! `main`. Relabeling rewrites a label wherever it appears: as a ref name, as
//! the remote-tracking form (`origin/master`), in full ref paths
//! (`refs/heads/master`) and inside reflog reason text.
//!
//! # Idempotence
//!
//! Reason text is rewritten token by token, where a token is a run of
//! characters that may appear in a ref name. Only tokens that *equal* the old
//! label (optionally followed by a revision suffix) are replaced, so a second
//! pass finds nothing left to rewrite: `main-old` is never touched while
//! renaming `main`.

/// A rename of one branch label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relabel<'a> {
    pub from: &'a str,
    pub to: &'a str,
    /// Remote whose tracking refs follow the rename (`origin/<from>`).
    pub remote: Option<&'a str>,
}

impl<'a> Relabel<'a> {
    pub fn new(from: &'a str, to: &'a str) -> Self {
        Self {
            from,
            to,
            remote: None,
        }
    }

    pub fn with_remote(mut self, remote: &'a str) -> Self {
        self.remote = Some(remote);
        self
    }

    /// True if the rename changes nothing.
    pub fn is_noop(&self) -> bool {
        self.from == self.to || self.from.is_empty()
    }

    /// Rename a whole label. Returns `None` when the label is unaffected.
    ///
    /// # Example
    ///
    /// ```
    /// use gitsketch::core::naming::Relabel;
    ///
    /// let relabel = Relabel::new("master", "main").with_remote("origin");
    /// assert_eq!(relabel.label("master").as_deref(), Some("main"));
    /// assert_eq!(relabel.label("origin/master").as_deref(), Some("origin/main"));
    /// assert_eq!(relabel.label("refs/heads/master").as_deref(), Some("refs/heads/main"));
    /// assert_eq!(relabel.label("master-old"), None);
    /// ```
    pub fn label(&self, label: &str) -> Option<String> {
        if self.is_noop() {
            return None;
        }
        if label == self.from {
            return Some(self.to.to_string());
        }

        let mut prefixes = vec!["refs/heads/".to_string()];
        if let Some(remote) = self.remote {
            prefixes.push(format!("{remote}/"));
            prefixes.push(format!("refs/remotes/{remote}/"));
        }

        prefixes.iter().find_map(|prefix| {
            (label.strip_prefix(prefix.as_str()) == Some(self.from))
                .then(|| format!("{prefix}{}", self.to))
        })
    }

    /// Rename a label, keeping it when unaffected.
    pub fn label_or_keep(&self, label: &str) -> String {
        self.label(label).unwrap_or_else(|| label.to_string())
    }

    /// Rewrite every occurrence of the label inside free text.
    ///
    /// # Example
    ///
    /// ```
    /// use gitsketch::core::naming::Relabel;
    ///
    /// let relabel = Relabel::new("master", "main").with_remote("origin");
    /// assert_eq!(
    ///     relabel.text("checkout: moving from master to origin/master~1"),
    ///     "checkout: moving from main to origin/main~1"
    /// );
    /// assert_eq!(relabel.text("Merge branch 'master'."), "Merge branch 'main'.");
    /// ```
    pub fn text(&self, text: &str) -> String {
        if self.is_noop() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut token = String::new();
        for c in text.chars() {
            if is_token_char(c) {
                token.push(c);
            } else {
                self.flush_token(&mut token, &mut out);
                out.push(c);
            }
        }
        self.flush_token(&mut token, &mut out);
        out
    }

    fn flush_token(&self, token: &mut String, out: &mut String) {
        if token.is_empty() {
            return;
        }

        // Sentence punctuation is not part of the label.
        let trimmed = token.trim_end_matches('.');
        let trailing = &token[trimmed.len()..];

        // A revision suffix (`~2`, `^`) stays attached to whatever label it follows.
        let split = trimmed.find(['~', '^']).unwrap_or(trimmed.len());
        let (label, suffix) = trimmed.split_at(split);

        match self.label(label) {
            Some(renamed) => {
                out.push_str(&renamed);
                out.push_str(suffix);
                out.push_str(trailing);
            }
            None => out.push_str(token),
        }
        token.clear();
    }
}

fn is_token_char(c: char) -> bool {
    !c.is_whitespace()
        && !matches!(
            c,
            '\'' | '"' | '`' | ',' | ';' | ':' | '(' | ')' | '[' | ']' | '{' | '}' | '<' | '>'
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy() -> Relabel<'static> {
        Relabel::new("master", "main").with_remote("origin")
    }

    #[test]
    fn labels_are_renamed_exactly() {
        let r = legacy();
        assert_eq!(r.label("master").as_deref(), Some("main"));
        assert_eq!(r.label("Master"), None);
        assert_eq!(r.label("masterful"), None);
        assert_eq!(r.label("upstream/master"), None);
    }

    #[test]
    fn remote_forms_need_remote() {
        let r = Relabel::new("master", "main");
        assert_eq!(r.label("origin/master"), None);
        assert_eq!(r.label("refs/heads/master").as_deref(), Some("refs/heads/main"));
    }

    #[test]
    fn text_keeps_separators() {
        let r = legacy();
        assert_eq!(
            r.text("merge master: Fast-forward"),
            "merge main: Fast-forward"
        );
        assert_eq!(r.text("  master\tmaster "), "  main\tmain ");
    }

    #[test]
    fn text_ignores_longer_tokens() {
        let r = Relabel::new("main", "trunk");
        assert_eq!(r.text("branch main-old from main"), "branch main-old from trunk");
    }

    #[test]
    fn text_is_idempotent() {
        let r = Relabel::new("main", "main-line").with_remote("origin");
        let once = r.text("checkout: moving from main to origin/main");
        let twice = r.text(&once);
        assert_eq!(once, "checkout: moving from main-line to origin/main-line");
        assert_eq!(once, twice);
    }

    #[test]
    fn noop_relabel() {
        let r = Relabel::new("main", "main");
        assert!(r.is_noop());
        assert_eq!(r.text("main"), "main");
        assert_eq!(r.label("main"), None);
    }
}
