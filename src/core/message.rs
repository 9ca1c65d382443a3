//! core::message
//!
//! Commit message composition.
//!
//! The message is a one-line header naming every advanced submodule and its
//! new short hash, followed by one section per submodule carrying the log of
//! commits the pointer moves over.
//!
//! # Example
//!
//! ```
//! use meta_update::core::message::CommitMessage;
//!
//! let mut msg = CommitMessage::new();
//! msg.add_submodule("libA", "def456", "*  def456  - Say \"hi\" (Dev)");
//!
//! assert_eq!(msg.header(), "Updated submodules: libA -> ( def456 ) ");
//! assert_eq!(
//!     msg.render(),
//!     "Updated submodules: libA -> ( def456 ) \n\nSubmodule 'libA' commits: \n*  def456  - Say 'hi' (Dev)"
//! );
//! ```

/// Start of every header.
pub const HEADER_PREFIX: &str = "Updated submodules: ";

/// Header plus per-submodule log sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    header: String,
    body: String,
    entries: usize,
}

impl Default for CommitMessage {
    fn default() -> Self {
        Self::new()
    }
}

impl CommitMessage {
    /// Create a message with an empty submodule list.
    pub fn new() -> Self {
        Self {
            header: HEADER_PREFIX.to_string(),
            body: String::new(),
            entries: 0,
        }
    }

    /// Append a submodule to the header and its log to the body.
    pub fn add_submodule(&mut self, name: &str, short_hash: &str, log: &str) {
        self.header
            .push_str(&format!("{name} -> ( {short_hash} ) "));
        self.body
            .push_str(&format!("\nSubmodule '{name}' commits: \n"));
        self.body.push_str(&normalize_quotes(log));
        self.entries += 1;
    }

    /// The header line.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// The log sections.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Number of submodules listed.
    pub fn len(&self) -> usize {
        self.entries
    }

    /// Whether no submodule was added.
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Full message: header, newline, body.
    pub fn render(&self) -> String {
        format!("{}\n{}", self.header, self.body)
    }
}

/// Replace double quotes with single quotes.
pub fn normalize_quotes(text: &str) -> String {
    text.replace('"', "'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_message_has_bare_header() {
        let msg = CommitMessage::new();
        assert!(msg.is_empty());
        assert_eq!(msg.render(), "Updated submodules: \n");
    }

    #[test]
    fn entries_keep_insertion_order() {
        let mut msg = CommitMessage::new();
        msg.add_submodule("libA", "aaaaaaa", "*  aaaaaaa  - one (A)");
        msg.add_submodule("libB", "bbbbbbb", "*  bbbbbbb  - two (B)");

        assert_eq!(msg.len(), 2);
        assert_eq!(
            msg.header(),
            "Updated submodules: libA -> ( aaaaaaa ) libB -> ( bbbbbbb ) "
        );
        let a = msg.body().find("Submodule 'libA'").unwrap();
        let b = msg.body().find("Submodule 'libB'").unwrap();
        assert!(a < b);
    }

    #[test]
    fn header_quotes_untouched_body_quotes_normalized() {
        let mut msg = CommitMessage::new();
        msg.add_submodule("libA", "abc1234", "*  abc1234  - Fix \"parser\" (Dev)");
        assert!(msg.body().contains("Fix 'parser'"));
        assert!(!msg.body().contains('"'));
    }

    #[test]
    fn empty_log_still_gets_section() {
        let mut msg = CommitMessage::new();
        msg.add_submodule("libA", "abc1234", "");
        assert_eq!(msg.body(), "\nSubmodule 'libA' commits: \n");
    }

    proptest! {
        #[test]
        fn normalized_text_has_no_double_quotes(text in ".*") {
            let out = normalize_quotes(&text);
            prop_assert!(!out.contains('"'));
            prop_assert_eq!(out.chars().count(), text.chars().count());
        }
    }
}
