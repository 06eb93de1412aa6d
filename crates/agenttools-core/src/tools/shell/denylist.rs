//! Denylist of dangerous command fragments
//!
//! Matching is plain case-insensitive substring containment. It both
//! over-blocks (a benign command that happens to contain a fragment) and
//! under-blocks (obfuscated spellings, variables, quoting). It is a
//! tripwire for obvious destructive commands, not a sandbox.

/// Built-in fragments, in match order
pub const DEFAULT_DENYLIST: &[&str] = &[
    // Recursive deletes
    "rm -rf",
    "rm -fr",
    "remove-item -recurse",
    "rd /s",
    "rmdir /s",
    "del /s",
    // Disk formatting and raw device writes
    "mkfs",
    "format c:",
    "diskpart",
    "dd if=/dev/",
    "> /dev/sd",
    // Fork bombs
    ":(){",
];

/// An ordered, immutable set of lower-cased fragments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denylist {
    fragments: Vec<String>,
}

impl Denylist {
    /// Build from fragments. Blank entries and duplicates are dropped,
    /// first occurrence wins.
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for fragment in fragments {
            let normalized = fragment.as_ref().trim().to_lowercase();
            if normalized.is_empty() || out.contains(&normalized) {
                continue;
            }
            out.push(normalized);
        }
        Self { fragments: out }
    }

    /// A denylist that blocks nothing
    pub fn empty() -> Self {
        Self {
            fragments: Vec::new(),
        }
    }

    /// First fragment contained in `command`, if any
    pub fn matched(&self, command: &str) -> Option<&str> {
        let normalized = command.trim().to_lowercase();
        self.fragments
            .iter()
            .find(|fragment| normalized.contains(fragment.as_str()))
            .map(|s| s.as_str())
    }

    pub fn is_blocked(&self, command: &str) -> bool {
        self.matched(command).is_some()
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl Default for Denylist {
    fn default() -> Self {
        Self::new(DEFAULT_DENYLIST)
    }
}
