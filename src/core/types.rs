//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier as printed by git (full or abbreviated)
//! - [`Revision`] - A commit a submodule should advance to
//! - [`SubmodulePath`] - Path of a submodule relative to the parent work tree
//! - [`BranchName`] - Validated Git branch name
//!
//! # Validation
//!
//! These types enforce validity at construction time. Every value that ends
//! up as a git argument goes through one of them, so nothing that looks like
//! an option (`-x`, `--foo`) can reach the git executable as a positional.
//!
//! # Examples
//!
//! ```
//! use meta_update::core::types::{BranchName, Oid, Revision, SubmodulePath};
//!
//! let branch = BranchName::new("release/1.0").unwrap();
//! let oid = Oid::new("ABC123DEF4567890").unwrap();
//! let rev = Revision::from(oid.clone());
//! let path = SubmodulePath::new("libs/core").unwrap();
//!
//! assert_eq!(oid.as_str(), "abc123def4567890");
//! assert_eq!(rev.short(), "abc123d");
//! assert!(Revision::new("--upload-pack=x").is_err());
//! assert!(SubmodulePath::new("../escape").is_err());
//! assert!(BranchName::new("invalid..name").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of the abbreviated hash shown in commit message headers.
pub const SHORT_HASH_LEN: usize = 7;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid revision: {0}")]
    InvalidRevision(String),

    #[error("invalid submodule path: {0}")]
    InvalidSubmodulePath(String),
}

/// A Git object identifier.
///
/// Accepts anything git prints as a commit hash: full SHA-1 / SHA-256 or an
/// abbreviation of at least 4 characters. Normalized to lowercase.
///
/// # Example
///
/// ```
/// use meta_update::core::types::Oid;
///
/// let oid = Oid::new("9F3E2D1").unwrap();
/// assert_eq!(oid.as_str(), "9f3e2d1");
/// assert_eq!(oid.short(4), "9f3e");
///
/// assert!(Oid::new("abc").is_err());
/// assert!(Oid::new("not-a-sha").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    const MIN_LEN: usize = 4;
    const MAX_LEN: usize = 64;

    /// Create a new validated object id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not 4..=64 hex characters.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    fn validate(oid: &str) -> Result<(), TypeError> {
        if oid.len() < Self::MIN_LEN || oid.len() > Self::MAX_LEN {
            return Err(TypeError::InvalidOid(format!(
                "expected {} to {} hex characters, got {}",
                Self::MIN_LEN,
                Self::MAX_LEN,
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(format!(
                "'{oid}' is not hexadecimal"
            )));
        }
        Ok(())
    }

    /// Check if this is the null OID git prints for unmerged submodules.
    pub fn is_zero(&self) -> bool {
        self.0.chars().all(|c| c == '0')
    }

    /// Get the first `len` characters (the whole OID when shorter).
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The commit a submodule should be moved to.
///
/// Unlike [`Oid`] this is kept exactly as given: a user may name a commit
/// that does not exist, and that must surface as "commit does not exist"
/// from git rather than as a parse failure. The value only has to be safe
/// to hand to git as a positional argument.
///
/// # Example
///
/// ```
/// use meta_update::core::types::Revision;
///
/// let rev = Revision::new("zzz999").unwrap();
/// assert_eq!(rev.short(), "zzz999");
///
/// let long = Revision::new("def4567890abcdef").unwrap();
/// assert_eq!(long.short(), "def4567");
///
/// assert!(Revision::new("").is_err());
/// assert!(Revision::new("-n").is_err());
/// assert!(Revision::new("a b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Revision(String);

impl Revision {
    /// Create a new validated revision.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRevision` if the value is empty, starts with
    /// `-`, or contains whitespace or control characters.
    pub fn new(rev: impl Into<String>) -> Result<Self, TypeError> {
        let rev = rev.into();
        if rev.is_empty() {
            return Err(TypeError::InvalidRevision(
                "revision cannot be empty".into(),
            ));
        }
        if rev.starts_with('-') {
            return Err(TypeError::InvalidRevision(format!(
                "'{rev}' cannot start with '-'"
            )));
        }
        if rev.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(TypeError::InvalidRevision(format!(
                "'{}' cannot contain whitespace or control characters",
                rev.escape_debug()
            )));
        }
        Ok(Self(rev))
    }

    /// Abbreviated form used in commit message headers.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(SHORT_HASH_LEN) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }

    /// Check whether this revision names exactly the given commit.
    pub fn is_same_commit(&self, oid: &Oid) -> bool {
        self.0.eq_ignore_ascii_case(oid.as_str())
    }

    /// Get the revision as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Oid> for Revision {
    fn from(oid: Oid) -> Self {
        Self(oid.0)
    }
}

impl TryFrom<String> for Revision {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Revision> for String {
    fn from(rev: Revision) -> Self {
        rev.0
    }
}

impl AsRef<str> for Revision {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Path of a submodule relative to the parent repository's work tree.
///
/// This is also the submodule's name for every user-facing purpose.
///
/// # Example
///
/// ```
/// use meta_update::core::types::SubmodulePath;
///
/// assert!(SubmodulePath::new("libA").is_ok());
/// assert!(SubmodulePath::new("third_party/lib-b.rs").is_ok());
///
/// assert!(SubmodulePath::new("").is_err());
/// assert!(SubmodulePath::new("/abs").is_err());
/// assert!(SubmodulePath::new("a/../b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubmodulePath(String);

impl SubmodulePath {
    /// Create a new validated submodule path.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidSubmodulePath` if the path is empty,
    /// absolute, starts with `-`, or contains a `..` component.
    pub fn new(path: impl Into<String>) -> Result<Self, TypeError> {
        let path = path.into();
        Self::validate(&path)?;
        Ok(Self(path))
    }

    fn validate(path: &str) -> Result<(), TypeError> {
        if path.is_empty() {
            return Err(TypeError::InvalidSubmodulePath(
                "path cannot be empty".into(),
            ));
        }
        if path.starts_with('/') {
            return Err(TypeError::InvalidSubmodulePath(format!(
                "'{path}' must be relative"
            )));
        }
        if path.starts_with('-') {
            return Err(TypeError::InvalidSubmodulePath(format!(
                "'{path}' cannot start with '-'"
            )));
        }
        if path.split('/').any(|component| component == "..") {
            return Err(TypeError::InvalidSubmodulePath(format!(
                "'{path}' cannot contain '..'"
            )));
        }
        if path.chars().any(|c| c.is_control()) {
            return Err(TypeError::InvalidSubmodulePath(
                "path cannot contain control characters".into(),
            ));
        }
        Ok(())
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SubmodulePath {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<SubmodulePath> for String {
    fn from(path: SubmodulePath) -> Self {
        path.0
    }
}

impl AsRef<str> for SubmodulePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubmodulePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A branch of the parent repository, as passed to `git push`.
///
/// A subset of `git check-ref-format --branch`: no empty or `.`-leading
/// components, no `.lock` components, no `..` or `@{`, no control or glob
/// characters, and nothing that starts with `-`.
///
/// # Example
///
/// ```
/// use meta_update::core::types::BranchName;
///
/// let name = BranchName::new("master").unwrap();
/// assert_eq!(name.as_str(), "master");
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("branch.lock").is_err());
/// assert!(BranchName::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        match refname_problem(name) {
            Some(problem) => Err(TypeError::InvalidBranchName(format!("'{name}' {problem}"))),
            None => Ok(()),
        }
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why `name` is not a usable branch name, if it is not.
fn refname_problem(name: &str) -> Option<String> {
    const FORBIDDEN: &[char] = &[' ', '~', '^', ':', '\\', '?', '*', '['];

    if name.is_empty() || name == "@" {
        return Some("is reserved or empty".into());
    }
    if name.starts_with('-') {
        return Some("looks like an option".into());
    }
    if name.ends_with('/') || name.ends_with('.') {
        return Some("has a trailing '/' or '.'".into());
    }
    if let Some(seq) = ["..", "@{"].into_iter().find(|seq| name.contains(seq)) {
        return Some(format!("contains '{seq}'"));
    }
    if let Some(c) = name
        .chars()
        .find(|c| c.is_ascii_control() || FORBIDDEN.contains(c))
    {
        return Some(format!("contains {c:?}"));
    }
    name.split('/').find_map(|part| {
        if part.is_empty() {
            Some("has an empty path component".into())
        } else if part.starts_with('.') || part.ends_with(".lock") {
            Some(format!("has an invalid path component '{part}'"))
        } else {
            None
        }
    })
}
