//! git::parse
//!
//! Parsers for the git output formats the CLI backend consumes.
//!
//! All parsers are pure functions over `&str` so they can be tested against
//! captured output without a repository.

use crate::core::types::{Oid, SubmodulePath};

use super::interface::{StatusEntry, StatusFlag, SubmoduleStatus};

/// Marker git writes for gitlink changes in a diff.
pub const SUBPROJECT_MARKER: &str = "Subproject commit ";

/// Parse `git submodule status` output.
///
/// Each line is `<flag><sha> <path>` optionally followed by ` (<describe>)`.
/// Blank lines are ignored.
///
/// # Errors
///
/// Returns a description of the first malformed line.
pub fn parse_submodule_status(output: &str) -> Result<Vec<SubmoduleStatus>, String> {
    let mut statuses = Vec::new();

    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        let mut chars = line.chars();
        let flag_char = chars.next().unwrap_or(' ');
        let flag = StatusFlag::from_char(flag_char)
            .ok_or_else(|| format!("unknown status flag '{flag_char}' in line: {line}"))?;
        let rest = chars.as_str();

        let (sha, tail) = rest
            .split_once(' ')
            .ok_or_else(|| format!("missing path in line: {line}"))?;

        let path = match tail.rsplit_once(" (") {
            Some((path, describe)) if describe.ends_with(')') => path,
            _ => tail,
        };

        let commit = Oid::new(sha).map_err(|e| format!("{e} in line: {line}"))?;
        let path = SubmodulePath::new(path).map_err(|e| format!("{e} in line: {line}"))?;

        statuses.push(SubmoduleStatus { path, commit, flag });
    }

    Ok(statuses)
}

/// Extract commit hashes from `Subproject commit` markers in a diff.
///
/// Only removed/added lines count, so context lines and headers cannot
/// contribute markers. The hash is the leading hex run after the marker,
/// which drops suffixes such as `-dirty`.
pub fn parse_subproject_markers(diff: &str) -> Vec<Oid> {
    diff.lines()
        .filter_map(|line| {
            let body = line.strip_prefix('-').or_else(|| line.strip_prefix('+'))?;
            let after = body.strip_prefix(SUBPROJECT_MARKER)?;
            let hex: String = after.chars().take_while(char::is_ascii_hexdigit).collect();
            Oid::new(hex).ok()
        })
        .collect()
}

/// Parse `git status --porcelain` (v1) output.
///
/// # Errors
///
/// Returns a description of the first line shorter than `XY <path>`.
pub fn parse_porcelain(output: &str) -> Result<Vec<StatusEntry>, String> {
    output
        .lines()
        .filter(|l| !l.is_empty())
        .map(|line| {
            let mut chars = line.chars();
            match (chars.next(), chars.next(), chars.next()) {
                (Some(index), Some(worktree), Some(' ')) if !chars.as_str().is_empty() => {
                    Ok(StatusEntry {
                        index,
                        worktree,
                        path: chars.as_str().to_string(),
                    })
                }
                _ => Err(format!("malformed porcelain line: {line}")),
            }
        })
        .collect()
}

/// Parse the single integer `git rev-list --count` prints.
///
/// # Errors
///
/// Returns a description when the output is not a non-negative integer.
pub fn parse_count(output: &str) -> Result<usize, String> {
    let trimmed = output.trim();
    trimmed
        .parse()
        .map_err(|_| format!("expected a commit count, got '{trimmed}'"))
}
