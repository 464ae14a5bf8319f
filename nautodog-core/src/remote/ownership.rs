//! Ownership and permission snapshots of remote files.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Matches `owner:group mode` as printed by `stat -c '%U:%G %a'`
static STAT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_.][A-Za-z0-9_.@-]*\$?):([A-Za-z0-9_.][A-Za-z0-9_.@-]*\$?) ([0-7]{3,4})$")
        .expect("STAT_LINE is a valid regex pattern")
});

/// Owner, group and permission bits of a remote file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnershipSnapshot {
    /// Owning user name
    pub owner: String,
    /// Owning group name
    pub group: String,
    /// Octal permission bits, e.g. `644`
    pub mode: String,
}

impl OwnershipSnapshot {
    /// Parses `stat` output, returning `None` when no line matches
    pub fn parse(output: &str) -> Option<Self> {
        output.lines().map(str::trim).find_map(|line| {
            STAT_LINE.captures(line).map(|caps| Self {
                owner: caps[1].to_string(),
                group: caps[2].to_string(),
                mode: caps[3].to_string(),
            })
        })
    }
}
