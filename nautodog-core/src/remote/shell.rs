//! Shell command construction for the remote POSIX shell.
//!
//! Every path is single-quoted with [`quote`]; privileged variants go
//! through [`Elevation`].

/// Quotes `value` for a POSIX shell
///
/// Single quotes inside the value are closed, escaped and reopened, so
/// `it's` becomes `'it'\''s'`.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Privilege escalation prefix applied to commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Elevation {
    prefix: String,
}

impl Elevation {
    /// Creates an elevation using `prefix` (e.g. `sudo`)
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().trim().to_string(),
        }
    }

    /// Prefixes `command`; an empty prefix leaves it unchanged
    pub fn apply(&self, command: &str) -> String {
        if self.prefix.is_empty() {
            command.to_string()
        } else {
            format!("{} {command}", self.prefix)
        }
    }
}

impl Default for Elevation {
    fn default() -> Self {
        Self::new("sudo")
    }
}

/// `stat` invocation printing `owner:group mode`
pub fn stat_ownership(path: &str) -> String {
    format!("stat -c '%U:%G %a' {}", quote(path))
}

/// `mkdir -p`
pub fn mkdir_p(path: &str) -> String {
    format!("mkdir -p {}", quote(path))
}

/// `cp` preserving nothing but content
pub fn copy(source: &str, destination: &str) -> String {
    format!("cp {} {}", quote(source), quote(destination))
}

/// `mv`
pub fn move_file(source: &str, destination: &str) -> String {
    format!("mv {} {}", quote(source), quote(destination))
}

/// `chown owner:group`
pub fn chown(owner: &str, group: &str, path: &str) -> String {
    format!("chown {} {}", quote(&format!("{owner}:{group}")), quote(path))
}

/// `chmod` with an octal mode
pub fn chmod(mode: &str, path: &str) -> String {
    format!("chmod {} {}", quote(mode), quote(path))
}

/// `rm -rf`
pub fn remove_tree(path: &str) -> String {
    format!("rm -rf {}", quote(path))
}

/// `cat`
pub fn cat(path: &str) -> String {
    format!("cat {}", quote(path))
}

/// Parent directory of a remote POSIX path
///
/// `/etc/snmp/snmpd.conf` gives `/etc/snmp`, `/snmpd.conf` gives `/` and a
/// bare name gives `.`.
pub fn parent_dir(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => trimmed[..idx].to_string(),
        None => ".".to_string(),
    }
}

/// Final component of a remote POSIX path
pub fn file_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Joins a remote directory and a name
pub fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Removes the echoed command line and a trailing prompt from terminal
/// output
///
/// Exec-style transports report neither, so their text comes back
/// unchanged.
pub fn strip_echo_and_prompt(output: &str, command: &str, prompt: Option<&str>) -> String {
    let mut text = output;

    if let Some(rest) = text.strip_prefix(command.trim()) {
        if rest.is_empty() || rest.starts_with('\n') || rest.starts_with("\r\n") {
            text = rest.trim_start_matches(['\r', '\n']);
        }
    }

    if let Some(prompt) = prompt.map(str::trim).filter(|p| !p.is_empty()) {
        let without_trailing = text.trim_end();
        if let Some(rest) = without_trailing.strip_suffix(prompt) {
            if rest.is_empty() || rest.ends_with('\n') {
                return rest.trim_end_matches(['\r', '\n']).to_string();
            }
        }
    }

    text.to_string()
}
