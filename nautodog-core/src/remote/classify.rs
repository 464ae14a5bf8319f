//! Classification of remote command output into failures.
//!
//! Each function returns `Some(reason)` when the output describes a failed
//! step. A non-zero exit status always counts as failure; the text markers
//! catch transports that do not report exit status and commands that exit
//! zero after printing an error.

use super::transport::ExecOutput;

/// Markers of a failed privileged read (matched case-sensitively)
const READ_FAILURE_MARKERS: &[&str] = &[
    "No such file or directory",
    "cannot open",
    "command not found",
    "sudo: a password is required",
    "sudo: a terminal is required",
];

/// Markers of a failed copy (matched case-insensitively)
const COPY_FAILURE_MARKERS: &[&str] = &["cannot open", "permission denied", "no such file"];

/// Markers of a failed move (matched case-insensitively)
const MOVE_FAILURE_MARKERS: &[&str] = &["mv: cannot move", "permission denied", "no such file"];

/// Markers of a failed housekeeping step (matched case-insensitively)
const STEP_FAILURE_MARKERS: &[&str] = &[
    "permission denied",
    "operation not permitted",
    "no such file",
    "invalid",
];

/// Prompt printed by sudo when it wants the user's password
pub fn sudo_password_prompt(user: &str) -> String {
    format!("[sudo] password for {user}:")
}

/// Checks the output of an elevated `cat`
///
/// A zero exit status means the output is file content and only the sudo
/// password prompt is looked for; content may legitimately contain any of
/// the error phrases.
pub fn privileged_read_failure(output: &ExecOutput, user: &str) -> Option<String> {
    let text = output.text();

    let prompt = sudo_password_prompt(user);
    if text.contains(&prompt) {
        return Some(format!("sudo requested a password ({prompt})"));
    }

    if output.exit_status == Some(0) {
        return None;
    }

    if let Some(marker) = READ_FAILURE_MARKERS.iter().find(|m| text.contains(**m)) {
        return Some(format!("{marker}: {}", text.trim()));
    }
    if text.contains("Permission denied") && text.contains("sudo") {
        return Some(format!("Permission denied: {}", text.trim()));
    }

    exit_failure(output, &text)
}

/// Checks the output of `cp`
pub fn copy_failure(output: &ExecOutput) -> Option<String> {
    marker_or_exit_failure(output, COPY_FAILURE_MARKERS)
}

/// Checks the output of `mv`
pub fn move_failure(output: &ExecOutput) -> Option<String> {
    marker_or_exit_failure(output, MOVE_FAILURE_MARKERS)
}

/// Checks the output of `mkdir`, `chown`, `chmod` and `rm`
pub fn step_failure(output: &ExecOutput) -> Option<String> {
    marker_or_exit_failure(output, STEP_FAILURE_MARKERS)
}

fn marker_or_exit_failure(output: &ExecOutput, markers: &[&str]) -> Option<String> {
    let text = output.text();
    let lowered = text.to_lowercase();
    if markers.iter().any(|m| lowered.contains(m)) {
        return Some(text.trim().to_string());
    }
    exit_failure(output, &text)
}

fn exit_failure(output: &ExecOutput, text: &str) -> Option<String> {
    match output.exit_status {
        Some(code) if code != 0 => Some(format!("exit status {code}: {}", text.trim())),
        _ => None,
    }
}
