//! Remote host file transfer with privilege escalation.
//!
//! [`RemoteHost`] owns at most one authenticated session to a device and
//! offers two operations built on it:
//!
//! - [`RemoteHost::download_file`] reads a file over SFTP and falls back
//!   once to an elevated `cat` when the sub-channel is unavailable or fails.
//! - [`RemoteHost::upload_file`] backs up the existing file, stages the new
//!   one in a scratch directory and moves it into place with `sudo`,
//!   restoring the previous owner, group and mode.
//!
//! Both acquire the session for the duration of the call and release it on
//! every exit path.

mod classify;
mod download;
mod host;
mod outcome;
mod ownership;
mod predicate;
pub mod shell;
pub mod ssh;
mod target;
pub mod transport;
mod upload;

pub use crate::config::BackupPolicy;
pub use classify::{
    copy_failure, move_failure, privileged_read_failure, step_failure, sudo_password_prompt,
};
pub use host::{CommandOutput, RemoteHost, SessionScope};
pub use outcome::{Direction, TransferMethod, TransferOutcome};
pub use ownership::OwnershipSnapshot;
pub use predicate::{
    EXISTS_MARKER, NOT_EXISTS_MARKER, PredicateOutcome, READABLE_MARKER, RemotePredicate,
    UNREADABLE_MARKER,
};
pub use ssh::{SftpChannel, SshConnector, SshSession};
pub use target::{Credential, DEFAULT_SSH_PORT, HostTarget};
pub use transport::{
    Connector, ExecOutput, FileChannel, RemoteSession, SubChannelError, TransportError,
};
