//! Remote host session management and command execution.

use std::ops::{Deref, DerefMut};

use super::predicate::{PredicateOutcome, RemotePredicate};
use super::shell::{self, Elevation};
use super::ssh::SshConnector;
use super::target::HostTarget;
use super::transport::{Connector, ExecOutput, RemoteSession};
use crate::config::TransferSettings;
use crate::error::{RemoteHostError, RemoteResult};

/// Output of a command run through [`RemoteHost::execute`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Text with echo and prompt removed
    pub text: String,
    /// Exit status when the transport reports one
    pub exit_status: Option<i32>,
}

impl CommandOutput {
    /// Raw form used by the output classifiers
    pub fn as_exec(&self) -> ExecOutput {
        ExecOutput::new(self.text.as_bytes().to_vec(), self.exit_status)
    }
}

/// A remote device reached over an authenticated session
///
/// The session is created lazily, reused while alive and closed explicitly.
/// Download and upload acquire it for the duration of the call and release
/// it on every exit path.
pub struct RemoteHost<C: Connector = SshConnector> {
    target: HostTarget,
    settings: TransferSettings,
    elevation: Elevation,
    connector: C,
    session: Option<C::Session>,
}

impl RemoteHost<SshConnector> {
    /// Creates a host reached over SSH and verifies it can connect
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid settings or a connection
    /// error if the initial connect-then-disconnect probe fails.
    pub fn new(target: HostTarget, settings: TransferSettings) -> RemoteResult<Self> {
        let connector = SshConnector::from_settings(&settings);
        Self::with_connector(target, settings, connector)
    }
}

impl<C: Connector> RemoteHost<C> {
    /// Creates a host using a custom connector and verifies it can connect
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid settings or a connection
    /// error if the initial connect-then-disconnect probe fails.
    pub fn with_connector(
        target: HostTarget,
        settings: TransferSettings,
        connector: C,
    ) -> RemoteResult<Self> {
        settings
            .validate()
            .map_err(|e| RemoteHostError::Config(e.to_string()))?;

        let mut host = Self {
            elevation: Elevation::new(settings.elevation_prefix.clone()),
            target,
            settings,
            connector,
            session: None,
        };

        host.check_connection().map_err(|e| match e {
            RemoteHostError::Connection { host, reason } => RemoteHostError::Connection {
                host,
                reason: format!("Initial connection check failed: {reason}"),
            },
            other => other,
        })?;

        Ok(host)
    }

    /// Target address and credential
    pub fn target(&self) -> &HostTarget {
        &self.target
    }

    /// Transfer settings
    pub fn settings(&self) -> &TransferSettings {
        &self.settings
    }

    /// Escalation prefix applied to privileged commands
    pub fn elevation(&self) -> &Elevation {
        &self.elevation
    }

    /// Connector used to open sessions
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Whether a session handle is currently held
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Opens a session unless a live one exists
    ///
    /// # Errors
    ///
    /// Returns a connection error wrapping the transport failure.
    pub fn connect(&mut self) -> RemoteResult<()> {
        if let Some(session) = self.session.as_mut() {
            if session.is_alive() {
                return Ok(());
            }
            tracing::debug!(host = %self.target.host, "Session no longer alive, reconnecting");
            self.session = None;
        }

        let span = tracing::debug_span!("remote.connect", host = %self.target.host, port = self.target.port);
        let _guard = span.enter();

        let session = self
            .connector
            .connect(&self.target)
            .map_err(|e| RemoteHostError::connection(&self.target.host, e.to_string()))?;
        self.session = Some(session);
        tracing::debug!("Connected to {}", self.target.display_name());
        Ok(())
    }

    /// Closes the session if one is held
    ///
    /// The handle is cleared even when closing fails.
    pub fn disconnect(&mut self) {
        if let Some(mut session) = self.session.take() {
            if session.is_alive() {
                if let Err(e) = session.close() {
                    tracing::warn!(host = %self.target.host, error = %e, "Error while closing session");
                }
            }
            tracing::debug!("Disconnected from {}", self.target.display_name());
        }
    }

    pub(crate) fn active_session(&mut self) -> Option<&mut C::Session> {
        self.session.as_mut()
    }

    /// Connects, then always disconnects
    ///
    /// # Errors
    ///
    /// Returns a connection error if the connect step fails.
    pub fn check_connection(&mut self) -> RemoteResult<()> {
        let result = self.connect();
        self.disconnect();
        result
    }

    /// Connects and returns a guard that disconnects when dropped
    ///
    /// # Errors
    ///
    /// Returns a connection error if the connect step fails.
    pub fn session(&mut self) -> RemoteResult<SessionScope<'_, C>> {
        self.connect()?;
        Ok(SessionScope { host: self })
    }

    /// Runs a command on the active session and returns its text output
    ///
    /// stderr is merged into the text; echo and prompt are removed.
    ///
    /// # Errors
    ///
    /// Returns a connection error when no session is active or the
    /// transport fails.
    pub fn run(&mut self, command: &str) -> RemoteResult<String> {
        self.execute(command).map(|output| output.text)
    }

    /// Runs a command and keeps its exit status
    ///
    /// # Errors
    ///
    /// Same as [`RemoteHost::run`].
    pub fn execute(&mut self, command: &str) -> RemoteResult<CommandOutput> {
        let raw = self.execute_raw(command)?;
        let prompt = self.session.as_ref().and_then(|s| s.prompt());
        let text = shell::strip_echo_and_prompt(&raw.text(), command, prompt);
        Ok(CommandOutput {
            text,
            exit_status: raw.exit_status,
        })
    }

    /// Runs a command and returns its output bytes untouched
    ///
    /// # Errors
    ///
    /// Same as [`RemoteHost::run`].
    pub fn execute_raw(&mut self, command: &str) -> RemoteResult<ExecOutput> {
        let host = self.target.host.clone();
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| RemoteHostError::connection(&host, "no active session"))?;

        tracing::debug!(command, "Executing remote command");
        let output = session
            .exec(command)
            .map_err(|e| RemoteHostError::connection(&host, e.to_string()))?;
        tracing::trace!(
            exit_status = ?output.exit_status,
            bytes = output.output.len(),
            "Remote command finished"
        );
        Ok(output)
    }

    /// Runs a privileged command
    ///
    /// # Errors
    ///
    /// Same as [`RemoteHost::run`].
    pub fn execute_elevated(&mut self, command: &str) -> RemoteResult<CommandOutput> {
        let command = self.elevation.apply(command);
        self.execute(&command)
    }

    /// Evaluates a predicate on the active session
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedOutput` when the output holds neither marker, or
    /// a connection error from the transport.
    pub fn evaluate(&mut self, predicate: &RemotePredicate) -> RemoteResult<PredicateOutcome> {
        let output = self.run(&predicate.command())?;
        predicate.evaluate(output)
    }

    /// Whether `path` is a regular file readable by the session user
    ///
    /// # Errors
    ///
    /// Same as [`RemoteHost::evaluate`].
    pub fn probe(&mut self, path: &str) -> RemoteResult<bool> {
        self.evaluate(&RemotePredicate::readable_file(path))
            .map(|outcome| outcome.value)
    }
}

impl<C: Connector> Drop for RemoteHost<C> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Scoped session: disconnects the host when dropped
pub struct SessionScope<'a, C: Connector> {
    host: &'a mut RemoteHost<C>,
}

impl<C: Connector> Deref for SessionScope<'_, C> {
    type Target = RemoteHost<C>;

    fn deref(&self) -> &Self::Target {
        self.host
    }
}

impl<C: Connector> DerefMut for SessionScope<'_, C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.host
    }
}

impl<C: Connector> Drop for SessionScope<'_, C> {
    fn drop(&mut self) {
        self.host.disconnect();
    }
}
