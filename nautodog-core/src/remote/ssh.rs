//! SSH transport built on `ssh2` (libssh2), with SFTP as the file
//! sub-channel.

use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::ExposeSecret;
use ssh2::{CheckResult, ExtendedData, KnownHostFileKind, Session, Sftp};

use super::target::{Credential, HostTarget};
use super::transport::{
    Connector, ExecOutput, FileChannel, RemoteSession, SubChannelError, TransportError,
};
use crate::config::TransferSettings;

/// Seconds between keepalive messages on idle sessions
const KEEPALIVE_INTERVAL_SECS: u32 = 30;

/// Opens authenticated `ssh2` sessions
#[derive(Debug, Clone)]
pub struct SshConnector {
    connect_timeout: Duration,
    command_timeout: Option<Duration>,
    strict_host_key_checking: bool,
    known_hosts: Option<PathBuf>,
}

impl SshConnector {
    /// Builds a connector from transfer settings
    pub fn from_settings(settings: &TransferSettings) -> Self {
        Self {
            connect_timeout: settings.connect_timeout(),
            command_timeout: settings.command_timeout(),
            strict_host_key_checking: settings.strict_host_key_checking,
            known_hosts: settings.known_hosts_path(),
        }
    }

    fn open_tcp(&self, target: &HostTarget) -> Result<TcpStream, TransportError> {
        let addrs = (target.host.as_str(), target.port)
            .to_socket_addrs()
            .map_err(|e| TransportError::Connect(format!("cannot resolve {}: {e}", target.host)))?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_error = Some(format!("{addr}: {e}")),
            }
        }
        Err(TransportError::Connect(last_error.unwrap_or_else(|| {
            format!("no addresses found for {}", target.host)
        })))
    }

    fn verify_host_key(&self, session: &Session, target: &HostTarget) -> Result<(), TransportError> {
        if !self.strict_host_key_checking {
            return Ok(());
        }
        let path = self
            .known_hosts
            .as_deref()
            .ok_or_else(|| TransportError::HostKey("no known_hosts file configured".into()))?;

        let mut known_hosts = session
            .known_hosts()
            .map_err(|e| TransportError::HostKey(e.to_string()))?;
        known_hosts
            .read_file(path, KnownHostFileKind::OpenSSH)
            .map_err(|e| TransportError::HostKey(format!("{}: {e}", path.display())))?;

        let (key, _) = session
            .host_key()
            .ok_or_else(|| TransportError::HostKey("server sent no host key".into()))?;

        match known_hosts.check_port(&target.host, target.port, key) {
            CheckResult::Match => Ok(()),
            CheckResult::Mismatch => Err(TransportError::HostKey(format!(
                "host key for {} does not match {}",
                target.host,
                path.display()
            ))),
            CheckResult::NotFound => Err(TransportError::HostKey(format!(
                "{} is not listed in {}",
                target.host,
                path.display()
            ))),
            CheckResult::Failure => Err(TransportError::HostKey(
                "known_hosts check could not be performed".into(),
            )),
        }
    }
}

impl Default for SshConnector {
    fn default() -> Self {
        Self::from_settings(&TransferSettings::default())
    }
}

impl Connector for SshConnector {
    type Session = SshSession;

    fn connect(&self, target: &HostTarget) -> Result<SshSession, TransportError> {
        let tcp = self.open_tcp(target)?;

        let mut session =
            Session::new().map_err(|e| TransportError::Connect(format!("session init: {e}")))?;
        session.set_tcp_stream(tcp);
        session.set_timeout(duration_to_ms(Some(self.connect_timeout)));
        session
            .handshake()
            .map_err(|e| TransportError::Connect(format!("handshake: {e}")))?;

        self.verify_host_key(&session, target)?;

        match &target.credential {
            Credential::Password(password) => session
                .userauth_password(&target.user, password.expose_secret())
                .map_err(|e| TransportError::Authentication(e.to_string()))?,
            Credential::KeyFile(path) => session
                .userauth_pubkey_file(&target.user, None, path, None)
                .map_err(|e| TransportError::Authentication(format!("{}: {e}", path.display())))?,
        }

        if !session.authenticated() {
            return Err(TransportError::Authentication(format!(
                "server did not accept credentials for {}",
                target.user
            )));
        }

        session.set_keepalive(true, KEEPALIVE_INTERVAL_SECS);
        session.set_timeout(duration_to_ms(self.command_timeout));

        tracing::debug!(target = %target.display_name(), "SSH session established");
        Ok(SshSession { session })
    }
}

/// Authenticated `ssh2` session
pub struct SshSession {
    session: Session,
}

impl RemoteSession for SshSession {
    type Channel = SftpChannel;

    fn is_alive(&mut self) -> bool {
        self.session.authenticated() && self.session.keepalive_send().is_ok()
    }

    fn exec(&mut self, command: &str) -> Result<ExecOutput, TransportError> {
        let channel_err = |e: ssh2::Error| TransportError::Channel(e.to_string());

        let mut channel = self.session.channel_session().map_err(channel_err)?;
        channel
            .handle_extended_data(ExtendedData::Merge)
            .map_err(channel_err)?;
        channel.exec(command).map_err(channel_err)?;

        let mut output = Vec::new();
        channel
            .read_to_end(&mut output)
            .map_err(|e| TransportError::Channel(e.to_string()))?;
        channel.wait_close().map_err(channel_err)?;

        Ok(ExecOutput {
            output,
            exit_status: channel.exit_status().ok(),
        })
    }

    fn open_file_channel(&mut self) -> Result<SftpChannel, SubChannelError> {
        self.session
            .sftp()
            .map(|sftp| SftpChannel { sftp })
            .map_err(|e| SubChannelError::Unavailable(e.to_string()))
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.session
            .disconnect(None, "nautodog session closed", None)
            .map_err(|e| TransportError::Channel(e.to_string()))
    }
}

/// SFTP sub-channel
pub struct SftpChannel {
    sftp: Sftp,
}

impl FileChannel for SftpChannel {
    fn exists(&mut self, path: &str) -> Result<bool, SubChannelError> {
        match self.sftp.stat(Path::new(path)) {
            Ok(_) => Ok(true),
            Err(e) => {
                let message = e.to_string();
                if std::io::Error::from(e).kind() == std::io::ErrorKind::NotFound {
                    Ok(false)
                } else {
                    Err(SubChannelError::Failed(format!("stat {path}: {message}")))
                }
            }
        }
    }

    fn download(&mut self, remote_path: &str, local_path: &Path) -> Result<u64, SubChannelError> {
        let mut remote = self
            .sftp
            .open(Path::new(remote_path))
            .map_err(|e| SubChannelError::Failed(format!("open {remote_path}: {e}")))?;
        let mut local = std::fs::File::create(local_path).map_err(|e| {
            SubChannelError::Failed(format!("create {}: {e}", local_path.display()))
        })?;
        std::io::copy(&mut remote, &mut local)
            .map_err(|e| SubChannelError::Failed(format!("copy {remote_path}: {e}")))
    }

    fn upload(&mut self, local_path: &Path, remote_path: &str) -> Result<u64, SubChannelError> {
        let mut local = std::fs::File::open(local_path).map_err(|e| {
            SubChannelError::Failed(format!("open {}: {e}", local_path.display()))
        })?;
        let mut remote = self
            .sftp
            .create(Path::new(remote_path))
            .map_err(|e| SubChannelError::Failed(format!("create {remote_path}: {e}")))?;
        std::io::copy(&mut local, &mut remote)
            .map_err(|e| SubChannelError::Failed(format!("copy to {remote_path}: {e}")))
    }
}

fn duration_to_ms(duration: Option<Duration>) -> u32 {
    duration
        .map(|d| u32::try_from(d.as_millis()).unwrap_or(u32::MAX))
        .unwrap_or(0)
}
