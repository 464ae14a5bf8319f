//! SNMP credential sets.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use super::protocol::{AuthProtocol, PrivProtocol, SecurityLevel};
use crate::error::SnmpError;

/// Default SNMP agent port
pub const DEFAULT_SNMP_PORT: u16 = 161;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 1;

/// Default number of retries
pub const DEFAULT_RETRIES: u32 = 2;

/// `SNMPv2-MIB::sysDescr.0`
pub const SYS_DESCR_OID: &str = "1.3.6.1.2.1.1.1.0";

/// Agent address and request tuning shared by v2c and v3
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnmpEndpoint {
    /// Agent host name or address
    pub host: String,
    /// Agent UDP port
    pub port: u16,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retries after the first request
    pub retries: u32,
    /// OID fetched to prove the credentials work
    pub oid: String,
}

impl SnmpEndpoint {
    /// Endpoint with default port, timeout, retries and OID
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_SNMP_PORT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retries: DEFAULT_RETRIES,
            oid: SYS_DESCR_OID.to_string(),
        }
    }

    /// Transport address in net-snmp syntax
    #[must_use]
    pub fn agent_address(&self) -> String {
        if self.host.contains(':') {
            format!("udp6:[{}]:{}", self.host, self.port)
        } else {
            format!("udp:{}:{}", self.host, self.port)
        }
    }

    /// Longest time a request may take including retries
    #[must_use]
    pub fn worst_case(&self) -> Duration {
        self.timeout * (self.retries + 1)
    }

    fn validate(&self) -> Result<(), SnmpError> {
        if self.host.trim().is_empty() {
            return Err(SnmpError::InvalidCredentials("host must not be empty".into()));
        }
        if self.timeout.is_zero() {
            return Err(SnmpError::InvalidCredentials("timeout must be positive".into()));
        }
        Ok(())
    }
}

/// SNMPv2c community credentials
#[derive(Debug, Clone)]
pub struct SnmpV2Credentials {
    /// Agent endpoint
    pub endpoint: SnmpEndpoint,
    /// Community string
    pub community: SecretString,
}

impl SnmpV2Credentials {
    /// Creates credentials with default endpoint settings
    pub fn new(host: impl Into<String>, community: impl Into<SecretString>) -> Self {
        Self {
            endpoint: SnmpEndpoint::new(host),
            community: community.into(),
        }
    }

    /// Sets the agent port
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.endpoint.port = port;
        self
    }

    /// Sets the per-request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.endpoint.timeout = timeout;
        self
    }

    /// Sets the retry count
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.endpoint.retries = retries;
        self
    }

    /// Sets the OID to fetch
    #[must_use]
    pub fn with_oid(mut self, oid: impl Into<String>) -> Self {
        self.endpoint.oid = oid.into();
        self
    }

    /// Checks that the credentials can be used
    pub fn validate(&self) -> Result<(), SnmpError> {
        self.endpoint.validate()?;
        if self.community.expose_secret().is_empty() {
            return Err(SnmpError::InvalidCredentials("community must not be empty".into()));
        }
        Ok(())
    }
}

/// SNMPv3 user-based security credentials
#[derive(Debug, Clone)]
pub struct SnmpV3Credentials {
    /// Agent endpoint
    pub endpoint: SnmpEndpoint,
    /// USM user name
    pub user: String,
    /// Authentication key
    pub auth_key: Option<SecretString>,
    /// Privacy key
    pub priv_key: Option<SecretString>,
    /// Requested authentication protocol
    pub auth_protocol: AuthProtocol,
    /// Requested privacy protocol
    pub priv_protocol: PrivProtocol,
}

/// Security parameters after applying the key-presence rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSecurity {
    /// Effective level
    pub level: SecurityLevel,
    /// Effective authentication protocol
    pub auth_protocol: AuthProtocol,
    /// Effective privacy protocol
    pub priv_protocol: PrivProtocol,
}

impl SnmpV3Credentials {
    /// Creates credentials with no keys and MD5/DES protocols
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            endpoint: SnmpEndpoint::new(host),
            user: user.into(),
            auth_key: None,
            priv_key: None,
            auth_protocol: AuthProtocol::default(),
            priv_protocol: PrivProtocol::default(),
        }
    }

    /// Sets the authentication key and protocol
    #[must_use]
    pub fn with_auth(mut self, key: impl Into<SecretString>, protocol: AuthProtocol) -> Self {
        self.auth_key = Some(key.into());
        self.auth_protocol = protocol;
        self
    }

    /// Sets the privacy key and protocol
    #[must_use]
    pub fn with_priv(mut self, key: impl Into<SecretString>, protocol: PrivProtocol) -> Self {
        self.priv_key = Some(key.into());
        self.priv_protocol = protocol;
        self
    }

    /// Sets the agent port
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.endpoint.port = port;
        self
    }

    /// Sets the per-request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.endpoint.timeout = timeout;
        self
    }

    /// Sets the retry count
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.endpoint.retries = retries;
        self
    }

    /// Authentication key when present and non-empty
    pub(crate) fn auth_secret(&self) -> Option<&str> {
        non_empty(self.auth_key.as_ref())
    }

    /// Privacy key when present and non-empty
    pub(crate) fn priv_secret(&self) -> Option<&str> {
        non_empty(self.priv_key.as_ref())
    }

    /// Derives the security level from which keys are set
    ///
    /// No authentication key means `noAuthNoPriv` and both protocols are
    /// forced to none. An authentication key alone means `authNoPriv`.
    /// Both keys mean `authPriv`. A privacy key without an authentication
    /// key is ignored.
    pub fn resolve(&self) -> Result<ResolvedSecurity, SnmpError> {
        self.endpoint.validate()?;
        if self.user.trim().is_empty() {
            return Err(SnmpError::InvalidCredentials("user must not be empty".into()));
        }

        if self.auth_secret().is_none() {
            if self.priv_secret().is_some() {
                tracing::warn!(user = %self.user, "Privacy key given without authentication key, ignoring it");
            }
            return Ok(ResolvedSecurity {
                level: SecurityLevel::NoAuthNoPriv,
                auth_protocol: AuthProtocol::None,
                priv_protocol: PrivProtocol::None,
            });
        }

        if self.auth_protocol == AuthProtocol::None {
            return Err(SnmpError::InvalidCredentials(
                "an authentication key requires an authentication protocol".into(),
            ));
        }

        if self.priv_secret().is_none() {
            return Ok(ResolvedSecurity {
                level: SecurityLevel::AuthNoPriv,
                auth_protocol: self.auth_protocol,
                priv_protocol: PrivProtocol::None,
            });
        }

        if self.priv_protocol == PrivProtocol::None {
            return Err(SnmpError::InvalidCredentials(
                "a privacy key requires a privacy protocol".into(),
            ));
        }

        Ok(ResolvedSecurity {
            level: SecurityLevel::AuthPriv,
            auth_protocol: self.auth_protocol,
            priv_protocol: self.priv_protocol,
        })
    }
}

fn non_empty(secret: Option<&SecretString>) -> Option<&str> {
    secret.map(|s| s.expose_secret()).filter(|s| !s.is_empty())
}
