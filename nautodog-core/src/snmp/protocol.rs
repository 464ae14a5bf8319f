//! SNMPv3 USM protocol names.
//!
//! Names are accepted as USM identifiers (`usmHMACSHAAuthProtocol`) and as
//! net-snmp names (`SHA-256`), case-insensitively. Unknown names are
//! rejected instead of quietly falling back to no authentication.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SnmpError;

/// Lowercased name without `-` and `_`
fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| !matches!(c, '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// USM authentication protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProtocol {
    /// No authentication
    None,
    /// HMAC-MD5-96
    #[default]
    Md5,
    /// HMAC-SHA-96
    Sha,
    /// HMAC-SHA-224
    Sha224,
    /// HMAC-SHA-256
    Sha256,
    /// HMAC-SHA-384
    Sha384,
    /// HMAC-SHA-512
    Sha512,
}

impl AuthProtocol {
    /// All protocols, in increasing strength
    pub const ALL: [Self; 7] = [
        Self::None,
        Self::Md5,
        Self::Sha,
        Self::Sha224,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
    ];

    /// Value for `snmpget -a`, `None` for no authentication
    #[must_use]
    pub const fn net_snmp_name(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Md5 => Some("MD5"),
            Self::Sha => Some("SHA"),
            Self::Sha224 => Some("SHA-224"),
            Self::Sha256 => Some("SHA-256"),
            Self::Sha384 => Some("SHA-384"),
            Self::Sha512 => Some("SHA-512"),
        }
    }

    /// USM protocol identifier
    #[must_use]
    pub const fn usm_name(self) -> &'static str {
        match self {
            Self::None => "usmNoAuthProtocol",
            Self::Md5 => "usmHMACMD5AuthProtocol",
            Self::Sha => "usmHMACSHAAuthProtocol",
            Self::Sha224 => "usmHMAC128SHA224AuthProtocol",
            Self::Sha256 => "usmHMAC192SHA256AuthProtocol",
            Self::Sha384 => "usmHMAC256SHA384AuthProtocol",
            Self::Sha512 => "usmHMAC384SHA512AuthProtocol",
        }
    }
}

impl FromStr for AuthProtocol {
    type Err = SnmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "none" | "noauth" | "usmnoauthprotocol" => Ok(Self::None),
            "md5" | "usmhmacmd5authprotocol" => Ok(Self::Md5),
            "sha" | "sha1" | "usmhmacshaauthprotocol" => Ok(Self::Sha),
            "sha224" | "usmhmac128sha224authprotocol" => Ok(Self::Sha224),
            "sha256" | "usmhmac192sha256authprotocol" => Ok(Self::Sha256),
            "sha384" | "usmhmac256sha384authprotocol" => Ok(Self::Sha384),
            "sha512" | "usmhmac384sha512authprotocol" => Ok(Self::Sha512),
            _ => Err(SnmpError::UnknownAuthProtocol(s.to_string())),
        }
    }
}

impl fmt::Display for AuthProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.net_snmp_name().unwrap_or("none"))
    }
}

/// USM privacy protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivProtocol {
    /// No encryption
    None,
    /// CBC-DES
    #[default]
    Des,
    /// 3DES-EDE
    TripleDes,
    /// CFB128-AES-128
    Aes128,
    /// CFB128-AES-192
    Aes192,
    /// CFB128-AES-256
    Aes256,
}

impl PrivProtocol {
    /// All protocols
    pub const ALL: [Self; 6] = [
        Self::None,
        Self::Des,
        Self::TripleDes,
        Self::Aes128,
        Self::Aes192,
        Self::Aes256,
    ];

    /// Value for `snmpget -x`, `None` for no privacy
    #[must_use]
    pub const fn net_snmp_name(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Des => Some("DES"),
            Self::TripleDes => Some("3DES"),
            Self::Aes128 => Some("AES"),
            Self::Aes192 => Some("AES-192"),
            Self::Aes256 => Some("AES-256"),
        }
    }

    /// USM protocol identifier
    #[must_use]
    pub const fn usm_name(self) -> &'static str {
        match self {
            Self::None => "usmNoPrivProtocol",
            Self::Des => "usmDESPrivProtocol",
            Self::TripleDes => "usm3DESEDEPrivProtocol",
            Self::Aes128 => "usmAesCfb128Protocol",
            Self::Aes192 => "usmAesCfb192Protocol",
            Self::Aes256 => "usmAesCfb256Protocol",
        }
    }
}

impl FromStr for PrivProtocol {
    type Err = SnmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "none" | "nopriv" | "usmnoprivprotocol" => Ok(Self::None),
            "des" | "usmdesprivprotocol" => Ok(Self::Des),
            "3des" | "3desede" | "tripledes" | "usm3desedeprivprotocol" => Ok(Self::TripleDes),
            "aes" | "aes128" | "usmaescfb128protocol" => Ok(Self::Aes128),
            "aes192" | "usmaescfb192protocol" => Ok(Self::Aes192),
            "aes256" | "usmaescfb256protocol" => Ok(Self::Aes256),
            _ => Err(SnmpError::UnknownPrivProtocol(s.to_string())),
        }
    }
}

impl fmt::Display for PrivProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.net_snmp_name().unwrap_or("none"))
    }
}

/// USM security level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SecurityLevel {
    /// Neither authentication nor privacy
    NoAuthNoPriv,
    /// Authentication only
    AuthNoPriv,
    /// Authentication and privacy
    AuthPriv,
}

impl SecurityLevel {
    /// Value for `snmpget -l`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoAuthNoPriv => "noAuthNoPriv",
            Self::AuthNoPriv => "authNoPriv",
            Self::AuthPriv => "authPriv",
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
