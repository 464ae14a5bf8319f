//! SNMP credential validation.
//!
//! Credentials are proven by fetching a single OID (`sysDescr.0` unless
//! overridden). The protocol work is delegated to net-snmp's `snmpget`
//! through [`NetSnmpChecker`]; other backends implement
//! [`CredentialChecker`].

mod checker;
mod credentials;
mod protocol;

pub use checker::{
    CheckReport, CheckSummary, CredentialChecker, DEFAULT_CONCURRENCY, NetSnmpChecker,
    check_batch_v2, classify_output,
};
pub use credentials::{
    DEFAULT_RETRIES, DEFAULT_SNMP_PORT, DEFAULT_TIMEOUT_SECS, ResolvedSecurity, SYS_DESCR_OID,
    SnmpEndpoint, SnmpV2Credentials, SnmpV3Credentials,
};
pub use protocol::{AuthProtocol, PrivProtocol, SecurityLevel};
