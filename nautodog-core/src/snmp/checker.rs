//! Credential checks against live SNMP agents.

// Allow precision loss for percentage calculations - acceptable for display purposes
#![allow(clippy::cast_precision_loss)]

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Serialize;
use tokio::process::Command;
use tokio::time::timeout;

use super::credentials::{SnmpEndpoint, SnmpV2Credentials, SnmpV3Credentials};
use crate::error::SnmpError;

/// Default number of concurrent checks for batch operations
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Extra time granted to `snmpget` on top of its own timeout and retries
const PROCESS_GRACE: Duration = Duration::from_secs(2);

/// Result of checking one set of credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Agent that was queried
    pub host: String,
    /// Whether the agent answered with the requested value
    pub success: bool,
    /// Value returned by the agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Reason for a failed check
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl CheckReport {
    /// Creates a successful report
    #[must_use]
    pub fn success(host: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            success: true,
            response: Some(response.into()),
            diagnostic: None,
        }
    }

    /// Creates a failed report
    #[must_use]
    pub fn failure(host: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            success: false,
            response: None,
            diagnostic: Some(diagnostic.into()),
        }
    }
}

/// Summary of batch check results
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckSummary {
    /// Number of credentials checked
    pub total: usize,
    /// Number of checks that passed
    pub passed: usize,
    /// Number of checks that failed
    pub failed: usize,
    /// Individual reports
    pub reports: Vec<CheckReport>,
}

impl CheckSummary {
    /// Creates a summary from a list of reports
    #[must_use]
    pub fn from_reports(reports: Vec<CheckReport>) -> Self {
        let total = reports.len();
        let passed = reports.iter().filter(|r| r.success).count();
        Self {
            total,
            passed,
            failed: total - passed,
            reports,
        }
    }

    /// Returns true if all checks passed
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Returns true if any check failed
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Returns the pass rate as a percentage (0.0 to 100.0)
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.passed as f64 / self.total as f64) * 100.0
    }

    /// Returns a summary string
    #[must_use]
    pub fn summary_string(&self) -> String {
        format!(
            "Total: {}, Passed: {}, Failed: {} ({:.1}% pass rate)",
            self.total,
            self.passed,
            self.failed,
            self.pass_rate()
        )
    }

    /// Returns only the failed reports
    #[must_use]
    pub fn failed_reports(&self) -> Vec<&CheckReport> {
        self.reports.iter().filter(|r| !r.success).collect()
    }
}

/// Validates SNMP credentials by fetching one OID
///
/// Network failures, timeouts and rejected credentials produce a failed
/// [`CheckReport`]. Only unusable credential combinations are errors.
#[async_trait]
pub trait CredentialChecker: Send + Sync {
    /// Checks SNMPv2c community credentials
    async fn check_v2(&self, credentials: &SnmpV2Credentials) -> Result<CheckReport, SnmpError>;

    /// Checks SNMPv3 USM credentials
    async fn check_v3(&self, credentials: &SnmpV3Credentials) -> Result<CheckReport, SnmpError>;
}

/// Checks many v2c credential sets with bounded concurrency
///
/// Credentials that fail validation are reported as failed checks.
pub async fn check_batch_v2<C>(
    checker: &C,
    credentials: &[SnmpV2Credentials],
    concurrency: usize,
) -> CheckSummary
where
    C: CredentialChecker + ?Sized,
{
    use futures::stream::{self, StreamExt};

    let reports: Vec<CheckReport> = stream::iter(credentials)
        .map(|creds| async move {
            checker
                .check_v2(creds)
                .await
                .unwrap_or_else(|e| CheckReport::failure(&creds.endpoint.host, e.to_string()))
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    CheckSummary::from_reports(reports)
}

/// Checker backed by the net-snmp `snmpget` tool
///
/// Credentials are passed to `snmpget` as arguments and are therefore
/// visible in the local process list while a check runs.
#[derive(Debug, Clone)]
pub struct NetSnmpChecker {
    program: String,
}

impl NetSnmpChecker {
    /// Uses `snmpget` from `PATH`
    #[must_use]
    pub fn new() -> Self {
        Self::with_program("snmpget")
    }

    /// Uses a specific `snmpget` executable
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Executable that is run
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments for a v2c check
    #[must_use]
    pub fn v2_args(credentials: &SnmpV2Credentials) -> Vec<String> {
        let mut args = vec![
            "-v2c".to_string(),
            "-c".to_string(),
            credentials.community.expose_secret().to_string(),
        ];
        push_endpoint_args(&mut args, &credentials.endpoint);
        args
    }

    /// Arguments for a v3 check
    ///
    /// # Errors
    ///
    /// Returns an error when the credential combination is not usable.
    pub fn v3_args(credentials: &SnmpV3Credentials) -> Result<Vec<String>, SnmpError> {
        let resolved = credentials.resolve()?;

        let mut args = vec![
            "-v3".to_string(),
            "-l".to_string(),
            resolved.level.as_str().to_string(),
            "-u".to_string(),
            credentials.user.clone(),
        ];
        if let (Some(name), Some(key)) = (resolved.auth_protocol.net_snmp_name(), credentials.auth_secret()) {
            args.extend(["-a".to_string(), name.to_string(), "-A".to_string(), key.to_string()]);
        }
        if let (Some(name), Some(key)) = (resolved.priv_protocol.net_snmp_name(), credentials.priv_secret()) {
            args.extend(["-x".to_string(), name.to_string(), "-X".to_string(), key.to_string()]);
        }
        push_endpoint_args(&mut args, &credentials.endpoint);
        Ok(args)
    }

    async fn run(&self, endpoint: &SnmpEndpoint, args: Vec<String>) -> CheckReport {
        let host = endpoint.host.as_str();
        let limit = endpoint.worst_case() + PROCESS_GRACE;

        let mut cmd = Command::new(&self.program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(host, program = %self.program, "Running SNMP check");

        match timeout(limit, cmd.output()).await {
            Ok(Ok(output)) => classify_output(
                host,
                output.status.success(),
                &String::from_utf8_lossy(&output.stdout),
                &String::from_utf8_lossy(&output.stderr),
            ),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => CheckReport::failure(
                host,
                format!("{} not found; install the net-snmp command line tools", self.program),
            ),
            Ok(Err(e)) => CheckReport::failure(host, format!("Failed to run {}: {e}", self.program)),
            Err(_) => CheckReport::failure(
                host,
                format!("No response from {host} within {}s", limit.as_secs()),
            ),
        }
    }
}

impl Default for NetSnmpChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialChecker for NetSnmpChecker {
    async fn check_v2(&self, credentials: &SnmpV2Credentials) -> Result<CheckReport, SnmpError> {
        credentials.validate()?;
        let report = self
            .run(&credentials.endpoint, Self::v2_args(credentials))
            .await;
        log_report("v2c", &report);
        Ok(report)
    }

    async fn check_v3(&self, credentials: &SnmpV3Credentials) -> Result<CheckReport, SnmpError> {
        let args = Self::v3_args(credentials)?;
        let report = self.run(&credentials.endpoint, args).await;
        log_report("v3", &report);
        Ok(report)
    }
}

fn push_endpoint_args(args: &mut Vec<String>, endpoint: &SnmpEndpoint) {
    args.extend([
        "-t".to_string(),
        endpoint.timeout.as_secs_f64().to_string(),
        "-r".to_string(),
        endpoint.retries.to_string(),
        "-Oqv".to_string(),
        endpoint.agent_address(),
        endpoint.oid.clone(),
    ]);
}

fn log_report(version: &str, report: &CheckReport) {
    if report.success {
        tracing::info!(host = %report.host, version, "SNMP credentials accepted");
    } else {
        tracing::warn!(
            host = %report.host,
            version,
            reason = report.diagnostic.as_deref().unwrap_or_default(),
            "SNMP credential check failed"
        );
    }
}

/// Turns `snmpget` output into a report
#[must_use]
pub fn classify_output(host: &str, exited_ok: bool, stdout: &str, stderr: &str) -> CheckReport {
    let value = stdout.trim();
    let errors = stderr.trim();

    if exited_ok && !value.is_empty() && !is_missing_value(value) {
        return CheckReport::success(host, value);
    }

    let combined = format!("{errors}\n{value}");
    let lowered = combined.to_lowercase();

    let diagnostic = if lowered.contains("timeout") {
        format!("Timeout: no response from {host}")
    } else if lowered.contains("authentication failure") || lowered.contains("wrong digest") {
        "Authentication failure (incorrect password, community or key)".to_string()
    } else if lowered.contains("unknown user name") {
        "Unknown user name".to_string()
    } else if lowered.contains("unsupported security level") {
        "Unsupported security level for this user".to_string()
    } else if lowered.contains("decryption error") {
        "Decryption error (incorrect privacy key or protocol)".to_string()
    } else if is_missing_value(value) {
        format!("Error status: {value}")
    } else if let Some(line) = errors.lines().find(|l| !l.trim().is_empty()) {
        format!("Error status: {}", line.trim())
    } else if !exited_ok {
        "snmpget exited with an error and no output".to_string()
    } else {
        "Empty response".to_string()
    };

    CheckReport::failure(host, diagnostic)
}

fn is_missing_value(value: &str) -> bool {
    value.starts_with("No Such Object") || value.starts_with("No Such Instance") || value.starts_with("No more variables")
}
