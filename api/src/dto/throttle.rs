//! Response bodies for the throttle endpoints

use serde::Serialize;

use tf_core::{ceil_secs, ResetReport, UsageSnapshot};

/// Body of `GET /api/v1/throttle/status`
#[derive(Debug, Serialize)]
pub struct ThrottleStatusResponse {
    pub ident: String,
    pub tier: Option<String>,
    /// `false` when the caller is not held to a tier limit
    pub limited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_after_seconds: Option<u64>,
}

impl ThrottleStatusResponse {
    pub fn new(ident: String, tier: Option<String>, usage: Option<UsageSnapshot>) -> Self {
        Self {
            ident,
            tier,
            limited: usage.is_some(),
            limit: usage.map(|u| u.limit),
            used: usage.map(|u| u.used),
            remaining: usage.map(|u| u.remaining),
            reset_after_seconds: usage.map(|u| ceil_secs(u.reset_after)),
        }
    }
}

/// Body of `DELETE /api/v1/admin/throttle/identities/{ident}`
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub ident: String,
    pub keys_cleared: usize,
    pub unflagged: bool,
}

impl From<ResetReport> for ResetResponse {
    fn from(report: ResetReport) -> Self {
        Self {
            ident: report.ident,
            keys_cleared: report.keys_cleared.len(),
            unflagged: report.unflagged,
        }
    }
}

/// Body of `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub store: &'static str,
    pub timestamp: String,
}
