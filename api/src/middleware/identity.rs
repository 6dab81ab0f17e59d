//! Who a request is throttled as
//!
//! An upstream authentication layer can place an [`AuthenticatedAccount`] in
//! the request extensions. Behind a trusted gateway the account can instead be
//! read from `X-Account-Id` / `X-Account-Tier`. Everyone else is throttled by
//! client address.

use actix_web::{HttpMessage, HttpRequest};
use serde::{Deserialize, Serialize};

use tf_core::{Identity, Tier};

pub const ACCOUNT_ID_HEADER: &str = "X-Account-Id";
pub const ACCOUNT_TIER_HEADER: &str = "X-Account-Tier";

/// Client address used when none can be determined
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Authenticated caller, inserted into request extensions by the auth layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedAccount {
    pub id: String,
    pub tier: Tier,
}

impl AuthenticatedAccount {
    pub fn new(id: impl Into<String>, tier: Tier) -> Self {
        Self {
            id: id.into(),
            tier,
        }
    }
}

/// Extract client IP address from request
pub fn client_ip(req: &HttpRequest) -> String {
    // Try to get IP from X-Forwarded-For header (for reverse proxy scenarios)
    if let Some(forwarded_for) = header_str(req, "X-Forwarded-For") {
        // Take the first IP from the comma-separated list
        let first = forwarded_for.split(',').next().unwrap_or_default().trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }

    if let Some(real_ip) = header_str(req, "X-Real-IP") {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Resolve the identity a request is throttled as
pub fn resolve_identity(req: &HttpRequest, trust_headers: bool, client_ip: &str) -> Identity {
    if let Some(account) = req.extensions().get::<AuthenticatedAccount>() {
        return Identity::account(account.id.clone(), account.tier);
    }

    if trust_headers {
        if let Some(id) = header_str(req, ACCOUNT_ID_HEADER).map(str::trim).filter(|id| !id.is_empty()) {
            let tier = header_str(req, ACCOUNT_TIER_HEADER)
                .map(Tier::parse_lenient)
                .unwrap_or_default();
            return Identity::account(id, tier);
        }
    }

    Identity::anonymous(client_ip)
}

fn header_str<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|value| value.to_str().ok())
}
