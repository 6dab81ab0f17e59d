//! Throttled caller identities and account tiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account service level governing rate limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Basic,
    Premium,
    Enterprise,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Basic => "basic",
            Tier::Premium => "premium",
            Tier::Enterprise => "enterprise",
        }
    }

    /// Parse a tier name, treating anything unknown as the free tier
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "basic" => Ok(Tier::Basic),
            "premium" => Ok(Tier::Premium),
            "enterprise" => Ok(Tier::Enterprise),
            other => Err(format!("Unknown tier: {}", other)),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The caller a request is throttled as
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Identity {
    /// An authenticated account
    Account { id: String, tier: Tier },
    /// An unauthenticated client, known only by network address
    Anonymous { address: String },
}

impl Identity {
    pub fn account(id: impl Into<String>, tier: Tier) -> Self {
        Identity::Account { id: id.into(), tier }
    }

    pub fn anonymous(address: impl Into<String>) -> Self {
        Identity::Anonymous {
            address: address.into(),
        }
    }

    /// Account tier, `None` for anonymous callers
    pub fn tier(&self) -> Option<Tier> {
        match self {
            Identity::Account { tier, .. } => Some(*tier),
            Identity::Anonymous { .. } => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Account { .. })
    }

    /// Identifier used inside cache keys: `user:{id}` or `ip:{address}`
    pub fn cache_ident(&self) -> String {
        match self {
            Identity::Account { id, .. } => format!("user:{}", id),
            Identity::Anonymous { address } => format!("ip:{}", address),
        }
    }

    /// Parse a cache identifier back into an identity.
    ///
    /// Accounts come back on the free tier since the tier is not part of the key.
    pub fn from_cache_ident(ident: &str) -> Option<Self> {
        let (kind, value) = ident.split_once(':')?;
        if value.is_empty() {
            return None;
        }
        match kind {
            "user" => Some(Identity::account(value, Tier::Free)),
            "ip" => Some(Identity::anonymous(value)),
            _ => None,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_ident())
    }
}
