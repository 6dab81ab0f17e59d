//! What the throttles know about an incoming request.

use crate::domain::entities::identity::Identity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Who the request is throttled as
    pub identity: Identity,
    /// Resolved client address, `unknown` when none could be determined
    pub client_ip: String,
    /// HTTP method, upper case
    pub method: String,
    /// Request path without query string
    pub path: String,
}

impl RequestContext {
    pub fn new(
        identity: Identity,
        client_ip: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            identity,
            client_ip: client_ip.into(),
            method: method.into().to_ascii_uppercase(),
            path: path.into(),
        }
    }
}
