use crate::config::FlowsConfig;

/// The two ways a client can drive the authorization code grant.
///
/// Both share the same logic and differ only in the redirect URI registered
/// with Spotify and in how results are handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Full-page navigation: results are redirects carrying a URL fragment.
    Browser,
    /// Script-driven: results are JSON bodies.
    App,
}

impl Flow {
    pub fn redirect_uri(self, flows: &FlowsConfig) -> &str {
        match self {
            Flow::Browser => &flows.redirect_uri,
            Flow::App => &flows.app_redirect_uri,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Flow::Browser => "browser",
            Flow::App => "app",
        }
    }
}
