//! Connection credentials
//!
//! The project URL and API keys are read once at startup. Validation yields one
//! check line per value plus the session configuration, or `None` when the
//! session cannot start.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use url::Url;

/// Environment variable holding the project URL
pub const URL_VAR: &str = "SUPABASE_URL";

/// Environment variable holding the privileged (service role) key
pub const SERVICE_KEY_VAR: &str = "SUPABASE_SERVICE_ROLE_KEY";

/// Environment variable holding the restricted (anon) key
pub const ANON_KEY_VAR: &str = "SUPABASE_ANON_KEY";

/// Which credential tier the session runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Privileged key, bypasses row-level policies
    Service,
    /// Restricted key, subject to row-level policies
    Anon,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Service => f.write_str("service role"),
            KeyKind::Anon => f.write_str("anon"),
        }
    }
}

/// Validated, immutable session configuration
#[derive(Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Project base URL
    pub service_url: Url,
    /// API key used for every request
    pub api_key: String,
    /// Tier of `api_key`
    pub key_kind: KeyKind,
}

impl SessionConfig {
    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.service_url.as_str().trim_end_matches('/')
    }
}

// Keeps keys out of debug logs
impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("service_url", &self.service_url.as_str())
            .field("api_key", &mask_key(&self.api_key))
            .field("key_kind", &self.key_kind)
            .finish()
    }
}

/// Outcome of a single configuration check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// One reported configuration check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigCheck {
    pub status: CheckStatus,
    pub message: String,
}

impl ConfigCheck {
    fn pass(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Pass,
            message: message.into(),
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Warn,
            message: message.into(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Fail,
            message: message.into(),
        }
    }
}

/// Result of validating credentials
#[derive(Debug, Clone)]
pub struct Validation {
    /// Check lines in reporting order
    pub checks: Vec<ConfigCheck>,
    /// Present only when the session may proceed
    pub config: Option<SessionConfig>,
}

impl Validation {
    /// Whether startup may continue
    pub fn can_proceed(&self) -> bool {
        self.config.is_some()
    }
}

/// Raw credential values as found in the environment
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub url: Option<String>,
    pub service_key: Option<String>,
    pub anon_key: Option<String>,
}

impl Credentials {
    /// Build from raw values, treating blank strings as absent
    pub fn new(url: Option<String>, service_key: Option<String>, anon_key: Option<String>) -> Self {
        Self {
            url: non_blank(url),
            service_key: non_blank(service_key),
            anon_key: non_blank(anon_key),
        }
    }

    /// Validate the URL and pick a key, preferring the privileged one
    pub fn validate(&self) -> Validation {
        let mut checks = Vec::with_capacity(3);

        let url = match self.url.as_deref() {
            None => {
                checks.push(ConfigCheck::fail(format!("{URL_VAR} is not set")));
                None
            }
            Some(raw) => match parse_service_url(raw) {
                Ok(url) => {
                    checks.push(ConfigCheck::pass(format!("{URL_VAR}: {url}")));
                    Some(url)
                }
                Err(reason) => {
                    checks.push(ConfigCheck::fail(format!(
                        "{URL_VAR} is not a valid URL ({reason}): {raw}"
                    )));
                    None
                }
            },
        };

        let key = match (&self.service_key, &self.anon_key) {
            (Some(service), _) => {
                checks.push(ConfigCheck::pass(format!(
                    "{SERVICE_KEY_VAR}: {}",
                    mask_key(service)
                )));
                if let Some(role) = key_role(service).filter(|r| r != "service_role") {
                    checks.push(ConfigCheck::warn(format!(
                        "{SERVICE_KEY_VAR} carries role '{role}', not 'service_role'; check that the right key was copied"
                    )));
                }
                Some((service.clone(), KeyKind::Service))
            }
            (None, Some(_)) => {
                checks.push(ConfigCheck::warn(format!(
                    "{SERVICE_KEY_VAR} is not set; falling back to the anon key, diagnostics will be limited"
                )));
                None
            }
            (None, None) => {
                checks.push(ConfigCheck::fail(format!(
                    "No API key set: provide {SERVICE_KEY_VAR} or {ANON_KEY_VAR}"
                )));
                None
            }
        };

        let key = match (&self.anon_key, key) {
            (Some(anon), key) => {
                checks.push(ConfigCheck::pass(format!("{ANON_KEY_VAR}: {}", mask_key(anon))));
                key.or_else(|| Some((anon.clone(), KeyKind::Anon)))
            }
            (None, key) => {
                if key.is_some() {
                    checks.push(ConfigCheck::warn(format!(
                        "{ANON_KEY_VAR} is not set (optional)"
                    )));
                }
                key
            }
        };

        let config = match (url, key) {
            (Some(service_url), Some((api_key, key_kind))) => Some(SessionConfig {
                service_url,
                api_key,
                key_kind,
            }),
            _ => None,
        };

        Validation { checks, config }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse and sanity-check the project URL
pub fn parse_service_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err("missing host".to_string());
    }
    Ok(url)
}

/// Mask a secret for display
pub fn mask_key(key: &str) -> String {
    let prefix: String = key.chars().take(10).collect();
    format!("{prefix}... ({} chars)", key.chars().count())
}

/// Read the `role` claim of a JWT-shaped key without verifying it
///
/// Returns `None` for opaque keys or anything that does not decode.
pub fn key_role(key: &str) -> Option<String> {
    let mut parts = key.split('.');
    let (_, payload, _) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("role")?.as_str().map(str::to_string)
}
