use indexmap::IndexMap;
use serde::Deserialize;

/// Meta-field prefix on the wire: `$` (default) or legacy `_`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaPrefix {
    #[serde(rename = "$")]
    Dollar,
    #[serde(rename = "_")]
    Underscore,
}

impl Default for MetaPrefix {
    fn default() -> Self {
        MetaPrefix::Dollar
    }
}

impl MetaPrefix {
    pub fn as_str(self) -> &'static str {
        match self {
            MetaPrefix::Dollar => "$",
            MetaPrefix::Underscore => "_",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdFormat {
    #[default]
    Cuid,
    Sqid,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RestConfig {
    pub base_path: String,
    pub page_size: Option<u32>,
    pub max_page_size: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct McpConfig {
    pub enabled: bool,
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    None,
    Optional,
    Required,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub trust_snippets: bool,
    pub trust_unverified: bool,
}

/// Top-level configuration. The `schema` field is a raw mapping
/// here; `gateway-schema::parse_schema` turns it into a `ParsedSchema`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayConfig {
    pub schema: IndexMap<String, IndexMap<String, String>>,
    pub database: Option<String>,
    pub meta_prefix: MetaPrefix,
    pub id_format: IdFormat,
    pub sqid_seed: Option<u64>,
    pub sqid_min_length: Option<usize>,
    pub rest: RestConfig,
    pub mcp: McpConfig,
    pub auth: AuthConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            schema: IndexMap::new(),
            database: None,
            meta_prefix: MetaPrefix::default(),
            id_format: IdFormat::default(),
            sqid_seed: None,
            sqid_min_length: None,
            rest: RestConfig::default(),
            mcp: McpConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    /// `auth.trustUnverified` was requested but the startup-time feature
    /// flag wasn't set at startup.
    TrustUnverifiedNotAllowed,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "invalid configuration: {msg}"),
            ConfigError::TrustUnverifiedNotAllowed => write!(
                f,
                "auth.trustUnverified is set but not allowed at startup; pass allow_trust_unverified(true) explicitly"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl GatewayConfig {
    pub fn from_yaml(src: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(src).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn page_size(&self) -> u32 {
        self.rest.page_size.unwrap_or(20)
    }

    pub fn max_page_size(&self) -> u32 {
        self.rest.max_page_size.unwrap_or(100)
    }

    /// Validate cross-field invariants that can't be expressed in the
    /// struct's `Deserialize` derive. Call once at startup.
    pub fn validate(&self, allow_trust_unverified: bool) -> Result<(), ConfigError> {
        if self.auth.trust_unverified && !allow_trust_unverified {
            return Err(ConfigError::TrustUnverifiedNotAllowed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_permissive() {
        let cfg = GatewayConfig::default();
        assert_eq!(cfg.meta_prefix.as_str(), "$");
        assert_eq!(cfg.page_size(), 20);
        assert_eq!(cfg.max_page_size(), 100);
        assert!(cfg.validate(false).is_ok());
    }

    #[test]
    fn trust_unverified_requires_flag() {
        let mut cfg = GatewayConfig::default();
        cfg.auth.trust_unverified = true;
        assert_eq!(cfg.validate(false), Err(ConfigError::TrustUnverifiedNotAllowed));
        assert!(cfg.validate(true).is_ok());
    }

    #[test]
    fn parses_yaml() {
        let yaml = r#"
metaPrefix: "_"
rest:
  pageSize: 10
  maxPageSize: 50
auth:
  mode: required
  trustSnippets: true
"#;
        let cfg = GatewayConfig::from_yaml(yaml).unwrap();
        assert_eq!(cfg.meta_prefix.as_str(), "_");
        assert_eq!(cfg.page_size(), 10);
        assert_eq!(cfg.auth.mode, AuthMode::Required);
        assert!(cfg.auth.trust_snippets);
    }
}
