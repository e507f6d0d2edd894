use gateway_core::config::ConfigError;
use gateway_schema::SchemaError;

/// Startup-time failures the facade's build step can raise — schema
/// parse errors and config invariant violations, per §7's propagation
/// policy ("parse-time errors are fatal at startup"). Neither variant is
/// ever turned into a wire response; a `GatewayBuilder::build()` that
/// returns `Err` means the process should not start serving traffic.
#[derive(Debug)]
pub enum GatewayError {
    Schema(SchemaError),
    Config(ConfigError),
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::Schema(e) => write!(f, "schema error: {e}"),
            GatewayError::Config(e) => write!(f, "config error: {e}"),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<SchemaError> for GatewayError {
    fn from(e: SchemaError) -> Self {
        GatewayError::Schema(e)
    }
}

impl From<ConfigError> for GatewayError {
    fn from(e: ConfigError) -> Self {
        GatewayError::Config(e)
    }
}
