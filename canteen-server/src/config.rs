//! Server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration, loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port (REST API + WebSocket upgrades)
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Outbound per-connection channel capacity
    pub ws_channel_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: env_parse("HTTP_PORT", 8080)?,
            environment,
            ws_channel_capacity: env_parse("WS_CHANNEL_CAPACITY", 32)?,
        })
    }
}

/// Parse an optional numeric env var. Absent means the default; a value that
/// is present but unparseable is a configuration error, not a silent default.
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T, BoxError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| format!("{name} must be a number, got {raw:?}").into()),
        Err(std::env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_numeric_env_uses_the_default() {
        assert_eq!(env_parse::<u16>("CANTEEN_TEST_ABSENT_PORT", 8080).unwrap(), 8080);
    }

    #[test]
    fn present_numeric_env_is_parsed() {
        unsafe { std::env::set_var("CANTEEN_TEST_PORT", "9090") };
        assert_eq!(env_parse::<u16>("CANTEEN_TEST_PORT", 8080).unwrap(), 9090);
    }

    #[test]
    fn invalid_numeric_env_is_an_error() {
        unsafe { std::env::set_var("CANTEEN_TEST_BAD_PORT", "not-a-port") };
        let err = env_parse::<u16>("CANTEEN_TEST_BAD_PORT", 8080).unwrap_err();
        assert!(err.to_string().contains("CANTEEN_TEST_BAD_PORT"));
    }
}
