/// Server configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server listen port.
    pub port: u16,
    /// Server bind host.
    pub host: String,
    /// Largest accepted move text, in bytes.
    pub max_move_text: usize,
    /// Largest accepted half-move count in a request.
    pub max_half_moves: usize,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            port: env_parse("PORT").unwrap_or(defaults.port),
            host: std::env::var("HOST").unwrap_or(defaults.host),
            max_move_text: env_parse("CHESS_MAX_MOVE_TEXT").unwrap_or(defaults.max_move_text),
            max_half_moves: env_parse("CHESS_MAX_HALF_MOVES").unwrap_or(defaults.max_half_moves),
        }
    }

    /// Socket address string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            port: 8082,
            host: "0.0.0.0".to_string(),
            max_move_text: 16 * 1024,
            max_half_moves: 1000,
        }
    }
}
