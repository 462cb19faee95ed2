use std::net::SocketAddr;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_FROM_NAME: &str = "Investor Portal";

/// Relay configuration, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    /// `RELAY_LISTEN_ADDR`
    pub listen_addr: SocketAddr,
    /// `SENDGRID_API_KEY`
    pub sendgrid_api_key: Option<String>,
    /// `MAIL_FROM_ADDRESS`
    pub from_address: Option<String>,
    /// `MAIL_FROM_NAME`
    pub from_name: String,
    /// `RELAY_LOG_FORMAT`: "text" (default) or "json"
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let listen_addr = std::env::var("RELAY_LISTEN_ADDR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)));

        Self {
            listen_addr,
            sendgrid_api_key: non_empty_var("SENDGRID_API_KEY"),
            from_address: non_empty_var("MAIL_FROM_ADDRESS"),
            from_name: non_empty_var("MAIL_FROM_NAME").unwrap_or_else(|| DEFAULT_FROM_NAME.to_string()),
            log_format: non_empty_var("RELAY_LOG_FORMAT").unwrap_or_else(|| "text".to_string()),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
