use std::env;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let host = env::var("RELAYCHAT_SERVER_HOST").unwrap_or_else(|_| default_host());
        let port = env::var("RELAYCHAT_SERVER_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or_else(default_port);

        Self { host, port }
    }
}
