use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use learntwin_algo::BktParams;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sqlite_path: Option<String>,
    pub catalog_path: Option<String>,
    pub api_key: Option<String>,
    pub bkt: BktParams,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let enable_file_logs = std::env::var("ENABLE_FILE_LOGS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string());

        // SQLITE_PATH is the canonical key; DATABASE_URL kept as an alias
        // for deploy environments that inject it.
        let sqlite_path = non_empty_env("SQLITE_PATH").or_else(|| non_empty_env("DATABASE_URL"));
        let catalog_path = non_empty_env("CATALOG_PATH");
        let api_key = non_empty_env("API_KEY");

        Self {
            host,
            port,
            log_level,
            enable_file_logs,
            log_dir,
            sqlite_path,
            catalog_path,
            api_key,
            bkt: bkt_params_from_env(),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_probability(key: &str) -> Option<f64> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|p| (0.0..=1.0).contains(p))
}

fn bkt_params_from_env() -> BktParams {
    let defaults = BktParams::default();
    BktParams {
        prior: env_probability("BKT_PRIOR").unwrap_or(defaults.prior),
        learn_rate: env_probability("BKT_LEARN_RATE").unwrap_or(defaults.learn_rate),
        slip: env_probability("BKT_SLIP").unwrap_or(defaults.slip),
        guess: env_probability("BKT_GUESS").unwrap_or(defaults.guess),
    }
}
