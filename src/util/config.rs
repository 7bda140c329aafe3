use std::{env, str::FromStr, time::Duration};

// ========================// Config //======================== //

/// Configure of the App
#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,
    pub chat_service_addr: String,
    pub message_service_addr: String,
    pub rpc_timeout: Duration,
    pub user_channel_capacity: usize,
    pub send_timeout: Duration,
    pub heartbeat_interval: Duration,
}

impl Config {
    /// Initialize the Config from env
    pub fn from_env() -> Config {
        let server_addr = env::var("SERVER_ADDR").unwrap_or("0.0.0.0:8081".to_owned());
        let jwt_secret = env::var("JWT_SECRET").expect("failed to parse JWT_SECRET");
        let jwt_issuer = env::var("JWT_ISSUER").ok();
        let jwt_audience = env::var("JWT_AUDIENCE").ok();

        let chat_service_addr =
            env::var("CHAT_SERVICE_ADDR").unwrap_or("http://localhost:50051".to_owned());
        let message_service_addr =
            env::var("MESSAGE_SERVICE_ADDR").unwrap_or("http://localhost:50052".to_owned());

        let rpc_timeout = Duration::from_secs(parse_or("RPC_TIMEOUT_SECS", 5));
        let user_channel_capacity = parse_or("USER_CHANNEL_CAPACITY", 100);
        let send_timeout = Duration::from_millis(parse_or("SEND_TIMEOUT_MS", 2000));
        let heartbeat_interval = Duration::from_secs(parse_or("HEARTBEAT_SECS", 15));

        Config {
            server_addr,
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            chat_service_addr,
            message_service_addr,
            rpc_timeout,
            user_channel_capacity,
            send_timeout,
            heartbeat_interval,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "0.0.0.0:8081".to_owned(),
            jwt_secret: "secret".to_owned(),
            jwt_issuer: None,
            jwt_audience: None,
            chat_service_addr: "http://localhost:50051".to_owned(),
            message_service_addr: "http://localhost:50052".to_owned(),
            rpc_timeout: Duration::from_secs(5),
            user_channel_capacity: 100,
            send_timeout: Duration::from_millis(2000),
            heartbeat_interval: Duration::from_secs(15),
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|_| panic!("failed to parse {}", key)),
        Err(_) => default,
    }
}
