use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub graphql: GraphqlConfig,
    pub auth: AuthConfig,
    pub orders: OrdersConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub checkout: CheckoutConfig,
    pub features: FeatureFlags,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

// Удалённый GraphQL API кинотеатров
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlConfig {
    pub url: String,
    pub timeout_seconds: u64,
}

impl GraphqlConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

// Сессии выдаёт внешний auth-сервис, мы только проверяем подпись
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub session_secret: String,
    pub sign_in_path: String,
}

// Сервис заказов (отправка писем с билетом)
#[derive(Debug, Clone, Deserialize)]
pub struct OrdersConfig {
    pub url: String,
}

// Настройки Circuit Breaker
#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub timeout_seconds: u64,
}

// Время жизни незавершённых оформлений
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutConfig {
    pub ttl_seconds: u64,
    pub sweep_interval_seconds: u64,
    /// Сколько ещё держать оформление, застрявшее в Checking/Booking
    pub busy_ttl_seconds: u64,
}

impl CheckoutConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }

    pub fn busy_ttl(&self) -> Duration {
        Duration::from_secs(self.busy_ttl_seconds)
    }
}

// Feature flags для включения/выключения функциональности
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    pub enable_mail: bool,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            app: AppConfig {
                host: var_or("HOST", "0.0.0.0"),
                port: parse_var("PORT", "8000")?,
                environment: var_or("ENVIRONMENT", "development"),
                rust_log: var_or("RUST_LOG", "cinema_booking=debug,tower_http=debug"),
                log_format: parse_var("LOG_FORMAT", "pretty")?,
            },
            graphql: GraphqlConfig {
                url: var_or("GRAPHQL_URL", "http://0.0.0.0:80/graphql"),
                timeout_seconds: parse_var("GRAPHQL_TIMEOUT_SECONDS", "10")?,
            },
            auth: AuthConfig {
                session_secret: required("SESSION_SECRET")?,
                sign_in_path: var_or("SIGN_IN_PATH", "/api/auth/signin"),
            },
            orders: OrdersConfig {
                url: var_or("ORDERS_URL", "http://localhost:8000/orders-service"),
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: parse_var("CIRCUIT_BREAKER_FAILURE_THRESHOLD", "5")?,
                timeout_seconds: parse_var("CIRCUIT_BREAKER_TIMEOUT_SECONDS", "60")?,
            },
            checkout: CheckoutConfig {
                ttl_seconds: parse_var("CHECKOUT_TTL_SECONDS", "900")?,
                sweep_interval_seconds: parse_var("CHECKOUT_SWEEP_INTERVAL_SECONDS", "60")?,
                busy_ttl_seconds: parse_var("CHECKOUT_BUSY_TTL_SECONDS", "1800")?,
            },
            features: FeatureFlags {
                enable_mail: parse_var("ENABLE_MAIL", "true")?,
            },
        })
    }
}

fn var_or(name: &'static str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_var<T: FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    parse_value(name, &var_or(name, default))
}

fn parse_value<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}
