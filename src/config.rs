use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub frontend_base_url: String,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_ssl_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    pub smtp_from: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_questions_model: String,
    pub openai_feedback_model: String,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub youtube_captions_enabled: bool,
    pub public_rps: u32,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "0.0.0.0:8000"),
            frontend_base_url: get_env_or("FRONTEND_BASE_URL", "http://localhost:3000"),
            smtp_host: env::var("SMTP_HOST").ok(),
            smtp_port: get_env_parse_or("SMTP_PORT", 587)?,
            smtp_ssl_port: get_env_parse_or("SMTP_SSL_PORT", 465)?,
            smtp_user: env::var("SMTP_USER").ok(),
            smtp_pass: env::var("SMTP_PASS").ok(),
            smtp_from: env::var("SMTP_FROM").ok(),
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            openai_questions_model: get_env_or("OPENAI_QUESTIONS_MODEL", "gpt-4o-mini"),
            openai_feedback_model: get_env_or("OPENAI_FEEDBACK_MODEL", "gpt-4o-mini"),
            s3_bucket: env::var("AWS_S3_BUCKET").ok(),
            s3_region: env::var("AWS_REGION").ok(),
            youtube_captions_enabled: get_env_parse_or("YOUTUBE_CAPTIONS_ENABLED", true)?,
            public_rps: get_env_parse_or("PUBLIC_RPS", 50)?,
        })
    }

    /// Email is only queued when the full SMTP credential set is present.
    pub fn smtp_configured(&self) -> bool {
        self.smtp_host.is_some() && self.smtp_user.is_some() && self.smtp_pass.is_some()
    }

    pub fn smtp_sender(&self) -> String {
        self.smtp_from
            .clone()
            .or_else(|| self.smtp_user.clone())
            .unwrap_or_else(|| "no-reply@example.com".to_string())
    }

    pub fn quiz_url(&self, quiz_id: &str) -> String {
        format!(
            "{}/quiz/{}",
            self.frontend_base_url.trim_end_matches('/'),
            quiz_id
        )
    }
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
