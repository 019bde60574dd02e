use config::{Config, Environment};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str =
    "https://www.nottingham.ac.uk/~brzoaths/database/oath_reference_details.php";

/// Fetch tuning, overridable through `OATHS_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
    /// Pause between two pages.
    pub delay_secs: u64,
    /// Pause after a timeout or an error page before retrying.
    pub invalid_backoff_secs: u64,
    pub max_retries: u32,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            base_url: DEFAULT_BASE_URL.to_string(),
            delay_secs: 10,
            invalid_backoff_secs: 60,
            max_retries: 2,
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/104.0.5112.79 Safari/537.36".to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, config::ConfigError> {
        let d = Settings::default();
        Config::builder()
            .set_default("base_url", d.base_url)?
            .set_default("delay_secs", d.delay_secs as i64)?
            .set_default("invalid_backoff_secs", d.invalid_backoff_secs as i64)?
            .set_default("max_retries", i64::from(d.max_retries))?
            .set_default("timeout_secs", d.timeout_secs as i64)?
            .set_default("user_agent", d.user_agent)?
            .add_source(Environment::with_prefix("OATHS").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_environment() {
        let s = Settings::load().unwrap();
        assert!(s.base_url.ends_with("oath_reference_details.php"));
        assert!(s.max_retries >= 1);
    }
}
