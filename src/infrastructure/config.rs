use serde::Deserialize;

/// Environment variable that overrides `api.base_url`.
pub const BASE_URL_ENV: &str = "DASHBOARD_API_BASE_URL";

/// Upper bound for any poll delay: one day.
pub const MAX_POLL_SECS: u64 = 86_400;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub api: ApiSettings,
    pub refresh: RefreshSettings,
    pub display: DisplaySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    /// Empty means same-origin relative requests, e.g. behind a proxy.
    #[serde(default)]
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RefreshSettings {
    pub interval_secs: u64,
    /// Double the poll delay after each consecutive failure.
    #[serde(default)]
    pub failure_backoff: bool,
    pub max_interval_secs: u64,
}

impl RefreshSettings {
    /// Reject delays the poll timer cannot represent or would spin on.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            (1..=MAX_POLL_SECS).contains(&self.interval_secs),
            "refresh.interval_secs must be between 1 and {}, got {}",
            MAX_POLL_SECS,
            self.interval_secs
        );
        anyhow::ensure!(
            (self.interval_secs..=MAX_POLL_SECS).contains(&self.max_interval_secs),
            "refresh.max_interval_secs must be between refresh.interval_secs ({}) and {}, got {}",
            self.interval_secs,
            MAX_POLL_SECS,
            self.max_interval_secs
        );
        Ok(())
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            failure_backoff: false,
            max_interval_secs: 600,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplaySettings {
    pub color: bool,
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let base_url = std::env::var(BASE_URL_ENV).ok();
    build_config(config::File::with_name("config/dashboard").required(false), base_url)
}

fn build_config<S>(source: S, base_url: Option<String>) -> anyhow::Result<DashboardConfig>
where
    S: config::Source + Send + Sync + 'static,
{
    let defaults = RefreshSettings::default();
    let settings = config::Config::builder()
        .set_default("api.base_url", "")?
        .set_default("refresh.interval_secs", defaults.interval_secs)?
        .set_default("refresh.failure_backoff", defaults.failure_backoff)?
        .set_default("refresh.max_interval_secs", defaults.max_interval_secs)?
        .set_default("display.color", true)?
        .add_source(source)
        .set_override_option("api.base_url", base_url)?
        .build()?;

    let config: DashboardConfig = settings.try_deserialize()?;
    config.refresh.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    #[test]
    fn test_defaults() {
        let config = build_config(File::from_str("", FileFormat::Toml), None).unwrap();
        assert_eq!(config.api.base_url, "");
        assert_eq!(config.refresh, RefreshSettings::default());
        assert_eq!(config.refresh.interval_secs, 60);
        assert!(config.display.color);
    }

    #[test]
    fn test_file_values() {
        let config = build_config(
            File::from_str(
                r#"
                [api]
                base_url = "http://dashboard.internal:8000"

                [refresh]
                interval_secs = 30
                failure_backoff = true
                max_interval_secs = 300

                [display]
                color = false
                "#,
                FileFormat::Toml,
            ),
            None,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "http://dashboard.internal:8000");
        assert_eq!(config.refresh.interval_secs, 30);
        assert!(config.refresh.failure_backoff);
        assert_eq!(config.refresh.max_interval_secs, 300);
        assert!(!config.display.color);
    }

    fn refresh_error(toml: &str) -> String {
        build_config(File::from_str(toml, FileFormat::Toml), None)
            .unwrap_err()
            .to_string()
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = refresh_error("[refresh]\ninterval_secs = 0");
        assert!(err.contains("refresh.interval_secs"), "{}", err);
    }

    #[test]
    fn test_rejects_interval_beyond_one_day() {
        let err = refresh_error("[refresh]\ninterval_secs = 9223372036854775807\nmax_interval_secs = 9223372036854775807");
        assert!(err.contains("refresh.interval_secs"), "{}", err);
    }

    #[test]
    fn test_rejects_max_interval_out_of_range() {
        let below = refresh_error("[refresh]\ninterval_secs = 120\nmax_interval_secs = 60");
        assert!(below.contains("refresh.max_interval_secs"), "{}", below);

        let above = refresh_error("[refresh]\nmax_interval_secs = 86401");
        assert!(above.contains("refresh.max_interval_secs"), "{}", above);
    }

    #[test]
    fn test_accepts_range_bounds() {
        let config = build_config(
            File::from_str("[refresh]\ninterval_secs = 1\nmax_interval_secs = 86400", FileFormat::Toml),
            None,
        )
        .unwrap();
        assert_eq!(config.refresh.interval_secs, 1);
        assert_eq!(config.refresh.max_interval_secs, 86_400);
    }

    #[test]
    fn test_base_url_override() {
        let config = build_config(
            File::from_str("[api]\nbase_url = \"http://from-file\"", FileFormat::Toml),
            Some("http://from-env".to_string()),
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://from-env");
    }
}
