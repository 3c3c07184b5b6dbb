// HTTP dashboard client
use crate::application::dashboard_source::DashboardSource;
use crate::application::error::DashboardError;
use crate::domain::snapshot::DashboardSnapshot;
use async_trait::async_trait;

pub const DASHBOARD_PATH: &str = "/api/dashboard";

#[derive(Debug, Clone)]
pub struct HttpDashboardClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpDashboardClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn build_url(&self, month: Option<&str>) -> String {
        match month.filter(|m| !m.is_empty()) {
            Some(month) => format!(
                "{}{}?month={}",
                self.base_url,
                DASHBOARD_PATH,
                urlencoding::encode(month)
            ),
            None => format!("{}{}", self.base_url, DASHBOARD_PATH),
        }
    }
}

#[async_trait]
impl DashboardSource for HttpDashboardClient {
    async fn fetch_snapshot(&self, month: Option<&str>) -> Result<DashboardSnapshot, DashboardError> {
        let url = self.build_url(month);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
