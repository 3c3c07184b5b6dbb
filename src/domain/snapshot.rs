// Dashboard snapshot domain model
use serde::Deserialize;
use std::collections::HashMap;

/// One complete, internally consistent fetch of the dashboard endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardSnapshot {
    pub available_months: Vec<String>,
    pub selected_month: String,
    pub kpi_cards: Vec<KpiCard>,
    pub funnel_stages: Vec<FunnelStage>,
    pub section_ankenjika: Vec<MonthlyRow>,
    pub section_apo_kakutoku: Vec<MonthlyRow>,
    pub section_lead_kakutoku: Vec<MonthlyRow>,
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KpiCard {
    pub label: String,
    #[serde(default)]
    pub target: Option<f64>,
    #[serde(default)]
    pub actual: Option<f64>,
    #[serde(default)]
    pub achievement_rate: Option<f64>,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FunnelStage {
    pub label: String,
    #[serde(default)]
    pub actual: Option<f64>,
    pub benchmark: f64,
    #[serde(default)]
    pub achievement_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonthlyRow {
    pub metric: String,
    #[serde(default)]
    pub columns: HashMap<String, Option<f64>>,
}

impl MonthlyRow {
    /// Value for `month`; a month missing from a sparse row is absent.
    pub fn value(&self, month: &str) -> Option<f64> {
        self.columns.get(month).copied().flatten()
    }
}

/// The three monthly metric tables, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Ankenjika,
    ApoKakutoku,
    LeadKakutoku,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Ankenjika, Section::ApoKakutoku, Section::LeadKakutoku];

    pub fn title(self) -> &'static str {
        match self {
            Section::Ankenjika => "案件化",
            Section::ApoKakutoku => "アポ獲得",
            Section::LeadKakutoku => "リード獲得",
        }
    }
}

impl DashboardSnapshot {
    pub fn section(&self, section: Section) -> &[MonthlyRow] {
        match section {
            Section::Ankenjika => &self.section_ankenjika,
            Section::ApoKakutoku => &self.section_apo_kakutoku,
            Section::LeadKakutoku => &self.section_lead_kakutoku,
        }
    }

    pub fn has_month(&self, month: &str) -> bool {
        self.available_months.iter().any(|m| m == month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_nulls_and_sparse_columns() {
        let json = r#"{
            "available_months": ["2024-05", "2024-06"],
            "selected_month": "2024-06",
            "kpi_cards": [
                {"label": "アポ獲得数", "target": 40, "actual": null, "achievement_rate": null, "unit": "件"}
            ],
            "funnel_stages": [
                {"label": "通電率", "actual": 0.31, "benchmark": 0.3, "achievement_rate": 1.03}
            ],
            "section_ankenjika": [
                {"metric": "目標：案件化数", "columns": {"2024-05": 10, "2024-06": null}}
            ],
            "section_apo_kakutoku": [],
            "section_lead_kakutoku": [],
            "last_updated": "2024-06-30T00:00:00Z"
        }"#;

        let snapshot: DashboardSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.available_months, vec!["2024-05", "2024-06"]);
        assert_eq!(snapshot.kpi_cards[0].target, Some(40.0));
        assert_eq!(snapshot.kpi_cards[0].actual, None);
        assert_eq!(snapshot.funnel_stages[0].benchmark, 0.3);

        let row = &snapshot.section(Section::Ankenjika)[0];
        assert_eq!(row.value("2024-05"), Some(10.0));
        assert_eq!(row.value("2024-06"), None);
        assert_eq!(row.value("2024-07"), None);
    }

    #[test]
    fn test_zero_is_not_absent() {
        let row: MonthlyRow =
            serde_json::from_str(r#"{"metric": "実績：リード数", "columns": {"2024-05": 0}}"#).unwrap();
        assert_eq!(row.value("2024-05"), Some(0.0));
    }

    #[test]
    fn test_section_titles_in_display_order() {
        let titles: Vec<&str> = Section::ALL.iter().map(|s| s.title()).collect();
        assert_eq!(titles, vec!["案件化", "アポ獲得", "リード獲得"]);
    }
}
