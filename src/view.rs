//! Turns loaded tables and a country selection into a render plan
//!
//! Everything here is a pure function of its inputs except the map sample,
//! which draws from the caller's RNG.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::config::{DashboardConfig, RenderOptions};
use crate::error::{DataError, MissingDataFile};
use crate::loader::{self, LoadOutcome};
use crate::models::{OrderRecord, OrderTable, ReferenceEntry, ReferenceTable};
use crate::plot::MapSpec;

pub const ALL_COUNTRIES: &str = "All";

pub const PAGE_TITLE: &str = "Supply Chain Risk Management System";
pub const COUNTRY_SELECT_LABEL: &str = "Select a Country to Analyze:";
pub const ORDER_OVERVIEW_HEADING: &str = "Order Data Overview";
pub const REFERENCE_OVERVIEW_HEADING: &str = "Geopolitical & Supplier Risk Data";
pub const RISK_HEADING: &str = "Risk Analysis & Alerts";
pub const MAP_HEADING: &str = "Risk Locations on Realistic Map";
pub const NOT_LOADED_WARNING: &str = "Data not loaded. Please check file paths and restart the app.";
pub const NO_RISK_MESSAGE: &str = "No high-risk orders detected.";

/// Country selector value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CountryFilter {
    #[default]
    All,
    Country(String),
}

impl CountryFilter {
    pub fn label(&self) -> &str {
        match self {
            CountryFilter::All => ALL_COUNTRIES,
            CountryFilter::Country(c) => c,
        }
    }

    pub fn matches(&self, order: &OrderRecord) -> bool {
        match self {
            CountryFilter::All => true,
            CountryFilter::Country(c) => order.customer_country == *c,
        }
    }
}

impl From<&str> for CountryFilter {
    fn from(s: &str) -> Self {
        if s == ALL_COUNTRIES {
            CountryFilter::All
        } else {
            CountryFilter::Country(s.to_string())
        }
    }
}

impl From<Option<&str>> for CountryFilter {
    fn from(s: Option<&str>) -> Self {
        s.map(CountryFilter::from).unwrap_or_default()
    }
}

/// `"All"` followed by each distinct country of the unfiltered table, in
/// order of first appearance
pub fn country_options(orders: &OrderTable) -> Vec<String> {
    let mut options = vec![ALL_COUNTRIES.to_string()];
    let mut seen = std::collections::HashSet::new();
    for order in orders {
        if seen.insert(order.customer_country.as_str()) {
            options.push(order.customer_country.clone());
        }
    }
    options
}

pub fn filter_by_country(orders: &OrderTable, selected: &CountryFilter) -> OrderTable {
    match selected {
        CountryFilter::All => orders.clone(),
        CountryFilter::Country(_) => orders.filter(|o| selected.matches(o)),
    }
}

/// Orders flagged with late-delivery risk, in table order
pub fn high_risk_orders(orders: &OrderTable) -> OrderTable {
    orders.filter(OrderRecord::is_high_risk)
}

/// Uniform sample without replacement of `min(limit, len)` orders
pub fn sample_for_map<R: Rng + ?Sized>(orders: &OrderTable, limit: usize, rng: &mut R) -> Vec<OrderRecord> {
    let amount = limit.min(orders.len());
    orders.rows().choose_multiple(rng, amount).cloned().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum RiskAlert {
    Warning {
        count: usize,
        message: String,
        orders: OrderTable,
    },
    Success {
        message: String,
    },
}

impl RiskAlert {
    pub fn from_subset(high_risk: OrderTable) -> Self {
        if high_risk.is_empty() {
            RiskAlert::Success {
                message: NO_RISK_MESSAGE.to_string(),
            }
        } else {
            let count = high_risk.len();
            RiskAlert::Warning {
                count,
                message: format!("{} High-Risk Orders Found!", count),
                orders: high_risk,
            }
        }
    }

    /// Number of high-risk orders; zero for a success alert
    pub fn count(&self) -> usize {
        match self {
            RiskAlert::Warning { count, .. } => *count,
            RiskAlert::Success { .. } => 0,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            RiskAlert::Warning { message, .. } | RiskAlert::Success { message } => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySelect {
    pub label: String,
    pub options: Vec<String>,
    pub selected: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePreview<T> {
    pub heading: String,
    pub rows: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSection {
    pub heading: String,
    pub alert: RiskAlert,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSection {
    pub heading: String,
    pub spec: MapSpec,
    pub figure: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub country_select: CountrySelect,
    pub filtered_rows: usize,
    pub order_overview: TablePreview<OrderRecord>,
    pub reference_overview: TablePreview<ReferenceEntry>,
    pub risk: RiskSection,
    pub map: MapSection,
}

/// What the page should show for one refresh
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenderPlan {
    NotLoaded {
        title: String,
        error: String,
        missing: MissingDataFile,
        warning: String,
    },
    Ready(Box<Dashboard>),
}

impl RenderPlan {
    pub fn not_loaded(missing: MissingDataFile) -> Self {
        RenderPlan::NotLoaded {
            title: PAGE_TITLE.to_string(),
            error: missing.to_string(),
            missing,
            warning: NOT_LOADED_WARNING.to_string(),
        }
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        match self {
            RenderPlan::Ready(d) => Some(d),
            RenderPlan::NotLoaded { .. } => None,
        }
    }
}

/// Build the render plan for one refresh
pub fn render<R: Rng + ?Sized>(
    outcome: &LoadOutcome,
    selected: &CountryFilter,
    options: &RenderOptions,
    rng: &mut R,
) -> RenderPlan {
    match outcome {
        LoadOutcome::Missing(missing) => RenderPlan::not_loaded(missing.clone()),
        LoadOutcome::Ready { orders, reference } => RenderPlan::Ready(Box::new(render_dashboard(
            orders, reference, selected, options, rng,
        ))),
    }
}

fn render_dashboard<R: Rng + ?Sized>(
    orders: &OrderTable,
    reference: &ReferenceTable,
    selected: &CountryFilter,
    options: &RenderOptions,
    rng: &mut R,
) -> Dashboard {
    let countries = country_options(orders);
    let filtered = filter_by_country(orders, selected);
    debug!(
        "Country filter '{}': {} of {} orders",
        selected.label(),
        filtered.len(),
        orders.len()
    );

    let alert = RiskAlert::from_subset(high_risk_orders(&filtered));
    let sample = sample_for_map(&filtered, options.map_sample_size, rng);
    let spec = MapSpec::scatter_geo(&sample);
    let figure = spec.to_plotly();

    Dashboard {
        title: PAGE_TITLE.to_string(),
        generated_at: Utc::now(),
        country_select: CountrySelect {
            label: COUNTRY_SELECT_LABEL.to_string(),
            options: countries,
            selected: selected.label().to_string(),
        },
        filtered_rows: filtered.len(),
        order_overview: TablePreview {
            heading: ORDER_OVERVIEW_HEADING.to_string(),
            rows: filtered.head(options.preview_rows),
        },
        reference_overview: TablePreview {
            heading: REFERENCE_OVERVIEW_HEADING.to_string(),
            rows: reference.head(options.preview_rows),
        },
        risk: RiskSection {
            heading: RISK_HEADING.to_string(),
            alert,
        },
        map: MapSection {
            heading: MAP_HEADING.to_string(),
            spec,
            figure,
        },
    }
}

/// Load from disk and render, once
pub fn refresh(config: &DashboardConfig, selected: &CountryFilter) -> Result<RenderPlan, DataError> {
    let outcome = loader::load(&config.data)?;
    let mut rng = config.rng();
    Ok(render(&outcome, selected, &config.render, &mut rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn three_orders() -> OrderTable {
        vec![order(1, "USA", 1), order(2, "USA", 0), order(3, "Mexico", 1)]
            .into_iter()
            .collect()
    }

    fn reference(n: usize) -> ReferenceTable {
        (0..n)
            .map(|i| ReferenceEntry {
                fields: format!("Field {}", i),
                description: "Some description".to_string(),
            })
            .collect()
    }

    fn ready(orders: OrderTable) -> LoadOutcome {
        LoadOutcome::Ready {
            orders,
            reference: reference(8),
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_country_filter_parsing() {
        assert_eq!(CountryFilter::from("All"), CountryFilter::All);
        assert_eq!(CountryFilter::from("USA"), CountryFilter::Country("USA".to_string()));
        assert_eq!(CountryFilter::from(None), CountryFilter::All);
        assert_eq!(CountryFilter::from("all"), CountryFilter::Country("all".to_string()));
    }

    #[test]
    fn test_country_options_first_occurrence_order() {
        let orders: OrderTable = vec![
            order(1, "Mexico", 0),
            order(2, "USA", 0),
            order(3, "Mexico", 0),
            order(4, "France", 0),
        ]
        .into_iter()
        .collect();
        assert_eq!(country_options(&orders), vec!["All", "Mexico", "USA", "France"]);
    }

    #[test]
    fn test_country_options_empty_table() {
        assert_eq!(country_options(&OrderTable::default()), vec!["All"]);
    }

    #[test]
    fn test_filter_all_is_identity() {
        let orders = three_orders();
        assert_eq!(filter_by_country(&orders, &CountryFilter::All), orders);
    }

    #[test]
    fn test_filter_by_country_keeps_order() {
        let orders = three_orders();
        let usa = filter_by_country(&orders, &CountryFilter::from("USA"));
        assert!(usa.iter().all(|o| o.customer_country == "USA"));
        let ids: Vec<i64> = usa.iter().map(|o| o.order_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_high_risk_subset() {
        let orders = three_orders();
        let risky = high_risk_orders(&orders);
        let ids: Vec<i64> = risky.iter().map(|o| o.order_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_flag_other_than_one_is_not_high_risk() {
        let orders: OrderTable = vec![order(1, "USA", 2), order(2, "USA", -1)].into_iter().collect();
        assert!(high_risk_orders(&orders).is_empty());
    }

    #[test]
    fn test_alert_from_subset() {
        let alert = RiskAlert::from_subset(high_risk_orders(&three_orders()));
        assert_eq!(alert.count(), 2);
        assert_eq!(alert.message(), "2 High-Risk Orders Found!");

        let clear = RiskAlert::from_subset(OrderTable::default());
        assert_eq!(clear.count(), 0);
        assert_eq!(clear.message(), NO_RISK_MESSAGE);
    }

    #[test]
    fn test_sample_size_is_capped() {
        let orders: OrderTable = (0..1200).map(|i| order(i, "USA", (i % 2) as i32)).collect();
        let sample = sample_for_map(&orders, 500, &mut rng());
        assert_eq!(sample.len(), 500);

        let ids: HashSet<i64> = sample.iter().map(|o| o.order_id).collect();
        assert_eq!(ids.len(), 500, "sample contains duplicates");
        assert!(ids.iter().all(|id| (0..1200).contains(id)));
    }

    #[test]
    fn test_sample_smaller_table_takes_all() {
        let orders = three_orders();
        let sample = sample_for_map(&orders, 500, &mut rng());
        let mut ids: Vec<i64> = sample.iter().map(|o| o.order_id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_usa_scenario() {
        let plan = render(
            &ready(three_orders()),
            &CountryFilter::from("USA"),
            &RenderOptions::default(),
            &mut rng(),
        );
        let dash = plan.dashboard().unwrap();

        assert_eq!(dash.filtered_rows, 2);
        assert_eq!(dash.risk.alert.count(), 1);
        match &dash.risk.alert {
            RiskAlert::Warning { orders, .. } => {
                assert_eq!(orders.rows(), &[order(1, "USA", 1)]);
            }
            other => panic!("expected warning, got {other:?}"),
        }
        assert_eq!(dash.map.spec.len(), 2);
        assert_eq!(dash.country_select.options, vec!["All", "USA", "Mexico"]);
        assert_eq!(dash.country_select.selected, "USA");
    }

    #[test]
    fn test_empty_filter_result() {
        let plan = render(
            &ready(three_orders()),
            &CountryFilter::from("Atlantis"),
            &RenderOptions::default(),
            &mut rng(),
        );
        let dash = plan.dashboard().unwrap();

        assert_eq!(dash.filtered_rows, 0);
        assert!(dash.order_overview.rows.is_empty());
        assert_eq!(dash.reference_overview.rows.len(), 5);
        assert!(matches!(dash.risk.alert, RiskAlert::Success { .. }));
        assert!(dash.map.spec.is_empty());
    }

    #[test]
    fn test_previews_are_capped() {
        let orders: OrderTable = (0..12).map(|i| order(i, "USA", 0)).collect();
        let plan = render(&ready(orders), &CountryFilter::All, &RenderOptions::default(), &mut rng());
        let dash = plan.dashboard().unwrap();

        let ids: Vec<i64> = dash.order_overview.rows.iter().map(|o| o.order_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert_eq!(dash.reference_overview.rows.len(), 5);
        assert_eq!(dash.reference_overview.rows[0].fields, "Field 0");
    }

    #[test]
    fn test_custom_render_options() {
        let orders: OrderTable = (0..50).map(|i| order(i, "USA", 1)).collect();
        let options = RenderOptions {
            preview_rows: 2,
            map_sample_size: 10,
        };
        let plan = render(&ready(orders), &CountryFilter::All, &options, &mut rng());
        let dash = plan.dashboard().unwrap();
        assert_eq!(dash.order_overview.rows.len(), 2);
        assert_eq!(dash.map.spec.len(), 10);
        assert_eq!(dash.risk.alert.count(), 50);
    }

    #[test]
    fn test_missing_files_only_warn() {
        let missing = MissingDataFile::new(vec![PathBuf::from("data/a.csv"), PathBuf::from("data/b.csv")]);
        let plan = render(
            &LoadOutcome::Missing(missing),
            &CountryFilter::All,
            &RenderOptions::default(),
            &mut rng(),
        );
        assert!(plan.dashboard().is_none());

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["status"], "not_loaded");
        assert_eq!(json["warning"], NOT_LOADED_WARNING);
        assert!(json.get("risk").is_none());
        assert!(json.get("map").is_none());
    }

    #[test]
    fn test_ready_plan_json_shape() {
        let plan = render(&ready(three_orders()), &CountryFilter::All, &RenderOptions::default(), &mut rng());
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["status"], "ready");
        assert_eq!(json["title"], PAGE_TITLE);
        assert_eq!(json["risk"]["alert"]["level"], "warning");
        assert_eq!(json["risk"]["alert"]["count"], 2);
        assert_eq!(json["order_overview"]["rows"][0]["Customer Country"], "USA");
        assert_eq!(json["map"]["figure"]["data"][0]["type"], "scattermapbox");
    }

    #[test]
    fn test_refresh_with_missing_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = DashboardConfig {
            data: crate::config::DataConfig::new(dir.path().join("nope")),
            ..Default::default()
        };
        let plan = refresh(&config, &CountryFilter::All).unwrap();
        assert!(matches!(plan, RenderPlan::NotLoaded { .. }));
    }
}
