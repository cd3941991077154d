//! Late-delivery risk report in the terminal
//! Run: ./target/release/risk_report --country "EE. UU."

use anyhow::Result;
use clap::Parser;
use std::collections::BTreeMap;
use supply_chain_risk::config::DataArgs;
use supply_chain_risk::models::{OrderRecord, ReferenceEntry};
use supply_chain_risk::view::{self, CountryFilter, Dashboard, RenderPlan, RiskAlert};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "risk_report")]
#[command(about = "Print the supply chain risk dashboard as text")]
struct Args {
    /// Country to analyze ("All" for every country)
    #[arg(long, default_value = "All")]
    country: String,

    /// Maximum high-risk orders to list
    #[arg(long, default_value = "20")]
    max_risk_rows: usize,

    /// List the selectable countries and exit
    #[arg(long)]
    list_countries: bool,

    #[command(flatten)]
    data: DataArgs,
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

fn print_orders(rows: &[OrderRecord]) {
    println!(
        "  {:>8} {:16} {:20} {:>12} {:>10} {:>11} {:>5}",
        "Order Id", "Status", "Country", "Profit", "Latitude", "Longitude", "Risk"
    );
    println!("  {}", "-".repeat(88));
    for r in rows {
        println!(
            "  {:>8} {:16} {:20} {:>12} {:>10.4} {:>11.4} {:>5}",
            r.order_id,
            truncate(&r.order_status, 16),
            truncate(&r.customer_country, 20),
            r.order_profit_per_order
                .map(|p| format!("{:.2}", p))
                .unwrap_or_else(|| "-".to_string()),
            r.latitude,
            r.longitude,
            r.late_delivery_risk
        );
    }
    if rows.is_empty() {
        println!("  (no rows)");
    }
}

fn print_reference(rows: &[ReferenceEntry]) {
    println!("  {:28} {}", "Field", "Description");
    println!("  {}", "-".repeat(88));
    for r in rows {
        println!("  {:28} {}", truncate(&r.fields, 28), truncate(&r.description, 58));
    }
    if rows.is_empty() {
        println!("  (no rows)");
    }
}

fn print_dashboard(dash: &Dashboard, max_risk_rows: usize) {
    println!("Country: {}   ({} orders)", dash.country_select.selected, dash.filtered_rows);

    println!("\n{}", dash.order_overview.heading.to_uppercase());
    print_orders(&dash.order_overview.rows);

    println!("\n{}", dash.reference_overview.heading.to_uppercase());
    print_reference(&dash.reference_overview.rows);

    println!("\n{}", "-".repeat(90));
    println!("{}", dash.risk.heading.to_uppercase());
    match &dash.risk.alert {
        RiskAlert::Warning { message, orders, .. } => {
            println!("  WARNING: {}", message);
            let shown = orders.head(max_risk_rows);
            print_orders(&shown);
            if orders.len() > shown.len() {
                println!("  ... {} more", orders.len() - shown.len());
            }
        }
        RiskAlert::Success { message } => println!("  OK: {}", message),
    }

    println!("\n{}", dash.map.heading.to_uppercase());
    println!("  {} ({} sampled orders)", dash.map.spec.title, dash.map.spec.len());
    if let Some((lat, lon)) = dash.map.spec.center() {
        println!("  Center: {:.4}, {:.4}", lat, lon);
    }

    // country -> (points, at risk)
    let mut by_country: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for p in &dash.map.spec.points {
        let entry = by_country.entry(p.customer_country.as_str()).or_default();
        entry.0 += 1;
        if p.late_delivery_risk == 1 {
            entry.1 += 1;
        }
    }
    if !by_country.is_empty() {
        println!("\n  {:24} {:>8} {:>8} {:>8}", "Country", "Points", "At risk", "Risk%");
        println!("  {}", "-".repeat(52));
        for (country, (points, risky)) in by_country {
            let pct = risky as f64 / points as f64 * 100.0;
            println!("  {:24} {:>8} {:>8} {:>7.1}%", truncate(country, 24), points, risky, pct);
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let config = args.data.into_config();
    let selected = CountryFilter::from(args.country.as_str());

    let plan = view::refresh(&config, &selected)?;

    println!("\n{}", "=".repeat(90));
    match &plan {
        RenderPlan::Ready(dash) => println!("{:^90}", dash.title.to_uppercase()),
        RenderPlan::NotLoaded { title, .. } => println!("{:^90}", title.to_uppercase()),
    }
    println!("{}\n", "=".repeat(90));

    match &plan {
        RenderPlan::NotLoaded { error, missing, warning, .. } => {
            println!("ERROR: {}", error);
            for path in &missing.missing {
                println!("  missing: {}", path.display());
            }
            println!("WARNING: {}", warning);
        }
        RenderPlan::Ready(dash) if args.list_countries => {
            for country in &dash.country_select.options {
                println!("  {}", country);
            }
        }
        RenderPlan::Ready(dash) => print_dashboard(dash, args.max_risk_rows),
    }

    Ok(())
}
