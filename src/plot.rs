//! Geographic scatter plot of order risk
//!
//! [`MapSpec`] describes the map the dashboard wants drawn. It is handed to
//! the page as-is, and [`MapSpec::to_plotly`] turns it into a Plotly figure
//! document that plotly.js renders without further processing.

use serde::Serialize;
use serde_json::{json, Value};

use crate::models::OrderRecord;

pub const MAP_TITLE: &str = "Geopolitical & Delivery Risks";
pub const MAP_STYLE: &str = "open-street-map";
pub const COLOR_SCALE: &str = "Reds";
pub const TEXT_POSITION: &str = "top center";
pub const ZOOM: u8 = 1;

/// ColorBrewer "Reds", low to high
const REDS: [&str; 9] = [
    "rgb(255,245,240)",
    "rgb(254,224,210)",
    "rgb(252,187,161)",
    "rgb(252,146,114)",
    "rgb(251,106,74)",
    "rgb(239,59,44)",
    "rgb(203,24,29)",
    "rgb(165,15,21)",
    "rgb(103,0,13)",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub order_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub late_delivery_risk: i32,
    pub customer_country: String,
}

impl From<&OrderRecord> for MapPoint {
    fn from(r: &OrderRecord) -> Self {
        Self {
            order_id: r.order_id,
            latitude: r.latitude,
            longitude: r.longitude,
            late_delivery_risk: r.late_delivery_risk,
            customer_country: r.customer_country.clone(),
        }
    }
}

/// Tooltip entry: a column and whether the tooltip shows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoverField {
    pub column: &'static str,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Margin {
    pub r: u32,
    pub t: u32,
    pub l: u32,
    pub b: u32,
}

impl Margin {
    pub const NONE: Margin = Margin { r: 0, t: 0, l: 0, b: 0 };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSpec {
    pub title: String,
    pub lat: &'static str,
    pub lon: &'static str,
    pub color: &'static str,
    pub color_scale: &'static str,
    pub hover_name: &'static str,
    pub text: &'static str,
    pub text_position: &'static str,
    pub hover_data: Vec<HoverField>,
    pub zoom: u8,
    pub margin: Margin,
    pub map_style: &'static str,
    pub points: Vec<MapPoint>,
}

impl MapSpec {
    /// Scatter-geo request over `sample`, colored by late-delivery risk
    pub fn scatter_geo(sample: &[OrderRecord]) -> Self {
        Self {
            title: MAP_TITLE.to_string(),
            lat: "Latitude",
            lon: "Longitude",
            color: "Late_delivery_risk",
            color_scale: COLOR_SCALE,
            hover_name: "Customer Country",
            text: "Customer Country",
            text_position: TEXT_POSITION,
            hover_data: vec![
                HoverField { column: "Latitude", visible: false },
                HoverField { column: "Longitude", visible: false },
                HoverField { column: "Late_delivery_risk", visible: true },
            ],
            zoom: ZOOM,
            margin: Margin::NONE,
            map_style: MAP_STYLE,
            points: sample.iter().map(MapPoint::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Mean position of the points; the map opens centered here
    pub fn center(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f64;
        let lat = self.points.iter().map(|p| p.latitude).sum::<f64>() / n;
        let lon = self.points.iter().map(|p| p.longitude).sum::<f64>() / n;
        Some((lat, lon))
    }

    fn hovertemplate(&self) -> String {
        let mut template = "<b>%{hovertext}</b><br><br>".to_string();
        // Only columns carried by the trace can be shown
        let shown: Vec<String> = self
            .hover_data
            .iter()
            .filter(|f| f.visible)
            .filter_map(|f| {
                let placeholder = if f.column == self.color {
                    "%{marker.color}"
                } else if f.column == self.lat {
                    "%{lat}"
                } else if f.column == self.lon {
                    "%{lon}"
                } else {
                    return None;
                };
                Some(format!("{}={}", f.column, placeholder))
            })
            .collect();
        template.push_str(&shown.join("<br>"));
        template.push_str("<extra></extra>");
        template
    }

    /// Plotly figure (`data` + `layout`) for this map
    pub fn to_plotly(&self) -> Value {
        let lat: Vec<f64> = self.points.iter().map(|p| p.latitude).collect();
        let lon: Vec<f64> = self.points.iter().map(|p| p.longitude).collect();
        let risk: Vec<i32> = self.points.iter().map(|p| p.late_delivery_risk).collect();
        let countries: Vec<&str> = self.points.iter().map(|p| p.customer_country.as_str()).collect();

        let step = 1.0 / (REDS.len() - 1) as f64;
        let colorscale: Vec<Value> = REDS
            .iter()
            .enumerate()
            .map(|(i, c)| json!([i as f64 * step, c]))
            .collect();

        let mut mapbox = json!({
            "style": self.map_style,
            "zoom": self.zoom,
        });
        if let Some((clat, clon)) = self.center() {
            mapbox["center"] = json!({ "lat": clat, "lon": clon });
        }

        json!({
            "data": [{
                "type": "scattermapbox",
                "mode": "markers+text",
                "lat": lat,
                "lon": lon,
                "text": countries,
                "hovertext": countries,
                "textposition": self.text_position,
                "hovertemplate": self.hovertemplate(),
                "marker": {
                    "color": risk,
                    "coloraxis": "coloraxis",
                },
                "showlegend": false,
            }],
            "layout": {
                "title": { "text": self.title },
                "mapbox": mapbox,
                "coloraxis": {
                    "colorscale": colorscale,
                    "colorbar": { "title": { "text": self.color } },
                },
                "margin": {
                    "r": self.margin.r,
                    "t": self.margin.t,
                    "l": self.margin.l,
                    "b": self.margin.b,
                },
            },
        })
    }
}
