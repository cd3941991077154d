use serde::{Deserialize, Serialize};

/// CSV headers of the order columns we load, in projection order
pub const ORDER_COLUMNS: [&str; 7] = [
    "Order Id",
    "Order Status",
    "Customer Country",
    "Order Profit Per Order",
    "Latitude",
    "Longitude",
    "Late_delivery_risk",
];

/// CSV headers of the reference (field description) columns we load
pub const REFERENCE_COLUMNS: [&str; 2] = ["FIELDS", "DESCRIPTION"];

/// One order row from the supply chain dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(rename = "Order Id")]
    pub order_id: i64,
    #[serde(rename = "Order Status")]
    pub order_status: String,
    #[serde(rename = "Customer Country")]
    pub customer_country: String,
    /// Blank cells load as `None`
    #[serde(rename = "Order Profit Per Order")]
    pub order_profit_per_order: Option<f64>,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "Late_delivery_risk")]
    pub late_delivery_risk: i32,
}

impl OrderRecord {
    pub fn is_high_risk(&self) -> bool {
        self.late_delivery_risk == 1
    }
}

/// One row of the field description table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    #[serde(rename = "FIELDS")]
    pub fields: String,
    #[serde(rename = "DESCRIPTION")]
    pub description: String,
}

/// Ordered, read-only collection of rows.
///
/// Filtering produces a new table; rows are never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Table<T> {
    rows: Vec<T>,
}

pub type OrderTable = Table<OrderRecord>;
pub type ReferenceTable = Table<ReferenceEntry>;

impl<T> Table<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<T> {
        self.rows
    }
}

impl<T: Clone> Table<T> {
    /// First `n` rows in table order
    pub fn head(&self, n: usize) -> Vec<T> {
        self.rows.iter().take(n).cloned().collect()
    }

    /// New table holding the rows that match `predicate`, order preserved
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool,
    {
        Self {
            rows: self.rows.iter().filter(|r| predicate(r)).cloned().collect(),
        }
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<T> FromIterator<T> for Table<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Table<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
pub(crate) fn order(id: i64, country: &str, risk: i32) -> OrderRecord {
    OrderRecord {
        order_id: id,
        order_status: "COMPLETE".to_string(),
        customer_country: country.to_string(),
        order_profit_per_order: Some(12.5),
        latitude: 18.25,
        longitude: -66.04,
        late_delivery_risk: risk,
    }
}
