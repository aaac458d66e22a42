use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

static NULL_VALUE: Value = Value::Null;

/// A single cell from an exported table. Exports are heterogeneous, so a
/// cell is either numeric, free text, or absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Null,
}

impl Value {
    pub fn parse(raw: &str) -> Value {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        match trimmed.parse::<f64>() {
            Ok(number) => Value::Number(number),
            Err(_) => Value::Text(trimmed.to_string()),
        }
    }

    /// Permissive coercion used for aggregation: missing and non-numeric
    /// values count as zero.
    pub fn as_number(&self) -> f64 {
        self.display_number().unwrap_or(0.0)
    }

    /// Numeric view that keeps "missing" distinct from an actual zero, so
    /// formatting can render a placeholder instead of `0`.
    pub fn display_number(&self) -> Option<f64> {
        match self {
            Value::Number(number) => Some(*number),
            Value::Text(text) => text.trim().parse::<f64>().ok(),
            Value::Null => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(number) if number.fract() == 0.0 => {
                write!(f, "{}", *number as i64)
            }
            Value::Number(number) => write!(f, "{number}"),
            Value::Text(text) => write!(f, "{text}"),
            Value::Null => Ok(()),
        }
    }
}

/// One row of an exported table: column name to cell value. Column sets
/// differ per dataset, so rows are dynamically keyed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: HashMap<String, Value>,
}

impl Record {
    pub fn new() -> Record {
        Record::default()
    }

    pub fn from_pairs(pairs: Vec<(&str, Value)>) -> Record {
        let mut record = Record::new();
        for (column, value) in pairs {
            record.insert(column, value);
        }
        record
    }

    pub fn insert(&mut self, column: &str, value: Value) {
        self.fields.insert(column.to_string(), value);
    }

    /// Missing columns read as `Null`, never panic.
    pub fn get(&self, column: &str) -> &Value {
        self.fields.get(column).unwrap_or(&NULL_VALUE)
    }

    pub fn number(&self, column: &str) -> f64 {
        self.get(column).as_number()
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).as_text()
    }
}

/// An ordered sequence of records from one exported table. Row order is
/// load order; for time-series tables it is chronological and every filter
/// preserves it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&Record> {
        self.rows.first()
    }

    /// Same columns, different rows. Filters use this so the header order
    /// survives narrowing.
    pub fn with_rows(&self, rows: Vec<Record>) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Shared empty dataset, used as the fallback for unknown snapshot keys.
    pub fn empty() -> &'static Dataset {
        static EMPTY: OnceLock<Dataset> = OnceLock::new();
        EMPTY.get_or_init(Dataset::default)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Tickets,
    Efficiency,
    Assignee,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Tickets, Category::Efficiency, Category::Assignee];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tickets => "tickets",
            Category::Efficiency => "efficiency",
            Category::Assignee => "assignee",
        }
    }
}

/// The three-category load result handed to every view. Each category maps
/// a logical dataset key (e.g. "createdByDate") to its parsed table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub tickets: HashMap<String, Dataset>,
    pub efficiency: HashMap<String, Dataset>,
    pub assignee: HashMap<String, Dataset>,
}

impl Snapshot {
    pub fn category(&self, category: Category) -> &HashMap<String, Dataset> {
        match category {
            Category::Tickets => &self.tickets,
            Category::Efficiency => &self.efficiency,
            Category::Assignee => &self.assignee,
        }
    }

    pub fn dataset(&self, category: Category, key: &str) -> &Dataset {
        self.category(category)
            .get(key)
            .unwrap_or_else(|| Dataset::empty())
    }

    /// True when every dataset in every category came back empty, i.e. the
    /// data source was completely unreachable.
    pub fn is_empty(&self) -> bool {
        Category::ALL
            .iter()
            .all(|category| self.category(*category).values().all(Dataset::is_empty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_classifies_cells() {
        assert_eq!(Value::parse("42"), Value::Number(42.0));
        assert_eq!(Value::parse(" 3.5 "), Value::Number(3.5));
        assert_eq!(Value::parse(""), Value::Null);
        assert_eq!(Value::parse("  "), Value::Null);
        assert_eq!(Value::parse("2 Jan 25"), Value::Text("2 Jan 25".to_string()));
    }

    #[test]
    fn coercion_treats_missing_as_zero_but_display_keeps_it_apart() {
        assert_eq!(Value::Null.as_number(), 0.0);
        assert_eq!(Value::Text("n/a".to_string()).as_number(), 0.0);
        assert_eq!(Value::Null.display_number(), None);
        assert_eq!(Value::Number(0.0).display_number(), Some(0.0));
    }

    #[test]
    fn display_drops_trailing_zero_fraction() {
        assert_eq!(Value::Number(14.0).to_string(), "14");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn missing_columns_read_as_null() {
        let record = Record::from_pairs(vec![("Tickets", Value::Number(5.0))]);
        assert_eq!(record.number("Tickets"), 5.0);
        assert!(record.get("No such column").is_null());
        assert_eq!(record.number("No such column"), 0.0);
    }

    #[test]
    fn snapshot_falls_back_to_the_empty_dataset() {
        let snapshot = Snapshot::default();
        assert!(snapshot.dataset(Category::Tickets, "createdByDate").is_empty());
        assert!(snapshot.is_empty());
    }
}
