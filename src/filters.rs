use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Dataset;

/// Sentinel selection meaning "no specific assignee".
pub const ALL_ASSIGNEES: &str = "all";

const MONTH_ABBREVS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Parse the export's date format, e.g. "2 Jan 25" or "02 Jan 25". The
/// two-digit year is always 2000-based. Anything that is not exactly
/// day / month-abbreviation / two-digit-year is "no date", not an error.
pub fn parse_export_date(raw: &str) -> Option<NaiveDate> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() != 3 {
        return None;
    }

    let day: u32 = tokens[0].parse().ok()?;
    let month = MONTH_ABBREVS.iter().position(|abbrev| *abbrev == tokens[1])? as u32 + 1;
    if tokens[2].len() != 2 {
        return None;
    }
    let year: i32 = tokens[2].parse().ok()?;

    NaiveDate::from_ymd_opt(2000 + year, month, day)
}

/// Keep rows whose date field falls within `[start, end]` inclusive. Rows
/// whose date fails to parse are excluded. Unbounded on both ends is the
/// identity; the input is never mutated.
pub fn filter_by_date_range(
    data: &Dataset,
    date_field: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Dataset {
    if start.is_none() && end.is_none() {
        return data.clone();
    }

    let rows = data
        .rows
        .iter()
        .filter(|row| {
            let date = match row.text(date_field).and_then(parse_export_date) {
                Some(date) => date,
                None => return false,
            };
            if start.is_some_and(|start| date < start) {
                return false;
            }
            if end.is_some_and(|end| date > end) {
                return false;
            }
            true
        })
        .cloned()
        .collect();

    data.with_rows(rows)
}

/// Keep rows whose assignee field matches one of the selected names. An
/// empty selection, or any selection carrying the "all" sentinel, is the
/// identity.
pub fn filter_by_assignees(data: &Dataset, assignee_field: &str, selected: &[String]) -> Dataset {
    if selected.is_empty() || selected.iter().any(|name| name == ALL_ASSIGNEES) {
        return data.clone();
    }

    let rows = data
        .rows
        .iter()
        .filter(|row| {
            row.text(assignee_field)
                .is_some_and(|name| selected.iter().any(|selected| selected == name))
        })
        .cloned()
        .collect();

    data.with_rows(rows)
}

/// Distinct non-empty assignee names in a dataset, sorted. Feeds the
/// presentation layer's selection control.
pub fn assignee_names(data: &Dataset, assignee_field: &str) -> Vec<String> {
    let names: BTreeSet<&str> = data
        .rows
        .iter()
        .filter_map(|row| row.text(assignee_field))
        .filter(|name| !name.is_empty())
        .collect();

    names.into_iter().map(str::to_string).collect()
}

/// Whether the current selection is everyone or one specific assignee.
/// With several names selected the first drives the special-case metrics,
/// matching the source system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    All,
    Specific(&'a str),
}

/// Current date-range and assignee criteria applied across all views.
/// Owned by the composing layer and passed into every filter and
/// aggregation call; mutations are followed by an explicit refresh there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    #[serde(deserialize_with = "deserialize_assignees")]
    assignees: Vec<String>,
}

/// The sentinel invariant: the selection list is never empty and "all"
/// never coexists with specific names.
fn normalize_selection(selected: Vec<String>) -> Vec<String> {
    if selected.is_empty() || selected.iter().any(|name| name == ALL_ASSIGNEES) {
        vec![ALL_ASSIGNEES.to_string()]
    } else {
        selected
    }
}

// Deserialization is a public constructor too; route it through the same
// normalization as `set_assignees` so the invariant survives a round trip.
fn deserialize_assignees<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let selected = Vec::<String>::deserialize(deserializer)?;
    Ok(normalize_selection(selected))
}

impl Default for FilterState {
    fn default() -> FilterState {
        FilterState {
            date_start: None,
            date_end: None,
            assignees: vec![ALL_ASSIGNEES.to_string()],
        }
    }
}

impl FilterState {
    pub fn new() -> FilterState {
        FilterState::default()
    }

    pub fn set_date_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.date_start = start;
        self.date_end = end;
    }

    /// The selection list is never empty and the sentinel never coexists
    /// with specific names: an empty pick or one containing "all" collapses
    /// to the sentinel alone.
    pub fn set_assignees(&mut self, selected: Vec<String>) {
        self.assignees = normalize_selection(selected);
    }

    pub fn assignees(&self) -> &[String] {
        &self.assignees
    }

    pub fn selection(&self) -> Selection<'_> {
        if self.assignees.iter().any(|name| name == ALL_ASSIGNEES) {
            return Selection::All;
        }
        match self.assignees.first() {
            Some(name) => Selection::Specific(name),
            None => Selection::All,
        }
    }

    pub fn reset(&mut self) {
        *self = FilterState::default();
    }

    /// Narrow a dataset by the current state: the date filter applies
    /// whenever bounds are set, the assignee filter only when the caller
    /// names an assignee field (some datasets have no assignee dimension).
    pub fn filter_data(
        &self,
        data: &Dataset,
        date_field: &str,
        assignee_field: Option<&str>,
    ) -> Dataset {
        let mut filtered = if self.date_start.is_some() || self.date_end.is_some() {
            filter_by_date_range(data, date_field, self.date_start, self.date_end)
        } else {
            data.clone()
        };

        if let Some(field) = assignee_field {
            if self.selection() != Selection::All {
                filtered = filter_by_assignees(&filtered, field, &self.assignees);
            }
        }

        filtered
    }
}
