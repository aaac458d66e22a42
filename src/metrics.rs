use serde::{Deserialize, Serialize};

use crate::filters::{FilterState, Selection};
use crate::models::{Category, Dataset, Record, Snapshot};

/// Sum of a numeric column over every row, with missing and non-numeric
/// cells counting as zero.
pub fn sum_by(data: &Dataset, field: &str) -> f64 {
    data.rows.iter().map(|row| row.number(field)).sum()
}

/// Arithmetic mean of a numeric column; an empty dataset is defined as
/// zero, never a division failure.
pub fn mean_by(data: &Dataset, field: &str) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    sum_by(data, field) / data.len() as f64
}

/// First row's value for a column, coerced. Pre-aggregated single-row
/// exports (totals, medians) are read this way.
pub fn first_number(data: &Dataset, field: &str) -> f64 {
    data.first().map(|row| row.number(field)).unwrap_or(0.0)
}

/// Row holding the maximum value of a column. Ties resolve to the first
/// occurrence in row order (strict greater-than fold, no re-sort).
pub fn peak_row<'a>(data: &'a Dataset, field: &str) -> Option<&'a Record> {
    data.rows.iter().fold(None, |best, row| match best {
        Some(best) if row.number(field) > best.number(field) => Some(row),
        Some(best) => Some(best),
        None => Some(row),
    })
}

/// Longest run of consecutive rows with a nonzero count. A zero breaks the
/// run. This counts rows, not calendar days: gaps in the exported dates do
/// not break a streak.
pub fn longest_streak(data: &Dataset, field: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for row in &data.rows {
        if row.number(field) > 0.0 {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Headline ticket-volume numbers for the current filter state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeMetrics {
    pub total_created: f64,
    pub total_solved: f64,
    pub daily_average: f64,
    /// Date label of the busiest day. `"N/A"` when a specific assignee is
    /// selected and rows are in range (the export has no per-assignee daily
    /// counts); `None` when the ranged dataset is empty.
    pub peak_day: Option<String>,
}

/// With everyone selected, totals come from the overall exports and the
/// daily average is the mean ticket count per row of the date-ranged
/// dataset. With one assignee selected, the export carries no per-assignee
/// created count, so total tickets is defined as that assignee's solved
/// count and the daily average as solved over the number of days in range.
/// Both branches are the source system's intent and are kept as-is.
pub fn volume_metrics(snapshot: &Snapshot, filters: &FilterState) -> VolumeMetrics {
    let created_by_date = filters.filter_data(
        snapshot.dataset(Category::Tickets, "createdByDate"),
        "Ticket created - Date",
        None,
    );

    match filters.selection() {
        Selection::All => VolumeMetrics {
            total_created: first_number(snapshot.dataset(Category::Tickets, "created"), "Tickets"),
            total_solved: first_number(
                snapshot.dataset(Category::Assignee, "solved"),
                "Solved tickets",
            ),
            daily_average: mean_by(&created_by_date, "Tickets"),
            peak_day: peak_row(&created_by_date, "Tickets")
                .and_then(|row| row.text("Ticket created - Date"))
                .map(str::to_string),
        },
        Selection::Specific(name) => {
            let activity = snapshot.dataset(Category::Assignee, "activity");
            let solved = activity
                .rows
                .iter()
                .find(|row| row.text("Assignee name") == Some(name))
                .map(|row| row.number("Solved tickets"))
                .unwrap_or(0.0);

            let (daily_average, peak_day) = if created_by_date.is_empty() {
                (0.0, None)
            } else {
                (
                    solved / created_by_date.len() as f64,
                    Some("N/A".to_string()),
                )
            };

            VolumeMetrics {
                total_created: solved,
                total_solved: solved,
                daily_average,
                peak_day,
            }
        }
    }
}

/// Response-time and workload numbers. The first-reply median arrives in
/// minutes and is divided by 60 at display time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyMetrics {
    pub first_reply_median_min: f64,
    pub resolution_median_hours: f64,
    pub avg_agent_replies: f64,
    pub avg_stations: f64,
}

pub fn efficiency_metrics(snapshot: &Snapshot, filters: &FilterState) -> EfficiencyMetrics {
    // Agent replies are averaged over the resolution trend rows, matching
    // the source system.
    let trends = filters.filter_data(
        snapshot.dataset(Category::Efficiency, "resolutionOverTime"),
        "Ticket solved - Date",
        None,
    );

    EfficiencyMetrics {
        first_reply_median_min: first_number(
            snapshot.dataset(Category::Efficiency, "firstReplyMedian"),
            "First reply time (min)",
        ),
        resolution_median_hours: first_number(
            snapshot.dataset(Category::Efficiency, "fullResolutionMedian"),
            "Full resolution time (hrs)",
        ),
        avg_agent_replies: mean_by(&trends, "Agent replies"),
        avg_stations: mean_by(
            snapshot.dataset(Category::Efficiency, "assigneeStations"),
            "Assignee stations",
        ),
    }
}

/// One table row per assignee. Each metric keeps "missing" distinct from
/// zero so the table renders a placeholder instead of a fake number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssigneeRow {
    pub name: String,
    pub solved: Option<f64>,
    pub first_reply_hours: Option<f64>,
    pub resolution_hours: Option<f64>,
    pub satisfaction: Option<f64>,
    pub one_touch: Option<f64>,
}

pub fn assignee_rows(activity: &Dataset) -> Vec<AssigneeRow> {
    activity
        .rows
        .iter()
        .map(|row| AssigneeRow {
            name: row.text("Assignee name").unwrap_or("-").to_string(),
            solved: row.get("Solved tickets").display_number(),
            first_reply_hours: row.get("First reply time (hrs)").display_number(),
            resolution_hours: row.get("Full resolution time (hrs)").display_number(),
            satisfaction: row.get("% Satisfaction score").display_number(),
            one_touch: row.get("% One-touch tickets").display_number(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Record, Value};
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn daily_dataset(rows: &[(&str, f64)]) -> Dataset {
        Dataset {
            columns: vec!["Ticket created - Date".to_string(), "Tickets".to_string()],
            rows: rows
                .iter()
                .map(|(day, count)| {
                    Record::from_pairs(vec![
                        ("Ticket created - Date", Value::Text((*day).to_string())),
                        ("Tickets", Value::Number(*count)),
                    ])
                })
                .collect(),
        }
    }

    fn counts_dataset(counts: &[f64]) -> Dataset {
        Dataset {
            columns: vec!["Tickets".to_string()],
            rows: counts
                .iter()
                .map(|count| Record::from_pairs(vec![("Tickets", Value::Number(*count))]))
                .collect(),
        }
    }

    fn single_row(field: &str, value: f64) -> Dataset {
        Dataset {
            columns: vec![field.to_string()],
            rows: vec![Record::from_pairs(vec![(field, Value::Number(value))])],
        }
    }

    fn sample_snapshot() -> Snapshot {
        let mut tickets = HashMap::new();
        tickets.insert("created".to_string(), single_row("Tickets", 1200.0));
        tickets.insert(
            "createdByDate".to_string(),
            daily_dataset(&[("1 Jan 25", 5.0), ("2 Jan 25", 9.0), ("3 Jan 25", 9.0)]),
        );

        let mut assignee = HashMap::new();
        assignee.insert("solved".to_string(), single_row("Solved tickets", 1100.0));
        assignee.insert(
            "activity".to_string(),
            Dataset {
                columns: vec!["Assignee name".to_string(), "Solved tickets".to_string()],
                rows: vec![
                    Record::from_pairs(vec![
                        ("Assignee name", Value::Text("Alice".to_string())),
                        ("Solved tickets", Value::Number(42.0)),
                    ]),
                    Record::from_pairs(vec![
                        ("Assignee name", Value::Text("Bob".to_string())),
                        ("Solved tickets", Value::Number(30.0)),
                    ]),
                ],
            },
        );

        Snapshot {
            tickets,
            efficiency: HashMap::new(),
            assignee,
        }
    }

    #[test]
    fn mean_of_empty_dataset_is_zero() {
        assert_eq!(mean_by(Dataset::empty(), "Tickets"), 0.0);
        assert_eq!(mean_by(&counts_dataset(&[2.0, 4.0]), "Tickets"), 3.0);
    }

    #[test]
    fn peak_row_keeps_the_first_occurrence_of_the_max() {
        let data = daily_dataset(&[("1 Jan 25", 5.0), ("2 Jan 25", 9.0), ("3 Jan 25", 9.0)]);
        let peak = peak_row(&data, "Tickets").unwrap();
        assert_eq!(peak.text("Ticket created - Date"), Some("2 Jan 25"));
        assert!(peak_row(Dataset::empty(), "Tickets").is_none());
    }

    #[test]
    fn streak_counts_the_longest_nonzero_run() {
        let data = counts_dataset(&[3.0, 0.0, 2.0, 4.0, 5.0, 0.0, 1.0]);
        assert_eq!(longest_streak(&data, "Tickets"), 3);
        assert_eq!(longest_streak(&counts_dataset(&[0.0, 0.0]), "Tickets"), 0);
        assert_eq!(longest_streak(Dataset::empty(), "Tickets"), 0);
    }

    #[test]
    fn all_assignee_volume_uses_the_overall_exports() {
        let snapshot = sample_snapshot();
        let filters = FilterState::new();

        let volume = volume_metrics(&snapshot, &filters);
        assert_eq!(volume.total_created, 1200.0);
        assert_eq!(volume.total_solved, 1100.0);
        assert!((volume.daily_average - 23.0 / 3.0).abs() < 1e-9);
        assert_eq!(volume.peak_day.as_deref(), Some("2 Jan 25"));
    }

    #[test]
    fn specific_assignee_total_is_their_solved_count() {
        let snapshot = sample_snapshot();
        let mut filters = FilterState::new();
        filters.set_assignees(vec!["Alice".to_string()]);

        let volume = volume_metrics(&snapshot, &filters);
        assert_eq!(volume.total_created, 42.0);
        assert_eq!(volume.total_solved, 42.0);
        // Solved over the three days in range, not the per-row mean.
        assert!((volume.daily_average - 14.0).abs() < 1e-9);
    }

    #[test]
    fn specific_assignee_peak_day_is_marked_not_applicable() {
        let snapshot = sample_snapshot();
        let mut filters = FilterState::new();
        filters.set_assignees(vec!["Alice".to_string()]);

        // Rows in range: the peak day exists but cannot be attributed.
        let volume = volume_metrics(&snapshot, &filters);
        assert_eq!(volume.peak_day.as_deref(), Some("N/A"));

        // Nothing in range: plain placeholder, same as the all-assignees case.
        filters.set_date_range(
            NaiveDate::from_ymd_opt(2025, 3, 1),
            NaiveDate::from_ymd_opt(2025, 3, 31),
        );
        let volume = volume_metrics(&snapshot, &filters);
        assert_eq!(volume.peak_day, None);
        assert_eq!(volume.daily_average, 0.0);
    }

    #[test]
    fn unknown_assignee_yields_defined_zeros() {
        let snapshot = sample_snapshot();
        let mut filters = FilterState::new();
        filters.set_assignees(vec!["Nobody".to_string()]);

        let volume = volume_metrics(&snapshot, &filters);
        assert_eq!(volume.total_created, 0.0);
        assert_eq!(volume.daily_average, 0.0);
    }

    #[test]
    fn efficiency_metrics_read_single_row_medians_and_trend_means() {
        let mut efficiency = HashMap::new();
        efficiency.insert(
            "firstReplyMedian".to_string(),
            single_row("First reply time (min)", 90.0),
        );
        efficiency.insert(
            "fullResolutionMedian".to_string(),
            single_row("Full resolution time (hrs)", 26.0),
        );
        efficiency.insert(
            "resolutionOverTime".to_string(),
            Dataset {
                columns: vec!["Ticket solved - Date".to_string(), "Agent replies".to_string()],
                rows: vec![
                    Record::from_pairs(vec![
                        ("Ticket solved - Date", Value::Text("1 Jan 25".to_string())),
                        ("Agent replies", Value::Number(2.0)),
                    ]),
                    Record::from_pairs(vec![
                        ("Ticket solved - Date", Value::Text("2 Jan 25".to_string())),
                        ("Agent replies", Value::Number(4.0)),
                    ]),
                ],
            },
        );
        efficiency.insert(
            "assigneeStations".to_string(),
            single_row("Assignee stations", 1.4),
        );
        let snapshot = Snapshot {
            efficiency,
            ..Snapshot::default()
        };

        let metrics = efficiency_metrics(&snapshot, &FilterState::new());
        assert_eq!(metrics.first_reply_median_min, 90.0);
        assert_eq!(metrics.resolution_median_hours, 26.0);
        assert_eq!(metrics.avg_agent_replies, 3.0);
        assert_eq!(metrics.avg_stations, 1.4);
    }

    #[test]
    fn assignee_rows_keep_missing_values_missing() {
        let activity = Dataset {
            columns: vec![
                "Assignee name".to_string(),
                "Solved tickets".to_string(),
                "% Satisfaction score".to_string(),
            ],
            rows: vec![Record::from_pairs(vec![
                ("Assignee name", Value::Text("Alice".to_string())),
                ("Solved tickets", Value::Number(0.0)),
                ("% Satisfaction score", Value::Null),
            ])],
        };

        let rows = assignee_rows(&activity);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Alice");
        assert_eq!(rows[0].solved, Some(0.0));
        assert_eq!(rows[0].satisfaction, None);
        assert_eq!(rows[0].first_reply_hours, None);
    }
}
