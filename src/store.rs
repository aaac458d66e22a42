use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;

use crate::models::{Category, Dataset, Record, Snapshot, Value};

// Export layout is fixed by the ticketing system, not by us. Keys are the
// logical dataset names the views look up.
const TICKET_FILES: &[(&str, &str)] = &[
    ("created", "Zendesk-Support_Tickets_12302025_0037/Created tickets.csv"),
    ("createdByDate", "Zendesk-Support_Tickets_12302025_0037/Tickets created by date.csv"),
    ("createdByHour", "Zendesk-Support_Tickets_12302025_0037/Tickets created by hour.csv"),
    (
        "createdByDayOfWeek",
        "Zendesk-Support_Tickets_12302025_0037/Average tickets created by day of week.csv",
    ),
    ("solved", "Zendesk-Support_Tickets_12302025_0037/Solved tickets.csv"),
    ("unsolved", "Zendesk-Support_Tickets_12302025_0037/Unsolved tickets.csv"),
    ("reopened", "Zendesk-Support_Tickets_12302025_0037/Reopened tickets.csv"),
    ("oneTouch", "Zendesk-Support_Tickets_12302025_0037/One-touch tickets.csv"),
    ("byMonth", "Zendesk-Support_Tickets_12302025_0037/Tickets created by monthyear.csv"),
    (
        "byChannel",
        "Zendesk-Support_Tickets_12302025_0037/Tickets by selected attribute (top 10).csv",
    ),
];

const EFFICIENCY_FILES: &[(&str, &str)] = &[
    (
        "firstReplyMedian",
        "Zendesk-Support_Efficiency_12302025_0927/First reply time median.csv",
    ),
    (
        "firstResolutionMedian",
        "Zendesk-Support_Efficiency_12302025_0927/First resolution time median.csv",
    ),
    (
        "fullResolutionMedian",
        "Zendesk-Support_Efficiency_12302025_0927/Full resolution time median.csv",
    ),
    (
        "agentRepliesOverTime",
        "Zendesk-Support_Efficiency_12302025_0927/Agent replies average and resolutions over time.csv",
    ),
    (
        "firstReplyOverTime",
        "Zendesk-Support_Efficiency_12302025_0927/First reply and assignment time median over time.csv",
    ),
    (
        "resolutionOverTime",
        "Zendesk-Support_Efficiency_12302025_0927/Full resolution and requester wait time median over time.csv",
    ),
    (
        "agentRepliesBrackets",
        "Zendesk-Support_Efficiency_12302025_0927/Tickets by agent replies brackets.csv",
    ),
    (
        "firstReplyBrackets",
        "Zendesk-Support_Efficiency_12302025_0927/Tickets by first reply time brackets.csv",
    ),
    (
        "resolutionBrackets",
        "Zendesk-Support_Efficiency_12302025_0927/Tickets by full resolution time brackets.csv",
    ),
    (
        "assigneeStations",
        "Zendesk-Support_Efficiency_12302025_0927/Assignee stations average.csv",
    ),
    (
        "groupStations",
        "Zendesk-Support_Efficiency_12302025_0927/Group stations average.csv",
    ),
];

const ASSIGNEE_FILES: &[(&str, &str)] = &[
    ("activity", "Zendesk-Support_Assignee-activity_12302025_0926/Assignee activity.csv"),
    ("solved", "Zendesk-Support_Assignee-activity_12302025_0926/Solved tickets.csv"),
    (
        "solvedByAssignee",
        "Zendesk-Support_Assignee-activity_12302025_0926/Solved tickets.csv",
    ),
    ("oneTouch", "Zendesk-Support_Assignee-activity_12302025_0926/One-touch tickets.csv"),
    ("twoTouch", "Zendesk-Support_Assignee-activity_12302025_0926/Two-touch tickets.csv"),
    (
        "assignmentToResolution",
        "Zendesk-Support_Assignee-activity_12302025_0926/Assignment to resolution.csv",
    ),
    (
        "requesterWaitTime",
        "Zendesk-Support_Assignee-activity_12302025_0926/Requester wait time median.csv",
    ),
    (
        "waitTimeBrackets",
        "Zendesk-Support_Assignee-activity_12302025_0926/Tickets by requester wait time brackets.csv",
    ),
    (
        "satisfactionOverTime",
        "Zendesk-Support_Assignee-activity_12302025_0926/Satisfaction score and requester wait time median by date.csv",
    ),
];

pub fn manifest(category: Category) -> &'static [(&'static str, &'static str)] {
    match category {
        Category::Tickets => TICKET_FILES,
        Category::Efficiency => EFFICIENCY_FILES,
        Category::Assignee => ASSIGNEE_FILES,
    }
}

/// Parse one semicolon-delimited export into a dataset. Header row names
/// the columns; cells are typed permissively.
pub fn parse_table(text: &str) -> anyhow::Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .context("reading header row")?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let raw = result.context("reading data row")?;
        let mut record = Record::new();
        for (index, cell) in raw.iter().enumerate() {
            if let Some(column) = columns.get(index) {
                record.insert(column, Value::parse(cell));
            }
        }
        rows.push(record);
    }

    Ok(Dataset { columns, rows })
}

/// Loads exported tables from disk and caches each parsed dataset under its
/// file name. A file is read at most once for the cache's lifetime; a load
/// failure caches the empty dataset so one bad file degrades only the views
/// that depend on it.
#[derive(Debug)]
pub struct DatasetCache {
    base_dir: PathBuf,
    cache: HashMap<String, Dataset>,
}

impl DatasetCache {
    pub fn new(base_dir: impl Into<PathBuf>) -> DatasetCache {
        DatasetCache {
            base_dir: base_dir.into(),
            cache: HashMap::new(),
        }
    }

    pub async fn load_dataset(&mut self, path: &str) -> Dataset {
        if let Some(cached) = self.cache.get(path) {
            return cached.clone();
        }

        let dataset = match self.fetch(path).await {
            Ok(dataset) => dataset,
            Err(error) => {
                log::warn!("failed to load {path}: {error:#}");
                Dataset::default()
            }
        };

        self.cache.insert(path.to_string(), dataset.clone());
        dataset
    }

    async fn fetch(&self, path: &str) -> anyhow::Result<Dataset> {
        let full_path = self.base_dir.join(path);
        let text = tokio::fs::read_to_string(&full_path)
            .await
            .with_context(|| format!("reading {}", full_path.display()))?;
        parse_table(&text)
    }

    /// Every dataset declared for the category, keyed by logical name.
    /// Files are independent, so order between them does not matter.
    pub async fn load_category(&mut self, category: Category) -> HashMap<String, Dataset> {
        let mut datasets = HashMap::new();
        for (key, path) in manifest(category) {
            let dataset = self.load_dataset(path).await;
            datasets.insert((*key).to_string(), dataset);
        }
        datasets
    }

    pub async fn load_all(&mut self) -> Snapshot {
        Snapshot {
            tickets: self.load_category(Category::Tickets).await,
            efficiency: self.load_category(Category::Efficiency).await,
            assignee: self.load_category(Category::Assignee).await,
        }
    }

    /// No caller invalidates today; a future reload path starts here.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_export(dir: &std::path::Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn parses_semicolon_delimited_tables() {
        let dataset = parse_table(
            "Ticket created - Date;Tickets\n2 Jan 25;14\n3 Jan 25;\n4 Jan 25;oops\n",
        )
        .unwrap();

        assert_eq!(dataset.columns, vec!["Ticket created - Date", "Tickets"]);
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.rows[0].number("Tickets"), 14.0);
        assert_eq!(dataset.rows[0].text("Ticket created - Date"), Some("2 Jan 25"));
        assert!(dataset.rows[1].get("Tickets").is_null());
        assert_eq!(dataset.rows[2].number("Tickets"), 0.0);
    }

    #[tokio::test]
    async fn missing_file_yields_empty_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = DatasetCache::new(dir.path());

        let dataset = cache.load_dataset("nowhere/missing.csv").await;
        assert!(dataset.is_empty());
    }

    #[tokio::test]
    async fn cached_dataset_is_not_refetched() {
        let dir = tempfile::tempdir().unwrap();
        write_export(dir.path(), "t/counts.csv", "Tickets\n7\n");
        let mut cache = DatasetCache::new(dir.path());

        let first = cache.load_dataset("t/counts.csv").await;
        assert_eq!(first.rows[0].number("Tickets"), 7.0);

        // Changing the file after the first load must not change the result.
        write_export(dir.path(), "t/counts.csv", "Tickets\n99\n");
        let second = cache.load_dataset("t/counts.csv").await;
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn category_map_covers_every_declared_key() {
        let dir = tempfile::tempdir().unwrap();
        write_export(
            dir.path(),
            "Zendesk-Support_Tickets_12302025_0037/Created tickets.csv",
            "Tickets\n1234\n",
        );
        let mut cache = DatasetCache::new(dir.path());

        let tickets = cache.load_category(Category::Tickets).await;
        for (key, _) in manifest(Category::Tickets) {
            assert!(tickets.contains_key(*key), "missing key {key}");
        }
        assert_eq!(tickets["created"].rows[0].number("Tickets"), 1234.0);
        assert!(tickets["createdByDate"].is_empty());
    }

    #[tokio::test]
    async fn load_all_snapshot_reports_total_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = DatasetCache::new(dir.path());

        let snapshot = cache.load_all().await;
        assert!(snapshot.is_empty());
    }
}
