//! Composing layer: owns the loaded snapshot and the filter state, and
//! pushes recomputed metrics and chart data at the presentation layer
//! after every filter change.

use chrono::NaiveDate;

use crate::filters::{assignee_names, filter_by_assignees, FilterState};
use crate::format;
use crate::metrics::{self, AssigneeRow};
use crate::models::{Category, Dataset, Snapshot};
use crate::store::DatasetCache;

/// Chart-identifying tokens handed to the presentation layer alongside the
/// dataset to draw. Drawing itself happens on the other side of the trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chart {
    TicketsOverTime,
    TicketsByHour,
    TicketsByDay,
    TicketsByChannel,
    EfficiencyTrends,
    AgentReplyBrackets,
    ResolutionBrackets,
    AssigneeSolved,
    AssigneeWaitTime,
}

/// Scalar metric slots on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    TotalTickets,
    SolvedTickets,
    AvgDailyTickets,
    PeakDay,
    MedianFirstReply,
    MedianResolution,
    AvgAgentReplies,
    AvgStations,
}

/// One assignee table row with every cell already formatted for display:
/// counts grouped, durations suffixed, fractions as percentages, missing
/// values as the placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssigneeTableRow {
    pub name: String,
    pub solved: String,
    pub first_reply: String,
    pub resolution: String,
    pub satisfaction: String,
    pub one_touch: String,
}

impl From<&AssigneeRow> for AssigneeTableRow {
    fn from(row: &AssigneeRow) -> AssigneeTableRow {
        AssigneeTableRow {
            name: row.name.clone(),
            solved: format::format_count(row.solved),
            first_reply: format::format_hours(row.first_reply_hours),
            resolution: format::format_hours(row.resolution_hours),
            satisfaction: format::format_percent(row.satisfaction),
            one_touch: format::format_percent(row.one_touch),
        }
    }
}

/// Narrow interface to the presentation layer. The core hands over plain
/// data and identifying tokens and never sees renderer state.
pub trait Renderer {
    fn chart(&mut self, chart: Chart, data: &Dataset);
    fn stat(&mut self, stat: Stat, value: &str);
    fn assignee_table(&mut self, rows: &[AssigneeTableRow]);
}

pub struct Dashboard<R: Renderer> {
    snapshot: Snapshot,
    filters: FilterState,
    renderer: R,
}

impl<R: Renderer> Dashboard<R> {
    /// Load everything and draw the initial dashboard. Individual file
    /// failures degrade to empty datasets inside the store; only a total
    /// load failure is reported here, as a single top-level error.
    pub async fn init(cache: &mut DatasetCache, renderer: R) -> anyhow::Result<Dashboard<R>> {
        let snapshot = cache.load_all().await;
        if snapshot.is_empty() {
            anyhow::bail!("no dashboard data could be loaded from the export directory");
        }

        let mut dashboard = Dashboard::with_snapshot(snapshot, renderer);
        dashboard.refresh();
        Ok(dashboard)
    }

    /// Build around an already-loaded snapshot without drawing anything.
    pub fn with_snapshot(snapshot: Snapshot, renderer: R) -> Dashboard<R> {
        Dashboard {
            snapshot,
            filters: FilterState::new(),
            renderer,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Names for the assignee selection control.
    pub fn assignees(&self) -> Vec<String> {
        assignee_names(
            self.snapshot.dataset(Category::Assignee, "activity"),
            "Assignee name",
        )
    }

    pub fn set_date_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.filters.set_date_range(start, end);
        self.refresh();
    }

    pub fn set_assignees(&mut self, selected: Vec<String>) {
        self.filters.set_assignees(selected);
        self.refresh();
    }

    pub fn reset_filters(&mut self) {
        self.filters.reset();
        self.refresh();
    }

    /// Recompute every section from the current filter state. Charts whose
    /// input dataset is empty are skipped, not rendered empty.
    pub fn refresh(&mut self) {
        self.update_tickets_section();
        self.update_efficiency_section();
        self.update_assignee_section();
    }

    fn update_tickets_section(&mut self) {
        let volume = metrics::volume_metrics(&self.snapshot, &self.filters);
        self.renderer
            .stat(Stat::TotalTickets, &format::format_count(Some(volume.total_created)));
        self.renderer
            .stat(Stat::SolvedTickets, &format::format_count(Some(volume.total_solved)));
        self.renderer.stat(
            Stat::AvgDailyTickets,
            &format::format_count(Some(volume.daily_average)),
        );
        self.renderer
            .stat(Stat::PeakDay, volume.peak_day.as_deref().unwrap_or("-"));

        let filtered_by_date = self.filters.filter_data(
            self.snapshot.dataset(Category::Tickets, "createdByDate"),
            "Ticket created - Date",
            None,
        );
        if !filtered_by_date.is_empty() {
            self.renderer.chart(Chart::TicketsOverTime, &filtered_by_date);
        }

        let unfiltered = [
            (Chart::TicketsByHour, "createdByHour"),
            (Chart::TicketsByDay, "createdByDayOfWeek"),
            (Chart::TicketsByChannel, "byChannel"),
        ];
        for (chart, key) in unfiltered {
            let data = self.snapshot.dataset(Category::Tickets, key);
            if !data.is_empty() {
                self.renderer.chart(chart, data);
            }
        }
    }

    fn update_efficiency_section(&mut self) {
        let efficiency = metrics::efficiency_metrics(&self.snapshot, &self.filters);
        self.renderer.stat(
            Stat::MedianFirstReply,
            &format::format_hours(Some(efficiency.first_reply_median_min / 60.0)),
        );
        self.renderer.stat(
            Stat::MedianResolution,
            &format::format_hours(Some(efficiency.resolution_median_hours)),
        );
        self.renderer.stat(
            Stat::AvgAgentReplies,
            &format::format_decimal(efficiency.avg_agent_replies),
        );
        self.renderer
            .stat(Stat::AvgStations, &format::format_decimal(efficiency.avg_stations));

        let trends = self.filters.filter_data(
            self.snapshot.dataset(Category::Efficiency, "resolutionOverTime"),
            "Ticket solved - Date",
            None,
        );
        if !trends.is_empty() {
            self.renderer.chart(Chart::EfficiencyTrends, &trends);
        }

        let brackets = [
            (Chart::AgentReplyBrackets, "agentRepliesBrackets"),
            (Chart::ResolutionBrackets, "resolutionBrackets"),
        ];
        for (chart, key) in brackets {
            let data = self.snapshot.dataset(Category::Efficiency, key);
            if !data.is_empty() {
                self.renderer.chart(chart, data);
            }
        }
    }

    fn update_assignee_section(&mut self) {
        let activity = filter_by_assignees(
            self.snapshot.dataset(Category::Assignee, "activity"),
            "Assignee name",
            self.filters.assignees(),
        );
        if activity.is_empty() {
            return;
        }

        self.renderer.chart(Chart::AssigneeSolved, &activity);
        self.renderer.chart(Chart::AssigneeWaitTime, &activity);
        let rows: Vec<AssigneeTableRow> = metrics::assignee_rows(&activity)
            .iter()
            .map(AssigneeTableRow::from)
            .collect();
        self.renderer.assignee_table(&rows);
    }
}
