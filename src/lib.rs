//! Analytics core for exported support-ticket tables: loads and caches the
//! semicolon-delimited exports, narrows them by date range and assignee,
//! derives the dashboard metrics, and drives the year-in-review slideshow.
//! Chart drawing and DOM work live behind the [`dashboard::Renderer`]
//! trait; this crate only computes.

pub mod dashboard;
pub mod filters;
pub mod format;
pub mod metrics;
pub mod models;
pub mod store;
pub mod story;

pub use dashboard::{AssigneeTableRow, Chart, Dashboard, Renderer, Stat};
pub use filters::{FilterState, Selection, ALL_ASSIGNEES};
pub use models::{Category, Dataset, Record, Snapshot, Value};
pub use store::DatasetCache;
pub use story::{CardKind, NavInput, StoryCard, StoryMode};
