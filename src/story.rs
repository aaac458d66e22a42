//! "Story Mode": a narrated year-in-review slideshow built once per
//! session from the full, unfiltered snapshot.

use serde::{Deserialize, Serialize};

use crate::format;
use crate::metrics::{first_number, longest_streak, peak_row};
use crate::models::{Category, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Welcome,
    Metric,
    Closing,
}

/// One slide: a title, a highlighted figure, an optional label under the
/// highlight, and body text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryCard {
    pub title: String,
    pub content: String,
    pub highlight: String,
    pub label: Option<String>,
    pub kind: CardKind,
}

impl StoryCard {
    fn metric(title: &str, content: String, highlight: String, label: &str) -> StoryCard {
        StoryCard {
            title: title.to_string(),
            content,
            highlight,
            label: Some(label.to_string()),
            kind: CardKind::Metric,
        }
    }
}

/// Navigation triggers from the outside world (click zones, arrow keys,
/// escape). All of them are ignored while the slideshow is inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavInput {
    Forward,
    Backward,
    Close,
}

#[derive(Debug)]
struct Session {
    cards: Vec<StoryCard>,
    index: usize,
}

/// Slideshow state machine: inactive, or active at a card index. The card
/// sequence is built on `start` and discarded on close.
#[derive(Debug, Default)]
pub struct StoryMode {
    session: Option<Session>,
}

impl StoryMode {
    pub fn new() -> StoryMode {
        StoryMode::default()
    }

    pub fn start(&mut self, snapshot: &Snapshot) {
        self.session = Some(Session {
            cards: build_cards(snapshot),
            index: 0,
        });
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn current_card(&self) -> Option<&StoryCard> {
        self.session
            .as_ref()
            .and_then(|session| session.cards.get(session.index))
    }

    /// (current index, total cards) for the progress indicator.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.session
            .as_ref()
            .map(|session| (session.index, session.cards.len()))
    }

    /// Advance one card; advancing past the last card closes the show.
    pub fn next(&mut self) {
        let at_end = match &mut self.session {
            Some(session) if session.index + 1 < session.cards.len() => {
                session.index += 1;
                false
            }
            Some(_) => true,
            None => false,
        };
        if at_end {
            self.close();
        }
    }

    /// Step back one card; a no-op at the first card.
    pub fn prev(&mut self) {
        if let Some(session) = &mut self.session {
            if session.index > 0 {
                session.index -= 1;
            }
        }
    }

    pub fn close(&mut self) {
        self.session = None;
    }

    pub fn handle(&mut self, input: NavInput) {
        if !self.is_active() {
            return;
        }
        match input {
            NavInput::Forward => self.next(),
            NavInput::Backward => self.prev(),
            NavInput::Close => self.close(),
        }
    }
}

/// Build the card sequence from the unfiltered snapshot. Cards whose
/// source dataset is empty are omitted rather than rendered empty, so the
/// deck length varies with the data.
fn build_cards(snapshot: &Snapshot) -> Vec<StoryCard> {
    let mut cards = vec![StoryCard {
        title: "2025: A Year in Support".to_string(),
        content: "It's been an incredible year. Let's look at the numbers that defined our 2025."
            .to_string(),
        highlight: "2025".to_string(),
        label: None,
        kind: CardKind::Welcome,
    }];

    let total_created = first_number(snapshot.dataset(Category::Tickets, "created"), "Tickets");
    cards.push(StoryCard::metric(
        "The Big Picture",
        "We handled a massive amount of support requests this year.".to_string(),
        format::format_count(Some(total_created)),
        "Total Tickets Created",
    ));

    let by_hour = snapshot.dataset(Category::Tickets, "createdByHour");
    if let Some(peak_hour) = peak_row(by_hour, "Tickets") {
        let hour = peak_hour.get("Ticket created - Hour").to_string();
        cards.push(StoryCard::metric(
            "Maximum Productivity",
            format!("Our peak activity happened during the {hour} hour."),
            hour,
            "The Daily Power Hour",
        ));
    }

    let by_date = snapshot.dataset(Category::Tickets, "createdByDate");
    if let Some(peak_day) = peak_row(by_date, "Tickets") {
        let day = peak_day.text("Ticket created - Date").unwrap_or("-");
        cards.push(StoryCard::metric(
            "Our Busiest Moment",
            format!("Everything happened at once on {day}."),
            format::format_count(peak_day.get("Tickets").display_number()),
            "Tickets in a Single Day",
        ));
    }

    if by_date.len() > 1 {
        let streak = longest_streak(by_date, "Tickets");
        cards.push(StoryCard::metric(
            "Reliability",
            "We were there for our users when they needed us most.".to_string(),
            format!("{streak} Days"),
            "Longest Support Streak",
        ));
    }

    let resolution = first_number(
        snapshot.dataset(Category::Efficiency, "fullResolutionMedian"),
        "Full resolution time (hrs)",
    );
    cards.push(StoryCard::metric(
        "Lightning Fast Support",
        "We kept our customers happy with speedy resolutions.".to_string(),
        format::format_hours(Some(resolution)),
        "Median Resolution Time",
    ));

    // The activity export arrives sorted by solved count; the first row is
    // the top assignee and is not re-sorted here.
    if let Some(top) = snapshot.dataset(Category::Assignee, "activity").first() {
        let name = top.text("Assignee name").unwrap_or("-");
        cards.push(StoryCard::metric(
            "Support Superstar",
            format!("{name} led the way this year."),
            format::format_count(top.get("Solved tickets").display_number()),
            "Tickets Solved",
        ));
    }

    cards.push(StoryCard {
        title: "Ready for 2026?".to_string(),
        content: "Great work this year, team. Let's make the next one even better.".to_string(),
        highlight: "Thank You".to_string(),
        label: None,
        kind: CardKind::Closing,
    });

    cards
}
