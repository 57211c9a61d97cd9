//! JSON Lines session protocol.
//!
//! A session owns one in-memory [`EntryStore`]. Each stdin line is a request
//! tagged by `op`; each request produces exactly one reply line tagged by
//! `kind`. Bad requests and missing ids become `error` replies and the
//! session keeps reading.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tb_core::{
    Analytics, DashboardRange, DateWindow, EntryId, EntryPatch, EntryStore, ExportBundle,
    NewEntry, RangeError, StoreError, TimeEntry, ViewKind, aggregate,
};

use super::util::{load_store, trailing_or_custom};

// ========== Protocol ==========

/// One request line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Add {
        #[serde(flatten)]
        entry: NewEntry,
    },
    Update {
        id: EntryId,
        #[serde(flatten)]
        patch: EntryPatch,
    },
    Delete {
        id: EntryId,
    },
    Get {
        id: EntryId,
    },
    List,
    ByDate {
        date: NaiveDate,
    },
    ByRange {
        start: NaiveDate,
        end: NaiveDate,
    },
    Stats(WindowRequest),
    Export(WindowRequest),
    Navigate {
        view: ViewKind,
        anchor: NaiveDate,
        direction: Direction,
    },
    Reset,
}

/// Window selection shared by `stats` and `export`.
///
/// A `view` picks the calendar window around `anchor` (default today).
/// Without one, `start`/`end` and `range` resolve like the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WindowRequest {
    #[serde(default)]
    pub view: Option<ViewKind>,
    #[serde(default)]
    pub anchor: Option<NaiveDate>,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub range: Option<DashboardRange>,
}

impl WindowRequest {
    fn resolve(&self, today: NaiveDate) -> Result<DateWindow, RangeError> {
        match self.view {
            Some(view) => DateWindow::for_view(view, self.anchor.unwrap_or(today)),
            None => trailing_or_custom(
                self.range,
                self.start,
                self.end,
                today,
                DashboardRange::default(),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

/// One reply line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    Entry {
        entry: TimeEntry,
    },
    Deleted {
        entry: TimeEntry,
    },
    Entries {
        count: usize,
        entries: Vec<TimeEntry>,
    },
    Stats {
        window: DateWindow,
        analytics: Analytics,
    },
    Export(ExportBundle),
    Anchor {
        view: ViewKind,
        anchor: NaiveDate,
        window: DateWindow,
        moved: bool,
    },
    Reset {
        cleared: usize,
    },
    Error {
        error: ErrorCode,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    InvalidRequest,
    InvalidWindow,
}

impl Reply {
    fn entries(entries: Vec<TimeEntry>) -> Self {
        Self::Entries {
            count: entries.len(),
            entries,
        }
    }

    fn error(error: ErrorCode, message: impl ToString) -> Self {
        Self::Error {
            error,
            message: message.to_string(),
        }
    }
}

impl From<StoreError> for Reply {
    fn from(err: StoreError) -> Self {
        Self::error(ErrorCode::NotFound, err)
    }
}

impl From<RangeError> for Reply {
    fn from(err: RangeError) -> Self {
        Self::error(ErrorCode::InvalidWindow, err)
    }
}

// ========== Session ==========

/// A store plus the date treated as "today" for defaults and navigation.
#[derive(Debug)]
pub struct Session {
    store: EntryStore,
    today: NaiveDate,
}

impl Session {
    pub const fn new(store: EntryStore, today: NaiveDate) -> Self {
        Self { store, today }
    }

    pub const fn store(&self) -> &EntryStore {
        &self.store
    }

    /// Applies one request to the store.
    pub fn handle(&mut self, request: Request) -> Reply {
        match request {
            Request::Add { entry } => Reply::Entry {
                entry: self.store.add(entry),
            },
            Request::Update { patch, .. } if patch.is_empty() => {
                Reply::error(ErrorCode::InvalidRequest, "update carries no fields to change")
            }
            Request::Update { id, patch } => match self.store.update(&id, patch) {
                Ok(entry) => Reply::Entry { entry },
                Err(err) => err.into(),
            },
            Request::Delete { id } => match self.store.delete(&id) {
                Ok(entry) => Reply::Deleted { entry },
                Err(err) => err.into(),
            },
            Request::Get { id } => match self.store.get(&id) {
                Some(entry) => Reply::Entry {
                    entry: entry.clone(),
                },
                None => StoreError::NotFound { id }.into(),
            },
            Request::List => Reply::entries(self.store.entries().to_vec()),
            Request::ByDate { date } => Reply::entries(self.store.query_by_date(date)),
            Request::ByRange { start, end } => {
                Reply::entries(self.store.query_by_range(start, end))
            }
            Request::Stats(window) => match window.resolve(self.today) {
                Ok(window) => Reply::Stats {
                    analytics: aggregate(&self.store.query_window(&window), &window),
                    window,
                },
                Err(err) => err.into(),
            },
            Request::Export(window) => match window.resolve(self.today) {
                Ok(window) => Reply::Export(ExportBundle::build(self.store.entries(), window)),
                Err(err) => err.into(),
            },
            Request::Navigate {
                view,
                anchor,
                direction,
            } => self.navigate(view, anchor, direction).unwrap_or_else(Into::into),
            Request::Reset => Reply::Reset {
                cleared: self.store.reset(),
            },
        }
    }

    /// Parses and applies one request line.
    pub fn handle_line(&mut self, line: &str) -> Reply {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request),
            Err(err) => {
                tracing::debug!(error = %err, "rejected request line");
                Reply::error(ErrorCode::InvalidRequest, err)
            }
        }
    }

    fn navigate(
        &self,
        view: ViewKind,
        anchor: NaiveDate,
        direction: Direction,
    ) -> Result<Reply, RangeError> {
        let next = match direction {
            Direction::Prev => view.step(anchor, -1)?,
            Direction::Next if view.can_step_forward(anchor, self.today) => view.step(anchor, 1)?,
            Direction::Next => anchor,
        };
        Ok(Reply::Anchor {
            view,
            anchor: next,
            window: DateWindow::for_view(view, next)?,
            moved: next != anchor,
        })
    }
}

/// Reads requests from `reader` until EOF, writing one reply line each.
///
/// Blank lines are skipped. Returns the number of requests handled.
pub fn serve<R: BufRead, W: Write>(
    session: &mut Session,
    reader: R,
    mut writer: W,
) -> Result<usize> {
    let mut handled = 0;
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read request line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let reply = session.handle_line(trimmed);
        serde_json::to_writer(&mut writer, &reply).context("failed to encode reply")?;
        writeln!(writer).context("failed to write reply")?;
        writer.flush().context("failed to flush reply")?;
        handled += 1;
    }
    Ok(handled)
}

// ========== Public Interface ==========

/// Runs the session command over stdin and stdout.
pub fn run(seed: Option<&Path>) -> Result<()> {
    let store = match seed {
        Some(path) => load_store(path)?,
        None => EntryStore::new(),
    };
    let mut session = Session::new(store, Local::now().date_naive());

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let handled = serve(&mut session, stdin.lock(), stdout.lock())?;
    tracing::debug!(handled, remaining = session.store().len(), "session finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use tb_core::Category;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session() -> Session {
        Session::new(EntryStore::new(), date(2024, 1, 10))
    }

    fn added_id(reply: &Reply) -> EntryId {
        match reply {
            Reply::Entry { entry } => entry.id.clone(),
            other => panic!("expected entry reply, got {other:?}"),
        }
    }

    // ========== Request Parsing ==========

    #[test]
    fn test_parse_add_request() {
        let request: Request = serde_json::from_str(
            r#"{"op":"add","date":"2024-01-01","startTime":"08:00","endTime":"09:30","activity":"Write","category":"growth"}"#,
        )
        .unwrap();
        assert_eq!(
            request,
            Request::Add {
                entry: NewEntry::new(date(2024, 1, 1), "08:00", "09:30", "Write")
                    .with_category(Category::Growth),
            }
        );
    }

    #[test]
    fn test_parse_update_request() {
        let request: Request =
            serde_json::from_str(r#"{"op":"update","id":"abc","endTime":"10:00"}"#).unwrap();
        let Request::Update { id, patch } = request else {
            panic!("expected update");
        };
        assert_eq!(id.as_str(), "abc");
        assert_eq!(patch.end_time.as_deref(), Some("10:00"));
        assert!(patch.start_time.is_none());
    }

    #[test]
    fn test_parse_stats_request_defaults() {
        let request: Request = serde_json::from_str(r#"{"op":"stats"}"#).unwrap();
        assert_eq!(request, Request::Stats(WindowRequest::default()));
    }

    // ========== Handling ==========

    #[test]
    fn test_add_then_get_and_list() {
        let mut session = session();
        let reply = session.handle_line(
            r#"{"op":"add","date":"2024-01-01","startTime":"08:00","endTime":"09:30","activity":"Write"}"#,
        );
        let id = added_id(&reply);

        let Reply::Entry { entry } = session.handle(Request::Get { id }) else {
            panic!("expected entry");
        };
        assert_eq!(entry.duration, 90);
        assert_eq!(entry.category, Category::Maintenance);

        let Reply::Entries { count, .. } = session.handle(Request::List) else {
            panic!("expected entries");
        };
        assert_eq!(count, 1);
    }

    #[test]
    fn test_update_recomputes_duration() {
        let mut session = session();
        let id = added_id(&session.handle(Request::Add {
            entry: NewEntry::new(date(2024, 1, 1), "08:00", "09:00", "Plan"),
        }));

        let reply = session.handle(Request::Update {
            id,
            patch: EntryPatch {
                end_time: Some("10:15".to_string()),
                ..EntryPatch::default()
            },
        });
        let Reply::Entry { entry } = reply else {
            panic!("expected entry");
        };
        assert_eq!(entry.duration, 135);
    }

    #[test]
    fn test_missing_id_is_not_found() {
        let mut session = session();
        let id = EntryId::new("missing").unwrap();

        for request in [
            Request::Get { id: id.clone() },
            Request::Delete { id: id.clone() },
            Request::Update {
                id,
                patch: EntryPatch {
                    activity: Some("Renamed".to_string()),
                    ..EntryPatch::default()
                },
            },
        ] {
            let Reply::Error { error, .. } = session.handle(request) else {
                panic!("expected error");
            };
            assert_eq!(error, ErrorCode::NotFound);
        }
    }

    #[test]
    fn test_empty_update_is_rejected() {
        let mut session = session();
        let id = added_id(&session.handle(Request::Add {
            entry: NewEntry::new(date(2024, 1, 1), "08:00", "09:00", "Plan"),
        }));

        let reply = session.handle_line(&format!(r#"{{"op":"update","id":"{id}"}}"#));
        let Reply::Error { error, .. } = reply else {
            panic!("expected error");
        };
        assert_eq!(error, ErrorCode::InvalidRequest);

        let stored = session.store().get(&id).unwrap();
        assert_eq!(stored.activity, "Plan");
        assert_eq!(stored.duration, 60);
    }

    #[test]
    fn test_malformed_line_is_invalid_request() {
        let mut session = session();
        for line in ["not json", r#"{"op":"fly"}"#, r#"{"op":"add","date":"yesterday"}"#] {
            let Reply::Error { error, .. } = session.handle_line(line) else {
                panic!("expected error for {line}");
            };
            assert_eq!(error, ErrorCode::InvalidRequest);
        }
    }

    #[test]
    fn test_stats_for_week_view() {
        let mut session = session();
        session.handle(Request::Add {
            entry: NewEntry::new(date(2024, 1, 8), "08:00", "10:00", "Deep work")
                .with_category(Category::Growth),
        });
        session.handle(Request::Add {
            entry: NewEntry::new(date(2024, 1, 1), "08:00", "10:00", "Last week"),
        });

        let reply = session.handle(Request::Stats(WindowRequest {
            view: Some(ViewKind::Week),
            ..WindowRequest::default()
        }));
        let Reply::Stats { window, analytics } = reply else {
            panic!("expected stats");
        };
        assert_eq!(window.start, date(2024, 1, 7));
        assert_eq!(analytics.total_minutes, 120);
        assert_eq!(analytics.productivity_score, 100);
    }

    #[test]
    fn test_stats_rejects_inverted_window() {
        let mut session = session();
        let reply = session.handle(Request::Stats(WindowRequest {
            start: Some(date(2024, 1, 9)),
            end: Some(date(2024, 1, 1)),
            ..WindowRequest::default()
        }));
        assert!(matches!(
            reply,
            Reply::Error {
                error: ErrorCode::InvalidWindow,
                ..
            }
        ));
    }

    #[test]
    fn test_navigate_refuses_future() {
        let mut session = session();
        let reply = session.handle(Request::Navigate {
            view: ViewKind::Week,
            anchor: date(2024, 1, 8),
            direction: Direction::Next,
        });
        let Reply::Anchor { anchor, moved, .. } = reply else {
            panic!("expected anchor");
        };
        assert_eq!(anchor, date(2024, 1, 8));
        assert!(!moved);

        let reply = session.handle(Request::Navigate {
            view: ViewKind::Month,
            anchor: date(2024, 1, 8),
            direction: Direction::Prev,
        });
        let Reply::Anchor { anchor, window, moved, .. } = reply else {
            panic!("expected anchor");
        };
        assert_eq!(anchor, date(2023, 12, 8));
        assert_eq!(window.end, date(2023, 12, 31));
        assert!(moved);
    }

    #[test]
    fn test_reset_clears_store() {
        let mut session = session();
        session.handle(Request::Add {
            entry: NewEntry::new(date(2024, 1, 1), "08:00", "09:00", "Plan"),
        });
        assert_eq!(session.handle(Request::Reset), Reply::Reset { cleared: 1 });
        assert!(session.store().is_empty());
    }

    // ========== Wire Format ==========

    #[test]
    fn test_serve_writes_one_reply_per_request() {
        let mut session = session();
        let input = r#"{"op":"add","date":"2024-01-09","startTime":"09:00","endTime":"09:45","activity":"Standup"}

{"op":"by_date","date":"2024-01-09"}
{"op":"get","id":"nope"}
"#;
        let mut output = Vec::new();
        let handled = serve(&mut session, input.as_bytes(), &mut output).unwrap();
        assert_eq!(handled, 3);

        let replies: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(replies.len(), 3);
        assert_eq!(replies[0]["kind"], "entry");
        assert_eq!(replies[0]["entry"]["duration"], 45);
        assert_eq!(replies[1]["kind"], "entries");
        assert_eq!(replies[1]["count"], 1);
        assert_eq!(replies[2]["kind"], "error");
        assert_eq!(replies[2]["error"], "not_found");
    }

    #[test]
    fn test_export_reply_is_flat() {
        let mut session = session();
        session.handle(Request::Add {
            entry: NewEntry::new(date(2024, 1, 9), "09:00", "10:00", "Review"),
        });
        let reply = session.handle(Request::Export(WindowRequest {
            view: Some(ViewKind::Day),
            anchor: Some(date(2024, 1, 9)),
            ..WindowRequest::default()
        }));
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["kind"], "export");
        assert_eq!(value["entries"].as_array().unwrap().len(), 1);
        assert_eq!(value["dateRange"]["start"], "2024-01-09");
        assert_eq!(value["analytics"]["totalMinutes"], 60);
    }
}
