//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose extraction, import and rollover use-cases to Dart via FRB.
//! - Resolve wall-clock "today" and the database location at this boundary
//!   so the core stays deterministic.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - Failures come back as envelopes with `ok = false` and a message.
//! - Record ids and dates cross the boundary as strings (`uuid`,
//!   `YYYY-MM-DD`).

use chrono::Local;
use log::warn;
use rusqlite::Connection;
use std::sync::OnceLock;
use taskline_core::{
    core_version as core_version_inner, extract_dates as extract_dates_inner,
    import_document as import_document_inner, import_url as import_url_inner,
    init_logging as init_logging_inner, open_db,
    ping as ping_inner, CanonicalDate, Config, DateEntryDraft, DateEntryService,
    ExtractedOccurrence, ImportOutcome, Priority, RecordId, RecurrencePeriod, SqliteDateEntryRepository,
    SqliteTaskRepository, TaskDraft, TaskService,
};
use uuid::Uuid;

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Generic action envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Created record id, or the successor id for completions.
    pub record_id: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, record_id: Option<RecordId>) -> Self {
        Self {
            ok: true,
            record_id: record_id.map(|id| id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            record_id: None,
            message: message.into(),
        }
    }
}

/// One extracted date as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDateItem {
    /// Canonical `YYYY-MM-DD`.
    pub date: String,
    pub label: String,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractResponse {
    pub ok: bool,
    /// Sorted ascending by date, one entry per distinct date.
    pub items: Vec<ExtractedDateItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResponse {
    pub ok: bool,
    /// First 5000 characters of the decoded text.
    pub text_preview: String,
    pub items: Vec<ExtractedDateItem>,
    pub message: String,
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive);
///   blank means `TASKLINE_LOG_LEVEL`, then the build default.
/// - `log_dir`: absolute directory path where rolling logs are written;
///   blank means `TASKLINE_LOG_DIR`.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Reconfiguration with a different level or directory fails.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> ActionResponse {
    let config = config();
    let level = non_blank(Some(level.as_str())).unwrap_or(config.log_level.as_str());
    let log_dir = non_blank(Some(log_dir.as_str()))
        .or(config.log_dir.as_deref())
        .unwrap_or_default();
    match init_logging_inner(level, log_dir) {
        Ok(()) => ActionResponse::success("Logging ready.", None),
        Err(err) => ActionResponse::failure(err),
    }
}

/// Extracts every distinct date in `text`; year-less dates use this year.
///
/// # FFI contract
/// - Sync call, CPU-only, deterministic for identical input on the same day.
/// - Date-free text yields an empty list; `ok = false` only when the
///   system clock is outside four-digit years.
#[flutter_rust_bridge::frb(sync)]
pub fn extract_dates(text: String) -> ExtractResponse {
    match today() {
        Ok(today) => {
            let items = to_items(extract_dates_inner(&text, today));
            ExtractResponse {
                ok: true,
                message: found_message(items.len()),
                items,
            }
        }
        Err(err) => ExtractResponse {
            ok: false,
            items: Vec::new(),
            message: format!("extract_dates failed: {err}"),
        },
    }
}

/// Decodes a document and extracts its dates.
///
/// The format follows the file extension: `.docx`, `.pdf`, `.html`/`.htm`,
/// anything else is read as UTF-8 text.
#[flutter_rust_bridge::frb(sync)]
pub fn import_document(file_name: String, bytes: Vec<u8>) -> ImportResponse {
    let result = today().and_then(|today| {
        import_document_inner(&file_name, &bytes, today).map_err(|err| err.to_string())
    });
    to_import_response("import_document", result)
}

/// Fetches a web page, strips its markup and extracts its dates.
///
/// # FFI contract
/// - Blocks for at most 12 seconds; a timeout comes back as `ok = false`
///   and the caller may retry.
#[flutter_rust_bridge::frb(sync)]
pub fn import_url(url: String) -> ImportResponse {
    let result = today()
        .and_then(|today| import_url_inner(&url, today).map_err(|err| err.to_string()));
    to_import_response("import_url", result)
}

/// Creates a task.
///
/// Input semantics:
/// - `due_date`: `YYYY-MM-DD`.
/// - `repeat`: `daily|weekly|biweekly|monthly|yearly`; blank means none.
/// - `priority`: `high|medium|low`; blank means `medium`.
#[flutter_rust_bridge::frb(sync)]
pub fn task_create(
    title: String,
    due_date: String,
    project_id: Option<String>,
    repeat: Option<String>,
    priority: Option<String>,
) -> ActionResponse {
    let result = (|| -> Result<RecordId, String> {
        let mut draft = TaskDraft::new(title.trim(), parse_date(&due_date)?);
        draft.project_ids = parse_optional_id(project_id.as_deref())?.into_iter().collect();
        draft.repeat = parse_period(repeat.as_deref())?;
        if let Some(priority) = non_blank(priority.as_deref()) {
            draft.priority = Priority::parse(priority)
                .ok_or_else(|| format!("unsupported priority `{priority}`"))?;
        }
        with_connection(|conn| {
            let repo = SqliteTaskRepository::try_new(conn).map_err(|err| err.to_string())?;
            let task = TaskService::new(repo)
                .create_task(draft)
                .map_err(|err| err.to_string())?;
            Ok(task.id)
        })
    })();

    match result {
        Ok(id) => ActionResponse::success("Task created.", Some(id)),
        Err(err) => ActionResponse::failure(format!("task_create failed: {err}")),
    }
}

/// Completes a recurring task.
///
/// On success `record_id` is the new occurrence; the completed task stays
/// in the store with status `done`.
#[flutter_rust_bridge::frb(sync)]
pub fn task_complete(task_id: String) -> ActionResponse {
    let result = parse_id(&task_id).and_then(|id| {
        with_connection(|conn| {
            let repo = SqliteTaskRepository::try_new(conn).map_err(|err| err.to_string())?;
            let rollover = TaskService::new(repo)
                .complete_task(id)
                .map_err(|err| err.to_string())?;
            Ok(rollover.next.id)
        })
    });

    match result {
        Ok(next_id) => ActionResponse::success("Next occurrence scheduled.", Some(next_id)),
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error call=task_complete");
            ActionResponse::failure(format!("task_complete failed: {err}"))
        }
    }
}

/// Creates a date entry. Input semantics match [`task_create`].
#[flutter_rust_bridge::frb(sync)]
pub fn date_create(
    title: String,
    date: String,
    project_id: Option<String>,
    repeat: Option<String>,
) -> ActionResponse {
    let result = (|| -> Result<RecordId, String> {
        let mut draft = DateEntryDraft::new(title.trim(), parse_date(&date)?);
        draft.project_ids = parse_optional_id(project_id.as_deref())?.into_iter().collect();
        draft.repeat = parse_period(repeat.as_deref())?;
        with_connection(|conn| {
            let repo = SqliteDateEntryRepository::try_new(conn).map_err(|err| err.to_string())?;
            let entry = DateEntryService::new(repo)
                .create_date_entry(draft)
                .map_err(|err| err.to_string())?;
            Ok(entry.id)
        })
    })();

    match result {
        Ok(id) => ActionResponse::success("Date created.", Some(id)),
        Err(err) => ActionResponse::failure(format!("date_create failed: {err}")),
    }
}

/// Completes a recurring date entry.
///
/// On success the old id no longer exists and `record_id` is its
/// replacement.
#[flutter_rust_bridge::frb(sync)]
pub fn date_complete(date_id: String) -> ActionResponse {
    let result = parse_id(&date_id).and_then(|id| {
        with_connection(|conn| {
            let repo = SqliteDateEntryRepository::try_new(conn).map_err(|err| err.to_string())?;
            let rollover = DateEntryService::new(repo)
                .complete_date_entry(id)
                .map_err(|err| err.to_string())?;
            Ok(rollover.next.id)
        })
    });

    match result {
        Ok(next_id) => ActionResponse::success("Next occurrence scheduled.", Some(next_id)),
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error call=date_complete");
            ActionResponse::failure(format!("date_complete failed: {err}"))
        }
    }
}

fn today() -> Result<CanonicalDate, String> {
    CanonicalDate::try_from(Local::now().date_naive()).map_err(|err| err.to_string())
}

fn to_import_response(call: &str, result: Result<ImportOutcome, String>) -> ImportResponse {
    match result {
        Ok(outcome) => {
            let items = to_items(outcome.dates);
            ImportResponse {
                ok: true,
                text_preview: outcome.text_preview,
                message: found_message(items.len()),
                items,
            }
        }
        Err(err) => ImportResponse {
            ok: false,
            text_preview: String::new(),
            items: Vec::new(),
            message: format!("{call} failed: {err}"),
        },
    }
}

fn found_message(count: usize) -> String {
    if count == 0 {
        "No dates found.".to_string()
    } else {
        format!("Found {count} date(s).")
    }
}

fn to_items(occurrences: Vec<ExtractedOccurrence>) -> Vec<ExtractedDateItem> {
    occurrences
        .into_iter()
        .map(|occurrence| ExtractedDateItem {
            date: occurrence.date.to_string(),
            label: occurrence.label,
            context: occurrence.context,
        })
        .collect()
}

fn config() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

fn with_connection<T>(
    f: impl FnOnce(&Connection) -> Result<T, String>,
) -> Result<T, String> {
    let conn = open_db(&config().db_path).map_err(|err| format!("DB open failed: {err}"))?;
    f(&conn)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_id(value: &str) -> Result<RecordId, String> {
    Uuid::parse_str(value.trim()).map_err(|_| format!("invalid record id `{value}`"))
}

fn parse_optional_id(value: Option<&str>) -> Result<Option<RecordId>, String> {
    non_blank(value).map(parse_id).transpose()
}

fn parse_date(value: &str) -> Result<CanonicalDate, String> {
    CanonicalDate::parse(value.trim()).map_err(|err| err.to_string())
}

fn parse_period(value: Option<&str>) -> Result<Option<RecurrencePeriod>, String> {
    non_blank(value)
        .map(|period| period.parse::<RecurrencePeriod>().map_err(|err| err.to_string()))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, date_complete, date_create, extract_dates, import_document, import_url,
        init_logging, ping, task_complete, task_create,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).ok);
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).ok);

        // Blank level falls back to the configured one, so only the
        // directory is complained about.
        let relative = init_logging("  ".to_string(), "tmp/logs".to_string());
        assert!(!relative.ok);
        assert!(relative.message.contains("absolute"), "{}", relative.message);
    }

    #[test]
    fn extract_dates_returns_sorted_items() {
        let response = extract_dates(
            "The proposal is due by March 3rd, 2025 and the review meeting follows on 3/10/2025."
                .to_string(),
        );
        assert!(response.ok);
        let dates: Vec<&str> = response.items.iter().map(|item| item.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-03-03", "2025-03-10"]);
        assert_eq!(response.message, "Found 2 date(s).");
    }

    #[test]
    fn import_document_reports_undecodable_pdf() {
        let response = import_document("syllabus.pdf".to_string(), b"%PDF-1.7".to_vec());
        assert!(!response.ok);
        assert!(response.message.starts_with("import_document failed: cannot decode pdf"));
        assert!(response.items.is_empty());
    }

    #[test]
    fn import_document_scans_plain_text() {
        let response = import_document(
            "notes.txt".to_string(),
            b"Lab report due 11/2/2027.".to_vec(),
        );
        assert!(response.ok, "{}", response.message);
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].date, "2027-11-02");
        assert_eq!(response.text_preview, "Lab report due 11/2/2027.");
    }

    #[test]
    fn import_url_reports_bad_url() {
        let response = import_url("not a url".to_string());
        assert!(!response.ok);
        assert!(response.message.starts_with("import_url failed: page fetch failed"));
    }

    #[test]
    fn task_complete_returns_new_id_and_refuses_non_recurring() {
        let title = unique_token("ffi-task");
        let created = task_create(
            title,
            "2025-01-31".to_string(),
            None,
            Some("monthly".to_string()),
            Some("high".to_string()),
        );
        assert!(created.ok, "{}", created.message);
        let id = created.record_id.expect("task create should return record_id");

        let completed = task_complete(id.clone());
        assert!(completed.ok, "{}", completed.message);
        assert_ne!(completed.record_id.as_deref(), Some(id.as_str()));

        let plain = task_create(unique_token("ffi-plain"), "2025-01-31".to_string(), None, None, None);
        let refused = task_complete(plain.record_id.expect("record_id"));
        assert!(!refused.ok);
        assert!(refused.message.contains("does not repeat"));
    }

    #[test]
    fn date_complete_replaces_identity() {
        let created = date_create(
            unique_token("ffi-date"),
            "2024-02-29".to_string(),
            None,
            Some("yearly".to_string()),
        );
        assert!(created.ok, "{}", created.message);
        let id = created.record_id.expect("date create should return record_id");

        let completed = date_complete(id.clone());
        assert!(completed.ok, "{}", completed.message);
        let second = date_complete(id);
        assert!(!second.ok);
        assert!(second.message.contains("not found"));
    }

    #[test]
    fn create_rejects_bad_fields() {
        let bad_date = task_create("x".to_string(), "2025-02-30".to_string(), None, None, None);
        assert!(!bad_date.ok);
        let bad_period = date_create(
            "x".to_string(),
            "2025-02-01".to_string(),
            None,
            Some("fortnightly".to_string()),
        );
        assert!(!bad_period.ok);
        let bad_project = date_create(
            "x".to_string(),
            "2025-02-01".to_string(),
            Some("not-a-uuid".to_string()),
            None,
        );
        assert!(!bad_project.ok);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
