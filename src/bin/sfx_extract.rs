//! Extract records and print them as JSON lines.
//!
//! ```sh
//! export SF_USERNAME=user@example.com SF_PASSWORD='password+token'
//! export SF_OBJECT=Account SF_FIELDS=Id,Name,Owner.Alias
//! export SF_MODE=deleted SF_WINDOW_HOURS=48
//! cargo run --bin sfx-extract > accounts.jsonl
//! ```
//!
//! `SF_MODE` is `all` (default), `updated` or `deleted`. `SF_QUERY` runs an
//! explicit query instead of selecting `SF_FIELDS` from `SF_OBJECT`;
//! `SF_CONDITION` adds a WHERE clause to the generated one. Logging goes to
//! stderr and is controlled with `RUST_LOG`.

use std::io::Write;

use serde_json::{Map, Value};
use sfx_extract::{value_at, FetchMode, FetchRequest, Record, Session, SessionConfig, TimeWindow};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_WINDOW_HOURS: i64 = 24;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = SessionConfig::from_env().unwrap_or_else(|e| fail(e));
    let request = request_from_env().unwrap_or_else(|e| fail(e));

    let mut session = Session::rest(config).unwrap_or_else(|e| fail(e));
    if let Err(e) = session.connect().await {
        fail(e);
    }

    let result = extract(&session, &request).await;
    let closed = session.close().await;

    match result {
        Ok(count) => info!(count, "Extraction finished"),
        Err(e) => fail(e),
    }
    if let Err(e) = closed {
        warn!(error = %e, "Session did not close cleanly");
    }
}

async fn extract(
    session: &Session<sfx_extract::RestBackend>,
    request: &FetchRequest,
) -> sfx_extract::Result<usize> {
    let mut fetch = session.fetch(request).await?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut write_error = None;

    let count = fetch
        .for_each(|record, deleted_at| {
            let mut line = render(record, &request.fields);
            if let Some(at) = deleted_at {
                line.insert(
                    "deletedDate".to_string(),
                    Value::String(sfx_rest::format_datetime(&at)),
                );
            }
            if write_error.is_none() {
                if let Err(e) = writeln!(out, "{}", Value::Object(line)) {
                    write_error = Some(e);
                }
            }
        })
        .await?;

    if let Some(e) = write_error {
        fail(e);
    }
    Ok(count)
}

/// The requested fields by dotted path, or every visible field when the
/// fetch ran an explicit query.
fn render(record: &Record, fields: &[String]) -> Map<String, Value> {
    if fields.is_empty() {
        return match record.to_json() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
    }
    fields
        .iter()
        .map(|path| {
            let value = value_at(record, path).map(Value::String).unwrap_or(Value::Null);
            (path.clone(), value)
        })
        .collect()
}

fn request_from_env() -> sfx_extract::Result<FetchRequest> {
    let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

    let fields: Vec<String> = var("SF_FIELDS")
        .map(|fields| {
            fields
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let hours = match var("SF_WINDOW_HOURS") {
        Some(h) => h.trim().parse().map_err(|_| {
            sfx_extract::Error::new(sfx_extract::ErrorKind::Configuration(format!(
                "SF_WINDOW_HOURS is not a number: {h}"
            )))
        })?,
        None => DEFAULT_WINDOW_HOURS,
    };
    let mode = match var("SF_MODE").as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("all") => FetchMode::All,
        Some("updated") => FetchMode::UpdatedSince(TimeWindow::last_hours(hours)?),
        Some("deleted") => FetchMode::DeletedSince(TimeWindow::last_hours(hours)?),
        Some(other) => {
            return Err(sfx_extract::Error::new(
                sfx_extract::ErrorKind::Configuration(format!(
                    "SF_MODE must be all, updated or deleted, got {other}"
                )),
            ))
        }
    };

    let request = FetchRequest {
        object: var("SF_OBJECT"),
        fields,
        condition: var("SF_CONDITION"),
        query: var("SF_QUERY"),
        mode,
    };
    request.validate()?;
    Ok(request)
}

fn fail(error: impl std::fmt::Display) -> ! {
    eprintln!("Error: {error}");
    std::process::exit(1);
}
