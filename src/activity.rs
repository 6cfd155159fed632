use chrono::Local;

use crate::store::{LogEntry, Store};

/// Append one audit entry: check out the full log, push, commit. Callers in
/// the domain layer only invoke this after the primary mutation has been
/// persisted, so the log never claims a change that was not saved.
pub fn record(store: &Store, actor_id: &str, description: &str) -> anyhow::Result<()> {
    let mut logs = store.logs()?;
    logs.rows.push(LogEntry {
        timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        user_id: actor_id.to_string(),
        activity: description.to_string(),
    });
    logs.commit()
}

/// Best-effort variant for the mutation paths: a failed audit write must not
/// undo or hide an already-persisted change, so it is reported on the
/// observability channel instead of propagating.
pub fn record_best_effort(store: &Store, actor_id: &str, description: &str) {
    if let Err(e) = record(store, actor_id, description) {
        log::warn!("activity log write failed for {actor_id}: {e:#}");
    }
}
