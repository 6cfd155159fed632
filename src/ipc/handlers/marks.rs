use serde_json::json;

use crate::domain::{self, SubjectMarks};
use crate::ipc::error::ok;
use crate::ipc::helpers::{
    domain_err, missing_param, param_str, require_session, require_store,
};
use crate::ipc::types::{AppState, Request};

fn mark_param(req: &Request, subject: &str) -> Option<u32> {
    req.params
        .get("marks")
        .and_then(|m| m.get(subject))
        .and_then(|v| v.as_u64())
        .and_then(|n| u32::try_from(n).ok())
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match require_store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let session = match require_session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let Some(id) = param_str(req, "id") else {
        return missing_param(req, "id");
    };
    let (Some(math), Some(science), Some(history), Some(english)) = (
        mark_param(req, "math"),
        mark_param(req, "science"),
        mark_param(req, "history"),
        mark_param(req, "english"),
    ) else {
        return missing_param(req, "marks");
    };

    let new_marks = SubjectMarks {
        math,
        science,
        history,
        english,
    };
    match domain::update_marks(store, session, id, new_marks) {
        Ok(changed) => ok(&req.id, json!({ "id": id, "changedSubjects": changed })),
        Err(e) => domain_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "marks.update" => Some(handle_update(state, req)),
        _ => None,
    }
}
