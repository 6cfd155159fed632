use serde_json::json;

use crate::domain;
use crate::ipc::error::ok;
use crate::ipc::helpers::{
    domain_err, missing_param, param_str, require_session, require_store,
};
use crate::ipc::types::{AppState, Request};

const DEFAULT_ACTIVITY_LIMIT: usize = 10;

fn handle_change_password(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match require_store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let session = match require_session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let Some(current) = param_str(req, "currentPassword") else {
        return missing_param(req, "currentPassword");
    };
    let Some(new) = param_str(req, "newPassword") else {
        return missing_param(req, "newPassword");
    };
    let Some(confirm) = param_str(req, "confirmPassword") else {
        return missing_param(req, "confirmPassword");
    };

    match domain::change_password(store, session, current, new, confirm) {
        Ok(()) => ok(&req.id, json!({})),
        Err(e) => domain_err(&req.id, &e),
    }
}

fn handle_recent_activity(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match require_store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let session = match require_session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let limit = req
        .params
        .get("limit")
        .and_then(|v| v.as_u64())
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_ACTIVITY_LIMIT);

    match domain::recent_activity(store, session, limit) {
        Ok(entries) => {
            let rows: Vec<serde_json::Value> = entries
                .iter()
                .map(|e| {
                    json!({
                        "timestamp": e.timestamp,
                        "userId": e.user_id,
                        "activity": e.activity,
                    })
                })
                .collect();
            ok(&req.id, json!({ "entries": rows }))
        }
        Err(e) => domain_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "account.changePassword" => Some(handle_change_password(state, req)),
        "account.recentActivity" => Some(handle_recent_activity(state, req)),
        _ => None,
    }
}
