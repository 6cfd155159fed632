use serde_json::json;

use crate::activity;
use crate::domain;
use crate::ipc::error::ok;
use crate::ipc::helpers::{domain_err, missing_param, param_str, require_session, require_store};
use crate::ipc::types::{AppState, Request};
use crate::store::Role;

fn role_str(role: Role) -> &'static str {
    match role {
        Role::Teacher => "teacher",
        Role::Student => "student",
    }
}

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match require_store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let Some(user_id) = param_str(req, "userId") else {
        return missing_param(req, "userId");
    };
    let Some(password) = param_str(req, "password") else {
        return missing_param(req, "password");
    };

    match domain::authenticate(store, user_id, password) {
        Ok(session) => {
            activity::record_best_effort(store, &session.user_id, "Logged in");
            let result = json!({
                "userId": session.user_id,
                "name": session.name,
                "role": role_str(session.role),
            });
            state.session = Some(session);
            ok(&req.id, result)
        }
        Err(e) => domain_err(&req.id, &e),
    }
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    let resp = {
        let store = match require_store(state, req) {
            Ok(s) => s,
            Err(resp) => return resp,
        };
        let session = match require_session(state, req) {
            Ok(s) => s,
            Err(resp) => return resp,
        };
        activity::record_best_effort(store, &session.user_id, "Logged out");
        ok(&req.id, json!({}))
    };
    state.session = None;
    resp
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.login" => Some(handle_login(state, req)),
        "auth.logout" => Some(handle_logout(state, req)),
        _ => None,
    }
}
