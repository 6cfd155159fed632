use serde_json::json;

use crate::domain::{self, NewStudent, StudentDetails};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    domain_err, missing_param, param_str, param_u32, require_session, require_store, student_row,
};
use crate::ipc::types::{AppState, Request};
use crate::store::Role;

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match require_store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let session = match require_session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    if session.role != Role::Teacher {
        return err(
            &req.id,
            "forbidden",
            "this action requires a teacher account",
            None,
        );
    }

    match store.students() {
        Ok(students) => {
            let rows: Vec<serde_json::Value> = students
                .rows
                .iter()
                .map(|s| student_row(s, &students.rows))
                .collect();
            ok(&req.id, json!({ "students": rows }))
        }
        Err(e) => err(&req.id, "io_failed", format!("{e:#}"), None),
    }
}

fn handle_add(state: &mut AppState, req: &Request) -> serde_json::Value {
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
    let Some(age) = param_u32(req, "age") else {
        return missing_param(req, "age");
    };
    let Some(password) = param_str(req, "password") else {
        return missing_param(req, "password");
    };
    let Some(confirm) = param_str(req, "confirmPassword") else {
        return missing_param(req, "confirmPassword");
    };
    let new = NewStudent {
        id: id.to_string(),
        name: param_str(req, "name").unwrap_or_default().to_string(),
        age,
        course: param_str(req, "course").unwrap_or_default().to_string(),
        parent_name: param_str(req, "parentName").unwrap_or_default().to_string(),
        parent_phone: param_str(req, "parentPhone").unwrap_or_default().to_string(),
    };

    match domain::add_student(store, session, &new, password, confirm) {
        Ok(()) => ok(&req.id, json!({ "id": new.id, "name": new.name })),
        Err(e) => domain_err(&req.id, &e),
    }
}

fn handle_update_details(state: &mut AppState, req: &Request) -> serde_json::Value {
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
    let Some(age) = param_u32(req, "age") else {
        return missing_param(req, "age");
    };
    let details = StudentDetails {
        id: id.to_string(),
        name: param_str(req, "name").unwrap_or_default().to_string(),
        age,
        course: param_str(req, "course").unwrap_or_default().to_string(),
        parent_name: param_str(req, "parentName").unwrap_or_default().to_string(),
        parent_phone: param_str(req, "parentPhone").unwrap_or_default().to_string(),
    };

    match domain::update_details(store, session, &details) {
        Ok(()) => ok(&req.id, json!({ "id": details.id })),
        Err(e) => domain_err(&req.id, &e),
    }
}

fn handle_remove(state: &mut AppState, req: &Request) -> serde_json::Value {
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

    match domain::remove_student(store, session, id) {
        Ok(name) => ok(&req.id, json!({ "id": id, "name": name })),
        Err(e) => domain_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_list(state, req)),
        "students.add" => Some(handle_add(state, req)),
        "students.updateDetails" => Some(handle_update_details(state, req)),
        "students.remove" => Some(handle_remove(state, req)),
        _ => None,
    }
}
