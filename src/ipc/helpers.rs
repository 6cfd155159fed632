use serde_json::json;

use super::error::err;
use super::types::{AppState, Request};
use crate::domain::{DomainError, Session};
use crate::grading::{self, Metrics};
use crate::store::{Store, Student};

pub fn param_str<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params.get(key).and_then(|v| v.as_str())
}

pub fn param_u32(req: &Request, key: &str) -> Option<u32> {
    req.params
        .get(key)
        .and_then(|v| v.as_u64())
        .and_then(|n| u32::try_from(n).ok())
}

pub fn missing_param(req: &Request, key: &str) -> serde_json::Value {
    err(&req.id, "bad_params", format!("missing params.{key}"), None)
}

pub fn domain_err(id: &str, e: &DomainError) -> serde_json::Value {
    err(id, e.code(), e.to_string(), None)
}

/// Guards shared by every handler that needs a workspace or a login. They
/// return the ready error response when the precondition fails.
pub fn require_store<'a>(
    state: &'a AppState,
    req: &Request,
) -> Result<&'a Store, serde_json::Value> {
    state.store.as_ref().ok_or_else(|| {
        err(
            &req.id,
            "no_workspace",
            "select a workspace before calling this method",
            None,
        )
    })
}

pub fn require_session<'a>(
    state: &'a AppState,
    req: &Request,
) -> Result<&'a Session, serde_json::Value> {
    state
        .session
        .as_ref()
        .ok_or_else(|| err(&req.id, "not_logged_in", "log in first", None))
}

/// One report row: the stored record plus everything derived from it.
pub fn student_row(student: &Student, all: &[Student]) -> serde_json::Value {
    let Metrics {
        gpa,
        percentage,
        grade,
    } = grading::compute_metrics(student);
    json!({
        "id": student.id,
        "name": student.name,
        "age": student.age,
        "course": student.course,
        "math": student.math,
        "science": student.science,
        "history": student.history,
        "english": student.english,
        "parentName": student.parent_name,
        "parentPhone": student.parent_phone,
        "total": grading::raw_total(student),
        "percentage": percentage,
        "gpa": gpa,
        "grade": grade,
        "rank": grading::class_rank(student, all),
    })
}
