use serde_json::json;

use crate::grading;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    missing_param, param_str, require_session, require_store, student_row,
};
use crate::ipc::types::{AppState, Request};
use crate::store::{Role, Student};

const GRADE_LETTERS: [&str; 5] = ["A", "B", "C", "D", "F"];

fn class_summary(students: &[Student]) -> serde_json::Value {
    let rows: Vec<serde_json::Value> =
        students.iter().map(|s| student_row(s, students)).collect();

    let count = students.len();
    let mut gpa_sum = 0.0;
    let mut passed = 0usize;
    let mut grade_counts = [0usize; 5];
    let mut subject_sums = [0u32; 4];
    for s in students {
        let m = grading::compute_metrics(s);
        gpa_sum += m.gpa;
        if m.percentage >= 60.0 {
            passed += 1;
        }
        if let Some(pos) = GRADE_LETTERS.iter().position(|g| *g == m.grade) {
            grade_counts[pos] += 1;
        }
        for (sum, mark) in subject_sums.iter_mut().zip(grading::subject_marks(s)) {
            *sum += mark;
        }
    }

    let average_gpa = if count > 0 {
        grading::round2(gpa_sum / count as f64)
    } else {
        0.0
    };
    let pass_rate = if count > 0 {
        grading::round2(100.0 * passed as f64 / count as f64)
    } else {
        0.0
    };
    let subject_averages: serde_json::Map<String, serde_json::Value> = grading::SUBJECTS
        .iter()
        .zip(subject_sums)
        .map(|(subject, sum)| {
            let avg = if count > 0 {
                grading::round2(f64::from(sum) / count as f64)
            } else {
                0.0
            };
            (subject.to_string(), json!(avg))
        })
        .collect();
    let grade_distribution: serde_json::Map<String, serde_json::Value> = GRADE_LETTERS
        .iter()
        .zip(grade_counts)
        .map(|(letter, n)| (letter.to_string(), json!(n)))
        .collect();

    json!({
        "totalStudents": count,
        "classAverageGpa": average_gpa,
        "passRate": pass_rate,
        "gradeDistribution": grade_distribution,
        "subjectAverages": subject_averages,
        "topStudents": top_students(students),
        "students": rows,
    })
}

/// Top three by raw total, ties resolved by stored order.
fn top_students(students: &[Student]) -> Vec<serde_json::Value> {
    let mut sorted: Vec<&Student> = students.iter().collect();
    sorted.sort_by(|a, b| grading::raw_total(b).cmp(&grading::raw_total(a)));
    sorted
        .into_iter()
        .take(3)
        .enumerate()
        .map(|(i, s)| {
            let m = grading::compute_metrics(s);
            json!({
                "position": i + 1,
                "id": s.id,
                "name": s.name,
                "percentage": m.percentage,
                "gpa": m.gpa,
                "grade": m.grade,
            })
        })
        .collect()
}

fn handle_class(state: &mut AppState, req: &Request) -> serde_json::Value {
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
        Ok(students) => ok(&req.id, class_summary(&students.rows)),
        Err(e) => err(&req.id, "io_failed", format!("{e:#}"), None),
    }
}

fn handle_student(state: &mut AppState, req: &Request) -> serde_json::Value {
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
    // Students may only open their own dashboard; teachers may open any.
    if session.role == Role::Student && session.user_id != id {
        return err(
            &req.id,
            "forbidden",
            "students can only view their own report",
            None,
        );
    }

    let students = match store.students() {
        Ok(s) => s,
        Err(e) => return err(&req.id, "io_failed", format!("{e:#}"), None),
    };
    let Some(student) = students.rows.iter().find(|s| s.id == id) else {
        return err(&req.id, "not_found", format!("student {id} not found"), None);
    };

    ok(
        &req.id,
        json!({
            "student": student_row(student, &students.rows),
            "topStudents": top_students(&students.rows),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.class" => Some(handle_class(state, req)),
        "reports.student" => Some(handle_student(state, req)),
        _ => None,
    }
}
