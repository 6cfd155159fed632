use thiserror::Error;

use crate::activity;
use crate::auth;
use crate::store::{Credential, LogEntry, Role, Store, Student};

pub const MIN_PASSWORD_LEN: usize = 6;

/// The authenticated identity, threaded explicitly through every operation.
/// There is no process-wide "current user".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),
    #[error("user ID not found")]
    UnknownUser,
    #[error("invalid password")]
    BadCredential,
    #[error("student ID {0} already exists")]
    DuplicateId(String),
    #[error("student {0} not found")]
    NoSuchStudent(String),
    #[error("current password is incorrect")]
    WrongCurrentPassword,
    #[error("new passwords do not match")]
    PasswordMismatch,
    #[error("password should be at least {MIN_PASSWORD_LEN} characters long")]
    PasswordTooShort,
    #[error("this action requires a teacher account")]
    Forbidden,
    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

impl DomainError {
    /// Stable wire code for the presentation layer.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation",
            DomainError::UnknownUser => "not_found",
            DomainError::BadCredential => "bad_credential",
            DomainError::DuplicateId(_) => "duplicate_id",
            DomainError::NoSuchStudent(_) => "not_found",
            DomainError::WrongCurrentPassword => "wrong_password",
            DomainError::PasswordMismatch => "password_mismatch",
            DomainError::PasswordTooShort => "password_too_short",
            DomainError::Forbidden => "forbidden",
            DomainError::Persistence(_) => "io_failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub course: String,
    pub parent_name: String,
    pub parent_phone: String,
}

#[derive(Debug, Clone, Copy)]
pub struct SubjectMarks {
    pub math: u32,
    pub science: u32,
    pub history: u32,
    pub english: u32,
}

#[derive(Debug, Clone)]
pub struct StudentDetails {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub course: String,
    pub parent_name: String,
    pub parent_phone: String,
}

fn require_teacher(session: &Session) -> Result<(), DomainError> {
    match session.role {
        Role::Teacher => Ok(()),
        Role::Student => Err(DomainError::Forbidden),
    }
}

fn require_filled(fields: &[(&str, &str)]) -> Result<(), DomainError> {
    for (label, value) in fields {
        if value.trim().is_empty() {
            return Err(DomainError::Validation(format!("{label} is required")));
        }
    }
    Ok(())
}

fn require_valid_age(age: u32) -> Result<(), DomainError> {
    if age < 15 {
        return Err(DomainError::Validation(
            "age must be at least 15".to_string(),
        ));
    }
    Ok(())
}

/// Exact, case-sensitive id lookup followed by digest comparison.
pub fn authenticate(
    store: &Store,
    user_id: &str,
    password: &str,
) -> Result<Session, DomainError> {
    let users = store.users()?;
    let cred = users.rows.get(user_id).ok_or(DomainError::UnknownUser)?;
    if !auth::verify_password(password, &cred.password) {
        return Err(DomainError::BadCredential);
    }
    Ok(Session {
        user_id: user_id.to_string(),
        name: cred.name.clone(),
        role: cred.role,
    })
}

/// Insert a student (all marks zeroed) plus the matching login credential.
/// The two commits are not transactional: a credential write failing after
/// the student write leaves the collections diverged, matching the
/// whole-file-overwrite contract.
pub fn add_student(
    store: &Store,
    session: &Session,
    new: &NewStudent,
    password: &str,
    confirm_password: &str,
) -> Result<(), DomainError> {
    require_teacher(session)?;
    require_filled(&[
        ("student ID", &new.id),
        ("name", &new.name),
        ("course", &new.course),
        ("parent name", &new.parent_name),
        ("parent phone", &new.parent_phone),
        ("password", password),
    ])?;
    if password != confirm_password {
        return Err(DomainError::Validation(
            "passwords do not match".to_string(),
        ));
    }
    require_valid_age(new.age)?;

    let mut students = store.students()?;
    if students.rows.iter().any(|s| s.id == new.id) {
        return Err(DomainError::DuplicateId(new.id.clone()));
    }
    students.rows.push(Student {
        id: new.id.clone(),
        name: new.name.clone(),
        age: new.age,
        course: new.course.clone(),
        math: 0,
        science: 0,
        history: 0,
        english: 0,
        parent_name: new.parent_name.clone(),
        parent_phone: new.parent_phone.clone(),
    });

    let mut users = store.users()?;
    users.rows.insert(
        new.id.clone(),
        Credential {
            name: new.name.clone(),
            password: auth::hash_password(password),
            role: Role::Student,
        },
    );

    students.commit()?;
    users.commit()?;
    activity::record_best_effort(
        store,
        &session.user_id,
        &format!("Added new student {} (ID: {})", new.name, new.id),
    );
    Ok(())
}

/// Overwrite only the subjects whose value actually changed; each change
/// gets its own audit entry so the trail stays per-subject.
pub fn update_marks(
    store: &Store,
    session: &Session,
    id: &str,
    new_marks: SubjectMarks,
) -> Result<Vec<&'static str>, DomainError> {
    require_teacher(session)?;
    for (subject, value) in [
        ("math", new_marks.math),
        ("science", new_marks.science),
        ("history", new_marks.history),
        ("english", new_marks.english),
    ] {
        if value > 100 {
            return Err(DomainError::Validation(format!(
                "{subject} mark must be between 0 and 100"
            )));
        }
    }

    let mut students = store.students()?;
    let student = students
        .rows
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| DomainError::NoSuchStudent(id.to_string()))?;

    let mut changed: Vec<(&'static str, u32)> = Vec::new();
    for (subject, slot, value) in [
        ("math", &mut student.math, new_marks.math),
        ("science", &mut student.science, new_marks.science),
        ("history", &mut student.history, new_marks.history),
        ("english", &mut student.english, new_marks.english),
    ] {
        if *slot != value {
            *slot = value;
            changed.push((subject, value));
        }
    }
    if changed.is_empty() {
        return Ok(Vec::new());
    }
    let name = student.name.clone();

    students.commit()?;
    for (subject, value) in &changed {
        activity::record_best_effort(
            store,
            &session.user_id,
            &format!("Updated {subject} mark for {name} (ID: {id}) to {value}"),
        );
    }
    Ok(changed.into_iter().map(|(subject, _)| subject).collect())
}

/// Overwrite the mutable bio fields in one pass; the id never changes. The
/// new name is propagated into the matching credential when one exists, and
/// silently skipped when it does not (credential drift is tolerated).
pub fn update_details(
    store: &Store,
    session: &Session,
    details: &StudentDetails,
) -> Result<(), DomainError> {
    require_teacher(session)?;
    require_filled(&[("name", &details.name)])?;
    require_valid_age(details.age)?;

    let mut students = store.students()?;
    let student = students
        .rows
        .iter_mut()
        .find(|s| s.id == details.id)
        .ok_or_else(|| DomainError::NoSuchStudent(details.id.clone()))?;
    student.name = details.name.clone();
    student.age = details.age;
    student.course = details.course.clone();
    student.parent_name = details.parent_name.clone();
    student.parent_phone = details.parent_phone.clone();

    let mut users = store.users()?;
    let has_credential = users.rows.contains_key(&details.id);
    if let Some(cred) = users.rows.get_mut(&details.id) {
        cred.name = details.name.clone();
    }

    students.commit()?;
    if has_credential {
        users.commit()?;
    }
    activity::record_best_effort(
        store,
        &session.user_id,
        &format!(
            "Updated details for student {} (ID: {})",
            details.name, details.id
        ),
    );
    Ok(())
}

/// Delete the student and, when present, the matching credential. Returns
/// the removed student's last known name for the caller's confirmation
/// message.
pub fn remove_student(
    store: &Store,
    session: &Session,
    id: &str,
) -> Result<String, DomainError> {
    require_teacher(session)?;

    let mut students = store.students()?;
    let name = students
        .rows
        .iter()
        .find(|s| s.id == id)
        .map(|s| s.name.clone())
        .ok_or_else(|| DomainError::NoSuchStudent(id.to_string()))?;
    students.rows.retain(|s| s.id != id);

    let mut users = store.users()?;
    let had_credential = users.rows.remove(id).is_some();

    students.commit()?;
    if had_credential {
        users.commit()?;
    }
    activity::record_best_effort(
        store,
        &session.user_id,
        &format!("Removed student {name} (ID: {id})"),
    );
    Ok(name)
}

/// Rewrite the session user's own password hash. Validation order is fixed:
/// current password, then confirmation, then length.
pub fn change_password(
    store: &Store,
    session: &Session,
    current: &str,
    new: &str,
    confirm: &str,
) -> Result<(), DomainError> {
    let mut users = store.users()?;
    let cred = users
        .rows
        .get_mut(&session.user_id)
        .ok_or(DomainError::UnknownUser)?;
    if !auth::verify_password(current, &cred.password) {
        return Err(DomainError::WrongCurrentPassword);
    }
    if new != confirm {
        return Err(DomainError::PasswordMismatch);
    }
    if new.len() < MIN_PASSWORD_LEN {
        return Err(DomainError::PasswordTooShort);
    }
    cred.password = auth::hash_password(new);

    users.commit()?;
    // Only the fact of the change is logged, never the secret itself.
    activity::record_best_effort(store, &session.user_id, "Changed password");
    Ok(())
}

/// The session user's own audit tail: most recent `limit` entries, oldest
/// first within that window.
pub fn recent_activity(
    store: &Store,
    session: &Session,
    limit: usize,
) -> Result<Vec<LogEntry>, DomainError> {
    let logs = store.logs()?;
    let mine: Vec<LogEntry> = logs
        .rows
        .into_iter()
        .filter(|entry| entry.user_id == session.user_id)
        .collect();
    let skip = mine.len().saturating_sub(limit);
    Ok(mine.into_iter().skip(skip).collect())
}
