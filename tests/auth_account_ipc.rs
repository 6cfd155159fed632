use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use tempfile::TempDir;

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_gradebookd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradebookd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn request_err_code(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> String {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "{} unexpectedly succeeded: {}",
        method,
        value
    );
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .expect("error code")
        .to_string()
}

#[test]
fn login_logout_roundtrip_with_seeded_accounts() {
    let workspace = TempDir::new().expect("temp workspace");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    // Nothing works before a workspace is selected.
    let code = request_err_code(
        &mut stdin,
        &mut reader,
        "0",
        "auth.login",
        json!({ "userId": "T001", "password": "teacher123" }),
    );
    assert_eq!(code, "no_workspace");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.path().to_string_lossy() }),
    );

    let code = request_err_code(
        &mut stdin,
        &mut reader,
        "2",
        "auth.login",
        json!({ "userId": "T999", "password": "teacher123" }),
    );
    assert_eq!(code, "not_found");
    let code = request_err_code(
        &mut stdin,
        &mut reader,
        "3",
        "auth.login",
        json!({ "userId": "T001", "password": "wrong" }),
    );
    assert_eq!(code, "bad_credential");

    let login = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "auth.login",
        json!({ "userId": "T001", "password": "teacher123" }),
    );
    assert_eq!(login["role"], "teacher");
    assert_eq!(login["name"], "Sarah Jones");

    let health = request_ok(&mut stdin, &mut reader, "5", "health", json!({}));
    assert_eq!(health["loggedIn"], true);

    let _ = request_ok(&mut stdin, &mut reader, "6", "auth.logout", json!({}));
    let code = request_err_code(&mut stdin, &mut reader, "7", "auth.logout", json!({}));
    assert_eq!(code, "not_logged_in");

    // Login and logout both left audit entries.
    let login = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "auth.login",
        json!({ "userId": "T001", "password": "teacher123" }),
    );
    assert_eq!(login["role"], "teacher");
    let activity = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "account.recentActivity",
        json!({}),
    );
    let entries = activity["entries"].as_array().expect("entries");
    let activities: Vec<&str> = entries
        .iter()
        .map(|e| e["activity"].as_str().unwrap_or(""))
        .collect();
    assert_eq!(activities, vec!["Logged in", "Logged out", "Logged in"]);
}

#[test]
fn change_password_validation_order_and_rehash() {
    let workspace = TempDir::new().expect("temp workspace");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.path().to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "auth.login",
        json!({ "userId": "S001", "password": "alice123" }),
    );

    let code = request_err_code(
        &mut stdin,
        &mut reader,
        "3",
        "account.changePassword",
        json!({ "currentPassword": "nope", "newPassword": "newpass1", "confirmPassword": "newpass1" }),
    );
    assert_eq!(code, "wrong_password");
    let code = request_err_code(
        &mut stdin,
        &mut reader,
        "4",
        "account.changePassword",
        json!({ "currentPassword": "alice123", "newPassword": "newpass1", "confirmPassword": "other" }),
    );
    assert_eq!(code, "password_mismatch");
    let code = request_err_code(
        &mut stdin,
        &mut reader,
        "5",
        "account.changePassword",
        json!({ "currentPassword": "alice123", "newPassword": "tiny", "confirmPassword": "tiny" }),
    );
    assert_eq!(code, "password_too_short");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "account.changePassword",
        json!({ "currentPassword": "alice123", "newPassword": "newpass1", "confirmPassword": "newpass1" }),
    );
    let _ = request_ok(&mut stdin, &mut reader, "7", "auth.logout", json!({}));

    let code = request_err_code(
        &mut stdin,
        &mut reader,
        "8",
        "auth.login",
        json!({ "userId": "S001", "password": "alice123" }),
    );
    assert_eq!(code, "bad_credential");
    let login = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "auth.login",
        json!({ "userId": "S001", "password": "newpass1" }),
    );
    assert_eq!(login["role"], "student");
}

#[test]
fn malformed_json_line_does_not_kill_the_process() {
    let workspace = TempDir::new().expect("temp workspace");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    writeln!(stdin, "this is not json").expect("write garbage");
    stdin.flush().expect("flush");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response");
    assert_eq!(value["ok"], false);
    assert_eq!(value["error"]["code"], "bad_json");

    // The loop keeps serving requests afterwards.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.path().to_string_lossy() }),
    );
    let health = request_ok(&mut stdin, &mut reader, "2", "health", json!({}));
    assert_eq!(health["loggedIn"], false);
}
