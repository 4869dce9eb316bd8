use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar(dir: &Path) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_teachermated");
    let mut child = Command::new(exe)
        .current_dir(dir)
        .env("TZ", "UTC")
        .env("TEACHERMATE_CONFIG", dir.join("teachermate.config.json"))
        .env("TEACHERMATE_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn teachermated");
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
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
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
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_default()
}

fn class_names(stdin: &mut ChildStdin, reader: &mut BufReader<ChildStdout>) -> Vec<String> {
    let res = request_ok(stdin, reader, "classes", "classes.list", json!({}));
    res["classes"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .filter_map(|c| c["name"].as_str().map(str::to_string))
        .collect()
}

#[test]
fn preferences_are_validated_and_persisted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(dir.path());

    let initial = request_ok(&mut stdin, &mut reader, "1", "settings.get", json!({}));
    assert_eq!(initial["config"]["appearance"]["theme"], "light");
    assert_eq!(initial["config"]["appearance"]["language"], "es");
    assert_eq!(initial["config"]["calendar"]["defaultView"], "month");
    assert_eq!(initial["connection"]["status"], "mock");

    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "settings.update",
        json!({ "section": "appearance", "patch": { "theme": "dark", "language": "eu" } }),
    );
    assert_eq!(updated["config"]["appearance"]["theme"], "dark");
    assert_eq!(updated["connection"]["label"], "Modu lokala");

    let rejected = request(
        &mut stdin,
        &mut reader,
        "3",
        "settings.update",
        json!({ "section": "appearance", "patch": { "theme": "sepia", "language": "es" } }),
    );
    assert_eq!(rejected["error"]["code"], "bad_params");
    let unchanged = request_ok(&mut stdin, &mut reader, "4", "settings.get", json!({}));
    assert_eq!(unchanged["config"]["appearance"]["language"], "eu");

    let unknown = request(
        &mut stdin,
        &mut reader,
        "5",
        "settings.update",
        json!({ "section": "fonts", "patch": {} }),
    );
    assert_eq!(unknown["error"]["code"], "bad_params");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "settings.update",
        json!({ "section": "calendar", "patch": { "defaultView": "week" } }),
    );
    drop(stdin);
    let _ = child.wait();

    let saved: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("teachermate.config.json")).expect("config"),
    )
    .expect("config json");
    assert_eq!(saved["appearance"]["theme"], "dark");
    assert_eq!(saved["calendar"]["defaultView"], "week");

    let (mut child, mut stdin, mut reader) = spawn_sidecar(dir.path());
    let view = request_ok(&mut stdin, &mut reader, "7", "calendar.open", json!({}));
    assert_eq!(view["view"], "week");
    let dict = request_ok(&mut stdin, &mut reader, "8", "i18n.dictionary", json!({}));
    assert_eq!(dict["language"], "eu");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn workspace_connection_persists_and_backup_restores_into_memory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let workspace = dir.path().join("workspace");
    let bundle = dir.path().join("out").join("backup.zip");

    let (mut child, mut stdin, mut reader) = spawn_sidecar(dir.path());
    let saved = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "settings.connection.save",
        json!({ "workspacePath": workspace.to_string_lossy() }),
    );
    assert_eq!(saved["connection"]["status"], "connected");
    assert_eq!(saved["connection"]["label"], "Conectado");
    assert!(workspace.join("teachermate.sqlite3").exists());

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "classes.create",
        json!({ "name": "3A", "subject": "Historia" }),
    );
    drop(stdin);
    let _ = child.wait();

    let (mut child, mut stdin, mut reader) = spawn_sidecar(dir.path());
    let health = request_ok(&mut stdin, &mut reader, "3", "health", json!({}));
    assert_eq!(health["storeStatus"], "connected");
    assert_eq!(class_names(&mut stdin, &mut reader), vec!["3A".to_string()]);

    let exported = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "backup.export",
        json!({ "outPath": bundle.to_string_lossy() }),
    );
    assert_eq!(exported["bundleFormat"], "teachermate-collections-v1");
    let classes = exported["collections"]
        .as_array()
        .expect("collections")
        .iter()
        .find(|c| c["collection"] == "classes")
        .cloned()
        .expect("classes entry");
    assert_eq!(classes["count"], 1);
    assert!(bundle.exists());

    let cleared = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "settings.connection.clear",
        json!({}),
    );
    assert_eq!(cleared["connection"]["status"], "mock");
    assert!(cleared["config"]["connection"]["workspacePath"].is_null());
    assert!(class_names(&mut stdin, &mut reader).is_empty());

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "backup.import",
        json!({ "inPath": bundle.to_string_lossy() }),
    );
    assert_eq!(class_names(&mut stdin, &mut reader), vec!["3A".to_string()]);

    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "x").expect("write blocker");
    let failed = request(
        &mut stdin,
        &mut reader,
        "7",
        "workspace.select",
        json!({ "path": blocker.to_string_lossy() }),
    );
    assert_eq!(failed["ok"], false);
    assert_eq!(failed["error"]["code"], "io_failed");
    let status = request_ok(&mut stdin, &mut reader, "8", "store.status", json!({}));
    assert_eq!(status["status"], "mock");

    let missing = request(
        &mut stdin,
        &mut reader,
        "9",
        "backup.import",
        json!({ "inPath": dir.path().join("nope.zip").to_string_lossy() }),
    );
    assert_eq!(missing["error"]["code"], "io_failed");

    drop(stdin);
    let _ = child.wait();
}
