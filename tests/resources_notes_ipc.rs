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

#[test]
fn resources_search_favourite_and_confirmed_delete() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(dir.path());

    let saved = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "resources.save",
        json!({
            "title": "Fracciones interactivas",
            "url": " https://example.org/fracciones ",
            "category": "Matemáticas",
            "tags": "primaria, juegos,"
        }),
    );
    let fractions = saved["resourceId"].as_str().expect("resourceId").to_string();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "resources.save",
        json!({ "title": "Mapa mudo", "tags": ["geografía"] }),
    );

    let by_tag = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "resources.list",
        json!({ "search": "JUEGOS" }),
    );
    let found = by_tag["resources"].as_array().expect("resources");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["url"], "https://example.org/fracciones");
    assert_eq!(found[0]["tags"], json!(["primaria", "juegos"]));
    assert_eq!(found[0]["isFavorite"], false);

    let fav = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "resources.toggleFavorite",
        json!({ "resourceId": fractions }),
    );
    assert_eq!(fav["isFavorite"], true);

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "resources.save",
        json!({ "resourceId": fractions, "title": "Fracciones", "tags": [] }),
    );
    let edited = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "resources.list",
        json!({ "search": "fracciones" }),
    );
    assert_eq!(edited["resources"][0]["title"], "Fracciones");
    assert_eq!(edited["resources"][0]["isFavorite"], true);

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "resources.requestDelete",
        json!({ "resourceId": fractions }),
    );
    let pending = request_ok(&mut stdin, &mut reader, "8", "resources.list", json!({}));
    assert_eq!(pending["pendingDelete"], fractions.as_str());
    assert_eq!(pending["resources"].as_array().expect("resources").len(), 2);

    let deleted = request_ok(&mut stdin, &mut reader, "9", "resources.confirmDelete", json!({}));
    assert_eq!(deleted["deleted"], fractions.as_str());
    let after = request_ok(&mut stdin, &mut reader, "10", "resources.list", json!({}));
    assert_eq!(after["resources"].as_array().expect("resources").len(), 1);
    assert!(after["pendingDelete"].is_null());

    let nothing = request_ok(&mut stdin, &mut reader, "11", "resources.confirmDelete", json!({}));
    assert!(nothing["deleted"].is_null());

    let untitled = request(
        &mut stdin,
        &mut reader,
        "12",
        "resources.save",
        json!({ "title": " " }),
    );
    assert_eq!(untitled["error"]["code"], "bad_params");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn notes_create_validate_and_archive() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(dir.path());

    let first = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "notes.create",
        json!({ "content": "Fotocopias examen" }),
    );
    let first_id = first["noteId"].as_str().expect("noteId").to_string();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "notes.create",
        json!({ "content": "Llamar a la familia", "color": "#DBEAFE" }),
    );

    let listed = request_ok(&mut stdin, &mut reader, "3", "notes.list", json!({}));
    let notes = listed["notes"].as_array().expect("notes");
    assert_eq!(notes.len(), 2);
    assert_eq!(listed["colors"].as_array().expect("colors").len(), 4);
    let blue = notes
        .iter()
        .find(|n| n["content"] == "Llamar a la familia")
        .expect("blue note");
    assert_eq!(blue["color"], "#dbeafe");
    let yellow = notes
        .iter()
        .find(|n| n["id"] == first_id.as_str())
        .expect("first note");
    assert_eq!(yellow["color"], "#fef9c3");

    let blank = request(
        &mut stdin,
        &mut reader,
        "4",
        "notes.create",
        json!({ "content": "   " }),
    );
    assert_eq!(blank["error"]["code"], "bad_params");
    let bad_color = request(
        &mut stdin,
        &mut reader,
        "5",
        "notes.create",
        json!({ "content": "x", "color": "red" }),
    );
    assert_eq!(bad_color["error"]["code"], "bad_params");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "notes.archive",
        json!({ "noteId": first_id }),
    );
    let listed = request_ok(&mut stdin, &mut reader, "7", "notes.list", json!({}));
    assert_eq!(listed["notes"].as_array().expect("notes").len(), 1);

    let raw = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "store.getItems",
        json!({ "collection": "quick_notes" }),
    );
    assert_eq!(raw["items"].as_array().expect("items").len(), 2);

    let summary = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "dashboard.summary",
        json!({ "hour": 13 }),
    );
    assert_eq!(summary["activeNoteCount"], 1);
    assert_eq!(summary["greeting"], "Arratsalde on");

    drop(stdin);
    let _ = child.wait();
}
