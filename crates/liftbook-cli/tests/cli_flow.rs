use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use rusqlite::Connection;
use serde_json::Value;
use tempfile::TempDir;

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_liftbook"))
}

/// Isolated XDG homes for one test.
struct Home {
    dir: TempDir,
}

impl Home {
    fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("c")).expect("create config dir");
        std::fs::create_dir_all(dir.path().join("d")).expect("create data dir");
        Self { dir }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(bin());
        cmd.env("XDG_CONFIG_HOME", self.dir.path().join("c"))
            .env("XDG_DATA_HOME", self.dir.path().join("d"))
            .env_remove("LIFTBOOK_DB")
            .env_remove("LIFTBOOK_USER")
            .env_remove("LIFTBOOK_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command().args(args).output().expect("run liftbook")
    }

    fn run_ok(&self, args: &[&str]) -> Output {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "{:?} failed: stdout={}, stderr={}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        output
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self.run_ok(args);
        serde_json::from_slice(&output.stdout).expect("parse json output")
    }

    fn write(&self, name: &str, value: &Value) -> String {
        let path = self.dir.path().join(name);
        std::fs::write(&path, value.to_string()).expect("write payload");
        path.to_string_lossy().to_string()
    }

    fn db_path(&self) -> PathBuf {
        self.dir.path().join("d").join("liftbook").join("liftbook.db")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn field<'a>(value: &'a Value, key: &str) -> &'a str {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_else(|| panic!("missing string field {}", key))
}

/// Initialized home with Squat and Bench Press in the catalog.
fn seeded() -> (Home, String, String) {
    let home = Home::new();
    home.run_ok(&["init"]);
    let squat = stdout(&home.run_ok(&["-q", "exercise", "add", "Squat"]));
    let bench = stdout(&home.run_ok(&["-q", "exercise", "add", "Bench Press"]));
    (home, squat, bench)
}

fn create_template(home: &Home, squat: &str, bench: &str) -> Value {
    let payload = serde_json::json!({
        "name": "Push pull",
        "exercises": [
            {"exercise_id": squat, "sets": 3, "reps": 5, "weight": 100.0},
            {"exercise_id": bench, "sets": 2, "reps": 8}
        ]
    });
    let file = home.write("workout.json", &payload);
    home.json(&["workout", "create", "--file", &file, "--json"])
}

#[test]
fn test_cli_init_writes_config_and_database() {
    let home = Home::new();
    let init = home.run_ok(&["init"]);
    let output = stdout(&init);
    assert!(output.contains("status=ok"));
    assert!(output.contains("user_id="));
    assert!(home.db_path().exists());

    let config_path = home.dir.path().join("c").join("liftbook").join("config.toml");
    let config = std::fs::read_to_string(&config_path).expect("read config");
    assert!(config.contains("[database]"));
    assert!(config.contains("[user]"));

    // A second init refuses to clobber the config.
    let again = home.run(&["init"]);
    assert_eq!(again.status.code(), Some(4));
    home.run_ok(&["init", "--force"]);

    let conn = Connection::open(home.db_path()).expect("open database");
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'exercise_sets'",
            [],
            |row| row.get(0),
        )
        .expect("query");
    assert_eq!(tables, 1);
}

#[test]
fn test_cli_template_session_flow() {
    let (home, squat, bench) = seeded();

    let exercises = home.json(&["exercise", "list", "--json"]);
    let names: Vec<&str> = exercises
        .as_array()
        .expect("exercise array")
        .iter()
        .map(|e| field(e, "name"))
        .collect();
    assert_eq!(names, vec!["Bench Press", "Squat"]);

    let template = create_template(&home, &squat, &bench);
    let workout_id = field(&template, "id").to_string();
    let entries = template["exercises"].as_array().expect("exercises");
    assert_eq!(entries.len(), 2);
    let squat_instance = field(&entries[0], "exercise_instance_id").to_string();

    let list = home.json(&["workout", "list", "--json"]);
    assert_eq!(list["total"], 1);
    assert_eq!(field(&list["items"][0], "id"), workout_id);

    let session = home.json(&["session", "start", &workout_id, "--json"]);
    let session_id = field(&session, "id").to_string();
    let sets = session["sets"].as_array().expect("sets");
    assert_eq!(sets.len(), 5);
    assert_eq!(field(&session, "status"), "in_progress");

    let logged = home.json(&[
        "set",
        "log",
        &session_id,
        "--exercise",
        "squat",
        "--instance",
        &squat_instance,
        "--weight",
        "105",
        "--reps",
        "3",
        "--json",
    ]);
    assert_eq!(logged["set_number"], 4);
    assert_eq!(field(&logged, "exercise_instance_id"), squat_instance);

    let shown = stdout(&home.run_ok(&["session", "show", &session_id]));
    assert!(shown.contains("Squat"));
    assert!(shown.contains("Bench Press"));
    assert!(shown.contains("in_progress"));

    home.run_ok(&["session", "finish", &session_id, "--active", "1800"]);
    let finished = home.json(&["session", "show", &session_id, "--json"]);
    assert_eq!(field(&finished, "status"), "completed");
    assert_eq!(finished["active_duration_secs"], 1800);
    assert_eq!(finished["sets"].as_array().expect("sets").len(), 6);

    let check = stdout(&home.run_ok(&["check"]));
    assert!(check.contains("Integrity check: OK"));
}

#[test]
fn test_cli_resubmitting_shown_workout_changes_nothing() {
    let (home, squat, bench) = seeded();
    let template = create_template(&home, &squat, &bench);
    let workout_id = field(&template, "id").to_string();

    let shown = home.run_ok(&["workout", "show", &workout_id, "--json"]);

    let mut child = home
        .command()
        .args(["workout", "update", workout_id.as_str(), "--file", "-", "--json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn update");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(&shown.stdout)
        .expect("write stdin");
    let updated = child.wait_with_output().expect("wait update");
    assert!(
        updated.status.success(),
        "update failed: {}",
        String::from_utf8_lossy(&updated.stderr)
    );

    let before: Value = serde_json::from_slice(&shown.stdout).expect("parse show");
    let after: Value = serde_json::from_slice(&updated.stdout).expect("parse update");
    assert_eq!(before, after);
}

#[test]
fn test_cli_exit_codes() {
    // No config yet, so there is no user to act as.
    let fresh = Home::new();
    let missing_user = fresh.run(&["workout", "list"]);
    assert_eq!(missing_user.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&missing_user.stderr).contains("liftbook init"));

    let (home, squat, bench) = seeded();
    let template = create_template(&home, &squat, &bench);
    let workout_id = field(&template, "id").to_string();

    let absent = home.run(&["workout", "show", "6f1c2d3e-0000-4000-8000-000000000000"]);
    assert_eq!(absent.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&absent.stderr).contains("liftbook workout list"));

    let bad_id = home.run(&["workout", "show", "not-a-uuid"]);
    assert_eq!(bad_id.status.code(), Some(4));

    let too_many = home.run(&["workout", "list", "--limit", "101"]);
    assert_eq!(too_many.status.code(), Some(4));

    let unknown = serde_json::json!({
        "name": "Ghost",
        "exercises": [{"exercise_id": "6f1c2d3e-0000-4000-8000-000000000001"}]
    });
    let file = home.write("unknown.json", &unknown);
    let invalid = home.run(&["workout", "create", "--file", &file]);
    assert_eq!(invalid.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&invalid.stderr).contains("exercises[0]"));

    let foreign = serde_json::json!({
        "name": "Push pull",
        "exercises": [{"id": "6f1c2d3e-0000-4000-8000-000000000002", "exercise_id": squat}]
    });
    let file = home.write("foreign.json", &foreign);
    let conflict = home.run(&["workout", "update", &workout_id, "--file", &file]);
    assert_eq!(conflict.status.code(), Some(5));

    // Stdin is not a terminal, so deleting needs --force.
    let unconfirmed = home.run(&["workout", "delete", &workout_id]);
    assert_eq!(unconfirmed.status.code(), Some(4));
    home.run_ok(&["workout", "show", &workout_id]);
}

#[test]
fn test_cli_delete_cascades_and_users_are_isolated() {
    let (home, squat, bench) = seeded();
    let template = create_template(&home, &squat, &bench);
    let workout_id = field(&template, "id").to_string();
    let session = home.json(&["session", "start", &workout_id, "--json"]);
    let session_id = field(&session, "id").to_string();
    let set_id = field(&session["sets"][0], "id").to_string();

    let intruder = "0b7c9a52-7d1e-4b8e-9a51-3f2f1d7c0a11";
    let theirs = home.json(&["--user", intruder, "workout", "list", "--json"]);
    assert_eq!(theirs["total"], 0);
    let peek = home.run(&["--user", intruder, "session", "show", &session_id]);
    assert_eq!(peek.status.code(), Some(3));
    let steal = home.run(&["--user", intruder, "set", "delete", &set_id]);
    assert_eq!(steal.status.code(), Some(3));

    home.run_ok(&["workout", "delete", &workout_id, "--force"]);
    assert_eq!(
        home.run(&["workout", "show", &workout_id]).status.code(),
        Some(3)
    );
    // The session outlives its template.
    home.run_ok(&["session", "show", &session_id]);

    home.run_ok(&["session", "delete", &session_id, "--force"]);
    assert_eq!(
        home.run(&["set", "delete", &set_id]).status.code(),
        Some(3)
    );
    let sessions = home.json(&["session", "list", "--json"]);
    assert_eq!(sessions["total"], 0);

    let conn = Connection::open(home.db_path()).expect("open database");
    let live: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM exercise_instances WHERE deleted_at IS NULL",
            [],
            |row| row.get(0),
        )
        .expect("query");
    assert_eq!(live, 0);
    home.run_ok(&["check"]);
}

#[test]
fn test_cli_db_flag_and_freestanding_session() {
    let (home, squat, _bench) = seeded();
    let other_db = home.dir.path().join("elsewhere").join("other.db");
    let other = other_db.to_string_lossy().to_string();

    home.run_ok(&["--db", &other, "exercise", "add", "Deadlift"]);
    assert!(Path::new(&other_db).exists());
    let catalog = home.json(&["--db", &other, "exercise", "list", "--json"]);
    assert_eq!(catalog.as_array().expect("array").len(), 1);

    let session = home.json(&["session", "new", "--started-at", "2024-03-01", "--json"]);
    let session_id = field(&session, "id").to_string();
    assert_eq!(field(&session, "started_at"), "2024-03-01T00:00:00Z");
    assert!(session["workout_id"].is_null());

    let first = home.json(&["set", "log", &session_id, "--exercise", &squat, "--json"]);
    let instance = field(&first, "exercise_instance_id").to_string();
    let second = home.json(&[
        "set",
        "log",
        &session_id,
        "--exercise",
        &squat,
        "--instance",
        &instance,
        "--json",
    ]);
    assert_eq!(first["set_number"], 1);
    assert_eq!(second["set_number"], 2);

    let taken = home.run(&[
        "set",
        "log",
        &session_id,
        "--exercise",
        &squat,
        "--instance",
        &instance,
        "--number",
        "2",
    ]);
    assert_eq!(taken.status.code(), Some(4));
}
