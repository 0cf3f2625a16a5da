#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use rusqlite::Connection;
use tempfile::TempDir;

fn setup_db() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("hotel.db");
    Connection::open(&path)
        .expect("open fixture db")
        .execute_batch(
            "CREATE TABLE guests (id INTEGER, name TEXT);
             INSERT INTO guests VALUES (1, 'Ada'), (2, 'Grace');
             CREATE TABLE arrivals (id INTEGER, name TEXT);",
        )
        .expect("seed demo data");
    (dir, path)
}

/// Drives the menu over stdin and returns (exit code, stdout, stderr).
fn session(dir: &Path, db: &Path, input: &str) -> (Option<i32>, String, String) {
    let output = cargo_bin_cmd!("csvbridge")
        .current_dir(dir)
        .env("CSVBRIDGE_CONFIG", dir.join("config.toml"))
        .env_remove("CSVBRIDGE_PROFILE")
        .env_remove("CSVBRIDGE_LOG_FILE")
        .env_remove("RUST_LOG")
        .args(["--database", db.to_str().unwrap(), "--no-log-file"])
        .write_stdin(input)
        .output()
        .expect("run csvbridge");
    (
        output.status.code(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

fn menu_count(stdout: &str) -> usize {
    stdout.matches("Enter your option : ").count()
}

#[test]
fn exit_option_ends_the_session() {
    let (dir, db) = setup_db();
    let (code, stdout, _) = session(dir.path(), &db, "5\n");
    assert_eq!(code, Some(0));
    assert!(stdout.contains("Please select to import from csv or export to csv:"));
    for entry in [
        "1. Import from csv",
        "2. Export to csv",
        "3. Delete data from table",
        "4. Display data from table",
        "5. Exit",
    ] {
        assert!(stdout.contains(entry), "missing menu entry {entry}");
    }
    assert_eq!(menu_count(&stdout), 1);
}

#[test]
fn end_of_input_behaves_like_exit() {
    let (dir, db) = setup_db();
    let (code, stdout, _) = session(dir.path(), &db, "");
    assert_eq!(code, Some(0));
    assert_eq!(menu_count(&stdout), 1);

    let (code, _, _) = session(dir.path(), &db, "1\nguests\n");
    assert_eq!(code, Some(0));
}

#[test]
fn unknown_option_redisplays_the_menu() {
    let (dir, db) = setup_db();
    let (code, stdout, stderr) = session(dir.path(), &db, "9\n  \nexit\n 5 \n");
    assert_eq!(code, Some(0));
    assert_eq!(menu_count(&stdout), 4);
    assert!(!stderr.contains("Error"));
}

#[test]
fn display_prints_each_row() {
    let (dir, db) = setup_db();
    let (code, stdout, _) = session(dir.path(), &db, "4\nguests\n5\n");
    assert_eq!(code, Some(0));
    assert!(stdout.contains("Please input the table name to display data : "));
    assert!(stdout.contains("(1, 'Ada')\n(2, 'Grace')\n"));
    assert_eq!(menu_count(&stdout), 2);
}

#[test]
fn import_export_and_delete_in_one_session() {
    let (dir, db) = setup_db();
    let source = dir.path().join("arrivals.csv");
    fs::write(&source, "name,id,room\nAlan,3,101\nEdsger,4,102\n").unwrap();
    let target = dir.path().join("guests_out.csv");

    let script = format!(
        "1\narrivals\n{}\nid,name\n2\nguests\n{}\n3\nguests\n5\n",
        source.display(),
        target.display()
    );
    let (code, stdout, stderr) = session(dir.path(), &db, &script);
    assert_eq!(code, Some(0), "stderr: {stderr}");

    assert!(stdout.contains("Importing from CSV to arrivals..."));
    assert!(stdout.contains("Imported 2 records"));
    assert!(stdout.contains("Exporting guests to CSV..."));
    assert!(stdout.contains("Exported 2 records to"));
    assert!(stdout.contains("Deleted data from guests"));

    assert_eq!(
        fs::read_to_string(&target).unwrap(),
        "id,name\n1,Ada\n2,Grace\n"
    );
    let conn = Connection::open(&db).unwrap();
    let arrivals: Vec<(i64, String)> = conn
        .prepare("SELECT id, name FROM arrivals ORDER BY id")
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(arrivals, [(3, "Alan".to_string()), (4, "Edsger".to_string())]);
    let guests: i64 = conn
        .query_row("SELECT count(*) FROM guests", [], |row| row.get(0))
        .unwrap();
    assert_eq!(guests, 0);
}

#[test]
fn blank_column_answer_imports_the_whole_header() {
    let (dir, db) = setup_db();
    let source = dir.path().join("arrivals.csv");
    fs::write(&source, "id,name\n5,Barbara\n").unwrap();

    let script = format!("1\narrivals\n{}\n\n5\n", source.display());
    let (code, stdout, _) = session(dir.path(), &db, &script);
    assert_eq!(code, Some(0));
    assert!(stdout.contains("Imported 1 records"));
}

#[test]
fn operation_errors_are_reported_and_the_loop_continues() {
    let (dir, db) = setup_db();
    let source = dir.path().join("arrivals.csv");
    fs::write(&source, "id,name\n1,Ada\n").unwrap();

    let script = format!(
        "4\nghosts\n1\narrivals\n{}\nid,phone\n4\nguests\n5\n",
        source.display()
    );
    let (code, stdout, stderr) = session(dir.path(), &db, &script);
    assert_eq!(code, Some(0));
    assert!(stderr.contains("Error: no such table: ghosts"));
    assert!(stderr.contains("Error: column 'phone' not found in CSV header"));
    assert!(stdout.contains("(1, 'Ada')"));
    assert_eq!(menu_count(&stdout), 4);

    let imported: i64 = Connection::open(&db)
        .unwrap()
        .query_row("SELECT count(*) FROM arrivals", [], |row| row.get(0))
        .unwrap();
    assert_eq!(imported, 0);
}

#[test]
fn connection_failure_ends_the_process() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.db");
    let (code, stdout, stderr) = session(dir.path(), &missing, "4\nguests\n4\nguests\n5\n");
    assert_eq!(code, Some(1));
    assert!(stderr.contains("error: could not connect to database"));
    assert_eq!(menu_count(&stdout), 1);
}
