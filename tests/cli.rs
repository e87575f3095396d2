use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn tally(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tally").unwrap();
    cmd.current_dir(dir)
        .env("TALLY_DATA_DIR", dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn expense_add_and_list() {
    let temp_dir = tempfile::tempdir().unwrap();

    tally(temp_dir.path())
        .args(["expense", "add", "food", "20", "--note", "lunch", "--day", "Monday"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 20.00 DH to food"));

    tally(temp_dir.path())
        .args(["expense", "add", "transport", "10", "--note", ",taxi", "--day", "Monday"])
        .assert()
        .success();

    let raw = fs::read_to_string(temp_dir.path().join("expenses.txt")).unwrap();
    assert_eq!(
        raw,
        "food,20.00,lunch,Monday\ntransport,10.00,;taxi,Monday\n"
    );

    tally(temp_dir.path())
        .args(["expense", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("30.00 DH"))
        .stdout(predicate::str::contains(";taxi"));

    tally(temp_dir.path())
        .args(["expense", "summary", "--category", "food"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Count: 1"))
        .stdout(predicate::str::contains("Categories: food, transport"));
}

#[test]
fn invalid_amount_fails_without_writing() {
    let temp_dir = tempfile::tempdir().unwrap();

    tally(temp_dir.path())
        .args(["expense", "add", "food", "-5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Invalid input"));

    assert!(!temp_dir.path().join("expenses.txt").exists());
}

#[test]
fn strict_flag_rejects_malformed_lines() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join("students.txt"),
        "1,Ann,18,8.0\nnot a student\n",
    )
    .unwrap();

    tally(temp_dir.path())
        .args(["student", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ann"))
        .stdout(predicate::str::contains("Skipped 1 malformed line(s)"));

    tally(temp_dir.path())
        .args(["student", "list", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn student_roster_flow() {
    let temp_dir = tempfile::tempdir().unwrap();
    for (name, age, grade) in [("Ann", "18", "8"), ("Bob", "18", "12"), ("Cid", "20", "5")] {
        tally(temp_dir.path())
            .args(["student", "add", name, age, grade])
            .assert()
            .success();
    }

    tally(temp_dir.path())
        .args(["student", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Average: 8.33"))
        .stdout(predicate::str::contains("Best: Bob (12.00)"))
        .stdout(predicate::str::contains("By age: 18: 2, 20: 1"));

    tally(temp_dir.path())
        .args(["student", "remove", "1"])
        .assert()
        .success();

    tally(temp_dir.path())
        .args(["student", "add", "Dee", "19", "15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#4"));

    tally(temp_dir.path())
        .args(["student", "export", "report.csv"])
        .assert()
        .success();
    let report = fs::read_to_string(temp_dir.path().join("report.csv")).unwrap();
    assert!(report.starts_with("id,name,age,grade\n2,Bob,18,12.0\n"));
}

#[test]
fn task_flow() {
    let temp_dir = tempfile::tempdir().unwrap();

    tally(temp_dir.path())
        .args(["task", "add", "Read", "--category", "study"])
        .assert()
        .success();

    tally(temp_dir.path())
        .args(["task", "add", "READ"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    tally(temp_dir.path())
        .args(["task", "done", "read"])
        .assert()
        .success();

    tally(temp_dir.path())
        .args(["task", "list", "--status", "done"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[x] Read"))
        .stdout(predicate::str::contains("1/1 done (100.0%)"));

    tally(temp_dir.path())
        .args(["task", "remove", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));

    let tasks = fs::read_to_string(temp_dir.path().join("tasks.json")).unwrap();
    assert!(tasks.contains("\"done\": true"));
    assert!(temp_dir.path().join("backups").exists());
}

#[test]
fn task_import_and_categories() {
    let temp_dir = tempfile::tempdir().unwrap();
    let import_file = temp_dir.path().join("old.txt");
    fs::write(&import_file, "Walk,health,False\nCode,work,True\n").unwrap();

    tally(temp_dir.path())
        .args(["task", "import"])
        .arg(&import_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 task(s)"));

    tally(temp_dir.path())
        .args(["task", "categories"])
        .assert()
        .success()
        .stdout(predicate::str::contains("health"))
        .stdout(predicate::str::contains("personal"));
}

#[test]
fn quiz_submit_and_history() {
    let temp_dir = tempfile::tempdir().unwrap();

    tally(temp_dir.path())
        .args(["quiz", "questions", "-n", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("What keyword starts a loop"));

    tally(temp_dir.path())
        .args(["quiz", "submit", "1=8", "2=String", "3=while", "4="])
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 2/4 = 50% (Fail)"))
        .stdout(predicate::str::contains("(no answer)"));

    tally(temp_dir.path())
        .args(["quiz", "history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2/4"));

    let results = fs::read_to_string(temp_dir.path().join("results.txt")).unwrap();
    assert_eq!(results.lines().count(), 1);
}

#[test]
fn text_report_is_written() {
    let temp_dir = tempfile::tempdir().unwrap();

    tally(temp_dir.path())
        .args(["text", "Le chat mange le chat", "--report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("chat: 2"))
        .stdout(predicate::str::contains("Longest word: mange"));

    let report = fs::read_to_string(temp_dir.path().join("report.txt")).unwrap();
    assert!(report.starts_with("Total words: 5\nUnique words: 3\n"));
}

#[test]
fn config_set_and_show() {
    let temp_dir = tempfile::tempdir().unwrap();

    tally(temp_dir.path())
        .args(["config", "currency", "EUR"])
        .assert()
        .success()
        .stdout(predicate::str::contains("currency = EUR"));

    tally(temp_dir.path())
        .args(["config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("currency = EUR"))
        .stdout(predicate::str::contains("top-n = 10"));

    tally(temp_dir.path())
        .args(["config", "colour"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown config key"));

    tally(temp_dir.path())
        .args(["expense", "add", "food", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3.00 EUR"));
}

#[test]
fn export_bundles_data_files() {
    let temp_dir = tempfile::tempdir().unwrap();

    tally(temp_dir.path())
        .args(["export"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to export"));

    tally(temp_dir.path())
        .args(["task", "add", "Read"])
        .assert()
        .success();

    tally(temp_dir.path())
        .args(["export", "bundle.tar.gz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bundle.tar.gz"));
    assert!(temp_dir.path().join("bundle.tar.gz").exists());
}

#[test]
fn paths_lists_every_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    tally(temp_dir.path())
        .args(["paths"])
        .assert()
        .success()
        .stdout(predicate::str::contains("expenses.txt"))
        .stdout(predicate::str::contains("tasks.json").and(predicate::str::contains("report.txt")));
}

#[test]
fn filtered_expense_list_numbers_match_remove() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join("expenses.txt"),
        "food,20.00,lunch,Monday\ntransport,10.00,taxi,Monday\nfood,5.50,snack,Tuesday\n",
    )
    .unwrap();

    tally(temp_dir.path())
        .args(["expense", "list", "--category", "food"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3. food"));

    tally(temp_dir.path())
        .args(["expense", "remove", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 5.50 DH from food"));

    let raw = fs::read_to_string(temp_dir.path().join("expenses.txt")).unwrap();
    assert_eq!(
        raw,
        "food,20.00,lunch,Monday\ntransport,10.00,taxi,Monday\n"
    );
}

#[test]
fn sorted_student_list_numbers_match_remove() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join("students.txt"),
        "1,Ann,18,8.0\n2,Bob,18,12.0\n",
    )
    .unwrap();

    tally(temp_dir.path())
        .args(["student", "list", "--sort", "grade"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2. #2"));

    tally(temp_dir.path())
        .args(["student", "remove", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed student #2: Bob"));
}

#[test]
fn multiline_student_name_is_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();

    tally(temp_dir.path())
        .args(["student", "add", "Ann\nMarie", "18", "12"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line breaks"));

    assert!(!temp_dir.path().join("students.txt").exists());
}
