//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn examgrade(home: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("examgrade").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env_remove("EXAMGRADE_TEXT_MATCH");
    cmd
}

fn repo_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join(relative)
}

fn grade_unit_3(dir: &TempDir) -> assert_cmd::assert::Assert {
    examgrade(dir.path())
        .arg("grade")
        .arg("--evaluation")
        .arg(repo_path("evaluations/unit-3.toml"))
        .arg("--answers")
        .arg(repo_path("answers/unit-3"))
        .arg("--results")
        .arg(dir.path().join("results"))
        .assert()
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    examgrade(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exam auto-grading engine"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();
    examgrade(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("examgrade"));
}

#[test]
fn speech_numeral_matches_spelled_number() {
    let dir = TempDir::new().unwrap();
    examgrade(dir.path())
        .args(["speech", "--spoken", "3", "--target", "three"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Spoken:    \"three\""))
        .stdout(predicate::str::contains("Distance:  0 (tolerance 2)"))
        .stdout(predicate::str::contains("Result:    MATCH"));
}

#[test]
fn speech_mismatch_still_exits_zero() {
    let dir = TempDir::new().unwrap();
    examgrade(dir.path())
        .args(["speech", "--spoken", "seven", "--target", "three"])
        .assert()
        .success()
        .stdout(predicate::str::contains("NO MATCH"));
}

#[test]
fn validate_valid_evaluation() {
    let dir = TempDir::new().unwrap();
    examgrade(dir.path())
        .arg("validate")
        .arg("--evaluation")
        .arg(repo_path("evaluations/unit-3.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "(pronunciation, 20 min, 4 questions, 20/20 points)",
        ))
        .stdout(predicate::str::contains("Numbers, animals and the past simple"))
        .stdout(predicate::str::contains("All evaluations valid"));
}

#[test]
fn validate_directory() {
    let dir = TempDir::new().unwrap();
    examgrade(dir.path())
        .arg("validate")
        .arg("--evaluation")
        .arg(repo_path("evaluations"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Unit 3 review"))
        .stdout(predicate::str::contains("Unit 4 reading"));
}

#[test]
fn validate_reports_budget_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("short.toml");
    std::fs::write(
        &path,
        r#"
[evaluation]
id = "short"
title = "Short"

[[questions]]
id = 1
kind = "fill_in_blank"
points = 15
prompt = "I ___ happy."
correct_text = "am"
"#,
    )
    .unwrap();

    examgrade(dir.path())
        .arg("validate")
        .arg("--evaluation")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("ERROR: question points sum to 15"))
        .stderr(predicate::str::contains("1 error(s)"));
}

#[test]
fn validate_nonexistent_file() {
    let dir = TempDir::new().unwrap();
    examgrade(dir.path())
        .arg("validate")
        .arg("--evaluation")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn grade_directory_of_answer_sheets() {
    let dir = TempDir::new().unwrap();

    grade_unit_3(&dir)
        .success()
        .stdout(predicate::str::contains("15/20"))
        .stdout(predicate::str::contains("75.0%"))
        .stdout(predicate::str::contains("7.50"))
        .stdout(predicate::str::contains("3 graded, 2 passed, 0 not graded"));

    let results = dir.path().join("results");
    assert!(results.join("unit-3/7.json").exists());
    assert!(results.join("unit-3/13.json").exists());
    assert!(results.join("unit-3/42.json").exists());
    assert!(results.join("batches").is_dir());
}

#[test]
fn regrading_is_rejected() {
    let dir = TempDir::new().unwrap();

    grade_unit_3(&dir).success();
    grade_unit_3(&dir)
        .success()
        .stdout(predicate::str::contains(
            "student 42 already has a result for evaluation unit-3",
        ))
        .stdout(predicate::str::contains("0 graded, 0 passed, 3 not graded"));
}

#[test]
fn grade_json_output() {
    let dir = TempDir::new().unwrap();
    examgrade(dir.path())
        .arg("grade")
        .arg("--evaluation")
        .arg(repo_path("evaluations/unit-3.toml"))
        .arg("--answers")
        .arg(repo_path("answers/unit-3/student-42.toml"))
        .arg("--results")
        .arg(dir.path().join("results"))
        .args(["--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"points_obtained\": 15"))
        .stdout(predicate::str::contains("\"grade\": 7.5"))
        .stdout(predicate::str::contains("\"failures\": []"));
}

#[test]
fn grade_rejects_unknown_policy() {
    let dir = TempDir::new().unwrap();
    examgrade(dir.path())
        .arg("grade")
        .arg("--evaluation")
        .arg(repo_path("evaluations/unit-3.toml"))
        .arg("--answers")
        .arg(repo_path("answers/unit-3"))
        .args(["--text-match", "fuzzy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown text match policy"));
}

#[test]
fn contains_policy_accepts_longer_answers() {
    let dir = TempDir::new().unwrap();
    let answers = dir.path().join("anna.toml");
    std::fs::write(
        &answers,
        r#"
[attempt]
student_id = "anna"
evaluation_id = "unit-4"

[answers]
1 = "She was at the beach"
2 = "Anna spent the summer at the beach with her 12 cousin"
"#,
    )
    .unwrap();

    let grade = |policy: &str, results: &str| {
        examgrade(dir.path())
            .arg("grade")
            .arg("--evaluation")
            .arg(repo_path("evaluations/unit-4.toml"))
            .arg("--answers")
            .arg(&answers)
            .arg("--results")
            .arg(dir.path().join(results))
            .args(["--text-match", policy])
            .assert()
    };

    grade("exact", "exact").success().stdout(predicate::str::contains("10/20"));
    grade("contains", "contains")
        .success()
        .stdout(predicate::str::contains("20/20"));
}

#[test]
fn show_stored_result() {
    let dir = TempDir::new().unwrap();
    grade_unit_3(&dir).success();

    examgrade(dir.path())
        .args(["show", "--evaluation", "unit-3", "--student", "42"])
        .arg("--results")
        .arg(dir.path().join("results"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Student 42 on \"Unit 3 review\" [unit-3] (pronunciation)",
        ))
        .stdout(predicate::str::contains("Score: 15/20 (75.0%), grade 7.50, PASSED"))
        .stdout(predicate::str::contains("1 question(s) earned no points"));

    examgrade(dir.path())
        .args(["show", "--evaluation", "unit-3"])
        .arg("--results")
        .arg(dir.path().join("results"))
        .assert()
        .success()
        .stdout(predicate::str::contains("13"))
        .stdout(predicate::str::contains("FAIL"));
}

#[test]
fn inactive_evaluation_is_not_graded() {
    let dir = TempDir::new().unwrap();
    let source = std::fs::read_to_string(repo_path("evaluations/unit-3.toml")).unwrap();
    let closed = dir.path().join("closed.toml");
    std::fs::write(
        &closed,
        source.replace("duration_minutes = 20", "duration_minutes = 20\nactive = false"),
    )
    .unwrap();

    examgrade(dir.path())
        .arg("validate")
        .arg("--evaluation")
        .arg(&closed)
        .assert()
        .success()
        .stdout(predicate::str::contains("WARNING: evaluation is not active"));

    examgrade(dir.path())
        .arg("grade")
        .arg("--evaluation")
        .arg(&closed)
        .arg("--answers")
        .arg(repo_path("answers/unit-3"))
        .arg("--results")
        .arg(dir.path().join("results"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("evaluation unit-3 is not active"));

    assert!(!dir.path().join("results/unit-3").exists());
}

#[test]
fn show_missing_result() {
    let dir = TempDir::new().unwrap();
    examgrade(dir.path())
        .args(["show", "--evaluation", "unit-3", "--student", "99"])
        .arg("--results")
        .arg(dir.path().join("results"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no result for student 99"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    examgrade(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created examgrade.toml"))
        .stdout(predicate::str::contains("Created evaluations/sample.toml"))
        .stdout(predicate::str::contains("Created answers/sample.toml"));

    assert!(dir.path().join("examgrade.toml").exists());
    assert!(dir.path().join("evaluations/sample.toml").exists());
    assert!(dir.path().join("answers/sample.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    examgrade(dir.path()).arg("init").assert().success();

    examgrade(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn init_sample_grades_end_to_end() {
    let dir = TempDir::new().unwrap();

    examgrade(dir.path()).arg("init").assert().success();

    examgrade(dir.path())
        .args(["validate", "--evaluation", "evaluations/sample.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All evaluations valid"));

    examgrade(dir.path())
        .args([
            "grade",
            "--evaluation",
            "evaluations/sample.toml",
            "--answers",
            "answers/sample.toml",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("16/20"));

    assert!(dir.path().join("examgrade-results/sample/1.json").exists());
}
