//! The `examgrade grade` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use examgrade_core::config::load_config_from;
use examgrade_core::engine::{AttemptEngine, BatchSummary, ProgressReporter};
use examgrade_core::grader::TextMatchPolicy;
use examgrade_core::model::AttemptContext;
use examgrade_core::parser;
use examgrade_core::record::AttemptRecord;
use examgrade_store::DirectoryStore;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_attempt_start(&self, context: &AttemptContext) {
        eprintln!("  Grading: student {}", context.student_id);
    }

    fn on_attempt_graded(&self, record: &AttemptRecord) {
        eprintln!(
            "  Done: student {} {}/{} ({})",
            record.context.student_id,
            record.score.points_obtained,
            record.score.total_possible,
            if record.score.passed { "PASS" } else { "FAIL" },
        );
    }

    fn on_attempt_error(&self, context: &AttemptContext, error: &str) {
        eprintln!("  ERROR: student {}: {error}", context.student_id);
    }

    fn on_batch_complete(&self, total: usize, graded: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {graded}/{total} graded, {failed} not graded ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    evaluation_path: PathBuf,
    answers_path: PathBuf,
    text_match: Option<String>,
    results: Option<PathBuf>,
    parallelism: Option<usize>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        format == "text" || format == "json",
        "unknown format '{format}', expected text or json"
    );

    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(policy) = text_match {
        config.text_match = policy
            .parse::<TextMatchPolicy>()
            .map_err(|e| anyhow::anyhow!("--text-match: {e}"))?;
    }
    if let Some(dir) = results {
        config.results_dir = dir;
    }
    if let Some(n) = parallelism {
        anyhow::ensure!(n >= 1, "parallelism must be at least 1");
        config.parallelism = n;
    }

    let evaluation = parser::parse_evaluation(&evaluation_path)?;
    let errors: Vec<String> = parser::validate_evaluation(&evaluation)
        .into_iter()
        .filter(|issue| issue.is_error())
        .map(|issue| issue.message)
        .collect();
    if !errors.is_empty() {
        anyhow::bail!(
            "evaluation {} cannot be graded: {}",
            evaluation.id,
            errors.join("; ")
        );
    }

    let submissions = if answers_path.is_dir() {
        parser::load_submission_directory(&answers_path)?
    } else {
        vec![parser::parse_submission(&answers_path)?]
    };
    tracing::debug!(
        "loaded {} answer sheet(s) from {}",
        submissions.len(),
        answers_path.display()
    );

    eprintln!(
        "examgrade v{}: grading {} answer sheet(s) for \"{}\" ({}, {} min, text match: {})",
        env!("CARGO_PKG_VERSION"),
        submissions.len(),
        evaluation.title,
        evaluation.skill,
        evaluation.duration_minutes,
        config.text_match,
    );
    if !evaluation.description.is_empty() {
        eprintln!("{}", evaluation.description);
    }
    eprintln!();

    let store = Arc::new(DirectoryStore::new(config.results_dir.clone()));
    let engine = AttemptEngine::new(store, config.engine_config());
    let summary = engine
        .submit_batch(&evaluation, submissions, &ConsoleReporter)
        .await?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        _ => print_summary(&summary),
    }

    let batches = config.results_dir.join("batches");
    std::fs::create_dir_all(&batches)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S%.3f");
    let path = batches.join(format!("{}-{timestamp}.json", evaluation.id));
    std::fs::write(&path, serde_json::to_string_pretty(&summary)?)?;
    eprintln!("Batch summary saved to: {}", path.display());

    Ok(())
}

fn print_summary(summary: &BatchSummary) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Student", "Points", "Percent", "Grade", "Result"]);

    for record in &summary.records {
        table.add_row(vec![
            Cell::new(&record.context.student_id),
            Cell::new(format!(
                "{}/{}",
                record.score.points_obtained, record.score.total_possible
            )),
            Cell::new(format!("{:.1}%", record.score.percentage)),
            Cell::new(format!("{:.2}", record.grade)),
            Cell::new(if record.score.passed { "PASS" } else { "FAIL" }),
        ]);
    }

    println!("{table}");

    for failure in &summary.failures {
        println!(
            "Not graded: student {}: {}",
            failure.context.student_id, failure.error
        );
    }

    println!(
        "\n{} graded, {} passed, {} not graded (mean {:.2} points)",
        summary.records.len(),
        summary.passed(),
        summary.failures.len(),
        summary.mean_points(),
    );
}
