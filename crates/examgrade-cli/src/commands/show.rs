//! The `examgrade show` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use examgrade_core::config::load_config_from;
use examgrade_core::model::{AttemptContext, Identifier};
use examgrade_core::record::AttemptRecord;
use examgrade_core::traits::ResultStore;
use examgrade_store::DirectoryStore;

pub async fn execute(
    evaluation: String,
    student: Option<String>,
    results: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let results_dir = match results {
        Some(dir) => dir,
        None => load_config_from(config_path.as_deref())?.results_dir,
    };
    let store = DirectoryStore::new(results_dir);
    let evaluation_id = Identifier::from(evaluation);

    match student {
        Some(student) => {
            let context = AttemptContext {
                student_id: Identifier::from(student),
                evaluation_id,
            };
            match store.find(&context).await? {
                Some(record) => print_record(&record),
                None => anyhow::bail!(
                    "no result for student {} on evaluation {}",
                    context.student_id,
                    context.evaluation_id
                ),
            }
        }
        None => {
            let records = store.list(&evaluation_id).await?;
            if records.is_empty() {
                println!("No results for evaluation {evaluation_id}.");
            } else {
                print_listing(&records);
            }
        }
    }

    Ok(())
}

fn print_record(record: &AttemptRecord) {
    println!(
        "Student {} on \"{}\" [{}] ({})",
        record.context.student_id,
        record.evaluation_title,
        record.context.evaluation_id,
        record.skill
    );
    println!(
        "Graded {} (text match: {})",
        record.graded_at.format("%Y-%m-%d %H:%M:%S UTC"),
        record.text_match
    );
    println!(
        "Score: {}/{} ({:.1}%), grade {:.2}, {}",
        record.score.points_obtained,
        record.score.total_possible,
        record.score.percentage,
        record.grade,
        if record.score.passed { "PASSED" } else { "FAILED" }
    );

    let mut table = Table::new();
    table.set_header(vec!["Question", "Kind", "Answer", "Points"]);
    for outcome in &record.outcomes {
        let answer = match (&outcome.selected_option, &outcome.response_text) {
            (Some(option), _) => format!("option {option}"),
            (None, Some(text)) => format!("\"{text}\""),
            (None, None) => "-".to_string(),
        };
        table.add_row(vec![
            Cell::new(&outcome.question_id),
            Cell::new(outcome.kind),
            Cell::new(answer),
            Cell::new(format!(
                "{}/{}",
                outcome.points_awarded, outcome.points_possible
            )),
        ]);
    }
    println!("\n{table}");

    let missed = record.missed().count();
    if missed > 0 {
        println!("\n{missed} question(s) earned no points.");
    }
}

fn print_listing(records: &[AttemptRecord]) {
    if let Some(first) = records.first() {
        println!("\"{}\" ({})", first.evaluation_title, first.skill);
    }

    let mut table = Table::new();
    table.set_header(vec!["Student", "Points", "Grade", "Result", "Graded at"]);
    for record in records {
        table.add_row(vec![
            Cell::new(&record.context.student_id),
            Cell::new(format!(
                "{}/{}",
                record.score.points_obtained, record.score.total_possible
            )),
            Cell::new(format!("{:.2}", record.grade)),
            Cell::new(if record.score.passed { "PASS" } else { "FAIL" }),
            Cell::new(record.graded_at.format("%Y-%m-%d %H:%M:%S")),
        ]);
    }
    println!("{table}");
}
