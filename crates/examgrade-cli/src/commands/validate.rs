//! The `examgrade validate` command.

use std::path::PathBuf;

use anyhow::Result;

use examgrade_core::model::TOTAL_POINTS;
use examgrade_core::parser;

pub fn execute(evaluation_path: PathBuf) -> Result<()> {
    let evaluations = if evaluation_path.is_dir() {
        parser::load_evaluation_directory(&evaluation_path)?
    } else {
        vec![parser::parse_evaluation(&evaluation_path)?]
    };

    let mut total_errors = 0;
    let mut total_warnings = 0;

    for evaluation in &evaluations {
        println!(
            "Evaluation: {} [{}] ({}, {} min, {} questions, {}/{} points)",
            evaluation.title,
            evaluation.id,
            evaluation.skill,
            evaluation.duration_minutes,
            evaluation.questions.len(),
            evaluation.total_points(),
            TOTAL_POINTS,
        );
        if !evaluation.description.is_empty() {
            println!("  {}", evaluation.description);
        }

        let issues = parser::validate_evaluation(evaluation);
        for issue in &issues {
            let prefix = issue
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} {}: {}", issue.severity, issue.message);
        }

        let errors = issues.iter().filter(|i| i.is_error()).count();
        total_errors += errors;
        total_warnings += issues.len() - errors;
    }

    if total_errors > 0 {
        anyhow::bail!("{total_errors} error(s), {total_warnings} warning(s) found");
    }

    if total_warnings == 0 {
        println!("All evaluations valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
