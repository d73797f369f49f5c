//! The `examgrade init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("examgrade.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("evaluations")?;
    write_if_missing(Path::new("evaluations/sample.toml"), SAMPLE_EVALUATION)?;

    std::fs::create_dir_all("answers")?;
    write_if_missing(Path::new("answers/sample.toml"), SAMPLE_ANSWERS)?;

    println!("\nNext steps:");
    println!("  1. Run: examgrade validate --evaluation evaluations/sample.toml");
    println!(
        "  2. Run: examgrade grade --evaluation evaluations/sample.toml --answers answers/sample.toml"
    );
    println!("  3. Run: examgrade show --evaluation sample --student 1");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examgrade configuration

# How fill-in-blank and reading answers are compared: "exact" or "contains"
text_match = "exact"

results_dir = "./examgrade-results"
parallelism = 4
"#;

const SAMPLE_EVALUATION: &str = r#"[evaluation]
id = "sample"
title = "Sample evaluation"
description = "One question of every kind"
skill = "grammar"
duration_minutes = 15

[[questions]]
id = 1
kind = "multiple_choice"
points = 4
prompt = "She ___ a teacher."
options = [
    { id = 1, text = "am" },
    { id = 2, text = "is", correct = true },
    { id = 3, text = "are" },
]

[[questions]]
id = 2
kind = "true_false"
points = 4
prompt = "\"Went\" is the past tense of \"go\"."
options = [
    { id = 1, text = "true", correct = true },
    { id = 2, text = "false" },
]

[[questions]]
id = 3
kind = "fill_in_blank"
points = 4
prompt = "I have ___ brothers. (2)"
correct_text = "two"

[[questions]]
id = 4
kind = "reading_comprehension"
points = 4
prompt = "Tom lives in a small house near the river. Where does Tom live?"
correct_text = "near the river"

[[questions]]
id = 5
kind = "speech_recognition"
points = 4
prompt = "Say: I have twelve apples."
correct_text = "I have twelve apples"
"#;

const SAMPLE_ANSWERS: &str = r#"[attempt]
student_id = 1
evaluation_id = "sample"

[answers]
1 = 2
2 = 1
3 = "Two"
4 = "in a small house"
5 = "i have 12 apples"
"#;
