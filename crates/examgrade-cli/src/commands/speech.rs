//! The `examgrade speech` command.

use anyhow::Result;

use examgrade_core::matcher::explain_speech_match;

pub fn execute(spoken: &str, target: &str) -> Result<()> {
    let m = explain_speech_match(spoken, target);

    println!("Spoken:    \"{}\"", m.spoken);
    println!("Target:    \"{}\"", m.target);
    println!("Distance:  {} (tolerance {})", m.distance, m.tolerance);
    println!("Result:    {}", if m.matched { "MATCH" } else { "NO MATCH" });

    Ok(())
}
