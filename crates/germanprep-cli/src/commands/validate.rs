//! The `germanprep validate-writing` and `validate-speaking` commands.

use std::path::PathBuf;

use anyhow::{Context, Result};

use germanprep_core::model::{SpeakingQuestion, ValidationReport, WritingQuestion};
use germanprep_client::load_config_from;

pub async fn execute_writing(
    task_path: PathBuf,
    response_path: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let task: WritingQuestion = serde_json::from_str(
        &std::fs::read_to_string(&task_path)
            .with_context(|| format!("failed to read task file {}", task_path.display()))?,
    )
    .with_context(|| format!("invalid writing task in {}", task_path.display()))?;
    let response = std::fs::read_to_string(&response_path)
        .with_context(|| format!("failed to read response file {}", response_path.display()))?;

    let client = super::build_client(&config)?;
    let report = client.validate_writing(&task, &response).await?;
    print_report(&report);
    Ok(())
}

pub async fn execute_speaking(
    task_path: PathBuf,
    audio_path: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let task: SpeakingQuestion = serde_json::from_str(
        &std::fs::read_to_string(&task_path)
            .with_context(|| format!("failed to read task file {}", task_path.display()))?,
    )
    .with_context(|| format!("invalid speaking task in {}", task_path.display()))?;
    let audio = std::fs::read(&audio_path)
        .with_context(|| format!("failed to read audio file {}", audio_path.display()))?;

    let client = super::build_client(&config)?;
    let report = client.validate_speaking(&task, &audio).await?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &ValidationReport) {
    if let Some(score) = report.score {
        println!("Score: {score:.1}");
    }
    if let Some(transcription) = &report.transcription {
        println!("Transcription: {transcription}");
    }
    if let Some(feedback) = &report.feedback {
        println!("Feedback: {feedback}");
    }
    if !report.errors.is_empty() {
        println!("Errors:");
        for error in &report.errors {
            println!("  - {error}");
        }
    }
    if !report.suggestions.is_empty() {
        println!("Suggestions:");
        for suggestion in &report.suggestions {
            println!("  - {suggestion}");
        }
    }
}
