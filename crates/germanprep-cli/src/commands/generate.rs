//! The `germanprep generate` command.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use comfy_table::{Cell, Table};
use serde::Serialize;

use germanprep_core::model::{GenerateParams, Level, Skill, WritingQuestion};
use germanprep_client::load_config_from;

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    skill: String,
    level: String,
    topic: String,
    item_id_start: Option<u32>,
    prefer_type: Option<String>,
    task_type: Option<String>,
    interaction_type: Option<String>,
    no_cache: bool,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let skill: Skill = skill.parse().map_err(|e: String| anyhow!(e))?;
    let level: Level = level.parse().map_err(|e: String| anyhow!(e))?;

    let mut params = GenerateParams::new(topic, level);
    params.item_id_start = item_id_start;
    params.prefer_type = prefer_type;
    params.task_type = task_type;
    params.interaction_type = interaction_type;

    let client = super::build_client(&config)?;
    let use_cache = !no_cache && config.cache.enabled;

    match skill {
        Skill::Listening => {
            let questions = client.generate_listening(&params, use_cache).await?;
            render(&questions, &format, |q| {
                vec![
                    q.id.to_string(),
                    format!("{:?}", q.question_type),
                    q.question.clone(),
                ]
            })
        }
        Skill::Reading => {
            let questions = client.generate_reading(&params, use_cache).await?;
            render(&questions, &format, |q| {
                vec![
                    q.id.to_string(),
                    format!("{:?}", q.question_type),
                    q.question.clone(),
                ]
            })
        }
        Skill::Writing => {
            let questions = client.generate_writing(&params, use_cache).await?;
            render(&questions, &format, |q| {
                let kind = match q {
                    WritingQuestion::Formular { .. } => "Formular",
                    WritingQuestion::Brief { .. } => "Brief",
                    WritingQuestion::Kommentar { .. } => "Kommentar",
                };
                vec![q.id().to_string(), kind.to_string(), q.prompt().to_string()]
            })
        }
        Skill::Speaking => {
            let questions = client.generate_speaking(&params, use_cache).await?;
            render(&questions, &format, |q| {
                vec![
                    q.id.to_string(),
                    format!("{:?}", q.question_type),
                    q.prompt.clone(),
                ]
            })
        }
    }
}

fn render<T: Serialize>(
    questions: &[T],
    format: &str,
    row: impl Fn(&T) -> Vec<String>,
) -> Result<()> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(questions)?);
        }
        "table" => {
            let mut table = Table::new();
            table.set_header(vec!["ID", "Type", "Prompt"]);
            for question in questions {
                table.add_row(row(question).into_iter().map(Cell::new));
            }
            println!("{table}");
            println!("{} question(s)", questions.len());
        }
        other => return Err(anyhow!("unknown format: {other} (expected table or json)")),
    }
    Ok(())
}
