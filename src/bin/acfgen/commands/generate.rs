//! `acfgen generate` command

use std::path::PathBuf;

use anyhow::Result;

use acfgen::acquire::TransferUpdate;
use acfgen::core::{AppIdSet, PipelineError, RunRequest, ToolReference};
use acfgen::ops::{self, ArtifactStatus};
use acfgen::util::config::load_config;
use acfgen::util::shell::{Shell, Status};
use acfgen::util::GlobalContext;

use crate::cli::GenerateArgs;
use crate::commands::{confirm, prompt_line};

pub fn execute(args: GenerateArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let config = load_config(&ctx.config_path(), &ctx.project_config_path());

    // IDs from the command line, re-prompting interactively while empty.
    let mut app_ids = AppIdSet::from_tokens(&args.app_ids);
    while app_ids.is_empty() {
        let Some(input) = prompt_line("Enter one or more App IDs (space or comma separated)")
        else {
            return Err(PipelineError::InvalidInput.into());
        };
        app_ids = AppIdSet::parse(&input);
        if app_ids.is_empty() {
            shell.warn("no valid App IDs in that input");
        }
    }

    let generator_path = args
        .tool
        .clone()
        .unwrap_or_else(|| ctx.tool_path(config.tool.dir.as_deref(), &config.tool.file_name));
    let working_directory = args.dir.clone().unwrap_or_else(|| ctx.cwd().to_path_buf());

    let request = RunRequest {
        generator_path,
        debug_enabled: args.debug,
        working_directory,
        app_ids,
    };

    // The approval prompt is the one cancellation point; it only appears
    // when the tool is actually missing.
    let download_approved = args.yes
        || ToolReference::new(&request.generator_path).exists
        || confirm("Generator tool missing. Download it now?");

    shell.status(
        Status::Running,
        format!("generator for App IDs: {}", request.app_ids),
    );

    let mut bar = None;
    let mut progress = |update: TransferUpdate| {
        let bar =
            bar.get_or_insert_with(|| shell.bytes_progress("downloading generator", update.total));
        if let Some(total) = update.total {
            bar.set_total(total);
        }
        bar.set_position(update.downloaded);
    };

    let outcome = ops::generate(&config, &ctx, &request, download_approved, &mut progress, || {
        prompt_line("Path to an existing generator binary").map(PathBuf::from)
    })?;

    drop(progress);
    if let Some(bar) = bar {
        bar.finish();
    }

    if outcome.execution.succeeded {
        shell.status(Status::Finished, "generator completed");
    } else {
        shell.warn(format!(
            "generator exited with {:?} (treated as a warning)",
            outcome.execution.exit_code
        ));
    }

    for (id, status) in outcome.report.entries() {
        match status {
            ArtifactStatus::Found(path) => {
                shell.status(Status::Found, format!("{} -> {}", id, path.display()));
            }
            ArtifactStatus::NotFound => shell.warn(format!("{}: no manifest located", id)),
        }
    }
    shell.note(format!(
        "{} of {} manifests located in {}",
        outcome.report.found_count(),
        outcome.report.entries().len(),
        request.working_directory.display()
    ));

    Ok(())
}
