//! `acfgen fetch` command

use std::path::PathBuf;

use anyhow::Result;

use acfgen::acquire::TransferUpdate;
use acfgen::core::ToolReference;
use acfgen::ops;
use acfgen::util::config::load_config;
use acfgen::util::shell::{Shell, Status};
use acfgen::util::GlobalContext;

use crate::cli::FetchArgs;
use crate::commands::{confirm, prompt_line};

pub fn execute(args: FetchArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let config = load_config(&ctx.config_path(), &ctx.project_config_path());

    let tool_path = args
        .tool
        .clone()
        .unwrap_or_else(|| ctx.tool_path(config.tool.dir.as_deref(), &config.tool.file_name));

    if ToolReference::new(&tool_path).exists {
        shell.status(
            Status::Found,
            format!("generator already installed at {}", tool_path.display()),
        );
        return Ok(());
    }

    let download_approved = args.yes || confirm("Download the generator tool now?");

    shell.status(Status::Fetching, "generator tool");

    let mut bar = None;
    let mut progress = |update: TransferUpdate| {
        let bar =
            bar.get_or_insert_with(|| shell.bytes_progress("downloading generator", update.total));
        if let Some(total) = update.total {
            bar.set_total(total);
        }
        bar.set_position(update.downloaded);
    };

    let tool = ops::fetch(&config, &ctx, &tool_path, download_approved, &mut progress, || {
        prompt_line("Path to an existing generator binary").map(PathBuf::from)
    })?;

    drop(progress);
    if let Some(bar) = bar {
        bar.finish();
    }

    shell.status(Status::Installed, tool.path.display().to_string());
    Ok(())
}
