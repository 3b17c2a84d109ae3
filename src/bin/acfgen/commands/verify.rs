//! `acfgen verify` command

use anyhow::Result;

use acfgen::core::{AppIdSet, PipelineError};
use acfgen::ops;
use acfgen::util::shell::{Shell, Status};
use acfgen::util::GlobalContext;

use crate::cli::VerifyArgs;

pub fn execute(args: VerifyArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let app_ids = AppIdSet::from_tokens(&args.app_ids);
    if app_ids.is_empty() {
        return Err(PipelineError::InvalidInput.into());
    }

    let dir = args.dir.clone().unwrap_or_else(|| ctx.cwd().to_path_buf());
    shell.status(Status::Verifying, format!("manifests in {}", dir.display()));

    let report = ops::verify(&dir, &app_ids);
    println!("{}", ops::format_report(&report));

    Ok(())
}
