//! `acfgen doctor` command

use anyhow::Result;

use acfgen::ops;
use acfgen::util::config::load_config;
use acfgen::util::GlobalContext;

use crate::cli::DoctorArgs;

pub fn execute(args: DoctorArgs, verbose: bool) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let config = load_config(&ctx.config_path(), &ctx.project_config_path());

    let report = ops::doctor(&config, &ctx)?;

    print!("{}", ops::format_doctor_report(&report, args.verbose || verbose));

    if !report.all_required_passed() {
        std::process::exit(1);
    }

    Ok(())
}
