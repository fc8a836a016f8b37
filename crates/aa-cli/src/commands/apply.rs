//! Apply command implementation

use crate::cli::{ApplyArgs, GlobalArgs};
use crate::commands::common::{self, ConsoleReporter, ExitCode};
use aa_apply::{AlterApplier, ApplyOptions, ReportLevel, Reporter, TargetSet};
use aa_core::RunMode;
use aa_db::EngineConnector;
use anyhow::Result;
use std::time::Instant;

/// Execute the apply command
pub(crate) async fn execute(args: &ApplyArgs, global: &GlobalArgs) -> Result<()> {
    let username = common::resolve_username(args.user.as_deref())?;
    let (mut config, alters) = common::load_inputs(&args.config, &args.alters)?;
    config.ignore_failures |= args.ignore_failures;

    let run_mode = RunMode::from(args.run_mode);
    let fail_fast = !config.ignore_failures;
    let reporter = ConsoleReporter::new(global.verbose);
    let mut targets = TargetSet::new(config);
    let start = Instant::now();

    let result = AlterApplier::new(
        &mut targets,
        &EngineConnector,
        &reporter,
        ApplyOptions::new(run_mode, username),
    )
    .apply(&alters)
    .await;

    match result {
        Ok(()) => {
            reporter.report(
                ReportLevel::Main,
                &format!(
                    "Applied {} alterscripts in {:.2}s",
                    alters.len(),
                    start.elapsed().as_secs_f64()
                ),
            );
            Ok(())
        }
        Err(err) => {
            log::debug!("apply failed after {:?}", start.elapsed());
            common::print_apply_error(&err, args.stacktrace && fail_fast);
            Err(ExitCode(1).into())
        }
    }
}
