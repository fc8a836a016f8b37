//! Validate command implementation

use crate::cli::{GlobalArgs, ValidateArgs};
use crate::commands::common::{self, ExitCode};
use aa_apply::TargetSet;
use anyhow::Result;

/// Execute the validate command
///
/// Loads the configuration and every alter and checks that each alter only
/// names known instance types. Nothing is connected to.
pub(crate) async fn execute(args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let (config, alters) = common::load_inputs(&args.config, &args.alters)?;
    let targets = TargetSet::new(config);

    if let Err(err) = targets.check_instance_types(&alters) {
        common::print_apply_error(&err, false);
        return Err(ExitCode(1).into());
    }

    for alter in &alters {
        let matching = targets
            .instances()
            .iter()
            .filter(|i| alter.applies_to(i.instance_type().as_str()))
            .count();
        if global.verbose {
            println!(
                "  {}: {} statement(s), {} check(s), {} instance(s)",
                alter.id,
                alter.statements.len(),
                alter.checks.len() + usize::from(alter.checkok.is_some()),
                matching
            );
        }
    }
    println!(
        "{} alterscripts valid for {} database instances",
        alters.len(),
        targets.len()
    );
    Ok(())
}
