//! The `train` subcommand: convert, validate, hand off to the solver.

use crate::api::context::PluginContext;
use crate::common::error::{PluginError, PluginResult};
use crate::problem::service::convert;

use super::domain::{FittedModel, SvmParameter};

/// Build a problem from the host data and train the solver on it.
///
/// The problem is owned here from conversion until it is released at the
/// end; the solver only ever borrows it.
pub fn train(ctx: &PluginContext<'_>, args: &[String]) -> PluginResult<()> {
    let mut param = SvmParameter::from_args(args)?;
    let problem = convert(ctx.source)?;
    if problem.is_empty() {
        problem.release();
        return Err(PluginError::NoObservations);
    }
    param.resolve_gamma(&problem);

    if let Some(msg) = ctx.solver.check_parameter(&problem, &param) {
        problem.release();
        return Err(PluginError::ParameterValidation(msg));
    }

    log::info!(
        "training {:?}/{:?} on {} observations, {} features",
        param.svm_type,
        param.kernel_type,
        problem.count(),
        problem.max_index()
    );
    let model = ctx.solver.train(&problem, &param)?;

    if cfg!(feature = "debug-model") {
        export_model(ctx, model.as_ref());
    }

    // the solver's model may point into the problem's rows
    drop(model);
    problem.release();
    Ok(())
}

/// Persist the fitted model for inspection. Failure is reported but does not
/// fail the command.
pub(crate) fn export_model(ctx: &PluginContext<'_>, model: &dyn FittedModel) {
    if let Err(err) = model.save(&ctx.cfg.model_path) {
        log::warn!("export to {} failed: {err}", ctx.cfg.model_path.display());
        ctx.diagnostics
            .error("DEBUG ERROR: unable to export fitted model\n");
    }
}
