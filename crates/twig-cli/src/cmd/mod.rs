//! Subcommand handlers. Each module owns its clap arguments and a `run_*`
//! entry point that takes the opened store and the resolved output mode.

pub mod check;
pub mod completions;
pub mod project;
pub mod task;
pub mod tree;

use crate::output::{CliError, OutputMode, render_error};
use twig_core::TwigError;

/// Render a store error in the requested mode and hand it back as the
/// command's failure.
pub fn fail(output: OutputMode, err: TwigError) -> anyhow::Error {
    if let Err(render_err) = render_error(output, &CliError::from(&err)) {
        return render_err;
    }
    anyhow::Error::new(err)
}
