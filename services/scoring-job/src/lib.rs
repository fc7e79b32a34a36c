mod cli;
mod infra;
mod job;

use reform_readiness::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
