mod cli;
mod commands;

use roll_check::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
