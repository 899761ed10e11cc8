use crate::commands::{run_check, run_clean};
use clap::{Args, Parser, Subcommand};
use roll_check::config::AppConfig;
use roll_check::error::AppError;
use roll_check::telemetry;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "roll-check",
    about = "Clean address lists and check them against the AEC enrolment lookup",
    version
)]
struct Cli {
    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize state and street columns so they match the lookup form
    Clean(CleanArgs),
    /// Look up each record on the enrolment form, appending results to the output
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub(crate) struct CleanArgs {
    /// Address CSV to read (stdin when omitted or "-")
    pub(crate) infile: Option<PathBuf>,
    /// Where to write the cleaned CSV (stdout when omitted or "-")
    pub(crate) outfile: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Records to check
    #[arg(long, default_value = "input.csv")]
    pub(crate) infile: PathBuf,
    /// Results file; appended to, header written only when new
    #[arg(long, default_value = "output.csv")]
    pub(crate) outfile: PathBuf,
    /// Skip entries you've already seen
    #[arg(long, default_value_t = 0)]
    pub(crate) skip: usize,
    /// Require the input header to name every field
    #[arg(long)]
    pub(crate) strict: bool,
    /// Run the browser without a window
    #[arg(long)]
    pub(crate) headless: bool,
    /// Give up on a CAPTCHA after this many seconds
    #[arg(long, value_name = "SECS")]
    pub(crate) captcha_timeout: Option<u64>,
    /// Link template for the reference column, with {id} for the record id
    #[arg(long, value_name = "URL")]
    pub(crate) reference_template: Option<String>,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, cli.verbose)?;

    match cli.command {
        Command::Clean(args) => run_clean(args),
        Command::Check(args) => run_check(args, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_defaults_match_the_usual_file_names() {
        let cli = Cli::try_parse_from(["roll-check", "check"]).expect("parses");
        let Command::Check(args) = cli.command else {
            panic!("expected check command");
        };
        assert_eq!(args.infile, PathBuf::from("input.csv"));
        assert_eq!(args.outfile, PathBuf::from("output.csv"));
        assert_eq!(args.skip, 0);
        assert!(!args.strict);
        assert!(args.captcha_timeout.is_none());
    }

    #[test]
    fn clean_accepts_positional_files() {
        let cli = Cli::try_parse_from(["roll-check", "-v", "clean", "in.csv", "out.csv"])
            .expect("parses");
        assert!(cli.verbose);
        let Command::Clean(args) = cli.command else {
            panic!("expected clean command");
        };
        assert_eq!(args.infile, Some(PathBuf::from("in.csv")));
        assert_eq!(args.outfile, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn check_flags_parse() {
        let cli = Cli::try_parse_from([
            "roll-check",
            "check",
            "--skip",
            "12",
            "--strict",
            "--captcha-timeout",
            "120",
        ])
        .expect("parses");
        let Command::Check(args) = cli.command else {
            panic!("expected check command");
        };
        assert_eq!(args.skip, 12);
        assert!(args.strict);
        assert_eq!(args.captcha_timeout, Some(120));
    }
}
