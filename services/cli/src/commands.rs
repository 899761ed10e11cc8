use crate::cli::{CheckArgs, CleanArgs};
use roll_check::config::AppConfig;
use roll_check::error::AppError;
use roll_check::workflows::address::{AddressCleaner, CleanSummary};
use roll_check::workflows::enrolment::{
    BatchSummary, CheckOutcome, ChromeForm, EnrolmentBatch, EnrolmentCheck, HeaderMode,
    RecordReader, ResultWriter,
};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub(crate) fn run_clean(args: CleanArgs) -> Result<(), AppError> {
    let input: Box<dyn Read> = match stdio_path(args.infile.as_deref()) {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let output: Box<dyn Write> = match stdio_path(args.outfile.as_deref()) {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };

    let summary = AddressCleaner::clean(input, output, io::stderr().lock())?;
    render_clean_summary(&summary);
    Ok(())
}

pub(crate) fn run_check(args: CheckArgs, mut config: AppConfig) -> Result<(), AppError> {
    let CheckArgs {
        infile,
        outfile,
        skip,
        strict,
        headless,
        captcha_timeout,
        reference_template,
    } = args;

    if headless {
        config.browser.headless = true;
    }
    if let Some(secs) = captcha_timeout {
        config.check.captcha_timeout = Some(Duration::from_secs(secs));
    }
    if reference_template.is_some() {
        config.check.reference_template = reference_template;
    }

    let mode = if strict {
        HeaderMode::Strict
    } else {
        HeaderMode::Lenient
    };
    let reader = RecordReader::from_path(&infile, mode)?;
    let mut sink = ResultWriter::append_to(
        &outfile,
        reader.headers(),
        config.check.reference_template.clone(),
    )?;

    info!(
        ?config.environment,
        infile = %infile.display(),
        outfile = %outfile.display(),
        skip,
        "starting enrolment checks"
    );

    let mut form = ChromeForm::launch(&config.browser)?;
    let batch = EnrolmentBatch::new(EnrolmentCheck::new(config.check), skip);
    let summary = batch.run(reader, &mut form, &mut sink)?;

    render_check_summary(&summary, &outfile);
    Ok(())
}

/// `-` and a missing argument both mean the standard stream.
fn stdio_path(path: Option<&Path>) -> Option<PathBuf> {
    path.filter(|path| path.as_os_str() != "-")
        .map(Path::to_path_buf)
}

fn render_clean_summary(summary: &CleanSummary) {
    eprintln!(
        "\nCleaned {} address(es), {} need manual review",
        summary.cleaned, summary.anomalies
    );
}

fn render_check_summary(summary: &BatchSummary, outfile: &Path) {
    println!("Enrolment check summary ({})", outfile.display());
    println!("- processed: {}", summary.processed);
    println!("- skipped (already done): {}", summary.skipped);
    println!("- skipped (incomplete rows): {}", summary.invalid);
    for outcome in CheckOutcome::ordered() {
        println!("- {}: {}", outcome.label(), summary.count(outcome));
    }
    if summary.halted {
        println!(
            "\nThe form session was lost before the batch finished. Re-run with --skip {} to resume.",
            summary.skipped + summary.invalid + summary.processed
        );
    }
}
