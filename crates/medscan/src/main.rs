use std::process::ExitCode;

use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use medscan::cli;
use medscan::output::{self, ReportEntry};
use medscan::scanner::Scanner;
use medscan::settings;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let (args, cli_sources) = cli::parse_cli();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("medscan=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = match settings::resolve_settings(&args, &cli_sources) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let scanner = match Scanner::from_settings(&settings) {
        Ok(scanner) => scanner,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let progress = (args.inputs.len() > 1).then(|| {
        let bar = ProgressBar::new(args.inputs.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}").unwrap(),
        );
        bar
    });

    let mut entries = Vec::with_capacity(args.inputs.len());
    let mut failed = 0usize;
    for input in &args.inputs {
        if let Some(bar) = &progress {
            bar.set_message(input.display().to_string());
        }
        match scanner.scan(input).await {
            Ok(report) => entries.push(ReportEntry {
                input: input.clone(),
                report,
            }),
            Err(err) => {
                failed += 1;
                eprintln!("scan of {} failed: {err}", input.display());
            }
        }
        if let Some(bar) = &progress {
            bar.inc(1);
        }
    }
    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    if !entries.is_empty() {
        if let Err(err) = output::write_reports(&entries, settings.output.as_deref(), settings.pretty).await
        {
            eprintln!("failed to write reports: {err}");
            return ExitCode::FAILURE;
        }
    }

    if failed > 0 {
        eprintln!("{failed} of {} scans failed", args.inputs.len());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
