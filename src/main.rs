use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kira_dwiqc::cli::{Cli, Commands, ProtocolCommand, RunArgs, ValidateArgs};
use kira_dwiqc::gradients;
use kira_dwiqc::io::QcResultSink;
use kira_dwiqc::io::json_writer::{JsonReportSink, build_report};
use kira_dwiqc::io::recorded::RecordedSession;
use kira_dwiqc::io::summary::format_summary;
use kira_dwiqc::protocol::Protocol;
use kira_dwiqc::qc::{run_left, run_qc};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => handle_run(args)?,
        Commands::Validate(args) => handle_validate(args)?,
        Commands::Protocol(args) => match args.command {
            ProtocolCommand::Show => {
                let json = serde_json::to_string_pretty(&Protocol::default())?;
                println!("{}", json);
            }
        },
    }

    Ok(())
}

fn handle_run(args: RunArgs) -> Result<()> {
    let protocol = match &args.protocol {
        Some(path) => Protocol::load(path)?,
        None => Protocol::default(),
    };
    let session = RecordedSession::load(&args.input)?;
    let volume = session.volume()?;
    let checkers = session.checkers();

    let run = run_qc(&volume, &protocol, checkers);
    let left = if protocol.qc_left && !args.no_left {
        run_left(&volume, &run, &protocol, checkers)
    } else {
        None
    };

    let report = build_report(&args.input.display().to_string(), &run, left.as_ref());
    if args.json {
        std::fs::create_dir_all(&args.out)
            .with_context(|| format!("failed to create {}", args.out.display()))?;
        let mut sink = JsonReportSink::new(args.out.join("dwiqc.json"));
        sink.record(&report)?;
    }
    print!("{}", format_summary(&report));

    if let Some(err) = run.error {
        anyhow::bail!("QC run incomplete: {}", err);
    }
    Ok(())
}

fn handle_validate(args: ValidateArgs) -> Result<()> {
    let session = RecordedSession::load(&args.input)?;
    let volume = session.volume()?;
    let (set, b_value) = gradients::load(&volume)?;
    let counts = set.counts();
    println!("kira-dwiqc validate ok");
    println!("volumes: {}", set.len());
    println!("b-value: {}", b_value);
    println!("baselines: {}", counts.baseline_number);
    println!("b-values: {}", counts.b_value_number);
    println!("directions: {}", counts.gradient_dir_number);
    println!("gradients: {}", counts.gradient_number);
    Ok(())
}
