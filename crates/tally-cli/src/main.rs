//! tally: registry-driven scoring for clinical questionnaire submissions.
//!
//! `run` streams canonical form submissions (JSONL) through the pipeline
//! and writes measurement events and diagnostics. `validate` checks a
//! single spec document against its schema.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use tally_core::models::FormSubmission;
use tally_engine::{Pipeline, PipelineConfig, ProcessOptions};
use tally_registry::schema::SpecSchema;
use tally_registry::spec::MeasureSpec;

#[derive(Debug, Parser)]
#[command(name = "tally", version, about = "Semantic processing engine for clinical measures")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Process form submissions and emit measurement events
    Run(RunArgs),
    /// Validate a spec file against its schema
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Input JSONL file of canonical form submissions
    #[arg(long = "in", value_name = "PATH")]
    input: PathBuf,

    /// Output JSONL file for measurement events
    #[arg(long = "out", value_name = "PATH")]
    output: PathBuf,

    /// Binding spec id (no auto-detection)
    #[arg(long)]
    binding: String,

    /// Binding spec version (default: latest)
    #[arg(long)]
    binding_version: Option<String>,

    /// Path to the measure registry
    #[arg(long, env = "TALLY_MEASURE_REGISTRY", default_value = "measure-registry")]
    measure_registry: PathBuf,

    /// Path to the form binding registry
    #[arg(long, env = "TALLY_BINDING_REGISTRY", default_value = "form-binding-registry")]
    form_binding_registry: PathBuf,

    /// Diagnostics output JSONL path
    #[arg(long, value_name = "PATH")]
    diagnostics: Option<PathBuf>,

    /// Fail records whose submissions carry fields with no binding
    #[arg(long)]
    strict: bool,

    /// Deterministic (v5) identifiers, for reproducible output
    #[arg(long)]
    deterministic_ids: bool,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Which schema to validate against
    #[arg(value_enum)]
    kind: SpecKind,

    /// Path to the spec file
    path: PathBuf,

    /// External schema file overriding the embedded one
    #[arg(long, short, value_name = "PATH")]
    schema: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SpecKind {
    Measure,
    Binding,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Run(args) => run(args),
        Command::Validate(args) => validate(args),
    };

    match outcome {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "startup failure");
            ExitCode::from(1)
        }
    }
}

fn run(args: RunArgs) -> eyre::Result<ExitCode> {
    let config = PipelineConfig {
        measure_registry: args.measure_registry,
        binding_registry: args.form_binding_registry,
        binding_id: args.binding,
        binding_version: args.binding_version,
        options: ProcessOptions {
            strict: args.strict,
            deterministic_ids: args.deterministic_ids,
        },
    };
    let pipeline = Pipeline::new(&config)?;

    let reader = BufReader::new(File::open(&args.input)?);
    let mut events_out = BufWriter::new(File::create(&args.output)?);
    let mut diagnostics_out = match &args.diagnostics {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };

    let mut records: u64 = 0;
    let mut failed: u64 = 0;
    let mut events_written: u64 = 0;
    let mut diagnostics_written: u64 = 0;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let submission: FormSubmission = match serde_json::from_str(&line) {
            Ok(submission) => submission,
            Err(err) => {
                tracing::warn!(line = line_no + 1, error = %err, "skipping invalid JSON");
                continue;
            }
        };
        records += 1;

        match pipeline.process(&submission) {
            Ok(result) => {
                for event in &result.events {
                    writeln!(events_out, "{}", serde_json::to_string(event)?)?;
                    events_written += 1;
                }
                if let Some(out) = diagnostics_out.as_mut() {
                    for diagnostics in &result.diagnostics {
                        writeln!(out, "{}", serde_json::to_string(diagnostics)?)?;
                        diagnostics_written += 1;
                    }
                }
                if !result.success {
                    failed += 1;
                }
            }
            Err(err) => {
                tracing::warn!(
                    submission_id = %submission.submission_id,
                    error = %err,
                    "record failed"
                );
                failed += 1;
            }
        }
    }

    events_out.flush()?;
    if let Some(out) = diagnostics_out.as_mut() {
        out.flush()?;
    }

    tracing::info!(
        records,
        failed,
        events_written,
        diagnostics_written,
        "run complete"
    );

    Ok(if failed > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    })
}

fn validate(args: ValidateArgs) -> eyre::Result<ExitCode> {
    let schema = match &args.schema {
        Some(path) => SpecSchema::from_file(path)?,
        None => match args.kind {
            SpecKind::Measure => SpecSchema::measure_spec(),
            SpecKind::Binding => SpecSchema::form_binding_spec(),
        },
    };

    let content = std::fs::read_to_string(&args.path)?;
    let doc: serde_json::Value = serde_json::from_str(&content)?;

    if let Err(violations) = schema.check(&doc) {
        for violation in violations {
            eprintln!("invalid: {violation}");
        }
        return Ok(ExitCode::from(1));
    }

    // Schema-valid measures still need their semantic invariants checked.
    if matches!(args.kind, SpecKind::Measure) {
        let spec: MeasureSpec = serde_json::from_value(doc)?;
        let problems = spec.validate();
        if !problems.is_empty() {
            for problem in problems {
                eprintln!("invalid: {problem}");
            }
            return Ok(ExitCode::from(1));
        }
    }

    println!("valid: {}", args.path.display());
    Ok(ExitCode::SUCCESS)
}
