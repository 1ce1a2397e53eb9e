//! Wellbeing CLI - Command-line interface for MindSync Wellbeing
//!
//! Commands:
//! - assess: Category-risk assessment of vitals records
//! - advise: Wellness score, status and tips for vitals records
//! - report: Both views plus playlist, with persisted state
//! - tip: Mark a tip done or not done in a state file
//! - validate: Check which fields of each record fall back to defaults
//! - doctor: Diagnose configuration and state files
//! - schema: Print input/output schema information

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use mindsync_wellbeing::pipeline::{advise, assess, WellbeingProcessor};
use mindsync_wellbeing::schema::{VitalField, VitalsRecord, VitalsRecordAdapter};
use mindsync_wellbeing::state::ProcessorState;
use mindsync_wellbeing::{ComputeError, WellnessStatus, PRODUCER_NAME, WELLBEING_VERSION};

/// Environment variable holding the log filter
const LOG_ENV: &str = "WELLBEING_LOG";

/// Wellbeing - heuristic wellbeing assessment from vital signs
#[derive(Parser)]
#[command(name = "wellbeing")]
#[command(version = WELLBEING_VERSION)]
#[command(about = "Turn vitals readings into wellbeing assessments and tips", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Category-risk assessment of each record
    Assess {
        #[command(flatten)]
        io: IoArgs,
    },

    /// Wellness score, status and prioritized tips for each record
    Advise {
        #[command(flatten)]
        io: IoArgs,
    },

    /// Both views plus playlist and escalation, threading processor state
    Report {
        #[command(flatten)]
        io: IoArgs,

        /// Load processor state from file
        #[arg(long)]
        load_state: Option<PathBuf>,

        /// Save processor state to file after processing
        #[arg(long)]
        save_state: Option<PathBuf>,
    },

    /// Mark a tip as done (or not done) in a state file
    Tip {
        /// State file (created if missing)
        #[arg(long)]
        state: PathBuf,

        /// Tip id, e.g. "sleep-tip-1"
        #[arg(long)]
        id: String,

        /// Mark the tip as not done
        #[arg(long)]
        undo: bool,
    },

    /// Check records and report fields that fall back to defaults
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "auto")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and state files
    Doctor {
        /// Check a processor state file
        #[arg(long)]
        state: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(clap::Args)]
struct IoArgs {
    /// Input file path (use - for stdin)
    #[arg(short, long, default_value = "-")]
    input: PathBuf,

    /// Output file path (use - for stdout)
    #[arg(short, long, default_value = "-")]
    output: PathBuf,

    /// Input format
    #[arg(long, default_value = "auto")]
    input_format: InputFormat,

    /// Output format
    #[arg(long, default_value = "ndjson")]
    output_format: OutputFormat,
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Single object, JSON array, or NDJSON
    Auto,
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one result per line)
    Ndjson,
    /// JSON array of results
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Vitals record accepted as input
    Input,
    /// Assessment and advisory output
    Output,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = std::env::var(LOG_ENV).unwrap_or_else(|_| "warn".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::debug!("log filter: {}", filter);
}

fn run(cli: Cli) -> Result<(), WellbeingCliError> {
    match cli.command {
        Commands::Assess { io } => cmd_assess(&io),
        Commands::Advise { io } => cmd_advise(&io),
        Commands::Report {
            io,
            load_state,
            save_state,
        } => cmd_report(&io, load_state.as_deref(), save_state.as_deref()),
        Commands::Tip { state, id, undo } => cmd_tip(&state, &id, !undo),
        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, &input_format, json),
        Commands::Doctor { state, json } => cmd_doctor(state.as_deref(), json),
        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_assess(io_args: &IoArgs) -> Result<(), WellbeingCliError> {
    let records = read_records(&io_args.input, &io_args.input_format)?;
    let results: Vec<_> = records.iter().map(assess).collect();
    write_output(&io_args.output, &format_output(&results, &io_args.output_format)?)
}

fn cmd_advise(io_args: &IoArgs) -> Result<(), WellbeingCliError> {
    let records = read_records(&io_args.input, &io_args.input_format)?;
    let results: Vec<_> = records.iter().map(advise).collect();
    write_output(&io_args.output, &format_output(&results, &io_args.output_format)?)
}

fn cmd_report(
    io_args: &IoArgs,
    load_state: Option<&Path>,
    save_state: Option<&Path>,
) -> Result<(), WellbeingCliError> {
    let records = read_records(&io_args.input, &io_args.input_format)?;

    let mut processor = WellbeingProcessor::new();
    if let Some(state_path) = load_state {
        let state_json = fs::read_to_string(state_path)?;
        processor.load_state(&state_json)?;
    }

    let reports: Vec<_> = records.iter().map(|r| processor.report(r)).collect();
    tracing::info!(
        instance = %processor.instance_id(),
        records = reports.len(),
        "processed vitals records"
    );

    if let Some(state_path) = save_state {
        fs::write(state_path, processor.save_state()?)?;
    }

    write_output(&io_args.output, &format_output(&reports, &io_args.output_format)?)
}

fn cmd_tip(state_path: &Path, tip_id: &str, completed: bool) -> Result<(), WellbeingCliError> {
    let mut processor = WellbeingProcessor::new();
    if state_path.exists() {
        let state_json = fs::read_to_string(state_path)?;
        processor.load_state(&state_json)?;
    }

    processor.set_tip_completed(tip_id, completed);
    fs::write(state_path, processor.save_state()?)?;

    println!(
        "{}",
        serde_json::to_string(&processor.state().checklist.completed())?
    );
    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: &InputFormat,
    json: bool,
) -> Result<(), WellbeingCliError> {
    let records = read_records(input, input_format)?;
    let inspections = VitalsRecordAdapter::inspect_records(&records);

    let errors: Vec<ValidationErrorDetail> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            record.validate_entry().err().map(|e| ValidationErrorDetail {
                index,
                error: e.to_string(),
            })
        })
        .collect();

    let report = ValidationReport {
        total_records: records.len(),
        valid_records: records.len() - errors.len(),
        invalid_records: errors.len(),
        errors,
        records: inspections
            .into_iter()
            .map(|inspection| RecordSummary {
                index: inspection.index,
                coverage: inspection.coverage,
                defaulted: inspection.defaulted,
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        let partial: Vec<_> = report.records.iter().filter(|r| !r.defaulted.is_empty()).collect();
        if !partial.is_empty() {
            println!("\nDefaulted fields:");
            for summary in partial {
                let names: Vec<&str> = summary.defaulted.iter().map(VitalField::as_str).collect();
                println!(
                    "  - Record {} ({:.0}% coverage): {}",
                    summary.index,
                    summary.coverage * 100.0,
                    names.join(", ")
                );
            }
        }

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Record {}: {}", err.index, err.error);
            }
        }
    }

    if report.invalid_records > 0 {
        Err(WellbeingCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_doctor(state: Option<&Path>, json: bool) -> Result<(), WellbeingCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} version {}", PRODUCER_NAME, WELLBEING_VERSION),
    });

    let log_filter = std::env::var(LOG_ENV).ok();
    checks.push(match log_filter {
        Some(filter) if tracing_subscriber::EnvFilter::try_new(&filter).is_err() => DoctorCheck {
            name: "log_filter".to_string(),
            status: CheckStatus::Warning,
            message: format!("{} is not a valid filter: {}", LOG_ENV, filter),
        },
        Some(filter) => DoctorCheck {
            name: "log_filter".to_string(),
            status: CheckStatus::Ok,
            message: format!("{}={}", LOG_ENV, filter),
        },
        None => DoctorCheck {
            name: "log_filter".to_string(),
            status: CheckStatus::Ok,
            message: format!("{} not set, logging warnings only", LOG_ENV),
        },
    });

    if let Some(state_path) = state {
        checks.push(check_state_file(state_path));
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (ready for piped records)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: WELLBEING_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Wellbeing Doctor Report");
        println!("=======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");
        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(WellbeingCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn check_state_file(state_path: &Path) -> DoctorCheck {
    if !state_path.exists() {
        return DoctorCheck {
            name: "state".to_string(),
            status: CheckStatus::Warning,
            message: "State file does not exist".to_string(),
        };
    }

    let content = match fs::read_to_string(state_path) {
        Ok(content) => content,
        Err(e) => {
            return DoctorCheck {
                name: "state".to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot read state file: {}", e),
            }
        }
    };

    match ProcessorState::from_json(&content) {
        Ok(state) => {
            let last = state
                .last_score()
                .map(|score| score.to_string())
                .unwrap_or_else(|| "none".to_string());
            let (status, pending) = match state.escalation {
                Some(escalation) => (
                    CheckStatus::Warning,
                    format!(", escalation pending since {}", escalation.raised_at),
                ),
                None => (CheckStatus::Ok, String::new()),
            };
            DoctorCheck {
                name: "state".to_string(),
                status,
                message: format!(
                    "State file valid (last score {}, {} tips done{})",
                    last,
                    state.checklist.completed().len(),
                    pending
                ),
            }
        }
        Err(e) => DoctorCheck {
            name: "state".to_string(),
            status: CheckStatus::Error,
            message: format!("Invalid state JSON: {}", e),
        },
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), WellbeingCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input: vitals record (JSON object, every field optional)");
                println!();
                println!("Each field accepts a number or a string; strings may carry units or labels.");
                println!();
                println!("- heartRate:   72, \"72 bpm\"");
                println!("- stressLevel: 38, \"38%\", \"Moderate\"  (low/moderate/high)");
                println!("- sleepHours:  7.5, \"7.5 hrs\"");
                println!("- energy:      65, \"65%\", \"Low\"");
                println!("- bp:          \"118/76\", \"118/76 mmHg\"");
                println!("- temperature: 36.8, \"36.8 °C\", \"98.6 F\"");
                println!("- steps:       8500, \"8,500\"");
                println!();
                println!("Other keys (ecg, date, timestamp, ...) are kept but not scored.");
                println!("Batches: JSON array or NDJSON (one record per line).");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Assessment output:");
                println!();
                println!("- categories: {{ anxiety, depression, stress, nervousBreakdown, selfHarmRisk }}");
                println!("  each {{ score: 0-100, level: low|moderate|high }}");
                println!("- overall: {{ score, level }}");
                println!("- notes: clinical observations");
                println!("- disclaimer: fixed support-only notice");
                println!();
                println!("Advisory output:");
                println!();
                println!("- score: 0-100 wellness score");
                println!("- status: {}", status_labels().join(" | "));
                println!("- tips: [{{ id, text, priority: high|medium|low, positive? }}]");
                println!("- issues: machine tags of triggered rules");
            }
        }
    }
    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, WellbeingCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn read_records(
    input: &Path,
    input_format: &InputFormat,
) -> Result<Vec<VitalsRecord>, WellbeingCliError> {
    let input_data = read_input(input)?;
    let records = match input_format {
        InputFormat::Auto => VitalsRecordAdapter::parse_any(&input_data)?,
        InputFormat::Ndjson => VitalsRecordAdapter::parse_ndjson(&input_data)?,
        InputFormat::Json => VitalsRecordAdapter::parse_array(&input_data)?,
    };

    if records.is_empty() {
        return Err(WellbeingCliError::NoRecords);
    }
    tracing::debug!(count = records.len(), "decoded vitals records");
    Ok(records)
}

fn write_output(output: &Path, data: &str) -> Result<(), WellbeingCliError> {
    if output.to_string_lossy() == "-" {
        print!("{}", data);
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn format_output<T: Serialize>(
    results: &[T],
    format: &OutputFormat,
) -> Result<String, WellbeingCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for result in results {
                lines.push(serde_json::to_string(result)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(results)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(results)?),
    }
}

fn get_input_json_schema() -> String {
    let vital = serde_json::json!({ "type": ["number", "string", "null"] });
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "vitals record",
        "type": "object",
        "properties": {
            "heartRate": vital,
            "stressLevel": vital,
            "sleepHours": vital,
            "energy": vital,
            "bp": vital,
            "temperature": vital,
            "steps": vital
        },
        "additionalProperties": true
    })
    .to_string()
}

fn status_labels() -> Vec<&'static str> {
    WellnessStatus::ALL.iter().map(WellnessStatus::as_str).collect()
}

fn get_output_json_schema() -> String {
    let category = serde_json::json!({
        "type": "object",
        "required": ["score", "level"],
        "properties": {
            "score": { "type": "integer", "minimum": 0, "maximum": 100 },
            "level": { "enum": ["low", "moderate", "high"] }
        }
    });
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$defs": {
            "assessment": {
                "type": "object",
                "required": ["categories", "overall", "notes", "disclaimer"],
                "properties": {
                    "categories": {
                        "type": "object",
                        "properties": {
                            "anxiety": category,
                            "depression": category,
                            "stress": category,
                            "nervousBreakdown": category,
                            "selfHarmRisk": category
                        }
                    },
                    "overall": category,
                    "notes": { "type": "array", "items": { "type": "string" } },
                    "disclaimer": { "type": "string" }
                }
            },
            "advisory": {
                "type": "object",
                "required": ["score", "status", "tips", "issues"],
                "properties": {
                    "score": { "type": "integer", "minimum": 0, "maximum": 100 },
                    "status": { "enum": status_labels() },
                    "tips": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["id", "text", "priority"],
                            "properties": {
                                "id": { "type": "string" },
                                "text": { "type": "string" },
                                "priority": { "enum": ["high", "medium", "low"] },
                                "positive": { "type": "boolean" }
                            }
                        }
                    },
                    "issues": { "type": "array", "items": { "type": "string" } }
                }
            }
        }
    })
    .to_string()
}

// Error handling

#[derive(Debug)]
enum WellbeingCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    NoRecords,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for WellbeingCliError {
    fn from(e: io::Error) -> Self {
        WellbeingCliError::Io(e)
    }
}

impl From<ComputeError> for WellbeingCliError {
    fn from(e: ComputeError) -> Self {
        WellbeingCliError::Compute(e)
    }
}

impl From<serde_json::Error> for WellbeingCliError {
    fn from(e: serde_json::Error) -> Self {
        WellbeingCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<WellbeingCliError> for CliError {
    fn from(e: WellbeingCliError) -> Self {
        match e {
            WellbeingCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            WellbeingCliError::Compute(ComputeError::StateError(msg)) => CliError {
                code: "STATE_ERROR".to_string(),
                message: msg,
                hint: Some("Run 'wellbeing doctor --state <file>' to inspect the state file".to_string()),
            },
            WellbeingCliError::Compute(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure input is a vitals record, JSON array or NDJSON".to_string()),
            },
            WellbeingCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            WellbeingCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No vitals records found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            WellbeingCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records contain no readings", count),
                hint: Some("Provide at least one vital per record".to_string()),
            },
            WellbeingCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct ValidationReport {
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
    records: Vec<RecordSummary>,
}

#[derive(Serialize)]
struct ValidationErrorDetail {
    index: usize,
    error: String,
}

#[derive(Serialize)]
struct RecordSummary {
    index: usize,
    coverage: f64,
    defaulted: Vec<VitalField>,
}

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_schema_lists_every_status() {
        let schema: serde_json::Value = serde_json::from_str(&get_output_json_schema()).unwrap();
        let allowed = schema["$defs"]["advisory"]["properties"]["status"]["enum"]
            .as_array()
            .unwrap();

        assert_eq!(allowed.len(), WellnessStatus::ALL.len());
        for status in WellnessStatus::ALL {
            let emitted = serde_json::to_value(status).unwrap();
            assert!(allowed.contains(&emitted), "{} missing from schema", emitted);
        }
    }

    #[test]
    fn test_input_schema_lists_every_field() {
        let schema: serde_json::Value = serde_json::from_str(&get_input_json_schema()).unwrap();
        for field in VitalField::ALL {
            assert!(schema["properties"].get(field.as_str()).is_some());
        }
    }
}
