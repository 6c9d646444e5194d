use clap::{error::ErrorKind, Parser, Subcommand, ValueEnum};
use sepeval_core::weighted_auc;
use sepeval_eval::{
    compute_run_eval, write_run_report, RunEvalInput, RunEvalResult, ScoreSet, AUC_ALGORITHM_ID,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sepeval", version, about = "Score separation evaluation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short = 'j', global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Full evaluation of a score archive: AUC, ROC, histograms, KS.
    Eval {
        input: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Weighted AUC of one split only.
    Auc {
        input: String,
        #[arg(long, value_enum, default_value = "test")]
        split: SplitChoice,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SplitChoice {
    Train,
    Test,
}

/// On-disk input: one JSON object with a train and a test split.
#[derive(Deserialize, Debug)]
struct ScoreArchive {
    train: SplitRecord,
    test: SplitRecord,
}

#[derive(Deserialize, Debug)]
struct SplitRecord {
    scores: Vec<f64>,
    labels: Vec<f64>,
    weights: Option<Vec<f64>>,
}

#[derive(Clone, Copy, Debug)]
enum AppErrorKind {
    Usage,
    Data,
}

#[derive(Clone, Debug)]
struct AppError {
    kind: AppErrorKind,
    code: &'static str,
    message: String,
    details: Box<Value>,
}

impl AppError {
    fn usage(message: String) -> Self {
        Self {
            kind: AppErrorKind::Usage,
            code: "CLI_USAGE",
            message,
            details: Box::new(Value::Null),
        }
    }

    fn archive_read(message: String) -> Self {
        Self {
            kind: AppErrorKind::Data,
            code: "ARCHIVE_READ",
            message,
            details: Box::new(Value::Null),
        }
    }

    fn archive_parse(message: String) -> Self {
        Self {
            kind: AppErrorKind::Data,
            code: "ARCHIVE_PARSE",
            message,
            details: Box::new(Value::Null),
        }
    }

    fn invalid_score_set(split: &'static str, message: String) -> Self {
        Self {
            kind: AppErrorKind::Data,
            code: "INVALID_SCORE_SET",
            message,
            details: Box::new(json!({ "split": split })),
        }
    }

    fn eval_failed(message: String) -> Self {
        Self {
            kind: AppErrorKind::Data,
            code: "EVAL_FAILED",
            message,
            details: Box::new(Value::Null),
        }
    }

    fn write_failed(message: String) -> Self {
        Self {
            kind: AppErrorKind::Data,
            code: "WRITE_FAILED",
            message,
            details: Box::new(Value::Null),
        }
    }

    fn exit_code(&self) -> i32 {
        match self.kind {
            AppErrorKind::Usage => 1,
            AppErrorKind::Data => 2,
        }
    }
}

#[derive(Serialize)]
struct JsonEnvelope {
    status: String,
    error: Option<ErrorEnvelope>,
    data: Option<Value>,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    code: String,
    message: String,
    details: Value,
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let wants_json = args.iter().any(|arg| arg == "--json" || arg == "-j");

    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            let json = cli.json || wants_json;
            match run(cli, json) {
                Ok(envelope) => {
                    if json {
                        print_json(&envelope);
                    }
                    std::process::exit(0);
                }
                Err(err) => {
                    let exit_code = err.exit_code();
                    if json {
                        print_json(&error_envelope(&err));
                    } else {
                        eprintln!("{}", err.message);
                    }
                    std::process::exit(exit_code);
                }
            }
        }
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{err}");
                std::process::exit(0);
            }
            _ => {
                if wants_json {
                    let usage = AppError::usage(err.to_string());
                    print_json(&error_envelope(&usage));
                } else {
                    let _ = err.print();
                }
                std::process::exit(1);
            }
        },
    }
}

fn run(cli: Cli, json: bool) -> Result<JsonEnvelope, AppError> {
    match cli.command {
        Commands::Eval { input, out } => eval(input, out, json),
        Commands::Auc { input, split } => auc(input, split, json),
    }
}

fn eval(input: String, out: Option<PathBuf>, json: bool) -> Result<JsonEnvelope, AppError> {
    let archive = read_archive(&input)?;
    let run_input = RunEvalInput {
        train: score_set("train", archive.train)?,
        test: score_set("test", archive.test)?,
    };
    let result =
        compute_run_eval(&run_input).map_err(|err| AppError::eval_failed(err.to_string()))?;

    let artifacts = match out {
        Some(dir) => {
            let artifacts = write_run_report(&dir, &result)
                .map_err(|err| AppError::write_failed(err.to_string()))?;
            Some(json!({
                "report_json": artifacts.report_json,
                "summary_csv": artifacts.summary_csv,
                "report_hash": artifacts.report_hash,
            }))
        }
        None => None,
    };

    if !json {
        print_eval_summary(&result);
    }

    Ok(JsonEnvelope {
        status: "OK".to_string(),
        error: None,
        data: Some(json!({
            "result": result,
            "artifacts": artifacts,
        })),
    })
}

fn auc(input: String, split: SplitChoice, json: bool) -> Result<JsonEnvelope, AppError> {
    let archive = read_archive(&input)?;
    let (name, record) = match split {
        SplitChoice::Train => ("train", archive.train),
        SplitChoice::Test => ("test", archive.test),
    };
    let set = score_set(name, record)?;
    let value = weighted_auc(set.labels(), set.scores(), Some(set.weights()))
        .map_err(|err| AppError::eval_failed(err.to_string()))?;

    if !json {
        println!("{} auc: {:.6}", name, value);
    }

    Ok(JsonEnvelope {
        status: "OK".to_string(),
        error: None,
        data: Some(json!({
            "split": name,
            "auc": value,
            "auc_algorithm": AUC_ALGORITHM_ID,
        })),
    })
}

fn read_archive(input: &str) -> Result<ScoreArchive, AppError> {
    let text = fs::read_to_string(input)
        .map_err(|err| AppError::archive_read(format!("cannot read {}: {}", input, err)))?;
    serde_json::from_str(&text)
        .map_err(|err| AppError::archive_parse(format!("cannot parse {}: {}", input, err)))
}

fn score_set(split: &'static str, record: SplitRecord) -> Result<ScoreSet, AppError> {
    ScoreSet::new(record.scores, record.labels, record.weights)
        .map_err(|err| AppError::invalid_score_set(split, format!("{} split: {}", split, err)))
}

fn print_eval_summary(result: &RunEvalResult) {
    println!("primary auc (test): {:.6}", result.primary_auc);
    println!("trapezoid auc:      {:.6}", result.curve_auc_trapezoid);
    println!(
        "ks signal:     D={:.4} p={:.4}",
        result.ks.signal.statistic, result.ks.signal.p_value
    );
    println!(
        "ks background: D={:.4} p={:.4}",
        result.ks.background.statistic, result.ks.background.p_value
    );
}

fn error_envelope(err: &AppError) -> JsonEnvelope {
    JsonEnvelope {
        status: "ERROR".to_string(),
        error: Some(ErrorEnvelope {
            code: err.code.to_string(),
            message: err.message.clone(),
            details: (*err.details).clone(),
        }),
        data: None,
    }
}

fn print_json(envelope: &JsonEnvelope) {
    let json = serde_json::to_string(envelope).expect("failed to serialize json");
    println!("{json}");
}
