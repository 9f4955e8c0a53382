#![forbid(unsafe_code)]

use clap::{Parser, Subcommand, ValueEnum};
use fairtable_core::{
    init_logging, init_stderr_logging, inspect_inputs, render_from_assignments, run_assignment, run_matching,
    AssignmentRequest, FairConfig, LayoutOptions, MatchRequest, RenderFormat, RowNumber,
};
use log::info;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const STDERR_LOG_LEVEL: &str = "warn";

#[derive(Parser)]
#[command(name = "fairtable", version)]
#[command(about = "Science fair slot assignment and table numbering")]
struct Cli {
    /// Directory for rolling log files; warnings go to stderr when unset.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign projects to slots and write the run artifacts.
    Assign {
        #[arg(long)]
        slots: PathBuf,
        #[arg(long)]
        projects: PathBuf,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Render the layout of an exported assignments file.
    Render {
        #[arg(long)]
        assignments: PathBuf,
        /// Writes to stdout when unset.
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = FormatArg::Text)]
        format: FormatArg,
        /// Walk order of rows, e.g. `3,1,2`.
        #[arg(long, value_delimiter = ',')]
        row_order: Vec<RowNumber>,
        /// Gap below one row, e.g. `2=3`. Repeatable.
        #[arg(long = "row-gap", value_parser = parse_row_gap)]
        row_gaps: Vec<(RowNumber, u32)>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Score-based matching of projects to tables.
    Match {
        #[arg(long)]
        tables: PathBuf,
        #[arg(long)]
        projects: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print counts and the first/last records of both inputs.
    Inspect {
        #[arg(long)]
        slots: PathBuf,
        #[arg(long)]
        projects: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for RenderFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Text => RenderFormat::Text,
            FormatArg::Json => RenderFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let log_dir = cli.log_dir.as_deref();
    let log_level = cli.log_level.as_deref();

    match cli.command {
        Commands::Assign {
            slots,
            projects,
            out_dir,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            start_logging(log_dir, log_level, &config)?;

            let mut request = AssignmentRequest::new(slots, projects).with_config(config);
            if let Some(out_dir) = out_dir {
                request = request.with_output_dir(out_dir);
            }
            let report = run_assignment(&request).map_err(|err| err.to_string())?;

            print!("{}", report.summary);
            println!();
            println!("Run: {}", report.run_id);
            println!("Assignments: {}", report.assignments_path.display());
            println!("Layout: {}", report.layout_text_path.display());
            println!("Layout JSON: {}", report.layout_json_path.display());
            println!("Summary: {}", report.summary_path.display());
            Ok(())
        }
        Commands::Render {
            assignments,
            out,
            format,
            row_order,
            row_gaps,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            start_logging(log_dir, log_level, &config)?;

            let options = layout_options(&config, row_order, row_gaps);
            let rendered = render_from_assignments(&assignments, &options, format.into())
                .map_err(|err| err.to_string())?;
            match out {
                Some(path) => std::fs::write(&path, rendered)
                    .map_err(|err| format!("cannot write `{}`: {err}", path.display())),
                None => {
                    print!("{rendered}");
                    Ok(())
                }
            }
        }
        Commands::Match {
            tables,
            projects,
            out,
        } => {
            start_logging(log_dir, log_level, &FairConfig::default())?;
            let report = run_matching(&MatchRequest {
                projects_path: projects,
                tables_path: tables,
                output_path: out,
            })
            .map_err(|err| err.to_string())?;
            print!("{}", report.summary);
            println!("Assignments: {}", report.output_path.display());
            Ok(())
        }
        Commands::Inspect { slots, projects } => {
            start_logging(log_dir, log_level, &FairConfig::default())?;
            let overview = inspect_inputs(&slots, &projects).map_err(|err| err.to_string())?;
            print!("{overview}");
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<FairConfig, String> {
    FairConfig::load_or_default(path).map_err(|err| err.to_string())
}

/// Flag level wins over the environment, which wins over the config file.
///
/// Without a log directory only stderr is used, at `warn` unless the
/// level flag says otherwise.
fn start_logging(
    cli_dir: Option<&Path>,
    cli_level: Option<&str>,
    config: &FairConfig,
) -> Result<(), String> {
    let Some(dir) = cli_dir.or(config.logging.dir.as_deref()) else {
        return init_stderr_logging(cli_level.unwrap_or(STDERR_LOG_LEVEL))
            .map_err(|err| err.to_string());
    };
    let dir = absolute_dir(dir)?;
    let level = cli_level
        .map(str::to_string)
        .unwrap_or_else(|| config.effective_log_level());
    init_logging(&level, &dir, true).map_err(|err| err.to_string())?;
    info!(
        "event=cli_start module=cli status=ok core_version={}",
        fairtable_core::core_version()
    );
    Ok(())
}

fn absolute_dir(dir: &Path) -> Result<PathBuf, String> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let cwd = std::env::current_dir()
        .map_err(|err| format!("cannot resolve working directory: {err}"))?;
    Ok(cwd.join(dir))
}

fn layout_options(
    config: &FairConfig,
    row_order: Vec<RowNumber>,
    row_gaps: Vec<(RowNumber, u32)>,
) -> LayoutOptions {
    let mut options = config.layout_options();
    if !row_order.is_empty() {
        options.row_order = Some(row_order);
    }
    options.row_gaps.extend(row_gaps);
    options
}

fn parse_row_gap(raw: &str) -> Result<(RowNumber, u32), String> {
    let (row, gap) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ROW=GAP, got `{raw}`"))?;
    let row = row
        .trim()
        .parse::<RowNumber>()
        .map_err(|err| format!("invalid row `{row}`: {err}"))?;
    let gap = gap
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("invalid gap `{gap}`: {err}"))?;
    Ok((row, gap))
}
