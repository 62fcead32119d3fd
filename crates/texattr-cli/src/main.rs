use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use texattr_log::{AnnotateOptions, AttributedLine, Filesystem, LogAnnotator, RunSelector};

#[derive(Parser)]
#[command(name = "texattr")]
#[command(about = "Attribute TeX transcript lines to their source files", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prefix every transcript line with its context label
    Annotate {
        /// Path to the .log file (stdin when omitted)
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,

        /// Drop lines that are empty or whitespace only
        #[arg(long)]
        skip_blank: bool,

        /// Only print the last complete compiler run
        #[arg(long)]
        last_run: bool,

        /// Directory that relative file markers are resolved against
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// JSON file with annotation options
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// `<label>:<line>` for each line
    Text,
    /// JSON array of attributed lines
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Annotate {
            path,
            skip_blank,
            last_run,
            root,
            format,
            config,
        } => {
            let mut options = match &config {
                Some(config) => AnnotateOptions::load(config)
                    .with_context(|| format!("Failed to load config {}", config.display()))?,
                None => AnnotateOptions::default(),
            };
            options.skip_blank |= skip_blank;
            options.last_run_only |= last_run;

            // Relative markers in a transcript are relative to the directory
            // the engine ran in, which is usually the log's own directory.
            let root = root
                .or_else(|| log_dir(path.as_deref()))
                .unwrap_or_else(|| PathBuf::from("."));
            log::info!("resolving files against {}", root.display());

            let input: Box<dyn BufRead> = match &path {
                Some(path) => Box::new(BufReader::new(
                    File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
                )),
                None => Box::new(BufReader::new(io::stdin().lock())),
            };
            let annotator = LogAnnotator::new(Filesystem::new(root), options);
            annotate(annotator, input, format)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn log_dir(path: Option<&Path>) -> Option<PathBuf> {
    let parent = path?.parent()?;
    (!parent.as_os_str().is_empty()).then(|| parent.to_path_buf())
}

fn annotate(
    mut annotator: LogAnnotator<Filesystem>,
    mut input: Box<dyn BufRead>,
    format: Format,
) -> anyhow::Result<()> {
    let buffered = format == Format::Json || annotator.options().last_run_only;
    let selector = RunSelector::from_options(annotator.options());
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut collected: Vec<AttributedLine> = Vec::new();

    let mut buf = Vec::new();
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf).context("Failed to read transcript")? == 0 {
            break;
        }
        let ready = annotator
            .feed(&buf)
            .context("Failed to annotate transcript")?;
        if buffered {
            collected.extend(ready);
        } else {
            for line in &ready {
                line.write_to(&mut out)?;
            }
        }
    }

    let last_run_only = annotator.options().last_run_only;
    let ready = annotator
        .finish()
        .context("Failed to annotate transcript")?;
    if !buffered {
        for line in &ready {
            line.write_to(&mut out)?;
        }
        out.flush()?;
        return Ok(());
    }
    collected.extend(ready);

    if last_run_only {
        collected = selector
            .select(collected)
            .context("Failed to select the last compiler run")?;
    }

    match format {
        Format::Text => {
            for line in &collected {
                line.write_to(&mut out)?;
            }
        }
        Format::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(&collected)?)?;
        }
    }
    out.flush()?;
    Ok(())
}
