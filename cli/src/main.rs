//! raidstat CLI - raid result stat extraction tool
//!
//! Reads text recognized from a result screen screenshot and prints the
//! recovered stats.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use raidstat::catalog::{ADDITIONAL_STATS, MAIN_STATS, UNRECOGNIZED};
use raidstat::{
    extract_batch, CorrectionDictionary, ExtractOptions, Extractor, RawText, StatMap,
    DEFAULT_MIN_CONFIDENCE,
};

/// Raid result stat extraction from recognized screenshot text
#[derive(Parser)]
#[command(
    name = "raidstat",
    author = "iyulab",
    version,
    about = "Extract raid result stats from recognized screenshot text",
    long_about = "raidstat - Raid result stat extraction tool.\n\n\
                  Turns noisy text recognized from a result screen screenshot into\n\
                  an ordered label -> value mapping.\n\n\
                  Usage:\n  \
                  raidstat extract <file>        Print stats as JSON\n  \
                  raidstat extract - -f table    Read stdin, print a summary table\n  \
                  raidstat trace <file>          Show every pipeline stage"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract stats from recognized text
    Extract {
        /// Input file path ("-" for stdin)
        input: PathBuf,

        /// Recognizer confidence of the input (0-1)
        #[arg(long, default_value = "1.0")]
        confidence: f32,

        /// Minimum confidence required to run extraction
        #[arg(long, default_value_t = DEFAULT_MIN_CONFIDENCE)]
        min_confidence: f32,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip the fallback patterns
        #[arg(long)]
        table_only: bool,
    },

    /// Show the line sequence after every pipeline stage
    Trace {
        /// Input file path ("-" for stdin)
        input: PathBuf,
    },

    /// Extract stats from many files, one JSON object per line
    Batch {
        /// Input file paths
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Process files one at a time
        #[arg(long)]
        sequential: bool,
    },

    /// List the known stat labels
    Labels {
        /// Also list the misrecognition corrections
        #[arg(long)]
        corrections: bool,
    },

    /// Show version information
    Version,
}

/// Output format
#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Indented JSON object
    Json,
    /// Single-line JSON object
    Compact,
    /// Main and additional stats as a summary table
    Table,
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Extract {
            input,
            confidence,
            min_confidence,
            format,
            output,
            table_only,
        } => {
            let raw = RawText::new(read_input(&input)?, confidence)?;

            let stats = if raw.is_acceptable(min_confidence) {
                if !raw.is_high_confidence() {
                    log::warn!(
                        "low recognizer confidence ({:.0}%), check the result",
                        raw.confidence() * 100.0
                    );
                }
                let options = if table_only {
                    ExtractOptions::table_only()
                } else {
                    ExtractOptions::default()
                };
                Extractor::new().with_options(options).extract(&raw)
            } else {
                eprintln!(
                    "{} Confidence {:.0}% is below {:.0}%, manual entry required",
                    "!".yellow().bold(),
                    raw.confidence() * 100.0,
                    min_confidence * 100.0
                );
                StatMap::new()
            };

            let rendered = match format {
                OutputFormat::Json => stats.to_json_pretty()?,
                OutputFormat::Compact => stats.to_json()?,
                OutputFormat::Table => render_table(&stats),
            };
            write_output(output.as_ref(), &rendered)?;

            if let Some(path) = output {
                println!(
                    "{} Extracted {} stats: {}",
                    "✓".green().bold(),
                    stats.len(),
                    path.display()
                );
            }
        }

        Commands::Trace { input } => {
            let raw = RawText::from_text(read_input(&input)?);
            print_trace(&Extractor::new().trace(&raw))?;
        }

        Commands::Batch {
            inputs,
            output,
            sequential,
        } => {
            run_batch(&inputs, output.as_ref(), sequential)?;
        }

        Commands::Labels { corrections } => {
            print_labels(corrections);
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// Run the batch command - one JSON line per input file
fn run_batch(
    inputs: &[PathBuf],
    output: Option<&PathBuf>,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = create_progress(inputs.len() as u64, "Reading files...");

    let mut texts = Vec::with_capacity(inputs.len());
    for input in inputs {
        texts.push(RawText::from_text(read_input(input)?));
        pb.inc(1);
    }

    pb.set_message("Extracting...");
    let mut options = ExtractOptions::default();
    if sequential {
        options = options.sequential();
    }
    let results = extract_batch(&texts, &options);
    pb.finish_and_clear();

    let mut lines = Vec::with_capacity(results.len());
    for (input, stats) in inputs.iter().zip(&results) {
        let line = serde_json::json!({
            "file": input.display().to_string(),
            "stats": stats,
        });
        lines.push(serde_json::to_string(&line)?);
    }
    write_output(output, &lines.join("\n"))?;

    let manual = results.iter().filter(|s| s.requires_manual_entry()).count();
    eprintln!(
        "{} {} files processed, {} need manual entry",
        "✓".green().bold(),
        results.len(),
        manual
    );

    Ok(())
}

/// Main stats always (missing as 미인식), additional stats when present,
/// then any label outside the catalogue.
fn render_table(stats: &StatMap) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", "Main Stats".cyan().bold()));
    out.push_str(&format!("{}\n", "─".repeat(40)));
    for label in MAIN_STATS {
        match stats.get(label) {
            Some(value) => out.push_str(&format!("{}: {}\n", label.bold(), value)),
            None => out.push_str(&format!("{}: {}\n", label.bold(), UNRECOGNIZED.yellow())),
        }
    }

    let additional: Vec<(&str, &str)> = ADDITIONAL_STATS
        .iter()
        .filter_map(|label| stats.get(label).map(|value| (*label, value)))
        .chain(
            stats
                .iter()
                .filter(|e| !MAIN_STATS.contains(&e.label.as_str()))
                .filter(|e| !ADDITIONAL_STATS.contains(&e.label.as_str()))
                .map(|e| (e.label.as_str(), e.value.as_str())),
        )
        .collect();

    if !additional.is_empty() {
        out.push_str(&format!("\n{}\n", "Additional Stats".cyan().bold()));
        out.push_str(&format!("{}\n", "─".repeat(40)));
        for (label, value) in additional {
            out.push_str(&format!("{}: {}\n", label.bold(), value));
        }
    }

    out
}

fn print_trace(trace: &raidstat::PipelineTrace) -> Result<(), Box<dyn std::error::Error>> {
    for snapshot in &trace.stages {
        println!(
            "{} ({} lines)",
            snapshot.stage.to_string().cyan().bold(),
            snapshot.lines.len()
        );
        println!("{}", "─".repeat(40));
        for (i, line) in snapshot.lines.iter().enumerate() {
            println!("{:>3}  {}", i.to_string().dimmed(), line);
        }
        println!();
    }

    println!("{}", "Extraction".cyan().bold());
    println!("{}", "─".repeat(40));
    match &trace.table {
        Some(table) => println!(
            "{}: label row {}, {} labels, {} values",
            "Table".bold(),
            table.label_row,
            table.labels.len(),
            table.values.len()
        ),
        None => println!("{}: {}", "Table".bold(), "not found".yellow()),
    }
    match &trace.combat_time {
        Some(time) => println!(
            "{}: {} (line {})",
            "Combat time".bold(),
            time.value,
            time.line_index
        ),
        None => println!("{}: {}", "Combat time".bold(), "not found".yellow()),
    }
    println!("{}: {}", "Pattern matches".bold(), trace.patterns.len());

    println!("\n{}", "Result".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}", trace.stats.to_json_pretty()?);

    Ok(())
}

fn print_labels(corrections: bool) {
    println!("{}", "Main Stats".cyan().bold());
    println!("{}", "─".repeat(40));
    for label in MAIN_STATS {
        println!("  {}", label);
    }

    println!("\n{}", "Additional Stats".cyan().bold());
    println!("{}", "─".repeat(40));
    for label in ADDITIONAL_STATS {
        println!("  {}", label);
    }

    if corrections {
        let dictionary = CorrectionDictionary::global();
        println!(
            "\n{} ({})",
            "Corrections".cyan().bold(),
            dictionary.len()
        );
        println!("{}", "─".repeat(40));
        for (wrong, right) in dictionary.iter() {
            println!("  {} → {}", wrong.dimmed(), right);
        }
    }
}

fn print_version() {
    println!("{} {}", "raidstat".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Raid result stat extraction from recognized screenshot text");
}

fn create_progress(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.blue} {msg} [{bar:30}] {pos}/{len}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb
}

/// Reads one input file, or stdin for `-`.
fn read_input(path: &Path) -> raidstat::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin().lock().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use raidstat::StatEntry;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_extract_args() {
        let cli = Cli::try_parse_from([
            "raidstat", "-v", "extract", "-", "--confidence", "0.5", "-f", "table",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Extract {
                input,
                confidence,
                min_confidence,
                format,
                ..
            } => {
                assert_eq!(input, PathBuf::from("-"));
                assert_eq!(confidence, 0.5);
                assert_eq!(min_confidence, DEFAULT_MIN_CONFIDENCE);
                assert!(matches!(format, OutputFormat::Table));
            }
            _ => panic!("expected extract command"),
        }
    }

    #[test]
    fn test_read_input_missing_file() {
        let err = read_input(Path::new("does/not/exist.txt")).unwrap_err();
        assert!(matches!(err, raidstat::Error::Io(_)));
        assert!(err.to_string().starts_with("I/O error"));
    }

    #[test]
    fn test_render_table() {
        colored::control::set_override(false);

        let stats: StatMap = vec![
            StatEntry::new("전투 시간", "14:12"),
            StatEntry::new("피해량", "3,214.35억"),
            StatEntry::new("무력화", "4,240"),
            StatEntry::new("낙인력", "12.5%"),
        ]
        .into_iter()
        .collect();

        let table = render_table(&stats);
        assert!(table.contains("전투 시간: 14:12"));
        assert!(table.contains("초당 피해량: 미인식"));
        assert!(table.contains("Additional Stats"));
        assert!(table.contains("무력화: 4,240"));
        assert!(table.contains("낙인력: 12.5%"));
        assert!(!table.contains("치명타 적중률"));
    }

    #[test]
    fn test_render_table_main_only() {
        colored::control::set_override(false);

        let table = render_table(&StatMap::new());
        assert_eq!(table.matches(UNRECOGNIZED).count(), MAIN_STATS.len());
        assert!(!table.contains("Additional Stats"));
    }
}
