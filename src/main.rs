use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::{generate, Shell};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use tracing::info;

use canine_parentage::batch::{load_trios, read_trio_sheet};
use canine_parentage::loci::{export_panel, CsvSink, RecordSink, SqlScriptSink};
use canine_parentage::{
    archive, FileDiscovery, FileParser, ParentageReport, ParentageTester, ReportFormat,
    ReportGenerator, Settings, Trio, Verdict,
};

/// Parentage verification for dog trios from TPED marker panels
#[derive(Parser, Debug)]
#[command(
    name = "canine-parentage",
    version,
    about = "Verify dog parentage from TPED marker panels",
    long_about = r#"
Checks whether a proposed offspring / dam / sire trio is genetically consistent:
- Joins the three marker panels on chromosome, marker id and position
- Counts Mendelian errors on autosomes, X, Y and mitochondria
- Infers the offspring's sex from Y-chromosome calls
- Grades the trio from very strong to weak evidence of parentage

Also exports locus / allele tables and unpacks zipped uploads.
"#
)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Interactive mode with prompts for a single trio
    #[arg(short, long)]
    interactive: bool,

    /// TOML settings file
    #[arg(long, global = true, env = "CANINE_PARENTAGE_CONFIG", value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify a single trio
    Verify(VerifyArgs),
    /// Verify every trio listed in a CSV sheet
    Batch(BatchArgs),
    /// Export locus and allele-call records for one panel
    Loci(LociArgs),
    /// Unpack a zipped upload and list the panels it contains
    Intake(IntakeArgs),
    /// Check external tool dependencies
    CheckDeps,
    /// Generate shell completions
    Completions { shell: Shell },
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// Offspring TPED panel
    #[arg(long, value_hint = ValueHint::FilePath)]
    offspring: PathBuf,

    /// Dam (mother) TPED panel
    #[arg(long, value_hint = ValueHint::FilePath)]
    dam: PathBuf,

    /// Sire (father) TPED panel
    #[arg(long, value_hint = ValueHint::FilePath)]
    sire: PathBuf,

    /// Individual to read from multi-sample TPEDs (0-based)
    #[arg(long, default_value = "0")]
    sample_index: usize,

    /// Cap the verdict at weak below this many autosomal markers
    #[arg(long)]
    min_markers: Option<usize>,

    /// Also write a report to this directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum)]
    format: Option<ReportFormat>,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// CSV sheet with trio_id,offspring,dam,sire columns
    #[arg(long, value_hint = ValueHint::FilePath)]
    trios: PathBuf,

    /// Number of threads (0 = auto)
    #[arg(short, long)]
    threads: Option<usize>,

    #[arg(long, default_value = "0")]
    sample_index: usize,

    #[arg(long)]
    min_markers: Option<usize>,

    /// Output directory for reports
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, value_enum)]
    format: Option<ReportFormat>,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum SinkKind {
    #[default]
    Csv,
    Sql,
}

#[derive(Args, Debug)]
struct LociArgs {
    /// TPED panel to export
    #[arg(long, value_hint = ValueHint::FilePath)]
    input: PathBuf,

    #[arg(long)]
    dog_id: u64,

    #[arg(long, default_value = "1")]
    source_id: u64,

    #[arg(long, value_enum, default_value = "csv")]
    sink: SinkKind,

    #[arg(long, default_value = "0")]
    sample_index: usize,

    #[arg(short, long, default_value = ".")]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct IntakeArgs {
    /// Zip archive to unpack
    #[arg(long, value_hint = ValueHint::FilePath)]
    archive: PathBuf,

    #[arg(short, long, default_value = "uploads")]
    output: PathBuf,

    /// Recursively search the unpacked folder for panels
    #[arg(short, long)]
    recursive: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        generate_completions(shell);
        return Ok(());
    }

    init_logging(cli.verbose);

    let settings = Settings::load(cli.config.as_deref())?;

    if cli.interactive {
        let args = run_interactive_mode(&settings)?;
        return run_verify(args, &settings);
    }

    match cli.command {
        Some(Commands::Verify(args)) => run_verify(args, &settings),
        Some(Commands::Batch(args)) => run_batch(args, &settings),
        Some(Commands::Loci(args)) => run_loci(args),
        Some(Commands::Intake(args)) => run_intake(args),
        Some(Commands::CheckDeps) => check_dependencies(),
        Some(Commands::Completions { .. }) | None => Ok(()),
    }
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("canine_parentage={}", level))
        .with_writer(io::stderr)
        .init();
}

fn init_thread_pool(threads: usize) -> Result<()> {
    let num_threads = if threads == 0 {
        num_cpus::get()
    } else {
        threads
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .map_err(|e| anyhow!("Failed to initialize thread pool: {}", e))?;

    Ok(())
}

fn tester_for(settings: &Settings, min_markers: Option<usize>) -> ParentageTester {
    let mut thresholds = settings.verdict.clone();
    if let Some(min) = min_markers {
        thresholds.min_autosomal_markers = min;
    }
    ParentageTester::new(thresholds)
}

fn run_verify(args: VerifyArgs, settings: &Settings) -> Result<()> {
    let parser = FileParser::with_sample_index(args.sample_index);
    let parse = |path: &PathBuf| {
        parser
            .parse(path)
            .with_context(|| format!("Failed to parse panel {}", path.display()))
    };

    let offspring = parse(&args.offspring)?;
    let dam = parse(&args.dam)?;
    let sire = parse(&args.sire)?;
    let trio = Trio::new(offspring.sample_id.clone(), offspring, dam, sire);

    let report = tester_for(settings, args.min_markers).test(&trio);
    print_report(&report);

    if args.output.is_some() || args.format.is_some() {
        let output = args.output.unwrap_or_else(|| settings.output.dir.clone());
        let format = args.format.unwrap_or(settings.output.format);
        let generator = ReportGenerator::new(&output)?;
        generator.generate(std::slice::from_ref(&report), format)?;
        println!(
            "\n{} Report saved to: {}",
            style("✓").green().bold(),
            style(output.display()).cyan()
        );
    }

    Ok(())
}

fn run_batch(args: BatchArgs, settings: &Settings) -> Result<()> {
    init_thread_pool(args.threads.unwrap_or(settings.threads))?;
    info!("Using {} threads", rayon::current_num_threads());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Reading trio sheet...");
    let rows = read_trio_sheet(&args.trios)?;
    pb.set_position(10);

    pb.set_message("Parsing marker panels...");
    let parser = FileParser::with_sample_index(args.sample_index);
    let trios = load_trios(&rows, &parser);
    pb.set_position(60);

    info!("Loaded {} of {} trios", trios.len(), rows.len());

    pb.set_message("Verifying parentage...");
    let reports = tester_for(settings, args.min_markers).test_all(&trios);
    pb.set_position(90);

    pb.set_message("Generating reports...");
    let output = args.output.unwrap_or_else(|| settings.output.dir.clone());
    let generator = ReportGenerator::new(&output)?;
    generator.generate(&reports, args.format.unwrap_or(settings.output.format))?;
    pb.set_position(100);

    pb.finish_with_message("Verification complete!");

    for report in &reports {
        println!(
            "  {} {}",
            style(&report.trio_id).bold(),
            styled_verdict(report.verdict)
        );
    }
    if trios.len() < rows.len() {
        println!(
            "  {} {} trio(s) skipped, see log for details",
            style("!").yellow().bold(),
            rows.len() - trios.len()
        );
    }

    println!(
        "\n{} Reports saved to: {}",
        style("✓").green().bold(),
        style(output.display()).cyan()
    );

    Ok(())
}

fn run_loci(args: LociArgs) -> Result<()> {
    let panel = FileParser::with_sample_index(args.sample_index)
        .parse(&args.input)
        .with_context(|| format!("Failed to parse panel {}", args.input.display()))?;

    let mut sink: Box<dyn RecordSink> = match args.sink {
        SinkKind::Csv => Box::new(CsvSink::new(&args.output)?),
        SinkKind::Sql => Box::new(SqlScriptSink::new(&args.output)?),
    };
    export_panel(&panel, args.dog_id, args.source_id, sink.as_mut())?;

    println!(
        "{} Exported {} loci for dog {} to {}",
        style("✓").green().bold(),
        panel.len(),
        args.dog_id,
        style(args.output.display()).cyan()
    );
    Ok(())
}

fn run_intake(args: IntakeArgs) -> Result<()> {
    let extracted = archive::unzip_file(&args.archive, &args.output)
        .with_context(|| format!("Failed to unpack {}", args.archive.display()))?;

    let panels = FileDiscovery::new(args.recursive)
        .discover_in_directory(&extracted.target_folder)?;

    println!(
        "{} Unpacked {} file(s) into {}",
        style("✓").green().bold(),
        extracted.files.len(),
        style(extracted.target_folder.display()).cyan()
    );
    for panel in panels {
        println!("  {}", style(panel.display()).green());
    }
    Ok(())
}

fn styled_verdict(verdict: Verdict) -> console::StyledObject<&'static str> {
    let text = verdict.description();
    match verdict {
        Verdict::VeryStrong | Verdict::Strong => style(text).green().bold(),
        Verdict::Moderate => style(text).yellow().bold(),
        Verdict::Weak => style(text).red().bold(),
    }
}

fn print_report(report: &ParentageReport) {
    println!("{}", styled_verdict(report.verdict));
    println!();
    println!(
        "  Offspring {} ({}), dam {}, sire {}",
        style(&report.offspring_id).bold(),
        report.offspring_sex,
        report.dam_id,
        report.sire_id
    );
    println!("  Shared markers: {}", report.markers_joined);
    for result in report.category_results() {
        println!(
            "  {:<14} {:>6} markers {:>5} errors  rate {:.4}",
            result.category.label(),
            result.total_markers_evaluated,
            result.inconsistent_marker_count,
            result.error_rate
        );
    }
    println!(
        "  {:<14} rate {:.4}",
        "sex chromosome", report.sex_chromosome_error_rate
    );
}

fn check_dependencies() -> Result<()> {
    println!("{}", style("Checking External Dependencies:").bold().cyan());
    println!();

    // ROH and raw IBD analyses are delegated to PLINK
    let tools = vec![("PLINK", vec!["plink", "plink2"])];

    for (name, alternatives) in tools {
        let found = alternatives.iter().any(|alt| {
            std::process::Command::new("sh")
                .arg("-c")
                .arg(format!("command -v {} 2>/dev/null", alt))
                .output()
                .map(|o| o.status.success())
                .unwrap_or(false)
        });

        if found {
            println!("  {} {}", style("✓").green(), style(name).green());
        } else {
            println!("  {} {} (optional)", style("✗").red(), style(name).dim());
        }
    }

    Ok(())
}

fn run_interactive_mode(settings: &Settings) -> Result<VerifyArgs> {
    println!(
        "{}",
        style("Canine Parentage Verification - Interactive Mode")
            .cyan()
            .bold()
    );
    println!();

    let theme = ColorfulTheme::default();

    let offspring: String = Input::with_theme(&theme)
        .with_prompt("Offspring TPED file")
        .interact_text()?;
    let dam: String = Input::with_theme(&theme)
        .with_prompt("Dam (mother) TPED file")
        .interact_text()?;
    let sire: String = Input::with_theme(&theme)
        .with_prompt("Sire (father) TPED file")
        .interact_text()?;

    let formats = vec!["No report file", "JSON", "CSV", "TSV", "HTML", "All formats"];
    let format_idx = Select::with_theme(&theme)
        .with_prompt("Select report format")
        .default(0)
        .items(&formats)
        .interact()?;

    let format = match format_idx {
        1 => Some(ReportFormat::Json),
        2 => Some(ReportFormat::Csv),
        3 => Some(ReportFormat::Tsv),
        4 => Some(ReportFormat::Html),
        5 => Some(ReportFormat::All),
        _ => None,
    };

    let output = if format.is_some() {
        let dir: String = Input::with_theme(&theme)
            .with_prompt("Output directory")
            .default(settings.output.dir.display().to_string())
            .interact_text()?;
        Some(PathBuf::from(dir))
    } else {
        None
    };

    Ok(VerifyArgs {
        offspring: PathBuf::from(offspring),
        dam: PathBuf::from(dam),
        sire: PathBuf::from(sire),
        sample_index: 0,
        min_markers: None,
        output,
        format,
    })
}
