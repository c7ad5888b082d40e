mod file_store;
mod reports;

use anyhow::{Context, Result, bail};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write, stdin, stdout};
use std::path::{Path, PathBuf};

use file_store::FileStore;
use reports::StatsReport;
use tower_tracker_core::{
    DateFormat, DecimalSeparator, Delimiter, DisplayLocale, DuplicateResolution, FormatMismatch,
    ImportFormatSettings, LocaleContext, Period, RunFilter, RunParser, RunRecord, RunStore,
    RunType, ThousandsSeparator, export_runs, filter_runs, merge_import,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DecimalArg {
    Period,
    Comma,
}

impl From<DecimalArg> for DecimalSeparator {
    fn from(arg: DecimalArg) -> Self {
        match arg {
            DecimalArg::Period => DecimalSeparator::Period,
            DecimalArg::Comma => DecimalSeparator::Comma,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ThousandsArg {
    Comma,
    Period,
    Space,
    None,
}

impl From<ThousandsArg> for ThousandsSeparator {
    fn from(arg: ThousandsArg) -> Self {
        match arg {
            ThousandsArg::Comma => ThousandsSeparator::Comma,
            ThousandsArg::Period => ThousandsSeparator::Period,
            ThousandsArg::Space => ThousandsSeparator::Space,
            ThousandsArg::None => ThousandsSeparator::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DateFormatArg {
    /// `Nov 20, 2025 14:35`
    MonthFirst,
    /// `nov. 20, 2025 14:35`
    MonthFirstLowercase,
}

impl From<DateFormatArg> for DateFormat {
    fn from(arg: DateFormatArg) -> Self {
        match arg {
            DateFormatArg::MonthFirst => DateFormat::MonthFirst,
            DateFormatArg::MonthFirstLowercase => DateFormat::MonthFirstLowercase,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ResolutionArg {
    /// Keep stored runs, drop incoming duplicates
    Skip,
    /// Replace stored runs with incoming data
    Overwrite,
}

impl From<ResolutionArg> for DuplicateResolution {
    fn from(arg: ResolutionArg) -> Self {
        match arg {
            ResolutionArg::Skip => DuplicateResolution::Skip,
            ResolutionArg::Overwrite => DuplicateResolution::Overwrite,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RunTypeArg {
    Farm,
    Tournament,
    Milestone,
}

impl From<RunTypeArg> for RunType {
    fn from(arg: RunTypeArg) -> Self {
        match arg {
            RunTypeArg::Farm => RunType::Farm,
            RunTypeArg::Tournament => RunType::Tournament,
            RunTypeArg::Milestone => RunType::Milestone,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PeriodArg {
    Day,
    Week,
    Month,
}

impl From<PeriodArg> for Period {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Day => Period::Day,
            PeriodArg::Week => Period::Week,
            PeriodArg::Month => Period::Month,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LocaleArg {
    En,
    De,
    Fr,
}

impl From<LocaleArg> for DisplayLocale {
    fn from(arg: LocaleArg) -> Self {
        match arg {
            LocaleArg::En => DisplayLocale::En,
            LocaleArg::De => DisplayLocale::De,
            LocaleArg::Fr => DisplayLocale::Fr,
        }
    }
}

/// Per-command overrides of the stored import format
#[derive(Debug, Clone, Default, ClapArgs)]
struct FormatOverrides {
    /// Decimal separator used by the input
    #[arg(long, value_enum)]
    decimal: Option<DecimalArg>,

    /// Thousands separator used by the input
    #[arg(long, value_enum)]
    thousands: Option<ThousandsArg>,

    /// Shape of battle dates in the input
    #[arg(long, value_enum)]
    date_format: Option<DateFormatArg>,
}

impl FormatOverrides {
    fn apply(&self, mut settings: ImportFormatSettings) -> ImportFormatSettings {
        if let Some(decimal) = self.decimal {
            settings.decimal_separator = decimal.into();
        }
        if let Some(thousands) = self.thousands {
            settings.thousands_separator = thousands.into();
        }
        if let Some(date_format) = self.date_format {
            settings.date_format = date_format.into();
        }
        settings
    }

    const fn is_empty(&self) -> bool {
        self.decimal.is_none() && self.thousands.is_none() && self.date_format.is_none()
    }
}

#[derive(Debug, Clone, ClapArgs)]
struct InputArgs {
    /// Battle report or delimited file to read (`-` for stdin)
    file: PathBuf,

    /// Treat the input as delimited text with a header row
    #[arg(long)]
    csv: bool,

    /// Column delimiter: tab, comma, semicolon or a single character (detected when omitted)
    #[arg(long)]
    delimiter: Option<String>,

    #[command(flatten)]
    format: FormatOverrides,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import runs into the store, resolving duplicates
    Import {
        #[command(flatten)]
        input: InputArgs,

        /// What to do with runs already in the store
        #[arg(long, value_enum, default_value_t = ResolutionArg::Skip)]
        resolution: ResolutionArg,
    },
    /// Parse input without storing it and report format mismatches
    Check {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Summarize stored runs
    Stats {
        /// Only include runs of this type
        #[arg(long, value_enum)]
        run_type: Option<RunTypeArg>,

        /// Only include runs at this tier
        #[arg(long)]
        tier: Option<u32>,

        /// Bucket size for the period table
        #[arg(long, value_enum, default_value_t = PeriodArg::Day)]
        period: PeriodArg,

        /// Output report format
        #[arg(long, default_value = "console")]
        #[arg(value_parser = ["console", "json", "markdown"])]
        report: String,

        /// Optional path to write the report instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write stored runs as delimited text
    Export {
        /// Column delimiter: tab, comma, semicolon or a single character
        #[arg(long, default_value = "comma")]
        delimiter: String,

        /// Optional path to write instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show or update stored import and display settings
    Settings {
        #[command(flatten)]
        format: FormatOverrides,

        /// Locale used for report numbers and dates
        #[arg(long, value_enum)]
        locale: Option<LocaleArg>,

        /// Show large numbers as shorthand (`43.91T`)
        #[arg(long)]
        shorthand: Option<bool>,
    },
}

#[derive(Debug, Parser)]
#[command(name = "tower-tracker", version)]
#[command(about = "Import, deduplicate and summarize The Tower battle reports")]
struct Args {
    /// Directory holding the run store and settings
    #[arg(long, global = true, default_value = "tower-tracker-data")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let store = RunStore::new(FileStore::new(&args.store));

    match args.command {
        Command::Import { input, resolution } => run_import(&store, &input, resolution.into()),
        Command::Check { input } => run_check(&store, &input),
        Command::Stats {
            run_type,
            tier,
            period,
            report,
            output,
        } => {
            let filter = RunFilter {
                run_type: run_type.map(Into::into),
                tier,
                ..RunFilter::default()
            };
            run_stats(&store, &filter, period.into(), &report, output)
        }
        Command::Export { delimiter, output } => run_export(&store, &delimiter, output),
        Command::Settings {
            format,
            locale,
            shorthand,
        } => run_settings(&store, &format, locale, shorthand),
    }
}

fn announce_banner() {
    println!("{}", "🗼 Tower Tracker".bright_cyan().bold());
    println!("{}", "================".cyan());
}

fn parse_delimiter(raw: &str) -> Delimiter {
    if raw == "\t" {
        return Delimiter::Tab;
    }
    match raw.trim().to_ascii_lowercase().as_str() {
        "tab" | "\\t" => Delimiter::Tab,
        "comma" | "," => Delimiter::Comma,
        "semicolon" | ";" => Delimiter::Semicolon,
        _ => Delimiter::Custom(raw.to_string()),
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

struct ParsedInput {
    runs: Vec<RunRecord>,
    failed: usize,
    errors: Vec<String>,
    format_mismatch: FormatMismatch,
}

fn parse_input(
    store: &RunStore<FileStore>,
    input: &InputArgs,
) -> Result<(ParsedInput, ImportFormatSettings)> {
    let stored = store
        .import_settings()
        .context("failed to load import settings")?;
    let settings = input.format.apply(stored);
    let text = read_input(&input.file)?;
    let parser = RunParser::new(settings, chrono::Local::now().naive_local());

    let parsed = if input.csv || input.delimiter.is_some() {
        let delimiter = input
            .delimiter
            .as_deref()
            .map_or_else(|| Delimiter::detect(&text), parse_delimiter);
        log::debug!("parsing delimited input with {delimiter:?}");
        let result = parser.parse_delimited(&text, &delimiter);
        ParsedInput {
            runs: result.success,
            failed: result.failed,
            errors: result.errors,
            format_mismatch: result.format_mismatch,
        }
    } else {
        let result = parser.parse_clipboard(&text);
        ParsedInput {
            failed: usize::from(result.run.is_none()),
            runs: result.run.into_iter().collect(),
            errors: result.errors,
            format_mismatch: result.format_mismatch,
        }
    };
    Ok((parsed, settings))
}

fn report_mismatch(mismatch: &FormatMismatch, settings: &ImportFormatSettings) {
    if mismatch.number_mismatch
        && let Some(detected) = mismatch.detected_decimal_separator
    {
        println!(
            "{} numbers use {} as decimal separator but settings expect {}",
            "⚠️ ".yellow(),
            detected,
            settings.decimal_separator
        );
    }
    if mismatch.date_mismatch
        && let Some(detected) = mismatch.detected_date_format
    {
        println!(
            "{} dates look like {} but settings expect {}",
            "⚠️ ".yellow(),
            detected,
            settings.date_format
        );
    }
    if mismatch.any() {
        println!(
            "   Adjust with {}",
            "tower-tracker settings --decimal/--date-format".bold()
        );
    }
}

fn report_errors(errors: &[String]) {
    for error in errors {
        eprintln!("   • {}", error.red());
    }
}

fn run_import(
    store: &RunStore<FileStore>,
    input: &InputArgs,
    resolution: DuplicateResolution,
) -> Result<()> {
    announce_banner();
    let (parsed, settings) = parse_input(store, input)?;
    report_mismatch(&parsed.format_mismatch, &settings);
    report_errors(&parsed.errors);

    if parsed.runs.is_empty() {
        println!("No runs imported.");
        return Ok(());
    }

    let existing = store.load_runs().context("failed to load stored runs")?;
    let outcome = merge_import(&existing, &parsed.runs, resolution);
    store
        .save_runs(&outcome.runs)
        .context("failed to save runs")?;

    println!("✅ Added: {}", outcome.added.to_string().green());
    if outcome.overwritten > 0 {
        println!("♻️  Overwritten: {}", outcome.overwritten.to_string().yellow());
    }
    if outcome.skipped > 0 {
        println!("⏭️  Skipped duplicates: {}", outcome.skipped.to_string().yellow());
    }
    if parsed.failed > 0 {
        println!("❌ Failed rows: {}", parsed.failed.to_string().red());
    }
    println!("Stored runs: {}", outcome.runs.len());
    Ok(())
}

fn run_check(store: &RunStore<FileStore>, input: &InputArgs) -> Result<()> {
    announce_banner();
    let (parsed, settings) = parse_input(store, input)?;
    println!(
        "Parsed {} run(s), {} failed",
        parsed.runs.len(),
        parsed.failed
    );
    report_errors(&parsed.errors);
    if parsed.format_mismatch.any() {
        report_mismatch(&parsed.format_mismatch, &settings);
    } else {
        println!("{}", "Input matches the configured import format.".green());
    }
    Ok(())
}

fn run_stats(
    store: &RunStore<FileStore>,
    filter: &RunFilter,
    period: Period,
    report: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let runs = store.load_runs().context("failed to load stored runs")?;
    let runs = filter_runs(&runs, filter);
    let display = store
        .display_settings()
        .context("failed to load display settings")?;
    let locale = LocaleContext::new(display.locale);
    let stats = StatsReport::build(&runs, period);

    let mut output_target = OutputTarget::new(output)?;
    match report {
        "json" => reports::generate_json_report(&mut output_target, &stats)?,
        "markdown" => {
            reports::generate_markdown_report(&mut output_target, &stats, &locale, &display)?;
        }
        _ => reports::generate_console_report(&mut output_target, &stats, &locale, &display)?,
    }
    output_target.flush_inner()?;
    Ok(())
}

fn run_export(store: &RunStore<FileStore>, delimiter: &str, output: Option<PathBuf>) -> Result<()> {
    let runs = store.load_runs().context("failed to load stored runs")?;
    let text = export_runs(&runs, &parse_delimiter(delimiter)).context("failed to export runs")?;
    let mut output_target = OutputTarget::new(output)?;
    output_target.write_all(text.as_bytes())?;
    output_target.flush_inner()?;
    Ok(())
}

fn run_settings(
    store: &RunStore<FileStore>,
    format: &FormatOverrides,
    locale: Option<LocaleArg>,
    shorthand: Option<bool>,
) -> Result<()> {
    let mut import = store
        .import_settings()
        .context("failed to load import settings")?;
    let mut display = store
        .display_settings()
        .context("failed to load display settings")?;

    if !format.is_empty() {
        import = format.apply(import);
        if import.thousands_separator.as_char() == Some(import.decimal_separator.as_char()) {
            bail!("thousands and decimal separators must differ");
        }
        store
            .save_import_settings(&import)
            .context("failed to save import settings")?;
    }
    if locale.is_some() || shorthand.is_some() {
        if let Some(locale) = locale {
            display.locale = locale.into();
        }
        if let Some(shorthand) = shorthand {
            display.use_shorthand = shorthand;
        }
        store
            .save_display_settings(&display)
            .context("failed to save display settings")?;
    }

    println!("{}", "⚙️  Settings".bright_cyan().bold());
    println!("Store: {}", store.backend().root().display());
    println!("Decimal separator: {}", import.decimal_separator);
    println!(
        "Thousands separator: {}",
        import
            .thousands_separator
            .as_char()
            .map_or_else(|| "none".to_string(), |c| format!("{c:?}"))
    );
    println!("Date format: {}", import.date_format);
    println!("Locale: {} ({})", display.locale.name(), display.locale);
    println!("Shorthand numbers: {}", display.use_shorthand);
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_names() {
        assert_eq!(parse_delimiter("tab"), Delimiter::Tab);
        assert_eq!(parse_delimiter(";"), Delimiter::Semicolon);
        assert_eq!(parse_delimiter("Comma"), Delimiter::Comma);
        assert_eq!(parse_delimiter("|"), Delimiter::Custom("|".to_string()));
    }

    #[test]
    fn overrides_only_touch_given_fields() {
        let overrides = FormatOverrides {
            decimal: Some(DecimalArg::Comma),
            thousands: Some(ThousandsArg::Period),
            ..FormatOverrides::default()
        };
        let applied = overrides.apply(ImportFormatSettings::default());
        assert_eq!(applied.decimal_separator, DecimalSeparator::Comma);
        assert_eq!(applied.thousands_separator, ThousandsSeparator::Period);
        assert_eq!(applied.date_format, DateFormat::MonthFirst);
        assert!(FormatOverrides::default().is_empty());
    }

    #[test]
    fn args_parse_subcommands() {
        let args = Args::parse_from([
            "tower-tracker",
            "--store",
            "/tmp/runs",
            "import",
            "report.txt",
            "--resolution",
            "overwrite",
            "--decimal",
            "comma",
        ]);
        assert_eq!(args.store, PathBuf::from("/tmp/runs"));
        match args.command {
            Command::Import { input, resolution } => {
                assert_eq!(resolution, ResolutionArg::Overwrite);
                assert_eq!(input.format.decimal, Some(DecimalArg::Comma));
                assert!(!input.csv);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
