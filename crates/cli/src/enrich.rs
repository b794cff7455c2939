// enrich / validate commands

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use serde_json::Value;

use geodash_config::Settings;
use geodash_enrich::{
    enrich_with_report, region_names, style_document, DuplicatePolicy, EnrichOptions,
    EnrichReport, StyleOptions,
};

use crate::util::render_table;
use crate::CliError;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DuplicateArg {
    /// Use the first record in table order
    #[value(alias = "first-match")]
    First,
    /// Fail when two records share a key
    Error,
}

impl From<DuplicateArg> for DuplicatePolicy {
    fn from(arg: DuplicateArg) -> Self {
        match arg {
            DuplicateArg::First => DuplicatePolicy::FirstMatch,
            DuplicateArg::Error => DuplicatePolicy::Error,
        }
    }
}

#[derive(Args)]
pub struct EnrichArgs {
    /// GeoJSON boundary file
    boundary: PathBuf,

    /// Attribute table (csv, tsv, xlsx, ods)
    table: PathBuf,

    /// Sheet name for multi-sheet workbooks
    #[arg(long)]
    sheet: Option<String>,

    /// Feature property holding the region name [settings: map.joinKey]
    #[arg(long, short = 'k')]
    key: Option<String>,

    /// Table column holding the region name [settings: map.tableKey]
    #[arg(long)]
    table_key: Option<String>,

    /// Table column holding the value [settings: map.valueField]
    #[arg(long)]
    value: Option<String>,

    /// Property to write into each feature (default: the value column name)
    #[arg(long)]
    target: Option<String>,

    /// Value for regions with no record [settings: map.defaultValue]
    #[arg(long, allow_negative_numbers = true)]
    default: Option<f64>,

    /// What to do when two records share a key [settings: map.onDuplicate]
    #[arg(long, value_enum)]
    on_duplicate: Option<DuplicateArg>,

    /// Add fill_color and tooltip properties for rendering
    #[arg(long)]
    fill: bool,

    /// Output file (omit for stdout)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Pretty-print the document
    #[arg(long)]
    pretty: bool,

    /// Print the match report as JSON to stderr
    #[arg(long)]
    report: bool,

    /// Suppress the summary line
    #[arg(long, short = 'q')]
    quiet: bool,
}

/// Settings first, flags on top.
fn build_options(args: &EnrichArgs, settings: &Settings) -> Result<EnrichOptions, CliError> {
    let mut opts = settings.enrich_options();
    if let Some(key) = &args.key {
        opts.join_key_field = key.clone();
    }
    if let Some(table_key) = &args.table_key {
        opts.table_key_field = Some(table_key.clone());
    }
    if let Some(value) = &args.value {
        opts.value_field = value.clone();
    }
    if let Some(target) = &args.target {
        opts.target_field = Some(target.clone());
    }
    if let Some(default) = args.default {
        opts.default_value = default;
    }
    if let Some(policy) = args.on_duplicate {
        opts.on_duplicate = policy.into();
    }

    if !opts.default_value.is_finite() {
        return Err(CliError::usage(format!("--default must be a finite number, got {}", opts.default_value))
            .with_hint("use a number such as 0 or -1"));
    }
    Ok(opts)
}

pub fn cmd_enrich(args: EnrichArgs, settings: &Settings) -> Result<(), CliError> {
    let opts = build_options(&args, settings)?;

    let boundary = geodash_io::load_boundary(&args.boundary).map_err(CliError::input)?;
    let table = geodash_io::load_attribute_table(&args.table, args.sheet.as_deref())
        .map_err(CliError::input)?;
    log::info!(
        "joining {}.{} onto {} by {}",
        args.table.display(),
        opts.value_field,
        args.boundary.display(),
        opts.join_key_field
    );

    let enriched = enrich_with_report(&boundary, &table, &opts).map_err(CliError::enrich)?;
    log_report(&enriched.report);

    let document = if args.fill {
        let style = StyleOptions {
            name_field: opts.join_key_field.clone(),
            value_field: opts.effective_target().to_string(),
            ramp: settings.fill_ramp(),
        };
        style_document(&enriched.document, &style).map_err(CliError::enrich)?
    } else {
        enriched.document
    };

    write_output(&document, args.output.as_ref(), args.pretty || settings.pretty)?;

    if args.report {
        let json = serde_json::to_string_pretty(&enriched.report)
            .map_err(|e| CliError::general(e.to_string()))?;
        eprintln!("{}", json);
    }
    if !args.quiet {
        eprintln!("{}", summary_line(&enriched.report));
    }
    Ok(())
}

fn log_report(report: &EnrichReport) {
    for dup in &report.duplicate_keys {
        let records: Vec<String> = dup.records.iter().map(|r| r.to_string()).collect();
        log::warn!(
            "duplicate key '{}' in records {}; using record {}",
            dup.key,
            records.join(", "),
            dup.records[0]
        );
    }
    if !report.unused_keys.is_empty() {
        log::info!("table keys with no region: {}", report.unused_keys.join(", "));
    }
    if !report.unmatched_regions.is_empty() {
        log::debug!("regions given the default: {}", report.unmatched_regions.join(", "));
    }
}

pub(crate) fn summary_line(report: &EnrichReport) -> String {
    let mut line = format!(
        "enriched {} features: {} matched, {} defaulted",
        report.feature_count, report.matched, report.defaulted
    );
    if !report.duplicate_keys.is_empty() {
        line.push_str(&format!(", {} duplicate keys", report.duplicate_keys.len()));
    }
    line
}

fn write_output(doc: &Value, output: Option<&PathBuf>, pretty: bool) -> Result<(), CliError> {
    match output {
        Some(path) => geodash_io::save_document(doc, path, pretty)
            .map_err(|e| CliError::output(format!("cannot write {}: {}", path.display(), e))),
        None => {
            let stdout = io::stdout();
            let handle = stdout.lock();
            match geodash_io::write_document(doc, handle, pretty) {
                Ok(()) => Ok(()),
                // Downstream closed the pipe (e.g. `| head`)
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                Err(e) => Err(CliError::output(format!("cannot write to stdout: {}", e))),
            }
        }
    }
}

pub fn cmd_validate(
    boundary: PathBuf,
    key: Option<String>,
    json: bool,
    settings: &Settings,
) -> Result<(), CliError> {
    let key = key.unwrap_or_else(|| settings.join_key.clone());
    let doc = geodash_io::load_boundary(&boundary).map_err(CliError::input)?;
    let names = region_names(&doc, &key).map_err(CliError::enrich)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = if json {
        let body = serde_json::json!({ "features": names.len(), "key": key, "regions": names });
        writeln!(out, "{}", body)
    } else {
        let rows: Vec<Vec<String>> =
            names.iter().enumerate().map(|(i, n)| vec![i.to_string(), n.clone()]).collect();
        write!(out, "{}", render_table(&["feature", key.as_str()], &rows, &[0]))
            .and_then(|_| writeln!(out, "ok: {} features", names.len()))
    };
    written.map_err(|e| CliError::output(e.to_string()))
}
