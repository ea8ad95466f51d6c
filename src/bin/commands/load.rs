use anyhow::{anyhow, Result};
use halfway::lens::batch::{
    BatchLens, BatchLoadArgs, BatchProgress, BatchProgressCallback, LoadReport, TableLoad,
};
use halfway::lens::utils::OutputFormat;
use halfway::HalfwayConfig;
use std::sync::Arc;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ReportRow {
    file: String,
    table: String,
    status: String,
    rows: String,
    error: String,
}

impl From<&TableLoad> for ReportRow {
    fn from(t: &TableLoad) -> Self {
        Self {
            file: t.file.clone(),
            table: t.table.clone(),
            status: t.status.to_string(),
            rows: t.rows.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()),
            error: t.error.clone().unwrap_or_default(),
        }
    }
}

pub fn run(config: &HalfwayConfig, args: BatchLoadArgs, output_format: OutputFormat) -> Result<()> {
    let settings = args.resolve(config)?;
    let lens = BatchLens::new(settings);

    let pb = progress_bar();
    let report = lens.run_with_progress(Some(progress_callback(pb.clone())));
    pb.finish_and_clear();
    let report = report?;

    format_output(&report, output_format)?;

    if report.has_failures() {
        return Err(anyhow!(
            "{} of {} files failed to load",
            report.failed().len(),
            report.tables.len()
        ));
    }
    Ok(())
}

fn progress_bar() -> indicatif::ProgressBar {
    let pb = indicatif::ProgressBar::new(0);
    if let Ok(sty) =
        indicatif::ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>4}/{len:4} {msg}")
    {
        pb.set_style(sty.progress_chars("##-"));
    }
    pb
}

fn progress_callback(pb: indicatif::ProgressBar) -> BatchProgressCallback {
    Arc::new(move |progress: BatchProgress| match progress {
        BatchProgress::Resetting { output } => pb.set_message(format!("resetting {}", output)),
        BatchProgress::Discovered { total } => pb.set_length(total as u64),
        BatchProgress::Loading { table, .. } => pb.set_message(table),
        BatchProgress::Loaded { .. } | BatchProgress::Failed { .. } => pb.inc(1),
        BatchProgress::Complete { .. } => pb.set_message("done"),
    })
}

fn format_output(report: &LoadReport, output_format: OutputFormat) -> Result<()> {
    match output_format {
        OutputFormat::Table | OutputFormat::Markdown => {
            if report.tables.is_empty() {
                println!("No CSV files found; created empty database {}", report.output);
                return Ok(());
            }
            let rows: Vec<ReportRow> = report.tables.iter().map(ReportRow::from).collect();
            let mut table = Table::new(rows);
            if output_format == OutputFormat::Markdown {
                table.with(Style::markdown());
            } else {
                table.with(Style::rounded());
            }
            println!("{}", table);
            println!(
                "{} table(s), {} row(s) loaded into {} in {:.2}s",
                report.loaded_count(),
                report.total_rows(),
                report.output,
                report.duration_secs()
            );
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            println!("{}", output_format.to_json(report)?);
        }
        OutputFormat::JsonLine => {
            for t in &report.tables {
                println!("{}", output_format.to_json(t)?);
            }
        }
        OutputFormat::Psv => {
            println!("file|table|status|rows|error");
            for t in &report.tables {
                let row = ReportRow::from(t);
                println!(
                    "{}|{}|{}|{}|{}",
                    row.file, row.table, row.status, row.rows, row.error
                );
            }
        }
    }
    Ok(())
}
