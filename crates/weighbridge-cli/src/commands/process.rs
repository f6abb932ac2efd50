//! Process command - extract tickets from a single PDF file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use weighbridge_core::models::config::RasterizerKind;
use weighbridge_core::{PipelineOutcome, ProgressEvent, ReportFormat, TicketPipeline};

use super::config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Directory the report is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Use the scan image embedded in each page instead of pdftoppm
    #[arg(long)]
    embedded_images: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Excel workbook
    Xlsx,
    /// CSV file
    Csv,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Xlsx => ReportFormat::Xlsx,
            OutputFormat::Csv => ReportFormat::Csv,
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = config::load(config_path)?;
    if let Some(dir) = &args.output_dir {
        config.report.output_dir = dir.clone();
    }
    if let Some(format) = args.format {
        config.report.format = format.into();
    }
    if args.embedded_images {
        config.pdf.rasterizer = RasterizerKind::Embedded;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());
    let data = fs::read(&args.input)?;
    let pipeline = TicketPipeline::from_config(&config)?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );
    pb.set_message("Rendering pages...");

    let mut sink = |event: ProgressEvent| {
        if let ProgressEvent::Processing { page, total, found } = event {
            pb.set_length(total as u64);
            pb.set_position(page as u64);
            pb.set_message(format!("{} tickets found", found));
        }
    };
    let outcome = pipeline.run(&data, &mut sink);
    pb.finish_and_clear();

    if args.json {
        println!("{}", outcome.to_event().to_json());
    }

    debug!("Total processing time: {:?}", start.elapsed());

    match outcome {
        PipelineOutcome::Complete { tickets, filename } => {
            if !args.json {
                println!(
                    "{} {} tickets written to {}",
                    style("✓").green(),
                    tickets,
                    pipeline.store().dir().join(&filename).display()
                );
            }
            Ok(())
        }
        PipelineOutcome::Failed { message } => anyhow::bail!(message),
    }
}
