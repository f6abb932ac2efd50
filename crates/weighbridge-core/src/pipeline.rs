//! End-to-end processing of one uploaded document.

use std::time::Instant;

use chrono::{Local, NaiveDateTime};
use tracing::{error, info};

use crate::batch::BatchAggregator;
use crate::error::Result;
use crate::models::config::WeighbridgeConfig;
use crate::ocr::{create_engine, OcrEngine};
use crate::pdf::{create_rasterizer, PageRasterizer};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::report::{ReportBuilder, ReportStore};

/// How a pipeline run ended. Mirrors the terminal progress event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// A report was written.
    Complete { tickets: usize, filename: String },
    /// Processing stopped; no report was written.
    Failed { message: String },
}

impl PipelineOutcome {
    /// Terminal progress event for this outcome.
    pub fn to_event(&self) -> ProgressEvent {
        match self {
            Self::Complete { tickets, filename } => ProgressEvent::Complete {
                tickets: *tickets,
                filename: filename.clone(),
            },
            Self::Failed { message } => ProgressEvent::Error {
                message: message.clone(),
            },
        }
    }
}

/// PDF bytes in, report file plus progress events out.
pub struct TicketPipeline {
    rasterizer: Box<dyn PageRasterizer>,
    ocr: Box<dyn OcrEngine>,
    builder: ReportBuilder,
    store: ReportStore,
    dpi: u32,
}

impl TicketPipeline {
    /// Assemble a pipeline from explicit collaborators.
    pub fn new(
        rasterizer: Box<dyn PageRasterizer>,
        ocr: Box<dyn OcrEngine>,
        builder: ReportBuilder,
        store: ReportStore,
        dpi: u32,
    ) -> Self {
        Self {
            rasterizer,
            ocr,
            builder,
            store,
            dpi,
        }
    }

    /// Build the collaborators selected by configuration.
    pub fn from_config(config: &WeighbridgeConfig) -> Result<Self> {
        let rasterizer = create_rasterizer(&config.pdf);
        let ocr = create_engine(&config.ocr)?;
        let store = ReportStore::open(&config.report.output_dir)?;

        Ok(Self::new(
            rasterizer,
            ocr,
            ReportBuilder::new(config.report.format),
            store,
            config.pdf.render_dpi,
        ))
    }

    /// Store the reports are written to.
    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    /// Process one document.
    ///
    /// Every failure is reported through the sink as exactly one terminal
    /// `error` event; success ends with exactly one `complete` event.
    pub fn run(&self, pdf: &[u8], sink: &mut dyn ProgressSink) -> PipelineOutcome {
        self.run_at(pdf, sink, Local::now().naive_local())
    }

    fn run_at(
        &self,
        pdf: &[u8],
        sink: &mut dyn ProgressSink,
        generated_at: NaiveDateTime,
    ) -> PipelineOutcome {
        let start = Instant::now();

        let outcome = match self.try_run(pdf, sink, generated_at) {
            Ok((tickets, filename)) => {
                info!(
                    "Processed document: {} tickets -> {} in {}ms",
                    tickets,
                    filename,
                    start.elapsed().as_millis()
                );
                PipelineOutcome::Complete { tickets, filename }
            }
            Err(e) => {
                error!("Processing failed: {}", e);
                PipelineOutcome::Failed {
                    message: e.to_string(),
                }
            }
        };

        sink.emit(outcome.to_event());
        outcome
    }

    fn try_run(
        &self,
        pdf: &[u8],
        sink: &mut dyn ProgressSink,
        generated_at: NaiveDateTime,
    ) -> Result<(usize, String)> {
        let pages = self.rasterizer.rasterize(pdf, self.dpi)?;
        info!("Rasterized {} pages at {} dpi", pages.len(), self.dpi);

        let batch = BatchAggregator::new(self.ocr.as_ref()).run(&pages, sink)?;
        let filename = self.builder.write(batch.records(), &self.store, generated_at)?;

        Ok((batch.len(), filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportFormat;
    use crate::testing::{ticket_text, FakeRasterizer, ScriptedOcr};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn pipeline(pages: usize, ocr: ScriptedOcr, dir: &std::path::Path) -> TicketPipeline {
        TicketPipeline::new(
            Box::new(FakeRasterizer { pages }),
            Box::new(ocr),
            ReportBuilder::new(ReportFormat::Csv),
            ReportStore::open(dir).unwrap(),
            300,
        )
    }

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 5)
            .unwrap()
            .and_hms_opt(10, 15, 0)
            .unwrap()
    }

    fn run(pipeline: &TicketPipeline) -> (PipelineOutcome, Vec<ProgressEvent>) {
        let mut events = Vec::new();
        let mut sink = |e: ProgressEvent| events.push(e);
        let outcome = pipeline.run_at(b"%PDF-1.4", &mut sink, generated_at());
        (outcome, events)
    }

    #[test]
    fn test_two_page_document() {
        let dir = tempfile::tempdir().unwrap();
        let ocr = ScriptedOcr::new([
            "Ticket No: 2024-P123456789\nDate: 05-Jan-2025\nGROSS 1000 kg TARE 200 kg NET 800 kg\nSTREET CLEANING".to_string(),
            "blank".to_string(),
        ]);
        let pipeline = pipeline(2, ocr, dir.path());

        let (outcome, events) = run(&pipeline);

        let filename = "suez-glossop-tickets-20250105-101500.csv".to_string();
        assert_eq!(
            events,
            vec![
                ProgressEvent::Processing { page: 1, total: 2, found: 1 },
                ProgressEvent::Processing { page: 2, total: 2, found: 1 },
                ProgressEvent::Complete { tickets: 1, filename: filename.clone() },
            ]
        );
        assert_eq!(outcome, PipelineOutcome::Complete { tickets: 1, filename: filename.clone() });

        let report = std::fs::read_to_string(pipeline.store().locate(&filename).unwrap()).unwrap();
        assert!(report.contains(",Street/Litter,05/01/2025,Sunday,1000,200,800,,,,P123456789"));
    }

    #[test]
    fn test_implausible_year_keeps_document() {
        let dir = tempfile::tempdir().unwrap();
        let ocr = ScriptedOcr::new([
            ticket_text("123456789", "05-Jan-2025", 1000, 200, 800, "compost"),
            ticket_text("987654321", "05-Jan-1025", 900, 300, 600, ""),
        ]);
        let pipeline = TicketPipeline::new(
            Box::new(FakeRasterizer { pages: 2 }),
            Box::new(ocr),
            ReportBuilder::new(ReportFormat::Xlsx),
            ReportStore::open(dir.path()).unwrap(),
            300,
        );

        let (outcome, _) = run(&pipeline);

        assert_eq!(
            outcome,
            PipelineOutcome::Complete {
                tickets: 2,
                filename: "suez-glossop-tickets-20250105-101500.xlsx".to_string(),
            }
        );
    }

    #[test]
    fn test_no_tickets_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(1, ScriptedOcr::new(["nothing useful"]), dir.path());

        let (outcome, events) = run(&pipeline);

        assert_eq!(
            outcome,
            PipelineOutcome::Failed { message: "No tickets found".to_string() }
        );
        assert_eq!(
            events.last(),
            Some(&ProgressEvent::Error { message: "No tickets found".to_string() })
        );
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_rasterizer_failure_is_single_error_event() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(0, ScriptedOcr::new(Vec::<String>::new()), dir.path());

        let (outcome, events) = run(&pipeline);

        assert!(matches!(outcome, PipelineOutcome::Failed { .. }));
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ProgressEvent::Error { .. }));
    }

    #[test]
    fn test_ocr_failure_mid_document() {
        let dir = tempfile::tempdir().unwrap();
        let ocr = ScriptedOcr {
            texts: vec![
                Some(ticket_text("123456789", "05-Jan-2025", 1000, 200, 800, "")),
                None,
            ],
        };
        let pipeline = pipeline(2, ocr, dir.path());

        let (_, events) = run(&pipeline);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], ProgressEvent::Processing { page: 1, total: 2, found: 1 });
        assert!(matches!(events[1], ProgressEvent::Error { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
