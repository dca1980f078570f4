use std::time::{Duration, Instant};

use crate::convert_engine::ConversionOutcome;
use super::app::App;
use super::models::ProcessingStatus;

/// Pause between files so the progress list is readable.
const STEP_DELAY: Duration = Duration::from_millis(100);

impl App {
    pub fn start_processing(&mut self) {
        if self.engine.is_none() || self.running || self.finished || self.files.is_empty() {
            return;
        }
        self.running = true;
        self.start_time = Some(Instant::now());
        self.current_processing = Some(0);
        self.files[0].status = ProcessingStatus::Converting;
    }

    /// Convert the file at `current_processing` and move on to the next one.
    pub async fn process_next(&mut self) {
        let (Some(engine), Some(index)) = (&self.engine, self.current_processing) else {
            return;
        };
        let total_files = self.files.len();

        let result = engine
            .convert_claimed(&self.files[index].source, &mut self.claims)
            .await;
        self.stats.record(&result.outcome);

        let item = &mut self.files[index];
        match &result.outcome {
            ConversionOutcome::Converted => item.status = ProcessingStatus::Converted,
            ConversionOutcome::Skipped => item.status = ProcessingStatus::Skipped,
            ConversionOutcome::Failed(e) => {
                item.status = ProcessingStatus::Failed;
                item.error_message = Some(e.to_string());
            }
        }

        self.processed += 1;
        self.processing_progress = self.processed as f64 / total_files as f64;

        if index + 1 < total_files {
            self.current_processing = Some(index + 1);
            self.files[index + 1].status = ProcessingStatus::Converting;
            tokio::time::sleep(STEP_DELAY).await;
        } else {
            self.current_processing = None;
            self.processing_progress = 1.0;
            self.running = false;
            self.finished = true;
            self.show_summary = true;
        }
    }
}
