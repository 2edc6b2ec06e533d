use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting logger for pipeline orchestration events.
///
/// Decouples the use cases from specific output mechanisms (stdout, tests)
/// so batch progress and per-pass timing can be observed without changing
/// the orchestration code.
pub trait PipelineLogger: Send {
    /// Report frame-level progress within a named pass ("detect", "render").
    fn progress(&mut self, pass: &str, current: usize, total: usize);

    /// Record how long a named pass took for one file, in milliseconds.
    fn timing(&mut self, pass: &str, duration_ms: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-batch summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events. Used by tests and embedders
/// that track progress themselves.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _pass: &str, _current: usize, _total: usize) {}
    fn timing(&mut self, _pass: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger: throttled per-frame progress via the `log` facade,
/// accumulated per-pass timings, and a summary at batch completion.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    start_time: Instant,
    frames_seen: usize,
    messages: Vec<String>,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            start_time: Instant::now(),
            frames_seen: 0,
            messages: Vec::new(),
        }
    }

    /// Formatted summary, or `None` when nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.frames_seen == 0 {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Summary ({} frames, {elapsed_s:.1}s total):",
            self.frames_seen
        )];

        let mut passes: Vec<_> = self.timings.keys().collect();
        passes.sort();
        for pass in passes {
            let durations = &self.timings[pass];
            let total_ms: f64 = durations.iter().sum();
            lines.push(format!(
                "  {pass:8}: {:.1}s across {} file(s)",
                total_ms / 1000.0,
                durations.len()
            ));
        }

        if self.frames_seen > 0 && elapsed_s > 0.0 {
            lines.push(format!(
                "  Throughput: {:.1} fps",
                self.frames_seen as f64 / elapsed_s
            ));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, pass: &str) -> Option<&[f64]> {
        self.timings.get(pass).map(|v| v.as_slice())
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, pass: &str, current: usize, total: usize) {
        // Each frame passes through detect and render; count it once.
        if pass == "render" && current > 0 {
            self.frames_seen += 1;
        }
        if total > 0 && (current % self.throttle_frames == 0 || current == total) {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("{pass}: {current}/{total} frames ({pct:.1}%)");
        }
    }

    fn timing(&mut self, pass: &str, duration_ms: f64) {
        self.timings
            .entry(pass.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.progress("detect", 1, 10);
        logger.timing("detect", 5.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_records_per_pass() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("detect", 20.0);
        logger.timing("detect", 30.0);
        logger.timing("render", 5.0);

        assert_eq!(logger.timings_for("detect").unwrap().len(), 2);
        assert_eq!(logger.timings_for("render").unwrap(), &[5.0]);
        assert!(logger.timings_for("mux").is_none());
    }

    #[test]
    fn test_summary_includes_passes_and_throughput() {
        let mut logger = StdoutPipelineLogger::new(10);
        for i in 1..=100 {
            logger.progress("render", i, 100);
        }
        logger.timing("detect", 20.0);
        logger.timing("render", 5.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("detect"));
        assert!(summary.contains("render"));
        assert!(summary.contains("100 frames"));
        assert!(summary.contains("fps"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        let logger = StdoutPipelineLogger::new(10);
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_info_stores_messages() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.info("hello world");
        assert_eq!(logger.messages, vec!["hello world".to_string()]);
    }

    #[test]
    fn test_zero_throttle_clamped() {
        let logger = StdoutPipelineLogger::new(0);
        assert_eq!(logger.throttle_frames, 1);
    }
}
