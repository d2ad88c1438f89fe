use std::time::{Duration, Instant};

/// Running counters for one monitoring session, reported at shutdown.
#[derive(Debug)]
pub struct SessionStats {
    start_time: Instant,
    pub ticks: u64,
    pub missed_frames: u64,
    pub inference_failures: u64,
    pub activations: u64,
    pub deactivations: u64,
    pub action_failures: u64,
    pub max_faces: usize,
    latency_total_ms: f64,
    latency_samples: u64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::started_at(Instant::now())
    }

    pub fn started_at(start_time: Instant) -> Self {
        Self {
            start_time,
            ticks: 0,
            missed_frames: 0,
            inference_failures: 0,
            activations: 0,
            deactivations: 0,
            action_failures: 0,
            max_faces: 0,
            latency_total_ms: 0.0,
            latency_samples: 0,
        }
    }

    /// Records one counted frame.
    pub fn counted(&mut self, face_count: usize, latency: Duration) {
        self.max_faces = self.max_faces.max(face_count);
        self.latency_total_ms += latency.as_secs_f64() * 1000.0;
        self.latency_samples += 1;
    }

    pub fn average_latency_ms(&self) -> Option<f64> {
        if self.latency_samples == 0 {
            return None;
        }
        Some(self.latency_total_ms / self.latency_samples as f64)
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn summary_string(&self) -> String {
        let mut lines = vec![format!(
            "Session summary ({} ticks, {:.1}s):",
            self.ticks,
            self.elapsed().as_secs_f64()
        )];
        lines.push(format!("  Missed frames     : {}", self.missed_frames));
        lines.push(format!("  Inference failures: {}", self.inference_failures));
        lines.push(format!("  Most faces seen   : {}", self.max_faces));
        lines.push(format!(
            "  Privacy           : {} entered, {} cleared",
            self.activations, self.deactivations
        ));
        lines.push(format!("  Action failures   : {}", self.action_failures));
        if let Some(avg) = self.average_latency_ms() {
            lines.push(format!("  Count latency     : avg {avg:.1}ms"));
        }
        lines.join("\n")
    }

    pub fn log_summary(&self) {
        log::info!("\n\n{}", self.summary_string());
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_average_latency() {
        let mut stats = SessionStats::new();
        assert!(stats.average_latency_ms().is_none());

        stats.counted(1, Duration::from_millis(10));
        stats.counted(3, Duration::from_millis(30));
        assert_relative_eq!(stats.average_latency_ms().unwrap(), 20.0, epsilon = 1e-9);
        assert_eq!(stats.max_faces, 3);
    }

    #[test]
    fn test_latency_storage_stays_constant_over_long_sessions() {
        let mut stats = SessionStats::new();
        for _ in 0..100_000 {
            stats.counted(1, Duration::from_millis(4));
        }
        assert_eq!(stats.latency_samples, 100_000);
        assert_relative_eq!(stats.average_latency_ms().unwrap(), 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_summary_lists_counters() {
        let mut stats = SessionStats::new();
        stats.ticks = 12;
        stats.missed_frames = 2;
        stats.activations = 1;
        stats.deactivations = 1;
        stats.counted(2, Duration::from_millis(5));

        let summary = stats.summary_string();
        assert!(summary.starts_with("Session summary (12 ticks"));
        assert!(summary.contains("Missed frames     : 2"));
        assert!(summary.contains("1 entered, 1 cleared"));
        assert!(summary.contains("avg 5.0ms"));
    }

    #[test]
    fn test_summary_omits_latency_without_counts() {
        let summary = SessionStats::new().summary_string();
        assert!(!summary.contains("latency"));
    }
}
