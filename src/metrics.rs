//! Process-local counters and a latency histogram, exposed in the
//! Prometheus text format.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Fixed histogram bucket upper bounds in ms. Model calls are slow, so the
/// range is wider than a typical web handler's.
const LATENCY_BUCKETS_MS: [u64; 10] = [50, 100, 250, 500, 1000, 2500, 5000, 10000, 20000, 30000];

pub struct Metrics {
    analyze_requests_total: AtomicU64,
    analyze_success_total: AtomicU64,
    fallback_total: AtomicU64,
    input_rejected_total: AtomicU64,
    auth_failure_total: AtomicU64,
    upstream_failure_total: AtomicU64,
    validation_rejected_total: AtomicU64,
    quiz_answers_total: AtomicU64,
    quiz_correct_total: AtomicU64,
    hist_counts: Vec<AtomicU64>,
    hist_sum_ms: AtomicU64,
    hist_count: AtomicU64,
    process_start_epoch: f64,
    process_start_instant: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let start_time = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            analyze_requests_total: AtomicU64::new(0),
            analyze_success_total: AtomicU64::new(0),
            fallback_total: AtomicU64::new(0),
            input_rejected_total: AtomicU64::new(0),
            auth_failure_total: AtomicU64::new(0),
            upstream_failure_total: AtomicU64::new(0),
            validation_rejected_total: AtomicU64::new(0),
            quiz_answers_total: AtomicU64::new(0),
            quiz_correct_total: AtomicU64::new(0),
            hist_counts: LATENCY_BUCKETS_MS.iter().map(|_| AtomicU64::new(0)).collect(),
            hist_sum_ms: AtomicU64::new(0),
            hist_count: AtomicU64::new(0),
            process_start_epoch: start_time.as_secs_f64(),
            process_start_instant: Instant::now(),
        }
    }

    pub fn record_success(&self, latency_ms: u64, fallback: bool) {
        self.analyze_requests_total.fetch_add(1, Ordering::Relaxed);
        self.analyze_success_total.fetch_add(1, Ordering::Relaxed);
        if fallback {
            self.fallback_total.fetch_add(1, Ordering::Relaxed);
        }
        self.observe_latency(latency_ms);
    }

    /// `kind` is one of the labels produced by `AnalysisError::kind`.
    pub fn record_error(&self, kind: &str, latency_ms: u64) {
        self.analyze_requests_total.fetch_add(1, Ordering::Relaxed);
        let counter = match kind {
            "input_rejected" => &self.input_rejected_total,
            "auth_failure" => &self.auth_failure_total,
            "upstream_failure" => &self.upstream_failure_total,
            "validation_rejected" => &self.validation_rejected_total,
            other => {
                tracing::warn!(kind = %other, "unknown error kind, not counted");
                return;
            }
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.observe_latency(latency_ms);
    }

    pub fn record_quiz_answer(&self, correct: bool) {
        self.quiz_answers_total.fetch_add(1, Ordering::Relaxed);
        if correct {
            self.quiz_correct_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn observe_latency(&self, ms: u64) {
        self.hist_sum_ms.fetch_add(ms, Ordering::Relaxed);
        self.hist_count.fetch_add(1, Ordering::Relaxed);
        // first bucket >= value
        for (idx, ub) in LATENCY_BUCKETS_MS.iter().enumerate() {
            if ms <= *ub {
                self.hist_counts[idx].fetch_add(1, Ordering::Relaxed);
                break;
            }
        }
    }

    pub fn render(&self, active_sessions: usize) -> String {
        let mut buf = String::new();
        let counters: [(&str, &str, &AtomicU64); 9] = [
            ("irab_analyze_requests_total", "Total analyze requests processed", &self.analyze_requests_total),
            ("irab_analyze_success_total", "Analyze requests answered with a result", &self.analyze_success_total),
            ("irab_analyze_fallback_total", "Results replaced by the empty-result fallback", &self.fallback_total),
            ("irab_input_rejected_total", "Sentences rejected by local length or Arabic checks", &self.input_rejected_total),
            ("irab_auth_failure_total", "Token exchange failures", &self.auth_failure_total),
            ("irab_upstream_failure_total", "Model endpoint failures", &self.upstream_failure_total),
            ("irab_validation_rejected_total", "Sentences the model judged unanalyzable", &self.validation_rejected_total),
            ("irab_quiz_answers_total", "Quiz answers submitted", &self.quiz_answers_total),
            ("irab_quiz_correct_total", "Quiz answers judged correct", &self.quiz_correct_total),
        ];
        for (name, help, value) in counters {
            writeln!(&mut buf, "# HELP {} {}", name, help).ok();
            writeln!(&mut buf, "# TYPE {} counter", name).ok();
            writeln!(&mut buf, "{} {}", name, value.load(Ordering::Relaxed)).ok();
        }

        writeln!(
            &mut buf,
            "# HELP irab_analyze_latency_ms Analyze request latency histogram milliseconds"
        )
        .ok();
        writeln!(&mut buf, "# TYPE irab_analyze_latency_ms histogram").ok();
        let mut cumulative: u64 = 0;
        for (i, ub) in LATENCY_BUCKETS_MS.iter().enumerate() {
            cumulative += self.hist_counts[i].load(Ordering::Relaxed);
            writeln!(
                &mut buf,
                "irab_analyze_latency_ms_bucket{{le=\"{}\"}} {}",
                ub, cumulative
            )
            .ok();
        }
        let count = self.hist_count.load(Ordering::Relaxed);
        writeln!(
            &mut buf,
            "irab_analyze_latency_ms_bucket{{le=\"+Inf\"}} {}",
            count
        )
        .ok();
        writeln!(
            &mut buf,
            "irab_analyze_latency_ms_sum {}",
            self.hist_sum_ms.load(Ordering::Relaxed)
        )
        .ok();
        writeln!(&mut buf, "irab_analyze_latency_ms_count {}", count).ok();

        writeln!(
            &mut buf,
            "# HELP irab_active_sessions Sessions holding history\n# TYPE irab_active_sessions gauge"
        )
        .ok();
        writeln!(&mut buf, "irab_active_sessions {}", active_sessions).ok();
        writeln!(
            &mut buf,
            "# HELP irab_build_info Build information\n# TYPE irab_build_info gauge"
        )
        .ok();
        writeln!(
            &mut buf,
            "irab_build_info{{version=\"{}\"}} 1",
            env!("CARGO_PKG_VERSION")
        )
        .ok();
        writeln!(
            &mut buf,
            "# HELP irab_process_start_time_seconds Process start time (Unix epoch seconds)\n# TYPE irab_process_start_time_seconds gauge"
        )
        .ok();
        writeln!(
            &mut buf,
            "irab_process_start_time_seconds {}",
            self.process_start_epoch
        )
        .ok();
        writeln!(
            &mut buf,
            "# HELP irab_process_uptime_seconds Process uptime seconds\n# TYPE irab_process_uptime_seconds gauge"
        )
        .ok();
        writeln!(
            &mut buf,
            "irab_process_uptime_seconds {}",
            self.process_start_instant.elapsed().as_secs_f64()
        )
        .ok();
        buf
    }
}
