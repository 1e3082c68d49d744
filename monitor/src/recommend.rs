//! Recommendation engine
//!
//! Pure, deterministic mappings from aggregate metrics to advisory strings.
//! The cut lines sit below the runtime alert thresholds so advisories show
//! up before alerts start firing.

use crate::report::ReportSummary;

/// Advisories attached to periodic reports
///
/// Any subset (including none) may fire; order is stable.
pub fn recommendations(summary: &ReportSummary) -> Vec<String> {
    let mut out = Vec::new();

    if summary.avg_cpu > 70.0 {
        out.push("CPU high; consider caching or algorithmic optimization.".to_string());
    }
    if summary.avg_memory > 70.0 {
        out.push("Memory usage high; check for leaks.".to_string());
    }
    if summary.avg_response_time_ms > 500.0 {
        out.push("Response time high; optimize data-access path.".to_string());
    }
    if summary.total_errors > 10 {
        out.push("High error count; inspect logs.".to_string());
    }

    out
}

/// Detailed optimization suggestions for the interactive `suggestions` command
///
/// Lower cut lines than [`recommendations`], each contributing a fixed group
/// of concrete follow-ups.
pub fn optimization_suggestions(summary: &ReportSummary) -> Vec<String> {
    let mut out = Vec::new();

    if summary.avg_cpu > 60.0 {
        out.extend(
            [
                "Add a Redis or in-process cache in front of hot queries",
                "Index the most frequent database queries",
                "Enable gzip compression on server responses",
                "Lazy-load non-critical frontend assets",
            ]
            .map(String::from),
        );
    }

    if summary.avg_memory > 60.0 {
        out.extend(
            [
                "Tune garbage collection and allocator settings",
                "Split oversized JavaScript bundles",
                "Paginate large list endpoints",
                "Serve images as WebP",
            ]
            .map(String::from),
        );
    }

    if summary.avg_response_time_ms > 300.0 {
        out.extend(
            [
                "Serve static assets from a CDN",
                "Enable HTTP/2 multiplexing",
                "Minify CSS and JavaScript",
                "Precache responses with service workers",
            ]
            .map(String::from),
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(cpu: f64, memory: f64, response: f64, errors: u64) -> ReportSummary {
        ReportSummary {
            avg_cpu: cpu,
            avg_memory: memory,
            avg_response_time_ms: response,
            total_errors: errors,
        }
    }

    #[test]
    fn test_all_breaches_fire_in_table_order() {
        let fired = recommendations(&summary(85.0, 75.0, 600.0, 11));
        assert_eq!(fired.len(), 4);
        assert!(fired[0].starts_with("CPU high"));
        assert!(fired[1].starts_with("Memory usage high"));
        assert!(fired[2].starts_with("Response time high"));
        assert!(fired[3].starts_with("High error count"));
    }

    #[test]
    fn test_quiet_summary_yields_no_recommendations() {
        assert!(recommendations(&summary(10.0, 20.0, 50.0, 0)).is_empty());
    }

    #[test]
    fn test_cut_lines_are_exclusive() {
        // Exactly at the cut line is healthy; recommendations need a breach.
        assert!(recommendations(&summary(70.0, 70.0, 500.0, 10)).is_empty());
        assert_eq!(recommendations(&summary(70.1, 70.0, 500.0, 10)).len(), 1);
    }

    #[test]
    fn test_recommendations_are_deterministic() {
        let input = summary(85.0, 75.0, 600.0, 11);
        assert_eq!(recommendations(&input), recommendations(&input));
        assert_eq!(
            optimization_suggestions(&input),
            optimization_suggestions(&input)
        );
    }

    #[test]
    fn test_suggestions_use_advisory_cut_lines() {
        // 65% CPU is below the alert threshold but above the advisory line.
        let fired = optimization_suggestions(&summary(65.0, 10.0, 100.0, 0));
        assert_eq!(fired.len(), 4);
        assert!(fired.iter().any(|s| s.contains("cache")));

        assert!(optimization_suggestions(&summary(10.0, 10.0, 100.0, 0)).is_empty());
    }
}
