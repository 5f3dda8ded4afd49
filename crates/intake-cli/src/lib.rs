//! Shared helpers for the maintenance binaries.

use intake_core::models::StoredSubmission;
use intake_services::SweepReport;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Plain-text table of sweep candidates, one row per submission.
pub fn format_candidates(candidates: &[StoredSubmission]) -> String {
    let mut out = format!(
        "{:<36}  {:<20}  {:<24}  {}\n",
        "ID", "CREATED", "NAME", "PHOTO"
    );
    for candidate in candidates {
        out.push_str(&format!(
            "{:<36}  {:<20}  {:<24}  {}\n",
            candidate.id,
            candidate.created_at.format("%Y-%m-%d %H:%M:%S"),
            truncate_string(&candidate.record.full_name, 24),
            candidate.record.photo_url,
        ));
    }
    out.push_str(&format!("{} submission(s) would be deleted\n", candidates.len()));
    out
}

/// One-paragraph summary of a completed sweep.
pub fn format_report(report: &SweepReport) -> String {
    format!(
        "Threshold: {}\nRows deleted: {} of {} candidates\nPhotos deleted: {} (already gone: {}, failed: {})\n",
        report.threshold.to_rfc3339(),
        report.rows_deleted,
        report.candidates,
        report.photos_deleted,
        report.photos_missing,
        report.photo_failures,
    )
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
