use super::report::{ReportData, Renderer};

/// PURE FUNCTION: Formats a report the way the watch face shows it (minutes, 2 decimals).
pub fn format_report(report: &ReportData) -> String {
    [
        "SLEEP REPORT".to_string(),
        format!("Deep Sleep: {:.2} mins", report.deep_sleep_seconds / 60.0),
        format!("Light Sleep: {:.2} mins", report.light_sleep_seconds / 60.0),
        format!("Awake Time: {:.2} mins", report.awake_seconds / 60.0),
        format!("Adverse Events: {}", report.adverse_event_count),
    ]
    .join("\n")
}

/// Renders to any writer; the CLI driver points it at stdout.
pub struct TextRenderer<W: std::io::Write> {
    out: W,
}

impl<W: std::io::Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: std::io::Write> Renderer for TextRenderer<W> {
    fn render(&mut self, report: &ReportData) {
        if let Err(e) = writeln!(self.out, "{}", format_report(report)) {
            tracing::warn!("Failed to render report: {}", e);
        }
    }
}
