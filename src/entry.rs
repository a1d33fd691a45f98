/// One block of text shown over `[start_seconds, end_seconds)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionEntry {
    pub sequence_index: usize,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub lines: Vec<String>,
}

impl CaptionEntry {
    pub fn new(
        sequence_index: usize,
        start_seconds: f64,
        end_seconds: f64,
        lines: Vec<String>,
    ) -> Self {
        Self {
            sequence_index,
            start_seconds,
            end_seconds,
            lines,
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end_seconds - self.start_seconds).max(0.0)
    }

    pub fn is_active_at(&self, seconds: f64) -> bool {
        seconds >= self.start_seconds && seconds < self.end_seconds
    }

    /// The lines joined for display.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}
