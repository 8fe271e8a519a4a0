/// Skips a pass when the extracted text length has not moved.
///
/// Length is a cheap proxy for "content changed": an edit that keeps the
/// length identical goes unnoticed until the next real change.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    previous: usize,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when downstream work should run, recording `length`
    /// as the new baseline.
    pub fn should_process(&mut self, length: usize) -> bool {
        if length == self.previous {
            log::debug!("Token Gauge: No change in text content, skipping update");
            return false;
        }
        self.previous = length;
        true
    }

    pub fn previous(&self) -> usize {
        self.previous
    }

    pub fn reset(&mut self) {
        self.previous = 0;
    }
}
