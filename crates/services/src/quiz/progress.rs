/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    /// Zero-based position of the current question.
    pub index: usize,
    pub total: usize,
    pub score: u32,
    pub is_complete: bool,
}

impl QuizProgress {
    /// One-based question number for display ("Question 2 of 5").
    #[must_use]
    pub fn number(&self) -> usize {
        (self.index + 1).min(self.total)
    }

    /// Share of questions already behind the cursor, in percent.
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let done = if self.is_complete { self.total } else { self.index };
        u8::try_from(done * 100 / self.total).unwrap_or(100)
    }
}
