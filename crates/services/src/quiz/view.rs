/// Screen the quiz page is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizView {
    Loading,
    Quiz,
    Completed { score: u32 },
    AlreadyPlayed { score: u32 },
    PracticeCompleted { score: u32 },
    NoQuiz,
}

impl QuizView {
    /// Terminal screens accept no further answers.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, QuizView::Loading | QuizView::Quiz)
    }
}
