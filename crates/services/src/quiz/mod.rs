mod progress;
mod session;
mod view;
mod workflow;

// Public API of the quiz subsystem.
pub use crate::error::QuizError;
pub use progress::QuizProgress;
pub use session::{Advance, AnswerOutcome, QuizMode, QuizSession};
pub use view::QuizView;
pub use workflow::{
    ANSWER_REVEAL_DELAY, CompletionReport, HistoryUpload, QuizLoopService, QuizStart, QuizStep,
};
