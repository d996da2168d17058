mod date;
mod ids;
mod leaderboard;
mod ledger;
mod question;

pub use date::{ParseDateError, QuizDate};
pub use ids::{ParseIdError, QuestionId, UserId};

pub use leaderboard::{LeaderboardEntry, Player};
pub use ledger::{QuizAttempt, QuizHistoryEntry};
pub use question::{
    AnswerOption, OptionId, Question, QuestionDraft, QuestionError, ValidatedQuestion,
};
