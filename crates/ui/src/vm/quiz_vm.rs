use quiz_core::model::OptionId;
use quiz_core::scoring::display_points;
use services::{
    AnswerOutcome, QuizError, QuizLoopService, QuizSession, QuizStart, QuizStep, QuizView,
};

use crate::views::ViewError;
use crate::vm::markdown_vm::markdown_to_html;

/// Which quiz a page plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizKind {
    Daily,
    Practice,
}

/// Highlight of an option button after an answer is revealed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionState {
    Idle,
    Correct,
    Wrong,
    Dimmed,
}

impl OptionState {
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            OptionState::Idle => "option",
            OptionState::Correct => "option option-correct",
            OptionState::Wrong => "option option-wrong",
            OptionState::Dimmed => "option option-dimmed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub id: OptionId,
    pub label: char,
    pub text: String,
    pub state: OptionState,
}

/// Render-ready snapshot of the current question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionCardVm {
    pub question_html: String,
    pub progress_label: String,
    pub progress_percent: u8,
    pub score_label: String,
    pub options: Vec<OptionVm>,
    pub locked: bool,
}

/// Points shown to players, e.g. `50 pts`.
#[must_use]
pub fn points_label(score: u64) -> String {
    format!("{} pts", display_points(score))
}

/// Holds the running session plus the last reveal.
#[derive(Clone, Debug)]
pub struct QuizVm {
    session: QuizSession,
    last_answer: Option<AnswerOutcome>,
}

impl QuizVm {
    #[must_use]
    pub fn new(session: QuizSession) -> Self {
        Self {
            session,
            last_answer: None,
        }
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn last_answer(&self) -> Option<AnswerOutcome> {
        self.last_answer
    }

    #[must_use]
    pub fn card(&self) -> Option<QuestionCardVm> {
        let question = self.session.current_question()?;
        let progress = self.session.progress();
        let options = question
            .options
            .iter()
            .map(|opt| {
                let state = match self.last_answer {
                    None => OptionState::Idle,
                    Some(answer) if opt.id == answer.correct_id => OptionState::Correct,
                    Some(answer) if opt.id == answer.selected => OptionState::Wrong,
                    Some(_) => OptionState::Dimmed,
                };
                OptionVm {
                    id: opt.id,
                    label: opt.id.label(),
                    text: opt.text.clone(),
                    state,
                }
            })
            .collect();
        Some(QuestionCardVm {
            question_html: markdown_to_html(&question.text),
            progress_label: format!("Question {} of {}", progress.number(), progress.total),
            progress_percent: progress.percent(),
            score_label: points_label(u64::from(progress.score)),
            options,
            locked: self.last_answer.is_some(),
        })
    }

    /// Pick an option. A second pick on the same question is ignored.
    ///
    /// # Errors
    ///
    /// Returns `ViewError` when the answer cannot be recorded.
    pub fn answer(
        &mut self,
        quiz: &QuizLoopService,
        option: OptionId,
    ) -> Result<Option<AnswerOutcome>, ViewError> {
        match quiz.answer_current(&mut self.session, option) {
            Ok(outcome) => {
                self.last_answer = Some(outcome);
                Ok(Some(outcome))
            }
            Err(QuizError::AlreadyAnswered | QuizError::Completed) => Ok(None),
            Err(err) => {
                tracing::error!(%err, "failed to record answer");
                Err(ViewError::from(&err))
            }
        }
    }

    /// Move on after the reveal delay. Returns the screen to show next.
    ///
    /// # Errors
    ///
    /// Returns `ViewError` when the session cannot advance.
    pub async fn advance(&mut self, quiz: &QuizLoopService) -> Result<QuizView, ViewError> {
        let step = quiz.advance(&mut self.session).await.map_err(|err| {
            tracing::error!(%err, "failed to advance quiz");
            ViewError::from(&err)
        })?;
        self.last_answer = None;
        if let QuizStep::Completed(report) = &step {
            tracing::info!(score = report.score, history = ?report.history, "quiz finished");
        }
        Ok(step.view())
    }
}

/// Load a quiz and pair it with the screen to show.
///
/// # Errors
///
/// Returns `ViewError` when questions or the local gate cannot be read.
pub async fn start_quiz(
    quiz: &QuizLoopService,
    kind: QuizKind,
) -> Result<(QuizView, Option<QuizVm>), ViewError> {
    let start = match kind {
        QuizKind::Daily => quiz.load_daily().await,
        QuizKind::Practice => quiz.start_practice().await,
    }
    .map_err(|err| {
        tracing::error!(%err, ?kind, "failed to load quiz");
        ViewError::from(&err)
    })?;
    let view = start.view();
    let vm = match start {
        QuizStart::Ready(session) => Some(QuizVm::new(session)),
        QuizStart::AlreadyPlayed { .. } | QuizStart::NoQuiz => None,
    };
    Ok((view, vm))
}
