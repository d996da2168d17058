use thiserror::Error;

use crate::model::{ParseDateError, ParseIdError, QuestionError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Date(#[from] ParseDateError),
    #[error(transparent)]
    Id(#[from] ParseIdError),
}
