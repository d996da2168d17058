use std::sync::Arc;

use chrono::Duration;
use dioxus::prelude::ReadableExt;
use quiz_core::model::{
    OptionId, Question, QuestionId, QuizAttempt, QuizDate, QuizHistoryEntry, ValidatedQuestion,
};
use quiz_core::time::fixed_now;
use services::Identity;
use storage::{QuestionRepository, Storage, StorageError};

use super::test_harness::{
    ViewKind, seed_question, setup_view_harness, setup_view_harness_with_storage, test_player,
    today,
};

#[tokio::test(flavor = "current_thread")]
async fn daily_view_smoke_renders_first_question() {
    let mut harness = setup_view_harness(ViewKind::Daily, Identity::Anonymous).await;
    seed_question(&harness.storage, "Which muscle abducts the **arm**?", today()).await;
    seed_question(&harness.storage, "Second question", today()).await;
    seed_question(&harness.storage, "Tomorrow's question", today().succ()).await;

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Daily Quiz"), "missing title in {html}");
    assert!(html.contains("Question 1 of 2"), "missing progress in {html}");
    assert!(html.contains("<strong>arm</strong>"), "missing markdown in {html}");
    assert!(html.contains("Right"), "missing option in {html}");
    assert!(html.contains("0 pts"), "missing score in {html}");
    assert!(!html.contains("Tomorrow"), "leaked another day in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn daily_view_smoke_reveals_answer_and_completes() {
    let mut harness = setup_view_harness(ViewKind::Daily, Identity::Anonymous).await;
    seed_question(&harness.storage, "Only question", today()).await;

    harness.rebuild();
    harness.drive_async().await;

    harness.answer(OptionId::FIRST);
    let html = harness.render();
    assert!(html.contains("option option-correct"), "missing reveal in {html}");
    assert!(html.contains("option option-dimmed"), "missing dimmed options in {html}");

    harness.advance().await;
    let html = harness.render();
    assert!(html.contains("Quiz complete!"), "missing completion in {html}");
    assert!(html.contains("10 pts"), "missing final score in {html}");
    assert!(html.contains("Sign in"), "missing sign-in hint in {html}");

    assert_eq!(harness.gate.score_for(today()).unwrap(), Some(10_100));
    assert_eq!(harness.storage.attempts.count_attempts().await.unwrap(), 1);
    let vm = harness.quiz_handles.vm();
    assert!(vm.read().as_ref().is_some_and(|vm| vm.session().is_finished()));
}

#[tokio::test(flavor = "current_thread")]
async fn daily_view_smoke_marks_wrong_pick() {
    let mut harness = setup_view_harness(ViewKind::Daily, Identity::Anonymous).await;
    seed_question(&harness.storage, "Only question", today()).await;
    harness.rebuild();
    harness.drive_async().await;

    harness.answer(OptionId::parse("b").unwrap());
    harness.answer(OptionId::FIRST);
    let html = harness.render();
    assert!(html.contains("option option-wrong"), "missing wrong pick in {html}");
    assert!(html.contains("option option-correct"), "missing correct option in {html}");

    harness.advance().await;
    let html = harness.render();
    assert!(html.contains("0 pts"), "second pick must not score: {html}");
    assert_eq!(harness.gate.score_for(today()).unwrap(), Some(0));
}

#[tokio::test(flavor = "current_thread")]
async fn daily_view_smoke_blocks_replay() {
    let mut harness = setup_view_harness(ViewKind::Daily, Identity::Anonymous).await;
    seed_question(&harness.storage, "Only question", today()).await;
    harness.gate.record_score(today(), 42_000).unwrap();

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("already played today"), "missing gate in {html}");
    assert!(html.contains("42 pts"), "missing stored score in {html}");
    assert!(!html.contains("Only question"), "question shown after play: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn daily_view_smoke_without_questions() {
    let mut harness = setup_view_harness(ViewKind::Daily, Identity::Anonymous).await;
    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("No quiz is scheduled"), "missing empty state in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn daily_view_smoke_picks_up_questions_scheduled_later() {
    let mut harness = setup_view_harness(ViewKind::Daily, Identity::Anonymous).await;
    harness.rebuild();
    harness.drive_async().await;
    assert!(harness.render().contains("No quiz is scheduled"));

    seed_question(&harness.storage, "Late addition", today()).await;
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Late addition"), "empty day did not refresh: {html}");
    assert!(html.contains("Question 1 of 1"), "missing progress in {html}");

    harness.answer(OptionId::FIRST);
    seed_question(&harness.storage, "Even later", today()).await;
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("option option-correct"), "running quiz was reloaded: {html}");
    assert!(html.contains("Question 1 of 1"), "running quiz was reloaded: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn vault_view_smoke_plays_past_questions_only() {
    let mut harness = setup_view_harness(ViewKind::Vault, Identity::Anonymous).await;
    seed_question(&harness.storage, "Yesterday's question", today().pred()).await;
    seed_question(&harness.storage, "Today's question", today()).await;

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Question Vault"), "missing title in {html}");
    assert!(html.contains("Question 1 of 1"), "missing progress in {html}");
    assert!(html.contains("Yesterday"), "missing past question in {html}");

    harness.answer(OptionId::FIRST);
    harness.advance().await;
    let html = harness.render();
    assert!(html.contains("Practice complete"), "missing practice summary in {html}");
    assert!(html.contains("Practice again"), "missing restart in {html}");
    assert_eq!(harness.gate.score_for(today()).unwrap(), None);
    assert_eq!(harness.storage.attempts.count_attempts().await.unwrap(), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn vault_view_smoke_empty() {
    let mut harness = setup_view_harness(ViewKind::Vault, Identity::Anonymous).await;
    seed_question(&harness.storage, "Today's question", today()).await;
    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("The vault is empty"), "missing empty vault in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn leaderboard_view_smoke_lists_players_and_refreshes() {
    let ada = test_player("ada");
    let bo = test_player("bo");
    let mut harness = setup_view_harness(
        ViewKind::Leaderboard,
        Identity::Authenticated(ada.clone()),
    )
    .await;
    let board = Arc::clone(&harness.storage.leaderboard);
    let history = Arc::clone(&harness.storage.history);
    board.register_player(&ada).await.unwrap();
    board.register_player(&bo).await.unwrap();
    history
        .insert_history(&QuizHistoryEntry::new(ada.user_id, today(), 50_500, fixed_now()))
        .await
        .unwrap();

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("#1"), "missing rank in {html}");
    assert!(html.contains("ada"), "missing player in {html}");
    assert!(html.contains("50 pts"), "missing points in {html}");
    assert!(html.contains("1 game"), "missing games in {html}");
    assert!(html.contains("Career total"), "missing badge in {html}");

    history
        .insert_history(&QuizHistoryEntry::new(
            bo.user_id,
            today(),
            90_000,
            fixed_now() + Duration::minutes(5),
        ))
        .await
        .unwrap();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("90 pts"), "live refresh missed new score in {html}");
    let bo_at = html.find("bo</span>").expect("bo row");
    let ada_at = html.find("ada</span>").expect("ada row");
    assert!(bo_at < ada_at, "expected bo ranked first in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn leaderboard_view_smoke_anonymous_uses_local_total() {
    let mut harness = setup_view_harness(ViewKind::Leaderboard, Identity::Anonymous).await;
    harness.gate.record_score(today().pred(), 20_000).unwrap();
    harness.gate.record_score(today(), 12_000).unwrap();

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("32 pts"), "missing local total in {html}");
    assert!(html.contains("On this device"), "missing badge caption in {html}");
    assert!(html.contains("No scores yet"), "missing empty board in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn admin_view_smoke_groups_by_date() {
    let mut harness = setup_view_harness(ViewKind::Admin, Identity::Anonymous).await;
    seed_question(&harness.storage, "Rotator cuff?", today()).await;
    seed_question(&harness.storage, "Brachial plexus?", today()).await;
    seed_question(&harness.storage, "Femoral nerve?", today().pred()).await;

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Question Bank"), "missing title in {html}");
    assert!(html.contains(&today().to_string()), "missing date folder in {html}");
    assert!(html.contains("2 questions"), "missing count in {html}");
    assert!(html.contains("1 question"), "missing count in {html}");
    assert!(html.contains("A) Right"), "missing answer label in {html}");
    let today_at = html.find("Rotator cuff?").expect("today row");
    let older_at = html.find("Femoral nerve?").expect("older row");
    assert!(today_at < older_at, "newest folder should come first in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn analytics_view_smoke_renders_cards() {
    let mut harness = setup_view_harness(ViewKind::Analytics, Identity::Anonymous).await;
    let attempts = Arc::clone(&harness.storage.attempts);
    attempts
        .record_attempt(&QuizAttempt::new(30_000, today(), fixed_now()))
        .await
        .unwrap();
    attempts
        .record_attempt(&QuizAttempt::new(0, today(), fixed_now()))
        .await
        .unwrap();

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Attempts"), "missing attempts card in {html}");
    assert!(html.contains("15 pts"), "missing average in {html}");
    assert!(html.contains("50 pts"), "missing best score floor in {html}");
    assert!(html.contains("50%"), "missing completion in {html}");
    assert!(html.contains("Score distribution"), "missing chart in {html}");
}

struct FailingQuestions;

#[async_trait::async_trait]
impl QuestionRepository for FailingQuestions {
    async fn insert_question(&self, _question: &ValidatedQuestion) -> Result<Question, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn update_question(&self, _question: &Question) -> Result<(), StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn delete_question(&self, _id: QuestionId) -> Result<(), StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn get_question(&self, _id: QuestionId) -> Result<Question, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn questions_on(&self, _date: QuizDate) -> Result<Vec<Question>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn questions_before(&self, _date: QuizDate) -> Result<Vec<Question>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn list_questions(&self) -> Result<Vec<Question>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }
}

#[tokio::test(flavor = "current_thread")]
async fn daily_view_smoke_backend_error_offers_retry() {
    let mut storage = Storage::in_memory();
    storage.questions = Arc::new(FailingQuestions);
    let mut harness =
        setup_view_harness_with_storage(ViewKind::Daily, Identity::Anonymous, storage).await;

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Could not reach the quiz server"), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn admin_view_smoke_backend_error_offers_retry() {
    let mut storage = Storage::in_memory();
    storage.questions = Arc::new(FailingQuestions);
    let mut harness =
        setup_view_harness_with_storage(ViewKind::Admin, Identity::Anonymous, storage).await;

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Could not reach the quiz server"), "missing error in {html}");
}
