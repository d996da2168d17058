use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use quiz_core::model::OptionId;
use services::{ANSWER_REVEAL_DELAY, QuizView};
use storage::Table;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, use_live_refresh_while, view_state_from_resource};
use crate::vm::{OptionVm, QuizKind, QuizVm, points_label, start_quiz};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

const LIVE_TABLES: &[Table] = &[Table::Questions];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LastAction {
    Load,
    Answer(OptionId),
    Advance,
}

#[component]
pub fn DailyQuizView() -> Element {
    rsx! {
        QuizPage { kind: QuizKind::Daily }
    }
}

#[component]
pub fn VaultView() -> Element {
    rsx! {
        QuizPage { kind: QuizKind::Practice }
    }
}

#[component]
fn QuizPage(kind: QuizKind) -> Element {
    let ctx = use_context::<AppContext>();
    let quiz = ctx.quiz();
    let signed_in = ctx.identity().is_authenticated();

    let error = use_signal(|| None::<ViewError>);
    let vm = use_signal(|| None::<QuizVm>);
    let screen = use_signal(|| QuizView::Loading);
    let last_action = use_signal(|| None::<LastAction>);

    let quiz_for_resource = quiz.clone();
    let resource = use_resource(move || {
        let quiz = quiz_for_resource.clone();
        let mut error = error;
        let mut vm = vm;
        let mut screen = screen;
        let mut last_action = last_action;

        async move {
            last_action.set(Some(LastAction::Load));
            let (view, started) = start_quiz(&quiz, kind).await?;
            vm.set(started);
            screen.set(view);
            error.set(None);
            Ok::<_, ViewError>(())
        }
    });
    // An empty day picks up questions scheduled while the page is open.
    let waiting_for_questions = use_memo(move || screen() == QuizView::NoQuiz);
    use_live_refresh_while(LIVE_TABLES, resource, waiting_for_questions);
    let state = view_state_from_resource(&resource);

    let advance_now = {
        let quiz = quiz.clone();
        use_callback(move |()| {
            let quiz = quiz.clone();
            let mut error = error;
            let mut vm = vm;
            let mut screen = screen;
            let mut last_action = last_action;
            spawn(async move {
                let current = vm.read().clone();
                let Some(mut current) = current else {
                    return;
                };
                if current.last_answer().is_none() {
                    return;
                }
                last_action.set(Some(LastAction::Advance));
                let result = current.advance(&quiz).await;
                vm.set(Some(current));
                match result {
                    Ok(view) => {
                        error.set(None);
                        screen.set(view);
                    }
                    Err(err) => error.set(Some(err)),
                }
            });
        })
    };

    let on_answer = {
        let quiz = quiz.clone();
        use_callback(move |option: OptionId| {
            let mut error = error;
            let mut vm = vm;
            let mut last_action = last_action;
            last_action.set(Some(LastAction::Answer(option)));
            let result = match vm.write().as_mut() {
                Some(current) => current.answer(&quiz, option),
                None => return,
            };
            match result {
                Ok(Some(_)) => {
                    error.set(None);
                    spawn(async move {
                        tokio::time::sleep(ANSWER_REVEAL_DELAY).await;
                        advance_now.call(());
                    });
                }
                Ok(None) => {}
                Err(err) => error.set(Some(err)),
            }
        })
    };

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<QuizTestHandles>() {
                handles.register(on_answer, advance_now, vm);
            }
        }
    }

    let retry_action = use_callback(move |()| match last_action() {
        Some(LastAction::Load) | None => {
            let mut resource = resource;
            resource.restart();
        }
        Some(LastAction::Answer(option)) => on_answer.call(option),
        Some(LastAction::Advance) => advance_now.call(()),
    });
    let on_restart = use_callback(move |()| {
        let mut resource = resource;
        resource.restart();
    });

    let title = match kind {
        QuizKind::Daily => "Daily Quiz",
        QuizKind::Practice => "Question Vault",
    };
    let card = vm.read().as_ref().and_then(QuizVm::card);
    let locked = card.as_ref().is_some_and(|card| card.locked);
    let current_screen = *screen.read();
    let completion_note = if signed_in {
        "Your score has been added to the leaderboard. Come back tomorrow for a new quiz."
    } else {
        "Come back tomorrow for a new quiz. Sign in to appear on the leaderboard."
    };

    rsx! {
        div { class: "page quiz-page",
            header { class: "quiz-header",
                h2 { "{title}" }
                if let Some(card) = card.as_ref().filter(|_| current_screen == QuizView::Quiz) {
                    span { class: "quiz-score", "{card.score_label}" }
                }
            }
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { class: "quiz-loading", "Loading quiz..." }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "error", "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| retry_action.call(()),
                        "Retry"
                    }
                },
                ViewState::Ready(()) => rsx! {
                    if let Some(err) = *error.read() {
                        div { class: "quiz-error",
                            p { class: "error", "{err.message()}" }
                            button {
                                class: "btn btn-secondary",
                                r#type: "button",
                                onclick: move |_| retry_action.call(()),
                                "Retry"
                            }
                        }
                    }
                    match current_screen {
                        QuizView::Loading => rsx! {
                            p { class: "quiz-loading", "Loading quiz..." }
                        },
                        QuizView::Quiz => rsx! {
                            if let Some(card) = card {
                                div { class: "quiz-progress",
                                    span { "{card.progress_label}" }
                                    div { class: "quiz-progress__track",
                                        div {
                                            class: "quiz-progress__fill",
                                            style: "width: {card.progress_percent}%",
                                        }
                                    }
                                }
                                div { class: "quiz-question", dangerous_inner_html: "{card.question_html}" }
                                div { class: "quiz-options",
                                    for option in card.options {
                                        OptionButton {
                                            key: "{option.id}",
                                            option,
                                            locked,
                                            on_pick: on_answer,
                                        }
                                    }
                                }
                            }
                        },
                        QuizView::Completed { score } => rsx! {
                            QuizSummary {
                                heading: "Quiz complete!",
                                score,
                                note: completion_note,
                            }
                        },
                        QuizView::AlreadyPlayed { score } => rsx! {
                            QuizSummary {
                                heading: "You've already played today",
                                score,
                                note: "A new quiz unlocks tomorrow. Warm up in the vault meanwhile.",
                            }
                        },
                        QuizView::PracticeCompleted { score } => rsx! {
                            QuizSummary {
                                heading: "Practice complete",
                                score,
                                note: "Practice runs never count towards the leaderboard.",
                            }
                            button {
                                class: "btn btn-primary",
                                id: "quiz-practice-again",
                                r#type: "button",
                                onclick: move |_| on_restart.call(()),
                                "Practice again"
                            }
                        },
                        QuizView::NoQuiz => rsx! {
                            EmptyQuiz { kind }
                        },
                    }
                },
            }
        }
    }
}

#[component]
fn OptionButton(option: OptionVm, locked: bool, on_pick: EventHandler<OptionId>) -> Element {
    let id = option.id;
    rsx! {
        button {
            class: "{option.state.class()}",
            id: "quiz-option-{id}",
            r#type: "button",
            disabled: locked,
            onclick: move |_| on_pick.call(id),
            span { class: "option-label", "{option.label}" }
            span { class: "option-text", "{option.text}" }
        }
    }
}

#[component]
fn QuizSummary(heading: &'static str, score: u32, note: &'static str) -> Element {
    let points = points_label(u64::from(score));
    rsx! {
        div { class: "quiz-summary",
            h3 { class: "quiz-summary__title", "{heading}" }
            p { class: "quiz-summary__score", "{points}" }
            p { class: "quiz-summary__note", "{note}" }
            Link { class: "btn btn-secondary", to: Route::Leaderboard {}, "View leaderboard" }
        }
    }
}

#[component]
fn EmptyQuiz(kind: QuizKind) -> Element {
    let navigator = use_navigator();
    let (message, cta, route) = match kind {
        QuizKind::Daily => (
            "No quiz is scheduled for today. Check back later.",
            "Practice in the vault",
            Route::Vault {},
        ),
        QuizKind::Practice => (
            "The vault is empty. Past daily questions land here.",
            "Back to today's quiz",
            Route::Daily {},
        ),
    };
    rsx! {
        div { class: "quiz-empty",
            p { "{message}" }
            button {
                class: "btn btn-secondary",
                r#type: "button",
                onclick: move |_| {
                    let _ = navigator.push(route.clone());
                },
                "{cta}"
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct QuizTestHandles {
    answer: Rc<RefCell<Option<Callback<OptionId>>>>,
    advance: Rc<RefCell<Option<Callback<()>>>>,
    vm: Rc<RefCell<Option<Signal<Option<QuizVm>>>>>,
}

#[cfg(test)]
impl QuizTestHandles {
    pub(crate) fn register(
        &self,
        answer: Callback<OptionId>,
        advance: Callback<()>,
        vm: Signal<Option<QuizVm>>,
    ) {
        *self.answer.borrow_mut() = Some(answer);
        *self.advance.borrow_mut() = Some(advance);
        *self.vm.borrow_mut() = Some(vm);
    }

    pub(crate) fn answer(&self) -> Callback<OptionId> {
        (*self.answer.borrow()).expect("quiz answer registered")
    }

    /// Skips the reveal delay.
    pub(crate) fn advance(&self) -> Callback<()> {
        (*self.advance.borrow()).expect("quiz advance registered")
    }

    pub(crate) fn vm(&self) -> Signal<Option<QuizVm>> {
        (*self.vm.borrow()).expect("quiz vm registered")
    }
}
