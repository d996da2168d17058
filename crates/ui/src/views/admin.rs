use dioxus::prelude::*;
use dioxus_router::Link;

use quiz_core::model::{QuestionId, QuizDate};
use storage::Table;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::live::use_live_refresh;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{DateFolderVm, QuestionFormVm, QuestionRowVm, map_date_folders};

const LIVE_TABLES: &[Table] = &[Table::Questions];

#[component]
pub fn AdminView() -> Element {
    let ctx = use_context::<AppContext>();
    let admin = ctx.admin();
    let today = ctx.quiz().today();

    let query = use_signal(String::new);
    let form = use_signal(|| None::<QuestionFormVm>);
    let error = use_signal(|| None::<ViewError>);

    let admin_for_resource = admin.clone();
    let resource = use_resource(move || {
        let admin = admin_for_resource.clone();
        let query = query();
        async move {
            let folders = admin.folders(&query).await.map_err(|err| {
                tracing::error!(%err, "failed to load question folders");
                ViewError::from(&err)
            })?;
            Ok::<_, ViewError>(map_date_folders(&folders, today))
        }
    });
    use_live_refresh(LIVE_TABLES, resource);
    let state = view_state_from_resource(&resource);

    let on_save = {
        let admin = admin.clone();
        use_callback(move |()| {
            let admin = admin.clone();
            let mut form = form;
            let mut error = error;
            let mut resource = resource;
            let Some(current) = form.read().clone() else {
                return;
            };
            let draft = match current.to_draft() {
                Ok(draft) => draft,
                Err(err) => {
                    error.set(Some(err));
                    return;
                }
            };
            spawn(async move {
                let result = match current.editing {
                    Some(id) => admin.update(id, draft).await,
                    None => admin.create(draft).await,
                };
                match result {
                    Ok(saved) => {
                        tracing::info!(id = %saved.id, date = %saved.date, "question saved");
                        form.set(None);
                        error.set(None);
                        resource.restart();
                    }
                    Err(err) => {
                        tracing::error!(%err, "failed to save question");
                        error.set(Some(ViewError::from(&err)));
                    }
                }
            });
        })
    };

    let on_edit = {
        let admin = admin.clone();
        use_callback(move |id: QuestionId| {
            let admin = admin.clone();
            let mut form = form;
            let mut error = error;
            spawn(async move {
                match admin.get(id).await {
                    Ok(question) => {
                        form.set(Some(QuestionFormVm::from_question(&question)));
                        error.set(None);
                    }
                    Err(err) => {
                        tracing::error!(%err, %id, "failed to open question");
                        error.set(Some(ViewError::from(&err)));
                    }
                }
            });
        })
    };

    let on_delete = {
        let admin = admin.clone();
        use_callback(move |id: QuestionId| {
            let admin = admin.clone();
            let mut error = error;
            let mut resource = resource;
            spawn(async move {
                match admin.delete(id).await {
                    Ok(()) => {
                        error.set(None);
                        resource.restart();
                    }
                    Err(err) => {
                        tracing::error!(%err, %id, "failed to delete question");
                        error.set(Some(ViewError::from(&err)));
                    }
                }
            });
        })
    };

    let on_move = {
        let admin = admin.clone();
        use_callback(move |(id, raw): (QuestionId, String)| {
            let admin = admin.clone();
            let mut error = error;
            let mut resource = resource;
            let Ok(date) = raw.parse::<QuizDate>() else {
                error.set(Some(ViewError::Invalid));
                return;
            };
            spawn(async move {
                match admin.reassign_date(id, date).await {
                    Ok(_) => {
                        error.set(None);
                        resource.restart();
                    }
                    Err(err) => {
                        tracing::error!(%err, %id, %date, "failed to move question");
                        error.set(Some(ViewError::from(&err)));
                    }
                }
            });
        })
    };

    let current_form = form.read().clone();

    rsx! {
        div { class: "page admin-page",
            header { class: "admin-header",
                h2 { "Question Bank" }
                Link { class: "btn btn-secondary", to: Route::Analytics {}, "Analytics" }
                button {
                    class: "btn btn-primary",
                    id: "admin-new",
                    r#type: "button",
                    onclick: move |_| {
                        let mut form = form;
                        form.set(Some(QuestionFormVm::blank(today)));
                    },
                    "New question"
                }
            }
            input {
                class: "admin-search",
                r#type: "search",
                placeholder: "Search text or YYYY-MM-DD",
                value: "{query}",
                oninput: move |evt| {
                    let mut query = query;
                    query.set(evt.value());
                },
            }
            if let Some(err) = *error.read() {
                p { class: "error", "{err.message()}" }
            }
            if current_form.is_some() {
                QuestionForm {
                    form,
                    on_save,
                    on_cancel: move |()| {
                        let mut form = form;
                        let mut error = error;
                        form.set(None);
                        error.set(None);
                    },
                }
            }
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "error", "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| {
                            let mut resource = resource;
                            resource.restart();
                        },
                        "Retry"
                    }
                },
                ViewState::Ready(folders) => rsx! {
                    if folders.is_empty() {
                        p { class: "admin-empty", "No questions match." }
                    }
                    for folder in folders {
                        DateFolder { key: "{folder.date_label}", folder, on_edit, on_delete, on_move }
                    }
                },
            }
        }
    }
}

#[component]
fn DateFolder(
    folder: DateFolderVm,
    on_edit: EventHandler<QuestionId>,
    on_delete: EventHandler<QuestionId>,
    on_move: EventHandler<(QuestionId, String)>,
) -> Element {
    let class = if folder.is_today {
        "date-folder date-folder--today"
    } else {
        "date-folder"
    };
    let date_label = folder.date_label.clone();
    rsx! {
        details { class: "{class}", open: folder.is_today,
            summary {
                span { class: "date-folder__date", "{folder.date_label}" }
                span { class: "date-folder__count", "{folder.count_label}" }
            }
            ul {
                for row in folder.questions {
                    QuestionRow { key: "{row.id}", row, date_label: date_label.clone(), on_edit, on_delete, on_move }
                }
            }
        }
    }
}

#[component]
fn QuestionRow(
    row: QuestionRowVm,
    date_label: String,
    on_edit: EventHandler<QuestionId>,
    on_delete: EventHandler<QuestionId>,
    on_move: EventHandler<(QuestionId, String)>,
) -> Element {
    let id = row.id;
    rsx! {
        li { class: "question-row",
            div { class: "question-row__text",
                p { "{row.text}" }
                p { class: "question-row__answer", "{row.answer_label}" }
            }
            input {
                class: "question-row__date",
                r#type: "date",
                value: "{date_label}",
                onchange: move |evt: FormEvent| on_move.call((id, evt.value())),
            }
            button {
                class: "btn btn-secondary",
                r#type: "button",
                onclick: move |_| on_edit.call(id),
                "Edit"
            }
            button {
                class: "btn btn-danger",
                r#type: "button",
                onclick: move |_| on_delete.call(id),
                "Delete"
            }
        }
    }
}

fn update_form(mut form: Signal<Option<QuestionFormVm>>, apply: impl FnOnce(&mut QuestionFormVm)) {
    if let Some(current) = form.write().as_mut() {
        apply(current);
    }
}

#[component]
fn QuestionForm(
    form: Signal<Option<QuestionFormVm>>,
    on_save: EventHandler<()>,
    on_cancel: EventHandler<()>,
) -> Element {
    let Some(current) = form.read().clone() else {
        return rsx! {};
    };
    let heading = if current.editing.is_some() {
        "Edit question"
    } else {
        "New question"
    };
    let options: Vec<(usize, char, String)> = current
        .options
        .iter()
        .enumerate()
        .map(|(index, text)| (index, QuestionFormVm::option_label(index), text.clone()))
        .collect();

    rsx! {
        form {
            class: "question-form",
            onsubmit: move |evt| {
                evt.prevent_default();
                on_save.call(());
            },
            h3 { "{heading}" }
            label { "Question"
                textarea {
                    value: "{current.text}",
                    oninput: move |evt: FormEvent| update_form(form, |f| f.text = evt.value()),
                }
            }
            label { "Date"
                input {
                    r#type: "date",
                    value: "{current.date}",
                    oninput: move |evt: FormEvent| update_form(form, |f| f.date = evt.value()),
                }
            }
            for (index, label, text) in options {
                div { key: "{index}", class: "question-form__option",
                    input {
                        r#type: "radio",
                        name: "correct",
                        checked: current.correct == index,
                        onchange: move |_| update_form(form, |f| f.correct = index),
                    }
                    span { class: "option-label", "{label}" }
                    input {
                        r#type: "text",
                        value: "{text}",
                        oninput: move |evt: FormEvent| {
                            update_form(form, |f| {
                                if let Some(slot) = f.options.get_mut(index) {
                                    *slot = evt.value();
                                }
                            });
                        },
                    }
                    button {
                        class: "btn btn-ghost",
                        r#type: "button",
                        onclick: move |_| update_form(form, |f| f.remove_option(index)),
                        "Remove"
                    }
                }
            }
            div { class: "question-form__actions",
                button {
                    class: "btn btn-ghost",
                    r#type: "button",
                    onclick: move |_| update_form(form, QuestionFormVm::add_option),
                    "Add option"
                }
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    onclick: move |_| on_cancel.call(()),
                    "Cancel"
                }
                button { class: "btn btn-primary", id: "admin-save", r#type: "submit", "Save" }
            }
        }
    }
}
