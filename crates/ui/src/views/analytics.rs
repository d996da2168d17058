use dioxus::prelude::*;
use dioxus_router::Link;
use storage::Table;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::live::use_live_refresh;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{BarVm, map_analytics};

const LIVE_TABLES: &[Table] = &[Table::Attempts, Table::Leaderboard];

#[component]
pub fn AnalyticsView() -> Element {
    let ctx = use_context::<AppContext>();
    let analytics = ctx.analytics();

    let resource = use_resource(move || {
        let analytics = analytics.clone();
        async move {
            let snapshot = analytics.snapshot().await.map_err(|err| {
                tracing::error!(%err, "failed to load analytics");
                ViewError::from(&err)
            })?;
            Ok::<_, ViewError>(map_analytics(&snapshot))
        }
    });
    use_live_refresh(LIVE_TABLES, resource);
    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page analytics-page",
            header { class: "admin-header",
                h2 { "Analytics" }
                Link { class: "btn btn-secondary", to: Route::Admin {}, "Question bank" }
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
                ViewState::Ready(vm) => rsx! {
                    div { class: "kpi-grid",
                        for card in vm.cards {
                            div { key: "{card.title}", class: "kpi-card",
                                span { class: "kpi-card__title", "{card.title}" }
                                span { class: "kpi-card__value", "{card.value}" }
                            }
                        }
                    }
                    BarChart { title: "Attempts, last 30 days", bars: vm.activity }
                    BarChart { title: "Score distribution", bars: vm.distribution }
                },
            }
        }
    }
}

#[component]
fn BarChart(title: &'static str, bars: Vec<BarVm>) -> Element {
    rsx! {
        section { class: "chart",
            h3 { "{title}" }
            div { class: "chart__bars",
                for bar in bars {
                    div { key: "{bar.label}", class: "chart__bar", title: "{bar.label}: {bar.count}",
                        div { class: "chart__fill", style: "height: {bar.percent}%" }
                        span { class: "chart__label", "{bar.label}" }
                    }
                }
            }
        }
    }
}
