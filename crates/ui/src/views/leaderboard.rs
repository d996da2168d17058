use dioxus::prelude::*;
use services::leaderboard::DEFAULT_TOP;
use storage::Table;

use crate::context::AppContext;
use crate::views::live::use_live_refresh;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{CareerBadgeVm, LeaderboardRowVm, map_career_badge, map_leaderboard_rows};

const LIVE_TABLES: &[Table] = &[Table::Leaderboard, Table::History];

#[derive(Clone, Debug, PartialEq)]
struct LeaderboardData {
    rows: Vec<LeaderboardRowVm>,
    badge: CareerBadgeVm,
}

#[component]
pub fn LeaderboardView() -> Element {
    let ctx = use_context::<AppContext>();
    let leaderboard = ctx.leaderboard();
    let identity = ctx.identity().clone();

    let resource = use_resource(move || {
        let leaderboard = leaderboard.clone();
        let identity = identity.clone();
        async move {
            let entries = leaderboard.top(DEFAULT_TOP).await.map_err(|err| {
                tracing::error!(%err, "failed to load leaderboard");
                ViewError::from(&err)
            })?;
            let total = leaderboard.career_total(&identity).await.map_err(|err| {
                tracing::error!(%err, "failed to load career total");
                ViewError::from(&err)
            })?;
            Ok::<_, ViewError>(LeaderboardData {
                rows: map_leaderboard_rows(&entries),
                badge: map_career_badge(total),
            })
        }
    });
    use_live_refresh(LIVE_TABLES, resource);
    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page leaderboard-page",
            h2 { "Leaderboard" }
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
                ViewState::Ready(data) => rsx! {
                    div { class: "career-badge",
                        span { class: "career-badge__points", "{data.badge.points_label}" }
                        span { class: "career-badge__caption", "{data.badge.caption}" }
                    }
                    if data.rows.is_empty() {
                        p { class: "leaderboard-empty", "No scores yet. Finish today's quiz to claim the top spot." }
                    } else {
                        ol { class: "leaderboard",
                            for row in data.rows {
                                LeaderboardRow { key: "{row.rank}", row }
                            }
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn LeaderboardRow(row: LeaderboardRowVm) -> Element {
    let class = if row.is_podium {
        "leaderboard-row leaderboard-row--podium"
    } else {
        "leaderboard-row"
    };
    rsx! {
        li { class: "{class}",
            span { class: "leaderboard-row__rank", "{row.rank_label}" }
            if let Some(url) = row.avatar_url.as_ref() {
                img { class: "leaderboard-row__avatar", src: "{url}", alt: "" }
            } else {
                span { class: "leaderboard-row__avatar leaderboard-row__avatar--initial", "{row.initial}" }
            }
            div { class: "leaderboard-row__who",
                span { class: "leaderboard-row__name", "{row.username}" }
                span { class: "leaderboard-row__games", "{row.games_label}" }
                if let Some(last) = row.last_played_label.as_ref() {
                    span { class: "leaderboard-row__last", "{last}" }
                }
            }
            span { class: "leaderboard-row__points", "{row.points_label}" }
        }
    }
}
