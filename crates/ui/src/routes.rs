use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::context::AppContext;
use crate::views::{AdminView, AnalyticsView, DailyQuizView, LeaderboardView, VaultView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", DailyQuizView)] Daily {},
        #[route("/vault", VaultView)] Vault {},
        #[route("/leaderboard", LeaderboardView)] Leaderboard {},
        #[route("/admin", AdminView)] Admin {},
        #[route("/admin/analytics", AnalyticsView)] Analytics {},
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    let ctx = use_context::<AppContext>();
    let who = ctx
        .identity()
        .player()
        .map_or_else(|| "Guest".to_string(), |player| player.username.clone());

    rsx! {
        nav { class: "sidebar",
            h1 { "PhysioQuiz" }
            p { class: "sidebar__player", "{who}" }
            ul {
                li { Link { to: Route::Daily {}, "Today's Quiz" } }
                li { Link { to: Route::Vault {}, "Vault" } }
                li { Link { to: Route::Leaderboard {}, "Leaderboard" } }
                li { Link { to: Route::Admin {}, "Admin" } }
            }
        }
    }
}
