use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use quiz_core::model::{OptionId, Player, Question, QuestionDraft, QuizDate, UserId};
use quiz_core::time::fixed_now;
use services::{
    AdminService, AnalyticsService, AppServices, Clock, Identity, LeaderboardService,
    LiveRefresh, QuizLoopService, ReplayGate,
};
use storage::{InMemoryLocalStore, LocalStore, Storage, Table};

use crate::context::{UiApp, build_app_context};
use crate::views::quiz::QuizTestHandles;
use crate::views::{AdminView, AnalyticsView, DailyQuizView, LeaderboardView, VaultView};

#[derive(Clone)]
struct TestApp {
    services: AppServices,
}

impl UiApp for TestApp {
    fn identity(&self) -> Identity {
        self.services.identity().clone()
    }

    fn quiz(&self) -> Arc<QuizLoopService> {
        self.services.quiz()
    }

    fn leaderboard(&self) -> Arc<LeaderboardService> {
        self.services.leaderboard()
    }

    fn admin(&self) -> Arc<AdminService> {
        self.services.admin()
    }

    fn analytics(&self) -> Arc<AnalyticsService> {
        self.services.analytics()
    }

    fn live(&self, tables: &[Table]) -> LiveRefresh {
        self.services.live(tables)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Daily,
    Vault,
    Leaderboard,
    Admin,
    Analytics,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    quiz_handles: QuizTestHandles,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    use_context_provider(|| props.quiz_handles.clone());
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Daily => rsx! { DailyQuizView {} },
        ViewKind::Vault => rsx! { VaultView {} },
        ViewKind::Leaderboard => rsx! { LeaderboardView {} },
        ViewKind::Admin => rsx! { AdminView {} },
        ViewKind::Analytics => rsx! { AnalyticsView {} },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub storage: Storage,
    pub gate: ReplayGate,
    pub quiz_handles: QuizTestHandles,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        for _ in 0..4 {
            let _ = tokio::time::timeout(
                std::time::Duration::from_millis(50),
                self.dom.wait_for_work(),
            )
            .await;
            self.dom.render_immediate(&mut NoOpMutations);
            self.dom.process_events();
        }
    }

    pub fn answer(&mut self, option: OptionId) {
        let answer = self.quiz_handles.answer();
        self.dom.in_runtime(|| answer.call(option));
        drive_dom(&mut self.dom);
    }

    /// Moves past the revealed answer without waiting out the delay.
    pub async fn advance(&mut self) {
        let advance = self.quiz_handles.advance();
        self.dom.in_runtime(|| advance.call(()));
        self.drive_async().await;
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn today() -> QuizDate {
    Clock::fixed(fixed_now()).today()
}

pub fn test_player(name: &str) -> Player {
    Player::new(UserId::random(), name, None)
}

/// Stores a question whose first option is correct.
pub async fn seed_question(storage: &Storage, text: &str, date: QuizDate) -> Question {
    let draft = QuestionDraft::lettered(text, ["Right", "Wrong", "Also wrong"], OptionId::FIRST, date);
    storage
        .questions
        .insert_question(&draft.validate().expect("valid question"))
        .await
        .expect("insert question")
}

pub async fn setup_view_harness(view: ViewKind, identity: Identity) -> ViewHarness {
    setup_view_harness_with_storage(view, identity, Storage::in_memory()).await
}

pub async fn setup_view_harness_with_storage(
    view: ViewKind,
    identity: Identity,
    storage: Storage,
) -> ViewHarness {
    let clock = Clock::fixed(fixed_now());
    let local: Arc<dyn LocalStore> = Arc::new(InMemoryLocalStore::new());
    let gate = ReplayGate::new(Arc::clone(&local));
    let services = AppServices::from_parts(&storage, local, clock, identity);
    let quiz_handles = QuizTestHandles::default();

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app: Arc::new(TestApp { services }),
            view,
            quiz_handles: quiz_handles.clone(),
        },
    );

    ViewHarness {
        dom,
        storage,
        gate,
        quiz_handles,
    }
}
