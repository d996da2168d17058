mod config;

use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{
    AdminService, AnalyticsService, AppServices, Clock, Identity, LeaderboardService, LiveRefresh,
    QuizLoopService,
};
use storage::Table;
use tracing_subscriber::EnvFilter;
use ui::{App, UiApp, build_app_context};

use crate::config::{
    ArgsError, Command, Config, Invocation, SeedArgs, parse_invocation, prepare_sqlite_file,
    print_usage,
};

struct DesktopApp {
    services: AppServices,
}

impl UiApp for DesktopApp {
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

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn open_services(config: &Config) -> Result<AppServices, Box<dyn std::error::Error>> {
    // sqlx will not create the database file.
    prepare_sqlite_file(&config.db_url)?;
    let services = AppServices::new_sqlite(
        &config.db_url,
        &config.state_path,
        Clock::default_clock(),
        config.identity.clone(),
    )
    .await?;
    Ok(services)
}

/// Pushes scores recorded on this device to the signed-in player's ledger.
async fn sync_identity(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let Some(player) = services.identity().player() else {
        tracing::info!("no signed-in player; nothing to sync");
        return Ok(());
    };
    let report = services.leaderboard().reconcile(player).await?;
    tracing::info!(
        user = %player.user_id,
        uploaded = report.uploaded,
        already_synced = report.already_synced,
        total = report.total,
        "history synced"
    );
    Ok(())
}

async fn seed(services: &AppServices, args: &SeedArgs) -> Result<(), Box<dyn std::error::Error>> {
    let input = std::fs::read_to_string(&args.file)?;
    let start = args.start.unwrap_or_else(|| services.quiz().today());
    let report = services
        .import()
        .import(&input, start, args.per_day)
        .await?;
    println!(
        "imported {} questions scheduled {}..={}",
        report.inserted, report.first_date, report.last_date
    );
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let invocation = parse_invocation(argv, |key| std::env::var(key).ok()).map_err(|err| {
        eprintln!("{err}");
        print_usage();
        err
    })?;

    let (command, config, seed_args) = match invocation {
        Invocation::Help => {
            print_usage();
            return Ok(());
        }
        Invocation::Run {
            command,
            config,
            seed,
        } => (command, config, seed),
    };

    init_tracing();
    let services = open_services(&config).await?;

    match (command, seed_args) {
        (Command::Seed, Some(args)) => seed(&services, &args).await,
        (Command::Seed, None) => Err(ArgsError::MissingFile.into()),
        (Command::Sync, _) => sync_identity(&services).await,
        (Command::Ui, _) => {
            // Sync failures are logged, not fatal.
            if let Err(err) = sync_identity(&services).await {
                tracing::error!(%err, "failed to sync local history");
            }

            let app: Arc<dyn UiApp> = Arc::new(DesktopApp { services });
            let context = build_app_context(&app);

            // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("PhysioQuiz")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
