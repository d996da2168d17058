mod admin_vm;
mod analytics_vm;
mod leaderboard_vm;
mod markdown_vm;
mod quiz_vm;
mod time_fmt;

pub use admin_vm::{DateFolderVm, QuestionFormVm, QuestionRowVm, map_date_folders};
pub use analytics_vm::{AnalyticsVm, BarVm, KpiCardVm, map_analytics};
pub use leaderboard_vm::{
    CareerBadgeVm, LeaderboardRowVm, games_label, map_career_badge, map_leaderboard_rows,
};
pub use markdown_vm::{markdown_to_html, sanitize_html};
pub use quiz_vm::{
    OptionState, OptionVm, QuestionCardVm, QuizKind, QuizVm, points_label, start_quiz,
};
pub use time_fmt::format_date;
