use quiz_core::model::LeaderboardEntry;
use services::CareerTotal;

use crate::vm::quiz_vm::points_label;
use crate::vm::time_fmt::format_date;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardRowVm {
    pub rank: usize,
    pub rank_label: String,
    pub username: String,
    pub initial: char,
    pub avatar_url: Option<String>,
    pub points_label: String,
    pub games_label: String,
    pub last_played_label: Option<String>,
    pub is_podium: bool,
}

#[must_use]
pub fn games_label(games: u32) -> String {
    if games == 1 {
        "1 game".to_string()
    } else {
        format!("{games} games")
    }
}

/// Rows are expected in leaderboard order already.
#[must_use]
pub fn map_leaderboard_rows(entries: &[LeaderboardEntry]) -> Vec<LeaderboardRowVm> {
    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let rank = idx + 1;
            LeaderboardRowVm {
                rank,
                rank_label: format!("#{rank}"),
                username: entry.username.clone(),
                initial: entry
                    .username
                    .chars()
                    .next()
                    .map_or('?', |c| c.to_ascii_uppercase()),
                avatar_url: entry.avatar_url.clone(),
                points_label: points_label(entry.total_score),
                games_label: games_label(entry.games_played),
                last_played_label: entry
                    .last_played_at
                    .map(|at| format!("Last played {}", format_date(at))),
                is_podium: rank <= 3,
            }
        })
        .collect()
}

/// Header badge with the player's career points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CareerBadgeVm {
    pub points_label: String,
    pub caption: &'static str,
}

#[must_use]
pub fn map_career_badge(total: CareerTotal) -> CareerBadgeVm {
    CareerBadgeVm {
        points_label: points_label(total.score()),
        caption: if total.is_remote() {
            "Career total"
        } else {
            "On this device"
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::UserId;

    fn entry(name: &str, total: u64, games: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            user_id: UserId::random(),
            username: name.to_string(),
            avatar_url: None,
            total_score: total,
            games_played: games,
            last_played_at: None,
        }
    }

    #[test]
    fn rows_carry_rank_points_and_games() {
        let rows = map_leaderboard_rows(&[
            entry("ada", 120_400, 3),
            entry("bo", 50_000, 1),
            entry("cy", 0, 0),
            entry("dee", 0, 0),
        ]);
        assert_eq!(rows[0].rank_label, "#1");
        assert_eq!(rows[0].points_label, "120 pts");
        assert_eq!(rows[0].games_label, "3 games");
        assert_eq!(rows[1].games_label, "1 game");
        assert_eq!(rows[1].initial, 'B');
        assert!(rows[2].is_podium);
        assert_eq!(rows[2].last_played_label, None);
        assert!(!rows[3].is_podium);
    }

    #[test]
    fn career_badge_names_its_source() {
        assert_eq!(
            map_career_badge(CareerTotal::Local(20_000)),
            CareerBadgeVm {
                points_label: "20 pts".to_string(),
                caption: "On this device",
            }
        );
        assert_eq!(map_career_badge(CareerTotal::Remote(0)).caption, "Career total");
    }
}
