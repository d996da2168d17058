use services::AnalyticsSnapshot;

use crate::vm::quiz_vm::points_label;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KpiCardVm {
    pub title: &'static str,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BarVm {
    pub label: String,
    pub count: u64,
    /// Height relative to the tallest bar, 0-100.
    pub percent: u8,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalyticsVm {
    pub cards: Vec<KpiCardVm>,
    pub activity: Vec<BarVm>,
    pub distribution: Vec<BarVm>,
}

fn bars(points: Vec<(String, u64)>) -> Vec<BarVm> {
    let peak = points.iter().map(|(_, count)| *count).max().unwrap_or(0);
    points
        .into_iter()
        .map(|(label, count)| BarVm {
            label,
            count,
            percent: if peak == 0 {
                0
            } else {
                u8::try_from(count * 100 / peak).unwrap_or(100)
            },
        })
        .collect()
}

#[must_use]
pub fn map_analytics(snapshot: &AnalyticsSnapshot) -> AnalyticsVm {
    let cards = vec![
        KpiCardVm {
            title: "Players",
            value: snapshot.total_users.to_string(),
        },
        KpiCardVm {
            title: "Attempts",
            value: snapshot.total_attempts.to_string(),
        },
        KpiCardVm {
            title: "Average score",
            value: points_label(snapshot.average_score),
        },
        KpiCardVm {
            title: "Best score",
            value: points_label(snapshot.max_score),
        },
        KpiCardVm {
            title: "Completion",
            value: format!("{}%", snapshot.completion_rate),
        },
    ];
    AnalyticsVm {
        cards,
        activity: bars(
            snapshot
                .activity
                .iter()
                .map(|point| (point.label.clone(), point.attempts))
                .collect(),
        ),
        distribution: bars(
            snapshot
                .distribution
                .iter()
                .map(|bucket| (bucket.label.to_string(), bucket.count))
                .collect(),
        ),
    }
}
