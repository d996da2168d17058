use storage::{ChangeFeed, Table};
use tokio::sync::broadcast::error::RecvError;

/// Wakes a view when one of the tables it shows changes.
///
/// Carries no data: the caller re-fetches everything it displays.
#[derive(Debug)]
pub struct LiveRefresh {
    rx: tokio::sync::broadcast::Receiver<storage::TableChange>,
    tables: Vec<Table>,
}

impl LiveRefresh {
    #[must_use]
    pub fn new(feed: &ChangeFeed, tables: &[Table]) -> Self {
        Self {
            rx: feed.subscribe(),
            tables: tables.to_vec(),
        }
    }

    /// Wait for the next relevant change.
    ///
    /// Returns `false` once the feed is gone. Missed notifications count as a
    /// change, since a re-fetch covers them all.
    pub async fn changed(&mut self) -> bool {
        loop {
            match self.rx.recv().await {
                Ok(change) if self.tables.contains(&change.table) => return true,
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => {
                    tracing::debug!(missed, "live refresh lagged");
                    return true;
                }
                Err(RecvError::Closed) => return false,
            }
        }
    }
}
