use tokio::sync::broadcast;

/// Tables that publish change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Questions,
    Attempts,
    History,
    Leaderboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A single change notification. Carries no row data; subscribers re-fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableChange {
    pub table: Table,
    pub kind: ChangeKind,
}

/// Fan-out of table changes to any number of subscribers.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<TableChange>,
}

impl ChangeFeed {
    const CAPACITY: usize = 64;

    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(Self::CAPACITY);
        Self { tx }
    }

    /// Publish a change. Having no subscribers is not an error.
    pub fn publish(&self, table: Table, kind: ChangeKind) {
        let change = TableChange { table, kind };
        if self.tx.send(change).is_err() {
            tracing::trace!(?change, "change published without subscribers");
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TableChange> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_changes() {
        let feed = ChangeFeed::new();
        let mut rx = feed.subscribe();
        feed.publish(Table::Leaderboard, ChangeKind::Update);

        let change = rx.recv().await.unwrap();
        assert_eq!(change.table, Table::Leaderboard);
        assert_eq!(change.kind, ChangeKind::Update);
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let feed = ChangeFeed::default();
        feed.publish(Table::Questions, ChangeKind::Insert);
        assert_eq!(feed.subscriber_count(), 0);
    }
}
