//! Bounded in-memory history. Lost on restart.

use std::collections::VecDeque;

use anyhow::Result;

use super::HistoryBackend;
use crate::record::{Limit, NotificationRecord};

pub struct MemoryBackend {
    records: VecDeque<NotificationRecord>,
    capacity: usize,
}

impl MemoryBackend {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }
}

impl HistoryBackend for MemoryBackend {
    fn insert(&mut self, record: NotificationRecord) -> Result<()> {
        self.records.push_front(record);
        self.records.truncate(self.capacity);
        Ok(())
    }

    fn recent(&self, limit: Limit) -> Result<Vec<NotificationRecord>> {
        let n = limit.take(self.records.len());
        Ok(self.records.iter().take(n).cloned().collect())
    }

    fn remove_recent(&mut self, limit: Limit) -> Result<usize> {
        let n = limit.take(self.records.len());
        Ok(self.records.drain(..n).count())
    }

    fn remove_all(&mut self) -> Result<usize> {
        let n = self.records.len();
        self.records.clear();
        Ok(n)
    }

    fn len(&self) -> Result<usize> {
        Ok(self.records.len())
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{conformance, History};
    use crate::record::{sample, Limit};

    fn history() -> History {
        History::memory(100)
    }

    #[test]
    fn self_exclusion_scenario() {
        conformance::self_exclusion_scenario(history());
    }

    #[test]
    fn query_is_newest_first_prefix() {
        conformance::query_is_newest_first_prefix(history());
    }

    #[test]
    fn purge_removes_query_prefix() {
        conformance::purge_removes_query_prefix(history());
    }

    #[test]
    fn clear_empties() {
        conformance::clear_empties(history());
    }

    #[test]
    fn empty_content_is_kept() {
        conformance::empty_content_is_kept(history());
    }

    #[test]
    fn capacity_drops_oldest() {
        let mut history = History::memory(3);
        for summary in ["a", "b", "c", "d", "e"] {
            history.record(sample("App", summary, "")).unwrap();
        }

        let kept: Vec<_> = history
            .query(Limit::All)
            .unwrap()
            .into_iter()
            .map(|r| r.summary)
            .collect();
        assert_eq!(kept, ["e", "d", "c"]);
    }

    #[test]
    fn zero_capacity_still_keeps_latest() {
        let mut history = History::memory(0);
        history.record(sample("App", "a", "")).unwrap();
        history.record(sample("App", "b", "")).unwrap();

        assert_eq!(history.len().unwrap(), 1);
        assert_eq!(history.query(Limit::All).unwrap()[0].summary, "b");
    }
}
