//! Lazy, restartable view over a record sequence

use std::iter::FusedIterator;

use super::filter::RecordFilter;
use crate::ledger::Record;

/// Iteration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Oldest first
    #[default]
    Chronological,
    /// Newest first
    Reverse,
}

/// Filter, order and limit for a log view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogQuery {
    pub filter: RecordFilter,
    pub order: Order,
    pub limit: Option<usize>,
}

impl LogQuery {
    /// Applies the query to a sequence. Nothing is evaluated until iteration.
    pub fn view<'a>(&self, records: &'a [Record]) -> LogView<'a> {
        LogView {
            records,
            filter: self.filter,
            order: self.order,
            front: 0,
            back: records.len(),
            remaining: self.limit,
        }
    }
}

/// Iterator over matching records.
///
/// Cloning yields an independent iterator from the current point, so a
/// fresh clone of an unstarted view replays the whole result.
#[derive(Debug, Clone)]
pub struct LogView<'a> {
    records: &'a [Record],
    filter: RecordFilter,
    order: Order,
    /// Unvisited records are `records[front..back]`
    front: usize,
    back: usize,
    remaining: Option<usize>,
}

impl<'a> LogView<'a> {
    fn step(&mut self) -> Option<&'a Record> {
        if self.front >= self.back {
            return None;
        }
        let records = self.records;
        match self.order {
            Order::Chronological => {
                let record = &records[self.front];
                self.front += 1;
                Some(record)
            }
            Order::Reverse => {
                self.back -= 1;
                Some(&records[self.back])
            }
        }
    }
}

impl<'a> Iterator for LogView<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            return None;
        }
        while let Some(record) = self.step() {
            if self.filter.matches(record) {
                if let Some(n) = self.remaining.as_mut() {
                    *n -= 1;
                }
                return Some(record);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let unvisited = self.back - self.front;
        let upper = match self.remaining {
            Some(n) => n.min(unvisited),
            None => unvisited,
        };
        (0, Some(upper))
    }
}

impl FusedIterator for LogView<'_> {}
