//! Splitting tasks into completed and incomplete by their end date.
//!
//! Completion is derived from the calendar, not from `is_finished`: a task is
//! completed once its end date lies strictly before today. The split is never
//! cached, so callers re-evaluate it whenever they render.

use crate::task::Task;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Completed,
    Incomplete,
}

impl Task {
    pub fn completion(&self, today: NaiveDate) -> Completion {
        if self.end_date < today {
            Completion::Completed
        } else {
            Completion::Incomplete
        }
    }
}

/// Two disjoint views over a task slice, each in input order.
#[derive(Debug, Default)]
pub struct Partition<'a> {
    pub completed: Vec<&'a Task>,
    pub incomplete: Vec<&'a Task>,
}

pub fn partition(tasks: &[Task], today: NaiveDate) -> Partition<'_> {
    let mut split = Partition::default();
    for task in tasks {
        match task.completion(today) {
            Completion::Completed => split.completed.push(task),
            Completion::Incomplete => split.incomplete.push(task),
        }
    }
    split
}
