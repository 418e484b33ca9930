use crate::cycle::Outcome;
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};
use tracing::debug;

/// A page area that shows the outcome of the latest action for one form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    MarkResult,
    ReportResult,
    AddStudentResult,
    FixNamesResult,
    RosterTable,
    AttendanceRoster,
}

impl Region {
    pub fn id(self) -> &'static str {
        match self {
            Self::MarkResult => "mark-result",
            Self::ReportResult => "report-result",
            Self::AddStudentResult => "add-student-result",
            Self::FixNamesResult => "fix-names-result",
            Self::RosterTable => "students-list-container",
            Self::AttendanceRoster => "students-list",
        }
    }
}

/// Proof that a cycle was started for a region. Only the newest ticket of a
/// region may publish into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub region: Region,
    seq: u64,
}

#[derive(Default)]
struct Slot {
    issued: u64,
    shown: Option<Outcome>,
}

#[derive(Default)]
pub struct RegionBoard {
    slots: Mutex<HashMap<Region, Slot>>,
}

impl RegionBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, region: Region) -> Ticket {
        let mut slots = self.lock();
        let slot = slots.entry(region).or_default();
        slot.issued += 1;
        Ticket {
            region,
            seq: slot.issued,
        }
    }

    /// Stores the outcome unless a newer cycle for the same region has been
    /// started since; returns whether it was kept.
    pub fn commit(&self, ticket: Ticket, outcome: Outcome) -> bool {
        let mut slots = self.lock();
        let slot = slots.entry(ticket.region).or_default();
        if slot.issued != ticket.seq {
            debug!(
                "discarding stale {} response (ticket {}, newest {})",
                ticket.region.id(),
                ticket.seq,
                slot.issued
            );
            return false;
        }
        slot.shown = Some(outcome);
        true
    }

    /// Starts and finishes a cycle in one step, for outcomes decided locally.
    pub fn publish(&self, region: Region, outcome: Outcome) {
        let ticket = self.begin(region);
        self.commit(ticket, outcome);
    }

    pub fn shown(&self, region: Region) -> Option<Outcome> {
        self.lock().get(&region).and_then(|slot| slot.shown.clone())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Region, Slot>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_ticket_cannot_overwrite_newer_result() {
        let board = RegionBoard::new();
        let first = board.begin(Region::ReportResult);
        let second = board.begin(Region::ReportResult);

        assert!(board.commit(second, Outcome::info_text("second")));
        assert!(!board.commit(first, Outcome::info_text("first")));

        assert_eq!(
            board.shown(Region::ReportResult),
            Some(Outcome::info_text("second"))
        );
    }

    #[test]
    fn regions_are_independent() {
        let board = RegionBoard::new();
        let report = board.begin(Region::ReportResult);
        board.publish(Region::MarkResult, Outcome::info_text("marked"));

        assert!(board.commit(report, Outcome::info_text("report")));
        assert_eq!(board.shown(Region::AddStudentResult), None);
        assert_eq!(
            board.shown(Region::MarkResult),
            Some(Outcome::info_text("marked"))
        );
    }
}
