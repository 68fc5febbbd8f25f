//! Covenant state machine
//!
//! Scans a name's history left to right and labels covenant transitions.
//! The only carried state is the previous covenant and its claim height.

use crate::data_source::{Covenant, CovenantKind};
use crate::indexer::HistoryRecord;
use crate::state_machine::{ClassifiedEvent, LifecycleEvent};

/// Lazy iterator of lifecycle events over a history
#[derive(Debug, Clone)]
pub struct CovenantEvents<'a> {
    records: std::slice::Iter<'a, HistoryRecord>,
    last_covenant: Option<&'a Covenant>,
    last_claim_height: Option<u64>,
}

impl<'a> CovenantEvents<'a> {
    pub fn new(records: &'a [HistoryRecord]) -> Self {
        Self {
            records: records.iter(),
            last_covenant: None,
            last_claim_height: None,
        }
    }

    fn classify(&self, covenant: &Covenant) -> Option<LifecycleEvent> {
        let last_was_bid = self
            .last_covenant
            .is_some_and(|last| last.kind == CovenantKind::Bid);

        match covenant.kind {
            CovenantKind::Transfer if last_was_bid => Some(LifecycleEvent::Register),
            CovenantKind::Bid => match (self.last_claim_height, covenant.claim_height) {
                (None, Some(claim_height)) => Some(LifecycleEvent::Rollout { claim_height }),
                _ => Some(LifecycleEvent::Bid {
                    amount: covenant.total_burned,
                }),
            },
            CovenantKind::Transfer => Some(LifecycleEvent::Transfer),
            CovenantKind::Other(_) => None,
        }
    }
}

impl<'a> Iterator for CovenantEvents<'a> {
    type Item = ClassifiedEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = self.records.next()?;
            // Records without a covenant leave the carried state untouched
            let Some(covenant) = record.covenant() else {
                continue;
            };

            let event = self.classify(covenant);
            self.last_covenant = Some(covenant);
            self.last_claim_height = covenant.claim_height;

            if let Some(event) = event {
                return Some(ClassifiedEvent { event, record });
            }
        }
    }
}

/// Classify a history into lifecycle events
pub fn covenant_events(records: &[HistoryRecord]) -> CovenantEvents<'_> {
    CovenantEvents::new(records)
}
