//! Checkpoint planner: converts the journal plus confirmed set into an
//! ordered action list, breaking read/write dependency cycles through the
//! temp region.

use crate::engine::page_position::LogPageHeader;
use itertools::Itertools;
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointActionKind {
    CopyToDataFile,
    CopyToTempFile,
    ClearPage,
}

/// One step of a checkpoint plan. For `ClearPage`, `position_id` is
/// the slot to zero and `target_position_id` is unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointAction {
    pub kind: CheckpointActionKind,
    pub position_id: i64,
    pub target_position_id: i64,
    pub must_clear: bool,
}

impl CheckpointAction {
    fn copy_to_data(position_id: i64, target_position_id: i64, must_clear: bool) -> Self {
        Self {
            kind: CheckpointActionKind::CopyToDataFile,
            position_id,
            target_position_id,
            must_clear,
        }
    }

    fn copy_to_temp(position_id: i64, target_position_id: i64, must_clear: bool) -> Self {
        Self {
            kind: CheckpointActionKind::CopyToTempFile,
            position_id,
            target_position_id,
            must_clear,
        }
    }

    fn clear(position_id: i64) -> Self {
        Self {
            kind: CheckpointActionKind::ClearPage,
            position_id,
            target_position_id: 0,
            must_clear: true,
        }
    }
}

pub struct CheckpointPlanner;

impl CheckpointPlanner {
    /// Builds the winning-version map: for each logical page, the confirmed
    /// entry with the greatest `PositionID`.
    fn winners(
        headers: &[LogPageHeader],
        confirmed: &HashSet<u64>,
    ) -> HashMap<i64, LogPageHeader> {
        let mut winners: HashMap<i64, LogPageHeader> = HashMap::new();
        for header in headers {
            if !confirmed.contains(&header.transaction_id()) {
                continue;
            }
            winners
                .entry(header.page_id())
                .and_modify(|current| {
                    if header.position_id() > current.position_id() {
                        *current = *header;
                    }
                })
                .or_insert(*header);
        }
        winners
    }

    /// `temp_pages` is filled with `source -> temp slot` for every
    /// relocation performed.
    pub fn plan(
        headers: &[LogPageHeader],
        confirmed: &HashSet<u64>,
        last_page_id: i64,
        start_temp_position_id: i64,
        temp_pages: &mut HashMap<i64, i64>,
    ) -> Vec<CheckpointAction> {
        let winners = Self::winners(headers, confirmed);

        // Losers: every journal entry that is not the winning version for
        // its page_id (unconfirmed transactions and superseded confirmed
        // entries alike). Their log slots just get cleared.
        let losers: Vec<&LogPageHeader> = headers
            .iter()
            .filter(|h| winners.get(&h.page_id()) != Some(*h))
            .collect();

        // source -> target dependency graph: since every winner's target IS
        // its own page_id, a winner's source conflicts with another winner
        // exactly when that source number equals the other winner's page_id
        // (possible once the data region grows to cover pages that were
        // numbered inside what used to be the log region).
        let _ = last_page_id; // region classification is implicit here: only
        // log-written entries ever appear in `winners`.
        let mut sources: HashMap<i64, i64> = winners
            .iter()
            .filter(|(&pid, h)| h.position_id() != pid)
            .map(|(&pid, h)| (pid, h.position_id()))
            .collect();

        // `pid` reads slot `src`; if `src` is itself some other winner's
        // page_id, that winner's write to `src` must happen after `pid`'s
        // read, i.e. `src` is blocked on `pid`.
        let mut dependents: HashMap<i64, Vec<i64>> = HashMap::new();
        let mut blocked_on: HashMap<i64, i64> = HashMap::new();
        for (&pid, &src) in sources.iter() {
            if winners.contains_key(&src) && src != pid {
                dependents.entry(pid).or_default().push(src);
                blocked_on.insert(src, pid);
            }
        }

        let mut ready: VecDeque<i64> = sources
            .keys()
            .copied()
            .filter(|pid| !blocked_on.contains_key(pid))
            .sorted_by(|a, b| b.cmp(a)) // greater PageID written first (tie-break)
            .collect();

        let mut actions = Vec::new();
        let mut done: HashSet<i64> = HashSet::new();
        let mut temp_counter = temp_pages.len() as i64;

        while !sources.is_empty() {
            if let Some(pid) = ready.pop_front() {
                if done.contains(&pid) {
                    continue;
                }
                let src = sources.remove(&pid).unwrap();
                let must_clear = !winners.contains_key(&src);
                actions.push(CheckpointAction::copy_to_data(src, pid, must_clear));
                done.insert(pid);

                if let Some(waiting) = dependents.remove(&pid) {
                    for w in waiting {
                        blocked_on.remove(&w);
                        ready.push_back(w);
                    }
                }
                ready = ready.into_iter().sorted_by(|a, b| b.cmp(a)).collect();
                continue;
            }

            // No ready node: the remaining sources form a cycle. Some blocked
            // position `victim` holds data a still-waiting reader needs, and
            // is itself about to be overwritten by its own winner's write.
            // Relocate `victim`'s current content to the temp region first,
            // then redirect that reader to the temp slot instead. One level
            // of indirection is always enough to break the cycle.
            let Some(&victim) = blocked_on.keys().sorted().next() else {
                break;
            };
            let reader = blocked_on.remove(&victim).unwrap();
            let temp_slot = start_temp_position_id + temp_counter;
            temp_counter += 1;
            temp_pages.insert(victim, temp_slot);

            let must_clear = !winners.contains_key(&victim);
            actions.push(CheckpointAction::copy_to_temp(victim, temp_slot, must_clear));

            // `reader` now reads from the temp slot instead of `victim`.
            sources.insert(reader, temp_slot);
            if let Some(list) = dependents.get_mut(&reader) {
                list.retain(|&p| p != victim);
            }
            ready.push_back(victim);
            ready = ready.into_iter().sorted_by(|a, b| b.cmp(a)).collect();
        }

        // Winners whose source is already inside the data region (trivial:
        // source == target, or the entry predates this checkpoint and never
        // left the data region) need no copy at all.

        for header in losers {
            actions.push(CheckpointAction::clear(header.position_id()));
        }

        actions
    }
}
