//! Time-ordered plan queue.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use nucleus_types::ContractError;

use crate::context::Context;

/// A callback scheduled to run at a simulation time.
pub type Plan = Box<dyn FnOnce(&mut Context) -> Result<(), ContractError>>;

/// Simulation time with a total order, so it can key a `BTreeMap`.
#[derive(Debug, Clone, Copy)]
struct PlanTime(f64);

impl PartialEq for PlanTime {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for PlanTime {}

impl PartialOrd for PlanTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PlanTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Plans ordered by time, then by the order they were added.
#[derive(Default)]
pub(crate) struct PlanQueue {
    next_sequence: u64,
    plans: BTreeMap<(PlanTime, u64), Plan>,
}

impl PlanQueue {
    pub(crate) fn push(&mut self, time: f64, plan: Plan) {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        self.plans.insert((PlanTime(time), sequence), plan);
    }

    pub(crate) fn peek_time(&self) -> Option<f64> {
        self.plans.first_key_value().map(|((time, _), _)| time.0)
    }

    pub(crate) fn pop(&mut self) -> Option<(f64, Plan)> {
        self.plans
            .pop_first()
            .map(|((time, _), plan)| (time.0, plan))
    }

    pub(crate) fn len(&self) -> usize {
        self.plans.len()
    }
}
