use std::collections::HashMap;

use habit_core::{Habit, HabitId};

/// Merge a refetched server record over the optimistic local copy.
///
/// The server wins, except that an empty server `completion_history` keeps
/// the local one (the server has not yet seen the optimistic write).
pub fn reconcile(local: &Habit, remote: Habit) -> Habit {
    let mut merged = remote;
    if merged.completion_history.is_empty() && !local.completion_history.is_empty() {
        merged.completion_history = local.completion_history.clone();
    }
    merged
}

/// Apply [`reconcile`] per id. The server list decides which habits exist.
pub fn reconcile_all(local: &[Habit], remote: Vec<Habit>) -> Vec<Habit> {
    let by_id: HashMap<&HabitId, &Habit> = local.iter().map(|habit| (&habit.id, habit)).collect();
    remote
        .into_iter()
        .map(|incoming| match by_id.get(&incoming.id) {
            Some(existing) => reconcile(existing, incoming),
            None => incoming,
        })
        .collect()
}
