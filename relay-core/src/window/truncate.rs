//! Sliding-Window Truncator (C16): drops the lowest-priority messages,
//! respecting tool-pair atomicity, until the message set fits the budget.

use super::tool_pairs::analyze;
use crate::error::TruncateError;
use relay_protocol::ContextMessage;
use relay_protocol::MessagePriority;
use relay_protocol::Role;
use std::collections::BTreeSet;

/// Assigns priorities per §4.14 step 1: position-0/system messages get
/// `SYSTEM`, the first user message gets `ANCHOR`, the last `recent_n` get
/// `RECENT`, anything touching a tool pair gets at least `TOOL_PAIR`, the
/// rest stay `NORMAL`.
pub fn assign_priorities(messages: &[ContextMessage], recent_n: usize) -> Vec<MessagePriority> {
    let analysis = analyze(messages);
    let len = messages.len();
    let first_user = messages.iter().position(|m| m.role == Role::User);
    let recent_start = len.saturating_sub(recent_n);

    (0..len)
        .map(|i| {
            if i == 0 || messages[i].role == Role::System {
                return MessagePriority::SYSTEM;
            }
            if Some(i) == first_user {
                return MessagePriority::ANCHOR;
            }
            if i >= recent_start {
                return MessagePriority::RECENT;
            }
            if !analysis.linked_indices(i).is_empty() {
                return MessagePriority::TOOL_PAIR;
            }
            MessagePriority::NORMAL
        })
        .collect()
}

/// Truncates `messages` to fit `budget` tokens as counted by `token_count`
/// (expected to already fold in image-block cost, per C14). Returns the
/// messages unchanged if already within budget. `recent_n` defaults to 3
/// per the spec.
pub fn truncate(
    messages: &[ContextMessage],
    budget: usize,
    recent_n: usize,
    token_count: &dyn Fn(&[ContextMessage]) -> usize,
) -> Result<Vec<ContextMessage>, TruncateError> {
    let total = token_count(messages);
    if total <= budget {
        return Ok(messages.to_vec());
    }

    let priorities = assign_priorities(messages, recent_n);
    let analysis = analyze(messages);
    let median = messages.len() / 2;

    let mut candidate_order: Vec<usize> = (0..messages.len()).collect();
    candidate_order.sort_by_key(|&i| {
        let distance = (i as i64 - median as i64).unsigned_abs() as usize;
        (priorities[i], distance)
    });

    let mut removed: BTreeSet<usize> = BTreeSet::new();

    for &i in &candidate_order {
        if removed.contains(&i) {
            continue;
        }
        if priorities[i] >= MessagePriority::ANCHOR {
            // SYSTEM/ANCHOR messages are never removed; since the order is
            // ascending by priority, everything remaining is >= ANCHOR too.
            break;
        }

        let mut removal_set = analysis.linked_indices(i);
        removal_set.insert(i);

        let remaining: Vec<ContextMessage> = messages
            .iter()
            .enumerate()
            .filter(|(idx, _)| !removed.contains(idx) && !removal_set.contains(idx))
            .map(|(_, m)| m.clone())
            .collect();

        if token_count(&remaining) <= budget {
            return Ok(remaining);
        }

        removed.extend(removal_set);
    }

    let remaining: Vec<ContextMessage> = messages
        .iter()
        .enumerate()
        .filter(|(idx, _)| !removed.contains(idx))
        .map(|(_, m)| m.clone())
        .collect();

    if token_count(&remaining) <= budget {
        Ok(remaining)
    } else {
        Err(TruncateError::OverflowUnrecoverable)
    }
}
