//! Candidate selection.
//!
//! Pure computation: no I/O and no transaction awareness. Candidates are
//! `active_team_members \ excluded`, kept in the order the members were given.

use std::collections::HashSet;

use crate::traits::random::RandomSource;
use crate::types::{ids::UserId, team::User};

/// Maximum number of reviewer slots on a pull request.
pub const MAX_REVIEWERS: usize = 2;

/// Users that must not be offered as a new reviewer for one decision.
#[derive(Debug, Default, Clone)]
pub struct Exclusions<'a> {
    ids: HashSet<&'a UserId>,
}

impl<'a> Exclusions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, user_id: &'a UserId) -> Self {
        self.ids.insert(user_id);
        self
    }

    pub fn with_all(mut self, user_ids: impl IntoIterator<Item = &'a UserId>) -> Self {
        self.ids.extend(user_ids);
        self
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.ids.contains(user_id)
    }
}

/// Active members not excluded, in input order.
///
/// Inactive users in `members` are skipped even if the caller passed them in.
pub fn eligible_candidates(members: &[User], excluded: &Exclusions<'_>) -> Vec<UserId> {
    eligible_ids(
        members.iter().filter(|u| u.is_active).map(|u| &u.user_id),
        excluded,
    )
}

/// Same as [`eligible_candidates`] for callers that already hold active ids.
pub fn eligible_ids<'a>(
    active_ids: impl IntoIterator<Item = &'a UserId>,
    excluded: &Exclusions<'_>,
) -> Vec<UserId> {
    let mut seen = HashSet::new();
    active_ids
        .into_iter()
        .filter(|id| !excluded.contains(id) && seen.insert(*id))
        .cloned()
        .collect()
}

/// Initial reviewers for a new pull request: a uniformly random subset of
/// size `min(MAX_REVIEWERS, candidates.len())`.
pub fn choose_initial_reviewers<R: RandomSource + ?Sized>(
    mut candidates: Vec<UserId>,
    random: &R,
) -> Vec<UserId> {
    random.shuffle(&mut candidates);
    candidates.truncate(MAX_REVIEWERS);
    candidates
}

/// One uniformly chosen replacement, or `None` when nobody is eligible.
pub fn choose_replacement<R: RandomSource + ?Sized>(
    candidates: &[UserId],
    random: &R,
) -> Option<UserId> {
    if candidates.is_empty() {
        return None;
    }
    let index = random.pick_index(candidates.len()) % candidates.len();
    Some(candidates[index].clone())
}

/// Put `new` into the slot held by `old`; other slots keep their position.
pub fn replace_slot(reviewers: &[UserId], old: &UserId, new: &UserId) -> Vec<UserId> {
    reviewers
        .iter()
        .map(|r| if r == old { new.clone() } else { r.clone() })
        .collect()
}
