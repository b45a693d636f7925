//! End-to-end engine scenarios over the in-memory store.
//!
//! Covers:
//! - createPR: initial reviewer assignment
//! - reassignReviewer: single slot replacement
//! - bulkDeactivate: cascade repair, atomicity, per-PR candidate pools

use assignment::testing::{FailPoint, FaultyStore, ScriptedRandom, SeededRandom};
use assignment::{
    AssignmentEngine, AssignmentError, MemoryStore, NewPullRequest, PullRequest, PullRequestId,
    PullRequestStatus, RandomSource, ReviewStore, Team, TeamMember, UserId,
};
use std::collections::HashSet;

fn ids(values: &[&str]) -> Vec<UserId> {
    values.iter().map(|v| UserId::from(*v)).collect()
}

fn team(name: &str, members: &[&str]) -> Team {
    Team::new(
        name,
        members
            .iter()
            .map(|id| TeamMember::new(*id, format!("user {}", id), true))
            .collect(),
    )
}

async fn engine_with<R: RandomSource>(
    random: R,
    members: &[&str],
) -> AssignmentEngine<MemoryStore, R> {
    let engine = AssignmentEngine::with_random(MemoryStore::new(), random);
    engine.create_team(team("backend", members)).await.unwrap();
    engine
}

/// Seed a pull request with a fixed reviewer set, bypassing selection.
async fn seed_pr<S: ReviewStore>(store: &S, id: &str, author: &str, reviewers: &[&str]) {
    store
        .create_pr(&PullRequest::open(
            id.into(),
            format!("PR {}", id),
            author.into(),
            ids(reviewers),
        ))
        .await
        .unwrap();
}

async fn reviewers_of<S: ReviewStore>(store: &S, id: &str) -> Vec<UserId> {
    store
        .get_pr(&id.into())
        .await
        .unwrap()
        .unwrap()
        .assigned_reviewers
}

async fn is_active<S: ReviewStore>(store: &S, id: &str) -> bool {
    store.get_user(&id.into()).await.unwrap().unwrap().is_active
}

// =============================================================================
// PR creation
// =============================================================================

#[tokio::test]
async fn scenario_a_author_gets_both_teammates() {
    for seed in 0..8 {
        // Arrange
        let engine = engine_with(SeededRandom::with_seed(seed), &["a", "b", "c"]).await;

        // Act
        let pr = engine
            .create_pr(NewPullRequest::new("pr-1", "Add search", "a"))
            .await
            .unwrap();

        // Assert: exactly {b, c} in some order
        let set: HashSet<&str> = pr.assigned_reviewers.iter().map(|r| r.as_str()).collect();
        assert_eq!(set, HashSet::from(["b", "c"]));
        assert_eq!(pr.status, PullRequestStatus::Open);
    }
}

#[tokio::test]
async fn scenario_b_single_candidate() {
    let engine = engine_with(ScriptedRandom::default(), &["a", "b"]).await;

    let pr = engine
        .create_pr(NewPullRequest::new("pr-1", "Add search", "a"))
        .await
        .unwrap();

    assert_eq!(pr.assigned_reviewers, ids(&["b"]));
    assert_eq!(reviewers_of(engine.store(), "pr-1").await, ids(&["b"]));
}

#[tokio::test]
async fn lone_author_gets_no_reviewers() {
    let engine = engine_with(ScriptedRandom::default(), &["a"]).await;

    let pr = engine
        .create_pr(NewPullRequest::new("pr-1", "Solo", "a"))
        .await
        .unwrap();

    assert!(pr.assigned_reviewers.is_empty());
}

#[tokio::test]
async fn scripted_shuffle_decides_initial_reviewers() {
    let engine = engine_with(
        ScriptedRandom::default().with_rotation(1),
        &["a", "b", "c", "d"],
    )
    .await;

    let pr = engine
        .create_pr(NewPullRequest::new("pr-1", "Add search", "a"))
        .await
        .unwrap();

    assert_eq!(pr.assigned_reviewers, ids(&["c", "d"]));
}

#[tokio::test]
async fn failed_store_write_leaves_no_pr() {
    let store = FaultyStore::new(MemoryStore::new(), FailPoint::CreatePr);
    let engine = AssignmentEngine::with_random(store, ScriptedRandom::default());
    engine.create_team(team("backend", &["a", "b"])).await.unwrap();

    let err = engine
        .create_pr(NewPullRequest::new("pr-1", "Add search", "a"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "INTERNAL_ERROR");
    assert_eq!(engine.store().inner().pr_count().await, 0);
}

// =============================================================================
// Single reassignment
// =============================================================================

#[tokio::test]
async fn scenario_c_replacement_takes_the_same_slot() {
    let engine = engine_with(ScriptedRandom::default(), &["a", "b", "c", "d"]).await;
    seed_pr(engine.store(), "pr-1", "a", &["b", "c"]).await;

    let response = engine
        .reassign_reviewer(&"pr-1".into(), &"b".into())
        .await
        .unwrap();

    assert_eq!(response.replaced_by, UserId::from("d"));
    assert_eq!(response.pr.assigned_reviewers, ids(&["d", "c"]));
    assert_eq!(reviewers_of(engine.store(), "pr-1").await, ids(&["d", "c"]));
}

#[tokio::test]
async fn scenario_d_no_candidate_leaves_pr_unchanged() {
    let engine = engine_with(ScriptedRandom::default(), &["a", "b"]).await;
    seed_pr(engine.store(), "pr-1", "a", &["b"]).await;

    let err = engine
        .reassign_reviewer(&"pr-1".into(), &"b".into())
        .await
        .unwrap_err();

    assert!(matches!(err, AssignmentError::NoCandidate));
    assert_eq!(err.to_string(), "no active replacement candidate in team");
    assert_eq!(reviewers_of(engine.store(), "pr-1").await, ids(&["b"]));
}

#[tokio::test]
async fn reassignment_picks_uniformly_by_index() {
    let engine = engine_with(ScriptedRandom::new([1]), &["a", "b", "c", "d", "e"]).await;
    seed_pr(engine.store(), "pr-1", "a", &["b", "c"]).await;

    let response = engine
        .reassign_reviewer(&"pr-1".into(), &"c".into())
        .await
        .unwrap();

    // Candidates are [d, e]; index 1 picks e.
    assert_eq!(response.replaced_by, UserId::from("e"));
    assert_eq!(response.pr.assigned_reviewers, ids(&["b", "e"]));
}

#[tokio::test]
async fn reassignment_skips_inactive_teammates() {
    let engine = engine_with(ScriptedRandom::default(), &["a", "b", "c", "d"]).await;
    seed_pr(engine.store(), "pr-1", "a", &["b"]).await;
    engine.set_user_active(&"c".into(), false).await.unwrap();

    let response = engine
        .reassign_reviewer(&"pr-1".into(), &"b".into())
        .await
        .unwrap();

    assert_eq!(response.replaced_by, UserId::from("d"));
}

#[tokio::test]
async fn concurrent_reassignments_never_duplicate_a_reviewer() {
    for seed in 0..8 {
        let engine = engine_with(SeededRandom::with_seed(seed), &["a", "b", "c", "d", "e"]).await;
        seed_pr(engine.store(), "pr-1", "a", &["b", "c"]).await;

        let pr_id = PullRequestId::from("pr-1");
        let (b, c) = (UserId::from("b"), UserId::from("c"));
        let (first, second) = tokio::join!(
            engine.reassign_reviewer(&pr_id, &b),
            engine.reassign_reviewer(&pr_id, &c),
        );
        first.unwrap();
        second.unwrap();

        let reviewers = reviewers_of(engine.store(), "pr-1").await;
        let unique: HashSet<_> = reviewers.iter().collect();
        assert_eq!(reviewers.len(), 2);
        assert_eq!(unique.len(), 2);
        assert!(!reviewers.contains(&UserId::from("a")));
    }
}

// =============================================================================
// Bulk deactivation
// =============================================================================

#[tokio::test]
async fn scenario_e_shared_reviewer_replaced_on_every_pr() {
    let engine = engine_with(ScriptedRandom::default(), &["a", "b", "c", "d"]).await;
    seed_pr(engine.store(), "pr-1", "a", &["b", "c"]).await;
    seed_pr(engine.store(), "pr-2", "a", &["b", "d"]).await;

    let response = engine
        .bulk_deactivate(&"backend".into(), &ids(&["b"]))
        .await
        .unwrap();

    assert_eq!(response.deactivated_users, ids(&["b"]));
    assert_eq!(response.reassigned_prs.len(), 2);
    assert!(response.failed_reassignments.is_empty());
    assert_eq!(reviewers_of(engine.store(), "pr-1").await, ids(&["d", "c"]));
    assert_eq!(reviewers_of(engine.store(), "pr-2").await, ids(&["c", "d"]));
    assert!(!is_active(engine.store(), "b").await);
    assert!(is_active(engine.store(), "c").await);
    assert!(is_active(engine.store(), "d").await);
}

#[tokio::test]
async fn scenario_f_empty_pool_vacates_the_slot() {
    let engine = engine_with(ScriptedRandom::default(), &["a", "b"]).await;
    seed_pr(engine.store(), "pr-1", "a", &["b"]).await;

    let response = engine
        .bulk_deactivate(&"backend".into(), &ids(&["b"]))
        .await
        .unwrap();

    assert_eq!(response.reassigned_prs.len(), 1);
    assert!(response.reassigned_prs[0].replacements.is_empty());
    assert_eq!(response.failed_reassignments.len(), 1);
    let failure = &response.failed_reassignments[0];
    assert_eq!(failure.pull_request_id.as_str(), "pr-1");
    assert_eq!(failure.old_user_id.as_str(), "b");
    assert_eq!(failure.reason, "no active replacement candidate available");
    assert!(reviewers_of(engine.store(), "pr-1").await.is_empty());
    assert!(!is_active(engine.store(), "b").await);
}

#[tokio::test]
async fn deactivating_users_are_never_offered_as_replacements() {
    let engine = engine_with(ScriptedRandom::default(), &["a", "b", "c", "d"]).await;
    seed_pr(engine.store(), "pr-1", "a", &["b"]).await;
    seed_pr(engine.store(), "pr-2", "a", &["c"]).await;

    let response = engine
        .bulk_deactivate(&"backend".into(), &ids(&["b", "c"]))
        .await
        .unwrap();

    assert_eq!(reviewers_of(engine.store(), "pr-1").await, ids(&["d"]));
    assert_eq!(reviewers_of(engine.store(), "pr-2").await, ids(&["d"]));
    let deactivating: HashSet<UserId> = ids(&["b", "c"]).into_iter().collect();
    for detail in &response.reassigned_prs {
        for replacement in &detail.replacements {
            assert!(!deactivating.contains(&replacement.new_user_id));
        }
    }
}

#[tokio::test]
async fn both_slots_get_distinct_replacements() {
    let engine = engine_with(ScriptedRandom::default(), &["a", "b", "c", "d", "e"]).await;
    seed_pr(engine.store(), "pr-1", "a", &["b", "c"]).await;

    let response = engine
        .bulk_deactivate(&"backend".into(), &ids(&["b", "c"]))
        .await
        .unwrap();

    assert_eq!(reviewers_of(engine.store(), "pr-1").await, ids(&["d", "e"]));
    assert_eq!(response.replacement_count(), 2);
}

#[tokio::test]
async fn merged_and_unrelated_prs_are_untouched() {
    let engine = engine_with(ScriptedRandom::default(), &["a", "b", "c", "d"]).await;
    seed_pr(engine.store(), "pr-merged", "a", &["b"]).await;
    seed_pr(engine.store(), "pr-other", "a", &["c"]).await;
    engine.merge_pr(&"pr-merged".into()).await.unwrap();

    let response = engine
        .bulk_deactivate(&"backend".into(), &ids(&["b"]))
        .await
        .unwrap();

    assert!(response.reassigned_prs.is_empty());
    assert_eq!(reviewers_of(engine.store(), "pr-merged").await, ids(&["b"]));
    assert_eq!(reviewers_of(engine.store(), "pr-other").await, ids(&["c"]));
    assert!(!is_active(engine.store(), "b").await);
}

#[tokio::test]
async fn unknown_team_is_not_found() {
    let engine = engine_with(ScriptedRandom::default(), &["a", "b"]).await;

    let err = engine
        .bulk_deactivate(&"frontend".into(), &ids(&["b"]))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "team not found");
    assert!(is_active(engine.store(), "b").await);
}

#[tokio::test]
async fn inactive_or_foreign_user_aborts_everything() {
    let engine = engine_with(ScriptedRandom::default(), &["a", "b", "c"]).await;
    engine.create_team(team("frontend", &["x"])).await.unwrap();
    engine.set_user_active(&"c".into(), false).await.unwrap();
    seed_pr(engine.store(), "pr-1", "a", &["b"]).await;

    for requested in [ids(&["b", "c"]), ids(&["b", "x"]), ids(&["b", "ghost"])] {
        let err = engine
            .bulk_deactivate(&"backend".into(), &requested)
            .await
            .unwrap_err();

        assert_eq!(err.code(), "NOT_FOUND");
        assert!(err.to_string().starts_with("user not found or not active: "));
        assert!(is_active(engine.store(), "b").await);
        assert_eq!(reviewers_of(engine.store(), "pr-1").await, ids(&["b"]));
    }
}

#[tokio::test]
async fn empty_request_is_a_no_op() {
    let engine = engine_with(ScriptedRandom::default(), &["a", "b"]).await;
    seed_pr(engine.store(), "pr-1", "a", &["b"]).await;

    let response = engine.bulk_deactivate(&"backend".into(), &[]).await.unwrap();

    assert!(response.deactivated_users.is_empty());
    assert!(response.reassigned_prs.is_empty());
    assert!(is_active(engine.store(), "b").await);
}

#[tokio::test]
async fn repeated_ids_are_collapsed() {
    let engine = engine_with(ScriptedRandom::default(), &["a", "b", "c"]).await;
    seed_pr(engine.store(), "pr-1", "a", &["b"]).await;

    let response = engine
        .bulk_deactivate(&"backend".into(), &ids(&["b", "b"]))
        .await
        .unwrap();

    assert_eq!(response.deactivated_users, ids(&["b"]));
    assert_eq!(response.replacement_count(), 1);
    assert_eq!(reviewers_of(engine.store(), "pr-1").await, ids(&["c"]));
}

#[tokio::test]
async fn retry_after_success_reports_users_inactive() {
    let engine = engine_with(ScriptedRandom::default(), &["a", "b", "c"]).await;

    engine
        .bulk_deactivate(&"backend".into(), &ids(&["b"]))
        .await
        .unwrap();
    let err = engine
        .bulk_deactivate(&"backend".into(), &ids(&["b"]))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "user not found or not active: b");
}

#[tokio::test]
async fn failure_at_any_step_rolls_back_everything() {
    for point in [
        FailPoint::Begin,
        FailPoint::OpenPrsReviewedBy,
        FailPoint::TxUpdatePrReviewers,
        FailPoint::TxUpdateUserActive,
        FailPoint::Commit,
    ] {
        // Arrange
        let store = FaultyStore::new(MemoryStore::new(), point);
        let engine = AssignmentEngine::with_random(store, ScriptedRandom::default());
        engine
            .create_team(team("backend", &["a", "b", "c", "d"]))
            .await
            .unwrap();
        seed_pr(engine.store(), "pr-1", "a", &["b", "c"]).await;
        seed_pr(engine.store(), "pr-2", "a", &["b", "d"]).await;

        let users_before = engine.store().inner().all_users().await;
        let prs_before = engine.store().inner().all_prs().await;

        // Act
        let err = engine
            .bulk_deactivate(&"backend".into(), &ids(&["b", "c"]))
            .await
            .unwrap_err();

        // Assert
        assert_eq!(err.code(), "INTERNAL_ERROR", "fail point {:?}", point);
        assert_eq!(engine.store().inner().all_users().await, users_before);
        assert_eq!(engine.store().inner().all_prs().await, prs_before);
    }
}

// =============================================================================
// Invariants under random operations
// =============================================================================

#[tokio::test]
async fn invariants_hold_across_random_workloads() {
    let members = ["a", "b", "c", "d", "e", "f"];

    for seed in 0..16u64 {
        let engine = engine_with(SeededRandom::with_seed(seed), &members).await;

        for (i, author) in members.iter().cycle().take(12).enumerate() {
            engine
                .create_pr(NewPullRequest::new(format!("pr-{:02}", i), "Work", *author))
                .await
                .unwrap();
        }

        // Reassign the first reviewer of every third PR when possible.
        for pr in engine.store().all_prs().await.iter().step_by(3) {
            let Some(old) = pr.assigned_reviewers.first() else {
                continue;
            };
            let before = pr.assigned_reviewers.clone();
            match engine.reassign_reviewer(&pr.pull_request_id, old).await {
                Ok(response) => {
                    let after = &response.pr.assigned_reviewers;
                    assert!(!after.contains(old));
                    assert_eq!(after.len(), before.len());
                    let changed = before.iter().zip(after).filter(|(b, a)| b != a).count();
                    assert_eq!(changed, 1);
                }
                Err(err) => assert!(matches!(err, AssignmentError::NoCandidate)),
            }
        }

        let deactivating = ids(&[members[(seed as usize) % 6], members[(seed as usize + 1) % 6]]);
        let response = engine
            .bulk_deactivate(&"backend".into(), &deactivating)
            .await
            .unwrap();

        for detail in &response.reassigned_prs {
            let mut used = HashSet::new();
            for replacement in &detail.replacements {
                assert!(!deactivating.contains(&replacement.new_user_id));
                assert!(used.insert(replacement.new_user_id.clone()));
            }
        }

        for pr in engine.store().all_prs().await {
            let unique: HashSet<_> = pr.assigned_reviewers.iter().collect();
            assert!(!pr.assigned_reviewers.contains(&pr.author_id));
            assert_eq!(unique.len(), pr.assigned_reviewers.len());
            assert!(pr.assigned_reviewers.len() <= 2);
            for reviewer in &deactivating {
                assert!(!pr.assigned_reviewers.contains(reviewer));
            }
        }
    }
}
