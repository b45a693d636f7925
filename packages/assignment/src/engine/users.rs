//! Single-user activation and review listing.

use tracing::{info, instrument};

use super::AssignmentEngine;
use crate::error::{AssignmentError, Result};
use crate::report::UserPullRequests;
use crate::traits::{random::RandomSource, store::ReviewStore};
use crate::types::{ids::UserId, team::User};

const USER_NOT_FOUND: &str = "user not found";

impl<S: ReviewStore, R: RandomSource> AssignmentEngine<S, R> {
    /// Toggle a user's active flag.
    ///
    /// Open reviews of a deactivated user are left in place; use
    /// [`AssignmentEngine::bulk_deactivate`] to repair them.
    #[instrument(skip_all, fields(user_id = %user_id, is_active = is_active))]
    pub async fn set_user_active(&self, user_id: &UserId, is_active: bool) -> Result<User> {
        if self.store.get_user(user_id).await?.is_none() {
            return Err(AssignmentError::not_found(USER_NOT_FOUND));
        }

        self.store.update_user_active(user_id, is_active).await?;

        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AssignmentError::not_found(USER_NOT_FOUND))?;

        info!("User activity updated");
        Ok(user)
    }

    /// Pull requests the user reviews, newest first.
    pub async fn get_user_reviews(&self, user_id: &UserId) -> Result<UserPullRequests> {
        if self.store.get_user(user_id).await?.is_none() {
            return Err(AssignmentError::not_found(USER_NOT_FOUND));
        }

        let pull_requests = self.store.get_prs_by_reviewer(user_id).await?;
        Ok(UserPullRequests {
            user_id: user_id.clone(),
            pull_requests,
        })
    }
}
