//! Read-only lookups of account display profiles.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::AccountProfile;
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for the public profiles of accounts.
pub trait AccountProfileRepository {
    /// Finds the profile of one account.
    fn find_account_profile(
        &mut self,
        account_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<AccountProfile>>> + Send;

    /// Finds the profiles of several accounts, ordered by username.
    ///
    /// Unknown IDs are skipped.
    fn find_account_profiles(
        &mut self,
        account_ids: &[Uuid],
    ) -> impl Future<Output = PgResult<Vec<AccountProfile>>> + Send;
}

impl AccountProfileRepository for PgConnection {
    async fn find_account_profile(&mut self, account_id: Uuid) -> PgResult<Option<AccountProfile>> {
        use schema::accounts::{self, dsl};

        let profile = accounts::table
            .filter(dsl::id.eq(account_id))
            .select(AccountProfile::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(profile)
    }

    async fn find_account_profiles(&mut self, account_ids: &[Uuid]) -> PgResult<Vec<AccountProfile>> {
        use schema::accounts::{self, dsl};

        if account_ids.is_empty() {
            return Ok(vec![]);
        }

        let profiles = accounts::table
            .filter(dsl::id.eq_any(account_ids))
            .order(dsl::username.asc())
            .select(AccountProfile::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(profiles)
    }
}
