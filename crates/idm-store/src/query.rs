//! Paged listing contracts and filter/sort strategies.
//!
//! Each entity type supplies its filter and sort functions explicitly
//! through a [`QueryStrategy`]; backends apply the strategy rather
//! than deriving matching rules from the entity shape.

use async_trait::async_trait;
use idm_model::{Group, UserAccount};

use crate::error::StoreResult;

/// Paged, filtered account listing.
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Returns one page of matching accounts plus the total match
    /// count independent of paging.
    async fn query(
        &self,
        filter: &str,
        start: usize,
        count: usize,
    ) -> StoreResult<(Vec<UserAccount>, usize)>;
}

/// Paged, filtered group listing.
#[async_trait]
pub trait GroupQuery: Send + Sync {
    /// Returns one page of matching groups plus the total match count
    /// independent of paging.
    async fn query(&self, filter: &str, start: usize, count: usize)
        -> StoreResult<(Vec<Group>, usize)>;
}

/// Filter and sort functions for one entity type.
///
/// A blank filter bypasses matching entirely: the full set is
/// returned, sorted, instead of substring-matching every record.
#[derive(Debug, Clone, Copy)]
pub struct QueryStrategy<E> {
    /// Whether an entity matches a non-blank filter string.
    pub matches: fn(&E, &str) -> bool,
    /// Ascending sort key.
    pub sort_key: fn(&E) -> String,
}

impl<E> QueryStrategy<E> {
    /// Filters, sorts, and pages `items`, returning the page and the
    /// total match count.
    #[must_use]
    pub fn run(&self, mut items: Vec<E>, filter: &str, start: usize, count: usize) -> (Vec<E>, usize) {
        if !filter.trim().is_empty() {
            items.retain(|item| (self.matches)(item, filter));
        }
        items.sort_by_key(|item| (self.sort_key)(item));

        let total = items.len();
        let page = items
            .into_iter()
            .skip(start)
            .take(count)
            .collect();
        (page, total)
    }
}

/// The account strategy: a filter matches the login name or the
/// display-name claim; sorting is by display name, falling back to the
/// login name.
#[must_use]
pub fn account_strategy() -> QueryStrategy<UserAccount> {
    QueryStrategy {
        matches: |account, filter| {
            account.username.contains(filter)
                || account
                    .display_name()
                    .is_some_and(|name| name.contains(filter))
        },
        sort_key: |account| {
            account
                .display_name()
                .unwrap_or(&account.username)
                .to_string()
        },
    }
}

/// The group strategy: filter and sort both use the group name.
#[must_use]
pub fn group_strategy() -> QueryStrategy<Group> {
    QueryStrategy {
        matches: |group, filter| group.name.contains(filter),
        sort_key: |group| group.name.clone(),
    }
}
