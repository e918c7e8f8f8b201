//! Seam to the SQL transport

use crate::cancel::Cancellation;
use crate::error::Result;
use crate::planner::ReplicatedObjects;
use async_trait::async_trait;

/// Runs two-column queries against database hosts
///
/// Implementations execute `sql` on the given hosts and unzip the result
/// set into index-aligned name and statement lists.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn query_pairs(
        &self,
        hosts: &[String],
        sql: &str,
        cancel: &Cancellation,
    ) -> Result<ReplicatedObjects>;

    /// Like [`query_pairs`](Self::query_pairs), but rewrites the UUIDs of
    /// replicated table engines so every replica gets a stable identifier
    async fn query_pairs_applying_uuids(
        &self,
        hosts: &[String],
        sql: &str,
        cancel: &Cancellation,
    ) -> Result<ReplicatedObjects>;
}
