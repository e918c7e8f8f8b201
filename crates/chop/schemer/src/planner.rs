//! Replication decision and plan assembly

use crate::cancel::Cancellation;
use crate::error::{Result, SchemerError};
use crate::executor::QueryExecutor;
use crate::sql;
use chop_naming::{FqdnScope, Namer};
use chop_types::{Host, Installation, ReplicaSchemaPolicy, SchemaPolicy, ShardSchemaPolicy};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, instrument};

/// Index-aligned object names and their `CREATE` statements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplicatedObjects {
    pub names: Vec<String>,
    pub statements: Vec<String>,
}

impl ReplicatedObjects {
    pub fn new(names: Vec<String>, statements: Vec<String>) -> Result<Self> {
        let objects = Self { names, statements };
        objects.check_aligned()?;
        Ok(objects)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `(name, statement)` pairs in plan order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.statements.iter().map(String::as_str))
    }

    fn check_aligned(&self) -> Result<()> {
        if self.names.len() != self.statements.len() {
            return Err(SchemerError::MisalignedResult {
                names: self.names.len(),
                statements: self.statements.len(),
            });
        }
        Ok(())
    }

    /// Append objects whose names have not been seen yet
    fn append_unseen(&mut self, other: ReplicatedObjects, seen: &mut HashSet<String>) {
        for (name, statement) in other.names.into_iter().zip(other.statements) {
            if seen.insert(name.clone()) {
                self.names.push(name);
                self.statements.push(statement);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Databases,
    Tables,
    Functions,
}

impl Pass {
    /// Databases first: tables may live in them
    const ORDER: [Pass; 3] = [Pass::Databases, Pass::Tables, Pass::Functions];

    fn sql(self, cluster: &str) -> String {
        match self {
            Pass::Databases => sql::create_database_replicated(cluster),
            Pass::Tables => sql::create_table_replicated(cluster),
            Pass::Functions => sql::create_function(cluster),
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pass::Databases => f.write_str("databases"),
            Pass::Tables => f.write_str("tables"),
            Pass::Functions => f.write_str("functions"),
        }
    }
}

/// Replication decision from policy and scope sizes
///
/// Sizes count every host of the scope, the host itself included. Rules
/// apply in order and the first match decides.
pub fn replication_decision(policy: SchemaPolicy, cluster_size: usize, shard_size: usize) -> bool {
    if policy.shard == ShardSchemaPolicy::All && cluster_size >= 2 {
        return true;
    }
    if policy.replica == ReplicaSchemaPolicy::None {
        return false;
    }
    shard_size > 1
}

/// Whether replicated objects have to be created on `host`
pub fn should_create_replicated_objects(namer: &Namer, chi: &Installation, host: &Host) -> bool {
    let Some(cluster) = chi.cluster(host.address().cluster_index) else {
        debug!(host = %host.name, "Host is outside the installation");
        return false;
    };

    let shard = namer.fqdns(chi, host, FqdnScope::Shard, false);
    let cluster_size = namer.fqdns(chi, host, FqdnScope::Cluster, false).len();
    let decision = replication_decision(cluster.schema_policy, cluster_size, shard.len());

    debug!(
        host = %host.name,
        policy = ?cluster.schema_policy,
        cluster_size,
        shard = ?shard,
        decision,
        "Replication decision"
    );
    decision
}

/// Plans replicated schema for hosts of one installation
pub struct ClusterSchemer<E> {
    executor: E,
    namer: Namer,
}

impl<E: QueryExecutor> ClusterSchemer<E> {
    pub fn new(executor: E, namer: Namer) -> Self {
        Self { executor, namer }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Objects to create on `host`, deduplicated by name
    ///
    /// Peers are every other host of the installation. Cancellation at any
    /// point between remote calls yields an empty plan; a query failure
    /// fails the whole plan.
    #[instrument(skip_all, fields(host = %host.name, cluster = %host.address().cluster_name))]
    pub async fn replicated_objects(
        &self,
        chi: &Installation,
        host: &Host,
        cancel: &Cancellation,
    ) -> Result<ReplicatedObjects> {
        if cancel.is_cancelled() {
            debug!("Cancelled before planning");
            return Ok(ReplicatedObjects::default());
        }

        if !should_create_replicated_objects(&self.namer, chi, host) {
            debug!("No replicated objects needed");
            return Ok(ReplicatedObjects::default());
        }

        let peers = self.namer.fqdns(chi, host, FqdnScope::Installation, true);
        if peers.is_empty() {
            debug!("No peers to copy schema from");
            return Ok(ReplicatedObjects::default());
        }

        let cluster = &host.address().cluster_name;
        let mut plan = ReplicatedObjects::default();
        let mut seen = HashSet::new();

        for pass in Pass::ORDER {
            if cancel.is_cancelled() {
                info!(%pass, "Cancelled during planning");
                return Ok(ReplicatedObjects::default());
            }

            let sql = pass.sql(cluster);
            let objects = match pass {
                Pass::Tables => {
                    self.executor
                        .query_pairs_applying_uuids(&peers, &sql, cancel)
                        .await?
                }
                Pass::Databases | Pass::Functions => {
                    self.executor.query_pairs(&peers, &sql, cancel).await?
                }
            };
            objects.check_aligned()?;

            debug!(%pass, count = objects.len(), "Fetched object definitions");
            plan.append_unseen(objects, &mut seen);
        }

        if cancel.is_cancelled() {
            info!("Cancelled after planning");
            return Ok(ReplicatedObjects::default());
        }

        info!(objects = plan.len(), peers = peers.len(), "Replicated objects planned");
        Ok(plan)
    }
}
