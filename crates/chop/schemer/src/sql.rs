//! SQL used to read replicated object definitions from peers
//!
//! Each query returns two columns: the object name and a `CREATE ... IF NOT
//! EXISTS` statement that recreates it.

/// Quote `value` as a single-quoted SQL string literal
fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Databases that hold replicated or distributed tables, or use a replicated engine
pub fn create_database_replicated(cluster: &str) -> String {
    let cluster = literal(cluster);
    format!(
        r#"SELECT DISTINCT
    name,
    concat('CREATE DATABASE IF NOT EXISTS "', name, '" Engine = ', engine) AS create_db_query
FROM clusterAllReplicas({cluster}, system.databases) databases
WHERE name NOT IN ('system', 'information_schema', 'INFORMATION_SCHEMA')
  AND (
    engine = 'Replicated'
    OR name IN (
        SELECT DISTINCT database
        FROM clusterAllReplicas({cluster}, system.tables) tables
        WHERE engine_full LIKE 'Replicated%' OR engine_full LIKE 'Distributed%'
    )
  )
SETTINGS skip_unavailable_shards = 1"#
    )
}

/// Replicated and distributed tables, views and dictionaries
pub fn create_table_replicated(cluster: &str) -> String {
    let cluster = literal(cluster);
    format!(
        r#"SELECT DISTINCT
    concat(database, '.', name) AS name,
    replaceRegexpOne(create_table_query, 'CREATE (TABLE|VIEW|MATERIALIZED VIEW|DICTIONARY)', 'CREATE \\1 IF NOT EXISTS')
FROM clusterAllReplicas({cluster}, system.tables) tables
WHERE database NOT IN ('system', 'information_schema', 'INFORMATION_SCHEMA')
  AND create_table_query != ''
  AND name NOT LIKE '.inner.%'
  AND name NOT LIKE '.inner_id.%'
  AND (engine_full LIKE 'Replicated%' OR engine_full LIKE 'Distributed%' OR engine LIKE '%View' OR engine = 'Dictionary')
ORDER BY engine LIKE '%View', engine = 'Dictionary'
SETTINGS skip_unavailable_shards = 1"#
    )
}

/// User-defined SQL functions
pub fn create_function(cluster: &str) -> String {
    let cluster = literal(cluster);
    format!(
        r#"SELECT DISTINCT
    name,
    replaceRegexpOne(create_query, 'CREATE (FUNCTION)', 'CREATE \\1 IF NOT EXISTS')
FROM clusterAllReplicas({cluster}, system.functions) functions
WHERE create_query != ''
SETTINGS skip_unavailable_shards = 1"#
    )
}
