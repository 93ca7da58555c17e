//! Directive types: one variant per scalable resource kind.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The resource kind a directive or failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// EC2 auto-scaling group.
    ComputeGroup,
    /// Kinesis data stream.
    Stream,
    /// ElastiCache cluster or replication group.
    Cache,
    /// DynamoDB table or index throughput.
    Table,
    /// Anything not attributable to a single directive (credentials, aborted tasks).
    Unknown,
}

impl ServiceKind {
    /// Short service label used in rendered reports.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceKind::ComputeGroup => "ec2",
            ServiceKind::Stream => "kinesis",
            ServiceKind::Cache => "elasticache",
            ServiceKind::Table => "dynamodb",
            ServiceKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether this run increases or decreases capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleDirection {
    Up,
    Down,
}

impl ScaleDirection {
    pub fn is_down(&self) -> bool {
        matches!(self, ScaleDirection::Down)
    }
}

impl fmt::Display for ScaleDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleDirection::Up => f.write_str("up"),
            ScaleDirection::Down => f.write_str("down"),
        }
    }
}

/// Scale an EC2 auto-scaling group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ComputeGroupDirective {
    #[serde(rename = "asgName")]
    pub group_name: String,
    pub min_count: i32,
    pub desired_count: i32,
    pub max_count: i32,
}

/// Reshard a Kinesis stream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StreamDirective {
    pub stream_arn: String,
    pub desired_shard_count: i32,
}

/// ElastiCache engine. Unrecognised engines decode to `Other` and are
/// rejected when the directive is validated, not when it is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum CacheEngine {
    Redis,
    Memcached,
    Other(String),
}

impl From<String> for CacheEngine {
    fn from(name: String) -> Self {
        match name.as_str() {
            "redis" => CacheEngine::Redis,
            "memcached" => CacheEngine::Memcached,
            _ => CacheEngine::Other(name),
        }
    }
}

impl fmt::Display for CacheEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheEngine::Redis => f.write_str("redis"),
            CacheEngine::Memcached => f.write_str("memcached"),
            CacheEngine::Other(name) => f.write_str(name),
        }
    }
}

/// Resize an ElastiCache cluster (memcached) or replication group (redis).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CacheDirective {
    pub cluster_id: String,
    pub engine: CacheEngine,
    pub node_count: i32,
    /// Node groups (redis) or cache node ids (memcached) removed when scaling down.
    #[serde(default)]
    pub nodes_to_delete: BTreeSet<String>,
}

/// Provisioned capacity bounds for one throughput dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CapacityRange {
    #[serde(rename = "minProvisionedCapacity")]
    pub min: i32,
    #[serde(rename = "maxProvisionedCapacity")]
    pub max: i32,
}

impl CapacityRange {
    pub fn is_non_negative(&self) -> bool {
        self.min >= 0 && self.max >= 0
    }
}

/// Register DynamoDB read/write capacity as scalable targets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TableDirective {
    pub table_name: String,
    #[serde(default)]
    pub is_index: bool,
    #[serde(rename = "rcu")]
    pub read_capacity: CapacityRange,
    #[serde(rename = "wcu")]
    pub write_capacity: CapacityRange,
}

/// Throughput dimension of a table directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableDimension {
    Read,
    Write,
}

impl fmt::Display for TableDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableDimension::Read => f.write_str("read"),
            TableDimension::Write => f.write_str("write"),
        }
    }
}

/// A single configured scaling directive. The set of variants is closed:
/// an unrecognised `service` tag never produces a directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceDirective {
    ComputeGroup(ComputeGroupDirective),
    Stream(StreamDirective),
    Cache(CacheDirective),
    Table(TableDirective),
}

impl ServiceDirective {
    pub fn kind(&self) -> ServiceKind {
        match self {
            ServiceDirective::ComputeGroup(_) => ServiceKind::ComputeGroup,
            ServiceDirective::Stream(_) => ServiceKind::Stream,
            ServiceDirective::Cache(_) => ServiceKind::Cache,
            ServiceDirective::Table(_) => ServiceKind::Table,
        }
    }

    /// Identifier of the resource being scaled.
    pub fn resource_id(&self) -> &str {
        match self {
            ServiceDirective::ComputeGroup(d) => &d.group_name,
            ServiceDirective::Stream(d) => &d.stream_arn,
            ServiceDirective::Cache(d) => &d.cluster_id,
            ServiceDirective::Table(d) => &d.table_name,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ServiceDirective::ComputeGroup(d) => {
                format!("EC2 scaling config for ASG {}", d.group_name)
            }
            ServiceDirective::Stream(d) => {
                format!("Kinesis scaling config for stream {}", d.stream_arn)
            }
            ServiceDirective::Cache(d) => {
                format!("ElastiCache scaling config for cluster {}", d.cluster_id)
            }
            ServiceDirective::Table(d) => {
                format!("DynamoDB scaling config for table {}", d.table_name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_from_name() {
        assert_eq!(CacheEngine::from("redis".to_string()), CacheEngine::Redis);
        assert_eq!(CacheEngine::from("memcached".to_string()), CacheEngine::Memcached);
        assert_eq!(
            CacheEngine::from("couchbase".to_string()),
            CacheEngine::Other("couchbase".to_string())
        );
    }

    #[test]
    fn directive_identity() {
        let directive = ServiceDirective::Stream(StreamDirective {
            stream_arn: "arn:aws:kinesis:us-east-1:1:stream/clicks".to_string(),
            desired_shard_count: 2,
        });
        assert_eq!(directive.kind(), ServiceKind::Stream);
        assert_eq!(directive.resource_id(), "arn:aws:kinesis:us-east-1:1:stream/clicks");
        assert!(directive.describe().contains("Kinesis"));
    }

    #[test]
    fn kind_labels() {
        assert_eq!(ServiceKind::ComputeGroup.to_string(), "ec2");
        assert_eq!(ServiceKind::Table.to_string(), "dynamodb");
        assert_eq!(ServiceKind::Unknown.to_string(), "unknown");
    }
}
