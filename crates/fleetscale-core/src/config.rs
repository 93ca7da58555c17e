//! Scaling config parser.
//!
//! Decoding happens in two phases. The document is first parsed into a
//! generic YAML tree; each entry of `serviceScaleConfigs` then has its
//! `service` discriminator read and is decoded into the statically-typed
//! directive for that tag. Unknown tags, unknown fields and missing
//! required fields are rejected, never defaulted.

use std::path::Path;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::error::{ConfigError, ConfigResult};
use crate::types::*;

const SERVICE_TAG: &str = "service";

/// The parsed scaling configuration. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigTree {
    pub application_name: String,
    /// Role assumed in every region. Empty when the document omits it;
    /// the orchestrator refuses to run in that case.
    pub assumed_role_arn: String,
    pub regions: Vec<RegionSpec>,
}

/// All directives configured for one region, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSpec {
    pub region: String,
    pub directives: Vec<ServiceDirective>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    name: String,
    #[serde(default)]
    assumed_role_arn: String,
    scaling_regions: Vec<RawRegion>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRegion {
    #[serde(default)]
    region: String,
    #[serde(default)]
    service_scale_configs: Value,
}

impl ConfigTree {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let raw: RawConfig = serde_yaml::from_str(content)?;

        let regions = raw
            .scaling_regions
            .into_iter()
            .map(RegionSpec::from_raw)
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(ConfigTree {
            application_name: raw.name,
            assumed_role_arn: raw.assumed_role_arn,
            regions,
        })
    }

    /// Total number of directives across all regions.
    pub fn directive_count(&self) -> usize {
        self.regions.iter().map(|r| r.directives.len()).sum()
    }
}

impl RegionSpec {
    fn from_raw(raw: RawRegion) -> ConfigResult<Self> {
        if raw.region.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "region field is missing or empty".to_string(),
            ));
        }

        let entries = match raw.service_scale_configs {
            Value::Sequence(entries) => entries,
            Value::Null => Vec::new(),
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "region {}: serviceScaleConfigs is not a list",
                    raw.region
                )));
            }
        };

        let directives = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| decode_directive(&raw.region, index, entry))
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(RegionSpec {
            region: raw.region,
            directives,
        })
    }
}

/// Read the discriminator, then decode the remaining fields into the
/// variant it names.
fn decode_directive(region: &str, index: usize, entry: Value) -> ConfigResult<ServiceDirective> {
    let Value::Mapping(mut fields) = entry else {
        return Err(ConfigError::Invalid(format!(
            "region {region}, directive {index}: entry is not a mapping"
        )));
    };

    let service = match fields.remove(SERVICE_TAG) {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        _ => {
            return Err(ConfigError::MissingService {
                region: region.to_string(),
                index,
            });
        }
    };

    let directive = match service.as_str() {
        "Ec2" => ServiceDirective::ComputeGroup(decode_fields(region, index, &service, fields)?),
        "Kinesis" => ServiceDirective::Stream(decode_fields(region, index, &service, fields)?),
        "ElasticCache" => ServiceDirective::Cache(decode_fields(region, index, &service, fields)?),
        "DynamoDB" => ServiceDirective::Table(decode_fields(region, index, &service, fields)?),
        _ => {
            return Err(ConfigError::UnsupportedService {
                region: region.to_string(),
                index,
                service,
            });
        }
    };

    Ok(directive)
}

fn decode_fields<T>(region: &str, index: usize, service: &str, fields: Mapping) -> ConfigResult<T>
where
    T: for<'de> Deserialize<'de>,
{
    serde_yaml::from_value(Value::Mapping(fields)).map_err(|source| ConfigError::Directive {
        region: region.to_string(),
        index,
        service: service.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL: &str = r#"
name: checkout
assumedRoleArn: arn:aws:iam::123456789012:role/scaler
scalingRegions:
  - region: us-east-1
    serviceScaleConfigs:
      - service: Ec2
        asgName: web
        minCount: 2
        desiredCount: 4
        maxCount: 8
      - service: Kinesis
        streamArn: arn:aws:kinesis:us-east-1:123456789012:stream/clicks
        desiredShardCount: 4
  - region: eu-west-1
    serviceScaleConfigs:
      - service: ElasticCache
        clusterId: sessions
        engine: redis
        nodeCount: 3
        nodesToDelete: ["0003"]
      - service: DynamoDB
        tableName: orders
        isIndex: false
        rcu:
          minProvisionedCapacity: 5
          maxProvisionedCapacity: 50
        wcu:
          minProvisionedCapacity: 1
          maxProvisionedCapacity: 10
"#;

    #[test]
    fn parse_full_document() {
        let tree = ConfigTree::from_yaml_str(FULL).unwrap();
        assert_eq!(tree.application_name, "checkout");
        assert_eq!(tree.assumed_role_arn, "arn:aws:iam::123456789012:role/scaler");
        assert_eq!(tree.regions.len(), 2);
        assert_eq!(tree.directive_count(), 4);

        let east = &tree.regions[0];
        assert_eq!(east.region, "us-east-1");
        assert_eq!(
            east.directives[0],
            ServiceDirective::ComputeGroup(ComputeGroupDirective {
                group_name: "web".to_string(),
                min_count: 2,
                desired_count: 4,
                max_count: 8,
            })
        );
        assert_eq!(east.directives[1].kind(), ServiceKind::Stream);

        let west = &tree.regions[1];
        match &west.directives[0] {
            ServiceDirective::Cache(c) => {
                assert_eq!(c.engine, CacheEngine::Redis);
                assert!(c.nodes_to_delete.contains("0003"));
            }
            other => panic!("expected cache directive, got {other:?}"),
        }
        match &west.directives[1] {
            ServiceDirective::Table(t) => {
                assert_eq!(t.read_capacity, CapacityRange { min: 5, max: 50 });
                assert_eq!(t.write_capacity, CapacityRange { min: 1, max: 10 });
            }
            other => panic!("expected table directive, got {other:?}"),
        }
    }

    #[test]
    fn unknown_service_is_rejected() {
        let doc = r#"
name: app
assumedRoleArn: arn:aws:iam::1:role/r
scalingRegions:
  - region: us-east-1
    serviceScaleConfigs:
      - service: Lambda
        functionName: f
"#;
        let err = ConfigTree::from_yaml_str(doc).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnsupportedService { ref service, index: 0, .. } if service == "Lambda"
        ));
    }

    #[test]
    fn missing_discriminator_is_rejected() {
        let doc = r#"
name: app
scalingRegions:
  - region: us-east-1
    serviceScaleConfigs:
      - asgName: web
        minCount: 1
        desiredCount: 1
        maxCount: 1
"#;
        let err = ConfigTree::from_yaml_str(doc).unwrap_err();
        assert!(matches!(err, ConfigError::MissingService { index: 0, .. }));
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let doc = r#"
name: app
scalingRegions:
  - region: us-east-1
    serviceScaleConfigs:
      - service: Kinesis
        streamArn: arn:aws:kinesis:us-east-1:1:stream/s
"#;
        let err = ConfigTree::from_yaml_str(doc).unwrap_err();
        assert!(matches!(err, ConfigError::Directive { ref service, .. } if service == "Kinesis"));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let doc = r#"
name: app
scalingRegions:
  - region: us-east-1
    serviceScaleConfigs:
      - service: Kinesis
        streamArn: arn:aws:kinesis:us-east-1:1:stream/s
        desiredShardCount: 2
        shardLevelMetrics: true
"#;
        assert!(matches!(
            ConfigTree::from_yaml_str(doc),
            Err(ConfigError::Directive { .. })
        ));
    }

    #[test]
    fn service_list_must_be_a_sequence() {
        let doc = r#"
name: app
scalingRegions:
  - region: us-east-1
    serviceScaleConfigs: 5
"#;
        match ConfigTree::from_yaml_str(doc) {
            Err(ConfigError::Invalid(msg)) => {
                assert!(msg.contains("us-east-1"));
                assert!(msg.contains("not a list"));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn directive_must_be_a_mapping() {
        let doc = r#"
name: app
scalingRegions:
  - region: us-east-1
    serviceScaleConfigs:
      - Kinesis
"#;
        match ConfigTree::from_yaml_str(doc) {
            Err(ConfigError::Invalid(msg)) => {
                assert!(msg.contains("directive 0"));
                assert!(msg.contains("not a mapping"));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn numbers_given_as_strings_are_rejected() {
        let doc = r#"
name: app
scalingRegions:
  - region: us-east-1
    serviceScaleConfigs:
      - service: Kinesis
        streamArn: arn:aws:kinesis:us-east-1:1:stream/s
        desiredShardCount: "4"
"#;
        match ConfigTree::from_yaml_str(doc) {
            Err(ConfigError::Directive { index, ref service, ref source, .. }) => {
                assert_eq!(index, 0);
                assert_eq!(service, "Kinesis");
                assert!(source.to_string().contains("invalid type"));
            }
            other => panic!("expected Directive error, got {other:?}"),
        }
    }

    #[test]
    fn empty_region_is_rejected() {
        let doc = r#"
name: app
scalingRegions:
  - region: ""
    serviceScaleConfigs: []
"#;
        assert!(matches!(
            ConfigTree::from_yaml_str(doc),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn unknown_engine_survives_parsing() {
        let doc = r#"
name: app
scalingRegions:
  - region: us-east-1
    serviceScaleConfigs:
      - service: ElasticCache
        clusterId: c1
        engine: couchbase
        nodeCount: 2
"#;
        let tree = ConfigTree::from_yaml_str(doc).unwrap();
        match &tree.regions[0].directives[0] {
            ServiceDirective::Cache(c) => {
                assert_eq!(c.engine, CacheEngine::Other("couchbase".to_string()));
                assert!(c.nodes_to_delete.is_empty());
            }
            other => panic!("expected cache directive, got {other:?}"),
        }
    }

    #[test]
    fn missing_role_arn_parses_as_empty() {
        let doc = r#"
name: app
scalingRegions: []
"#;
        let tree = ConfigTree::from_yaml_str(doc).unwrap();
        assert!(tree.assumed_role_arn.is_empty());
        assert!(tree.regions.is_empty());
    }

    #[test]
    fn malformed_document() {
        assert!(matches!(
            ConfigTree::from_yaml_str("name: [unterminated"),
            Err(ConfigError::Malformed(_))
        ));
    }

    #[test]
    fn from_file_reads_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();

        let tree = ConfigTree::from_file(file.path()).unwrap();
        assert_eq!(tree.regions.len(), 2);

        let missing = ConfigTree::from_file(Path::new("/nonexistent/fleetscale.yaml"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }
}
