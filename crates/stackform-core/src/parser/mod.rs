//! KDL topology parser
//!
//! A topology document declares resources under a `topology` node. The
//! child node name is the resource kind, the first argument its logical
//! name, `ref` children declare references and everything else becomes an
//! attribute:
//!
//! ```text
//! topology "web-stack" {
//!     network "vpc1" {
//!         cidr "10.0.0.0/16"
//!     }
//!     compute "web-1" {
//!         ref "web-sg"
//!         instance-type "t2.micro"
//!         subnet "${ref:public-subnet-a}"
//!     }
//! }
//! ```

use crate::error::{Result, TopologyError};
use crate::model::{ResourceDescriptor, ResourceKind, TopologyRegistry};
use kdl::{KdlDocument, KdlNode, KdlValue};
use std::collections::BTreeMap;

/// Parse a KDL topology document into descriptors sorted by logical name
pub fn parse_topology(input: &str) -> Result<Vec<ResourceDescriptor>> {
    Ok(parse_registry(input)?.into_descriptors())
}

/// Parse a KDL topology document into a registry
pub fn parse_registry(input: &str) -> Result<TopologyRegistry> {
    let doc: KdlDocument = input.parse()?;
    let mut registry = TopologyRegistry::new();

    for node in doc.nodes() {
        match node.name().value() {
            "topology" => {
                if let Some(children) = node.children() {
                    for child in children.nodes() {
                        let descriptor = parse_resource(child)?;
                        registry.add(descriptor)?;
                    }
                }
            }
            other => {
                return Err(TopologyError::InvalidConfig(format!(
                    "unexpected top-level node: {other}"
                )));
            }
        }
    }

    tracing::debug!("Parsed topology with {} resources", registry.len());
    Ok(registry)
}

/// Parse a single resource node
fn parse_resource(node: &KdlNode) -> Result<ResourceDescriptor> {
    let kind: ResourceKind = node.name().value().parse()?;

    let name = node
        .entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| {
            TopologyError::InvalidConfig(format!("{kind} requires a logical name"))
        })?
        .to_string();

    let mut attributes = BTreeMap::new();
    let mut references = Vec::new();

    // Properties on the resource node itself (e.g. `compute "web-1" az="a"`)
    for entry in node.entries() {
        if let Some(key) = entry.name() {
            attributes.insert(key.value().to_string(), value_to_json(entry.value())?);
        }
    }

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "ref" | "refs" => {
                    references.extend(
                        child
                            .entries()
                            .iter()
                            .filter_map(|e| e.value().as_string().map(|s| s.to_string())),
                    );
                }
                other => {
                    insert_attribute(&mut attributes, other, attribute_value(child)?);
                }
            }
        }
    }

    Ok(ResourceDescriptor::new(kind, name, attributes, references))
}

/// Convert an attribute node into a JSON value
///
/// `port 80` becomes a scalar, `aliases "a" "b"` an array,
/// `ingress port=80 cidr="0.0.0.0/0"` an object, and a child block becomes
/// an object of its scalar children.
fn attribute_value(node: &KdlNode) -> Result<serde_json::Value> {
    if let Some(children) = node.children() {
        let mut map = serde_json::Map::new();
        for child in children.nodes() {
            map.insert(child.name().value().to_string(), attribute_value(child)?);
        }
        return Ok(serde_json::Value::Object(map));
    }

    let mut args = Vec::new();
    let mut props = serde_json::Map::new();
    for entry in node.entries() {
        match entry.name() {
            Some(key) => {
                props.insert(key.value().to_string(), value_to_json(entry.value())?);
            }
            None => args.push(value_to_json(entry.value())?),
        }
    }

    Ok(if !props.is_empty() {
        if !args.is_empty() {
            props.insert("values".to_string(), serde_json::Value::Array(args));
        }
        serde_json::Value::Object(props)
    } else if args.len() == 1 {
        args.into_iter().next().unwrap_or(serde_json::Value::Null)
    } else {
        serde_json::Value::Array(args)
    })
}

/// Insert an attribute, folding repeated keys into an array
/// (e.g. several `ingress` rules on one security group)
fn insert_attribute(
    attributes: &mut BTreeMap<String, serde_json::Value>,
    key: &str,
    value: serde_json::Value,
) {
    match attributes.get_mut(key) {
        Some(serde_json::Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = serde_json::Value::Array(vec![first, value]);
        }
        None => {
            attributes.insert(key.to_string(), value);
        }
    }
}

fn value_to_json(value: &KdlValue) -> Result<serde_json::Value> {
    if let Some(s) = value.as_string() {
        Ok(serde_json::Value::String(s.to_string()))
    } else if let Some(i) = value.as_integer() {
        // KDL integers are i128; anything outside i64 is rejected rather
        // than silently truncated
        let n = i64::try_from(i).map_err(|_| {
            TopologyError::InvalidConfig(format!("integer value out of range: {i}"))
        })?;
        Ok(serde_json::Value::from(n))
    } else if let Some(f) = value.as_float() {
        Ok(serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null))
    } else if let Some(b) = value.as_bool() {
        Ok(serde_json::Value::Bool(b))
    } else {
        Ok(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_network() {
        let kdl = r#"
            topology "test" {
                network "vpc1" {
                    cidr "10.0.0.0/16"
                }
            }
        "#;
        let descriptors = parse_topology(kdl).unwrap();

        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].name, "vpc1");
        assert_eq!(descriptors[0].kind, ResourceKind::Network);
        assert_eq!(
            descriptors[0].get_attr::<String>("cidr"),
            Some("10.0.0.0/16".to_string())
        );
    }

    #[test]
    fn test_parse_refs_and_placeholders() {
        let kdl = r#"
            topology "test" {
                compute "web-1" {
                    ref "web-sg"
                    instance-type "t2.micro"
                    subnet "${ref:public-subnet-a}"
                }
            }
        "#;
        let descriptors = parse_topology(kdl).unwrap();
        let web = &descriptors[0];

        assert!(web.references.contains("web-sg"));
        assert!(web.references.contains("public-subnet-a"));
        assert_eq!(
            web.get_attr::<String>("instance-type"),
            Some("t2.micro".to_string())
        );
    }

    #[test]
    fn test_parse_property_object() {
        let kdl = r#"
            topology "test" {
                security-group "web-sg" {
                    ingress port=80 cidr="0.0.0.0/0"
                }
            }
        "#;
        let descriptors = parse_topology(kdl).unwrap();

        assert_eq!(
            descriptors[0].attributes["ingress"],
            json!({ "port": 80, "cidr": "0.0.0.0/0" })
        );
    }

    #[test]
    fn test_parse_repeated_attribute_folds_to_array() {
        let kdl = r#"
            topology "test" {
                security-group "db-sg" {
                    ingress port=3306 source="web-sg"
                    ingress port=22 cidr="10.0.0.0/16"
                }
            }
        "#;
        let descriptors = parse_topology(kdl).unwrap();
        let ingress = &descriptors[0].attributes["ingress"];

        assert!(ingress.is_array());
        assert_eq!(ingress.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_parse_multiple_args_become_array() {
        let kdl = r#"
            topology "test" {
                listener "http" {
                    ref "alb"
                    protocols "http" "https"
                    port 80
                }
            }
        "#;
        let descriptors = parse_topology(kdl).unwrap();

        assert_eq!(descriptors[0].attributes["protocols"], json!(["http", "https"]));
        assert_eq!(descriptors[0].attributes["port"], json!(80));
    }

    #[test]
    fn test_integer_out_of_range_fails() {
        // One past i64::MAX; must be rejected, not truncated
        let kdl = r#"
            topology "test" {
                listener "http" {
                    port 9223372036854775808
                }
            }
        "#;
        let err = parse_topology(kdl).unwrap_err();
        assert!(matches!(err, TopologyError::InvalidConfig(msg) if msg.contains("out of range")));
    }

    #[test]
    fn test_integer_at_i64_max_parses() {
        let kdl = r#"
            topology "test" {
                listener "http" {
                    port 9223372036854775807
                }
            }
        "#;
        let descriptors = parse_topology(kdl).unwrap();
        assert_eq!(descriptors[0].attributes["port"], json!(i64::MAX));
    }

    #[test]
    fn test_duplicate_name_fails() {
        let kdl = r#"
            topology "test" {
                network "vpc1"
                compute "vpc1"
            }
        "#;
        let err = parse_topology(kdl).unwrap_err();
        assert!(matches!(err, TopologyError::DuplicateName(n) if n == "vpc1"));
    }

    #[test]
    fn test_unknown_kind_fails() {
        let kdl = r#"
            topology "test" {
                queue "jobs"
            }
        "#;
        let err = parse_topology(kdl).unwrap_err();
        assert!(matches!(err, TopologyError::UnknownKind(k) if k == "queue"));
    }

    #[test]
    fn test_unexpected_top_level_node() {
        let err = parse_topology(r#"network "vpc1""#).unwrap_err();
        assert!(matches!(err, TopologyError::InvalidConfig(_)));
    }

    #[test]
    fn test_missing_logical_name() {
        let kdl = r#"
            topology "test" {
                network
            }
        "#;
        let err = parse_topology(kdl).unwrap_err();
        assert!(matches!(err, TopologyError::InvalidConfig(_)));
    }
}
