//! Backend wire shapes.
//!
//! The query layer returns loosely typed JSON: numeric ids, counts sent as
//! strings, `null` in place of missing values. Every optional field here is
//! decoded leniently so a malformed value degrades to "absent" instead of
//! failing the whole payload.

use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawNode {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(
        rename = "type",
        alias = "label",
        alias = "node_type",
        deserialize_with = "lenient_string"
    )]
    pub node_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub company_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub officer_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub subscriber_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub shareholder_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub affiliate_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub bond_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub corp_code: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub risk_grade: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub position: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub amount: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub issue_date: Option<String>,
    #[serde(deserialize_with = "lenient_u32")]
    pub career_count: Option<u32>,
}

impl RawNode {
    pub fn new(id: &str, node_type: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            node_type: Some(node_type.to_string()),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_corp_code(mut self, code: &str) -> Self {
        self.corp_code = Some(code.to_string());
        self
    }

    pub fn with_bond_name(mut self, bond_name: &str) -> Self {
        self.bond_name = Some(bond_name.to_string());
        self
    }

    pub fn with_career_count(mut self, count: u32) -> Self {
        self.career_count = Some(count);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRelationship {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(
        alias = "start",
        alias = "from",
        alias = "source_id",
        deserialize_with = "lenient_string"
    )]
    pub source: Option<String>,
    #[serde(
        alias = "end",
        alias = "to",
        alias = "target_id",
        deserialize_with = "lenient_string"
    )]
    pub target: Option<String>,
    #[serde(
        rename = "type",
        alias = "rel_type",
        alias = "relationship_type",
        deserialize_with = "lenient_string"
    )]
    pub rel_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub label: Option<String>,
}

impl RawRelationship {
    pub fn new(source: &str, target: &str, rel_type: &str) -> Self {
        Self {
            source: Some(source.to_string()),
            target: Some(target.to_string()),
            rel_type: Some(rel_type.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawGraph {
    #[serde(deserialize_with = "lenient_seq")]
    pub nodes: Vec<RawNode>,
    #[serde(alias = "edges", alias = "links", deserialize_with = "lenient_seq")]
    pub relationships: Vec<RawRelationship>,
    #[serde(
        alias = "center_id",
        alias = "centerCompanyId",
        deserialize_with = "lenient_string"
    )]
    pub center: Option<String>,
}

impl RawGraph {
    pub fn new(nodes: Vec<RawNode>, relationships: Vec<RawRelationship>) -> Self {
        Self {
            nodes,
            relationships,
            center: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite()))
}

fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .or_else(|| n.as_f64().filter(|v| *v >= 0.0).map(|v| v as u32)),
        Some(Value::String(s)) => s.trim().parse::<u32>().ok(),
        _ => None,
    })
}

fn lenient_seq<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
