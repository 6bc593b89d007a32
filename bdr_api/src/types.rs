use bytes::Bytes;
use rights::RightsDocument;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;

/// An object as returned by the items API.
///
/// Only the parts the editor works with are typed, everything else is kept in
/// `extra` and handed back untouched for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub pid: String,
    #[serde(default)]
    pub datastreams: BTreeMap<String, DatastreamInfo>,
    #[serde(default, deserialize_with = "ids_as_strings")]
    pub collections: Vec<String>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub embargo_end_years: Vec<u16>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ObjectInfo {
    pub fn has_datastream(&self, dsid: &str) -> bool {
        self.datastreams.contains_key(dsid)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatastreamInfo {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub mimetype: String,
}

/// Collection ids arrive as numbers or strings depending on the object's age.
fn ids_as_strings<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    values
        .into_iter()
        .map(|v| match v {
            serde_json::Value::String(s) => Ok(s),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "invalid collection id: {other}"
            ))),
        })
        .collect()
}

/// A replacement body for a single datastream.
#[derive(Debug, Clone, PartialEq)]
pub struct DatastreamContent {
    pub content: Bytes,
    pub mimetype: String,
    pub label: Option<String>,
}

/// Form payload for `PUT` on the items endpoint: the object pid plus one
/// updated field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemUpdate {
    pid: String,
    field: &'static str,
    value: String,
}

impl ItemUpdate {
    pub fn rights(pid: impl Into<String>, rights: &RightsDocument) -> Result<Self> {
        Ok(Self {
            pid: pid.into(),
            field: "rights",
            value: rights.to_xml()?,
        })
    }

    /// Replaces the object's collections with `ids`. An empty list removes the
    /// object from every collection.
    pub fn collections<I, S>(pid: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            pid: pid.into(),
            field: "ir",
            value: serde_json::json!({
                "parameters": {
                    "folders": folders::encode(ids),
                }
            })
            .to_string(),
        }
    }

    pub fn embargo(pid: impl Into<String>, end_year: u16) -> Self {
        Self {
            pid: pid.into(),
            field: "embargo_end_year",
            value: end_year.to_string(),
        }
    }

    pub fn child_order(pid: impl Into<String>, child_pids: &[String]) -> Self {
        Self {
            pid: pid.into(),
            field: "child_order",
            value: serde_json::json!(child_pids).to_string(),
        }
    }

    pub fn pid(&self) -> &str {
        &self.pid
    }

    pub fn field(&self) -> &str {
        self.field
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn form_fields(&self) -> [(&str, &str); 2] {
        [("pid", self.pid.as_str()), (self.field, self.value.as_str())]
    }
}
