//! Records persisted next to groups and datasets

use crate::compression::ChunkCodec;
use crate::error::{GeoError, Result};
use crate::types::DataType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// File name of a group record inside the group directory
pub const GROUP_RECORD: &str = "group.json";

/// File name of a dataset record inside the dataset directory
pub const DATASET_RECORD: &str = "dataset.json";

/// Attribute value as stored in a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Text(String),
    Floats(Vec<f64>),
    Texts(Vec<String>),
}

impl AttrValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            AttrValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_floats(&self) -> Option<Vec<f64>> {
        match self {
            AttrValue::Floats(v) => Some(v.clone()),
            AttrValue::Int(v) => Some(vec![*v as f64]),
            AttrValue::Float(v) => Some(vec![*v]),
            _ => None,
        }
    }

    pub fn as_texts(&self) -> Option<Vec<String>> {
        match self {
            AttrValue::Texts(v) => Some(v.clone()),
            AttrValue::Floats(v) if v.is_empty() => Some(Vec::new()),
            _ => None,
        }
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<u32> for AttrValue {
    fn from(v: u32) -> Self {
        AttrValue::Int(v as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Text(v)
    }
}

impl From<Vec<f64>> for AttrValue {
    fn from(v: Vec<f64>) -> Self {
        AttrValue::Floats(v)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(v: Vec<String>) -> Self {
        AttrValue::Texts(v)
    }
}

/// Persistent state of a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRecord {
    /// Stable identity of the group
    pub id: Uuid,

    pub attributes: BTreeMap<String, AttrValue>,

    /// Soft links: child name -> absolute target path
    #[serde(default)]
    pub links: BTreeMap<String, String>,

    pub created_at: DateTime<Utc>,

    pub modified_at: DateTime<Utc>,
}

impl GroupRecord {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            attributes: BTreeMap::new(),
            links: BTreeMap::new(),
            created_at: now,
            modified_at: now,
        }
    }

    /// Update modification timestamp
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| GeoError::InvalidFormat(e.to_string()))
    }
}

impl Default for GroupRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Persistent state of a 2-D dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub id: Uuid,

    /// Extent as [rows, cols]
    pub shape: [usize; 2],

    pub data_type: DataType,

    /// Rows per chunk file
    pub chunk_rows: usize,

    /// Columns per chunk file; 0 spans the full width
    #[serde(default)]
    pub chunk_cols: usize,

    pub codec: ChunkCodec,

    pub attributes: BTreeMap<String, AttrValue>,

    pub created_at: DateTime<Utc>,

    pub modified_at: DateTime<Utc>,
}

impl DatasetRecord {
    pub fn new(shape: [usize; 2], data_type: DataType, chunk: [usize; 2], codec: ChunkCodec) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            shape,
            data_type,
            chunk_rows: chunk[0].max(1),
            chunk_cols: chunk[1],
            codec,
            attributes: BTreeMap::new(),
            created_at: now,
            modified_at: now,
        }
    }

    /// Chunk extent as [rows, cols]
    pub fn chunk(&self) -> [usize; 2] {
        [self.chunk_rows, self.chunk_cols]
    }

    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| GeoError::InvalidFormat(e.to_string()))
    }
}
