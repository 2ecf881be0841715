//! Capability shared by every geo-object
//!
//! A geo-object is a group stamped with an `ObjectType` attribute. Handles
//! hold only the group; all state is re-read from storage on demand.

use crate::error::{GeoError, Result};
use crate::metadata::AttrValue;
use crate::params::BaseObjectParam;
use crate::storage::Group;
use crate::types::{ContainerType, ObjectType};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Group attribute carrying the object type
pub const OBJECT_TYPE_ATTR: &str = "ObjectType";

/// Root attribute carrying the container type
pub const CONTAINER_TYPE_ATTR: &str = "ContainerType";

pub(crate) const SPATIAL_REFERENCE_ATTR: &str = "spatial_reference";
pub(crate) const LENGTH_UNITS_ATTR: &str = "length_units";
pub(crate) const TEMPORAL_UNITS_ATTR: &str = "temporal_units";
pub(crate) const ANGULAR_UNITS_ATTR: &str = "angular_units";
pub(crate) const DATA_UNITS_ATTR: &str = "data_units";

/// Identity and timestamps of an object's storage location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub id: Uuid,
    pub object_type: ObjectType,
    pub name: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[async_trait]
pub trait GeoObject: Sized + Clone + Send + Sync {
    const OBJECT_TYPE: ObjectType;

    /// Container kind that holds this object at top level
    const CONTAINER_TYPE: ContainerType;

    /// Record consumed at creation
    type Param: Clone + Send + Sync;

    /// Wrap a group already known to hold this type
    fn from_group(group: Group) -> Self;

    fn group(&self) -> &Group;

    /// Write attributes and datasets into a clean group
    async fn initialize(group: &Group, param: &Self::Param) -> Result<()>;

    /// Rebuild the creation record from stored attributes
    async fn param(&self) -> Result<Self::Param>;

    /// Wrap `group`, failing unless it is stamped with this type
    async fn open(group: Group) -> Result<Self> {
        match object_type_of(&group).await? {
            Some(t) if t == Self::OBJECT_TYPE => Ok(Self::from_group(group)),
            Some(t) => Err(GeoError::TypeMismatch(format!(
                "{} holds {}, not {}",
                group.path(),
                t,
                Self::OBJECT_TYPE
            ))),
            None => Err(GeoError::NotFound(format!(
                "{} is not a geo-object",
                group.path()
            ))),
        }
    }

    fn name(&self) -> String {
        self.group().name()
    }

    /// Absolute path inside the container
    fn path(&self) -> String {
        self.group().path()
    }

    /// Backend location of the owning container
    fn container_path(&self) -> String {
        self.group().file().file_name()
    }

    async fn metadata(&self) -> Result<ObjectMetadata> {
        let record = self.group().record().await?;
        Ok(ObjectMetadata {
            id: record.id,
            object_type: Self::OBJECT_TYPE,
            name: self.name(),
            path: self.path(),
            created_at: record.created_at,
            modified_at: record.modified_at,
        })
    }
}

/// Type stamped on `group`, `None` for plain groups
pub async fn object_type_of(group: &Group) -> Result<Option<ObjectType>> {
    Ok(group
        .attr(OBJECT_TYPE_ATTR)
        .await?
        .and_then(|v| v.as_i64())
        .and_then(|v| ObjectType::from_u32(v as u32)))
}

/// Closest ancestor of `group` (itself included) stamped with `object_type`
pub async fn find_parent_of_type(group: &Group, object_type: ObjectType) -> Result<Option<Group>> {
    let mut cur = Some(group.clone());
    while let Some(g) = cur {
        if object_type_of(&g).await? == Some(object_type) {
            return Ok(Some(g));
        }
        cur = g.parent();
    }
    Ok(None)
}

/// Groups under `group` stamped with `object_type`, sorted by path. With
/// `recursive`, plain groups are searched too; geo-objects are never entered.
pub async fn child_objects(
    group: &Group,
    object_type: ObjectType,
    recursive: bool,
) -> Result<Vec<Group>> {
    let mut found = Vec::new();
    let mut pending = vec![group.clone()];
    while let Some(g) = pending.pop() {
        for child in g.child_groups().await? {
            match object_type_of(&child).await? {
                Some(t) if t == object_type => found.push(child),
                None if recursive => pending.push(child),
                _ => {}
            }
        }
    }
    found.sort_by_key(|g| g.path());
    Ok(found)
}

// -----------------------------------------------------------------------------
// Attribute helpers
// -----------------------------------------------------------------------------

pub(crate) async fn attr_f64(group: &Group, name: &str) -> Result<f64> {
    group
        .attr(name)
        .await?
        .and_then(|v| v.as_f64())
        .ok_or_else(|| GeoError::InvalidFormat(format!("{} lacks numeric attribute {}", group.path(), name)))
}

pub(crate) async fn attr_u32(group: &Group, name: &str) -> Result<u32> {
    group
        .attr(name)
        .await?
        .and_then(|v| v.as_i64())
        .map(|v| v as u32)
        .ok_or_else(|| GeoError::InvalidFormat(format!("{} lacks integer attribute {}", group.path(), name)))
}

pub(crate) async fn attr_floats(group: &Group, name: &str, len: usize) -> Result<Vec<f64>> {
    match group.attr(name).await?.and_then(|v| v.as_floats()) {
        Some(v) if v.len() == len => Ok(v),
        _ => Err(GeoError::InvalidFormat(format!(
            "{} lacks {}-value attribute {}",
            group.path(),
            len,
            name
        ))),
    }
}

/// Text attribute, empty when unset
pub(crate) async fn attr_text(group: &Group, name: &str) -> Result<String> {
    Ok(group
        .attr(name)
        .await?
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default())
}

pub(crate) fn base_attrs(base: &BaseObjectParam) -> Vec<(&'static str, AttrValue)> {
    vec![
        (SPATIAL_REFERENCE_ATTR, base.spatial_reference.clone().into()),
        (LENGTH_UNITS_ATTR, base.length_units.clone().into()),
        (TEMPORAL_UNITS_ATTR, base.temporal_units.clone().into()),
        (ANGULAR_UNITS_ATTR, base.angular_units.clone().into()),
        (DATA_UNITS_ATTR, base.data_units.clone().into()),
    ]
}

pub(crate) async fn read_base(group: &Group) -> Result<BaseObjectParam> {
    Ok(BaseObjectParam {
        spatial_reference: attr_text(group, SPATIAL_REFERENCE_ATTR).await?,
        length_units: attr_text(group, LENGTH_UNITS_ATTR).await?,
        temporal_units: attr_text(group, TEMPORAL_UNITS_ATTR).await?,
        angular_units: attr_text(group, ANGULAR_UNITS_ATTR).await?,
        data_units: attr_text(group, DATA_UNITS_ATTR).await?,
    })
}
