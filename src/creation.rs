//! Obtaining a geo-object at a location under a creation policy

use crate::error::{GeoError, Result};
use crate::object::{object_type_of, GeoObject, OBJECT_TYPE_ATTR};
use crate::storage::Group;
use crate::types::CreationType;
use crate::utils::generate_name;

/// Where an object should live: a path relative to a parent group (absolute
/// when it starts with '/'), or an existing group
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Path(&'a str),
    Group(&'a Group),
}

impl<'a> From<&'a str> for Target<'a> {
    fn from(path: &'a str) -> Self {
        Target::Path(path)
    }
}

impl<'a> From<&'a String> for Target<'a> {
    fn from(path: &'a String) -> Self {
        Target::Path(path.as_str())
    }
}

impl<'a> From<&'a Group> for Target<'a> {
    fn from(group: &'a Group) -> Self {
        Target::Group(group)
    }
}

/// Materialise an object of type `T` at `target` under `parent`.
///
/// | policy                  | nothing there | plain group | same type | other type    |
/// |-------------------------|---------------|-------------|-----------|---------------|
/// | `OPEN`                  | NotFound      | NotFound    | open      | TypeMismatch  |
/// | `CREATE`                | create        | create      | AlreadyExists | AlreadyExists |
/// | `OPEN_OR_CREATE`        | create        | create      | open      | TypeMismatch  |
/// | `CREATE_OR_OVERWRITE`   | create        | wipe+create | wipe+create | TypeMismatch |
/// | `CREATE_UNDER_NEW_NAME` | create        | sibling     | sibling   | sibling       |
pub async fn create_object<T: GeoObject>(
    parent: &Group,
    target: Target<'_>,
    param: &T::Param,
    policy: CreationType,
) -> Result<T> {
    match target {
        Target::Group(group) => {
            if !group.file().same_file(parent.file()) {
                return Err(GeoError::OwnershipViolation(format!(
                    "{} belongs to another container",
                    group.path()
                )));
            }
            resolve_existing::<T>(group.clone(), param, policy).await
        }
        Target::Path(name) => {
            let name = if name.trim_matches('/').is_empty() {
                if policy != CreationType::CREATE_UNDER_NEW_NAME {
                    return Err(GeoError::InvalidName(format!(
                        "empty name for {}",
                        T::OBJECT_TYPE
                    )));
                }
                T::OBJECT_TYPE.name()
            } else {
                name
            };

            if parent.has_group(name).await? {
                let group = parent.get_group(name).await?;
                return resolve_existing::<T>(group, param, policy).await;
            }
            if policy == CreationType::OPEN {
                return Err(GeoError::NotFound(format!(
                    "{} {} under {}",
                    T::OBJECT_TYPE,
                    name,
                    parent.path()
                )));
            }
            let group = parent.create_group(name).await?;
            initialize::<T>(group, param).await
        }
    }
}

async fn resolve_existing<T: GeoObject>(
    group: Group,
    param: &T::Param,
    policy: CreationType,
) -> Result<T> {
    let existing = object_type_of(&group).await?;
    let same = existing == Some(T::OBJECT_TYPE);

    match policy {
        CreationType::OPEN => T::open(group).await,
        CreationType::OPEN_OR_CREATE if same => {
            tracing::debug!("opened {} {}", T::OBJECT_TYPE, group.path());
            Ok(T::from_group(group))
        }
        CreationType::OPEN_OR_CREATE => match existing {
            Some(other) => Err(GeoError::TypeMismatch(format!(
                "{} holds {}, requested {}",
                group.path(),
                other,
                T::OBJECT_TYPE
            ))),
            None => initialize::<T>(group, param).await,
        },
        CreationType::CREATE => match existing {
            Some(other) => Err(GeoError::AlreadyExists(format!(
                "{} already holds {}",
                group.path(),
                other
            ))),
            None => initialize::<T>(group, param).await,
        },
        CreationType::CREATE_OR_OVERWRITE => {
            if let Some(other) = existing.filter(|_| !same) {
                return Err(GeoError::TypeMismatch(format!(
                    "refusing to overwrite {} at {} with {}",
                    other,
                    group.path(),
                    T::OBJECT_TYPE
                )));
            }
            group.unlink_content().await?;
            group.delete_all_attrs().await?;
            group.file().sort_cache().invalidate(&group.path());
            tracing::debug!("overwriting {}", group.path());
            initialize::<T>(group, param).await
        }
        CreationType::CREATE_UNDER_NEW_NAME => {
            let parent = group.parent().ok_or_else(|| {
                GeoError::InvalidName("cannot create a sibling of the root".to_string())
            })?;
            let fresh = generate_name(&parent.children().await?, &group.name());
            let group = parent.create_group(&fresh).await?;
            initialize::<T>(group, param).await
        }
    }
}

async fn initialize<T: GeoObject>(group: Group, param: &T::Param) -> Result<T> {
    T::initialize(&group, param).await?;
    group
        .set_attr(OBJECT_TYPE_ATTR, T::OBJECT_TYPE as u32)
        .await?;
    tracing::debug!("created {} {}", T::OBJECT_TYPE, group.path());
    Ok(T::from_group(group))
}
