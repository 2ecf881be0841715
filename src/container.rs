//! Containers: one storage root holding geo-objects of one family
//!
//! The root is stamped with a `ContainerType` attribute on first use. Opening
//! a root stamped for another family fails with `TypeMismatch`.

use crate::config::StoreConfig;
use crate::creation::{create_object, Target};
use crate::devcurve::DevCurve;
use crate::error::{resolved, GeoError, Result};
use crate::io::{create_io_manager, IOManager};
use crate::logcurve::LogCurve;
use crate::map::Map;
use crate::metadata::GROUP_RECORD;
use crate::object::{child_objects, GeoObject, CONTAINER_TYPE_ATTR};
use crate::seis::Seis;
use crate::storage::{DatasetDefaults, Group, StorageFile};
use crate::surf::Surf;
use crate::types::{ContainerType, CreationType};
use crate::well::Well;
use std::marker::PhantomData;

/// Typed view over a storage root holding objects of type `T`
#[derive(Debug, Clone)]
pub struct Container<T: GeoObject> {
    file: StorageFile,
    _objects: PhantomData<T>,
}

pub type WellContainer = Container<Well>;
pub type MapContainer = Container<Map>;
pub type SurfContainer = Container<Surf>;
pub type SeisContainer = Container<Seis>;

impl<T: GeoObject> PartialEq for Container<T> {
    fn eq(&self, other: &Self) -> bool {
        self.file.same_file(&other.file)
    }
}

/// Obtain the root behind `io` under `policy`
async fn root_with_policy(
    io: Box<dyn IOManager>,
    defaults: DatasetDefaults,
    policy: CreationType,
) -> Result<StorageFile> {
    match policy {
        CreationType::OPEN => StorageFile::open(io, defaults).await,
        CreationType::CREATE => StorageFile::create(io, defaults).await,
        CreationType::OPEN_OR_CREATE => StorageFile::open_or_create(io, defaults).await,
        CreationType::CREATE_OR_OVERWRITE => StorageFile::create_or_overwrite(io, defaults).await,
        CreationType::CREATE_UNDER_NEW_NAME => StorageFile::create(io, defaults).await,
    }
}

/// Open or create the container at `location` (a path, `file://` or `mem://`
/// URL) under `policy`. `None` when the policy or the container type rules the
/// location out; storage failures are returned as errors.
pub async fn create_container<T: GeoObject>(
    location: &str,
    policy: CreationType,
) -> Result<Option<Container<T>>> {
    resolved(try_create_container(location, policy, DatasetDefaults::default()).await)
}

pub async fn try_create_container<T: GeoObject>(
    location: &str,
    policy: CreationType,
    defaults: DatasetDefaults,
) -> Result<Container<T>> {
    let mut io = create_io_manager(location, false)?;
    if policy == CreationType::CREATE_UNDER_NEW_NAME {
        let mut n = 0;
        while io.exists(GROUP_RECORD).await? {
            n += 1;
            io = create_io_manager(&format!("{}_{}", location, n), false)?;
        }
    }
    let file = root_with_policy(io, defaults, policy).await?;
    Container::from_file(file).await
}

impl<T: GeoObject> Container<T> {
    /// Open the root described by `config`
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let io = create_io_manager(&config.root_url(), config.read_only)?;
        let file = root_with_policy(io, config.dataset_defaults(), config.open_mode.into()).await?;
        let container = Self::from_file(file).await?;
        tracing::info!(
            "opened {:?} container at {} ({:?}{})",
            T::CONTAINER_TYPE,
            container.file_name(),
            config.open_mode,
            if config.read_only { ", read-only" } else { "" }
        );
        Ok(container)
    }

    /// Wrap an opened root, stamping its container type if unset
    pub async fn from_file(file: StorageFile) -> Result<Self> {
        let root = file.root();
        match root.attr(CONTAINER_TYPE_ATTR).await?.and_then(|v| v.as_i64()) {
            Some(v) if v == T::CONTAINER_TYPE as i64 => {}
            Some(v) => {
                return Err(GeoError::TypeMismatch(format!(
                    "{} is a {:?} container, not {:?}",
                    file.file_name(),
                    ContainerType::from_u32(v as u32),
                    T::CONTAINER_TYPE
                )))
            }
            None if file.is_read_only() => {}
            None => root.set_attr(CONTAINER_TYPE_ATTR, T::CONTAINER_TYPE as u32).await?,
        }
        Ok(Self {
            file,
            _objects: PhantomData,
        })
    }

    pub fn file(&self) -> &StorageFile {
        &self.file
    }

    pub fn root(&self) -> Group {
        self.file.root()
    }

    pub fn file_name(&self) -> String {
        self.file.file_name()
    }

    /// Type stamped on the root; read-only roots may carry none
    pub async fn container_type(&self) -> Result<Option<ContainerType>> {
        Ok(self
            .root()
            .attr(CONTAINER_TYPE_ATTR)
            .await?
            .and_then(|v| v.as_i64())
            .and_then(|v| ContainerType::from_u32(v as u32)))
    }

    /// Create or open an object; resolution failures become `None`
    pub async fn create<'a>(
        &self,
        target: impl Into<Target<'a>>,
        param: &T::Param,
        policy: CreationType,
    ) -> Result<Option<T>> {
        resolved(self.try_create(target, param, policy).await)
    }

    pub async fn try_create<'a>(
        &self,
        target: impl Into<Target<'a>>,
        param: &T::Param,
        policy: CreationType,
    ) -> Result<T> {
        create_object(&self.root(), target.into(), param, policy).await
    }

    /// Object at `path`, `None` if absent or of another type
    pub async fn get(&self, path: &str) -> Result<Option<T>> {
        let opened = async { T::open(self.root().get_group(path).await?).await }.await;
        resolved(opened)
    }

    /// Every object of type `T`, at any depth outside other objects
    pub async fn objects(&self) -> Result<Vec<T>> {
        Ok(child_objects(&self.root(), T::OBJECT_TYPE, true)
            .await?
            .into_iter()
            .map(T::from_group)
            .collect())
    }

    /// Object paths relative to the root
    pub async fn object_names(&self) -> Result<Vec<String>> {
        Ok(self
            .objects()
            .await?
            .iter()
            .map(|o| o.path().trim_start_matches('/').to_string())
            .collect())
    }

    pub async fn object_count(&self) -> Result<usize> {
        Ok(self.objects().await?.len())
    }
}

impl WellContainer {
    pub async fn get_well_by_uwi(&self, uwi: &str) -> Result<Option<Well>> {
        for well in self.objects().await? {
            if well.uwi().await? == uwi {
                return Ok(Some(well));
            }
        }
        Ok(None)
    }

    /// Deviation curve at an absolute path anywhere in the container
    pub async fn get_dev_curve(&self, path: &str) -> Result<Option<DevCurve>> {
        let opened = async { DevCurve::open(self.root().get_group(path).await?).await }.await;
        resolved(opened)
    }

    /// Log curve at an absolute path anywhere in the container
    pub async fn get_log_curve(&self, path: &str) -> Result<Option<LogCurve>> {
        let opened = async { LogCurve::open(self.root().get_group(path).await?).await }.await;
        resolved(opened)
    }
}
