//! Hierarchical storage primitive: a root with nested groups, chunked 2-D
//! datasets, attributes and soft links, all persisted through an [`IOManager`].
//!
//! Layout on the backend:
//!
//! ```text
//! {root}/
//!   group.json                 root record (attributes, links)
//!   well_a/
//!     group.json
//!     DEV/dev1/dev_data/
//!       dataset.json           shape, element type, codec, attributes
//!       chunks/00000000.chunk  framed row bands
//! ```

use crate::compression::ChunkCodec;
use crate::error::{GeoError, Result};
use crate::io::{IOManager, StorageBackend};
use crate::layout::{ChunkLayout, Rect};
use crate::metadata::{AttrValue, DatasetRecord, GroupRecord, DATASET_RECORD, GROUP_RECORD};
use crate::sort::SortCache;
use crate::utils::{
    absolute_path, bytes_to_typed_data, checked_components, checked_name, chunk_path,
    format_bytes, join_path, split_parent, split_path, typed_data_to_bytes, Element,
};
use futures::future::try_join_all;
use ndarray::{Array2, ArrayView2};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

const MAX_LINK_HOPS: usize = 16;

/// Defaults applied to datasets created without explicit chunking
#[derive(Debug, Clone, Copy)]
pub struct DatasetDefaults {
    pub chunk_rows: usize,
    pub codec: ChunkCodec,
}

impl Default for DatasetDefaults {
    fn default() -> Self {
        Self {
            chunk_rows: 1000,
            codec: ChunkCodec::default(),
        }
    }
}

struct FileInner {
    io: Box<dyn IOManager>,
    defaults: DatasetDefaults,
    sort_cache: SortCache,
}

/// One storage root. Cloning shares the underlying manager; it is released
/// when the last handle (file, group or dataset) is dropped.
#[derive(Clone)]
pub struct StorageFile {
    inner: Arc<FileInner>,
}

impl fmt::Debug for StorageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageFile")
            .field("location", &self.file_name())
            .finish()
    }
}

impl StorageFile {
    fn wrap(io: Box<dyn IOManager>, defaults: DatasetDefaults) -> Self {
        Self {
            inner: Arc::new(FileInner {
                io,
                defaults,
                sort_cache: SortCache::default(),
            }),
        }
    }

    pub(crate) fn io(&self) -> &dyn IOManager {
        self.inner.io.as_ref()
    }

    /// Header sort indexes of the seismic objects under this root
    pub(crate) fn sort_cache(&self) -> &SortCache {
        &self.inner.sort_cache
    }

    pub fn defaults(&self) -> DatasetDefaults {
        self.inner.defaults
    }

    /// Open an existing root
    pub async fn open(io: Box<dyn IOManager>, defaults: DatasetDefaults) -> Result<Self> {
        if !io.exists(GROUP_RECORD).await? {
            return Err(GeoError::NotFound(format!("no storage root at {}", io.location())));
        }
        Ok(Self::wrap(io, defaults))
    }

    /// Create a root, failing if one is already there
    pub async fn create(io: Box<dyn IOManager>, defaults: DatasetDefaults) -> Result<Self> {
        if io.exists(GROUP_RECORD).await? {
            return Err(GeoError::AlreadyExists(format!(
                "storage root at {}",
                io.location()
            )));
        }
        io.create_dir("").await?;
        io.write(GROUP_RECORD, &GroupRecord::new().to_json()?).await?;
        tracing::debug!("created storage root {}", io.location());
        Ok(Self::wrap(io, defaults))
    }

    pub async fn open_or_create(io: Box<dyn IOManager>, defaults: DatasetDefaults) -> Result<Self> {
        if io.exists(GROUP_RECORD).await? {
            Ok(Self::wrap(io, defaults))
        } else {
            Self::create(io, defaults).await
        }
    }

    /// Wipe whatever is at the root and start empty
    pub async fn create_or_overwrite(
        io: Box<dyn IOManager>,
        defaults: DatasetDefaults,
    ) -> Result<Self> {
        if io.is_dir("").await? {
            for name in io.list("").await? {
                if io.is_dir(&name).await? {
                    io.delete_dir(&name).await?;
                } else {
                    io.delete(&name).await?;
                }
            }
        }
        Self::create(io, defaults).await
    }

    pub fn root(&self) -> Group {
        Group {
            file: self.clone(),
            path: String::new(),
        }
    }

    /// Backend location of this root
    pub fn file_name(&self) -> String {
        self.inner.io.location()
    }

    pub fn is_read_only(&self) -> bool {
        self.inner.io.is_read_only()
    }

    /// Same root: shared handle, or two handles on one filesystem location
    pub fn same_file(&self, other: &StorageFile) -> bool {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        let on_disk = |f: &StorageFile| f.io().backend() == StorageBackend::FileSystem;
        on_disk(self) && on_disk(other) && self.file_name() == other.file_name()
    }

    async fn is_group_dir(&self, path: &str) -> Result<bool> {
        Ok(self.io().is_dir(path).await? && !self.io().exists(&join_path(path, DATASET_RECORD)).await?)
    }

    async fn is_dataset_dir(&self, path: &str) -> Result<bool> {
        self.io().exists(&join_path(path, DATASET_RECORD)).await
    }

    async fn read_group_record(&self, path: &str) -> Result<GroupRecord> {
        let rec_path = join_path(path, GROUP_RECORD);
        if !self.io().exists(&rec_path).await? {
            tracing::warn!("group {} has no record, using an empty one", absolute_path(path));
            return Ok(GroupRecord::new());
        }
        GroupRecord::from_json(&self.io().read(&rec_path).await?)
    }

    async fn write_group_record(&self, path: &str, record: &GroupRecord) -> Result<()> {
        self.io()
            .write(&join_path(path, GROUP_RECORD), &record.to_json()?)
            .await
    }

    /// Resolve `rel` (relative to `base`, or absolute when it starts with '/')
    /// to a real path, following soft links. `None` when nothing is there.
    async fn resolve(&self, base: &str, rel: &str) -> Result<Option<String>> {
        let mut cur = if rel.starts_with('/') {
            String::new()
        } else {
            split_path(base).join("/")
        };
        let mut hops = 0;
        for comp in checked_components(rel)? {
            let candidate = join_path(&cur, comp);
            if self.io().is_dir(&candidate).await? {
                cur = candidate;
                continue;
            }
            if !self.is_group_dir(&cur).await? {
                return Ok(None);
            }
            let record = self.read_group_record(&cur).await?;
            match record.links.get(comp) {
                Some(target) => {
                    hops += 1;
                    if hops > MAX_LINK_HOPS {
                        return Err(GeoError::InvalidFormat(format!(
                            "too many link hops resolving {}",
                            rel
                        )));
                    }
                    let target = split_path(target).join("/");
                    if !self.io().is_dir(&target).await? {
                        tracing::warn!("dangling link {} -> /{}", candidate, target);
                        return Ok(None);
                    }
                    cur = target;
                }
                None => return Ok(None),
            }
        }
        Ok(Some(cur))
    }
}

/// Kind of a named child inside a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Dataset,
    Link,
}

/// Handle to a group
#[derive(Clone)]
pub struct Group {
    file: StorageFile,
    /// Normalised path without leading '/', empty for the root
    path: String,
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Group({}:{})", self.file.file_name(), self.path())
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.file.same_file(&other.file)
    }
}

impl Group {
    pub fn file(&self) -> &StorageFile {
        &self.file
    }

    /// Absolute path, `/` for the root
    pub fn path(&self) -> String {
        absolute_path(&self.path)
    }

    pub fn name(&self) -> String {
        split_parent(&self.path).1
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    pub fn parent(&self) -> Option<Group> {
        if self.is_root() {
            return None;
        }
        Some(Group {
            file: self.file.clone(),
            path: split_parent(&self.path).0,
        })
    }

    fn child(&self, path: String) -> Group {
        Group {
            file: self.file.clone(),
            path,
        }
    }

    pub async fn record(&self) -> Result<GroupRecord> {
        self.file.read_group_record(&self.path).await
    }

    async fn update_record<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut GroupRecord),
    {
        let mut record = self.record().await?;
        f(&mut record);
        record.touch();
        self.file.write_group_record(&self.path, &record).await
    }

    /// Stable identity of the group's storage location
    pub async fn id(&self) -> Result<Uuid> {
        Ok(self.record().await?.id)
    }

    // -------------------------------------------------------------------------
    // Attributes
    // -------------------------------------------------------------------------

    pub async fn attr(&self, name: &str) -> Result<Option<AttrValue>> {
        Ok(self.record().await?.attributes.get(name).cloned())
    }

    pub async fn has_attr(&self, name: &str) -> Result<bool> {
        Ok(self.record().await?.attributes.contains_key(name))
    }

    pub async fn set_attr(&self, name: &str, value: impl Into<AttrValue>) -> Result<()> {
        let value = value.into();
        self.update_record(|r| {
            r.attributes.insert(name.to_string(), value);
        })
        .await
    }

    /// Write several attributes with one record update
    pub async fn set_attrs(&self, attrs: Vec<(&str, AttrValue)>) -> Result<()> {
        self.update_record(|r| {
            for (name, value) in attrs {
                r.attributes.insert(name.to_string(), value);
            }
        })
        .await
    }

    pub async fn delete_attr(&self, name: &str) -> Result<()> {
        self.update_record(|r| {
            r.attributes.remove(name);
        })
        .await
    }

    pub async fn delete_all_attrs(&self) -> Result<()> {
        self.update_record(|r| r.attributes.clear()).await
    }

    pub async fn attr_names(&self) -> Result<Vec<String>> {
        Ok(self.record().await?.attributes.keys().cloned().collect())
    }

    // -------------------------------------------------------------------------
    // Children
    // -------------------------------------------------------------------------

    /// Kind of the direct child `name`, `None` if absent
    pub async fn child_kind(&self, name: &str) -> Result<Option<NodeKind>> {
        let name = checked_name(name)?;
        let path = join_path(&self.path, name);
        if self.file.is_dataset_dir(&path).await? {
            return Ok(Some(NodeKind::Dataset));
        }
        if self.file.io().is_dir(&path).await? {
            return Ok(Some(NodeKind::Group));
        }
        if self.record().await?.links.contains_key(name) {
            return Ok(Some(NodeKind::Link));
        }
        Ok(None)
    }

    /// Names of direct children (groups, datasets and links), sorted
    pub async fn children(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .file
            .io()
            .list(&self.path)
            .await?
            .into_iter()
            .filter(|n| n != GROUP_RECORD)
            .collect();
        names.extend(self.record().await?.links.keys().cloned());
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Direct child groups, links excluded
    pub async fn child_groups(&self) -> Result<Vec<Group>> {
        let mut groups = Vec::new();
        for name in self.file.io().list(&self.path).await? {
            let path = join_path(&self.path, &name);
            if self.file.is_group_dir(&path).await? {
                groups.push(self.child(path));
            }
        }
        Ok(groups)
    }

    /// True if a group (possibly through links) exists at `rel`
    pub async fn has_group(&self, rel: &str) -> Result<bool> {
        match self.file.resolve(&self.path, rel).await? {
            Some(p) => self.file.is_group_dir(&p).await,
            None => Ok(false),
        }
    }

    pub async fn has_dataset(&self, rel: &str) -> Result<bool> {
        match self.file.resolve(&self.path, rel).await? {
            Some(p) => self.file.is_dataset_dir(&p).await,
            None => Ok(false),
        }
    }

    /// Open the group at `rel`, following links
    pub async fn get_group(&self, rel: &str) -> Result<Group> {
        match self.file.resolve(&self.path, rel).await? {
            Some(p) if self.file.is_group_dir(&p).await? => Ok(self.child(p)),
            Some(p) => Err(GeoError::TypeMismatch(format!(
                "{} is a dataset, not a group",
                absolute_path(&p)
            ))),
            None => Err(GeoError::NotFound(format!(
                "group {} under {}",
                rel,
                self.path()
            ))),
        }
    }

    /// Create the group at `rel` with any missing intermediate groups; opens it
    /// if it already exists
    pub async fn create_group(&self, rel: &str) -> Result<Group> {
        let mut cur = if rel.starts_with('/') {
            String::new()
        } else {
            self.path.clone()
        };
        for comp in checked_components(rel)? {
            let next = match self.file.resolve(&cur, comp).await? {
                Some(p) => {
                    if self.file.is_dataset_dir(&p).await? {
                        return Err(GeoError::TypeMismatch(format!(
                            "{} is a dataset, not a group",
                            absolute_path(&p)
                        )));
                    }
                    p
                }
                None => {
                    let p = join_path(&cur, comp);
                    self.file.io().create_dir(&p).await?;
                    self.file.write_group_record(&p, &GroupRecord::new()).await?;
                    p
                }
            };
            cur = next;
        }
        Ok(self.child(cur))
    }

    /// Remove a direct child of any kind
    pub async fn unlink(&self, name: &str) -> Result<()> {
        match self.child_kind(name).await? {
            Some(NodeKind::Link) => {
                self.update_record(|r| {
                    r.links.remove(name);
                })
                .await
            }
            Some(_) => self.file.io().delete_dir(&join_path(&self.path, name)).await,
            None => Err(GeoError::NotFound(format!("{} in {}", name, self.path()))),
        }
    }

    /// Remove every child group, dataset and link, keep attributes
    pub async fn unlink_content(&self) -> Result<()> {
        for name in self.file.io().list(&self.path).await? {
            if name == GROUP_RECORD {
                continue;
            }
            let path = join_path(&self.path, &name);
            if self.file.io().is_dir(&path).await? {
                self.file.io().delete_dir(&path).await?;
            } else {
                self.file.io().delete(&path).await?;
            }
        }
        self.update_record(|r| r.links.clear()).await
    }

    // -------------------------------------------------------------------------
    // Links
    // -------------------------------------------------------------------------

    /// Soft link `name` in this group pointing at `target`
    pub async fn create_link(&self, name: &str, target: &Group) -> Result<()> {
        if !self.file.same_file(&target.file) {
            return Err(GeoError::OwnershipViolation(format!(
                "link target {} lives in another root",
                target.path()
            )));
        }
        if matches!(
            self.child_kind(name).await?,
            Some(NodeKind::Group) | Some(NodeKind::Dataset)
        ) {
            return Err(GeoError::AlreadyExists(format!("{} in {}", name, self.path())));
        }
        let target_path = target.path();
        self.update_record(|r| {
            r.links.insert(name.to_string(), target_path);
        })
        .await
    }

    /// Absolute target of link `name`
    pub async fn link_target(&self, name: &str) -> Result<Option<String>> {
        Ok(self.record().await?.links.get(name).cloned())
    }

    // -------------------------------------------------------------------------
    // Datasets
    // -------------------------------------------------------------------------

    /// Create a 2-D dataset of element type `T`, using the root's defaults
    pub async fn create_dataset<T: Element>(&self, name: &str, shape: [usize; 2]) -> Result<Dataset> {
        let defaults = self.file.defaults();
        self.create_dataset_with::<T>(name, shape, [defaults.chunk_rows, 0], defaults.codec)
            .await
    }

    /// Create a 2-D dataset tiled in `chunk` = [rows, cols] chunks; a zero
    /// column count spans the full width
    pub async fn create_dataset_with<T: Element>(
        &self,
        name: &str,
        shape: [usize; 2],
        chunk: [usize; 2],
        codec: ChunkCodec,
    ) -> Result<Dataset> {
        if self.child_kind(name).await?.is_some() {
            return Err(GeoError::AlreadyExists(format!("{} in {}", name, self.path())));
        }
        let path = join_path(&self.path, name);
        let record = DatasetRecord::new(shape, T::DATA_TYPE, chunk, codec);
        self.file
            .io()
            .write(&join_path(&path, DATASET_RECORD), &record.to_json()?)
            .await?;
        tracing::debug!(
            "created dataset {} {}x{} {} ({})",
            absolute_path(&path),
            shape[0],
            shape[1],
            T::DATA_TYPE,
            format_bytes(shape[0] * shape[1] * T::DATA_TYPE.size_in_bytes())
        );
        Ok(Dataset {
            file: self.file.clone(),
            path,
        })
    }

    pub async fn get_dataset(&self, rel: &str) -> Result<Dataset> {
        match self.file.resolve(&self.path, rel).await? {
            Some(p) if self.file.is_dataset_dir(&p).await? => Ok(Dataset {
                file: self.file.clone(),
                path: p,
            }),
            Some(p) => Err(GeoError::TypeMismatch(format!(
                "{} is a group, not a dataset",
                absolute_path(&p)
            ))),
            None => Err(GeoError::NotFound(format!(
                "dataset {} under {}",
                rel,
                self.path()
            ))),
        }
    }
}

/// Handle to a chunked 2-D dataset
#[derive(Clone)]
pub struct Dataset {
    file: StorageFile,
    path: String,
}

impl fmt::Debug for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dataset({}:{})", self.file.file_name(), self.path())
    }
}

impl Dataset {
    pub fn path(&self) -> String {
        absolute_path(&self.path)
    }

    pub fn name(&self) -> String {
        split_parent(&self.path).1
    }

    pub async fn record(&self) -> Result<DatasetRecord> {
        let bytes = self
            .file
            .io()
            .read(&join_path(&self.path, DATASET_RECORD))
            .await?;
        DatasetRecord::from_json(&bytes)
    }

    async fn write_record(&self, record: &DatasetRecord) -> Result<()> {
        self.file
            .io()
            .write(&join_path(&self.path, DATASET_RECORD), &record.to_json()?)
            .await
    }

    /// Extent as [rows, cols]
    pub async fn shape(&self) -> Result<[usize; 2]> {
        Ok(self.record().await?.shape)
    }

    pub async fn attr(&self, name: &str) -> Result<Option<AttrValue>> {
        Ok(self.record().await?.attributes.get(name).cloned())
    }

    pub async fn set_attr(&self, name: &str, value: impl Into<AttrValue>) -> Result<()> {
        let mut record = self.record().await?;
        record.attributes.insert(name.to_string(), value.into());
        record.touch();
        self.write_record(&record).await
    }

    fn check_type<T: Element>(&self, record: &DatasetRecord) -> Result<()> {
        if record.data_type != T::DATA_TYPE {
            return Err(GeoError::InvalidFormat(format!(
                "{} holds {} elements, requested {}",
                self.path(),
                record.data_type,
                T::DATA_TYPE
            )));
        }
        Ok(())
    }

    async fn load_chunk<T: Element>(
        &self,
        layout: &ChunkLayout,
        elem_size: usize,
        index: usize,
    ) -> Result<Vec<T>> {
        match self.file.io().read(&chunk_path(&self.path, index)).await {
            Ok(framed) => {
                let raw = ChunkCodec::decode(&framed, elem_size)?;
                let values = bytes_to_typed_data::<T>(&raw)?;
                if values.len() != layout.chunk_len(index) {
                    return Err(GeoError::InvalidFormat(format!(
                        "chunk {} of {} has {} elements, expected {}",
                        index,
                        self.path(),
                        values.len(),
                        layout.chunk_len(index)
                    )));
                }
                Ok(values)
            }
            Err(GeoError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(vec![T::default(); layout.chunk_len(index)])
            }
            Err(e) => Err(e),
        }
    }

    /// Read a rectangular block in row-major order
    pub async fn read_raw<T: Element>(&self, rect: Rect) -> Result<Vec<T>> {
        let record = self.record().await?;
        self.check_type::<T>(&record)?;
        rect.check_within(record.shape)?;

        let layout = ChunkLayout::new(record.shape, record.chunk());
        let elem_size = record.data_type.size_in_bytes();
        let indices = layout.overlapping_chunks(&rect);

        let chunks = try_join_all(
            indices
                .iter()
                .map(|&index| self.load_chunk::<T>(&layout, elem_size, index)),
        )
        .await?;

        let mut out = vec![T::default(); rect.len()];
        for (&index, chunk) in indices.iter().zip(chunks.iter()) {
            for (in_chunk, in_block, len) in layout.copy_runs(index, &rect) {
                out[in_block..in_block + len].copy_from_slice(&chunk[in_chunk..in_chunk + len]);
            }
        }
        Ok(out)
    }

    /// Write a rectangular block given in row-major order
    pub async fn write_raw<T: Element>(&self, rect: Rect, data: &[T]) -> Result<()> {
        let mut record = self.record().await?;
        self.check_type::<T>(&record)?;
        rect.check_within(record.shape)?;
        if data.len() != rect.len() {
            return Err(GeoError::Range(format!(
                "buffer holds {} values, block needs {}",
                data.len(),
                rect.len()
            )));
        }

        let layout = ChunkLayout::new(record.shape, record.chunk());
        let elem_size = record.data_type.size_in_bytes();
        let codec = record.codec;

        try_join_all(layout.overlapping_chunks(&rect).into_iter().map(|index| {
            let layout = &layout;
            async move {
                let mut chunk = self.load_chunk::<T>(layout, elem_size, index).await?;
                for (in_chunk, in_block, len) in layout.copy_runs(index, &rect) {
                    chunk[in_chunk..in_chunk + len].copy_from_slice(&data[in_block..in_block + len]);
                }
                let framed = codec.encode(&typed_data_to_bytes(&chunk), elem_size)?;
                self.file
                    .io()
                    .write(&chunk_path(&self.path, index), &framed)
                    .await
            }
        }))
        .await?;

        record.touch();
        self.write_record(&record).await
    }

    pub async fn read_all<T: Element>(&self) -> Result<Vec<T>> {
        let shape = self.shape().await?;
        self.read_raw(Rect::full(shape)).await
    }

    pub async fn read_array<T: Element>(&self, rect: Rect) -> Result<Array2<T>> {
        let data = self.read_raw::<T>(rect).await?;
        Array2::from_shape_vec((rect.n_rows, rect.n_cols), data)
            .map_err(|e| GeoError::InvalidFormat(e.to_string()))
    }

    /// Write `block` with its top-left corner at (`row`, `col`)
    pub async fn write_array<T: Element>(
        &self,
        row: usize,
        col: usize,
        block: ArrayView2<'_, T>,
    ) -> Result<()> {
        let (n_rows, n_cols) = block.dim();
        let data: Vec<T> = block.iter().copied().collect();
        self.write_raw(Rect::new(row, col, n_rows, n_cols), &data).await
    }

    /// Change the extent, keeping the overlapping part of the old content
    pub async fn resize<T: Element>(&self, shape: [usize; 2]) -> Result<()> {
        let mut record = self.record().await?;
        self.check_type::<T>(&record)?;
        if record.shape == shape {
            return Ok(());
        }

        let keep = Rect::new(
            0,
            0,
            record.shape[0].min(shape[0]),
            record.shape[1].min(shape[1]),
        );
        let old = self.read_raw::<T>(keep).await?;

        let chunks_dir = join_path(&self.path, "chunks");
        if self.file.io().is_dir(&chunks_dir).await? {
            self.file.io().delete_dir(&chunks_dir).await?;
        }
        record.shape = shape;
        record.touch();
        self.write_record(&record).await?;

        if !keep.is_empty() {
            self.write_raw(keep, &old).await?;
        }
        Ok(())
    }
}
