//! 2-D map: a regular grid given by three corner points

use crate::error::{GeoError, Result};
use crate::layout::Rect;
use crate::object::{
    attr_floats, attr_text, attr_u32, base_attrs, read_base, GeoObject, DATA_UNITS_ATTR,
    LENGTH_UNITS_ATTR,
};
use crate::params::MapParam;
use crate::storage::{Dataset, Group};
use crate::types::{ContainerType, Domain, ObjectType};
use crate::units::{conversion_factor, to_stored_factor};
use async_trait::async_trait;
use ndarray::{Array2, ArrayView2};

const MAP_DATA: &str = "map_data";
const ORIGIN_ATTR: &str = "origin";
const POINT1_ATTR: &str = "point1";
const POINT2_ATTR: &str = "point2";
const DOMAIN_ATTR: &str = "Domain";
const CHUNK_ATTR: &str = "chunk_size";

#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    group: Group,
}

#[async_trait]
impl GeoObject for Map {
    const OBJECT_TYPE: ObjectType = ObjectType::MAP;
    const CONTAINER_TYPE: ContainerType = ContainerType::MAP;
    type Param = MapParam;

    fn from_group(group: Group) -> Self {
        Self { group }
    }

    fn group(&self) -> &Group {
        &self.group
    }

    async fn initialize(group: &Group, param: &MapParam) -> Result<()> {
        let mut attrs = base_attrs(&param.base);
        attrs.push((ORIGIN_ATTR, vec![param.x0, param.y0].into()));
        attrs.push((POINT1_ATTR, vec![param.x1, param.y1].into()));
        attrs.push((POINT2_ATTR, vec![param.x2, param.y2].into()));
        attrs.push((DOMAIN_ATTR, (param.domain as u32).into()));
        attrs.push((
            CHUNK_ATTR,
            vec![param.x_chunk_size as f64, param.y_chunk_size as f64].into(),
        ));
        group.set_attrs(attrs).await?;

        let codec = group.file().defaults().codec;
        group
            .create_dataset_with::<f64>(
                MAP_DATA,
                [param.ny, param.nx],
                [param.y_chunk_size, param.x_chunk_size],
                codec,
            )
            .await?;
        Ok(())
    }

    async fn param(&self) -> Result<MapParam> {
        let [origin, p1, p2] = [
            self.origin("").await?,
            self.point1("").await?,
            self.point2("").await?,
        ];
        let chunks = attr_floats(&self.group, CHUNK_ATTR, 2).await?;
        let shape = self.dataset().await?.shape().await?;
        Ok(MapParam {
            x0: origin.0,
            y0: origin.1,
            x1: p1.0,
            y1: p1.1,
            x2: p2.0,
            y2: p2.1,
            nx: shape[1],
            ny: shape[0],
            domain: self.domain().await?,
            x_chunk_size: chunks[0] as usize,
            y_chunk_size: chunks[1] as usize,
            base: read_base(&self.group).await?,
        })
    }
}

impl Map {
    async fn dataset(&self) -> Result<Dataset> {
        self.group.get_dataset(MAP_DATA).await
    }

    /// Write the full `ny x nx` grid given in `data_units` (empty: as stored)
    pub async fn write_data(&self, m: ArrayView2<'_, f64>, data_units: &str) -> Result<()> {
        let ds = self.dataset().await?;
        let shape = ds.shape().await?;
        if m.dim() != (shape[0], shape[1]) {
            return Err(GeoError::Range(format!(
                "map {} is {}x{}, data is {}x{}",
                self.name(),
                shape[0],
                shape[1],
                m.nrows(),
                m.ncols()
            )));
        }
        let k = to_stored_factor(data_units, &self.data_units().await?)?;
        if k == 1.0 {
            return ds.write_array(0, 0, m).await;
        }
        ds.write_array(0, 0, m.mapv(|v| v * k).view()).await
    }

    /// Full grid converted to `data_units` (empty: as stored)
    pub async fn data(&self, data_units: &str) -> Result<Array2<f64>> {
        let ds = self.dataset().await?;
        let shape = ds.shape().await?;
        let k = conversion_factor(&self.data_units().await?, data_units)?;
        let m = ds.read_array::<f64>(Rect::full(shape)).await?;
        Ok(if k == 1.0 { m } else { m.mapv(|v| v * k) })
    }

    pub async fn nx(&self) -> Result<usize> {
        Ok(self.dataset().await?.shape().await?[1])
    }

    pub async fn ny(&self) -> Result<usize> {
        Ok(self.dataset().await?.shape().await?[0])
    }

    pub async fn domain(&self) -> Result<Domain> {
        let v = attr_u32(&self.group, DOMAIN_ATTR).await?;
        Domain::from_u32(v).ok_or_else(|| GeoError::InvalidFormat(format!("domain {}", v)))
    }

    pub async fn set_domain(&self, domain: Domain) -> Result<()> {
        self.group.set_attr(DOMAIN_ATTR, domain as u32).await
    }

    pub async fn length_units(&self) -> Result<String> {
        attr_text(&self.group, LENGTH_UNITS_ATTR).await
    }

    pub async fn data_units(&self) -> Result<String> {
        attr_text(&self.group, DATA_UNITS_ATTR).await
    }

    async fn point(&self, attr: &str, length_units: &str) -> Result<(f64, f64)> {
        let v = attr_floats(&self.group, attr, 2).await?;
        let k = conversion_factor(&self.length_units().await?, length_units)?;
        Ok((v[0] * k, v[1] * k))
    }

    async fn set_point(&self, attr: &str, p: (f64, f64), length_units: &str) -> Result<()> {
        let k = to_stored_factor(length_units, &self.length_units().await?)?;
        self.group.set_attr(attr, vec![p.0 * k, p.1 * k]).await
    }

    /// Upper-left corner
    pub async fn origin(&self, length_units: &str) -> Result<(f64, f64)> {
        self.point(ORIGIN_ATTR, length_units).await
    }

    /// Upper-right corner
    pub async fn point1(&self, length_units: &str) -> Result<(f64, f64)> {
        self.point(POINT1_ATTR, length_units).await
    }

    /// Lower-left corner
    pub async fn point2(&self, length_units: &str) -> Result<(f64, f64)> {
        self.point(POINT2_ATTR, length_units).await
    }

    pub async fn set_origin(&self, p: (f64, f64), length_units: &str) -> Result<()> {
        self.set_point(ORIGIN_ATTR, p, length_units).await
    }

    pub async fn set_point1(&self, p: (f64, f64), length_units: &str) -> Result<()> {
        self.set_point(POINT1_ATTR, p, length_units).await
    }

    pub async fn set_point2(&self, p: (f64, f64), length_units: &str) -> Result<()> {
        self.set_point(POINT2_ATTR, p, length_units).await
    }

    // -------------------------------------------------------------------------
    // Attribute maps
    // -------------------------------------------------------------------------

    /// Attach `other` as an attribute map through a soft link.
    ///
    /// Both maps must share a container and a grid size. An empty `name`
    /// uses the other map's name.
    pub async fn add_attribute_map(&self, other: &Map, name: &str) -> Result<Option<Map>> {
        crate::error::resolved(self.try_add_attribute_map(other, name).await)
    }

    pub async fn try_add_attribute_map(&self, other: &Map, name: &str) -> Result<Map> {
        if !self.group.file().same_file(other.group.file()) {
            return Err(GeoError::OwnershipViolation(format!(
                "attribute map {} lives in another container",
                other.path()
            )));
        }
        if (self.nx().await?, self.ny().await?) != (other.nx().await?, other.ny().await?) {
            return Err(GeoError::TypeMismatch(format!(
                "attribute map {} has a different grid",
                other.path()
            )));
        }
        let name = if name.is_empty() { other.name() } else { name.to_string() };
        if name == MAP_DATA {
            return Err(GeoError::InvalidName(name));
        }
        self.group.create_link(&name, &other.group).await?;
        Ok(other.clone())
    }

    pub async fn remove_attribute_map(&self, name: &str) -> Result<()> {
        if self.group.link_target(name).await?.is_none() {
            return Err(GeoError::NotFound(format!("attribute map {} of {}", name, self.name())));
        }
        self.group.unlink(name).await
    }

    pub async fn open_attribute_map(&self, name: &str) -> Result<Option<Map>> {
        if self.group.link_target(name).await?.is_none() {
            return Ok(None);
        }
        let opened = async { Map::open(self.group.get_group(name).await?).await }.await;
        crate::error::resolved(opened)
    }

    pub async fn attribute_map_names(&self) -> Result<Vec<String>> {
        Ok(self.group.record().await?.links.keys().cloned().collect())
    }

    pub async fn attribute_map_count(&self) -> Result<usize> {
        Ok(self.attribute_map_names().await?.len())
    }
}
