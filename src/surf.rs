//! Regular surface grid given by origin, spacing and orientation

use crate::error::{GeoError, Result};
use crate::layout::Rect;
use crate::object::{
    attr_f64, attr_floats, attr_text, attr_u32, base_attrs, read_base, GeoObject,
    DATA_UNITS_ATTR, LENGTH_UNITS_ATTR,
};
use crate::params::SurfParam;
use crate::storage::{Dataset, Group};
use crate::types::{ContainerType, Domain, ObjectType};
use crate::units::{conversion_factor, to_stored_factor};
use async_trait::async_trait;
use ndarray::{Array2, ArrayView2};

const SURF_DATA: &str = "surf_data";
const ORIGIN_ATTR: &str = "origin";
const SPACING_ATTR: &str = "spacing";
const ORIENTATION_ATTR: &str = "orientation";
const DOMAIN_ATTR: &str = "Domain";

#[derive(Debug, Clone, PartialEq)]
pub struct Surf {
    group: Group,
}

#[async_trait]
impl GeoObject for Surf {
    const OBJECT_TYPE: ObjectType = ObjectType::SURFACE;
    const CONTAINER_TYPE: ContainerType = ContainerType::SURFACE;
    type Param = SurfParam;

    fn from_group(group: Group) -> Self {
        Self { group }
    }

    fn group(&self) -> &Group {
        &self.group
    }

    async fn initialize(group: &Group, param: &SurfParam) -> Result<()> {
        let mut attrs = base_attrs(&param.base);
        attrs.push((ORIGIN_ATTR, vec![param.x0, param.y0].into()));
        attrs.push((SPACING_ATTR, vec![param.dx, param.dy].into()));
        attrs.push((ORIENTATION_ATTR, param.orientation.into()));
        attrs.push((DOMAIN_ATTR, (param.domain as u32).into()));
        group.set_attrs(attrs).await?;
        group
            .create_dataset::<f64>(SURF_DATA, [param.ny, param.nx])
            .await?;
        Ok(())
    }

    async fn param(&self) -> Result<SurfParam> {
        let origin = self.origin("").await?;
        let spacing = self.spacing("").await?;
        let shape = self.dataset().await?.shape().await?;
        Ok(SurfParam {
            x0: origin.0,
            y0: origin.1,
            dx: spacing.0,
            dy: spacing.1,
            nx: shape[1],
            ny: shape[0],
            orientation: self.orientation().await?,
            domain: self.domain().await?,
            base: read_base(&self.group).await?,
        })
    }
}

impl Surf {
    async fn dataset(&self) -> Result<Dataset> {
        self.group.get_dataset(SURF_DATA).await
    }

    pub async fn write_data(&self, m: ArrayView2<'_, f64>, data_units: &str) -> Result<()> {
        let ds = self.dataset().await?;
        let shape = ds.shape().await?;
        if m.dim() != (shape[0], shape[1]) {
            return Err(GeoError::Range(format!(
                "surface {} is {}x{}, data is {}x{}",
                self.name(),
                shape[0],
                shape[1],
                m.nrows(),
                m.ncols()
            )));
        }
        let k = to_stored_factor(data_units, &self.data_units().await?)?;
        ds.write_array(0, 0, m.mapv(|v| v * k).view()).await
    }

    pub async fn data(&self, data_units: &str) -> Result<Array2<f64>> {
        let ds = self.dataset().await?;
        let k = conversion_factor(&self.data_units().await?, data_units)?;
        let m = ds.read_array::<f64>(Rect::full(ds.shape().await?)).await?;
        Ok(m.mapv(|v| v * k))
    }

    pub async fn domain(&self) -> Result<Domain> {
        let v = attr_u32(&self.group, DOMAIN_ATTR).await?;
        Domain::from_u32(v).ok_or_else(|| GeoError::InvalidFormat(format!("domain {}", v)))
    }

    pub async fn set_domain(&self, domain: Domain) -> Result<()> {
        self.group.set_attr(DOMAIN_ATTR, domain as u32).await
    }

    pub async fn spatial_units(&self) -> Result<String> {
        attr_text(&self.group, LENGTH_UNITS_ATTR).await
    }

    /// Relabel the spatial unit; stored coordinates are left alone
    pub async fn set_spatial_units(&self, units: &str) -> Result<()> {
        units.parse::<crate::units::Unit>()?;
        self.group.set_attr(LENGTH_UNITS_ATTR, units).await
    }

    pub async fn data_units(&self) -> Result<String> {
        attr_text(&self.group, DATA_UNITS_ATTR).await
    }

    pub async fn set_data_units(&self, units: &str) -> Result<()> {
        units.parse::<crate::units::Unit>()?;
        self.group.set_attr(DATA_UNITS_ATTR, units).await
    }

    /// Rotation in degrees
    pub async fn orientation(&self) -> Result<f64> {
        attr_f64(&self.group, ORIENTATION_ATTR).await
    }

    pub async fn set_orientation(&self, degrees: f64) -> Result<()> {
        self.group.set_attr(ORIENTATION_ATTR, degrees).await
    }

    async fn pair(&self, attr: &str, units: &str) -> Result<(f64, f64)> {
        let v = attr_floats(&self.group, attr, 2).await?;
        let k = conversion_factor(&self.spatial_units().await?, units)?;
        Ok((v[0] * k, v[1] * k))
    }

    async fn set_pair(&self, attr: &str, p: (f64, f64), units: &str) -> Result<()> {
        let k = to_stored_factor(units, &self.spatial_units().await?)?;
        self.group.set_attr(attr, vec![p.0 * k, p.1 * k]).await
    }

    pub async fn origin(&self, spatial_units: &str) -> Result<(f64, f64)> {
        self.pair(ORIGIN_ATTR, spatial_units).await
    }

    pub async fn set_origin(&self, p: (f64, f64), spatial_units: &str) -> Result<()> {
        self.set_pair(ORIGIN_ATTR, p, spatial_units).await
    }

    pub async fn spacing(&self, spatial_units: &str) -> Result<(f64, f64)> {
        self.pair(SPACING_ATTR, spatial_units).await
    }

    pub async fn set_spacing(&self, p: (f64, f64), spatial_units: &str) -> Result<()> {
        self.set_pair(SPACING_ATTR, p, spatial_units).await
    }
}
