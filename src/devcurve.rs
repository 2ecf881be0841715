//! Deviation curve: the trajectory of a well
//!
//! Stored as one `7 x N` dataset whose rows are MD, AZIM, INCL, TVD, DX, DY
//! and OWT. X and Y are never stored; they are DX/DY shifted by the well head.

use crate::error::{GeoError, Result};
use crate::layout::Rect;
use crate::object::{
    attr_text, base_attrs, find_parent_of_type, read_base, GeoObject, ANGULAR_UNITS_ATTR,
    LENGTH_UNITS_ATTR, TEMPORAL_UNITS_ATTR,
};
use crate::params::DevCurveParam;
use crate::storage::{Dataset, Group};
use crate::survey;
use crate::types::{ContainerType, DevDataType, ObjectType};
use crate::units::{conversion_factor, to_stored_factor, AngleUnit, Unit};
use crate::utils::relative_path;
use crate::well::{Well, ACTIVE};
use async_trait::async_trait;
use ndarray::{Array1, Array2, ArrayView1, Axis};

const DEV_DATA: &str = "dev_data";
const STORED_ROWS: usize = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct DevCurve {
    group: Group,
}

#[async_trait]
impl GeoObject for DevCurve {
    const OBJECT_TYPE: ObjectType = ObjectType::DEVCURVE;
    const CONTAINER_TYPE: ContainerType = ContainerType::WELL;
    type Param = DevCurveParam;

    fn from_group(group: Group) -> Self {
        Self { group }
    }

    fn group(&self) -> &Group {
        &self.group
    }

    async fn initialize(group: &Group, param: &DevCurveParam) -> Result<()> {
        group.set_attrs(base_attrs(&param.base)).await?;
        let codec = group.file().defaults().codec;
        group
            .create_dataset_with::<f64>(DEV_DATA, [STORED_ROWS, 0], [STORED_ROWS, param.chunk_size], codec)
            .await?;
        group.set_attr("chunk_size", param.chunk_size as u32).await?;
        Ok(())
    }

    async fn param(&self) -> Result<DevCurveParam> {
        let chunk_size = crate::object::attr_u32(&self.group, "chunk_size").await? as usize;
        Ok(DevCurveParam {
            chunk_size,
            set_active: self.is_active().await?,
            base: read_base(&self.group).await?,
        })
    }
}

/// Row of `dev_data` holding `t`, `None` for derived rows
fn stored_row(t: DevDataType) -> Option<usize> {
    DevDataType::STORED.iter().position(|s| *s == t)
}

impl DevCurve {
    async fn dataset(&self) -> Result<Dataset> {
        self.group.get_dataset(DEV_DATA).await
    }

    /// Number of survey stations
    pub async fn n_samp(&self) -> Result<usize> {
        Ok(self.dataset().await?.shape().await?[1])
    }

    pub async fn length_units(&self) -> Result<String> {
        attr_text(&self.group, LENGTH_UNITS_ATTR).await
    }

    pub async fn temporal_units(&self) -> Result<String> {
        attr_text(&self.group, TEMPORAL_UNITS_ATTR).await
    }

    pub async fn angular_units(&self) -> Result<String> {
        attr_text(&self.group, ANGULAR_UNITS_ATTR).await
    }

    /// Stored unit of a curve type
    async fn units_of(&self, t: DevDataType) -> Result<String> {
        match t {
            DevDataType::OWT => self.temporal_units().await,
            DevDataType::AZIM | DevDataType::INCL => self.angular_units().await,
            _ => self.length_units().await,
        }
    }

    async fn angle_unit(&self) -> Result<AngleUnit> {
        let units = self.angular_units().await?;
        if units.is_empty() {
            return Ok(AngleUnit::Degree);
        }
        AngleUnit::try_from(units.parse::<Unit>()?)
    }

    /// Well head in the curve's length units; a missing unit on either side
    /// is taken as already matching
    async fn head_offset(&self) -> Result<(f64, f64)> {
        let well = self.well().await?.ok_or_else(|| {
            GeoError::NotFound(format!("no well above deviation curve {}", self.path()))
        })?;
        let (well_units, curve_units) = (well.length_units().await?, self.length_units().await?);
        let k = if well_units.is_empty() || curve_units.is_empty() {
            1.0
        } else {
            conversion_factor(&well_units, &curve_units)?
        };
        let (hx, hy) = well.head_coord("").await?;
        Ok((hx * k, hy * k))
    }

    async fn read_rows(&self) -> Result<Array2<f64>> {
        let ds = self.dataset().await?;
        ds.read_array::<f64>(Rect::full(ds.shape().await?)).await
    }

    async fn write_row(&self, row: usize, v: ArrayView1<'_, f64>) -> Result<()> {
        let ds = self.dataset().await?;
        let shape = ds.shape().await?;
        if shape[1] != v.len() {
            ds.resize::<f64>([STORED_ROWS, v.len()]).await?;
        }
        ds.write_array(row, 0, v.insert_axis(Axis(0))).await
    }

    /// Write one curve given in `units` (empty: as stored). A length other
    /// than the current station count resizes the whole table.
    pub async fn write_curve(
        &self,
        t: DevDataType,
        v: ArrayView1<'_, f64>,
        units: &str,
    ) -> Result<()> {
        let (row, shift) = match t {
            DevDataType::X => (4, self.head_offset().await?.0),
            DevDataType::Y => (5, self.head_offset().await?.1),
            other => match stored_row(other) {
                Some(row) => (row, 0.0),
                None => return Err(GeoError::NotFound(format!("curve {}", other.name()))),
            },
        };
        let k = to_stored_factor(units, &self.units_of(t).await?)?;
        let stored = v.mapv(|x| x * k - shift);
        self.write_row(row, stored.view()).await
    }

    /// Curve converted to `units` (empty: as stored)
    pub async fn curve(&self, t: DevDataType, units: &str) -> Result<Array1<f64>> {
        let (row, shift) = match t {
            DevDataType::X => (4, self.head_offset().await?.0),
            DevDataType::Y => (5, self.head_offset().await?.1),
            other => match stored_row(other) {
                Some(row) => (row, 0.0),
                None => return Err(GeoError::NotFound(format!("curve {}", other.name()))),
            },
        };
        let ds = self.dataset().await?;
        let n = ds.shape().await?[1];
        let v = ds.read_array::<f64>(Rect::new(row, 0, 1, n)).await?;
        let k = conversion_factor(&self.units_of(t).await?, units)?;
        Ok(v.row(0).mapv(|x| (x + shift) * k))
    }

    /// Recompute TVD, DX and DY from MD, AZIM and INCL
    pub async fn update_tvd_dx_dy(&self) -> Result<()> {
        let rows = self.read_rows().await?;
        let n = rows.ncols();
        let mut input = Array2::<f64>::zeros((n, 3));
        for (c, r) in [0usize, 1, 2].into_iter().enumerate() {
            input.column_mut(c).assign(&rows.row(r));
        }
        let out = survey::md_az_incl_to_md_x_y_tvd(input.view(), 0.0, 0.0, self.angle_unit().await?, false);
        if out.nrows() != n {
            return Err(GeoError::PreconditionViolation(format!(
                "survey of {} failed",
                self.path()
            )));
        }
        let mut table = rows;
        table.row_mut(3).assign(&out.column(3));
        table.row_mut(4).assign(&out.column(1));
        table.row_mut(5).assign(&out.column(2));
        self.dataset().await?.write_array(0, 0, table.view()).await?;
        tracing::debug!("recomputed TVD/DX/DY of {} over {} stations", self.path(), n);
        Ok(())
    }

    /// Recompute MD, AZIM and INCL from TVD, DX and DY
    pub async fn update_md_azim_incl(&self) -> Result<()> {
        let rows = self.read_rows().await?;
        let n = rows.ncols();
        let mut input = Array2::<f64>::zeros((n, 3));
        for (c, r) in [3usize, 4, 5].into_iter().enumerate() {
            input.column_mut(c).assign(&rows.row(r));
        }
        let out = survey::tvd_dx_dy_to_md_az_incl(input.view(), false);
        if out.nrows() != n {
            return Err(GeoError::PreconditionViolation(format!(
                "inverse survey of {} failed",
                self.path()
            )));
        }
        let to_angle: fn(f64) -> f64 = match self.angle_unit().await? {
            AngleUnit::Degree => f64::to_degrees,
            AngleUnit::Radian => |a| a,
        };
        let mut table = rows;
        table.row_mut(0).assign(&out.column(0));
        table.row_mut(1).assign(&out.column(1).mapv(to_angle));
        table.row_mut(2).assign(&out.column(2).mapv(to_angle));
        self.dataset().await?.write_array(0, 0, table.view()).await?;
        tracing::debug!("recomputed MD/AZIM/INCL of {} over {} stations", self.path(), n);
        Ok(())
    }

    /// Owning well
    pub async fn well(&self) -> Result<Option<Well>> {
        let found = match self.group.parent() {
            Some(p) => find_parent_of_type(&p, ObjectType::WELL).await?,
            None => None,
        };
        Ok(found.map(Well::from_group))
    }

    /// Path relative to the owning well's `DEV` group
    pub async fn relative_name(&self) -> Result<String> {
        match self.well().await? {
            Some(w) => Ok(relative_path(&w.dev_group().await?.path(), &self.path())
                .unwrap_or_else(|| self.name())),
            None => Ok(self.name()),
        }
    }

    pub async fn set_active(&self) -> Result<()> {
        match self.well().await? {
            Some(w) => w.set_active_dev_curve(self).await,
            None => Err(GeoError::NotFound(format!("no well above {}", self.path()))),
        }
    }

    /// True if the owning well's `ACTIVE` link points here
    pub async fn is_active(&self) -> Result<bool> {
        let Some(w) = self.well().await? else {
            return Ok(false);
        };
        let target = w.dev_group().await?.link_target(ACTIVE).await?;
        Ok(target.as_deref() == Some(self.path().as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creation::create_object;
    use crate::io::MemoryIOManager;
    use crate::params::WellParam;
    use crate::storage::{DatasetDefaults, StorageFile};
    use crate::types::CreationType;

    async fn well() -> Well {
        let root = StorageFile::create(Box::new(MemoryIOManager::new("d")), DatasetDefaults::default())
            .await
            .unwrap()
            .root();
        let p = WellParam::new(1000.0, 2000.0, 30.0, "UWI-7").with_length_units("m");
        create_object(&root, "w".into(), &p, CreationType::CREATE).await.unwrap()
    }

    fn dev_param() -> DevCurveParam {
        DevCurveParam::new("m", "ms", "degree")
    }

    #[tokio::test]
    async fn test_write_and_read_with_units() {
        let w = well().await;
        let dc = w
            .create_dev_curve("dc", &dev_param(), CreationType::CREATE)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(dc.n_samp().await.unwrap(), 0);

        let md = Array1::from(vec![0.0, 0.1, 0.25]);
        dc.write_curve(DevDataType::MD, md.view(), "km").await.unwrap();
        assert_eq!(dc.n_samp().await.unwrap(), 3);
        assert_eq!(dc.curve(DevDataType::MD, "").await.unwrap().to_vec(), vec![0.0, 100.0, 250.0]);

        let x = Array1::from(vec![1000.0, 1010.0, 1030.0]);
        dc.write_curve(DevDataType::X, x.view(), "").await.unwrap();
        assert_eq!(dc.curve(DevDataType::DX, "").await.unwrap().to_vec(), vec![0.0, 10.0, 30.0]);
        assert_eq!(dc.curve(DevDataType::X, "").await.unwrap(), x);

        let incl = Array1::from(vec![0.0, 90.0, 180.0]);
        dc.write_curve(DevDataType::INCL, incl.view(), "").await.unwrap();
        let rad = dc.curve(DevDataType::INCL, "rad").await.unwrap();
        assert!((rad[1] - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_active_and_relative_name() {
        let w = well().await;
        let a = w
            .create_dev_curve("runs/a", &dev_param().with_active(true), CreationType::CREATE)
            .await
            .unwrap()
            .unwrap();
        let b = w
            .create_dev_curve("b", &dev_param(), CreationType::CREATE)
            .await
            .unwrap()
            .unwrap();
        assert!(a.is_active().await.unwrap());
        assert!(!b.is_active().await.unwrap());

        b.set_active().await.unwrap();
        assert!(!a.is_active().await.unwrap());
        assert_eq!(w.active_dev_curve().await.unwrap(), Some(b.clone()));

        assert_eq!(a.relative_name().await.unwrap(), "runs/a");
        assert_eq!(a.well().await.unwrap(), Some(w.clone()));
        assert_eq!(w.dev_curve_names().await.unwrap(), vec!["b", "runs/a"]);
        assert_eq!(w.dev_curve_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_survey_updates_round_trip() {
        let w = well().await;
        let dc = w
            .create_dev_curve("s", &dev_param(), CreationType::CREATE)
            .await
            .unwrap()
            .unwrap();
        let n = 101;
        let t = |i: usize| i as f64 / (n - 1) as f64;
        let md = Array1::from_shape_fn(n, |i| 3000.0 * t(i));
        let az = Array1::from_shape_fn(n, |i| 30.0 + 30.0 * t(i));
        let incl = Array1::from_shape_fn(n, |i| 30.0 * t(i));
        dc.write_curve(DevDataType::MD, md.view(), "").await.unwrap();
        dc.write_curve(DevDataType::AZIM, az.view(), "").await.unwrap();
        dc.write_curve(DevDataType::INCL, incl.view(), "").await.unwrap();

        dc.update_tvd_dx_dy().await.unwrap();
        let tvd = dc.curve(DevDataType::TVD, "").await.unwrap();
        assert!(tvd[n - 1] < md[n - 1] && tvd[n - 1] > 0.9 * md[n - 1]);
        let dx = dc.curve(DevDataType::DX, "").await.unwrap();
        assert!(dx[n - 1] > 0.0);

        dc.update_md_azim_incl().await.unwrap();
        let md_back = dc.curve(DevDataType::MD, "").await.unwrap();
        let d = &md_back - &md;
        let err = d.iter().map(|v| v * v).sum::<f64>().sqrt() / md[n - 1];
        assert!(err < 0.05, "relative MD error {}", err);
    }
}
