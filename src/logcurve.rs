//! Log curve: values sampled along measured depth, stored as a `2 x N`
//! dataset with rows MD and VAL

use crate::error::Result;
use crate::layout::Rect;
use crate::object::{
    attr_text, attr_u32, base_attrs, find_parent_of_type, read_base, GeoObject, DATA_UNITS_ATTR,
    LENGTH_UNITS_ATTR,
};
use crate::params::LogCurveParam;
use crate::storage::{Dataset, Group};
use crate::types::{ContainerType, LogDataType, ObjectType};
use crate::units::{conversion_factor, to_stored_factor};
use crate::utils::relative_path;
use crate::well::Well;
use async_trait::async_trait;
use ndarray::{Array1, ArrayView1, Axis};

const LOG_DATA: &str = "log_data";
const CHUNK_ATTR: &str = "chunk_size";

#[derive(Debug, Clone, PartialEq)]
pub struct LogCurve {
    group: Group,
}

#[async_trait]
impl GeoObject for LogCurve {
    const OBJECT_TYPE: ObjectType = ObjectType::LOGCURVE;
    const CONTAINER_TYPE: ContainerType = ContainerType::WELL;
    type Param = LogCurveParam;

    fn from_group(group: Group) -> Self {
        Self { group }
    }

    fn group(&self) -> &Group {
        &self.group
    }

    async fn initialize(group: &Group, param: &LogCurveParam) -> Result<()> {
        let mut attrs = base_attrs(&param.base);
        attrs.push((CHUNK_ATTR, (param.chunk_size as u32).into()));
        group.set_attrs(attrs).await?;
        let codec = group.file().defaults().codec;
        group
            .create_dataset_with::<f64>(LOG_DATA, [2, 0], [2, param.chunk_size], codec)
            .await?;
        Ok(())
    }

    async fn param(&self) -> Result<LogCurveParam> {
        Ok(LogCurveParam {
            chunk_size: attr_u32(&self.group, CHUNK_ATTR).await? as usize,
            base: read_base(&self.group).await?,
        })
    }
}

fn row_of(t: LogDataType) -> usize {
    match t {
        LogDataType::MD => 0,
        LogDataType::VAL => 1,
    }
}

impl LogCurve {
    async fn dataset(&self) -> Result<Dataset> {
        self.group.get_dataset(LOG_DATA).await
    }

    pub async fn n_samp(&self) -> Result<usize> {
        Ok(self.dataset().await?.shape().await?[1])
    }

    pub async fn length_units(&self) -> Result<String> {
        attr_text(&self.group, LENGTH_UNITS_ATTR).await
    }

    pub async fn data_units(&self) -> Result<String> {
        attr_text(&self.group, DATA_UNITS_ATTR).await
    }

    async fn units_of(&self, t: LogDataType) -> Result<String> {
        match t {
            LogDataType::MD => self.length_units().await,
            LogDataType::VAL => self.data_units().await,
        }
    }

    /// Write MD or VAL given in `units`; a new length resizes both rows
    pub async fn write_curve(
        &self,
        t: LogDataType,
        v: ArrayView1<'_, f64>,
        units: &str,
    ) -> Result<()> {
        let ds = self.dataset().await?;
        if ds.shape().await?[1] != v.len() {
            ds.resize::<f64>([2, v.len()]).await?;
        }
        let k = to_stored_factor(units, &self.units_of(t).await?)?;
        let stored = v.mapv(|x| x * k);
        ds.write_array(row_of(t), 0, stored.view().insert_axis(Axis(0)))
            .await
    }

    pub async fn curve(&self, t: LogDataType, units: &str) -> Result<Array1<f64>> {
        let ds = self.dataset().await?;
        let n = ds.shape().await?[1];
        let v = ds.read_array::<f64>(Rect::new(row_of(t), 0, 1, n)).await?;
        let k = conversion_factor(&self.units_of(t).await?, units)?;
        Ok(v.row(0).mapv(|x| x * k))
    }

    pub async fn well(&self) -> Result<Option<Well>> {
        let found = match self.group.parent() {
            Some(p) => find_parent_of_type(&p, ObjectType::WELL).await?,
            None => None,
        };
        Ok(found.map(Well::from_group))
    }

    /// Path relative to the owning well's `LOG` group
    pub async fn relative_name(&self) -> Result<String> {
        match self.well().await? {
            Some(w) => Ok(relative_path(&w.log_group().await?.path(), &self.path())
                .unwrap_or_else(|| self.name())),
            None => Ok(self.name()),
        }
    }
}
