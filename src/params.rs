//! Parameter records consumed when a geo-object is created
//!
//! Every record can be filled field by field (all fields are public and
//! `Default` is provided) or built positionally with `new`: geometry first,
//! then domain, then unit tags, then the data-units string. Both forms give
//! equal records.

use crate::types::{Domain, SeisDataType, SurveyType};
use serde::{Deserialize, Serialize};

/// Unit tags shared by all objects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseObjectParam {
    /// Usually `authName:code`
    pub spatial_reference: String,
    pub length_units: String,
    pub temporal_units: String,
    pub angular_units: String,
    pub data_units: String,
}

macro_rules! unit_setters {
    ($t:ty) => {
        impl $t {
            pub fn with_spatial_reference(mut self, v: impl Into<String>) -> Self {
                self.base.spatial_reference = v.into();
                self
            }

            pub fn with_length_units(mut self, v: impl Into<String>) -> Self {
                self.base.length_units = v.into();
                self
            }

            pub fn with_temporal_units(mut self, v: impl Into<String>) -> Self {
                self.base.temporal_units = v.into();
                self
            }

            pub fn with_angular_units(mut self, v: impl Into<String>) -> Self {
                self.base.angular_units = v.into();
                self
            }

            pub fn with_data_units(mut self, v: impl Into<String>) -> Self {
                self.base.data_units = v.into();
                self
            }
        }
    };
}

/// Well head and identity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WellParam {
    pub head_x: f64,
    pub head_y: f64,
    /// Kelly bushing elevation
    pub kb: f64,
    /// Unique well identifier
    pub uwi: String,
    pub base: BaseObjectParam,
}

impl WellParam {
    pub fn new(head_x: f64, head_y: f64, kb: f64, uwi: impl Into<String>) -> Self {
        Self {
            head_x,
            head_y,
            kb,
            uwi: uwi.into(),
            base: BaseObjectParam::default(),
        }
    }
}

/// Deviation curve settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevCurveParam {
    /// Stations per stored chunk
    pub chunk_size: usize,
    /// Mark the new curve active on its well
    pub set_active: bool,
    pub base: BaseObjectParam,
}

impl Default for DevCurveParam {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            set_active: false,
            base: BaseObjectParam::default(),
        }
    }
}

impl DevCurveParam {
    pub fn new(
        length_units: impl Into<String>,
        temporal_units: impl Into<String>,
        angular_units: impl Into<String>,
    ) -> Self {
        Self::default()
            .with_length_units(length_units)
            .with_temporal_units(temporal_units)
            .with_angular_units(angular_units)
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.set_active = active;
        self
    }
}

/// Log curve settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogCurveParam {
    pub chunk_size: usize,
    pub base: BaseObjectParam,
}

impl Default for LogCurveParam {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            base: BaseObjectParam::default(),
        }
    }
}

impl LogCurveParam {
    pub fn new(length_units: impl Into<String>, data_units: impl Into<String>) -> Self {
        Self::default()
            .with_length_units(length_units)
            .with_data_units(data_units)
    }
}

/// Regular grid given by three corner points
///
/// `(x0, y0)` is the origin, `(x1, y1)` the end of the first row and
/// `(x2, y2)` the end of the first column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapParam {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub nx: usize,
    pub ny: usize,
    pub domain: Domain,
    pub x_chunk_size: usize,
    pub y_chunk_size: usize,
    pub base: BaseObjectParam,
}

impl Default for MapParam {
    fn default() -> Self {
        Self {
            x0: 0.0,
            y0: 0.0,
            x1: 0.0,
            y1: 0.0,
            x2: 0.0,
            y2: 0.0,
            nx: 0,
            ny: 0,
            domain: Domain::TVD,
            x_chunk_size: 10,
            y_chunk_size: 10,
            base: BaseObjectParam::default(),
        }
    }
}

impl MapParam {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        origin: (f64, f64),
        point1: (f64, f64),
        point2: (f64, f64),
        nx: usize,
        ny: usize,
        domain: Domain,
        length_units: impl Into<String>,
        data_units: impl Into<String>,
    ) -> Self {
        Self {
            x0: origin.0,
            y0: origin.1,
            x1: point1.0,
            y1: point1.1,
            x2: point2.0,
            y2: point2.1,
            nx,
            ny,
            domain,
            ..Self::default()
        }
        .with_length_units(length_units)
        .with_data_units(data_units)
    }
}

/// Regular grid given by origin and spacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfParam {
    pub x0: f64,
    pub y0: f64,
    pub dx: f64,
    pub dy: f64,
    pub nx: usize,
    pub ny: usize,
    /// Grid rotation in degrees, counter-clockwise from X
    pub orientation: f64,
    pub domain: Domain,
    pub base: BaseObjectParam,
}

impl Default for SurfParam {
    fn default() -> Self {
        Self {
            x0: 0.0,
            y0: 0.0,
            dx: 1.0,
            dy: 1.0,
            nx: 0,
            ny: 0,
            orientation: 0.0,
            domain: Domain::TVD,
            base: BaseObjectParam::default(),
        }
    }
}

impl SurfParam {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        x0: f64,
        y0: f64,
        dx: f64,
        dy: f64,
        nx: usize,
        ny: usize,
        domain: Domain,
        spatial_units: impl Into<String>,
        data_units: impl Into<String>,
    ) -> Self {
        Self {
            x0,
            y0,
            dx,
            dy,
            nx,
            ny,
            domain,
            ..Self::default()
        }
        .with_length_units(spatial_units)
        .with_data_units(data_units)
    }

    pub fn with_orientation(mut self, degrees: f64) -> Self {
        self.orientation = degrees;
        self
    }
}

/// Seismic volume extents and classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeisParam {
    pub domain: Domain,
    pub data_type: SeisDataType,
    pub survey_type: SurveyType,
    pub n_trc: usize,
    pub n_samp: usize,
    /// Seismic reference datum
    pub srd: f64,
    /// Traces per stored chunk
    pub trc_chunk: usize,
    /// Chunk rows for the auxiliary datasets
    pub std_chunk: usize,
    pub base: BaseObjectParam,
}

impl Default for SeisParam {
    fn default() -> Self {
        Self {
            domain: Domain::TWT,
            data_type: SeisDataType::STACK,
            survey_type: SurveyType::THREE_D,
            n_trc: 0,
            n_samp: 0,
            srd: 0.0,
            trc_chunk: 20000,
            std_chunk: 1000,
            base: BaseObjectParam::default(),
        }
    }
}

impl SeisParam {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        n_trc: usize,
        n_samp: usize,
        srd: f64,
        domain: Domain,
        data_type: SeisDataType,
        survey_type: SurveyType,
        length_units: impl Into<String>,
        temporal_units: impl Into<String>,
        data_units: impl Into<String>,
    ) -> Self {
        Self {
            domain,
            data_type,
            survey_type,
            n_trc,
            n_samp,
            srd,
            ..Self::default()
        }
        .with_length_units(length_units)
        .with_temporal_units(temporal_units)
        .with_data_units(data_units)
    }

    pub fn with_chunks(mut self, trc_chunk: usize, std_chunk: usize) -> Self {
        self.trc_chunk = trc_chunk;
        self.std_chunk = std_chunk;
        self
    }
}

unit_setters!(WellParam);
unit_setters!(DevCurveParam);
unit_setters!(LogCurveParam);
unit_setters!(MapParam);
unit_setters!(SurfParam);
unit_setters!(SeisParam);
