//! geostore - geoscience data engine
//!
//! Wells with deviation and log curves, maps, regular surfaces and seismic
//! trace stores, persisted in a hierarchical container of groups, chunked 2-D
//! datasets, attributes and soft links.
//!
//! # Features
//!
//! - Creation policies for materialising objects without clobbering data
//! - Minimum-curvature survey engine (MD/AZ/INCL to X/Y/TVD and back)
//! - Seismic trace and header block I/O with header-key sorting
//! - SEG-Y import into seismic trace stores
//! - Unit conversion on every read and write
//! - Multiple chunk compression algorithms (Deflate, Zstd, RLE)
//! - Local filesystem and in-memory backends, async I/O throughout
//!
//! # Example
//!
//! ```rust,ignore
//! use geostore::{CreationType, StoreConfig, WellContainer, WellParam};
//!
//! # async fn example() -> geostore::Result<()> {
//! let config = StoreConfig::builder().root("/data/wells").build();
//! let wells = WellContainer::open(&config).await?;
//!
//! let param = WellParam::new(444363.0, 7425880.0, 50.0, "1R-UWI").with_length_units("m");
//! let well = wells.create("1R", &param, CreationType::OPEN_OR_CREATE).await?;
//! # Ok(())
//! # }
//! ```

pub mod compression;
pub mod config;
pub mod container;
pub mod creation;
pub mod devcurve;
pub mod error;
pub mod headers;
pub mod io;
pub mod layout;
pub mod logcurve;
pub mod logging;
pub mod map;
pub mod metadata;
pub mod object;
pub mod params;
pub mod segy;
pub mod seis;
pub mod sort;
pub mod storage;
pub mod surf;
pub mod survey;
pub mod types;
pub mod units;
pub mod utils;
pub mod well;

// Re-exports
pub use compression::{CompressionLevel, CompressionMethod};
pub use config::{OpenMode, StoreConfig};
pub use container::{
    create_container, Container, MapContainer, SeisContainer, SurfContainer, WellContainer,
};
pub use creation::{create_object, Target};
pub use devcurve::DevCurve;
pub use error::{GeoError, Result};
pub use io::{create_io_manager, IOManager, StorageBackend};
pub use logcurve::LogCurve;
pub use logging::init_logging;
pub use map::Map;
pub use object::{find_parent_of_type, GeoObject, ObjectMetadata};
pub use params::{
    BaseObjectParam, DevCurveParam, LogCurveParam, MapParam, SeisParam, SurfParam, WellParam,
};
pub use segy::SegyReader;
pub use seis::{Seis, SortedData};
pub use storage::{Dataset, Group, StorageFile};
pub use surf::Surf;
pub use types::{
    ContainerType, CreationType, DevDataType, Domain, LogDataType, ObjectType, SeisDataType,
    SurveyType, TrajectoryFormat,
};
pub use units::{AngleUnit, Unit};
pub use well::Well;

/// Version of the geostore crate
pub const GEOSTORE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!GEOSTORE_VERSION.is_empty());
    }
}
