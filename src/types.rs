//! Core enumerations shared by containers and geo-objects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GeoError;

/// Element types a dataset can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum DataType {
    /// Unsigned 8-bit integer
    U8 = 1,
    /// Signed 32-bit integer
    I32 = 7,
    /// Signed 64-bit integer
    I64 = 8,
    /// 32-bit floating point
    F32 = 9,
    /// 64-bit floating point
    F64 = 10,
}

impl DataType {
    /// Size in bytes of this data type
    pub fn size_in_bytes(&self) -> usize {
        match self {
            DataType::U8 => 1,
            DataType::I32 | DataType::F32 => 4,
            DataType::I64 | DataType::F64 => 8,
        }
    }

    /// Check if this is a floating point type
    pub fn is_float(&self) -> bool {
        matches!(self, DataType::F32 | DataType::F64)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// How a named object is obtained from a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum CreationType {
    /// Open an existing object of the same type
    OPEN,
    /// Create a new object, fail if a geo-object already lives there
    CREATE,
    /// Open if compatible, otherwise create
    OPEN_OR_CREATE,
    /// Drop whatever is at the location and create fresh
    CREATE_OR_OVERWRITE,
    /// Create next to the existing one under a generated name
    CREATE_UNDER_NEW_NAME,
}

/// Kind of geo-object stamped on its group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
#[repr(u32)]
pub enum ObjectType {
    MAP = 1,
    WELL = 2,
    LOGCURVE = 3,
    DEVCURVE = 4,
    SEISMIC = 5,
    SURFACE = 6,
}

impl ObjectType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(ObjectType::MAP),
            2 => Some(ObjectType::WELL),
            3 => Some(ObjectType::LOGCURVE),
            4 => Some(ObjectType::DEVCURVE),
            5 => Some(ObjectType::SEISMIC),
            6 => Some(ObjectType::SURFACE),
            _ => None,
        }
    }

    /// Name used when an object is created without one
    pub fn name(&self) -> &'static str {
        match self {
            ObjectType::MAP => "MAP",
            ObjectType::WELL => "WELL",
            ObjectType::LOGCURVE => "LOGCURVE",
            ObjectType::DEVCURVE => "DEVCURVE",
            ObjectType::SEISMIC => "SEISMIC",
            ObjectType::SURFACE => "SURFACE",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of container stamped on the storage root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
#[repr(u32)]
pub enum ContainerType {
    MAP = 1,
    WELL = 2,
    SEISMIC = 3,
    SURFACE = 4,
}

impl ContainerType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(ContainerType::MAP),
            2 => Some(ContainerType::WELL),
            3 => Some(ContainerType::SEISMIC),
            4 => Some(ContainerType::SURFACE),
            _ => None,
        }
    }
}

/// Vertical domain of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
#[repr(u32)]
pub enum Domain {
    MD = 1,
    TVD = 2,
    TVDSS = 4,
    TVDSD = 8,
    TWT = 16,
    OWT = 32,
}

impl Domain {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Domain::MD),
            2 => Some(Domain::TVD),
            4 => Some(Domain::TVDSS),
            8 => Some(Domain::TVDSD),
            16 => Some(Domain::TWT),
            32 => Some(Domain::OWT),
            _ => None,
        }
    }

    /// Time domains carry temporal sample units
    pub fn is_time(&self) -> bool {
        matches!(self, Domain::TWT | Domain::OWT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
#[repr(u32)]
pub enum SeisDataType {
    STACK = 1,
    PRESTACK = 2,
}

impl SeisDataType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(SeisDataType::STACK),
            2 => Some(SeisDataType::PRESTACK),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
#[repr(u32)]
pub enum SurveyType {
    TWO_D = 1,
    THREE_D = 2,
}

impl SurveyType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(SurveyType::TWO_D),
            2 => Some(SurveyType::THREE_D),
            _ => None,
        }
    }
}

/// Named rows of a deviation curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum DevDataType {
    MD,
    AZIM,
    INCL,
    TVD,
    DX,
    DY,
    OWT,
    /// Absolute X, derived from DX and the well head
    X,
    /// Absolute Y, derived from DY and the well head
    Y,
}

impl DevDataType {
    /// Rows physically stored in `dev_data`, in storage order
    pub const STORED: [DevDataType; 7] = [
        DevDataType::MD,
        DevDataType::AZIM,
        DevDataType::INCL,
        DevDataType::TVD,
        DevDataType::DX,
        DevDataType::DY,
        DevDataType::OWT,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DevDataType::MD => "MD",
            DevDataType::AZIM => "AZIM",
            DevDataType::INCL => "INCL",
            DevDataType::TVD => "TVD",
            DevDataType::DX => "DX",
            DevDataType::DY => "DY",
            DevDataType::OWT => "OWT",
            DevDataType::X => "X",
            DevDataType::Y => "Y",
        }
    }
}

impl FromStr for DevDataType {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MD" => Ok(DevDataType::MD),
            "AZIM" | "AZ" => Ok(DevDataType::AZIM),
            "INCL" => Ok(DevDataType::INCL),
            "TVD" => Ok(DevDataType::TVD),
            "DX" => Ok(DevDataType::DX),
            "DY" => Ok(DevDataType::DY),
            "OWT" => Ok(DevDataType::OWT),
            "X" => Ok(DevDataType::X),
            "Y" => Ok(DevDataType::Y),
            other => Err(GeoError::NotFound(format!("deviation curve type {}", other))),
        }
    }
}

/// Named rows of a log curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum LogDataType {
    MD,
    VAL,
}

impl LogDataType {
    pub fn name(&self) -> &'static str {
        match self {
            LogDataType::MD => "MD",
            LogDataType::VAL => "VAL",
        }
    }
}

/// Column layouts accepted by the survey engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum TrajectoryFormat {
    MD_AZIM_INCL,
    TVD_X_Y,
    TVD_DX_DY,
    TVDSS_X_Y,
    TVDSS_DX_DY,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_codes_round_trip() {
        for t in [
            ObjectType::MAP,
            ObjectType::WELL,
            ObjectType::LOGCURVE,
            ObjectType::DEVCURVE,
            ObjectType::SEISMIC,
            ObjectType::SURFACE,
        ] {
            assert_eq!(ObjectType::from_u32(t as u32), Some(t));
        }
        assert_eq!(Domain::from_u32(32), Some(Domain::OWT));
        assert_eq!(Domain::from_u32(3), None);
        assert_eq!(SeisDataType::from_u32(2), Some(SeisDataType::PRESTACK));
        assert_eq!(SurveyType::from_u32(1), Some(SurveyType::TWO_D));
        assert_eq!(ContainerType::from_u32(2), Some(ContainerType::WELL));
    }

    #[test]
    fn test_dev_data_type_parse() {
        assert_eq!("azim".parse::<DevDataType>().unwrap(), DevDataType::AZIM);
        assert_eq!("TVD".parse::<DevDataType>().unwrap(), DevDataType::TVD);
        assert!("GR".parse::<DevDataType>().is_err());
    }

    #[test]
    fn test_data_type_size() {
        assert_eq!(DataType::F32.size_in_bytes(), 4);
        assert_eq!(DataType::F64.size_in_bytes(), 8);
        assert_eq!(DataType::U8.size_in_bytes(), 1);
        assert!(DataType::F64.is_float());
        assert!(!DataType::I32.is_float());
    }
}
