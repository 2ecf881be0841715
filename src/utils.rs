//! Utility functions

use crate::error::{GeoError, Result};
use crate::types::DataType;

/// Scalar types a dataset can be read into or written from
pub trait Element: Copy + Default + PartialEq + Send + Sync + std::fmt::Debug + 'static {
    const DATA_TYPE: DataType;

    fn write_le(&self, out: &mut Vec<u8>);

    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_element {
    ($t:ty, $dt:expr) => {
        impl Element for $t {
            const DATA_TYPE: DataType = $dt;

            fn write_le(&self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            fn read_le(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$t>()];
                buf.copy_from_slice(&bytes[..std::mem::size_of::<$t>()]);
                <$t>::from_le_bytes(buf)
            }
        }
    };
}

impl_element!(u8, DataType::U8);
impl_element!(i32, DataType::I32);
impl_element!(i64, DataType::I64);
impl_element!(f32, DataType::F32);
impl_element!(f64, DataType::F64);

/// Convert little-endian bytes to typed data
pub fn bytes_to_typed_data<T: Element>(bytes: &[u8]) -> Result<Vec<T>> {
    let size = T::DATA_TYPE.size_in_bytes();
    if bytes.len() % size != 0 {
        return Err(GeoError::InvalidFormat(
            "Byte length not aligned with data type size".to_string(),
        ));
    }
    Ok(bytes.chunks_exact(size).map(T::read_le).collect())
}

/// Convert typed data to little-endian bytes
pub fn typed_data_to_bytes<T: Element>(data: &[T]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(data.len() * T::DATA_TYPE.size_in_bytes());
    for v in data {
        v.write_le(&mut bytes);
    }
    bytes
}

/// Format byte size in human-readable form
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;
    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Relative path of a dataset chunk file
pub fn chunk_path(dataset_dir: &str, index: usize) -> String {
    join_path(dataset_dir, &format!("chunks/{:08}.chunk", index))
}

/// Split a storage path into its non-empty components
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Components of a group path; `.` and `..` are refused so a path can only
/// walk down the tree
pub fn checked_components(path: &str) -> Result<Vec<&str>> {
    let parts = split_path(path);
    if let Some(bad) = parts.iter().find(|c| matches!(**c, "." | "..")) {
        return Err(GeoError::InvalidName(format!("'{}' in path {}", bad, path)));
    }
    Ok(parts)
}

/// A single child name: one component, neither `.` nor `..`
pub fn checked_name(name: &str) -> Result<&str> {
    match checked_components(name)?.as_slice() {
        [single] => Ok(single),
        _ => Err(GeoError::InvalidName(format!("{:?} is not a single child name", name))),
    }
}

/// Normalise to the absolute form `/a/b/c` (root is `/`)
pub fn absolute_path(path: &str) -> String {
    format!("/{}", split_path(path).join("/"))
}

/// Join a group path and a relative path, `..` and `.` are not interpreted
pub fn join_path(base: &str, rel: &str) -> String {
    let mut parts = split_path(base);
    parts.extend(split_path(rel));
    parts.join("/")
}

/// Split `a/b/c` into (`a/b`, `c`)
pub fn split_parent(path: &str) -> (String, String) {
    let mut parts = split_path(path);
    let name = parts.pop().unwrap_or_default().to_string();
    (parts.join("/"), name)
}

/// True if `child` lies strictly below `parent` in the group tree
pub fn is_successor(parent: &str, child: &str) -> bool {
    let p = split_path(parent);
    let c = split_path(child);
    c.len() > p.len() && c[..p.len()] == p[..]
}

/// `child` expressed relative to `parent`, `None` unless it lies strictly below
pub fn relative_path(parent: &str, child: &str) -> Option<String> {
    if !is_successor(parent, child) {
        return None;
    }
    let skip = split_path(parent).len();
    Some(split_path(child)[skip..].join("/"))
}

/// Name not present in `names`: `base`, else `base_1`, `base_2`, ...
pub fn generate_name(names: &[String], base: &str) -> String {
    let base = if base.is_empty() { "no_name" } else { base };
    if !names.iter().any(|n| n == base) {
        return base.to_string();
    }
    (1..)
        .map(|i| format!("{}_{}", base, i))
        .find(|candidate| !names.iter().any(|n| n == candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_conversion() {
        let data: Vec<f32> = vec![1.0, -2.5, 3.0, 4.0];
        let bytes = typed_data_to_bytes(&data);
        assert_eq!(bytes.len(), data.len() * 4);
        let recovered: Vec<f32> = bytes_to_typed_data(&bytes).unwrap();
        assert_eq!(data, recovered);

        assert!(bytes_to_typed_data::<f64>(&bytes[..6]).is_err());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1073741824), "1.00 GB");
    }

    #[test]
    fn test_chunk_path() {
        assert_eq!(chunk_path("seis/trace", 0), "seis/trace/chunks/00000000.chunk");
        assert_eq!(chunk_path("/a/", 42), "a/chunks/00000042.chunk");
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(absolute_path("a//b/"), "/a/b");
        assert_eq!(absolute_path(""), "/");
        assert_eq!(join_path("/w1/DEV", "dev1"), "w1/DEV/dev1");
        assert_eq!(split_parent("/w1/DEV/dev1"), ("w1/DEV".to_string(), "dev1".to_string()));
        assert!(is_successor("/1R/DEV", "/1R/DEV/my_dev"));
        assert!(!is_successor("/2R/DEV", "/1R/DEV/my_dev"));
        assert!(!is_successor("/1R/DEV", "/1R/DEV"));
        assert!(!is_successor("/1R/DE", "/1R/DEV/x"));
        assert_eq!(relative_path("/1R/LOG", "/1R/LOG/gamma/gr").as_deref(), Some("gamma/gr"));
        assert_eq!(relative_path("/1R/LOG", "/2R/LOG/gr"), None);
    }

    #[test]
    fn test_dot_components_refused() {
        assert_eq!(checked_components("/1R/DEV/dev1").unwrap(), vec!["1R", "DEV", "dev1"]);
        assert!(matches!(checked_components("../../B/DEV"), Err(GeoError::InvalidName(_))));
        assert!(matches!(checked_components("A/./DEV"), Err(GeoError::InvalidName(_))));
        // dots inside a name are fine
        assert!(checked_components("v1..2/.hidden").is_ok());

        assert_eq!(checked_name("ACTIVE").unwrap(), "ACTIVE");
        assert!(checked_name("..").is_err());
        assert!(checked_name("a/b").is_err());
        assert!(checked_name("").is_err());
    }

    #[test]
    fn test_generate_name() {
        let names: Vec<String> = vec!["map".into(), "map_1".into(), "other".into()];
        assert_eq!(generate_name(&names, "map"), "map_2");
        assert_eq!(generate_name(&names, "fresh"), "fresh");
        assert_eq!(generate_name(&names, ""), "no_name");
        let names: Vec<String> = vec!["no_name".into()];
        assert_eq!(generate_name(&names, ""), "no_name_1");
    }
}
