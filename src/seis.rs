//! Seismic trace store
//!
//! ```text
//! /<seis>          ObjectType=SEISMIC, Domain, SeisDataType, SurveyType, SRD
//!   trace          nSamp x nTrc   f32
//!   trace_header   nTrc  x 78     f64, columns named by TRACE_HEADER_NAMES
//!   text_header    40    x 80     u8
//!   bin_header     30    x 1      f64, rows named by BIN_HEADER_NAMES
//! ```
//!
//! Trace and sample counts are fixed at creation. Every block read or write
//! is checked against those extents and fails with `GeoError::Range`.

use crate::error::{GeoError, Result};
use crate::headers::{
    bin_header_index, trace_header_index, BIN_HEADER_NAMES, FIRST_SAMPLE, SAMPLE_RATE,
    TEXT_HEADER_LINES, TEXT_HEADER_LINE_LEN, TRACE_HEADER_NAMES,
};
use crate::layout::Rect;
use crate::object::{
    attr_f64, attr_text, attr_u32, base_attrs, read_base, GeoObject, DATA_UNITS_ATTR,
    LENGTH_UNITS_ATTR, TEMPORAL_UNITS_ATTR,
};
use crate::params::SeisParam;
use crate::segy::SegyReader;
use crate::sort::{sort_rows, KeyIndex};
use crate::storage::{Dataset, Group};
use crate::types::{ContainerType, Domain, ObjectType, SeisDataType, SurveyType};
use crate::units::{conversion_factor, to_stored_factor};
use async_trait::async_trait;
use futures::future::try_join_all;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

const TRACE: &str = "trace";
const TRACE_HEADER: &str = "trace_header";
const TEXT_HEADER: &str = "text_header";
const BIN_HEADER: &str = "bin_header";

const DOMAIN_ATTR: &str = "Domain";
const DATA_TYPE_ATTR: &str = "SeisDataType";
const SURVEY_TYPE_ATTR: &str = "SurveyType";
const SRD_ATTR: &str = "SRD";
const CHUNKS_ATTR: &str = "chunk_size";
const SORT_KEYS_ATTR: &str = "pkey_sort";

/// Result of [`Seis::sorted_data`]
#[derive(Debug, Clone, PartialEq)]
pub struct SortedData {
    /// Selected samples of the sorted traces, one column per trace
    pub traces: Array2<f32>,
    /// Requested key values of the sorted traces, one row per trace
    pub headers: Array2<f64>,
    /// Original trace index of each sorted row
    pub indexes: Vec<usize>,
}

impl SortedData {
    fn empty(n_keys: usize) -> Self {
        Self {
            traces: Array2::zeros((0, 0)),
            headers: Array2::zeros((0, n_keys)),
            indexes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Seis {
    group: Group,
}

#[async_trait]
impl GeoObject for Seis {
    const OBJECT_TYPE: ObjectType = ObjectType::SEISMIC;
    const CONTAINER_TYPE: ContainerType = ContainerType::SEISMIC;
    type Param = SeisParam;

    fn from_group(group: Group) -> Self {
        Self { group }
    }

    fn group(&self) -> &Group {
        &self.group
    }

    async fn initialize(group: &Group, param: &SeisParam) -> Result<()> {
        let mut attrs = base_attrs(&param.base);
        attrs.push((DOMAIN_ATTR, (param.domain as u32).into()));
        attrs.push((DATA_TYPE_ATTR, (param.data_type as u32).into()));
        attrs.push((SURVEY_TYPE_ATTR, (param.survey_type as u32).into()));
        attrs.push((SRD_ATTR, param.srd.into()));
        attrs.push((
            CHUNKS_ATTR,
            vec![param.trc_chunk as f64, param.std_chunk as f64].into(),
        ));
        attrs.push((SORT_KEYS_ATTR, Vec::<String>::new().into()));
        group.set_attrs(attrs).await?;

        let codec = group.file().defaults().codec;
        group
            .create_dataset_with::<f32>(
                TRACE,
                [param.n_samp, param.n_trc],
                [param.std_chunk, param.trc_chunk],
                codec,
            )
            .await?;
        group
            .create_dataset_with::<f64>(
                TRACE_HEADER,
                [param.n_trc, TRACE_HEADER_NAMES.len()],
                [param.trc_chunk, 0],
                codec,
            )
            .await?;
        group
            .create_dataset_with::<u8>(
                TEXT_HEADER,
                [TEXT_HEADER_LINES, TEXT_HEADER_LINE_LEN],
                [TEXT_HEADER_LINES, 0],
                codec,
            )
            .await?;
        group
            .create_dataset_with::<f64>(BIN_HEADER, [BIN_HEADER_NAMES.len(), 1], [BIN_HEADER_NAMES.len(), 0], codec)
            .await?;

        let blank = vec![b' '; TEXT_HEADER_LINES * TEXT_HEADER_LINE_LEN];
        group
            .get_dataset(TEXT_HEADER)
            .await?
            .write_raw(Rect::new(0, 0, TEXT_HEADER_LINES, TEXT_HEADER_LINE_LEN), &blank)
            .await?;
        Ok(())
    }

    async fn param(&self) -> Result<SeisParam> {
        let chunks = crate::object::attr_floats(&self.group, CHUNKS_ATTR, 2).await?;
        Ok(SeisParam {
            domain: self.domain().await?,
            data_type: self.data_type().await?,
            survey_type: self.survey_type().await?,
            n_trc: self.n_trc().await?,
            n_samp: self.n_samp().await?,
            srd: self.srd("").await?,
            trc_chunk: chunks[0] as usize,
            std_chunk: chunks[1] as usize,
            base: read_base(&self.group).await?,
        })
    }
}

fn header_column(name: &str) -> Result<usize> {
    trace_header_index(name)
        .ok_or_else(|| GeoError::NotFound(format!("trace header {}", name)))
}

impl Seis {
    async fn dataset(&self, name: &str) -> Result<Dataset> {
        self.group.get_dataset(name).await
    }

    // -------------------------------------------------------------------------
    // Classification and units
    // -------------------------------------------------------------------------

    pub async fn domain(&self) -> Result<Domain> {
        let v = attr_u32(&self.group, DOMAIN_ATTR).await?;
        Domain::from_u32(v).ok_or_else(|| GeoError::InvalidFormat(format!("domain {}", v)))
    }

    pub async fn set_domain(&self, domain: Domain) -> Result<()> {
        self.group.set_attr(DOMAIN_ATTR, domain as u32).await
    }

    pub async fn data_type(&self) -> Result<SeisDataType> {
        let v = attr_u32(&self.group, DATA_TYPE_ATTR).await?;
        SeisDataType::from_u32(v)
            .ok_or_else(|| GeoError::InvalidFormat(format!("seismic data type {}", v)))
    }

    pub async fn set_data_type(&self, data_type: SeisDataType) -> Result<()> {
        self.group.set_attr(DATA_TYPE_ATTR, data_type as u32).await
    }

    pub async fn survey_type(&self) -> Result<SurveyType> {
        let v = attr_u32(&self.group, SURVEY_TYPE_ATTR).await?;
        SurveyType::from_u32(v)
            .ok_or_else(|| GeoError::InvalidFormat(format!("survey type {}", v)))
    }

    pub async fn set_survey_type(&self, survey_type: SurveyType) -> Result<()> {
        self.group.set_attr(SURVEY_TYPE_ATTR, survey_type as u32).await
    }

    pub async fn length_units(&self) -> Result<String> {
        attr_text(&self.group, LENGTH_UNITS_ATTR).await
    }

    pub async fn temporal_units(&self) -> Result<String> {
        attr_text(&self.group, TEMPORAL_UNITS_ATTR).await
    }

    pub async fn data_units(&self) -> Result<String> {
        attr_text(&self.group, DATA_UNITS_ATTR).await
    }

    /// Seismic reference datum in `length_units`
    pub async fn srd(&self, length_units: &str) -> Result<f64> {
        let srd = attr_f64(&self.group, SRD_ATTR).await?;
        Ok(srd * conversion_factor(&self.length_units().await?, length_units)?)
    }

    pub async fn set_srd(&self, srd: f64, length_units: &str) -> Result<()> {
        let k = to_stored_factor(length_units, &self.length_units().await?)?;
        self.group.set_attr(SRD_ATTR, srd * k).await
    }

    /// Unit of the vertical axis: temporal in time domains, length otherwise
    async fn vertical_units(&self) -> Result<String> {
        if self.domain().await?.is_time() {
            self.temporal_units().await
        } else {
            self.length_units().await
        }
    }

    // -------------------------------------------------------------------------
    // Traces
    // -------------------------------------------------------------------------

    pub async fn n_trc(&self) -> Result<usize> {
        Ok(self.dataset(TRACE).await?.shape().await?[1])
    }

    pub async fn n_samp(&self) -> Result<usize> {
        Ok(self.dataset(TRACE).await?.shape().await?[0])
    }

    /// Write an `nSamp x nTrc` block with its corner at (`from_samp`, `from_trc`)
    pub async fn write_trace(
        &self,
        m: ArrayView2<'_, f32>,
        from_trc: usize,
        from_samp: usize,
        data_units: &str,
    ) -> Result<()> {
        let k = to_stored_factor(data_units, &self.data_units().await?)? as f32;
        let ds = self.dataset(TRACE).await?;
        if k == 1.0 {
            return ds.write_array(from_samp, from_trc, m).await;
        }
        ds.write_array(from_samp, from_trc, m.mapv(|v| v * k).view())
            .await
    }

    /// Write samples of a single trace starting at `from_samp`
    pub async fn write_trace_column(
        &self,
        v: ArrayView1<'_, f32>,
        trc: usize,
        from_samp: usize,
        data_units: &str,
    ) -> Result<()> {
        self.write_trace(v.insert_axis(Axis(1)), trc, from_samp, data_units)
            .await
    }

    pub async fn trace(
        &self,
        from_trc: usize,
        n_trc: usize,
        from_samp: usize,
        n_samp: usize,
        data_units: &str,
    ) -> Result<Array2<f32>> {
        let k = conversion_factor(&self.data_units().await?, data_units)? as f32;
        let m = self
            .dataset(TRACE)
            .await?
            .read_array::<f32>(Rect::new(from_samp, from_trc, n_samp, n_trc))
            .await?;
        Ok(if k == 1.0 { m } else { m.mapv(|v| v * k) })
    }

    /// All samples of trace `trc`
    pub async fn trace_column(&self, trc: usize, data_units: &str) -> Result<Array1<f32>> {
        let n_samp = self.n_samp().await?;
        let m = self.trace(trc, 1, 0, n_samp, data_units).await?;
        Ok(m.column(0).to_owned())
    }

    /// Samples `from_samp..from_samp + n_samp` of the traces in `indexes`, in that order
    pub async fn traces_at(
        &self,
        indexes: &[usize],
        from_samp: usize,
        n_samp: usize,
        data_units: &str,
    ) -> Result<Array2<f32>> {
        let n_trc = self.n_trc().await?;
        if let Some(&bad) = indexes.iter().find(|&&i| i >= n_trc) {
            return Err(GeoError::Range(format!("trace {} of {}", bad, n_trc)));
        }

        // read each run of adjacent traces once
        let runs = trace_runs(indexes);
        let k = conversion_factor(&self.data_units().await?, data_units)? as f32;
        let ds = self.dataset(TRACE).await?;
        let blocks = try_join_all(
            runs.iter()
                .map(|&(start, len)| ds.read_array::<f32>(Rect::new(from_samp, start, n_samp, len))),
        )
        .await?;

        let mut out = Array2::<f32>::zeros((n_samp, indexes.len()));
        for (j, &trc) in indexes.iter().enumerate() {
            let r = runs.partition_point(|&(start, _)| start <= trc) - 1;
            out.column_mut(j).assign(&blocks[r].column(trc - runs[r].0));
        }
        if k != 1.0 {
            out.mapv_inplace(|v| v * k);
        }
        Ok(out)
    }

    /// Fill the text, binary and trace headers and the traces from a SEG-Y
    /// file, in batches of `trc_chunk` traces. The file must hold this
    /// object's sample count and at most its trace count; returns the number
    /// of traces read.
    pub async fn read_segy(&self, path: impl AsRef<Path>) -> Result<usize> {
        let segy = SegyReader::open(path).await?;
        let (n_trc, n_samp) = (self.n_trc().await?, self.n_samp().await?);
        if segy.n_samp() != n_samp || segy.n_trc() > n_trc {
            return Err(GeoError::Range(format!(
                "SEG-Y holds {} traces x {} samples, {} has room for {} x {}",
                segy.n_trc(),
                segy.n_samp(),
                self.path(),
                n_trc,
                n_samp
            )));
        }

        let text = segy.text_header().await?;
        self.write_text_header(&text[..]).await?;
        self.write_bin_header(segy.bin_header().await?.view()).await?;
        if self.domain().await?.is_time() {
            // SEG-Y sample interval is in microseconds
            let micros = self.bin_header_value(SAMPLE_RATE).await?;
            self.set_sample_rate(micros, "us").await?;
        }

        let batch = self.param().await?.trc_chunk.max(1);
        for from in (0..segy.n_trc()).step_by(batch) {
            let n = batch.min(segy.n_trc() - from);
            let (headers, traces) = segy.read_traces(from, n).await?;
            self.write_trace_header(headers.view(), from, 0).await?;
            self.write_trace(traces.view(), from, 0, "").await?;
        }
        tracing::info!(
            "read {} traces x {} samples ({:?}) into {}",
            segy.n_trc(),
            n_samp,
            segy.format(),
            self.path()
        );
        Ok(segy.n_trc())
    }

    // -------------------------------------------------------------------------
    // Trace headers
    // -------------------------------------------------------------------------

    /// Write an `nTrc x nHdr` block; any cached sort index goes stale
    pub async fn write_trace_header(
        &self,
        m: ArrayView2<'_, f64>,
        from_trc: usize,
        from_hdr: usize,
    ) -> Result<()> {
        let written = self
            .dataset(TRACE_HEADER)
            .await?
            .write_array(from_trc, from_hdr, m)
            .await;
        self.group.file().sort_cache().invalidate(&self.path());
        written
    }

    /// Write one named header for traces starting at `from_trc`
    pub async fn write_trace_header_by_name(
        &self,
        name: &str,
        v: ArrayView1<'_, f64>,
        from_trc: usize,
    ) -> Result<()> {
        let col = header_column(name)?;
        self.write_trace_header(v.insert_axis(Axis(1)), from_trc, col)
            .await
    }

    pub async fn trace_header(
        &self,
        from_trc: usize,
        n_trc: usize,
        from_hdr: usize,
        n_hdr: usize,
    ) -> Result<Array2<f64>> {
        self.dataset(TRACE_HEADER)
            .await?
            .read_array::<f64>(Rect::new(from_trc, from_hdr, n_trc, n_hdr))
            .await
    }

    pub async fn trace_header_by_name(
        &self,
        name: &str,
        from_trc: usize,
        n_trc: usize,
    ) -> Result<Array1<f64>> {
        let col = header_column(name)?;
        let m = self.trace_header(from_trc, n_trc, col, 1).await?;
        Ok(m.column(0).to_owned())
    }

    /// Header column `name` for every trace
    async fn header_values(&self, name: &str) -> Result<Array1<f64>> {
        let n_trc = self.n_trc().await?;
        self.trace_header_by_name(name, 0, n_trc).await
    }

    /// Smallest and largest value of header `name`, NaN when there are no traces
    pub async fn trace_header_limits(&self, name: &str) -> Result<(f64, f64)> {
        let v = self.header_values(name).await?;
        Ok(v.iter()
            .filter(|x| !x.is_nan())
            .fold((f64::NAN, f64::NAN), |(lo, hi), &x| (lo.min(x), hi.max(x))))
    }

    // -------------------------------------------------------------------------
    // Text and binary headers
    // -------------------------------------------------------------------------

    /// Store up to 40 lines of up to 80 bytes each, padding with spaces
    pub async fn write_text_header<S: AsRef<str>>(&self, lines: &[S]) -> Result<()> {
        let mut buf = vec![b' '; TEXT_HEADER_LINES * TEXT_HEADER_LINE_LEN];
        for (i, line) in lines.iter().take(TEXT_HEADER_LINES).enumerate() {
            let bytes = line.as_ref().as_bytes();
            let n = bytes.len().min(TEXT_HEADER_LINE_LEN);
            let start = i * TEXT_HEADER_LINE_LEN;
            buf[start..start + n].copy_from_slice(&bytes[..n]);
        }
        if lines.len() > TEXT_HEADER_LINES {
            tracing::warn!(
                "text header of {} truncated to {} lines",
                self.path(),
                TEXT_HEADER_LINES
            );
        }
        self.dataset(TEXT_HEADER)
            .await?
            .write_raw(Rect::new(0, 0, TEXT_HEADER_LINES, TEXT_HEADER_LINE_LEN), &buf)
            .await
    }

    /// The 40 text header lines with trailing blanks removed
    pub async fn text_header(&self) -> Result<Vec<String>> {
        let raw = self.dataset(TEXT_HEADER).await?.read_all::<u8>().await?;
        Ok(raw
            .chunks(TEXT_HEADER_LINE_LEN)
            .map(|line| {
                String::from_utf8_lossy(line)
                    .trim_end_matches([' ', '\0'])
                    .to_string()
            })
            .collect())
    }

    /// Overwrite the binary header from its first field
    pub async fn write_bin_header(&self, v: ArrayView1<'_, f64>) -> Result<()> {
        self.dataset(BIN_HEADER)
            .await?
            .write_array(0, 0, v.insert_axis(Axis(1)))
            .await
    }

    pub async fn write_bin_header_value(&self, name: &str, value: f64) -> Result<()> {
        let row = bin_header_index(name)
            .ok_or_else(|| GeoError::NotFound(format!("binary header {}", name)))?;
        self.dataset(BIN_HEADER)
            .await?
            .write_raw(Rect::new(row, 0, 1, 1), &[value])
            .await
    }

    pub async fn bin_header(&self) -> Result<BTreeMap<String, f64>> {
        let v = self.dataset(BIN_HEADER).await?.read_all::<f64>().await?;
        Ok(BIN_HEADER_NAMES
            .iter()
            .map(|n| n.to_string())
            .zip(v)
            .collect())
    }

    pub async fn bin_header_value(&self, name: &str) -> Result<f64> {
        let row = bin_header_index(name)
            .ok_or_else(|| GeoError::NotFound(format!("binary header {}", name)))?;
        let v = self
            .dataset(BIN_HEADER)
            .await?
            .read_raw::<f64>(Rect::new(row, 0, 1, 1))
            .await?;
        Ok(v[0])
    }

    // -------------------------------------------------------------------------
    // Sample axis
    // -------------------------------------------------------------------------

    /// Sample interval from the binary header, in `units` of the vertical axis
    pub async fn sample_rate(&self, units: &str) -> Result<f64> {
        let rate = self.bin_header_value(SAMPLE_RATE).await?;
        Ok(rate * conversion_factor(&self.vertical_units().await?, units)?)
    }

    pub async fn set_sample_rate(&self, rate: f64, units: &str) -> Result<()> {
        let k = to_stored_factor(units, &self.vertical_units().await?)?;
        self.write_bin_header_value(SAMPLE_RATE, rate * k).await
    }

    /// Vertical position of the first sample of trace `trc`
    pub async fn first_sample(&self, trc: usize, units: &str) -> Result<f64> {
        let v = self.trace_header_by_name(FIRST_SAMPLE, trc, 1).await?;
        Ok(v[0] * conversion_factor(&self.vertical_units().await?, units)?)
    }

    /// Vertical position of every sample of trace `trc`
    pub async fn samples(&self, trc: usize, units: &str) -> Result<Array1<f64>> {
        let first = self.first_sample(trc, units).await?;
        let rate = self.sample_rate(units).await?;
        let n = self.n_samp().await?;
        Ok(Array1::from_shape_fn(n, |i| first + i as f64 * rate))
    }

    // -------------------------------------------------------------------------
    // Header-key sorting
    // -------------------------------------------------------------------------

    /// Registered sort keys in priority order
    pub async fn pkey_names(&self) -> Result<Vec<String>> {
        Ok(self
            .group
            .attr(SORT_KEYS_ATTR)
            .await?
            .and_then(|v| v.as_texts())
            .unwrap_or_default())
    }

    pub async fn has_pkey_sort(&self, key: &str) -> Result<bool> {
        Ok(self.pkey_names().await?.iter().any(|k| k == key))
    }

    /// Register `key` as the next sort key and build its index; a key already
    /// registered keeps its place
    pub async fn add_pkey_sort(&self, key: &str) -> Result<()> {
        if trace_header_index(key).is_none() {
            return Err(GeoError::UnknownSortKey(format!("{} is not a trace header", key)));
        }
        let mut keys = self.pkey_names().await?;
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
            self.group.set_attr(SORT_KEYS_ATTR, keys).await?;
        }
        let index = self.key_index(key).await?;
        tracing::debug!("sort key {} of {} has {} values", key, self.path(), index.size());
        Ok(())
    }

    /// Unregister `key`; false if it was not registered
    pub async fn remove_pkey_sort(&self, key: &str) -> Result<bool> {
        let mut keys = self.pkey_names().await?;
        let before = keys.len();
        keys.retain(|k| k != key);
        if keys.len() == before {
            return Ok(false);
        }
        self.group.set_attr(SORT_KEYS_ATTR, keys).await?;
        self.group.file().sort_cache().remove(&self.path(), key);
        Ok(true)
    }

    /// Index of a registered key, rebuilt from the headers when stale
    async fn key_index(&self, key: &str) -> Result<Arc<KeyIndex>> {
        if !self.has_pkey_sort(key).await? {
            return Err(GeoError::UnknownSortKey(format!("{} on {}", key, self.path())));
        }
        let revision = self.dataset(TRACE_HEADER).await?.record().await?.modified_at;
        let cache = self.group.file().sort_cache();
        if let Some(index) = cache.get(&self.path(), key, revision) {
            return Ok(index);
        }
        let values = self.header_values(key).await?;
        let index = KeyIndex::build(&values.to_vec());
        tracing::debug!("built sort index {} for {}", key, self.path());
        Ok(cache.insert(&self.path(), key, revision, index))
    }

    /// Unique values of `key`, ascending
    pub async fn pkey_values(&self, key: &str) -> Result<Vec<f64>> {
        Ok(self.key_index(key).await?.unique_values().to_vec())
    }

    /// Number of unique values of `key`
    pub async fn pkey_size(&self, key: &str) -> Result<usize> {
        Ok(self.key_index(key).await?.size())
    }

    /// Number of traces whose `key` lies in `[min, max]`
    pub async fn pkey_trace_size(&self, key: &str, min: f64, max: f64) -> Result<usize> {
        Ok(self.key_index(key).await?.trace_count(min, max))
    }

    /// Traces whose `key` lies in `[min, max]`, grouped by value
    pub async fn pkey_indexes(&self, key: &str, min: f64, max: f64) -> Result<Vec<usize>> {
        Ok(self.key_index(key).await?.indexes(min, max))
    }

    /// Traces selected and ordered by several header keys.
    ///
    /// The first key picks the traces whose value lies in `[mins[0], maxs[0]]`;
    /// the remaining keys drop traces outside their own ranges. Survivors are
    /// ordered by the key tuple in the given priority, ties in ascending trace
    /// index. Traces are read for samples `from_samp..from_samp + n_samp`;
    /// with `n_samp == 0` only headers and indexes are returned.
    pub async fn sorted_data(
        &self,
        keys: &[&str],
        mins: &[f64],
        maxs: &[f64],
        from_samp: usize,
        n_samp: usize,
        data_units: &str,
    ) -> Result<SortedData> {
        if keys.len() != mins.len() || keys.len() != maxs.len() {
            return Err(GeoError::PreconditionViolation(format!(
                "{} keys with {} minima and {} maxima",
                keys.len(),
                mins.len(),
                maxs.len()
            )));
        }
        if keys.is_empty() {
            return Ok(SortedData::empty(0));
        }
        for key in keys {
            if !self.has_pkey_sort(key).await? {
                return Err(GeoError::UnknownSortKey(format!("{} on {}", key, self.path())));
            }
        }

        let candidates = self.pkey_indexes(keys[0], mins[0], maxs[0]).await?;
        let mut columns = Vec::with_capacity(keys.len());
        for key in keys {
            columns.push(self.header_values(key).await?);
        }

        let (kept, rows): (Vec<usize>, Vec<Vec<f64>>) = candidates
            .into_iter()
            .filter(|&t| {
                (1..keys.len()).all(|j| columns[j][t] >= mins[j] && columns[j][t] <= maxs[j])
            })
            .map(|t| (t, columns.iter().map(|c| c[t]).collect()))
            .unzip();
        if kept.is_empty() {
            return Ok(SortedData::empty(keys.len()));
        }

        let order = sort_rows(&rows);
        let indexes: Vec<usize> = order.iter().map(|&o| kept[o]).collect();
        let mut headers = Array2::<f64>::zeros((indexes.len(), keys.len()));
        for (r, &o) in order.iter().enumerate() {
            for (c, v) in rows[o].iter().enumerate() {
                headers[[r, c]] = *v;
            }
        }

        let traces = if n_samp == 0 {
            Array2::zeros((0, indexes.len()))
        } else {
            self.traces_at(&indexes, from_samp, n_samp, data_units).await?
        };
        Ok(SortedData {
            traces,
            headers,
            indexes,
        })
    }
}

/// Distinct trace indexes grouped into ascending `(first, count)` runs
fn trace_runs(indexes: &[usize]) -> Vec<(usize, usize)> {
    let mut sorted = indexes.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let mut runs: Vec<(usize, usize)> = Vec::new();
    for trc in sorted {
        match runs.last_mut() {
            Some((first, count)) if *first + *count == trc => *count += 1,
            _ => runs.push((trc, 1)),
        }
    }
    runs
}
