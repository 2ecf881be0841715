//! End-to-end tests over on-disk containers
//!
//! Every test works in its own temporary directory and goes through the
//! public API only: containers, objects, curves and the survey engine.

use geostore::survey::{md_az_incl_to_md_x_y_tvd, tvd_x_y_to_md_az_incl};
use geostore::{
    create_container, AngleUnit, CreationType, DevCurveParam, DevDataType, Domain, GeoError,
    GeoObject, LogCurveParam, LogDataType, MapContainer, MapParam, OpenMode, SeisContainer,
    SeisDataType, SeisParam, StoreConfig, SurfContainer, SurfParam, SurveyType, WellContainer,
    WellParam,
};
use ndarray::{s, Array1, Array2};
use tempfile::TempDir;

fn location(dir: &TempDir, name: &str) -> String {
    dir.path().join(name).to_string_lossy().into_owned()
}

async fn well_container(dir: &TempDir) -> WellContainer {
    create_container(&location(dir, "wells"), CreationType::CREATE)
        .await
        .expect("create container")
        .expect("fresh location")
}

fn seis_param(n_trc: usize, n_samp: usize) -> SeisParam {
    SeisParam::new(
        n_trc,
        n_samp,
        0.0,
        Domain::TWT,
        SeisDataType::STACK,
        SurveyType::THREE_D,
        "m",
        "ms",
        "",
    )
    .with_chunks(8, 4)
}

/// 101 stations from MD 0 to 3000 building angle and turning east
fn build_and_turn() -> Array2<f64> {
    let n = 101;
    Array2::from_shape_fn((n, 3), |(i, c)| {
        let t = i as f64 / (n - 1) as f64;
        match c {
            0 => 3000.0 * t,
            1 => 30.0 + 30.0 * t,
            _ => 30.0 * t,
        }
    })
}

/// Opening an existing object with OPEN_OR_CREATE returns the same storage
/// location every time
#[tokio::test]
async fn test_open_or_create_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let wells = well_container(&dir).await;
    let param = WellParam::new(100.0, 200.0, 30.0, "W-1");

    let a = wells
        .create("field/W1", &param, CreationType::OPEN_OR_CREATE)
        .await
        .unwrap()
        .unwrap();
    let b = wells
        .create("field/W1", &param, CreationType::OPEN_OR_CREATE)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(a.path(), b.path());
    assert_eq!(a, b);
    assert_eq!(wells.object_count().await.unwrap(), 1);
}

/// CREATE_UNDER_NEW_NAME never reuses a location
#[tokio::test]
async fn test_create_under_new_name_makes_distinct_objects() {
    let dir = TempDir::new().unwrap();
    let wells = well_container(&dir).await;
    let param = WellParam::new(0.0, 0.0, 0.0, "W-2");

    let a = wells
        .create("W2", &param, CreationType::CREATE_UNDER_NEW_NAME)
        .await
        .unwrap()
        .unwrap();
    let b = wells
        .create("W2", &param, CreationType::CREATE_UNDER_NEW_NAME)
        .await
        .unwrap()
        .unwrap();

    assert_ne!(a.path(), b.path());
    assert_eq!(wells.object_count().await.unwrap(), 2);

    // CREATE on an occupied location resolves to nothing
    assert!(wells
        .create("W2", &param, CreationType::CREATE)
        .await
        .unwrap()
        .is_none());
}

/// An object of one kind cannot be opened as another
#[tokio::test]
async fn test_type_mismatch_resolves_to_none() {
    let dir = TempDir::new().unwrap();
    let wells = well_container(&dir).await;
    let w = wells
        .create("W3", &WellParam::new(0.0, 0.0, 0.0, "W-3"), CreationType::CREATE)
        .await
        .unwrap()
        .unwrap();
    let dc = w
        .create_dev_curve("survey", &DevCurveParam::default(), CreationType::CREATE)
        .await
        .unwrap()
        .unwrap();

    assert!(wells.get_log_curve(&dc.path()).await.unwrap().is_none());
    assert!(wells.get(&dc.path()).await.unwrap().is_none());

    // the whole root is typed as well
    let maps: Option<MapContainer> = create_container(&location(&dir, "wells"), CreationType::OPEN)
        .await
        .unwrap();
    assert!(maps.is_none());
}

/// Curves of one well are invisible through another well
#[tokio::test]
async fn test_ownership_isolation_between_wells() {
    let dir = TempDir::new().unwrap();
    let wells = well_container(&dir).await;
    let mut made = Vec::new();
    for name in ["A", "B"] {
        let w = wells
            .create(name, &WellParam::new(0.0, 0.0, 0.0, name), CreationType::CREATE)
            .await
            .unwrap()
            .unwrap();
        let dc = w
            .create_dev_curve(&format!("dev_{}", name), &DevCurveParam::default(), CreationType::CREATE)
            .await
            .unwrap()
            .unwrap();
        let lc = w
            .create_log_curve("GR", &format!("gr_{}", name), &LogCurveParam::new("m", ""), CreationType::CREATE)
            .await
            .unwrap()
            .unwrap();
        made.push((w, dc, lc));
    }
    let (wa, dca, lca) = &made[0];
    let (wb, dcb, lcb) = &made[1];

    assert_eq!(wa.dev_curve(&dca.path()).await.unwrap().as_ref(), Some(dca));
    assert_eq!(wa.log_curve("GR", &lca.path()).await.unwrap().as_ref(), Some(lca));
    assert_eq!(wb.dev_curve("dev_B").await.unwrap().as_ref(), Some(dcb));

    assert!(wa.dev_curve(&dcb.path()).await.unwrap().is_none());
    assert!(wa.log_curve("GR", &lcb.path()).await.unwrap().is_none());
    assert!(wb.dev_curve(&dca.path()).await.unwrap().is_none());
    assert!(wb.log_curve("", &lca.path()).await.unwrap().is_none());

    // creating through the wrong well is refused as well
    assert!(wa
        .create_dev_curve(&dcb.path(), &DevCurveParam::default(), CreationType::OPEN_OR_CREATE)
        .await
        .unwrap()
        .is_none());

    assert_eq!(dcb.well().await.unwrap().as_ref(), Some(wb));
    assert_eq!(lca.well().await.unwrap().as_ref(), Some(wa));
}

/// Relative paths cannot climb out of a well with `..` or `.`
#[tokio::test]
async fn test_dot_components_never_leave_the_well() {
    let dir = TempDir::new().unwrap();
    let wells = well_container(&dir).await;
    let mut made = Vec::new();
    for name in ["A", "B"] {
        let w = wells
            .create(name, &WellParam::new(0.0, 0.0, 0.0, name), CreationType::CREATE)
            .await
            .unwrap()
            .unwrap();
        w.create_dev_curve(&format!("dev_{}", name), &DevCurveParam::default(), CreationType::CREATE)
            .await
            .unwrap()
            .unwrap();
        w.create_log_curve("GR", &format!("gr_{}", name), &LogCurveParam::new("m", ""), CreationType::CREATE)
            .await
            .unwrap()
            .unwrap();
        made.push(w);
    }
    let (wa, wb) = (&made[0], &made[1]);

    assert!(wa.dev_curve("../../B/DEV/dev_B").await.unwrap().is_none());
    assert!(wa.dev_curve("./dev_A").await.unwrap().is_none());
    assert!(wa.log_curve("GR", "../../../B/LOG/GR/gr_B").await.unwrap().is_none());
    assert!(wa.log_curve("", "../../B/LOG/GR/gr_B").await.unwrap().is_none());
    assert!(wells.get("A/../B").await.unwrap().is_none());

    for name in ["../../B/DEV/planted", "../../../../escaped", "/A/DEV/../../B/DEV/planted"] {
        assert!(wa
            .create_dev_curve(name, &DevCurveParam::default(), CreationType::OPEN_OR_CREATE)
            .await
            .unwrap()
            .is_none());
    }
    assert!(wa
        .create_log_curve("GR", "../../../B/LOG/GR/planted", &LogCurveParam::new("m", ""), CreationType::CREATE)
        .await
        .unwrap()
        .is_none());

    assert_eq!(wb.dev_curve_count().await.unwrap(), 1);
    assert_eq!(wb.log_curve_count().await.unwrap(), 1);
    assert!(!dir.path().join("escaped").exists());
    assert!(!dir.path().parent().unwrap().join("escaped").exists());
}

/// Only the most recently activated deviation curve is active
#[tokio::test]
async fn test_active_curve_is_exclusive() {
    let dir = TempDir::new().unwrap();
    let wells = well_container(&dir).await;
    let w = wells
        .create("W4", &WellParam::new(0.0, 0.0, 0.0, "W-4"), CreationType::CREATE)
        .await
        .unwrap()
        .unwrap();
    let param = DevCurveParam::new("m", "ms", "degree").with_active(true);

    let first = w.create_dev_curve("first", &param, CreationType::CREATE).await.unwrap().unwrap();
    first
        .write_curve(DevDataType::MD, Array1::from(vec![0.0, 10.0]).view(), "")
        .await
        .unwrap();
    assert_eq!(w.active_dev_curve().await.unwrap().as_ref(), Some(&first));

    let second = w.create_dev_curve("second", &param, CreationType::CREATE).await.unwrap().unwrap();
    let md = Array1::from(vec![0.0, 20.0, 40.0]);
    second.write_curve(DevDataType::MD, md.view(), "").await.unwrap();

    let active = w.active_dev_curve().await.unwrap().unwrap();
    assert_eq!(active, second);
    assert_eq!(active.curve(DevDataType::MD, "").await.unwrap(), md);
    assert!(second.is_active().await.unwrap());
    assert!(!first.is_active().await.unwrap());

    first.set_active().await.unwrap();
    assert_eq!(w.active_dev_curve().await.unwrap().as_ref(), Some(&first));
    assert!(!second.is_active().await.unwrap());
    assert_eq!(w.dev_curve_count().await.unwrap(), 2);
}

/// The survey engine and its inverse agree within 5% of the deepest MD
#[tokio::test]
async fn test_survey_round_trip_both_orientations() {
    let m = build_and_turn();
    let md_max = m[[m.nrows() - 1, 0]];
    let (x0, y0) = (444363.0, 7425880.0);

    for x_north in [false, true] {
        let fwd = md_az_incl_to_md_x_y_tvd(m.view(), x0, y0, AngleUnit::Degree, x_north);
        let mut tvd_x_y = Array2::<f64>::zeros((m.nrows(), 3));
        tvd_x_y.column_mut(0).assign(&fwd.column(3));
        tvd_x_y.column_mut(1).assign(&fwd.column(1));
        tvd_x_y.column_mut(2).assign(&fwd.column(2));

        let inv = tvd_x_y_to_md_az_incl(tvd_x_y.view(), x0, y0, x_north);
        let again = md_az_incl_to_md_x_y_tvd(inv.view(), x0, y0, AngleUnit::Radian, x_north);
        let diff = &fwd.slice(s![.., 1..]) - &again.slice(s![.., 1..]);
        let residual = diff.iter().map(|v| v * v).sum::<f64>().sqrt() / md_max;
        assert!(residual < 0.05, "x_north={} residual {}", x_north, residual);
    }
}

/// A deviation curve recomputes TVD from MD/AZIM/INCL and back
#[tokio::test]
async fn test_dev_curve_survey_round_trip() {
    let dir = TempDir::new().unwrap();
    let wells = well_container(&dir).await;
    let w = wells
        .create("W5", &WellParam::new(1000.0, 2000.0, 25.0, "W-5"), CreationType::CREATE)
        .await
        .unwrap()
        .unwrap();
    let dc = w
        .create_dev_curve("main", &DevCurveParam::new("m", "ms", "degree"), CreationType::CREATE)
        .await
        .unwrap()
        .unwrap();

    let m = build_and_turn();
    dc.write_curve(DevDataType::MD, m.column(0), "").await.unwrap();
    dc.write_curve(DevDataType::AZIM, m.column(1), "").await.unwrap();
    dc.write_curve(DevDataType::INCL, m.column(2), "").await.unwrap();
    dc.update_tvd_dx_dy().await.unwrap();

    let tvd = dc.curve(DevDataType::TVD, "").await.unwrap();
    let x = dc.curve(DevDataType::X, "").await.unwrap();
    assert!(tvd[tvd.len() - 1] < m[[m.nrows() - 1, 0]]);
    assert!((x[0] - 1000.0).abs() < 1e-9);

    dc.update_md_azim_incl().await.unwrap();
    let md = dc.curve(DevDataType::MD, "").await.unwrap();
    let err = (&md - &m.column(0)).mapv(|v| v * v).sum().sqrt() / 3000.0;
    assert!(err < 0.05, "md residual {}", err);
}

/// Trace blocks round-trip exactly, whole and as sub-rectangles
#[tokio::test]
async fn test_seis_trace_round_trip() {
    let dir = TempDir::new().unwrap();
    let seis: SeisContainer = create_container(&location(&dir, "seis"), CreationType::CREATE)
        .await
        .unwrap()
        .unwrap();
    let (n_trc, n_samp) = (20, 10);
    let s = seis
        .create("line1", &seis_param(n_trc, n_samp), CreationType::CREATE)
        .await
        .unwrap()
        .unwrap();

    let data = Array2::from_shape_fn((n_samp, n_trc), |(i, j)| (i * 100 + j) as f32 * 0.5);
    s.write_trace(data.view(), 0, 0, "").await.unwrap();

    assert_eq!(s.trace(0, n_trc, 0, n_samp, "").await.unwrap(), data);
    let sub = s.trace(3, 10, 2, 5, "").await.unwrap();
    assert_eq!(sub, data.slice(s![2..7, 3..13]).to_owned());
    assert_eq!(s.trace_column(7, "").await.unwrap(), data.column(7).to_owned());

    assert!(matches!(
        s.trace(15, 10, 0, 1, "").await,
        Err(GeoError::Range(_))
    ));
}

/// Binary header values round-trip by name and as a whole buffer
#[tokio::test]
async fn test_seis_header_round_trip() {
    let dir = TempDir::new().unwrap();
    let seis: SeisContainer = create_container(&location(&dir, "seis"), CreationType::CREATE)
        .await
        .unwrap()
        .unwrap();
    let s = seis
        .create("line2", &seis_param(4, 3), CreationType::CREATE)
        .await
        .unwrap()
        .unwrap();

    s.write_bin_header_value("SAMP_RATE", 2000.0).await.unwrap();
    assert_eq!(s.bin_header_value("SAMP_RATE").await.unwrap(), 2000.0);

    let buf = Array1::from_shape_fn(30, |i| i as f64 * 1.5);
    s.write_bin_header(buf.view()).await.unwrap();
    let back = s.bin_header().await.unwrap();
    assert_eq!(back.len(), 30);
    assert_eq!(back.get("SAMP_RATE").copied(), Some(buf[geostore::headers::bin_header_index("SAMP_RATE").unwrap()]));

    let headers = Array2::from_shape_fn((4, 78), |(i, j)| (i * 78 + j) as f64);
    s.write_trace_header(headers.view(), 0, 0).await.unwrap();
    assert_eq!(s.trace_header(0, 4, 0, 78).await.unwrap(), headers);
    assert_eq!(
        s.trace_header_by_name("CDP", 1, 2).await.unwrap(),
        headers.slice(s![1..3, 5]).to_owned()
    );
}

/// Every trace returned by a three-key sort carries headers inside the
/// requested ranges, in lexicographic key order
#[tokio::test]
async fn test_sorted_data_matches_headers() {
    let dir = TempDir::new().unwrap();
    let seis: SeisContainer = create_container(&location(&dir, "seis"), CreationType::CREATE)
        .await
        .unwrap()
        .unwrap();
    let n_trc = 60;
    let s = seis
        .create("gathers", &seis_param(n_trc, 4), CreationType::CREATE)
        .await
        .unwrap()
        .unwrap();

    let ffid = Array1::from_shape_fn(n_trc, |i| (i / 12) as f64);
    let cdp = Array1::from_shape_fn(n_trc, |i| (i % 7) as f64 + 100.0);
    let dsreg = Array1::from_shape_fn(n_trc, |i| ((i * 3) % 5) as f64);
    s.write_trace_header_by_name("FFID", ffid.view(), 0).await.unwrap();
    s.write_trace_header_by_name("CDP", cdp.view(), 0).await.unwrap();
    s.write_trace_header_by_name("DSREG", dsreg.view(), 0).await.unwrap();
    let traces = Array2::from_shape_fn((4, n_trc), |(i, j)| (j * 10 + i) as f32);
    s.write_trace(traces.view(), 0, 0, "").await.unwrap();

    for key in ["FFID", "CDP", "DSREG"] {
        s.add_pkey_sort(key).await.unwrap();
    }
    assert_eq!(s.pkey_size("FFID").await.unwrap(), 5);
    assert_eq!(s.pkey_size("CDP").await.unwrap(), 7);

    let (mins, maxs) = ([1.0, 101.0, 0.0], [3.0, 104.0, 2.0]);
    let sorted = s
        .sorted_data(&["FFID", "CDP", "DSREG"], &mins, &maxs, 0, 4, "")
        .await
        .unwrap();
    assert!(!sorted.indexes.is_empty());
    assert_eq!(sorted.headers.nrows(), sorted.indexes.len());
    assert_eq!(sorted.traces.dim(), (4, sorted.indexes.len()));

    for (r, &t) in sorted.indexes.iter().enumerate() {
        let row = [ffid[t], cdp[t], dsreg[t]];
        for k in 0..3 {
            assert!(row[k] >= mins[k] && row[k] <= maxs[k]);
            assert_eq!(sorted.headers[[r, k]], row[k]);
        }
        assert_eq!(sorted.traces.column(r), traces.column(t));
    }
    for r in 1..sorted.indexes.len() {
        let prev = sorted.headers.row(r - 1).to_vec();
        let cur = sorted.headers.row(r).to_vec();
        assert!(prev <= cur);
    }

    let expected = (0..n_trc)
        .filter(|&t| {
            (1.0..=3.0).contains(&ffid[t])
                && (101.0..=104.0).contains(&cdp[t])
                && (0.0..=2.0).contains(&dsreg[t])
        })
        .count();
    assert_eq!(sorted.indexes.len(), expected);

    assert!(matches!(
        s.sorted_data(&["SP"], &[0.0], &[1.0], 0, 0, "").await,
        Err(GeoError::UnknownSortKey(_))
    ));
}

/// Big-endian SEG-Y with an ASCII text header and IEEE samples; trace `j`
/// has FFID `10 + j` and sample `i` equal to `j + i / 10`
fn ieee_segy(n_trc: usize, n_samp: usize) -> Vec<u8> {
    let mut out = vec![b' '; 3200];
    out[..15].copy_from_slice(b"C 1 CLIENT ACME");
    let mut bin = vec![0u8; 400];
    bin[16..18].copy_from_slice(&2000i16.to_be_bytes());
    bin[20..22].copy_from_slice(&(n_samp as i16).to_be_bytes());
    bin[24..26].copy_from_slice(&5i16.to_be_bytes());
    out.extend(bin);
    for j in 0..n_trc {
        let mut hdr = vec![0u8; 240];
        hdr[8..12].copy_from_slice(&(10 + j as i32).to_be_bytes());
        out.extend(hdr);
        for i in 0..n_samp {
            out.extend((j as f32 + i as f32 / 10.0).to_be_bytes());
        }
    }
    out
}

/// A SEG-Y file fills the headers and traces of a seismic object
#[tokio::test]
async fn test_seis_reads_segy() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("line.sgy");
    std::fs::write(&path, ieee_segy(5, 4)).unwrap();

    let seis: SeisContainer = create_container(&location(&dir, "seis"), CreationType::CREATE)
        .await
        .unwrap()
        .unwrap();
    let s = seis
        .create("imported", &seis_param(5, 4).with_chunks(2, 4), CreationType::CREATE)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(s.read_segy(&path).await.unwrap(), 5);

    let expected = Array2::from_shape_fn((4, 5), |(i, j)| j as f32 + i as f32 / 10.0);
    assert_eq!(s.trace(0, 5, 0, 4, "").await.unwrap(), expected);
    assert_eq!(
        s.trace_header_by_name("FFID", 0, 5).await.unwrap(),
        Array1::from(vec![10.0, 11.0, 12.0, 13.0, 14.0])
    );
    assert_eq!(s.text_header().await.unwrap()[0], "C 1 CLIENT ACME");
    assert_eq!(s.bin_header_value("SAMP_NUM").await.unwrap(), 4.0);
    assert!((s.sample_rate("ms").await.unwrap() - 2.0).abs() < 1e-12);

    let short = seis
        .create("short", &seis_param(5, 3), CreationType::CREATE)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(short.read_segy(&path).await, Err(GeoError::Range(_))));
}

/// Reads convert from the stored unit to the requested one
#[tokio::test]
async fn test_map_unit_conversion() {
    let dir = TempDir::new().unwrap();
    let maps: MapContainer = create_container(&location(&dir, "maps"), CreationType::CREATE)
        .await
        .unwrap()
        .unwrap();
    let p = MapParam::new((0.0, 0.0), (400.0, 0.0), (0.0, 300.0), 4, 3, Domain::TVD, "m", "m/s");
    let map = maps.create("velocity", &p, CreationType::CREATE).await.unwrap().unwrap();

    let v = Array2::from_shape_fn((3, 4), |(i, j)| 1500.0 + (i * 4 + j) as f64);
    map.write_data(v.view(), "").await.unwrap();
    let mm = map.data("mm/sec").await.unwrap();
    for (a, b) in mm.iter().zip(v.iter()) {
        assert!((a - b * 1000.0).abs() < 1e-6);
    }

    // writing in km/s stores m/s
    map.write_data(v.mapv(|x| x / 1000.0).view(), "km/s").await.unwrap();
    let back = map.data("").await.unwrap();
    for (a, b) in back.iter().zip(v.iter()) {
        assert!((a - b).abs() < 1e-9);
    }

    assert!(matches!(map.data("ms").await, Err(GeoError::InvalidUnit(_))));
    assert!(matches!(
        map.write_data(Array2::zeros((2, 2)).view(), "").await,
        Err(GeoError::Range(_))
    ));
}

/// Surface grids persist across a reopen of the container
#[tokio::test]
async fn test_surface_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("surfs");
    let grid = Array2::from_shape_fn((5, 6), |(i, j)| (i as f64) * 10.0 - j as f64);

    {
        let config = StoreConfig::builder().root(&root).open_mode(OpenMode::Create).build();
        let surfs = SurfContainer::open(&config).await.unwrap();
        let p = SurfParam::new(10.0, 20.0, 25.0, 25.0, 6, 5, Domain::TWT, "m", "ms")
            .with_orientation(15.0);
        let surf = surfs.create("horizon", &p, CreationType::CREATE).await.unwrap().unwrap();
        surf.write_data(grid.view(), "").await.unwrap();
    }

    let config = StoreConfig::builder().root(&root).open_mode(OpenMode::Reopen).build();
    let surfs = SurfContainer::open(&config).await.unwrap();
    let surf = surfs.get("horizon").await.unwrap().unwrap();
    assert_eq!(surf.data("").await.unwrap(), grid);
    assert_eq!(surf.orientation().await.unwrap(), 15.0);
    assert_eq!(surf.domain().await.unwrap(), Domain::TWT);
    let s_data = surf.data("s").await.unwrap();
    assert!((s_data[[4, 0]] - 0.04).abs() < 1e-12);
}

/// A read-only root serves reads and refuses every write
#[tokio::test]
async fn test_read_only_root_refuses_writes() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("ro_wells");
    {
        let config = StoreConfig::builder().root(&root).reopen(false).build();
        let wells = WellContainer::open(&config).await.unwrap();
        wells
            .create("W6", &WellParam::new(1.0, 2.0, 3.0, "W-6"), CreationType::CREATE)
            .await
            .unwrap()
            .unwrap();
    }

    let config = StoreConfig::builder()
        .root(&root)
        .open_mode(OpenMode::Reopen)
        .read_only(true)
        .build();
    let wells = WellContainer::open(&config).await.unwrap();
    let w = wells.get("W6").await.unwrap().unwrap();
    assert_eq!(w.uwi().await.unwrap(), "W-6");

    assert!(matches!(w.set_kb(10.0, "").await, Err(GeoError::ReadOnly(_))));
    assert!(matches!(
        wells
            .create("W7", &WellParam::new(0.0, 0.0, 0.0, "W-7"), CreationType::CREATE)
            .await,
        Err(GeoError::ReadOnly(_))
    ));
}

/// Log curves keep MD and values in their own units
#[tokio::test]
async fn test_log_curve_units() {
    let dir = TempDir::new().unwrap();
    let wells = well_container(&dir).await;
    let w = wells
        .create("W8", &WellParam::new(0.0, 0.0, 0.0, "W-8"), CreationType::CREATE)
        .await
        .unwrap()
        .unwrap();
    let lc = w
        .create_log_curve("", "DT", &LogCurveParam::new("m", "us"), CreationType::CREATE)
        .await
        .unwrap()
        .unwrap();

    let md_km = Array1::from(vec![1.0, 1.5, 2.0]);
    lc.write_curve(LogDataType::MD, md_km.view(), "km").await.unwrap();
    lc.write_curve(LogDataType::VAL, Array1::from(vec![0.1, 0.2, 0.3]).view(), "ms")
        .await
        .unwrap();

    let md = lc.curve(LogDataType::MD, "").await.unwrap();
    assert!((md[2] - 2000.0).abs() < 1e-9);
    let val = lc.curve(LogDataType::VAL, "").await.unwrap();
    assert!((val[0] - 100.0).abs() < 1e-9);
    assert_eq!(w.log_curve_names().await.unwrap(), vec!["DT"]);
}
