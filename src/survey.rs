//! Well trajectory survey engine
//!
//! Minimum-curvature conversions between (MD, AZ, INCL) stations and
//! Cartesian (X, Y, TVD) positions. Tables are `N x 3` or `N x 4` matrices with
//! one survey station per row and MD increasing down the table. Any input whose
//! column count is wrong yields an empty `0 x 0` matrix; nothing here returns an
//! error, degenerate input simply gives degenerate numbers.
//!
//! `x_north` chooses which output axis carries the northing: with `false` X is
//! east and Y is north, with `true` X is north and Y is east.
//!
//! TVDSS columns relate to TVD through the kelly bushing as `TVDSS = TVD + kb`.

use crate::types::TrajectoryFormat;
use crate::units::AngleUnit;
use ndarray::{Array2, ArrayView2};

/// Column count of the `*_to_all` outputs:
/// MD, X, Y, TVDSS, TVD, DX, DY, AZ (rad), INCL (rad)
pub const ALL_COLUMNS: usize = 9;

fn empty() -> Array2<f64> {
    Array2::zeros((0, 0))
}

/// Dogleg angle between two stations (radians)
fn beta_angle(i1: f64, i2: f64, a1: f64, a2: f64) -> f64 {
    // clamp guards acos against rounding just above 1
    ((i2 - i1).cos() - i1.sin() * i2.sin() * (1.0 - (a2 - a1).cos()))
        .clamp(-1.0, 1.0)
        .acos()
}

/// Ratio factor smoothing a straight segment onto the arc
fn ratio_factor(b: f64) -> f64 {
    if b == 0.0 {
        1.0 + b.powi(2) / 12.0 + b.powi(4) / 120.0 + b.powi(6) / 20160.0
    } else {
        2.0 / b * (b / 2.0).tan()
    }
}

fn delta_east(dmd: f64, i1: f64, i2: f64, a1: f64, a2: f64, rf: f64) -> f64 {
    dmd / 2.0 * (i1.sin() * a1.sin() + i2.sin() * a2.sin()) * rf
}

fn delta_north(dmd: f64, i1: f64, i2: f64, a1: f64, a2: f64, rf: f64) -> f64 {
    dmd / 2.0 * (i1.sin() * a1.cos() + i2.sin() * a2.cos()) * rf
}

fn delta_z(dmd: f64, i1: f64, i2: f64, rf: f64) -> f64 {
    dmd / 2.0 * (i1.cos() + i2.cos()) * rf
}

fn dmd_from_delta_z(dz: f64, i1: f64, i2: f64, rf: f64) -> f64 {
    2.0 * dz / ((i1.cos() + i2.cos()) * rf)
}

/// (MD, AZ, INCL) -> (MD, X, Y, TVD), accumulating from the well head
pub fn md_az_incl_to_md_x_y_tvd(
    m: ArrayView2<'_, f64>,
    x0: f64,
    y0: f64,
    angle_unit: AngleUnit,
    x_north: bool,
) -> Array2<f64> {
    if m.ncols() != 3 {
        return empty();
    }

    let rad = |v: f64| angle_unit.to_radians(v);
    let mut out = Array2::<f64>::zeros((m.nrows(), 4));

    for i in 0..m.nrows() {
        let (a1, a2, i1, i2, dmd) = if i == 0 {
            let a = rad(m[[0, 1]]);
            let inc = rad(m[[0, 2]]);
            (a, a, inc, inc, m[[0, 0]])
        } else {
            (
                rad(m[[i, 1]]),
                rad(m[[i - 1, 1]]),
                rad(m[[i, 2]]),
                rad(m[[i - 1, 2]]),
                m[[i, 0]] - m[[i - 1, 0]],
            )
        };

        let rf = ratio_factor(beta_angle(i1, i2, a1, a2));
        let east = delta_east(dmd, i1, i2, a1, a2, rf);
        let north = delta_north(dmd, i1, i2, a1, a2, rf);
        let (dx, dy) = if x_north { (north, east) } else { (east, north) };
        let dz = delta_z(dmd, i1, i2, rf);

        out[[i, 0]] = m[[i, 0]];
        if i == 0 {
            out[[0, 1]] = x0 + dx;
            out[[0, 2]] = y0 + dy;
            out[[0, 3]] = dz;
        } else {
            out[[i, 1]] = out[[i - 1, 1]] + dx;
            out[[i, 2]] = out[[i - 1, 2]] + dy;
            out[[i, 3]] = out[[i - 1, 3]] + dz;
        }
    }
    out
}

/// (TVD, DX, DY) -> (MD, AZ, INCL) with angles in radians.
///
/// Station directions are taken from the chord between consecutive stations
/// and MD is fitted so the forward transform reproduces each TVD step.
pub fn tvd_dx_dy_to_md_az_incl(m: ArrayView2<'_, f64>, x_north: bool) -> Array2<f64> {
    if m.ncols() != 3 {
        return empty();
    }

    let azimuth = |dx: f64, dy: f64| if x_north { dy.atan2(dx) } else { dx.atan2(dy) };
    let mut out = Array2::<f64>::zeros((m.nrows(), 3));

    for i in 0..m.nrows() {
        let (dz, dx, dy) = if i == 0 {
            (m[[0, 0]], m[[0, 1]], m[[0, 2]])
        } else {
            (
                m[[i, 0]] - m[[i - 1, 0]],
                m[[i, 1]] - m[[i - 1, 1]],
                m[[i, 2]] - m[[i - 1, 2]],
            )
        };

        let a2 = azimuth(dx, dy);
        let i2 = dx.hypot(dy).atan2(dz);
        let (a1, i1) = if i == 0 {
            (a2, i2)
        } else {
            (out[[i - 1, 1]], out[[i - 1, 2]])
        };

        let rf = ratio_factor(beta_angle(i1, i2, a1, a2));
        let dmd = dmd_from_delta_z(dz, i1, i2, rf);

        out[[i, 0]] = if i == 0 { dmd } else { out[[i - 1, 0]] + dmd };
        out[[i, 1]] = a2;
        out[[i, 2]] = i2;
    }
    out
}

/// Copy of `m` with `offsets[c]` subtracted from column `c`
fn shifted(m: ArrayView2<'_, f64>, offsets: [f64; 3]) -> Array2<f64> {
    let mut mm = m.to_owned();
    for (c, off) in offsets.iter().enumerate() {
        mm.column_mut(c).mapv_inplace(|v| v - off);
    }
    mm
}

/// (TVD, X, Y) -> (MD, AZ, INCL), radians
pub fn tvd_x_y_to_md_az_incl(
    m: ArrayView2<'_, f64>,
    x0: f64,
    y0: f64,
    x_north: bool,
) -> Array2<f64> {
    if m.ncols() != 3 {
        return empty();
    }
    tvd_dx_dy_to_md_az_incl(shifted(m, [0.0, x0, y0]).view(), x_north)
}

/// (TVDSS, X, Y) -> (MD, AZ, INCL), radians
pub fn tvdss_x_y_to_md_az_incl(
    m: ArrayView2<'_, f64>,
    x0: f64,
    y0: f64,
    kb: f64,
    x_north: bool,
) -> Array2<f64> {
    if m.ncols() != 3 {
        return empty();
    }
    tvd_dx_dy_to_md_az_incl(shifted(m, [kb, x0, y0]).view(), x_north)
}

/// (TVDSS, DX, DY) -> (MD, AZ, INCL), radians
pub fn tvdss_dx_dy_to_md_az_incl(m: ArrayView2<'_, f64>, kb: f64, x_north: bool) -> Array2<f64> {
    if m.ncols() != 3 {
        return empty();
    }
    tvd_dx_dy_to_md_az_incl(shifted(m, [kb, 0.0, 0.0]).view(), x_north)
}

/// Assemble (MD, X, Y, TVD) from a fitted MD column and known positions
fn md_x_y_tvd(md: &Array2<f64>, tvd: impl Fn(usize) -> f64, x: impl Fn(usize) -> f64, y: impl Fn(usize) -> f64) -> Array2<f64> {
    let mut out = Array2::<f64>::zeros((md.nrows(), 4));
    for i in 0..md.nrows() {
        out[[i, 0]] = md[[i, 0]];
        out[[i, 1]] = x(i);
        out[[i, 2]] = y(i);
        out[[i, 3]] = tvd(i);
    }
    out
}

/// (TVD, X, Y) -> (MD, X, Y, TVD)
pub fn tvd_x_y_to_md_x_y_tvd(
    m: ArrayView2<'_, f64>,
    x0: f64,
    y0: f64,
    x_north: bool,
) -> Array2<f64> {
    if m.ncols() != 3 {
        return empty();
    }
    let fitted = tvd_x_y_to_md_az_incl(m, x0, y0, x_north);
    md_x_y_tvd(&fitted, |i| m[[i, 0]], |i| m[[i, 1]], |i| m[[i, 2]])
}

/// (TVD, DX, DY) -> (MD, X, Y, TVD)
pub fn tvd_dx_dy_to_md_x_y_tvd(
    m: ArrayView2<'_, f64>,
    x0: f64,
    y0: f64,
    x_north: bool,
) -> Array2<f64> {
    if m.ncols() != 3 {
        return empty();
    }
    let fitted = tvd_dx_dy_to_md_az_incl(m, x_north);
    md_x_y_tvd(&fitted, |i| m[[i, 0]], |i| m[[i, 1]] + x0, |i| m[[i, 2]] + y0)
}

/// (TVDSS, X, Y) -> (MD, X, Y, TVD)
pub fn tvdss_x_y_to_md_x_y_tvd(
    m: ArrayView2<'_, f64>,
    x0: f64,
    y0: f64,
    kb: f64,
    x_north: bool,
) -> Array2<f64> {
    if m.ncols() != 3 {
        return empty();
    }
    let fitted = tvdss_x_y_to_md_az_incl(m, x0, y0, kb, x_north);
    md_x_y_tvd(&fitted, |i| m[[i, 0]] - kb, |i| m[[i, 1]], |i| m[[i, 2]])
}

/// (TVDSS, DX, DY) -> (MD, X, Y, TVD)
pub fn tvdss_dx_dy_to_md_x_y_tvd(
    m: ArrayView2<'_, f64>,
    x0: f64,
    y0: f64,
    kb: f64,
    x_north: bool,
) -> Array2<f64> {
    if m.ncols() != 3 {
        return empty();
    }
    let fitted = tvdss_dx_dy_to_md_az_incl(m, kb, x_north);
    md_x_y_tvd(
        &fitted,
        |i| m[[i, 0]] - kb,
        |i| m[[i, 1]] + x0,
        |i| m[[i, 2]] + y0,
    )
}

/// Row of a `*_to_all` table
struct AllRow {
    md: f64,
    x: f64,
    y: f64,
    tvd: f64,
    az: f64,
    incl: f64,
}

fn all_table(rows: impl Iterator<Item = AllRow>, n: usize, x0: f64, y0: f64, kb: f64) -> Array2<f64> {
    let mut out = Array2::<f64>::zeros((n, ALL_COLUMNS));
    for (i, r) in rows.enumerate() {
        out[[i, 0]] = r.md;
        out[[i, 1]] = r.x;
        out[[i, 2]] = r.y;
        out[[i, 3]] = r.tvd + kb;
        out[[i, 4]] = r.tvd;
        out[[i, 5]] = r.x - x0;
        out[[i, 6]] = r.y - y0;
        out[[i, 7]] = r.az;
        out[[i, 8]] = r.incl;
    }
    out
}

/// (MD, AZ, INCL) -> every representation, see [`ALL_COLUMNS`]
pub fn md_az_incl_to_all(
    m: ArrayView2<'_, f64>,
    x0: f64,
    y0: f64,
    kb: f64,
    angle_unit: AngleUnit,
    x_north: bool,
) -> Array2<f64> {
    if m.ncols() != 3 {
        return empty();
    }
    let fwd = md_az_incl_to_md_x_y_tvd(m, x0, y0, angle_unit, x_north);
    let rows = (0..m.nrows()).map(|i| AllRow {
        md: fwd[[i, 0]],
        x: fwd[[i, 1]],
        y: fwd[[i, 2]],
        tvd: fwd[[i, 3]],
        az: angle_unit.to_radians(m[[i, 1]]),
        incl: angle_unit.to_radians(m[[i, 2]]),
    });
    all_table(rows, m.nrows(), x0, y0, kb)
}

fn all_from_positions(
    fitted: &Array2<f64>,
    positions: &Array2<f64>,
    x0: f64,
    y0: f64,
    kb: f64,
) -> Array2<f64> {
    let rows = (0..fitted.nrows()).map(|i| AllRow {
        md: fitted[[i, 0]],
        x: positions[[i, 1]],
        y: positions[[i, 2]],
        tvd: positions[[i, 0]],
        az: fitted[[i, 1]],
        incl: fitted[[i, 2]],
    });
    all_table(rows, fitted.nrows(), x0, y0, kb)
}

/// (TVD, X, Y) -> every representation
pub fn tvd_x_y_to_all(m: ArrayView2<'_, f64>, x0: f64, y0: f64, kb: f64, x_north: bool) -> Array2<f64> {
    if m.ncols() != 3 {
        return empty();
    }
    let fitted = tvd_x_y_to_md_az_incl(m, x0, y0, x_north);
    all_from_positions(&fitted, &m.to_owned(), x0, y0, kb)
}

/// (TVD, DX, DY) -> every representation
pub fn tvd_dx_dy_to_all(m: ArrayView2<'_, f64>, x0: f64, y0: f64, kb: f64, x_north: bool) -> Array2<f64> {
    if m.ncols() != 3 {
        return empty();
    }
    let fitted = tvd_dx_dy_to_md_az_incl(m, x_north);
    all_from_positions(&fitted, &shifted(m, [0.0, -x0, -y0]), x0, y0, kb)
}

/// (TVDSS, X, Y) -> every representation
pub fn tvdss_x_y_to_all(m: ArrayView2<'_, f64>, x0: f64, y0: f64, kb: f64, x_north: bool) -> Array2<f64> {
    if m.ncols() != 3 {
        return empty();
    }
    let fitted = tvdss_x_y_to_md_az_incl(m, x0, y0, kb, x_north);
    all_from_positions(&fitted, &shifted(m, [kb, 0.0, 0.0]), x0, y0, kb)
}

/// (TVDSS, DX, DY) -> every representation
pub fn tvdss_dx_dy_to_all(m: ArrayView2<'_, f64>, x0: f64, y0: f64, kb: f64, x_north: bool) -> Array2<f64> {
    if m.ncols() != 3 {
        return empty();
    }
    let fitted = tvdss_dx_dy_to_md_az_incl(m, kb, x_north);
    all_from_positions(&fitted, &shifted(m, [kb, -x0, -y0]), x0, y0, kb)
}

/// Dispatch on the column layout of `m`; `angle_unit` only applies to
/// (MD, AZ, INCL) input
pub fn to_all(
    format: TrajectoryFormat,
    m: ArrayView2<'_, f64>,
    x0: f64,
    y0: f64,
    kb: f64,
    angle_unit: AngleUnit,
    x_north: bool,
) -> Array2<f64> {
    match format {
        TrajectoryFormat::MD_AZIM_INCL => md_az_incl_to_all(m, x0, y0, kb, angle_unit, x_north),
        TrajectoryFormat::TVD_X_Y => tvd_x_y_to_all(m, x0, y0, kb, x_north),
        TrajectoryFormat::TVD_DX_DY => tvd_dx_dy_to_all(m, x0, y0, kb, x_north),
        TrajectoryFormat::TVDSS_X_Y => tvdss_x_y_to_all(m, x0, y0, kb, x_north),
        TrajectoryFormat::TVDSS_DX_DY => tvdss_dx_dy_to_all(m, x0, y0, kb, x_north),
    }
}

/// Central angle (radians) and radius of the circular arc with the given arc
/// and chord lengths, by Newton iteration on `chord*a - 2*arc*sin(a/2) = 0`.
///
/// `None` when the arc is not longer than the chord or iteration fails.
pub fn angle_and_radius(arc: f64, chord: f64, eps: f64, max_iter: usize) -> Option<(f64, f64)> {
    if arc <= chord || arc == 0.0 || chord == 0.0 {
        return None;
    }

    let f = |a: f64| chord * a - 2.0 * arc * (a / 2.0).sin();
    let df = |a: f64| chord - arc * (a / 2.0).cos();
    let ddf = |a: f64| arc * (a / 2.0).sin() / 2.0;

    let (a_min, a_max) = (0.0, 2.0 * std::f64::consts::PI);

    // first point past the root where f and f'' agree in sign
    let mut a = a_min;
    while a < a_max && f(a) * ddf(a) <= 0.0 {
        a += 0.1;
    }

    for _ in 0..max_iter {
        let fa = f(a);
        if fa.abs() <= eps {
            return Some((a, arc / a));
        }
        let d = df(a);
        if d == 0.0 {
            return None;
        }
        let mut next = a - fa / d;
        let mut halvings = 0;
        while next <= a_min || next > a_max {
            next = (a + next) / 2.0;
            halvings += 1;
            if halvings == max_iter {
                return None;
            }
        }
        a = next;
    }

    (f(a).abs() <= eps).then(|| (a, arc / a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, s, Axis};

    /// Smooth build-and-turn trajectory, MD 0..3000 in 101 stations, degrees
    fn synthetic_md_az_incl() -> Array2<f64> {
        let n = 101;
        let mut m = Array2::<f64>::zeros((n, 3));
        for i in 0..n {
            let t = i as f64 / (n - 1) as f64;
            m[[i, 0]] = 3000.0 * t;
            m[[i, 1]] = 30.0 + 30.0 * t;
            m[[i, 2]] = 30.0 * t;
        }
        m
    }

    fn frobenius(a: &Array2<f64>) -> f64 {
        a.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    #[test]
    fn test_vertical_well() {
        let m = array![[0.0, 0.0, 0.0], [100.0, 45.0, 0.0], [250.0, 90.0, 0.0]];
        let out = md_az_incl_to_md_x_y_tvd(m.view(), 10.0, 20.0, AngleUnit::Degree, false);
        for i in 0..3 {
            assert!((out[[i, 1]] - 10.0).abs() < 1e-9);
            assert!((out[[i, 2]] - 20.0).abs() < 1e-9);
            assert!((out[[i, 3]] - m[[i, 0]]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_straight_slant_matches_geometry() {
        let (az, inc) = (60f64, 30f64);
        let m = array![[0.0, az, inc], [500.0, az, inc], [1000.0, az, inc]];
        let out = md_az_incl_to_md_x_y_tvd(m.view(), 0.0, 0.0, AngleUnit::Degree, false);
        let (a, i) = (az.to_radians(), inc.to_radians());
        assert!((out[[2, 1]] - 1000.0 * i.sin() * a.sin()).abs() < 1e-6);
        assert!((out[[2, 2]] - 1000.0 * i.sin() * a.cos()).abs() < 1e-6);
        assert!((out[[2, 3]] - 1000.0 * i.cos()).abs() < 1e-6);
    }

    #[test]
    fn test_radian_input_matches_degree_input() {
        let deg = synthetic_md_az_incl();
        let mut rad = deg.clone();
        rad.slice_mut(s![.., 1..]).mapv_inplace(f64::to_radians);
        let a = md_az_incl_to_md_x_y_tvd(deg.view(), 5.0, 6.0, AngleUnit::Degree, false);
        let b = md_az_incl_to_md_x_y_tvd(rad.view(), 5.0, 6.0, AngleUnit::Radian, false);
        assert!(frobenius(&(&a - &b)) < 1e-6);
    }

    #[test]
    fn test_x_north_swaps_axes() {
        let m = synthetic_md_az_incl();
        let (x0, y0) = (1000.0, 2000.0);
        let east = md_az_incl_to_md_x_y_tvd(m.view(), x0, y0, AngleUnit::Degree, false);
        let north = md_az_incl_to_md_x_y_tvd(m.view(), y0, x0, AngleUnit::Degree, true);
        for i in 0..m.nrows() {
            assert!((east[[i, 1]] - north[[i, 2]]).abs() < 1e-9);
            assert!((east[[i, 2]] - north[[i, 1]]).abs() < 1e-9);
            assert!((east[[i, 3]] - north[[i, 3]]).abs() < 1e-9);
        }
    }

    fn round_trip_residual(x_north: bool) -> f64 {
        let m = synthetic_md_az_incl();
        let (x0, y0) = (444.0, 888.0);
        let fwd = md_az_incl_to_md_x_y_tvd(m.view(), x0, y0, AngleUnit::Degree, x_north);

        let mut tvd_x_y = Array2::<f64>::zeros((m.nrows(), 3));
        tvd_x_y.column_mut(0).assign(&fwd.column(3));
        tvd_x_y.column_mut(1).assign(&fwd.column(1));
        tvd_x_y.column_mut(2).assign(&fwd.column(2));

        let inv = tvd_x_y_to_md_az_incl(tvd_x_y.view(), x0, y0, x_north);
        let again = md_az_incl_to_md_x_y_tvd(inv.view(), x0, y0, AngleUnit::Radian, x_north);

        let diff = &fwd.slice(s![.., 1..]) - &again.slice(s![.., 1..]);
        frobenius(&diff) / m[[m.nrows() - 1, 0]]
    }

    #[test]
    fn test_round_trip_through_inverse() {
        assert!(round_trip_residual(false) < 0.05);
        assert!(round_trip_residual(true) < 0.05);
    }

    #[test]
    fn test_alternate_inputs_recover_md() {
        let m = synthetic_md_az_incl();
        let (x0, y0, kb) = (100.0, -50.0, 25.0);
        let md_max = m[[m.nrows() - 1, 0]];
        let fwd = md_az_incl_to_md_x_y_tvd(m.view(), x0, y0, AngleUnit::Degree, false);
        let all = md_az_incl_to_all(m.view(), x0, y0, kb, AngleUnit::Degree, false);
        assert_eq!(all.dim(), (m.nrows(), ALL_COLUMNS));

        let cols = |c: [usize; 3]| {
            let mut t = Array2::<f64>::zeros((m.nrows(), 3));
            for (k, &src) in c.iter().enumerate() {
                t.column_mut(k).assign(&all.column(src));
            }
            t
        };

        let md_err = |out: Array2<f64>| {
            let d = &out.column(0) - &m.column(0);
            d.iter().map(|v| v * v).sum::<f64>().sqrt() / md_max
        };

        assert!(md_err(tvd_x_y_to_md_x_y_tvd(cols([4, 1, 2]).view(), x0, y0, false)) < 0.05);
        assert!(md_err(tvd_dx_dy_to_md_x_y_tvd(cols([4, 5, 6]).view(), x0, y0, false)) < 0.05);
        assert!(md_err(tvdss_x_y_to_md_x_y_tvd(cols([3, 1, 2]).view(), x0, y0, kb, false)) < 0.05);
        assert!(md_err(tvdss_dx_dy_to_md_x_y_tvd(cols([3, 5, 6]).view(), x0, y0, kb, false)) < 0.05);

        let back = tvdss_dx_dy_to_md_x_y_tvd(cols([3, 5, 6]).view(), x0, y0, kb, false);
        let pos = &back.slice(s![.., 1..]) - &fwd.slice(s![.., 1..]);
        assert!(frobenius(&pos.to_owned()) < 1e-6);
    }

    #[test]
    fn test_all_variants_agree_on_layout() {
        let m = synthetic_md_az_incl();
        let (x0, y0, kb) = (1.0, 2.0, 30.0);
        let all = md_az_incl_to_all(m.view(), x0, y0, kb, AngleUnit::Degree, false);
        let mut tvd_x_y = Array2::<f64>::zeros((m.nrows(), 3));
        for (k, src) in [4, 1, 2].into_iter().enumerate() {
            tvd_x_y.column_mut(k).assign(&all.column(src));
        }
        let from_tvd = tvd_x_y_to_all(tvd_x_y.view(), x0, y0, kb, false);
        for c in 1..7 {
            let d = &from_tvd.column(c) - &all.column(c);
            assert!(d.iter().all(|v| v.abs() < 1e-9), "column {}", c);
        }
        assert!((all[[10, 3]] - all[[10, 4]] - kb).abs() < 1e-12);
        assert!((all[[10, 7]] - m[[10, 1]].to_radians()).abs() < 1e-12);

        let mut tvdss_dx_dy = Array2::<f64>::zeros((m.nrows(), 3));
        for (k, src) in [3, 5, 6].into_iter().enumerate() {
            tvdss_dx_dy.column_mut(k).assign(&all.column(src));
        }
        let other = tvdss_dx_dy_to_all(tvdss_dx_dy.view(), x0, y0, kb, false);
        let d = &other.slice(s![.., 1..7]) - &all.slice(s![.., 1..7]);
        assert!(d.iter().all(|v| v.abs() < 1e-9));
        assert_eq!(tvd_dx_dy_to_all(tvdss_dx_dy.view(), x0, y0, kb, false).len_of(Axis(1)), 9);
        assert_eq!(tvdss_x_y_to_all(tvd_x_y.view(), x0, y0, kb, false).nrows(), m.nrows());
    }

    #[test]
    fn test_dispatch_matches_direct_calls() {
        let m = synthetic_md_az_incl();
        let (x0, y0, kb) = (7.0, 8.0, 12.0);
        let direct = md_az_incl_to_all(m.view(), x0, y0, kb, AngleUnit::Degree, true);
        let via = to_all(TrajectoryFormat::MD_AZIM_INCL, m.view(), x0, y0, kb, AngleUnit::Degree, true);
        assert_eq!(direct, via);

        let mut tvdss_x_y = Array2::<f64>::zeros((m.nrows(), 3));
        for (k, src) in [3, 1, 2].into_iter().enumerate() {
            tvdss_x_y.column_mut(k).assign(&direct.column(src));
        }
        let via = to_all(TrajectoryFormat::TVDSS_X_Y, tvdss_x_y.view(), x0, y0, kb, AngleUnit::Radian, true);
        assert_eq!(via, tvdss_x_y_to_all(tvdss_x_y.view(), x0, y0, kb, true));
    }

    #[test]
    fn test_wrong_column_count_gives_empty() {
        let m = Array2::<f64>::zeros((5, 4));
        assert_eq!(md_az_incl_to_md_x_y_tvd(m.view(), 0.0, 0.0, AngleUnit::Radian, false).dim(), (0, 0));
        assert_eq!(tvd_dx_dy_to_md_az_incl(m.view(), true).dim(), (0, 0));
        assert_eq!(tvdss_x_y_to_all(m.view(), 0.0, 0.0, 0.0, false).dim(), (0, 0));
    }

    #[test]
    fn test_angle_and_radius() {
        let (radius, angle) = (100.0, 1.0f64);
        let arc = radius * angle;
        let chord = 2.0 * radius * (angle / 2.0).sin();
        let (a, r) = angle_and_radius(arc, chord, 1e-10, 100).unwrap();
        assert!((a - angle).abs() < 1e-6);
        assert!((r - radius).abs() < 1e-3);

        assert!(angle_and_radius(10.0, 10.0, 1e-10, 100).is_none());
        assert!(angle_and_radius(0.0, 0.0, 1e-10, 100).is_none());
    }
}
