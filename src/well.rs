//! Well: head location, identity and the curves recorded along it
//!
//! ```text
//! /<well>            ObjectType=WELL, head_coord, KB, UWI
//!   DEV/<curve>      deviation curves
//!   DEV/ACTIVE       soft link to the active deviation curve
//!   LOG/<type>/<log> log curves, the type level is optional
//! ```
//!
//! Curve names are relative to `DEV` or `LOG`. An absolute name (leading '/')
//! is accepted only if it lies below this well's `DEV` or `LOG` group.

use crate::creation::{create_object, Target};
use crate::devcurve::DevCurve;
use crate::error::{resolved, GeoError, Result};
use crate::logcurve::LogCurve;
use crate::object::{
    attr_f64, attr_floats, attr_text, base_attrs, child_objects, object_type_of, read_base,
    GeoObject, LENGTH_UNITS_ATTR,
};
use crate::params::{DevCurveParam, LogCurveParam, WellParam};
use crate::storage::Group;
use crate::types::{ContainerType, CreationType, ObjectType};
use crate::units::{conversion_factor, to_stored_factor};
use crate::utils::{checked_components, is_successor, relative_path, split_parent, split_path};
use async_trait::async_trait;

pub(crate) const DEV: &str = "DEV";
pub(crate) const LOG: &str = "LOG";
pub(crate) const ACTIVE: &str = "ACTIVE";

const HEAD_COORD_ATTR: &str = "head_coord";
const KB_ATTR: &str = "KB";
const UWI_ATTR: &str = "UWI";

#[derive(Debug, Clone, PartialEq)]
pub struct Well {
    group: Group,
}

#[async_trait]
impl GeoObject for Well {
    const OBJECT_TYPE: ObjectType = ObjectType::WELL;
    const CONTAINER_TYPE: ContainerType = ContainerType::WELL;
    type Param = WellParam;

    fn from_group(group: Group) -> Self {
        Self { group }
    }

    fn group(&self) -> &Group {
        &self.group
    }

    async fn initialize(group: &Group, param: &WellParam) -> Result<()> {
        let mut attrs = base_attrs(&param.base);
        attrs.push((HEAD_COORD_ATTR, vec![param.head_x, param.head_y].into()));
        attrs.push((KB_ATTR, param.kb.into()));
        attrs.push((UWI_ATTR, param.uwi.clone().into()));
        group.set_attrs(attrs).await?;
        group.create_group(DEV).await?;
        group.create_group(LOG).await?;
        Ok(())
    }

    async fn param(&self) -> Result<WellParam> {
        let (head_x, head_y) = self.head_coord("").await?;
        Ok(WellParam {
            head_x,
            head_y,
            kb: self.kb("").await?,
            uwi: self.uwi().await?,
            base: read_base(&self.group).await?,
        })
    }
}

/// Reject names that would land on the active-curve link
fn check_curve_name(name: &str) -> Result<()> {
    match split_path(name).last() {
        Some(&ACTIVE) => Err(GeoError::InvalidName(format!(
            "{} is reserved for the active curve link",
            ACTIVE
        ))),
        _ => Ok(()),
    }
}

/// Absolute names must lie below `owner_path`; no name may climb with `..`
fn check_owned(owner_path: &str, name: &str) -> Result<()> {
    checked_components(name)?;
    if name.starts_with('/') && !is_successor(owner_path, name) {
        return Err(GeoError::OwnershipViolation(format!(
            "{} is not under {}",
            name, owner_path
        )));
    }
    Ok(())
}

impl Well {
    pub async fn dev_group(&self) -> Result<Group> {
        self.group.get_group(DEV).await
    }

    pub async fn log_group(&self) -> Result<Group> {
        self.group.get_group(LOG).await
    }

    pub async fn log_type_group(&self, log_type: &str) -> Result<Option<Group>> {
        let log_g = self.log_group().await?;
        if !log_g.has_group(log_type).await? {
            return Ok(None);
        }
        Ok(Some(log_g.get_group(log_type).await?))
    }

    // -------------------------------------------------------------------------
    // Head, KB, UWI
    // -------------------------------------------------------------------------

    pub async fn length_units(&self) -> Result<String> {
        attr_text(&self.group, LENGTH_UNITS_ATTR).await
    }

    pub async fn head_coord(&self, length_units: &str) -> Result<(f64, f64)> {
        let v = attr_floats(&self.group, HEAD_COORD_ATTR, 2).await?;
        let k = conversion_factor(&self.length_units().await?, length_units)?;
        Ok((v[0] * k, v[1] * k))
    }

    pub async fn set_head_coord(&self, head: (f64, f64), length_units: &str) -> Result<()> {
        let k = to_stored_factor(length_units, &self.length_units().await?)?;
        self.group
            .set_attr(HEAD_COORD_ATTR, vec![head.0 * k, head.1 * k])
            .await
    }

    pub async fn kb(&self, length_units: &str) -> Result<f64> {
        let kb = attr_f64(&self.group, KB_ATTR).await?;
        Ok(kb * conversion_factor(&self.length_units().await?, length_units)?)
    }

    pub async fn set_kb(&self, kb: f64, length_units: &str) -> Result<()> {
        let k = to_stored_factor(length_units, &self.length_units().await?)?;
        self.group.set_attr(KB_ATTR, kb * k).await
    }

    pub async fn uwi(&self) -> Result<String> {
        attr_text(&self.group, UWI_ATTR).await
    }

    pub async fn set_uwi(&self, uwi: &str) -> Result<()> {
        self.group.set_attr(UWI_ATTR, uwi).await
    }

    // -------------------------------------------------------------------------
    // Deviation curves
    // -------------------------------------------------------------------------

    /// Create or open a deviation curve; `None` when the name is invalid,
    /// belongs to another well or holds another object type
    pub async fn create_dev_curve(
        &self,
        name: &str,
        param: &DevCurveParam,
        policy: CreationType,
    ) -> Result<Option<DevCurve>> {
        resolved(self.try_create_dev_curve(name, param, policy).await)
    }

    pub async fn try_create_dev_curve(
        &self,
        name: &str,
        param: &DevCurveParam,
        policy: CreationType,
    ) -> Result<DevCurve> {
        let dev_g = self.dev_group().await?;
        check_owned(&dev_g.path(), name)?;
        check_curve_name(name)?;
        let curve: DevCurve = create_object(&dev_g, Target::Path(name), param, policy).await?;
        if param.set_active {
            self.set_active_dev_curve(&curve).await?;
        }
        Ok(curve)
    }

    /// Same as [`Well::create_dev_curve`] for a group that must lie below `DEV`
    pub async fn create_dev_curve_in(
        &self,
        group: &Group,
        param: &DevCurveParam,
        policy: CreationType,
    ) -> Result<Option<DevCurve>> {
        let created = async {
            let dev_g = self.dev_group().await?;
            if !is_successor(&dev_g.path(), &group.path()) {
                return Err(GeoError::OwnershipViolation(format!(
                    "{} is not under {}",
                    group.path(),
                    dev_g.path()
                )));
            }
            check_curve_name(&group.name())?;
            let curve: DevCurve = create_object(&dev_g, Target::Group(group), param, policy).await?;
            if param.set_active {
                self.set_active_dev_curve(&curve).await?;
            }
            Ok(curve)
        }
        .await;
        resolved(created)
    }

    pub async fn dev_curve(&self, name: &str) -> Result<Option<DevCurve>> {
        let opened = async {
            let dev_g = self.dev_group().await?;
            check_owned(&dev_g.path(), name)?;
            DevCurve::open(dev_g.get_group(name).await?).await
        }
        .await;
        resolved(opened)
    }

    /// Point `DEV/ACTIVE` at `curve`, replacing any previous active curve
    pub async fn set_active_dev_curve(&self, curve: &DevCurve) -> Result<()> {
        let dev_g = self.dev_group().await?;
        if !is_successor(&dev_g.path(), &curve.path()) {
            return Err(GeoError::OwnershipViolation(format!(
                "{} does not belong to well {}",
                curve.path(),
                self.name()
            )));
        }
        check_curve_name(&curve.name())?;
        if dev_g.link_target(ACTIVE).await?.is_some() {
            dev_g.unlink(ACTIVE).await?;
        }
        dev_g.create_link(ACTIVE, curve.group()).await?;
        tracing::debug!("well {} active deviation curve is now {}", self.name(), curve.path());
        Ok(())
    }

    pub async fn active_dev_curve(&self) -> Result<Option<DevCurve>> {
        let dev_g = self.dev_group().await?;
        if dev_g.link_target(ACTIVE).await?.is_none() {
            return Ok(None);
        }
        let opened = async { DevCurve::open(dev_g.get_group(ACTIVE).await?).await }.await;
        resolved(opened)
    }

    pub async fn dev_curves(&self) -> Result<Vec<DevCurve>> {
        let dev_g = self.dev_group().await?;
        Ok(child_objects(&dev_g, ObjectType::DEVCURVE, true)
            .await?
            .into_iter()
            .map(DevCurve::from_group)
            .collect())
    }

    /// Curve names relative to `DEV`
    pub async fn dev_curve_names(&self) -> Result<Vec<String>> {
        let dev_path = self.dev_group().await?.path();
        Ok(self
            .dev_curves()
            .await?
            .iter()
            .filter_map(|c| relative_path(&dev_path, &c.path()))
            .collect())
    }

    pub async fn dev_curve_count(&self) -> Result<usize> {
        Ok(self.dev_curves().await?.len())
    }

    // -------------------------------------------------------------------------
    // Log curves
    // -------------------------------------------------------------------------

    /// Create or open `LOG/<log_type>/<log_name>`; an empty type puts the curve
    /// directly under `LOG`
    pub async fn create_log_curve(
        &self,
        log_type: &str,
        log_name: &str,
        param: &LogCurveParam,
        policy: CreationType,
    ) -> Result<Option<LogCurve>> {
        resolved(self.try_create_log_curve(log_type, log_name, param, policy).await)
    }

    pub async fn try_create_log_curve(
        &self,
        log_type: &str,
        log_name: &str,
        param: &LogCurveParam,
        policy: CreationType,
    ) -> Result<LogCurve> {
        let log_g = self.log_group().await?;
        check_owned(&log_g.path(), log_type)?;
        if log_type.starts_with('/') {
            check_owned(log_type, log_name)?;
        } else {
            check_owned(&log_g.path(), log_name)?;
        }

        if log_type.is_empty() {
            return create_object(&log_g, Target::Path(log_name), param, policy).await;
        }
        if policy == CreationType::OPEN && !log_g.has_group(log_type).await? {
            return Err(GeoError::NotFound(format!("log type {}", log_type)));
        }
        let type_g = log_g.create_group(log_type).await?;
        if object_type_of(&type_g).await?.is_some() {
            return Err(GeoError::TypeMismatch(format!(
                "{} is an object, not a log type",
                type_g.path()
            )));
        }
        create_object(&type_g, Target::Path(log_name), param, policy).await
    }

    pub async fn create_log_curve_in(
        &self,
        group: &Group,
        param: &LogCurveParam,
        policy: CreationType,
    ) -> Result<Option<LogCurve>> {
        let created = async {
            let log_g = self.log_group().await?;
            if !is_successor(&log_g.path(), &group.path()) {
                return Err(GeoError::OwnershipViolation(format!(
                    "{} is not under {}",
                    group.path(),
                    log_g.path()
                )));
            }
            create_object(&log_g, Target::Group(group), param, policy).await
        }
        .await;
        resolved(created)
    }

    /// Log curve by type and name, or by a path relative to `LOG` when the
    /// type is empty
    pub async fn log_curve(&self, log_type: &str, log_name: &str) -> Result<Option<LogCurve>> {
        let opened = async {
            let log_g = self.log_group().await?;
            let path = if log_type.is_empty() {
                check_owned(&log_g.path(), log_name)?;
                log_name.to_string()
            } else {
                check_owned(&log_g.path(), log_type)?;
                if log_name.starts_with('/') {
                    check_owned(&log_g.path(), log_name)?;
                    log_name.to_string()
                } else {
                    format!("{}/{}", log_type.trim_end_matches('/'), log_name)
                }
            };
            LogCurve::open(log_g.get_group(&path).await?).await
        }
        .await;
        resolved(opened)
    }

    pub async fn log_curves(&self) -> Result<Vec<LogCurve>> {
        let log_g = self.log_group().await?;
        Ok(child_objects(&log_g, ObjectType::LOGCURVE, true)
            .await?
            .into_iter()
            .map(LogCurve::from_group)
            .collect())
    }

    /// Curve names relative to `LOG`, `type/name` for typed curves
    pub async fn log_curve_names(&self) -> Result<Vec<String>> {
        let log_path = self.log_group().await?.path();
        Ok(self
            .log_curves()
            .await?
            .iter()
            .filter_map(|c| relative_path(&log_path, &c.path()))
            .collect())
    }

    pub async fn log_curve_count(&self) -> Result<usize> {
        Ok(self.log_curves().await?.len())
    }

    /// Plain groups directly under `LOG`
    pub async fn log_types(&self) -> Result<Vec<String>> {
        let mut types = Vec::new();
        for g in self.log_group().await?.child_groups().await? {
            if object_type_of(&g).await?.is_none() {
                types.push(split_parent(&g.path()).1);
            }
        }
        types.sort();
        Ok(types)
    }
}
