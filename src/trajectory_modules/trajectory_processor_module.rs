use nalgebra::{UnitQuaternion, Vector3};
use serde::{Serialize, Deserialize};
use strum_macros::EnumIter;
use crate::display_modules::render_engine::{PrimitiveGeometry, PrimitiveStyle, VisualPrimitiveKind};
use crate::display_modules::style_config::{ForceSettings, LineStyle, PathSettings};
use crate::robot_modules::robot_kinematics_module::{RobotFKResult, RobotKinematicsModule};
use crate::trajectory_modules::whole_body_trajectory::{WholeBodyState, WholeBodyTrajectory};
use crate::utils::utils_errors::TrajvizError;
use crate::utils::utils_se3::implicit_dual_quaternion::ImplicitDualQuaternion;

/// The independently processed parts of a whole-body trajectory.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, EnumIter)]
pub enum TrajectoryCategory {
    TargetPosture,
    CoM,
    Contact
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessingState {
    Idle,
    Processing
}

/// Decodes whole-body trajectory messages into staged, render-ready data.
///
/// Decoding never touches a render engine.  Each `decode_*` call either returns a complete
/// staging structure, possibly with some samples skipped and reported, or an error that aborts
/// the whole category.  The module also tracks an `Idle -> Processing -> Idle` state per category
/// so a cycle can never start while another cycle of the same category is building pools.
#[derive(Clone, Debug)]
pub struct TrajectoryProcessorModule {
    target_posture_state: ProcessingState,
    com_state: ProcessingState,
    contact_state: ProcessingState
}
impl TrajectoryProcessorModule {
    pub fn new() -> Self {
        Self {
            target_posture_state: ProcessingState::Idle,
            com_state: ProcessingState::Idle,
            contact_state: ProcessingState::Idle
        }
    }
    pub fn state(&self, category: TrajectoryCategory) -> ProcessingState {
        *self.state_ref(category)
    }
    pub fn begin_cycle(&mut self, category: TrajectoryCategory) -> Result<(), TrajvizError> {
        let state = self.state_mut(category);
        if *state == ProcessingState::Processing {
            return Err(TrajvizError::new_unsupported_operation_error("begin_cycle", &format!("A {:?} cycle is already in progress.", category), file!(), line!()));
        }
        *state = ProcessingState::Processing;
        Ok(())
    }
    pub fn end_cycle(&mut self, category: TrajectoryCategory) {
        *self.state_mut(category) = ProcessingState::Idle;
    }
    fn state_ref(&self, category: TrajectoryCategory) -> &ProcessingState {
        match category {
            TrajectoryCategory::TargetPosture => { &self.target_posture_state }
            TrajectoryCategory::CoM => { &self.com_state }
            TrajectoryCategory::Contact => { &self.contact_state }
        }
    }
    fn state_mut(&mut self, category: TrajectoryCategory) -> &mut ProcessingState {
        match category {
            TrajectoryCategory::TargetPosture => { &mut self.target_posture_state }
            TrajectoryCategory::CoM => { &mut self.com_state }
            TrajectoryCategory::Contact => { &mut self.contact_state }
        }
    }

    /// Stages the robot pose of the latest sample and the force arrows of its active contacts.
    ///
    /// Without a loaded model no pose is staged, but arrows still are.  A posture of the wrong
    /// length skips the pose and is reported.
    pub fn decode_target_posture(trajectory: &WholeBodyTrajectory, robot_kinematics_module: Option<&RobotKinematicsModule>) -> Result<DecodeOutcome<TargetPosture>, TrajvizError> {
        let mut outcome = DecodeOutcome::new(TargetPosture::default());
        let sample_idx = match trajectory.num_samples() {
            0 => { return Ok(outcome); }
            n => { n - 1 }
        };
        let state = &trajectory.trajectory()[sample_idx];
        check_sample_is_finite(state, sample_idx)?;

        if let Some(robot_kinematics_module) = robot_kinematics_module {
            match robot_kinematics_module.compute_fk(state.posture()) {
                Ok(fk_result) => { outcome.staged.fk_result = Some(fk_result); }
                Err(e) if e.is_sample_scoped() => { outcome.skipped.push(e); }
                Err(e) => { return Err(e); }
            }
        }

        for contact in state.contacts() {
            if !contact.active() { continue; }
            if let Some(force) = contact.force() {
                if !is_finite_vector3(contact.position()) || !is_finite_vector3(force) {
                    return Err(TrajvizError::new_malformed_sample_error(&format!("contact {:?} has a non-finite position or force", contact.name()), sample_idx, file!(), line!()));
                }
                outcome.staged.force_arrows.push(ForceArrow {
                    origin: contact.position().clone(),
                    force: force.clone()
                });
            }
        }

        Ok(outcome)
    }

    /// Stages one CoM position per usable sample.
    ///
    /// A provided CoM is used as is.  Otherwise the CoM is computed from the posture, which needs
    /// a loaded model; without one the sample is skipped with `MissingOptionalField`.  When a
    /// model is loaded every posture must match its degree of freedom count, otherwise the sample
    /// is skipped with `DimensionMismatch`.
    pub fn decode_com_path(trajectory: &WholeBodyTrajectory, mut robot_kinematics_module: Option<&mut RobotKinematicsModule>) -> Result<DecodeOutcome<SampledPath>, TrajvizError> {
        let mut outcome = DecodeOutcome::new(SampledPath::default());

        for (sample_idx, state) in trajectory.trajectory().iter().enumerate() {
            check_sample_is_finite(state, sample_idx)?;

            if let Some(robot_kinematics_module) = robot_kinematics_module.as_ref() {
                if state.posture().len() != robot_kinematics_module.num_dofs() {
                    outcome.skipped.push(TrajvizError::new_dimension_mismatch_error(&format!("decode_com_path (sample {})", sample_idx), state.posture().len(), robot_kinematics_module.num_dofs(), file!(), line!()));
                    continue;
                }
            }

            let position = match (state.com_position(), robot_kinematics_module.as_mut()) {
                (Some(com_position), _) => { com_position.clone() }
                (None, Some(robot_kinematics_module)) => {
                    match robot_kinematics_module.compute_com(state.posture()) {
                        Ok(com_result) => { com_result.position().clone() }
                        Err(e) if e.is_sample_scoped() => { outcome.skipped.push(e); continue; }
                        Err(e) => { return Err(e); }
                    }
                }
                (None, None) => {
                    outcome.skipped.push(TrajvizError::new_missing_optional_field_error("com_position", sample_idx, file!(), line!()));
                    continue;
                }
            };

            let orientation = state.base_orientation().cloned().unwrap_or_else(UnitQuaternion::identity);
            outcome.staged.push(sample_idx, position, orientation);
        }

        Ok(outcome)
    }

    /// Stages one path per contact name, in order of first appearance, holding only the samples
    /// where that contact is active.
    pub fn decode_contact_paths(trajectory: &WholeBodyTrajectory) -> Result<DecodeOutcome<ContactPaths>, TrajvizError> {
        let mut outcome = DecodeOutcome::new(ContactPaths::default());

        for name in trajectory.contact_names() {
            outcome.staged.paths.push((name, SampledPath::default()));
        }

        for (sample_idx, state) in trajectory.trajectory().iter().enumerate() {
            for contact in state.contacts() {
                if !contact.active() { continue; }
                if !is_finite_vector3(contact.position()) || contact.force().map_or(false, |f| !is_finite_vector3(f)) {
                    return Err(TrajvizError::new_malformed_sample_error(&format!("contact {:?} has a non-finite position or force", contact.name()), sample_idx, file!(), line!()));
                }
                let orientation = contact.orientation().cloned().unwrap_or_else(UnitQuaternion::identity);
                if let Some(path) = outcome.staged.get_path_mut(contact.name()) {
                    path.push(sample_idx, contact.position().clone(), orientation);
                }
            }
        }

        Ok(outcome)
    }
}
impl Default for TrajectoryProcessorModule {
    fn default() -> Self {
        Self::new()
    }
}

/// Staged data plus the samples that were skipped on the way.
#[derive(Clone, Debug)]
pub struct DecodeOutcome<T> {
    staged: T,
    skipped: Vec<TrajvizError>
}
impl <T> DecodeOutcome<T> {
    fn new(staged: T) -> Self {
        Self { staged, skipped: vec![] }
    }
    pub fn staged(&self) -> &T {
        &self.staged
    }
    pub fn skipped(&self) -> &Vec<TrajvizError> {
        &self.skipped
    }
    pub fn into_parts(self) -> (T, Vec<TrajvizError>) {
        (self.staged, self.skipped)
    }
}

#[derive(Clone, Debug, Default)]
pub struct TargetPosture {
    fk_result: Option<RobotFKResult>,
    force_arrows: Vec<ForceArrow>
}
impl TargetPosture {
    pub fn fk_result(&self) -> Option<&RobotFKResult> {
        self.fk_result.as_ref()
    }
    pub fn force_arrows(&self) -> &Vec<ForceArrow> {
        &self.force_arrows
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForceArrow {
    origin: Vector3<f64>,
    force: Vector3<f64>
}
impl ForceArrow {
    pub fn origin(&self) -> &Vector3<f64> {
        &self.origin
    }
    pub fn force(&self) -> &Vector3<f64> {
        &self.force
    }
}

/// Positions and orientations of a tracked point, one entry per usable sample.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampledPath {
    sample_idxs: Vec<usize>,
    positions: Vec<Vector3<f64>>,
    orientations: Vec<UnitQuaternion<f64>>
}
impl SampledPath {
    fn push(&mut self, sample_idx: usize, position: Vector3<f64>, orientation: UnitQuaternion<f64>) {
        self.sample_idxs.push(sample_idx);
        self.positions.push(position);
        self.orientations.push(orientation);
    }
    pub fn len(&self) -> usize {
        self.positions.len()
    }
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
    pub fn sample_idxs(&self) -> &Vec<usize> {
        &self.sample_idxs
    }
    pub fn positions(&self) -> &Vec<Vector3<f64>> {
        &self.positions
    }
    pub fn orientations(&self) -> &Vec<UnitQuaternion<f64>> {
        &self.orientations
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContactPaths {
    paths: Vec<(String, SampledPath)>
}
impl ContactPaths {
    pub fn paths(&self) -> &Vec<(String, SampledPath)> {
        &self.paths
    }
    pub fn get_path(&self, name: &str) -> Option<&SampledPath> {
        self.paths.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }
    fn get_path_mut(&mut self, name: &str) -> Option<&mut SampledPath> {
        self.paths.iter_mut().find(|(n, _)| n == name).map(|(_, p)| p)
    }
}

/// Geometry of a path drawn with `settings.style`, and the primitive kind it needs.  `None`
/// yields no primitives.
///
/// Line element i joins sample i - 1 to sample i, so element 0 is a degenerate segment at the
/// first sample and the element count always equals the sample count.
pub fn path_geometries(path: &SampledPath, settings: &PathSettings) -> Option<(VisualPrimitiveKind, Vec<PrimitiveGeometry>, PrimitiveStyle)> {
    let kind = path_primitive_kind(settings.style)?;
    let geometries = match kind {
        VisualPrimitiveKind::Point => {
            path.positions().iter().map(|p| PrimitiveGeometry::Point { position: p.clone() }).collect()
        }
        _ => {
            let mut geometries = Vec::with_capacity(path.len());
            for (i, p) in path.positions().iter().enumerate() {
                let start = if i == 0 { p.clone() } else { path.positions()[i - 1].clone() };
                geometries.push(PrimitiveGeometry::Line { start, end: p.clone() });
            }
            geometries
        }
    };
    Some((kind, geometries, path_style(settings)))
}

pub fn path_primitive_kind(style: LineStyle) -> Option<VisualPrimitiveKind> {
    match style {
        LineStyle::Billboards | LineStyle::Lines => { Some(VisualPrimitiveKind::Line) }
        LineStyle::Points => { Some(VisualPrimitiveKind::Point) }
        LineStyle::None => { None }
    }
}

pub fn path_style(settings: &PathSettings) -> PrimitiveStyle {
    let size = match settings.style {
        // a zero-width billboard is drawn as a hairline
        LineStyle::Billboards => { settings.line_width }
        LineStyle::Points => { settings.scale }
        LineStyle::Lines | LineStyle::None => { 0.0 }
    };
    PrimitiveStyle::new(settings.color_rgba(), size)
}

pub fn axes_style(settings: &PathSettings) -> PrimitiveStyle {
    PrimitiveStyle::new(settings.color_rgba(), settings.scale)
}

pub fn force_style(settings: &ForceSettings) -> PrimitiveStyle {
    PrimitiveStyle::new_arrow(settings.color.with_alpha(settings.alpha), settings.arrow_geometry)
}

/// One coordinate frame per sample of the path, `settings.scale` long.
pub fn axes_geometries(path: &SampledPath, settings: &PathSettings) -> (Vec<PrimitiveGeometry>, PrimitiveStyle) {
    let geometries = path.positions().iter().zip(path.orientations().iter())
        .map(|(p, o)| PrimitiveGeometry::Axes { pose: ImplicitDualQuaternion::new(o.clone(), p.clone()) })
        .collect();
    (geometries, axes_style(settings))
}

/// Force arrows scaled by the force magnitude relative to `weight`, so an arrow as long as the
/// configured shaft means the contact carries the whole body weight.
pub fn force_arrow_geometries(force_arrows: &Vec<ForceArrow>, weight: f64, settings: &ForceSettings) -> (Vec<PrimitiveGeometry>, PrimitiveStyle) {
    let weight = if weight > 0.0 { weight } else { 1.0 };
    let geometries = force_arrows.iter()
        .map(|a| PrimitiveGeometry::new_arrow(a.origin().clone(), a.force(), a.force().norm() / weight))
        .collect();
    (geometries, force_style(settings))
}

fn check_sample_is_finite(state: &WholeBodyState, sample_idx: usize) -> Result<(), TrajvizError> {
    if !state.time().is_finite() || state.posture().iter().any(|v| !v.is_finite()) {
        return Err(TrajvizError::new_malformed_sample_error("time or posture is not finite", sample_idx, file!(), line!()));
    }
    if let Some(com_position) = state.com_position() {
        if !is_finite_vector3(com_position) {
            return Err(TrajvizError::new_malformed_sample_error("com_position is not finite", sample_idx, file!(), line!()));
        }
    }
    Ok(())
}

fn is_finite_vector3(v: &Vector3<f64>) -> bool {
    v.iter().all(|x| x.is_finite())
}
