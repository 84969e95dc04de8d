use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;
use instant::Instant;
use serde::{Serialize, Deserialize};
use crate::display_modules::render_engine::{PrimitiveStyle, RenderEngine, VisualPrimitiveKind};
use crate::display_modules::style_config::{PathSettings, StyleChange, StyleConfig, StyleGroup, StyleSettings};
use crate::display_modules::visual_primitive_pool::VisualPrimitivePool;
use crate::robot_modules::robot_kinematics_module::RobotKinematicsModule;
use crate::robot_modules::robot_model_module::BaseMobilityMode;
use crate::trajectory_modules::trajectory_processor_module::{axes_geometries, axes_style, force_arrow_geometries, force_style, path_geometries, path_primitive_kind, path_style, ContactPaths, SampledPath, TrajectoryCategory, TrajectoryProcessorModule};
use crate::trajectory_modules::whole_body_trajectory::WholeBodyTrajectory;
use crate::utils::utils_console::{trajviz_print, trajviz_print_error, trajviz_print_warning, PrintColor, PrintMode};
use crate::utils::utils_errors::TrajvizError;

/// What the operator sees next to a category in a settings panel.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum DisplayStatus {
    Ok,
    Warn(String),
    Error(String)
}
impl DisplayStatus {
    pub fn is_ok(&self) -> bool {
        *self == DisplayStatus::Ok
    }
}

/// Displays a `WholeBodyTrajectory`: the target posture of the robot with its contact forces,
/// the center of mass path and one path per contact.
///
/// Messages arrive through `on_message` or through the channel returned by `message_sender`;
/// queued messages wait for the next `update`.  Style edits go through `style_config_mut` and
/// take effect as soon as the returned `StyleConfigEdit` is dropped, so pools are never resized
/// while a setting changes and disabling a category empties its pools right away.  Each
/// category is processed on its own; a failure in one leaves the last good render of that
/// category in place and never touches the others.
///
/// # Example
/// ```
/// use nalgebra::{DVector, Vector3};
/// use trajviz::display_modules::recording_render_engine::RecordingRenderEngine;
/// use trajviz::display_modules::style_config::{LineStyle, StyleSettings};
/// use trajviz::display_modules::whole_body_trajectory_display::WholeBodyTrajectoryDisplay;
/// use trajviz::trajectory_modules::whole_body_trajectory::{WholeBodyState, WholeBodyTrajectory};
///
/// let mut display = WholeBodyTrajectoryDisplay::new(RecordingRenderEngine::new(), StyleSettings::default());
/// display.on_message(WholeBodyTrajectory::new(vec![
///     WholeBodyState::new(0.0, DVector::zeros(6)).with_com_position(Vector3::new(0.0, 0.0, 0.9)),
///     WholeBodyState::new(0.1, DVector::zeros(6)).with_com_position(Vector3::new(0.1, 0.0, 0.9)),
/// ]));
/// assert_eq!(display.com_pool_len(), 2);
///
/// display.style_config_mut().set_com_style(LineStyle::None);
/// assert_eq!(display.com_pool_len(), 0);
/// ```
pub struct WholeBodyTrajectoryDisplay<R: RenderEngine> {
    render_engine: R,
    style_config: StyleConfig,
    style_change_receiver: Receiver<StyleChange>,
    message_sender: Sender<WholeBodyTrajectory>,
    message_receiver: Receiver<WholeBodyTrajectory>,
    robot_kinematics_module: Option<RobotKinematicsModule>,
    robot_visual_loaded: bool,
    trajectory_processor_module: TrajectoryProcessorModule,
    last_message: Option<WholeBodyTrajectory>,
    enabled: bool,
    force_pool: VisualPrimitivePool,
    com_pool: VisualPrimitivePool,
    com_axes_pool: VisualPrimitivePool,
    contact_pools: Vec<(String, VisualPrimitivePool)>,
    contact_axes_pools: Vec<(String, VisualPrimitivePool)>,
    statuses: HashMap<TrajectoryCategory, DisplayStatus>,
    last_cycle_durations: HashMap<TrajectoryCategory, Duration>,
    robot_model_status: DisplayStatus
}
impl <R: RenderEngine> WholeBodyTrajectoryDisplay<R> {
    pub fn new(render_engine: R, style_settings: StyleSettings) -> Self {
        let mut style_config = StyleConfig::new(style_settings);
        let (style_change_sender, style_change_receiver) = mpsc::channel();
        for group in [StyleGroup::Target, StyleGroup::Force, StyleGroup::CoM, StyleGroup::Contact] {
            let sender = style_change_sender.clone();
            style_config.register_listener(group, Box::new(move |change: &StyleChange| { let _ = sender.send(change.clone()); }));
        }
        let (message_sender, message_receiver) = mpsc::channel();

        let settings = style_config.settings().clone();
        let mut out_self = Self {
            render_engine,
            style_config,
            style_change_receiver,
            message_sender,
            message_receiver,
            robot_kinematics_module: None,
            robot_visual_loaded: false,
            trajectory_processor_module: TrajectoryProcessorModule::new(),
            last_message: None,
            enabled: true,
            force_pool: VisualPrimitivePool::new(VisualPrimitiveKind::Arrow, force_style(&settings.force)),
            com_pool: VisualPrimitivePool::new(path_primitive_kind(settings.com.style).unwrap_or(VisualPrimitiveKind::Line), path_style(&settings.com)),
            com_axes_pool: VisualPrimitivePool::new(VisualPrimitiveKind::Axes, axes_style(&settings.com)),
            contact_pools: vec![],
            contact_axes_pools: vec![],
            statuses: HashMap::new(),
            last_cycle_durations: HashMap::new(),
            robot_model_status: DisplayStatus::Ok
        };

        if !settings.target.robot_description.is_empty() {
            let _ = out_self.load_robot_model(&settings.target.robot_description, settings.target.base_mobility_mode.clone());
        }

        out_self
    }

    pub fn render_engine(&self) -> &R {
        &self.render_engine
    }
    pub fn render_engine_mut(&mut self) -> &mut R {
        &mut self.render_engine
    }
    pub fn style_config(&self) -> &StyleConfig {
        &self.style_config
    }
    /// Edits made through the returned guard are applied when it is dropped.
    pub fn style_config_mut(&mut self) -> StyleConfigEdit<'_, R> {
        StyleConfigEdit { display: self }
    }
    /// A sender a transport can push decoded messages into.  Queued messages are processed in
    /// arrival order by `update`.
    pub fn message_sender(&self) -> Sender<WholeBodyTrajectory> {
        self.message_sender.clone()
    }
    pub fn robot_kinematics_module(&self) -> Option<&RobotKinematicsModule> {
        self.robot_kinematics_module.as_ref()
    }
    pub fn last_message(&self) -> Option<&WholeBodyTrajectory> {
        self.last_message.as_ref()
    }
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
    pub fn status(&self, category: TrajectoryCategory) -> DisplayStatus {
        self.statuses.get(&category).cloned().unwrap_or(DisplayStatus::Ok)
    }
    /// Wall time of the most recent processing cycle of `category`.
    pub fn last_cycle_duration(&self, category: TrajectoryCategory) -> Option<Duration> {
        self.last_cycle_durations.get(&category).copied()
    }
    pub fn robot_model_status(&self) -> &DisplayStatus {
        &self.robot_model_status
    }

    pub fn force_pool(&self) -> &VisualPrimitivePool {
        &self.force_pool
    }
    pub fn com_pool(&self) -> &VisualPrimitivePool {
        &self.com_pool
    }
    pub fn com_axes_pool(&self) -> &VisualPrimitivePool {
        &self.com_axes_pool
    }
    pub fn contact_pool(&self, contact_name: &str) -> Option<&VisualPrimitivePool> {
        self.contact_pools.iter().find(|(n, _)| n == contact_name).map(|(_, p)| p)
    }
    pub fn contact_axes_pool(&self, contact_name: &str) -> Option<&VisualPrimitivePool> {
        self.contact_axes_pools.iter().find(|(n, _)| n == contact_name).map(|(_, p)| p)
    }
    pub fn contact_names(&self) -> Vec<String> {
        self.contact_pools.iter().map(|(n, _)| n.clone()).collect()
    }
    pub fn force_pool_len(&self) -> usize {
        self.force_pool.len()
    }
    pub fn com_pool_len(&self) -> usize {
        self.com_pool.len()
    }
    pub fn com_axes_pool_len(&self) -> usize {
        self.com_axes_pool.len()
    }
    pub fn contact_pool_len(&self, contact_name: &str) -> usize {
        self.contact_pool(contact_name).map_or(0, |p| p.len())
    }
    pub fn contact_axes_pool_len(&self, contact_name: &str) -> usize {
        self.contact_axes_pool(contact_name).map_or(0, |p| p.len())
    }

    /// Entry point for a newly received message.  Pending style edits are applied first, then
    /// every category is rebuilt from the message, which is cached for later rebuilds.
    pub fn on_message(&mut self, message: WholeBodyTrajectory) {
        self.apply_pending_style_changes();
        self.last_message = Some(message);
        if self.enabled {
            self.process_all();
        }
    }
    /// Applies pending style edits, then processes queued messages in arrival order.
    pub fn update(&mut self) {
        self.flush_style_changes();
        let messages: Vec<WholeBodyTrajectory> = self.message_receiver.try_iter().collect();
        for message in messages {
            self.last_message = Some(message);
            if self.enabled { self.process_all(); }
        }
    }
    /// Destroys every drawn object and forgets the last message.  The robot model stays loaded.
    pub fn reset(&mut self) {
        self.destroy_objects();
        self.last_message = None;
        self.statuses.clear();
        self.last_cycle_durations.clear();
    }
    pub fn on_enable(&mut self) {
        self.enabled = true;
        self.apply_pending_style_changes();
        self.process_all();
    }
    pub fn on_disable(&mut self) {
        self.enabled = false;
        self.destroy_objects();
    }
    /// Redraws everything from the cached message, e.g. after the reference frame of the host
    /// changed.
    pub fn fixed_frame_changed(&mut self) {
        if self.enabled {
            self.process_all();
        }
    }

    /// Builds a new kinematic model from `robot_description`.  On failure the previous model,
    /// if any, stays active.  An empty description unloads the model.
    pub fn load_robot_model(&mut self, robot_description: &str, base_mobility_mode: BaseMobilityMode) -> Result<(), TrajvizError> {
        if robot_description.trim().is_empty() {
            self.clear_robot_model();
            self.robot_model_status = DisplayStatus::Warn("No robot description is set.".to_string());
            return Ok(());
        }

        let robot_kinematics_module = match RobotKinematicsModule::new_from_urdf_string(robot_description, base_mobility_mode) {
            Ok(m) => { m }
            Err(e) => {
                trajviz_print_error(&format!("Could not load robot description, keeping the previous model.  {}", e));
                self.robot_model_status = DisplayStatus::Error(e.message().to_string());
                return Err(e);
            }
        };

        self.clear_robot_model();
        trajviz_print(&format!("Loaded robot {:?} with {} degrees of freedom.", robot_kinematics_module.robot_model_module().robot_name(), robot_kinematics_module.num_dofs()), PrintMode::Println, PrintColor::Cyan, false);
        self.robot_kinematics_module = Some(robot_kinematics_module);
        self.robot_model_status = DisplayStatus::Ok;
        if self.enabled && self.style_config.settings().target.enabled {
            self.load_robot_visual();
        }

        Ok(())
    }
    fn clear_robot_model(&mut self) {
        if self.robot_visual_loaded {
            self.render_engine.clear_robot_visual();
            self.robot_visual_loaded = false;
        }
        self.robot_kinematics_module = None;
    }
    fn load_robot_visual(&mut self) {
        if self.robot_visual_loaded { return; }
        let robot_kinematics_module = match &self.robot_kinematics_module {
            Some(m) => { m }
            None => { return; }
        };
        match self.render_engine.load_robot_visual(robot_kinematics_module.robot_model_module()) {
            Ok(_) => {
                self.robot_visual_loaded = true;
                self.render_engine.set_robot_visual_style(&self.style_config.settings().target.robot_visual_style());
            }
            Err(e) => {
                self.robot_model_status = DisplayStatus::Error(e.message().to_string());
                trajviz_print_error(&format!("Render engine could not load the robot visual.  {}", e));
            }
        }
    }

    fn destroy_objects(&mut self) {
        let engine: &mut dyn RenderEngine = &mut self.render_engine;
        self.force_pool.clear(engine);
        self.com_pool.clear(engine);
        self.com_axes_pool.clear(engine);
        for (_, pool) in self.contact_pools.iter_mut() { pool.clear(engine); }
        for (_, pool) in self.contact_axes_pools.iter_mut() { pool.clear(engine); }
        self.contact_pools.clear();
        self.contact_axes_pools.clear();
        if self.robot_visual_loaded {
            engine.clear_robot_visual();
            self.robot_visual_loaded = false;
        }
    }

    /// Applies pending style edits and rebuilds the categories that need it from the cached
    /// message.
    fn flush_style_changes(&mut self) {
        let dirty = self.apply_pending_style_changes();
        if self.enabled {
            for category in dirty { self.process_category(category); }
        }
    }
    /// Drains the style change queue.  Restyles are applied right away; the categories that need
    /// a structural rebuild are returned.
    fn apply_pending_style_changes(&mut self) -> Vec<TrajectoryCategory> {
        let changes: Vec<StyleChange> = self.style_change_receiver.try_iter().collect();
        let mut dirty = vec![];
        for change in changes {
            if let Some(category) = self.apply_style_change(&change) {
                if !dirty.contains(&category) { dirty.push(category); }
            }
            if let StyleChange::RobotDescription { .. } = change {
                if !dirty.contains(&TrajectoryCategory::CoM) { dirty.push(TrajectoryCategory::CoM); }
            }
        }
        dirty
    }
    fn apply_style_change(&mut self, change: &StyleChange) -> Option<TrajectoryCategory> {
        let settings = self.style_config.settings().clone();
        match change {
            StyleChange::RobotDescription { robot_description, base_mobility_mode } => {
                let _ = self.load_robot_model(robot_description, base_mobility_mode.clone());
                return Some(TrajectoryCategory::TargetPosture);
            }
            StyleChange::RobotVisualVisible(_) | StyleChange::RobotCollisionVisible(_) | StyleChange::RobotAlpha(_) => {
                self.render_engine.set_robot_visual_style(&settings.target.robot_visual_style());
                return None;
            }
            StyleChange::ForceColorAndAlpha { .. } | StyleChange::ForceArrowGeometry(_) => {
                let res = self.force_pool.restyle(&force_style(&settings.force), &mut self.render_engine);
                self.handle_restyle_result(TrajectoryCategory::TargetPosture, res);
                return None;
            }
            StyleChange::CoMLineProperties { .. } => {
                let res = self.com_pool.restyle(&path_style(&settings.com), &mut self.render_engine)
                    .and_then(|_| self.com_axes_pool.restyle(&axes_style(&settings.com), &mut self.render_engine));
                self.handle_restyle_result(TrajectoryCategory::CoM, res);
                return None;
            }
            StyleChange::ContactLineProperties { .. } => {
                let mut res = Ok(());
                for (_, pool) in self.contact_pools.iter_mut() {
                    res = res.and_then(|_| pool.restyle(&path_style(&settings.contact), &mut self.render_engine));
                }
                for (_, pool) in self.contact_axes_pools.iter_mut() {
                    res = res.and_then(|_| pool.restyle(&axes_style(&settings.contact), &mut self.render_engine));
                }
                self.handle_restyle_result(TrajectoryCategory::Contact, res);
                return None;
            }
            _ => {}
        }

        if !change.is_structural() { return None; }
        return match change.group() {
            StyleGroup::Target | StyleGroup::Force => { Some(TrajectoryCategory::TargetPosture) }
            StyleGroup::CoM => { Some(TrajectoryCategory::CoM) }
            StyleGroup::Contact => { Some(TrajectoryCategory::Contact) }
        }
    }
    fn handle_restyle_result(&mut self, category: TrajectoryCategory, res: Result<(), TrajvizError>) {
        if let Err(e) = res {
            self.clear_category(category);
            self.report_error(category, &e);
        }
    }

    fn process_all(&mut self) {
        self.process_category(TrajectoryCategory::TargetPosture);
        self.process_category(TrajectoryCategory::CoM);
        self.process_category(TrajectoryCategory::Contact);
    }
    fn process_category(&mut self, category: TrajectoryCategory) {
        if let Err(e) = self.trajectory_processor_module.begin_cycle(category) {
            trajviz_print_warning(e.message());
            return;
        }
        let start = Instant::now();
        match category {
            TrajectoryCategory::TargetPosture => { self.process_target_posture(); }
            TrajectoryCategory::CoM => { self.process_com(); }
            TrajectoryCategory::Contact => { self.process_contact(); }
        }
        self.last_cycle_durations.insert(category, start.elapsed());
        self.trajectory_processor_module.end_cycle(category);
    }
    fn clear_category(&mut self, category: TrajectoryCategory) {
        let engine: &mut dyn RenderEngine = &mut self.render_engine;
        match category {
            TrajectoryCategory::TargetPosture => {
                self.force_pool.clear(engine);
            }
            TrajectoryCategory::CoM => {
                self.com_pool.clear(engine);
                self.com_axes_pool.clear(engine);
            }
            TrajectoryCategory::Contact => {
                for (_, pool) in self.contact_pools.iter_mut() { pool.clear(engine); }
                for (_, pool) in self.contact_axes_pools.iter_mut() { pool.clear(engine); }
                self.contact_pools.clear();
                self.contact_axes_pools.clear();
            }
        }
    }

    fn process_target_posture(&mut self) {
        let category = TrajectoryCategory::TargetPosture;
        let settings = self.style_config.settings().clone();
        if !self.enabled || !settings.target.enabled {
            self.clear_category(category);
            if self.robot_visual_loaded {
                self.render_engine.clear_robot_visual();
                self.robot_visual_loaded = false;
            }
            self.statuses.insert(category, DisplayStatus::Ok);
            return;
        }
        self.load_robot_visual();

        let message = match &self.last_message {
            Some(m) => { m }
            None => { return; }
        };
        let outcome = match TrajectoryProcessorModule::decode_target_posture(message, self.robot_kinematics_module.as_ref()) {
            Ok(o) => { o }
            Err(e) => { self.report_error(category, &e); return; }
        };
        let (target_posture, skipped) = outcome.into_parts();

        let mut errors = vec![];
        if let Some(fk_result) = target_posture.fk_result() {
            if self.robot_visual_loaded {
                if let Err(e) = self.render_engine.set_robot_link_poses(fk_result) { errors.push(e); }
            }
        }

        if settings.force.enabled {
            let weight = self.robot_kinematics_module.as_ref().map_or(1.0, |m| m.total_weight());
            let (geometries, style) = force_arrow_geometries(target_posture.force_arrows(), weight, &settings.force);
            if let Err(e) = self.force_pool.assign(&geometries, &style, &mut self.render_engine) { errors.push(e); }
        } else {
            self.force_pool.clear(&mut self.render_engine);
        }

        self.finish_cycle(category, skipped, errors);
    }

    fn process_com(&mut self) {
        let category = TrajectoryCategory::CoM;
        let settings = self.style_config.settings().com.clone();
        if !self.enabled || !settings.enabled {
            self.clear_category(category);
            self.statuses.insert(category, DisplayStatus::Ok);
            return;
        }

        let message = match &self.last_message {
            Some(m) => { m }
            None => { return; }
        };
        let outcome = match TrajectoryProcessorModule::decode_com_path(message, self.robot_kinematics_module.as_mut()) {
            Ok(o) => { o }
            Err(e) => { self.report_error(category, &e); return; }
        };
        let (path, skipped) = outcome.into_parts();

        let mut errors = vec![];
        if let Err(e) = render_path(&mut self.com_pool, &path, &settings, &mut self.render_engine) { errors.push(e); }
        if let Err(e) = render_axes(&mut self.com_axes_pool, &path, &settings, &mut self.render_engine) { errors.push(e); }

        self.finish_cycle(category, skipped, errors);
    }

    fn process_contact(&mut self) {
        let category = TrajectoryCategory::Contact;
        let settings = self.style_config.settings().contact.clone();
        if !self.enabled || !settings.enabled {
            self.clear_category(category);
            self.statuses.insert(category, DisplayStatus::Ok);
            return;
        }

        let message = match &self.last_message {
            Some(m) => { m }
            None => { return; }
        };
        let outcome = match TrajectoryProcessorModule::decode_contact_paths(message) {
            Ok(o) => { o }
            Err(e) => { self.report_error(category, &e); return; }
        };
        let (contact_paths, skipped) = outcome.into_parts();

        let mut errors = vec![];
        let engine: &mut dyn RenderEngine = &mut self.render_engine;
        let default_kind = path_primitive_kind(settings.style).unwrap_or(VisualPrimitiveKind::Line);
        self.contact_pools = rebuild_named_pools(std::mem::take(&mut self.contact_pools), &contact_paths, default_kind, engine, &mut errors, |pool, path, engine| {
            render_path(pool, path, &settings, engine)
        });
        self.contact_axes_pools = rebuild_named_pools(std::mem::take(&mut self.contact_axes_pools), &contact_paths, VisualPrimitiveKind::Axes, engine, &mut errors, |pool, path, engine| {
            render_axes(pool, path, &settings, engine)
        });

        self.finish_cycle(category, skipped, errors);
    }

    fn finish_cycle(&mut self, category: TrajectoryCategory, skipped: Vec<TrajvizError>, errors: Vec<TrajvizError>) {
        if let Some(e) = errors.first() {
            self.report_error(category, e);
            return;
        }
        if skipped.is_empty() {
            self.statuses.insert(category, DisplayStatus::Ok);
            return;
        }
        for e in &skipped {
            trajviz_print_warning(&format!("{:?}: skipped a sample.  {}", category, e));
        }
        let message = format!("{} sample(s) skipped.  First: {}", skipped.len(), skipped[0].message());
        self.statuses.insert(category, DisplayStatus::Warn(message));
    }
    fn report_error(&mut self, category: TrajectoryCategory, e: &TrajvizError) {
        trajviz_print_error(&format!("{:?}: {}", category, e));
        self.statuses.insert(category, DisplayStatus::Error(e.message().to_string()));
    }
}
impl <R: RenderEngine> Drop for WholeBodyTrajectoryDisplay<R> {
    fn drop(&mut self) {
        self.destroy_objects();
    }
}

/// Mutable access to the `StyleConfig` of a display.  Dropping it applies every edit made
/// through it: restyles in place, rebuilds of the categories whose structure changed.
pub struct StyleConfigEdit<'a, R: RenderEngine> {
    display: &'a mut WholeBodyTrajectoryDisplay<R>
}
impl <'a, R: RenderEngine> Deref for StyleConfigEdit<'a, R> {
    type Target = StyleConfig;

    fn deref(&self) -> &Self::Target {
        &self.display.style_config
    }
}
impl <'a, R: RenderEngine> DerefMut for StyleConfigEdit<'a, R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.display.style_config
    }
}
impl <'a, R: RenderEngine> Drop for StyleConfigEdit<'a, R> {
    fn drop(&mut self) {
        self.display.flush_style_changes();
    }
}

/// Places a path into `pool`, switching the pool's primitive kind when the line style needs a
/// different one.  Style `None` leaves the pool empty.
fn render_path(pool: &mut VisualPrimitivePool, path: &SampledPath, settings: &PathSettings, render_engine: &mut dyn RenderEngine) -> Result<(), TrajvizError> {
    return match path_geometries(path, settings) {
        None => {
            pool.clear(render_engine);
            Ok(())
        }
        Some((kind, geometries, style)) => {
            if pool.kind() != kind {
                pool.clear(render_engine);
                *pool = VisualPrimitivePool::new(kind, style.clone());
            }
            pool.assign(&geometries, &style, render_engine)
        }
    }
}

fn render_axes(pool: &mut VisualPrimitivePool, path: &SampledPath, settings: &PathSettings, render_engine: &mut dyn RenderEngine) -> Result<(), TrajvizError> {
    if !settings.axes_enabled {
        pool.clear(render_engine);
        return Ok(());
    }
    let (geometries, style) = axes_geometries(path, settings);
    pool.assign(&geometries, &style, render_engine)
}

/// Matches `old_pools` to the staged contact paths by name, renders every path into its pool and
/// clears the pools of contacts that disappeared.  The result follows the staged order.
fn rebuild_named_pools<F>(mut old_pools: Vec<(String, VisualPrimitivePool)>,
                          contact_paths: &ContactPaths,
                          kind: VisualPrimitiveKind,
                          render_engine: &mut dyn RenderEngine,
                          errors: &mut Vec<TrajvizError>,
                          mut render: F) -> Vec<(String, VisualPrimitivePool)>
    where F: FnMut(&mut VisualPrimitivePool, &SampledPath, &mut dyn RenderEngine) -> Result<(), TrajvizError> {
    let mut out_vec = vec![];
    for (name, path) in contact_paths.paths() {
        let mut pool = match old_pools.iter().position(|(n, _)| n == name) {
            Some(idx) => { old_pools.remove(idx).1 }
            None => { VisualPrimitivePool::new(kind, PrimitiveStyle::default()) }
        };
        if let Err(e) = render(&mut pool, path, render_engine) { errors.push(e); }
        out_vec.push((name.clone(), pool));
    }
    for (_, pool) in old_pools.iter_mut() { pool.clear(render_engine); }
    out_vec
}
