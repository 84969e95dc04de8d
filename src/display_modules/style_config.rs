use std::fmt::{Debug, Formatter};
use serde::{Serialize, Deserialize};
use strum_macros::EnumIter;
use crate::display_modules::render_engine::{ArrowGeometry, ColorRGBA, RobotVisualStyle};
use crate::robot_modules::robot_model_module::BaseMobilityMode;
use crate::utils::utils_enums::EnumUtils;
use crate::utils::utils_errors::TrajvizError;
use crate::utils::utils_traits::{load_object_from_json_string, ToAndFromRonString};

/// How a CoM or contact path is drawn.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, EnumIter)]
pub enum LineStyle {
    /// Camera facing segments of the configured line width.  A width of zero falls back to
    /// hairlines.
    Billboards,
    Lines,
    /// One point per sample, sized by the configured scale.
    Points,
    None
}
impl LineStyle {
    /// Names of every line style, in the order a selector should list them.
    pub fn all_options() -> Vec<String> {
        EnumUtils::convert_all_variants_of_enum_into_ron_strings::<LineStyle>()
    }
}
impl Default for LineStyle {
    fn default() -> Self {
        Self::Lines
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8
}
impl RgbColor {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
    pub fn with_alpha(&self, alpha: f64) -> ColorRGBA {
        ColorRGBA::new(self.r as f32 / 255.0, self.g as f32 / 255.0, self.b as f32 / 255.0, alpha.clamp(0.0, 1.0) as f32)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TargetSettings {
    pub enabled: bool,
    /// URDF text of the robot.  Empty means no model is loaded.
    pub robot_description: String,
    pub base_mobility_mode: BaseMobilityMode,
    pub robot_visual_enabled: bool,
    pub robot_collision_enabled: bool,
    pub robot_alpha: f64
}
impl TargetSettings {
    pub fn robot_visual_style(&self) -> RobotVisualStyle {
        RobotVisualStyle {
            visible: self.enabled,
            visual_enabled: self.robot_visual_enabled,
            collision_enabled: self.robot_collision_enabled,
            alpha: self.robot_alpha as f32
        }
    }
}
impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            robot_description: "".to_string(),
            base_mobility_mode: BaseMobilityMode::Floating,
            robot_visual_enabled: true,
            robot_collision_enabled: false,
            robot_alpha: 0.5
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ForceSettings {
    pub enabled: bool,
    pub color: RgbColor,
    pub alpha: f64,
    pub arrow_geometry: ArrowGeometry
}
impl Default for ForceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            color: RgbColor::new(255, 85, 0),
            alpha: 1.0,
            arrow_geometry: ArrowGeometry::default()
        }
    }
}

/// Appearance of a sampled path.  Shared by the CoM path and every contact path.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PathSettings {
    pub enabled: bool,
    pub axes_enabled: bool,
    pub style: LineStyle,
    pub color: RgbColor,
    pub alpha: f64,
    pub line_width: f64,
    pub scale: f64
}
impl PathSettings {
    fn new_default(color: RgbColor, scale: f64) -> Self {
        Self {
            enabled: true,
            axes_enabled: false,
            style: LineStyle::Lines,
            color,
            alpha: 1.0,
            line_width: 0.01,
            scale
        }
    }
    pub fn color_rgba(&self) -> ColorRGBA {
        self.color.with_alpha(self.alpha)
    }
}

/// Every user-editable setting of the display.
///
/// # Example
/// ```
/// use trajviz::display_modules::style_config::{LineStyle, StyleSettings};
///
/// let settings = StyleSettings::load_from_ron_or_json_string(r#"{"com": {"enabled": true, "axes_enabled": true, "style": "Points", "color": {"r": 0, "g": 255, "b": 0}, "alpha": 0.5, "line_width": 0.0, "scale": 0.05}}"#).expect("error");
/// assert_eq!(settings.com.style, LineStyle::Points);
/// assert!(settings.target.enabled);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StyleSettings {
    pub target: TargetSettings,
    pub force: ForceSettings,
    pub com: PathSettings,
    pub contact: PathSettings
}
impl StyleSettings {
    /// Accepts either a RON or a JSON document.  Missing groups keep their defaults.
    pub fn load_from_ron_or_json_string(s: &str) -> Result<Self, TrajvizError> {
        let ron_res = Self::load_from_ron_string(s);
        if ron_res.is_ok() { return ron_res; }
        load_object_from_json_string(s)
    }
}
impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            target: TargetSettings::default(),
            force: ForceSettings::default(),
            com: PathSettings::new_default(RgbColor::new(255, 0, 0), 0.04),
            contact: PathSettings::new_default(RgbColor::new(0, 85, 255), 0.03)
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, EnumIter)]
pub enum StyleGroup {
    Target,
    Force,
    CoM,
    Contact
}

/// A single edit of the style settings.  Carries the values that were actually stored, so
/// clamped inputs show up clamped.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleChange {
    TargetEnable(bool),
    RobotDescription { robot_description: String, base_mobility_mode: BaseMobilityMode },
    RobotVisualVisible(bool),
    RobotCollisionVisible(bool),
    RobotAlpha(f64),
    ForceEnable(bool),
    ForceColorAndAlpha { color: RgbColor, alpha: f64 },
    ForceArrowGeometry(ArrowGeometry),
    CoMEnable(bool),
    CoMAxesEnable(bool),
    CoMStyle(LineStyle),
    CoMLineProperties { color: RgbColor, alpha: f64, line_width: f64, scale: f64 },
    ContactEnable(bool),
    ContactAxesEnable(bool),
    ContactStyle(LineStyle),
    ContactLineProperties { color: RgbColor, alpha: f64, line_width: f64, scale: f64 }
}
impl StyleChange {
    pub fn group(&self) -> StyleGroup {
        match self {
            StyleChange::TargetEnable(_) |
            StyleChange::RobotDescription { .. } |
            StyleChange::RobotVisualVisible(_) |
            StyleChange::RobotCollisionVisible(_) |
            StyleChange::RobotAlpha(_) => { StyleGroup::Target }
            StyleChange::ForceEnable(_) |
            StyleChange::ForceColorAndAlpha { .. } |
            StyleChange::ForceArrowGeometry(_) => { StyleGroup::Force }
            StyleChange::CoMEnable(_) |
            StyleChange::CoMAxesEnable(_) |
            StyleChange::CoMStyle(_) |
            StyleChange::CoMLineProperties { .. } => { StyleGroup::CoM }
            StyleChange::ContactEnable(_) |
            StyleChange::ContactAxesEnable(_) |
            StyleChange::ContactStyle(_) |
            StyleChange::ContactLineProperties { .. } => { StyleGroup::Contact }
        }
    }
    /// Structural changes alter how many primitives exist or of which kind, so the affected
    /// category has to be rebuilt.  Everything else restyles primitives in place.
    pub fn is_structural(&self) -> bool {
        match self {
            StyleChange::TargetEnable(_) |
            StyleChange::RobotDescription { .. } |
            StyleChange::ForceEnable(_) |
            StyleChange::CoMEnable(_) |
            StyleChange::CoMAxesEnable(_) |
            StyleChange::CoMStyle(_) |
            StyleChange::ContactEnable(_) |
            StyleChange::ContactAxesEnable(_) |
            StyleChange::ContactStyle(_) => { true }
            _ => { false }
        }
    }
}

pub type StyleListener = Box<dyn FnMut(&StyleChange)>;

/// Holds the current `StyleSettings` and notifies registered listeners on every edit.
///
/// Listeners are registered per `StyleGroup` and only hear changes of that group.  Setters store
/// the value before notifying, so a listener that reads the settings back sees the new state.
pub struct StyleConfig {
    settings: StyleSettings,
    listeners: Vec<(StyleGroup, StyleListener)>
}
impl StyleConfig {
    pub fn new(settings: StyleSettings) -> Self {
        let mut out_self = Self {
            settings,
            listeners: vec![]
        };
        out_self.sanitize();
        out_self
    }
    pub fn settings(&self) -> &StyleSettings {
        &self.settings
    }
    pub fn register_listener(&mut self, group: StyleGroup, listener: StyleListener) {
        self.listeners.push((group, listener));
    }
    pub fn num_listeners(&self) -> usize {
        self.listeners.len()
    }

    pub fn set_target_enabled(&mut self, enabled: bool) {
        self.settings.target.enabled = enabled;
        self.notify(StyleChange::TargetEnable(enabled));
    }
    pub fn set_robot_description(&mut self, robot_description: &str, base_mobility_mode: BaseMobilityMode) {
        self.settings.target.robot_description = robot_description.to_string();
        self.settings.target.base_mobility_mode = base_mobility_mode.clone();
        self.notify(StyleChange::RobotDescription { robot_description: robot_description.to_string(), base_mobility_mode });
    }
    pub fn set_robot_visual_enabled(&mut self, enabled: bool) {
        self.settings.target.robot_visual_enabled = enabled;
        self.notify(StyleChange::RobotVisualVisible(enabled));
    }
    pub fn set_robot_collision_enabled(&mut self, enabled: bool) {
        self.settings.target.robot_collision_enabled = enabled;
        self.notify(StyleChange::RobotCollisionVisible(enabled));
    }
    pub fn set_robot_alpha(&mut self, alpha: f64) {
        let alpha = clamp_alpha(alpha);
        self.settings.target.robot_alpha = alpha;
        self.notify(StyleChange::RobotAlpha(alpha));
    }

    pub fn set_force_enabled(&mut self, enabled: bool) {
        self.settings.force.enabled = enabled;
        self.notify(StyleChange::ForceEnable(enabled));
    }
    pub fn set_force_color_and_alpha(&mut self, color: RgbColor, alpha: f64) {
        let alpha = clamp_alpha(alpha);
        self.settings.force.color = color;
        self.settings.force.alpha = alpha;
        self.notify(StyleChange::ForceColorAndAlpha { color, alpha });
    }
    pub fn set_force_arrow_geometry(&mut self, arrow_geometry: ArrowGeometry) {
        let arrow_geometry = clamp_arrow_geometry(arrow_geometry);
        self.settings.force.arrow_geometry = arrow_geometry;
        self.notify(StyleChange::ForceArrowGeometry(arrow_geometry));
    }

    pub fn set_com_enabled(&mut self, enabled: bool) {
        self.settings.com.enabled = enabled;
        self.notify(StyleChange::CoMEnable(enabled));
    }
    pub fn set_com_axes_enabled(&mut self, enabled: bool) {
        self.settings.com.axes_enabled = enabled;
        self.notify(StyleChange::CoMAxesEnable(enabled));
    }
    pub fn set_com_style(&mut self, style: LineStyle) {
        self.settings.com.style = style;
        self.notify(StyleChange::CoMStyle(style));
    }
    pub fn set_com_line_properties(&mut self, color: RgbColor, alpha: f64, line_width: f64, scale: f64) {
        let (alpha, line_width, scale) = (clamp_alpha(alpha), clamp_non_negative(line_width), clamp_non_negative(scale));
        let com = &mut self.settings.com;
        com.color = color;
        com.alpha = alpha;
        com.line_width = line_width;
        com.scale = scale;
        self.notify(StyleChange::CoMLineProperties { color, alpha, line_width, scale });
    }

    pub fn set_contact_enabled(&mut self, enabled: bool) {
        self.settings.contact.enabled = enabled;
        self.notify(StyleChange::ContactEnable(enabled));
    }
    pub fn set_contact_axes_enabled(&mut self, enabled: bool) {
        self.settings.contact.axes_enabled = enabled;
        self.notify(StyleChange::ContactAxesEnable(enabled));
    }
    pub fn set_contact_style(&mut self, style: LineStyle) {
        self.settings.contact.style = style;
        self.notify(StyleChange::ContactStyle(style));
    }
    pub fn set_contact_line_properties(&mut self, color: RgbColor, alpha: f64, line_width: f64, scale: f64) {
        let (alpha, line_width, scale) = (clamp_alpha(alpha), clamp_non_negative(line_width), clamp_non_negative(scale));
        let contact = &mut self.settings.contact;
        contact.color = color;
        contact.alpha = alpha;
        contact.line_width = line_width;
        contact.scale = scale;
        self.notify(StyleChange::ContactLineProperties { color, alpha, line_width, scale });
    }

    fn notify(&mut self, change: StyleChange) {
        let group = change.group();
        for (listener_group, listener) in self.listeners.iter_mut() {
            if *listener_group == group { listener(&change); }
        }
    }
    fn sanitize(&mut self) {
        let s = &mut self.settings;
        s.target.robot_alpha = clamp_alpha(s.target.robot_alpha);
        s.force.alpha = clamp_alpha(s.force.alpha);
        s.force.arrow_geometry = clamp_arrow_geometry(s.force.arrow_geometry);
        for path in [&mut s.com, &mut s.contact] {
            path.alpha = clamp_alpha(path.alpha);
            path.line_width = clamp_non_negative(path.line_width);
            path.scale = clamp_non_negative(path.scale);
        }
    }
}
impl Debug for StyleConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleConfig")
            .field("settings", &self.settings)
            .field("num_listeners", &self.listeners.len())
            .finish()
    }
}

fn clamp_alpha(alpha: f64) -> f64 {
    if alpha.is_nan() { return 1.0; }
    alpha.clamp(0.0, 1.0)
}

fn clamp_non_negative(value: f64) -> f64 {
    if value.is_nan() { return 0.0; }
    value.max(0.0)
}

fn clamp_arrow_geometry(arrow_geometry: ArrowGeometry) -> ArrowGeometry {
    ArrowGeometry {
        head_radius: clamp_non_negative(arrow_geometry.head_radius),
        head_length: clamp_non_negative(arrow_geometry.head_length),
        shaft_radius: clamp_non_negative(arrow_geometry.shaft_radius),
        shaft_length: clamp_non_negative(arrow_geometry.shaft_length)
    }
}
