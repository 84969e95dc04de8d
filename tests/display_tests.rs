use approx::assert_relative_eq;
use nalgebra::{DVector, Vector3};
use trajviz::display_modules::recording_render_engine::RecordingRenderEngine;
use trajviz::display_modules::render_engine::{ArrowGeometry, PrimitiveGeometry, RenderEngine, VisualPrimitiveKind};
use trajviz::display_modules::style_config::{LineStyle, RgbColor, StyleSettings};
use trajviz::display_modules::visual_primitive_pool::VisualPrimitivePool;
use trajviz::display_modules::whole_body_trajectory_display::{DisplayStatus, WholeBodyTrajectoryDisplay};
use trajviz::robot_modules::robot_model_module::BaseMobilityMode;
use trajviz::trajectory_modules::trajectory_processor_module::TrajectoryCategory;
use trajviz::trajectory_modules::whole_body_trajectory::{ContactState, WholeBodyState, WholeBodyTrajectory};

/// One massive link on a floating base, so configurations have six entries.
const TORSO_URDF: &str = r#"<robot name="torso_only">
    <link name="torso"><inertial><origin xyz="0 0 0.1" rpy="0 0 0"/><mass value="10.0"/><inertia ixx="1" ixy="0" ixz="0" iyy="1" iyz="0" izz="1"/></inertial></link>
</robot>"#;

/// The torso with an arm on a revolute shoulder, so configurations have seven entries.
const TORSO_ARM_URDF: &str = r#"<robot name="torso_arm">
    <link name="torso"><inertial><origin xyz="0 0 0.1" rpy="0 0 0"/><mass value="10.0"/><inertia ixx="1" ixy="0" ixz="0" iyy="1" iyz="0" izz="1"/></inertial></link>
    <link name="arm"><inertial><origin xyz="0.2 0 0" rpy="0 0 0"/><mass value="2.0"/><inertia ixx="1" ixy="0" ixz="0" iyy="1" iyz="0" izz="1"/></inertial></link>
    <joint name="shoulder" type="revolute">
        <parent link="torso"/><child link="arm"/><origin xyz="0 0 0.3" rpy="0 0 0"/><axis xyz="0 1 0"/>
        <limit lower="-3" upper="3" effort="1" velocity="1"/>
    </joint>
</robot>"#;

type Display = WholeBodyTrajectoryDisplay<RecordingRenderEngine>;

fn settings_with_model() -> StyleSettings {
    let mut settings = StyleSettings::default();
    settings.target.robot_description = TORSO_URDF.to_string();
    settings.target.base_mobility_mode = BaseMobilityMode::Floating;
    settings.com.style = LineStyle::Points;
    settings.contact.style = LineStyle::Points;
    settings
}

fn posture(x: f64) -> DVector<f64> {
    DVector::from_vec(vec![x, 0.0, 0.9, 0.0, 0.0, 0.0])
}

fn com_message() -> WholeBodyTrajectory {
    WholeBodyTrajectory::new(vec![
        WholeBodyState::new(0.0, posture(0.0)).with_com_position(Vector3::new(0.0, 0.0, 1.0)),
        WholeBodyState::new(0.1, posture(0.1)).with_com_position(Vector3::new(0.1, 0.0, 1.0)),
        WholeBodyState::new(0.2, posture(0.2)).with_com_position(Vector3::new(0.2, 0.0, 1.0)),
    ])
}

fn walking_message() -> WholeBodyTrajectory {
    WholeBodyTrajectory::new(vec![
        WholeBodyState::new(0.0, posture(0.0))
            .with_contact(ContactState::new("left_foot", Vector3::new(0.0, 0.1, 0.0), true))
            .with_contact(ContactState::new("right_foot", Vector3::new(0.0, -0.1, 0.0), true)),
        WholeBodyState::new(0.1, posture(0.1))
            .with_contact(ContactState::new("left_foot", Vector3::new(0.1, 0.1, 0.05), false))
            .with_contact(ContactState::new("right_foot", Vector3::new(0.0, -0.1, 0.0), true)),
        WholeBodyState::new(0.2, posture(0.2))
            .with_contact(ContactState::new("left_foot", Vector3::new(0.2, 0.1, 0.0), true).with_force(Vector3::new(0.0, 0.0, 49.05)))
            .with_contact(ContactState::new("right_foot", Vector3::new(0.0, -0.1, 0.0), true).with_force(Vector3::new(0.0, 0.0, 49.05))),
    ])
}

fn pool_geometries(display: &Display, pool: &VisualPrimitivePool) -> Vec<PrimitiveGeometry> {
    pool.handles().iter()
        .filter_map(|h| display.render_engine().get_primitive(*h))
        .filter_map(|p| p.geometry().cloned())
        .collect()
}

fn point_positions(display: &Display, pool: &VisualPrimitivePool) -> Vec<Vector3<f64>> {
    pool_geometries(display, pool).into_iter().filter_map(|g| match g {
        PrimitiveGeometry::Point { position } => { Some(position) }
        _ => { None }
    }).collect()
}

#[test]
fn provided_com_fills_one_point_per_sample() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    assert_eq!(display.robot_kinematics_module().unwrap().num_dofs(), 6);

    display.on_message(com_message());

    assert_eq!(display.com_pool_len(), 3);
    let positions = point_positions(&display, display.com_pool());
    assert_eq!(positions, vec![Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.1, 0.0, 1.0), Vector3::new(0.2, 0.0, 1.0)]);
    assert_eq!(display.status(TrajectoryCategory::CoM), DisplayStatus::Ok);
    assert!(display.last_cycle_duration(TrajectoryCategory::CoM).is_some());
}

#[test]
fn mismatched_posture_is_skipped_and_reported() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    let message = WholeBodyTrajectory::new(vec![
        WholeBodyState::new(0.0, posture(0.0)).with_com_position(Vector3::new(0.0, 0.0, 1.0)),
        WholeBodyState::new(0.1, DVector::zeros(5)).with_com_position(Vector3::new(0.1, 0.0, 1.0)),
        WholeBodyState::new(0.2, posture(0.2)).with_com_position(Vector3::new(0.2, 0.0, 1.0)),
    ]);

    display.on_message(message);

    assert_eq!(display.com_pool_len(), 2);
    assert_eq!(point_positions(&display, display.com_pool()), vec![Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.2, 0.0, 1.0)]);
    assert!(matches!(display.status(TrajectoryCategory::CoM), DisplayStatus::Warn(_)));
}

#[test]
fn missing_com_is_computed_from_the_model() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    display.on_message(WholeBodyTrajectory::new(vec![
        WholeBodyState::new(0.0, posture(0.3)),
    ]));

    let positions = point_positions(&display, display.com_pool());
    assert_eq!(positions.len(), 1);
    assert_relative_eq!(positions[0], Vector3::new(0.3, 0.0, 1.0), epsilon = 1e-12);
}

#[test]
fn contact_pools_count_active_samples_only() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    display.on_message(walking_message());

    assert_eq!(display.contact_names(), vec!["left_foot".to_string(), "right_foot".to_string()]);
    assert_eq!(display.contact_pool_len("left_foot"), 2);
    assert_eq!(display.contact_pool_len("right_foot"), 3);
    let left = point_positions(&display, display.contact_pool("left_foot").unwrap());
    assert_eq!(left, vec![Vector3::new(0.0, 0.1, 0.0), Vector3::new(0.2, 0.1, 0.0)]);
}

#[test]
fn processing_the_same_message_twice_is_idempotent() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    display.on_message(walking_message());
    let live_before = display.render_engine().live_primitive_count();
    let left_before = pool_geometries(&display, display.contact_pool("left_foot").unwrap());
    let force_before = pool_geometries(&display, display.force_pool());

    display.on_message(walking_message());

    assert_eq!(display.render_engine().live_primitive_count(), live_before);
    assert_eq!(pool_geometries(&display, display.contact_pool("left_foot").unwrap()), left_before);
    assert_eq!(pool_geometries(&display, display.force_pool()), force_before);
}

#[test]
fn style_only_change_restyles_in_place() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    display.on_message(com_message());
    let handles_before = display.com_pool().handles().clone();
    let created_before = display.render_engine().num_created();

    display.style_config_mut().set_com_line_properties(RgbColor::new(0, 255, 0), 0.3, 0.02, 0.08);
    display.update();

    assert_eq!(display.com_pool().handles(), &handles_before);
    assert_eq!(display.render_engine().num_created(), created_before);
    let style = display.render_engine().get_primitive(handles_before[0]).unwrap().style().clone();
    assert_relative_eq!(style.color.g, 1.0);
    assert_relative_eq!(style.color.a, 0.3);
    assert_relative_eq!(style.size, 0.08);
}

#[test]
fn style_flip_matches_a_fresh_process() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    display.on_message(com_message());
    let points_before = pool_geometries(&display, display.com_pool());

    display.style_config_mut().set_com_style(LineStyle::Lines);
    display.update();
    assert_eq!(display.com_pool().kind(), VisualPrimitiveKind::Line);
    assert_eq!(display.com_pool_len(), 3);
    assert_eq!(pool_geometries(&display, display.com_pool())[2], PrimitiveGeometry::Line { start: Vector3::new(0.1, 0.0, 1.0), end: Vector3::new(0.2, 0.0, 1.0) });

    display.style_config_mut().set_com_style(LineStyle::Points);
    display.update();
    assert_eq!(display.com_pool().kind(), VisualPrimitiveKind::Point);
    assert_eq!(pool_geometries(&display, display.com_pool()), points_before);
}

#[test]
fn disable_empties_and_enable_restores() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    display.on_message(walking_message());
    let left_before = pool_geometries(&display, display.contact_pool("left_foot").unwrap());

    display.style_config_mut().set_contact_enabled(false);
    display.update();
    assert_eq!(display.contact_pool_len("left_foot"), 0);
    assert_eq!(display.contact_pool_len("right_foot"), 0);
    assert_eq!(display.com_pool_len(), 3);

    display.style_config_mut().set_contact_enabled(true);
    display.update();
    assert_eq!(pool_geometries(&display, display.contact_pool("left_foot").unwrap()), left_before);
}

#[test]
fn billboard_with_zero_width_draws_hairlines() {
    let mut settings = settings_with_model();
    settings.com.style = LineStyle::Billboards;
    settings.com.line_width = 0.0;
    let mut display = Display::new(RecordingRenderEngine::new(), settings);
    display.on_message(com_message());

    assert_eq!(display.com_pool().kind(), VisualPrimitiveKind::Line);
    assert_eq!(display.com_pool_len(), 3);
    let handle = display.com_pool().handles()[1];
    assert_eq!(display.render_engine().get_primitive(handle).unwrap().style().size, 0.0);
}

#[test]
fn axes_follow_samples_one_to_one() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    display.style_config_mut().set_com_axes_enabled(true);
    display.style_config_mut().set_contact_axes_enabled(true);
    display.on_message(walking_message());

    assert_eq!(display.com_axes_pool_len(), 3);
    assert_eq!(display.contact_axes_pool_len("left_foot"), 2);
    assert_eq!(display.contact_axes_pool_len("right_foot"), 3);
}

#[test]
fn force_arrows_need_target_and_force_enabled() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    display.on_message(walking_message());
    assert_eq!(display.force_pool_len(), 2);
    match &pool_geometries(&display, display.force_pool())[0] {
        PrimitiveGeometry::Arrow { pose, length_scale } => {
            // half of the 10 kg body weight
            assert_relative_eq!(*length_scale, 0.5, epsilon = 1e-9);
            assert_relative_eq!(pose.translation(), &Vector3::new(0.2, 0.1, 0.0));
        }
        _ => { panic!("expected an arrow") }
    }

    display.style_config_mut().set_force_enabled(false);
    display.update();
    assert_eq!(display.force_pool_len(), 0);

    display.style_config_mut().set_force_enabled(true);
    display.style_config_mut().set_target_enabled(false);
    display.update();
    assert_eq!(display.force_pool_len(), 0);
    assert!(display.render_engine().robot_visual().is_none());
}

#[test]
fn target_posture_moves_the_robot_visual() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    display.on_message(com_message());

    let robot_visual = display.render_engine().robot_visual().unwrap();
    assert_eq!(robot_visual.robot_name(), "torso_only");
    let torso = robot_visual.get_link_pose("torso").unwrap();
    assert_relative_eq!(torso.translation(), &Vector3::new(0.2, 0.0, 0.9), epsilon = 1e-12);
}

#[test]
fn failure_in_one_category_keeps_its_last_render_and_spares_the_others() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    display.on_message(com_message());
    let com_before = pool_geometries(&display, display.com_pool());

    let broken = WholeBodyTrajectory::new(vec![
        WholeBodyState::new(0.0, posture(0.0))
            .with_com_position(Vector3::new(f64::NAN, 0.0, 1.0))
            .with_contact(ContactState::new("left_foot", Vector3::zeros(), true)),
    ]);
    display.on_message(broken);

    assert!(matches!(display.status(TrajectoryCategory::CoM), DisplayStatus::Error(_)));
    assert_eq!(pool_geometries(&display, display.com_pool()), com_before);
    assert_eq!(display.contact_pool_len("left_foot"), 1);
    assert_eq!(display.status(TrajectoryCategory::Contact), DisplayStatus::Ok);
}

#[test]
fn exhausted_engine_reports_error_without_leaking() {
    let mut display = Display::new(RecordingRenderEngine::new_with_capacity(4), settings_with_model());
    let message = WholeBodyTrajectory::new((0..6).map(|i| {
        WholeBodyState::new(i as f64 * 0.1, posture(0.0)).with_com_position(Vector3::new(i as f64, 0.0, 1.0))
    }).collect());

    display.on_message(message);

    assert_eq!(display.com_pool_len(), 0);
    assert!(matches!(display.status(TrajectoryCategory::CoM), DisplayStatus::Error(_)));
    assert_eq!(display.render_engine().live_primitive_count(), 0);
}

#[test]
fn bad_robot_description_keeps_the_previous_model() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    display.style_config_mut().set_robot_description("<robot name=\"broken\"><joint", BaseMobilityMode::Floating);
    display.update();

    assert!(matches!(display.robot_model_status(), DisplayStatus::Error(_)));
    assert_eq!(display.robot_kinematics_module().unwrap().robot_model_module().robot_name(), "torso_only");
}

#[test]
fn queued_messages_are_processed_in_arrival_order() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    let sender = display.message_sender();
    sender.send(walking_message()).unwrap();
    sender.send(com_message()).unwrap();
    assert_eq!(display.com_pool_len(), 0);

    display.update();

    assert_eq!(display.last_message(), Some(&com_message()));
    assert_eq!(display.com_pool_len(), 3);
    assert!(display.contact_names().is_empty());
}

#[test]
fn disable_and_reset_release_every_primitive() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    display.on_message(walking_message());
    assert!(display.render_engine().live_primitive_count() > 0);

    display.on_disable();
    assert_eq!(display.render_engine().live_primitive_count(), 0);
    assert!(display.render_engine().robot_visual().is_none());

    display.on_enable();
    assert!(display.render_engine().live_primitive_count() > 0);

    display.reset();
    assert_eq!(display.render_engine().live_primitive_count(), 0);
    assert!(display.last_message().is_none());
}

#[test]
fn settings_from_ron_drive_the_display() {
    let mut settings = settings_with_model();
    settings.contact.enabled = false;
    let ron_string = trajviz::utils::utils_traits::ToAndFromRonString::to_ron_string(&settings);
    let loaded = StyleSettings::load_from_ron_or_json_string(&ron_string).unwrap();

    let mut display = Display::new(RecordingRenderEngine::new(), loaded);
    display.on_message(walking_message());
    assert!(display.contact_names().is_empty());
    assert_eq!(display.com_pool_len(), 3);
}

#[test]
fn exhausted_engine_keeps_the_last_good_render() {
    let mut display = Display::new(RecordingRenderEngine::new_with_capacity(4), settings_with_model());
    display.on_message(com_message());
    let com_before = pool_geometries(&display, display.com_pool());
    assert_eq!(com_before.len(), 3);

    let longer = WholeBodyTrajectory::new((0..6).map(|i| {
        WholeBodyState::new(i as f64 * 0.1, posture(0.0)).with_com_position(Vector3::new(i as f64, 0.0, 1.0))
    }).collect());
    display.on_message(longer);

    assert!(matches!(display.status(TrajectoryCategory::CoM), DisplayStatus::Error(_)));
    assert_eq!(pool_geometries(&display, display.com_pool()), com_before);
    assert_eq!(display.render_engine().live_primitive_count(), 3);
}

#[test]
fn style_edits_apply_without_waiting_for_update() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    display.on_message(walking_message());
    assert_eq!(display.contact_pool_len("left_foot"), 2);

    display.style_config_mut().set_contact_enabled(false);
    assert_eq!(display.contact_pool_len("left_foot"), 0);
    assert_eq!(display.contact_pool_len("right_foot"), 0);

    display.style_config_mut().set_com_line_properties(RgbColor::new(0, 0, 255), 1.0, 0.0, 0.05);
    let handle = display.com_pool().handles()[0];
    assert_relative_eq!(display.render_engine().get_primitive(handle).unwrap().style().color.b, 1.0);
}

#[test]
fn force_restyle_keeps_arrows_in_place() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    display.on_message(walking_message());
    let handles_before = display.force_pool().handles().clone();
    let geometries_before = pool_geometries(&display, display.force_pool());
    let created_before = display.render_engine().num_created();

    let arrow_geometry = ArrowGeometry { head_radius: 0.05, head_length: 0.1, shaft_radius: 0.02, shaft_length: 0.6 };
    {
        let mut style_config = display.style_config_mut();
        style_config.set_force_color_and_alpha(RgbColor::new(0, 255, 0), 0.5);
        style_config.set_force_arrow_geometry(arrow_geometry);
    }

    assert_eq!(display.force_pool().handles(), &handles_before);
    assert_eq!(display.render_engine().num_created(), created_before);
    assert_eq!(pool_geometries(&display, display.force_pool()), geometries_before);
    let style = display.render_engine().get_primitive(handles_before[0]).unwrap().style().clone();
    assert_relative_eq!(style.color.g, 1.0);
    assert_relative_eq!(style.color.a, 0.5);
    assert_eq!(style.arrow_geometry, Some(arrow_geometry));
}

#[test]
fn robot_style_reaches_the_render_engine() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    display.on_message(com_message());
    assert!(!display.render_engine().robot_visual_geometry().unwrap().is_empty());

    display.style_config_mut().set_robot_alpha(0.25);
    assert_eq!(display.render_engine().robot_visual_style().alpha, 0.25);
    assert_eq!(display.render_engine().robot_visual_geometry().unwrap().alpha, 0.25);

    display.style_config_mut().set_robot_visual_enabled(false);
    assert!(!display.render_engine().robot_visual_style().visual_enabled);
    assert!(display.render_engine().robot_visual_geometry().unwrap().is_empty());

    display.style_config_mut().set_robot_collision_enabled(true);
    assert!(display.render_engine().robot_visual_style().collision_enabled);
    assert_eq!(display.render_engine().robot_visual_geometry().unwrap().link_positions.len(), 1);
}

#[test]
fn contact_style_flip_swaps_primitive_kind() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    display.on_message(walking_message());
    assert_eq!(display.contact_pool("left_foot").unwrap().kind(), VisualPrimitiveKind::Point);

    display.style_config_mut().set_contact_style(LineStyle::Lines);
    for name in ["left_foot", "right_foot"] {
        let pool = display.contact_pool(name).unwrap();
        assert_eq!(pool.kind(), VisualPrimitiveKind::Line);
        assert!(pool.handles().iter().all(|h| display.render_engine().get_primitive(*h).unwrap().kind() == VisualPrimitiveKind::Line));
    }
    assert_eq!(display.contact_pool_len("left_foot"), 2);
    assert_eq!(display.contact_pool_len("right_foot"), 3);
    assert_eq!(display.render_engine().primitives_of_kind(VisualPrimitiveKind::Point).len(), display.com_pool_len());
}

#[test]
fn new_robot_description_swaps_the_model() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    display.on_message(com_message());
    assert_eq!(display.com_pool_len(), 3);

    display.style_config_mut().set_robot_description(TORSO_ARM_URDF, BaseMobilityMode::Floating);

    assert_eq!(display.robot_model_status(), &DisplayStatus::Ok);
    assert_eq!(display.robot_kinematics_module().unwrap().num_dofs(), 7);
    let robot_visual = display.render_engine().robot_visual().unwrap();
    assert_eq!(robot_visual.robot_name(), "torso_arm");
    assert_eq!(robot_visual.link_names(), &vec!["torso".to_string(), "arm".to_string()]);
    // the cached six entry postures no longer fit
    assert_eq!(display.com_pool_len(), 0);
    assert!(matches!(display.status(TrajectoryCategory::CoM), DisplayStatus::Warn(_)));

    display.on_message(WholeBodyTrajectory::new((0..3).map(|i| {
        WholeBodyState::new(i as f64 * 0.1, DVector::from_vec(vec![i as f64 * 0.1, 0.0, 0.9, 0.0, 0.0, 0.0, 0.0]))
    }).collect()));
    assert_eq!(display.com_pool_len(), 3);
    assert_eq!(display.status(TrajectoryCategory::CoM), DisplayStatus::Ok);
}

#[test]
fn empty_robot_description_unloads_the_model() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    display.on_message(com_message());
    assert!(display.render_engine().robot_visual().is_some());

    display.style_config_mut().set_robot_description("", BaseMobilityMode::Floating);

    assert!(display.robot_kinematics_module().is_none());
    assert!(display.render_engine().robot_visual().is_none());
    assert!(matches!(display.robot_model_status(), DisplayStatus::Warn(_)));
    // provided centers of mass still draw without a model
    assert_eq!(display.com_pool_len(), 3);

    display.on_message(walking_message());
    assert_eq!(display.com_pool_len(), 0);
    assert!(matches!(display.status(TrajectoryCategory::CoM), DisplayStatus::Warn(_)));
}

#[test]
fn fixed_frame_change_redraws_from_the_cached_message() {
    let mut display = Display::new(RecordingRenderEngine::new(), settings_with_model());
    display.on_message(com_message());
    let handles_before = display.com_pool().handles().clone();
    let com_before = pool_geometries(&display, display.com_pool());

    let stale = PrimitiveGeometry::Point { position: Vector3::new(9.0, 9.0, 9.0) };
    display.render_engine_mut().set_primitive_geometry(handles_before[0], &stale).unwrap();
    assert_ne!(pool_geometries(&display, display.com_pool()), com_before);

    display.fixed_frame_changed();

    assert_eq!(display.com_pool().handles(), &handles_before);
    assert_eq!(pool_geometries(&display, display.com_pool()), com_before);
}
