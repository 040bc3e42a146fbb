use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy::window::PresentMode;
use portable_panel::{
    ConstraintMode, PanelAction, PanelCommand, PanelEvent, PanelSettingsAssetPlugin,
    PanelSettingsHandle, PickupModule, PortablePanel, PortablePanelPlugin, TrackingFrame,
};

const SETTINGS_PATH: &str = "portable_panel.panel.json";
const MOVE_SPEED: f32 = 2.0;
const TURN_SPEED: f32 = 1.5;

fn main() {
    create_app().run();
}

fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(PortablePanelPlugin)
        .add_plugins(PanelSettingsAssetPlugin)
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (
                camera_controller,
                write_tracking_frame,
                panel_shortcuts,
                log_panel_events,
            )
                .chain(),
        );

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}

fn create_window_config() -> Window {
    #[cfg(target_arch = "wasm32")]
    {
        Window {
            canvas: Some("#bevy".into()),
            fit_canvas_to_parent: true,
            prevent_default_event_handling: false,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Window {
            title: "Portable Panel".into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }
}

#[derive(Component)]
struct DemoCamera;

fn setup(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    println!("=== PORTABLE PANEL DEMO ===");

    spawn_lighting(&mut commands);
    spawn_camera(&mut commands);
    spawn_floor(&mut commands, &mut meshes, &mut materials);
    spawn_panel(&mut commands, &asset_server, &mut meshes, &mut materials);
    spawn_ui(&mut commands);
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
}

fn spawn_camera(commands: &mut Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 1.6, 0.0),
        DemoCamera,
    ));
}

fn spawn_floor(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(20.0, 20.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.25, 0.27, 0.3))),
    ));
}

fn spawn_panel(
    commands: &mut Commands,
    asset_server: &AssetServer,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    // Rectangle faces +Z, the panel's front.
    commands.spawn((
        PortablePanel::default(),
        PanelSettingsHandle(asset_server.load(SETTINGS_PATH)),
        PickupModule::default(),
        Mesh3d(meshes.add(Rectangle::new(0.6, 0.4))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.1, 0.45, 0.8),
            double_sided: true,
            cull_mode: None,
            ..default()
        })),
        Transform::from_xyz(0.0, 1.2, -1.0),
    ));
}

fn spawn_ui(commands: &mut Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new(
                    "Tab: show panel   WASD / arrows: move\n\
                     F: toggle   L: lock   P: pickupable   C: constraint   R: respawn",
                ),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    left: Val::Px(12.0),
                    ..default()
                },
            ));
        });
}

fn camera_controller(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut cameras: Query<&mut Transform, With<DemoCamera>>,
) {
    let Ok(mut transform) = cameras.single_mut() else {
        return;
    };
    let dt = time.delta_secs();

    let mut turn = 0.0;
    if keyboard.pressed(KeyCode::ArrowLeft) {
        turn += 1.0;
    }
    if keyboard.pressed(KeyCode::ArrowRight) {
        turn -= 1.0;
    }
    transform.rotate_y(turn * TURN_SPEED * dt);

    let forward = transform.forward().with_y(0.0).normalize_or_zero();
    let right = transform.right().with_y(0.0).normalize_or_zero();
    let mut movement = Vec3::ZERO;
    if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
        movement += forward;
    }
    if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
        movement -= forward;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        movement += right;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        movement -= right;
    }
    transform.translation += movement.normalize_or_zero() * MOVE_SPEED * dt;
}

/// Desktop host: the camera is the head and the player origin sits below it.
fn write_tracking_frame(
    mut frame: ResMut<TrackingFrame>,
    time: Res<Time>,
    cameras: Query<&Transform, With<DemoCamera>>,
) {
    let Ok(camera) = cameras.single() else {
        return;
    };
    let previous = frame.player_origin.position;
    frame.in_vr = false;
    frame.head = camera.into();
    frame.player_origin.position = camera.translation.with_y(0.0);
    frame.player_origin.rotation = camera.rotation;
    frame.avatar_eye_height = Some(camera.translation.y);

    let dt = time.delta_secs();
    if dt > 0.0 {
        frame.player_velocity = (frame.player_origin.position - previous) / dt;
    }
}

fn panel_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    panels: Query<&PortablePanel>,
    mut commands: EventWriter<PanelCommand>,
) {
    let Some(panel) = panels.iter().next() else {
        return;
    };

    if keyboard.just_pressed(KeyCode::KeyF) {
        commands.write(PanelCommand::all(PanelAction::Toggle));
    }
    if keyboard.just_pressed(KeyCode::KeyL) {
        commands.write(PanelCommand::all(PanelAction::SetLocked(!panel.is_locked())));
    }
    if keyboard.just_pressed(KeyCode::KeyP) {
        commands.write(PanelCommand::all(PanelAction::TogglePickupable));
    }
    if keyboard.just_pressed(KeyCode::KeyR) {
        commands.write(PanelCommand::all(PanelAction::Respawn));
    }
    if keyboard.just_pressed(KeyCode::KeyC) {
        let next = match panel.constraint_mode() {
            ConstraintMode::None => ConstraintMode::Position,
            ConstraintMode::Position => ConstraintMode::View,
            ConstraintMode::View => ConstraintMode::None,
        };
        info!("Constraint mode -> {:?}", next);
        commands.write(PanelCommand::all(PanelAction::SetConstraintMode(next)));
    }
}

fn log_panel_events(mut events: EventReader<PanelEvent>) {
    for event in events.read() {
        info!("Panel {:?}: {:?}", event.panel, event.notification);
    }
}
