use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use portable_panel::{
    CloseBehavior, ConstraintMode, GestureInput, GestureKind, GrabMode, HandSide, NetworkAuthority, PanelAction,
    PanelAuthority, PanelCommand, PanelEvent, PanelNotification, PanelSettings,
    PanelSettingsAssetPlugin, PanelSettingsHandle, ParticipantId, PickupEdge, PickupEdgeKind,
    PickupModule, Pose, PortablePanel, PortablePanelPlugin, TrackingFrame,
};

fn test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(50)))
        .init_resource::<ButtonInput<KeyCode>>()
        .add_plugins(PortablePanelPlugin);
    app
}

fn spawn_panel(app: &mut App, panel: PortablePanel) -> Entity {
    let entity = app
        .world_mut()
        .spawn((panel, Transform::from_xyz(0.0, 1.2, -0.5)))
        .id();
    app.update();
    entity
}

fn panel(app: &App, entity: Entity) -> &PortablePanel {
    app.world().get::<PortablePanel>(entity).unwrap()
}

fn transform(app: &App, entity: Entity) -> Transform {
    *app.world().get::<Transform>(entity).unwrap()
}

fn current_events(app: &App) -> Vec<PanelNotification> {
    app.world()
        .resource::<Events<PanelEvent>>()
        .iter_current_update_events()
        .map(|event| event.notification)
        .collect()
}

fn set_vr_hands(app: &mut App, spread: f32) {
    let mut frame = app.world_mut().resource_mut::<TrackingFrame>();
    frame.in_vr = true;
    frame.left_connected = true;
    frame.right_connected = true;
    frame.left_hand = Pose::from_position(Vec3::new(-spread * 0.5, 1.3, -0.4));
    frame.right_hand = Pose::from_position(Vec3::new(spread * 0.5, 1.3, -0.4));
}

fn grab(app: &mut App, hand: HandSide, pressed: bool) {
    app.world_mut().send_event(GestureInput {
        hand,
        kind: GestureKind::Grab,
        pressed,
    });
    app.update();
}

#[test]
fn new_panels_start_closed_and_hidden() {
    let mut app = test_app();
    let entity = spawn_panel(&mut app, PortablePanel::default());

    assert!(panel(&app, entity).is_started());
    assert!(!panel(&app, entity).is_open());
    assert_eq!(app.world().get::<Visibility>(entity), Some(&Visibility::Hidden));
}

#[test]
fn holding_the_toggle_key_shows_the_panel_in_front_of_the_head() {
    let mut app = test_app();
    let entity = spawn_panel(&mut app, PortablePanel::default());

    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .press(KeyCode::Tab);
    app.update();

    assert!(panel(&app, entity).is_open());
    assert_eq!(app.world().get::<Visibility>(entity), Some(&Visibility::Inherited));
    assert!(transform(&app, entity).translation.distance(Vec3::new(0.0, 1.6, -0.3)) < 1e-4);
    assert!(current_events(&app).contains(&PanelNotification::Opened));

    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .release(KeyCode::Tab);
    app.update();

    assert!(!panel(&app, entity).is_open());
    assert_eq!(app.world().get::<Visibility>(entity), Some(&Visibility::Hidden));
    assert!(current_events(&app).contains(&PanelNotification::Closed));
}

#[test]
fn two_hand_gesture_opens_and_scales_the_panel() {
    let mut app = test_app();
    let entity = spawn_panel(&mut app, PortablePanel::default());
    set_vr_hands(&mut app, 0.2);

    grab(&mut app, HandSide::Left, true);
    grab(&mut app, HandSide::Right, true);

    assert_eq!(panel(&app, entity).grab_mode(), GrabMode::TwoHanded);
    assert!((transform(&app, entity).scale.x - 0.2).abs() < 1e-4);

    set_vr_hands(&mut app, 0.4);
    app.update();
    assert!((transform(&app, entity).scale.x - 0.4).abs() < 1e-4);

    grab(&mut app, HandSide::Left, false);
    grab(&mut app, HandSide::Right, false);
    assert!(panel(&app, entity).is_open());
    assert_eq!(panel(&app, entity).grab_mode(), GrabMode::None);
}

#[test]
fn released_hand_attaches_after_the_debounce() {
    let mut app = test_app();
    let entity = spawn_panel(&mut app, PortablePanel::default());
    set_vr_hands(&mut app, 0.2);

    grab(&mut app, HandSide::Left, true);
    grab(&mut app, HandSide::Right, true);
    grab(&mut app, HandSide::Left, false);
    assert_eq!(panel(&app, entity).grab_mode(), GrabMode::TwoHanded);

    for _ in 0..4 {
        app.update();
    }
    assert!(panel(&app, entity).is_held_by_one_hand());
}

#[test]
fn commands_reach_only_their_target() {
    let mut app = test_app();
    let first = spawn_panel(&mut app, PortablePanel::default());
    let second = app
        .world_mut()
        .spawn((PortablePanel::default(), PickupModule::default()))
        .id();
    app.update();

    app.world_mut()
        .send_event(PanelCommand::to(first, PanelAction::ForceOpen));
    app.update();
    assert!(panel(&app, first).is_open());
    assert!(!panel(&app, second).is_open());

    app.world_mut()
        .send_event(PanelCommand::all(PanelAction::SetLocked(true)));
    app.update();
    assert!(panel(&app, first).is_locked());
    assert!(panel(&app, second).is_locked());
    assert_eq!(
        app.world().get::<PickupModule>(second),
        Some(&PickupModule { pickupable: false })
    );

    app.world_mut().send_event(PanelCommand::to(
        second,
        PanelAction::SetConstraintMode(ConstraintMode::View),
    ));
    app.update();
    assert_eq!(panel(&app, second).constraint_mode(), ConstraintMode::View);
    assert_eq!(panel(&app, first).constraint_mode(), ConstraintMode::None);
}

#[test]
fn pickup_edges_open_and_release_the_panel() {
    let mut app = test_app();
    let entity = spawn_panel(&mut app, PortablePanel::default());

    app.world_mut().send_event(PickupEdge {
        panel: entity,
        kind: PickupEdgeKind::Begin,
    });
    app.update();
    assert!(panel(&app, entity).is_open());
    assert!(panel(&app, entity).is_held_by_one_hand());

    app.world_mut().send_event(PickupEdge {
        panel: entity,
        kind: PickupEdgeKind::End,
    });
    app.update();
    assert_eq!(panel(&app, entity).grab_mode(), GrabMode::None);
}

struct CountingAuthority {
    requests: Arc<AtomicUsize>,
}

impl NetworkAuthority for CountingAuthority {
    fn local_participant(&self) -> ParticipantId {
        ParticipantId(1)
    }

    fn is_owner(&self, _panel: Entity) -> bool {
        false
    }

    fn set_owner(&mut self, _participant: ParticipantId, _panel: Entity) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn force_open_requests_ownership_when_configured() {
    let mut app = test_app();
    let requests = Arc::new(AtomicUsize::new(0));
    app.insert_resource(PanelAuthority(Box::new(CountingAuthority {
        requests: requests.clone(),
    })));

    let entity = spawn_panel(
        &mut app,
        PortablePanel::new(PanelSettings {
            set_owner_on_pickup: true,
            ..default()
        }),
    );
    app.world_mut()
        .send_event(PanelCommand::to(entity, PanelAction::ForceOpen));
    app.update();

    assert!(panel(&app, entity).is_open());
    assert_eq!(requests.load(Ordering::SeqCst), 1);
}

#[test]
fn settings_assets_are_applied_and_invalid_ones_rejected() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, AssetPlugin::default()))
        .add_plugins((PortablePanelPlugin, PanelSettingsAssetPlugin));

    let handle = app
        .world_mut()
        .resource_mut::<Assets<PanelSettings>>()
        .add(PanelSettings {
            constraint_mode: ConstraintMode::View,
            max_scale: 2.0,
            ..default()
        });
    let entity = app
        .world_mut()
        .spawn((PortablePanel::default(), PanelSettingsHandle(handle.clone())))
        .id();
    app.update();

    assert_eq!(panel(&app, entity).settings().max_scale, 2.0);
    assert_eq!(panel(&app, entity).constraint_mode(), ConstraintMode::View);

    if let Some(settings) = app
        .world_mut()
        .resource_mut::<Assets<PanelSettings>>()
        .get_mut(&handle)
    {
        settings.min_scale = 0.0;
    }
    app.update();
    app.update();

    assert_eq!(
        panel(&app, entity).settings().min_scale,
        PanelSettings::default().min_scale
    );
}

#[test]
fn late_loaded_respawn_settings_show_the_closed_panel() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, AssetPlugin::default()))
        .add_plugins((PortablePanelPlugin, PanelSettingsAssetPlugin));

    let handle = app
        .world_mut()
        .resource_mut::<Assets<PanelSettings>>()
        .reserve_handle();
    let entity = app
        .world_mut()
        .spawn((
            PortablePanel::default(),
            PanelSettingsHandle(handle.clone()),
            Transform::from_xyz(0.0, 1.2, -0.5),
        ))
        .id();
    app.update();
    assert!(panel(&app, entity).is_started());
    assert_eq!(app.world().get::<Visibility>(entity), Some(&Visibility::Hidden));

    let _ = app
        .world_mut()
        .resource_mut::<Assets<PanelSettings>>()
        .insert(handle.id(), PanelSettings {
            close_behavior: CloseBehavior::Respawn,
            ..default()
        });
    app.update();
    app.update();

    assert_eq!(panel(&app, entity).settings().close_behavior, CloseBehavior::Respawn);
    assert!(!panel(&app, entity).is_open());
    assert!(panel(&app, entity).is_active());
    assert_eq!(app.world().get::<Visibility>(entity), Some(&Visibility::Inherited));
}
