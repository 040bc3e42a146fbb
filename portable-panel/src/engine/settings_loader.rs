use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

use super::plugin::PanelSet;
use super::systems::start_panels;
use crate::panel::controller::PortablePanel;
use crate::panel::settings::PanelSettings;

/// Settings asset a panel takes its tuning from.
#[derive(Component, Debug, Clone)]
pub struct PanelSettingsHandle(pub Handle<PanelSettings>);

/// Loads `*.panel.json` settings and hot-applies them to panels.
pub struct PanelSettingsAssetPlugin;

impl Plugin for PanelSettingsAssetPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(JsonAssetPlugin::<PanelSettings>::new(&["panel.json"]))
            .add_systems(
                PreUpdate,
                apply_panel_settings
                    .in_set(PanelSet::Start)
                    .before(start_panels),
            );
    }
}

/// Apply settings when a handle is attached or its asset (re)loads.
/// Invalid settings are rejected and the panel keeps what it had.
pub fn apply_panel_settings(
    mut asset_events: EventReader<AssetEvent<PanelSettings>>,
    settings_assets: Res<Assets<PanelSettings>>,
    mut panels: Query<(Entity, Ref<PanelSettingsHandle>, &mut PortablePanel)>,
) {
    let changed: Vec<AssetId<PanelSettings>> = asset_events
        .read()
        .filter_map(|event| match event {
            AssetEvent::Added { id }
            | AssetEvent::Modified { id }
            | AssetEvent::LoadedWithDependencies { id } => Some(*id),
            _ => None,
        })
        .collect();

    for (entity, handle, mut panel) in &mut panels {
        let id = handle.0.id();
        if !handle.is_added() && !changed.contains(&id) {
            continue;
        }
        let Some(settings) = settings_assets.get(id) else {
            continue;
        };

        match settings.validate() {
            Ok(()) => {
                if panel.settings() != settings {
                    panel.apply_settings(settings.clone());
                    info!("Applied panel settings {:?} to {:?}", id, entity);
                }
            }
            Err(err) => warn!("Rejected panel settings {:?}: {}", id, err),
        }
    }
}
