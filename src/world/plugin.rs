use bevy::prelude::*;

use super::materializer::{terrain_material, EntityMaterializer};
use crate::core::settings::LandscapeSettings;
use crate::terrain::landscape::Landscape;

/// Terrain streams around the first entity carrying this marker.
/// Without one, the first 3D camera is used.
#[derive(Component, Debug, Default)]
pub struct LandscapeViewer;

/// Parent of every chunk entity.
#[derive(Component, Debug, Default)]
pub struct LandscapeRoot;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct LandscapeSet;

/// Running streamer state. Removed when streaming fails for good.
#[derive(Resource)]
pub struct LandscapeStreamer {
    pub landscape: Landscape<Entity>,
    material: Handle<StandardMaterial>,
    root: Entity,
}

/// Streams terrain chunks around the viewer.
///
/// Reads [`LandscapeSettings`] if inserted before the plugin, defaults
/// otherwise. Needs `Assets<Mesh>` and `Assets<StandardMaterial>`.
pub struct LandscapePlugin;

impl Plugin for LandscapePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LandscapeSettings>()
            .add_systems(Startup, start_streaming)
            .add_systems(Update, stream_chunks.in_set(LandscapeSet))
            .add_systems(Last, stop_streaming_on_exit);
    }
}

fn start_streaming(
    mut commands: Commands,
    settings: Res<LandscapeSettings>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut exit: EventWriter<AppExit>,
) {
    if let Err(err) = settings.validate() {
        error!("Invalid landscape settings: {}", err);
        exit.send(AppExit::error());
        return;
    }

    let landscape = match Landscape::new(settings.clone()) {
        Ok(landscape) => landscape,
        Err(err) => {
            error!("Failed to start landscape streaming: {}", err);
            exit.send(AppExit::error());
            return;
        }
    };

    let root = commands
        .spawn((
            Name::new("Landscape"),
            LandscapeRoot,
            Transform::default(),
            Visibility::default(),
        ))
        .id();

    commands.insert_resource(LandscapeStreamer {
        landscape,
        material: materials.add(terrain_material()),
        root,
    });
}

fn stream_chunks(
    mut commands: Commands,
    streamer: Option<ResMut<LandscapeStreamer>>,
    mut meshes: ResMut<Assets<Mesh>>,
    viewers: Query<&Transform, With<LandscapeViewer>>,
    cameras: Query<&Transform, (With<Camera3d>, Without<LandscapeViewer>)>,
    mut exit: EventWriter<AppExit>,
) {
    let Some(mut streamer) = streamer else {
        return;
    };

    let reference = viewers
        .iter()
        .next()
        .or_else(|| cameras.iter().next())
        .map(|transform| transform.translation);

    let LandscapeStreamer {
        landscape,
        material,
        root,
    } = &mut *streamer;

    let mut materializer = EntityMaterializer {
        commands: &mut commands,
        meshes: &mut meshes,
        material: material.clone(),
        root: *root,
    };

    if let Err(err) = landscape.tick(&reference, &mut materializer) {
        error!("Landscape streaming stopped: {}", err);
        commands.remove_resource::<LandscapeStreamer>();
        exit.send(AppExit::error());
    }
}

fn stop_streaming_on_exit(mut exits: EventReader<AppExit>, streamer: Option<ResMut<LandscapeStreamer>>) {
    if exits.read().next().is_none() {
        return;
    }
    if let Some(mut streamer) = streamer {
        streamer.landscape.shutdown();
    }
}
