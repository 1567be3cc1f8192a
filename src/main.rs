use bevy::input::mouse::MouseMotion;
use bevy::log::LogPlugin;
use bevy::pbr::wireframe::{Wireframe, WireframePlugin};
use bevy::prelude::*;

use procedural_landscape::core::constants::{self, camera, files, hotkeys};
use procedural_landscape::core::{ConfigError, LandscapeSettings};
use procedural_landscape::world::{LandscapePlugin, LandscapeViewer, TerrainChunk};

/// Free-flying demo camera state
#[derive(Component, Default)]
struct FlyCamera {
    yaw: f32,
    pitch: f32,
}

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: constants::WINDOW_TITLE.into(),
                        resolution: (constants::WINDOW_WIDTH, constants::WINDOW_HEIGHT).into(),
                        ..default()
                    }),
                    ..default()
                })
                .set(log_plugin()),
            WireframePlugin,
        ))
        .add_systems(PreStartup, load_settings)
        .add_plugins(LandscapePlugin)
        .add_systems(Startup, setup_scene)
        .add_systems(Update, (fly_camera, toggle_wireframe))
        .run();
}

#[cfg(feature = "logging")]
fn log_plugin() -> LogPlugin {
    LogPlugin {
        custom_layer: flame_layer,
        ..default()
    }
}

#[cfg(not(feature = "logging"))]
fn log_plugin() -> LogPlugin {
    LogPlugin::default()
}

// Folded stacks for inferno / flamegraph; the guard flushes the file on exit
#[cfg(feature = "logging")]
fn flame_layer(app: &mut App) -> Option<bevy::log::BoxedLayer> {
    use tracing_subscriber::Layer;

    match tracing_flame::FlameLayer::with_file(files::FLAME_OUTPUT_PATH) {
        Ok((layer, guard)) => {
            app.insert_non_send_resource(guard);
            Some(layer.boxed())
        }
        Err(err) => {
            // The subscriber is not installed yet, so this cannot go through the log macros
            eprintln!("Flame profiling disabled: {}", err);
            None
        }
    }
}

// Runs before the landscape plugin starts so file settings win over defaults
fn load_settings(mut commands: Commands, mut exit: EventWriter<AppExit>) {
    match LandscapeSettings::load(files::SETTINGS_PATH) {
        Ok(settings) => {
            info!("Loaded landscape settings from {}", files::SETTINGS_PATH);
            commands.insert_resource(settings);
        }
        Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            info!("{} not found, using default landscape settings", files::SETTINGS_PATH);
        }
        Err(err) => {
            error!("{}", err);
            exit.send(AppExit::error());
        }
    }
}

fn setup_scene(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, camera::START_HEIGHT, 0.0)
            .looking_to(Vec3::new(0.0, -0.3, -1.0), Vec3::Y),
        FlyCamera {
            yaw: 0.0,
            pitch: -0.3,
        },
        LandscapeViewer,
    ));

    commands.spawn((
        DirectionalLight {
            color: Color::srgb(1.0, 1.0, 0.9),
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.8, 0.4, 0.0)),
    ));

    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.5, 0.5, 0.7),
        brightness: 500.0,
    });

    info!("Scene ready: WASD to fly, E/Q up/down, hold right mouse to look, Shift for speed");
}

fn fly_camera(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut camera_query: Query<(&mut Transform, &mut FlyCamera)>,
    time: Res<Time>,
) {
    let Ok((mut transform, mut fly)) = camera_query.get_single_mut() else {
        return;
    };

    if mouse_buttons.pressed(MouseButton::Right) {
        for motion in mouse_motion.read() {
            fly.yaw -= motion.delta.x * camera::LOOK_SENSITIVITY;
            fly.pitch = (fly.pitch - motion.delta.y * camera::LOOK_SENSITIVITY)
                .clamp(-camera::PITCH_LIMIT, camera::PITCH_LIMIT);
        }
        transform.rotation = Quat::from_euler(EulerRot::YXZ, fly.yaw, fly.pitch, 0.0);
    } else {
        mouse_motion.clear();
    }

    let forward = *transform.forward();
    let right = *transform.right();
    let mut movement = Vec3::ZERO;

    if keyboard.pressed(KeyCode::KeyW) {
        movement += forward;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        movement -= forward;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        movement -= right;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        movement += right;
    }
    if keyboard.pressed(hotkeys::FLY_UP) {
        movement += Vec3::Y;
    }
    if keyboard.pressed(hotkeys::FLY_DOWN) {
        movement -= Vec3::Y;
    }

    if movement.length_squared() > 0.0 {
        let speed = if keyboard.pressed(KeyCode::ShiftLeft) {
            camera::FLY_SPEED * camera::FAST_MULTIPLIER
        } else {
            camera::FLY_SPEED
        };
        transform.translation += movement.normalize() * speed * time.delta_secs();
    }
}

// Debug function to toggle wireframe rendering on terrain chunks
fn toggle_wireframe(
    keyboard: Res<ButtonInput<KeyCode>>,
    chunks: Query<(Entity, Option<&Wireframe>), With<TerrainChunk>>,
    mut commands: Commands,
) {
    if !keyboard.just_pressed(hotkeys::WIREFRAME_TOGGLE) {
        return;
    }
    for (entity, wireframe) in chunks.iter() {
        if wireframe.is_some() {
            commands.entity(entity).remove::<Wireframe>();
        } else {
            commands.entity(entity).insert(Wireframe);
        }
    }
    debug!("Toggled wireframe on {} chunks", chunks.iter().count());
}
