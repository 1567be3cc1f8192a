use bevy::prelude::*;
use bevy::render::mesh::Indices;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::PrimitiveTopology;

use crate::terrain::collaborators::ChunkMaterializer;
use crate::terrain::coords::ChunkCoord;
use crate::terrain::mesh::ChunkMeshData;

/// Marks an entity holding one streamed terrain chunk.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainChunk {
    pub coord: ChunkCoord,
}

/// Materializes chunks as mesh entities parented under the landscape root.
///
/// Lives for a single system run; every change goes through `Commands` and
/// lands when the system's commands are applied.
pub struct EntityMaterializer<'a, 'w, 's> {
    pub commands: &'a mut Commands<'w, 's>,
    pub meshes: &'a mut Assets<Mesh>,
    pub material: Handle<StandardMaterial>,
    pub root: Entity,
}

impl ChunkMaterializer for EntityMaterializer<'_, '_, '_> {
    type Handle = Entity;

    fn begin_materialize(&mut self, coord: ChunkCoord, mesh: &ChunkMeshData) -> Entity {
        let mesh = self.meshes.add(build_mesh(mesh));

        self.commands
            .spawn((
                Name::new(format!("Chunk ({}, {})", coord.x, coord.z)),
                TerrainChunk { coord },
                Mesh3d(mesh),
                MeshMaterial3d(self.material.clone()),
                Visibility::Hidden,
            ))
            .id()
    }

    fn finish_materialize(&mut self, entity: Entity, transform: Transform) -> Entity {
        self.commands
            .entity(entity)
            .insert((transform, Visibility::Inherited))
            .set_parent(self.root);
        entity
    }

    fn destroy(&mut self, entity: Entity) {
        if let Some(entity_commands) = self.commands.get_entity(entity) {
            entity_commands.despawn_recursive();
        } else {
            warn!("Chunk entity {:?} was already despawned", entity);
        }
    }
}

/// Copy generated buffers into a render mesh. The source buffers are reused
/// for the next chunk, so they are cloned rather than moved.
pub fn build_mesh(data: &ChunkMeshData) -> Mesh {
    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    );

    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, data.positions.clone());
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, data.normals.clone());
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, data.uvs.clone());
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, data.colors.clone());
    mesh.insert_attribute(Mesh::ATTRIBUTE_TANGENT, data.tangents.clone());
    mesh.insert_indices(Indices::U32(data.indices.clone()));
    mesh
}

/// Shared surface for every chunk.
pub fn terrain_material() -> StandardMaterial {
    StandardMaterial {
        base_color: Color::srgb(0.45, 0.6, 0.35),
        perceptual_roughness: 0.9,
        metallic: 0.0,
        reflectance: 0.1,
        cull_mode: Some(bevy::render::render_resource::Face::Back),
        ..default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::mesh::{synthesize, GenerationRequest};
    use bevy::ecs::world::CommandQueue;
    use noise::Perlin;

    fn small_mesh() -> ChunkMeshData {
        synthesize(
            &GenerationRequest {
                resolution: 2,
                ..Default::default()
            },
            &Perlin::new(3),
        )
    }

    #[test]
    fn materialized_chunk_is_placed_parented_and_shares_the_material() {
        let mut world = World::new();
        let mut meshes = Assets::<Mesh>::default();
        let material = Handle::<StandardMaterial>::weak_from_u128(0x1a2d);
        let root = world.spawn_empty().id();
        let coord = ChunkCoord::new(2, -3);

        let mut queue = CommandQueue::default();
        let entity = {
            let mut commands = Commands::new(&mut queue, &world);
            let mut materializer = EntityMaterializer {
                commands: &mut commands,
                meshes: &mut meshes,
                material: material.clone(),
                root,
            };
            let provisional = materializer.begin_materialize(coord, &small_mesh());
            materializer.finish_materialize(provisional, Transform::from_xyz(150.0, 0.0, -350.0))
        };
        queue.apply(&mut world);

        assert_eq!(world.get::<TerrainChunk>(entity), Some(&TerrainChunk { coord }));
        assert_eq!(world.get::<MeshMaterial3d<StandardMaterial>>(entity).map(|m| m.0.id()), Some(material.id()));
        assert_eq!(world.get::<Transform>(entity).map(|t| t.translation), Some(Vec3::new(150.0, 0.0, -350.0)));
        assert_eq!(world.get::<Visibility>(entity), Some(&Visibility::Inherited));
        assert_eq!(world.get::<Parent>(entity).map(|p| p.get()), Some(root));
        assert_eq!(world.get::<Name>(entity).map(|n| n.as_str()), Some("Chunk (2, -3)"));
        assert_eq!(meshes.len(), 1);
    }

    #[test]
    fn destroying_twice_only_despawns_once() {
        let mut world = World::new();
        let mut meshes = Assets::<Mesh>::default();
        let root = world.spawn_empty().id();

        let mut queue = CommandQueue::default();
        let entity = {
            let mut commands = Commands::new(&mut queue, &world);
            let mut materializer = EntityMaterializer {
                commands: &mut commands,
                meshes: &mut meshes,
                material: Handle::default(),
                root,
            };
            let provisional = materializer.begin_materialize(ChunkCoord::new(0, 0), &small_mesh());
            materializer.finish_materialize(provisional, Transform::IDENTITY)
        };
        queue.apply(&mut world);

        for _ in 0..2 {
            {
                let mut commands = Commands::new(&mut queue, &world);
                EntityMaterializer {
                    commands: &mut commands,
                    meshes: &mut meshes,
                    material: Handle::default(),
                    root,
                }
                .destroy(entity);
            }
            queue.apply(&mut world);
        }

        assert!(!world.entities().contains(entity));
        assert!(world.entities().contains(root));
    }

    #[test]
    fn render_mesh_carries_every_attribute() {
        let data = synthesize(
            &GenerationRequest {
                coord: ChunkCoord::new(1, 1),
                resolution: 3,
                ..Default::default()
            },
            &Perlin::new(3),
        );
        let mesh = build_mesh(&data);

        assert_eq!(mesh.count_vertices(), 16);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(54));
        for attribute in [
            Mesh::ATTRIBUTE_POSITION,
            Mesh::ATTRIBUTE_NORMAL,
            Mesh::ATTRIBUTE_UV_0,
            Mesh::ATTRIBUTE_COLOR,
            Mesh::ATTRIBUTE_TANGENT,
        ] {
            assert!(mesh.contains_attribute(attribute));
        }
    }
}
