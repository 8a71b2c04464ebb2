//! The shared 3D scene
//!
//! A Scene is created once and only ever grows. Several producers contribute
//! to it (the projector, each media attachment) while the display loop reads
//! it every frame, so it is shared through an explicit [`SceneHandle`].

use crate::entity::{EntityId, SceneEntity};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::trace;

/// Perspective camera looking down -z
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Eye position in world space
    pub position: [f64; 3],
    /// Vertical field of view (degrees)
    pub fov_y_degrees: f64,
    /// Near clip distance
    pub near: f64,
    /// Far clip distance
    pub far: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 5.0],
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    /// Focal length for a unit-height image plane: 1 / tan(fov/2)
    pub fn focal_length(&self) -> f64 {
        1.0 / (self.fov_y_degrees.to_radians() / 2.0).tan()
    }
}

/// Render target configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderTarget {
    /// Smooth edges where the backend supports it
    pub antialias: bool,
    /// Whether an immersive session may be entered
    pub xr_enabled: bool,
    /// Clear color
    pub background: [u8; 3],
}

impl Default for RenderTarget {
    fn default() -> Self {
        Self {
            antialias: true,
            xr_enabled: true,
            background: [0, 0, 0],
        }
    }
}

/// Append-only collection of renderable entities with one camera and one
/// render target
///
/// Camera and render target are fixed at construction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Scene {
    camera: Camera,
    render_target: RenderTarget,
    entities: Vec<SceneEntity>,
}

impl Scene {
    /// Create an empty scene
    pub fn new(camera: Camera, render_target: RenderTarget) -> Self {
        Self {
            camera,
            render_target,
            entities: Vec::new(),
        }
    }

    /// Append an entity, returning its id
    pub fn append(&mut self, entity: SceneEntity) -> EntityId {
        let id = entity.id;
        trace!(origin = ?entity.origin, "Appending entity");
        self.entities.push(entity);
        id
    }

    /// Entities in insertion order
    pub fn entities(&self) -> &[SceneEntity] {
        &self.entities
    }

    /// Total entity count
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether nothing has been added yet
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities projected from records
    pub fn graph_entity_count(&self) -> usize {
        self.entities.iter().filter(|e| e.origin.is_graph()).count()
    }

    /// Entities attached by the media stage
    pub fn media_entity_count(&self) -> usize {
        self.len() - self.graph_entity_count()
    }

    /// The scene camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The render target configuration
    pub fn render_target(&self) -> &RenderTarget {
        &self.render_target
    }
}

/// Shared handle to a [`Scene`]
///
/// Cloning the handle shares the scene. The only mutation offered is append;
/// each append or batch completes under one write guard.
#[derive(Debug, Clone, Default)]
pub struct SceneHandle {
    inner: Arc<RwLock<Scene>>,
}

impl SceneHandle {
    /// Wrap a scene for sharing
    pub fn new(scene: Scene) -> Self {
        Self {
            inner: Arc::new(RwLock::new(scene)),
        }
    }

    /// Append one entity
    pub async fn append(&self, entity: SceneEntity) -> EntityId {
        self.inner.write().await.append(entity)
    }

    /// Append a batch in order; nothing else is inserted in between
    pub async fn extend(&self, entities: impl IntoIterator<Item = SceneEntity>) -> usize {
        let mut scene = self.inner.write().await;
        let before = scene.len();
        for entity in entities {
            scene.append(entity);
        }
        scene.len() - before
    }

    /// Run `f` with exclusive access; used by producers that build several
    /// entities from one pass
    pub async fn with_scene_mut<T>(&self, f: impl FnOnce(&mut Scene) -> T) -> T {
        let mut scene = self.inner.write().await;
        f(&mut scene)
    }

    /// Read access for rendering
    pub async fn read(&self) -> RwLockReadGuard<'_, Scene> {
        self.inner.read().await
    }

    /// Current entity count
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether the scene is still empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityOrigin, Material, Shape};
    use crate::media::MediaKind;

    fn plane() -> SceneEntity {
        SceneEntity::new(
            EntityOrigin::Media(MediaKind::Image),
            Shape::Plane {
                center: [0.0, 0.0, -5.0],
                size: [5.0, 5.0],
                material: Material::Solid([1, 1, 1]),
                double_sided: true,
            },
        )
    }

    #[test]
    fn test_default_camera() {
        let scene = Scene::default();
        assert_eq!(scene.camera().position, [0.0, 0.0, 5.0]);
        assert_eq!(scene.camera().fov_y_degrees, 75.0);
        assert!(scene.render_target().xr_enabled);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_focal_length() {
        let camera = Camera {
            fov_y_degrees: 90.0,
            ..Default::default()
        };
        assert!((camera.focal_length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_append_preserves_order_and_counts() {
        let mut scene = Scene::default();
        let a = scene.append(SceneEntity::node([0.0; 3], 1.0, [0, 255, 0], None));
        let b = scene.append(plane());
        let c = scene.append(SceneEntity::edge([0.0; 3], [1.0; 3], [255, 0, 0]));

        let ids: Vec<_> = scene.entities().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a, b, c]);
        assert_eq!(scene.graph_entity_count(), 2);
        assert_eq!(scene.media_entity_count(), 1);
    }

    #[tokio::test]
    async fn test_handle_shares_scene() {
        let handle = SceneHandle::new(Scene::default());
        let other = handle.clone();

        other.append(plane()).await;
        let added = handle
            .extend(vec![
                SceneEntity::node([0.0; 3], 1.0, [0, 255, 0], None),
                SceneEntity::node([1.0; 3], 1.0, [0, 255, 0], None),
            ])
            .await;

        assert_eq!(added, 2);
        assert_eq!(handle.len().await, 3);
        assert_eq!(other.read().await.graph_entity_count(), 2);
    }

    #[test]
    fn test_scene_serializes() {
        let mut scene = Scene::default();
        scene.append(plane());
        let json = serde_json::to_value(&scene).unwrap();
        assert_eq!(json["entities"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["camera"]["near"], 0.1);
    }
}
