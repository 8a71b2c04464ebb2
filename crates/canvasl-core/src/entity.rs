//! Renderable scene entities
//!
//! An entity is a shape plus where it came from. Graph records become
//! spheres and lines; media attachments become planes, textured spheres and
//! model instances.

use crate::classify::RecordKind;
use crate::media::{MediaKind, ModelAsset, Texture, VideoStream};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Unique entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Create a new random entity ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Which producer contributed an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "kind", rename_all = "lowercase")]
pub enum EntityOrigin {
    /// Projected from a classified record
    Graph(RecordKind),
    /// Attached by the media stage
    Media(MediaKind),
}

impl EntityOrigin {
    /// Whether the entity came from the record stream
    pub fn is_graph(&self) -> bool {
        matches!(self, Self::Graph(_))
    }
}

/// Surface appearance
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Material {
    /// Flat color
    Solid([u8; 3]),
    /// Image texture
    Texture(Arc<Texture>),
    /// Video stream texture
    Video(VideoStream),
}

impl Material {
    /// Representative color, for renderers that cannot sample
    pub fn base_color(&self) -> [u8; 3] {
        match self {
            Self::Solid(rgb) => *rgb,
            Self::Texture(tex) => tex.average_color(),
            Self::Video(_) => [40, 40, 64],
        }
    }
}

/// Geometry of an entity, in world units
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Shape {
    /// Sphere, used for nodes and the synthetic texture
    Sphere {
        center: [f64; 3],
        radius: f64,
        material: Material,
        label: Option<String>,
    },
    /// Line segment, used for edges
    Line {
        start: [f64; 3],
        end: [f64; 3],
        color: [u8; 3],
    },
    /// Axis-aligned plane facing +z
    Plane {
        center: [f64; 3],
        size: [f64; 2],
        material: Material,
        double_sided: bool,
    },
    /// A loaded model package placed at an origin
    Model { origin: [f64; 3], asset: ModelAsset },
}

impl Shape {
    /// Reference position (center, start point or origin)
    pub fn anchor(&self) -> [f64; 3] {
        match self {
            Self::Sphere { center, .. } | Self::Plane { center, .. } => *center,
            Self::Line { start, .. } => *start,
            Self::Model { origin, .. } => *origin,
        }
    }
}

/// An entity in the scene
#[derive(Debug, Clone, Serialize)]
pub struct SceneEntity {
    /// Unique identifier
    pub id: EntityId,
    /// Producer that added it
    pub origin: EntityOrigin,
    /// Geometry and material
    pub shape: Shape,
}

impl SceneEntity {
    /// Create an entity with a fresh id
    pub fn new(origin: EntityOrigin, shape: Shape) -> Self {
        Self {
            id: EntityId::new(),
            origin,
            shape,
        }
    }

    /// Sphere for a graph node
    pub fn node(center: [f64; 3], radius: f64, color: [u8; 3], label: Option<String>) -> Self {
        Self::new(
            EntityOrigin::Graph(RecordKind::Node),
            Shape::Sphere {
                center,
                radius,
                material: Material::Solid(color),
                label,
            },
        )
    }

    /// Line segment for a graph edge
    pub fn edge(start: [f64; 3], end: [f64; 3], color: [u8; 3]) -> Self {
        Self::new(
            EntityOrigin::Graph(RecordKind::Edge),
            Shape::Line { start, end, color },
        )
    }
}
