//! CanvasL → scene projection
//!
//! Maps the 2D canvas coordinate space into the 3D scene: a node at canvas
//! `(x, y)` becomes a sphere at `(x / 10, y / 10, 0)`. Edges are resolved
//! against nodes already seen in the same pass; an endpoint that names an
//! unknown node falls back to a fixed placeholder point.

use canvasl_core::color::{DEFAULT_EDGE_COLOR, DEFAULT_NODE_COLOR, parse_color};
use canvasl_core::{Record, RecordKind, Scene, SceneEntity, SceneHandle, classify};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{Level, debug, info, span};

/// Projection constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectorConfig {
    /// Canvas units per scene unit
    pub coordinate_divisor: f64,
    /// Node sphere radius
    pub node_radius: f64,
    /// Color for nodes without a readable color
    pub default_node_color: [u8; 3],
    /// Edge line color
    pub edge_color: [u8; 3],
    /// Placeholder start point for an unresolved `from`
    pub placeholder_start: [f64; 3],
    /// Placeholder end point for an unresolved `to`
    pub placeholder_end: [f64; 3],
    /// Resolve edge endpoints against projected nodes
    pub resolve_edges: bool,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            coordinate_divisor: 10.0,
            node_radius: 1.0,
            default_node_color: DEFAULT_NODE_COLOR,
            edge_color: DEFAULT_EDGE_COLOR,
            placeholder_start: [0.0, 0.0, 0.0],
            placeholder_end: [5.0, 5.0, 10.0],
            resolve_edges: true,
        }
    }
}

impl ProjectorConfig {
    /// Every edge drawn as the fixed placeholder segment
    pub fn placeholder_edges() -> Self {
        Self {
            resolve_edges: false,
            ..Default::default()
        }
    }
}

/// Counts from one projection pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectionReport {
    /// Spheres appended
    pub nodes: usize,
    /// Line segments appended
    pub edges: usize,
    /// Records that produced nothing
    pub ignored: usize,
    /// Edge endpoints placed at a known node
    pub resolved_endpoints: usize,
    /// Edge endpoints placed at a placeholder
    pub placeholder_endpoints: usize,
}

impl ProjectionReport {
    /// Entities appended by this pass
    pub fn entities(&self) -> usize {
        self.nodes + self.edges
    }
}

/// Turns classified records into scene entities
#[derive(Debug, Clone, Default)]
pub struct SceneProjector {
    config: ProjectorConfig,
    /// Node id → scene position, filled as nodes are projected
    node_positions: HashMap<String, [f64; 3]>,
}

impl SceneProjector {
    /// Create a projector
    pub fn new(config: ProjectorConfig) -> Self {
        Self {
            config,
            node_positions: HashMap::new(),
        }
    }

    /// Projection constants in use
    pub fn config(&self) -> &ProjectorConfig {
        &self.config
    }

    /// Position recorded for a node id
    pub fn node_position(&self, id: &str) -> Option<[f64; 3]> {
        self.node_positions.get(id).copied()
    }

    /// Scene position for canvas coordinates; missing values count as 0
    pub fn project_point(&self, x: Option<f64>, y: Option<f64>) -> [f64; 3] {
        let divisor = self.config.coordinate_divisor;
        [x.unwrap_or(0.0) / divisor, y.unwrap_or(0.0) / divisor, 0.0]
    }

    /// Build the entity for one record, or `None` if it is ignored
    pub fn project_record(&mut self, record: &Record) -> Option<SceneEntity> {
        self.project_classified(record, classify(record), &mut ProjectionReport::default())
    }

    fn project_classified(
        &mut self,
        record: &Record,
        kind: RecordKind,
        report: &mut ProjectionReport,
    ) -> Option<SceneEntity> {
        match kind {
            RecordKind::Node => {
                let center = self.project_point(record.x(), record.y());
                let color = match record.color() {
                    Some(value) => parse_color(value).unwrap_or_else(|| {
                        debug!(color = %value, "Unreadable node color, using default");
                        self.config.default_node_color
                    }),
                    None => self.config.default_node_color,
                };
                if let Some(id) = record.id() {
                    self.node_positions.insert(id, center);
                }
                report.nodes += 1;

                let label = record.label().map(str::to_string).or_else(|| record.id());
                Some(SceneEntity::node(
                    center,
                    self.config.node_radius,
                    color,
                    label,
                ))
            }
            RecordKind::Edge => {
                let start = self.resolve(record.from(), self.config.placeholder_start, report);
                let end = self.resolve(record.to(), self.config.placeholder_end, report);
                report.edges += 1;
                Some(SceneEntity::edge(start, end, self.config.edge_color))
            }
            RecordKind::Ignored => {
                report.ignored += 1;
                None
            }
        }
    }

    fn resolve(
        &self,
        endpoint: Option<String>,
        placeholder: [f64; 3],
        report: &mut ProjectionReport,
    ) -> [f64; 3] {
        let known = if self.config.resolve_edges {
            endpoint.and_then(|id| self.node_positions.get(&id).copied())
        } else {
            None
        };
        match known {
            Some(position) => {
                report.resolved_endpoints += 1;
                position
            }
            None => {
                report.placeholder_endpoints += 1;
                placeholder
            }
        }
    }

    /// Project records into a scene, in arrival order
    pub fn project_into<I>(&mut self, records: I, scene: &mut Scene) -> ProjectionReport
    where
        I: IntoIterator<Item = Record>,
    {
        let span = span!(Level::DEBUG, "project");
        let _enter = span.enter();

        let mut report = ProjectionReport::default();
        for record in records {
            let kind = classify(&record);
            if let Some(entity) = self.project_classified(&record, kind, &mut report) {
                scene.append(entity);
            }
        }

        info!(
            nodes = report.nodes,
            edges = report.edges,
            ignored = report.ignored,
            placeholder_endpoints = report.placeholder_endpoints,
            "Projected CanvasL records"
        );
        report
    }

    /// Project records into a shared scene under a single write guard
    ///
    /// No other producer's append can land between two entities of this pass.
    pub async fn project<I>(&mut self, records: I, scene: &SceneHandle) -> ProjectionReport
    where
        I: IntoIterator<Item = Record>,
    {
        scene
            .with_scene_mut(|scene| self.project_into(records, scene))
            .await
    }
}
