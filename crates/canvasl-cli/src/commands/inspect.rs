//! Inspect command

use crate::InspectFormat;
use crate::config::ViewerConfig;
use crate::input::InputSource;
use canvasl_core::color::to_hex;
use canvasl_core::{Material, Scene, SceneEntity, Shape, parse_records};
use canvasl_pipeline::{ProjectionReport, ProjectorConfig, SceneProjector};
use std::fmt::Write as _;
use tracing::info;

pub async fn run(
    input: Option<&str>,
    format: InspectFormat,
    config: &ViewerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = InputSource::resolve(input, &config.registry())?;
    info!("Inspecting {}", source);

    let text = source.read().await?;
    let inspection = Inspection::project(&text, config.projector.clone());

    match format {
        InspectFormat::Text => print!("{}", inspection.to_text(&source.to_string())),
        InspectFormat::Json => {
            let json = serde_json::json!({
                "input": source.to_string(),
                "dropped_lines": inspection.dropped,
                "report": inspection.report,
                "scene": inspection.scene,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(())
}

/// A projected document, without media
struct Inspection {
    scene: Scene,
    report: ProjectionReport,
    dropped: usize,
}

impl Inspection {
    fn project(text: &str, config: ProjectorConfig) -> Self {
        let mut scene = Scene::default();
        let mut records = parse_records(text);
        let report = SceneProjector::new(config).project_into(records.by_ref(), &mut scene);
        Self {
            scene,
            report,
            dropped: records.dropped(),
        }
    }

    fn to_text(&self, input: &str) -> String {
        let r = &self.report;
        let mut out = String::new();
        let _ = writeln!(out, "Input:     {}", input);
        let _ = writeln!(
            out,
            "Records:   {} nodes, {} edges, {} ignored, {} malformed lines",
            r.nodes, r.edges, r.ignored, self.dropped
        );
        let _ = writeln!(
            out,
            "Endpoints: {} resolved, {} placeholder",
            r.resolved_endpoints, r.placeholder_endpoints
        );
        let _ = writeln!(out, "Entities:  {}", self.scene.len());
        for entity in self.scene.entities() {
            let _ = writeln!(out, "  {}", describe(entity));
        }
        out
    }
}

fn describe(entity: &SceneEntity) -> String {
    match &entity.shape {
        Shape::Sphere {
            center,
            radius,
            material,
            label,
        } => {
            let mut line = format!(
                "sphere {} r={} {}",
                point(center),
                radius,
                material_name(material)
            );
            if let Some(label) = label {
                let _ = write!(line, " \"{}\"", label);
            }
            line
        }
        Shape::Line { start, end, color } => {
            format!("line   {} -> {} {}", point(start), point(end), to_hex(*color))
        }
        Shape::Plane {
            center,
            size,
            material,
            ..
        } => format!(
            "plane  {} {}x{} {}",
            point(center),
            size[0],
            size[1],
            material_name(material)
        ),
        Shape::Model { origin, asset } => format!("model  {} {}", point(origin), asset.source),
    }
}

fn material_name(material: &Material) -> String {
    match material {
        Material::Solid(rgb) => to_hex(*rgb),
        Material::Texture(tex) => format!("texture {}x{}", tex.width, tex.height),
        Material::Video(stream) => format!("video {}", stream.source),
    }
}

fn point(p: &[f64; 3]) -> String {
    format!("({}, {}, {})", p[0], p[1], p[2])
}
