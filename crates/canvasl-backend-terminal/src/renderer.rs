//! Terminal scene renderer
//!
//! Rasterises the scene through its camera into character cells. Cells are
//! about twice as tall as they are wide, so horizontal extents are stretched
//! by the cell aspect. Every plotted cell is depth tested, so entities may be
//! drawn in scene order.

use canvasl_core::{
    Camera, Material, ModelAsset, Scene, SceneEntity, Shape, TerminalCell, TerminalFrame,
};
use canvasl_pipeline::{RenderError, SceneRenderer, SessionMode};
use rayon::prelude::*;
use std::f64::consts::PI;
use tracing::trace;

/// Stereo eye separation in world units
pub const EYE_SEPARATION: f64 = 0.064;

/// Height of a terminal cell relative to its width
pub const CELL_ASPECT: f64 = 2.0;

const SHADE_RAMP: [char; 9] = ['.', ':', '-', '=', '+', '*', '#', '%', '@'];
const LABEL_COLOR: [u8; 3] = [220, 220, 220];
const MODEL_COLOR: [u8; 3] = [255, 200, 64];

// Upper left, towards the viewer
const LIGHT: [f64; 3] = [-0.4, 0.55, 0.733];

/// Software renderer producing character frames
#[derive(Debug, Clone)]
pub struct TerminalRenderer {
    width: u32,
    height: u32,
    cell_aspect: f64,
    eye_separation: f64,
}

impl TerminalRenderer {
    /// Create a renderer for a surface of `width` x `height` cells
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cell_aspect: CELL_ASPECT,
            eye_separation: EYE_SEPARATION,
        }
    }

    /// Override the cell aspect
    pub fn with_cell_aspect(mut self, aspect: f64) -> Self {
        self.cell_aspect = aspect;
        self
    }

    /// Override the stereo eye separation
    pub fn with_eye_separation(mut self, separation: f64) -> Self {
        self.eye_separation = separation;
        self
    }

    /// Change the surface size
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Surface size in cells
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Render one view with the camera shifted sideways by `eye_offset`
    fn render_view(&self, scene: &Scene, eye_offset: f64, width: u32, height: u32) -> TerminalFrame {
        let view = View::new(scene.camera(), eye_offset, width, height, self.cell_aspect);
        let target = scene.render_target();
        let mut canvas = Canvas::new(width, height, target.background);

        for entity in scene.entities() {
            draw_entity(&mut canvas, &view, entity, target.antialias);
        }

        canvas.frame
    }
}

impl SceneRenderer for TerminalRenderer {
    type Frame = TerminalFrame;

    fn name(&self) -> &'static str {
        "terminal_renderer"
    }

    fn render(&mut self, scene: &Scene, mode: SessionMode) -> Result<TerminalFrame, RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidSurface(format!(
                "{}x{} surface",
                self.width, self.height
            )));
        }

        let frame = match mode {
            SessionMode::Inline => self.render_view(scene, 0.0, self.width, self.height),
            SessionMode::Immersive => {
                let eye_width = self.width / 2;
                if eye_width == 0 {
                    return Err(RenderError::InvalidSurface(format!(
                        "{} columns is too narrow for two eye views",
                        self.width
                    )));
                }
                let half = self.eye_separation / 2.0;
                let left = self.render_view(scene, -half, eye_width, self.height);
                let right = self.render_view(scene, half, eye_width, self.height);

                let mut frame = TerminalFrame::new(self.width, self.height);
                frame.fill(TerminalCell::new(' ').with_bg(scene.render_target().background));
                frame.blit(0, 0, &left);
                frame.blit(eye_width, 0, &right);
                frame
            }
        };

        trace!(entities = scene.len(), ?mode, "Rendered frame");
        Ok(frame)
    }
}

/// Camera placement for one view, in screen terms
struct View {
    eye: [f64; 3],
    focal: f64,
    near: f64,
    far: f64,
    half_w: f64,
    half_h: f64,
    aspect: f64,
}

impl View {
    fn new(camera: &Camera, eye_offset: f64, width: u32, height: u32, aspect: f64) -> Self {
        let [x, y, z] = camera.position;
        Self {
            eye: [x + eye_offset, y, z],
            focal: camera.focal_length(),
            near: camera.near,
            far: camera.far,
            half_w: width as f64 / 2.0,
            half_h: height as f64 / 2.0,
            aspect,
        }
    }

    /// Distance in front of the camera (it looks down -z)
    fn depth_of(&self, p: [f64; 3]) -> f64 {
        self.eye[2] - p[2]
    }

    fn visible(&self, depth: f64) -> bool {
        depth >= self.near && depth <= self.far
    }

    /// Screen position of `p`, which must be at `depth`
    fn to_screen(&self, p: [f64; 3], depth: f64) -> (f64, f64) {
        let x = self.focal * (p[0] - self.eye[0]) / depth;
        let y = self.focal * (p[1] - self.eye[1]) / depth;
        (
            self.half_w + x * self.half_h * self.aspect,
            self.half_h - y * self.half_h,
        )
    }

    /// Rows covered by one world unit at `depth`
    fn rows_per_unit(&self, depth: f64) -> f64 {
        self.focal / depth * self.half_h
    }
}

/// Frame plus depth buffer
struct Canvas {
    frame: TerminalFrame,
    depth: Vec<f64>,
    background: [u8; 3],
}

impl Canvas {
    fn new(width: u32, height: u32, background: [u8; 3]) -> Self {
        let mut frame = TerminalFrame::new(width, height);
        let blank = TerminalCell::new(' ').with_bg(background);
        frame
            .cells
            .par_chunks_mut(width.max(1) as usize)
            .for_each(|row| row.fill(blank));

        Self {
            frame,
            depth: vec![f64::INFINITY; width as usize * height as usize],
            background,
        }
    }

    /// Column range clamped to the frame
    fn cols(&self, from: f64, to: f64) -> std::ops::RangeInclusive<i32> {
        from.floor().max(0.0) as i32..=to.ceil().min(self.frame.width as f64 - 1.0) as i32
    }

    /// Row range clamped to the frame
    fn rows(&self, from: f64, to: f64) -> std::ops::RangeInclusive<i32> {
        from.floor().max(0.0) as i32..=to.ceil().min(self.frame.height as f64 - 1.0) as i32
    }

    /// Write a cell if it is on the surface and nearer than what is there
    fn plot(&mut self, x: i32, y: i32, depth: f64, mut cell: TerminalCell) {
        if x < 0 || y < 0 || x as u32 >= self.frame.width || y as u32 >= self.frame.height {
            return;
        }
        let i = y as usize * self.frame.width as usize + x as usize;
        if depth < self.depth[i] {
            self.depth[i] = depth;
            cell.bg = cell.bg.or(Some(self.background));
            self.frame.cells[i] = cell;
        }
    }

    /// Draw `text` from column `x`; columns past the surface edge are dropped
    fn label(&mut self, x: i32, y: i32, depth: f64, text: &str, fg: [u8; 3]) {
        for (i, ch) in text.chars().enumerate() {
            let col = x.saturating_add(i32::try_from(i).unwrap_or(i32::MAX));
            if col >= 0 && col as u32 >= self.frame.width {
                break;
            }
            self.plot(col, y, depth, TerminalCell::new(ch).with_fg(fg));
        }
    }
}

fn draw_entity(canvas: &mut Canvas, view: &View, entity: &SceneEntity, antialias: bool) {
    match &entity.shape {
        Shape::Sphere {
            center,
            radius,
            material,
            label,
        } => draw_sphere(canvas, view, *center, *radius, material, label.as_deref(), antialias),
        Shape::Line { start, end, color } => draw_line(canvas, view, *start, *end, *color),
        Shape::Plane {
            center,
            size,
            material,
            ..
        } => draw_plane(canvas, view, *center, *size, material),
        Shape::Model { origin, asset } => draw_model(canvas, view, *origin, asset),
    }
}

fn draw_sphere(
    canvas: &mut Canvas,
    view: &View,
    center: [f64; 3],
    radius: f64,
    material: &Material,
    label: Option<&str>,
    antialias: bool,
) {
    let depth = view.depth_of(center);
    if !view.visible(depth) {
        return;
    }
    let (sx, sy) = view.to_screen(center, depth);
    let ry = radius * view.rows_per_unit(depth);
    let rx = ry * view.aspect;
    let base = material.base_color();

    if ry < 1.0 {
        // Smaller than a cell
        canvas.plot(
            sx.floor() as i32,
            sy.floor() as i32,
            depth - radius,
            TerminalCell::new('o').with_fg(base),
        );
    } else {
        for y in canvas.rows(sy - ry, sy + ry) {
            for x in canvas.cols(sx - rx, sx + rx) {
                let dx = (x as f64 + 0.5 - sx) / rx;
                let dy = (y as f64 + 0.5 - sy) / ry;
                let d2 = dx * dx + dy * dy;
                if d2 > 1.0 {
                    continue;
                }

                let nz = (1.0 - d2).sqrt();
                let normal = [dx, -dy, nz];
                let intensity = 0.3 + 0.7 * dot(normal, LIGHT).max(0.0);
                let rgb = match material {
                    Material::Texture(tex) => {
                        let u = 0.5 + normal[0].atan2(normal[2]) / (2.0 * PI);
                        let v = 0.5 - normal[1].clamp(-1.0, 1.0).asin() / PI;
                        let [r, g, b, _] = tex.sample(u, v);
                        [r, g, b]
                    }
                    _ => base,
                };
                let glyph = if antialias && d2 > 0.85 {
                    '.'
                } else {
                    shade_glyph(intensity)
                };

                canvas.plot(
                    x,
                    y,
                    depth - radius * nz,
                    TerminalCell::new(glyph).with_fg(scale(rgb, intensity)),
                );
            }
        }
    }

    if let Some(text) = label {
        let x = ((sx + rx.max(1.0)).ceil() as i32).saturating_add(1);
        canvas.label(x, sy.floor() as i32, depth - radius, text, LABEL_COLOR);
    }
}

fn draw_plane(canvas: &mut Canvas, view: &View, center: [f64; 3], size: [f64; 2], material: &Material) {
    let depth = view.depth_of(center);
    if !view.visible(depth) {
        return;
    }

    let [cx, cy, cz] = center;
    let (left, top) = view.to_screen([cx - size[0] / 2.0, cy + size[1] / 2.0, cz], depth);
    let (right, bottom) = view.to_screen([cx + size[0] / 2.0, cy - size[1] / 2.0, cz], depth);
    let (span_x, span_y) = (right - left, bottom - top);
    if span_x <= 0.0 || span_y <= 0.0 {
        return;
    }

    for y in canvas.rows(top, bottom) {
        for x in canvas.cols(left, right) {
            let u = (x as f64 + 0.5 - left) / span_x;
            let v = (y as f64 + 0.5 - top) / span_y;
            if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
                continue;
            }

            let cell = match material {
                Material::Texture(tex) => {
                    let [r, g, b, a] = tex.sample(u, v);
                    if a < 128 {
                        continue;
                    }
                    TerminalCell::new('█').with_fg([r, g, b])
                }
                Material::Solid(rgb) => TerminalCell::new('█').with_fg(*rgb),
                Material::Video(_) => TerminalCell::new('▒').with_fg(material.base_color()),
            };
            canvas.plot(x, y, depth, cell);
        }
    }

    if let Material::Video(stream) = material {
        let text = format!("▶ {}", file_name(&stream.source));
        let x = ((left + right) / 2.0 - text.chars().count() as f64 / 2.0).floor() as i32;
        let y = ((top + bottom) / 2.0).floor() as i32;
        canvas.label(x, y, depth - 1e-6, &text, LABEL_COLOR);
    }
}

fn draw_model(canvas: &mut Canvas, view: &View, origin: [f64; 3], asset: &ModelAsset) {
    let depth = view.depth_of(origin);
    if !view.visible(depth) {
        return;
    }
    let (sx, sy) = view.to_screen(origin, depth);
    let (x, y) = (sx.floor() as i32, sy.floor() as i32);

    canvas.plot(x, y, depth, TerminalCell::new('◆').with_fg(MODEL_COLOR).with_bold(true));
    canvas.label(x.saturating_add(2), y, depth, file_name(&asset.source), MODEL_COLOR);
}

fn draw_line(canvas: &mut Canvas, view: &View, start: [f64; 3], end: [f64; 3], color: [u8; 3]) {
    let Some((a, b)) = clip_near(view, start, end) else {
        return;
    };
    let (da, db) = (view.depth_of(a), view.depth_of(b));
    if da > view.far && db > view.far {
        return;
    }

    let pa = view.to_screen(a, da);
    let pb = view.to_screen(b, db);
    let Some((t0, t1)) = clip_rect(
        pa,
        pb,
        canvas.frame.width as f64,
        canvas.frame.height as f64,
    ) else {
        return;
    };

    let at = |t: f64| (pa.0 + (pb.0 - pa.0) * t, pa.1 + (pb.1 - pa.1) * t);
    let (s, e) = (at(t0), at(t1));
    let glyph = line_glyph(pb.0 - pa.0, pb.1 - pa.1, view.aspect);
    let cell = TerminalCell::new(glyph).with_fg(color);

    let (x0, y0) = (s.0.floor() as i32, s.1.floor() as i32);
    let (x1, y1) = (e.0.floor() as i32, e.1.floor() as i32);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let steps = dx.max(-dy).max(1) as f64;
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    let mut step = 0.0;

    loop {
        let t = t0 + (t1 - t0) * (step / steps);
        canvas.plot(x, y, da + (db - da) * t, cell);

        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        step += 1.0;
    }
}

/// Cut a segment at the near plane; `None` when it is wholly behind it
fn clip_near(view: &View, a: [f64; 3], b: [f64; 3]) -> Option<([f64; 3], [f64; 3])> {
    let (da, db) = (view.depth_of(a), view.depth_of(b));
    match (da >= view.near, db >= view.near) {
        (true, true) => Some((a, b)),
        (false, false) => None,
        (true, false) => Some((a, lerp(a, b, (da - view.near) / (da - db)))),
        (false, true) => Some((lerp(b, a, (db - view.near) / (db - da)), b)),
    }
}

/// Liang-Barsky clip of a screen segment to the surface, as parameters on it
fn clip_rect(p0: (f64, f64), p1: (f64, f64), width: f64, height: f64) -> Option<(f64, f64)> {
    let (dx, dy) = (p1.0 - p0.0, p1.1 - p0.1);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);

    for (p, q) in [
        (-dx, p0.0),
        (dx, width - p0.0),
        (-dy, p0.1),
        (dy, height - p0.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
    }

    // The far edges are exclusive; pull back so the end cell stays on the surface
    let len = (dx * dx + dy * dy).sqrt();
    if len > 0.0 && t1 > t0 {
        t1 = (t1 - 0.5 / len).max(t0);
    }
    Some((t0, t1))
}

/// Glyph following a screen-space direction (rows are `aspect` times taller)
fn line_glyph(dx: f64, dy: f64, aspect: f64) -> char {
    let (ax, ay) = (dx.abs(), dy.abs() * aspect);
    if ay < ax * 0.4 {
        '-'
    } else if ax < ay * 0.4 {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}

fn shade_glyph(intensity: f64) -> char {
    let idx = (intensity.clamp(0.0, 1.0) * (SHADE_RAMP.len() - 1) as f64).round() as usize;
    SHADE_RAMP[idx.min(SHADE_RAMP.len() - 1)]
}

fn scale(rgb: [u8; 3], intensity: f64) -> [u8; 3] {
    rgb.map(|c| (c as f64 * intensity.clamp(0.0, 1.0)).round() as u8)
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn lerp(a: [f64; 3], b: [f64; 3], t: f64) -> [f64; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

fn file_name(source: &str) -> &str {
    source.rsplit(['/', '\\']).next().unwrap_or(source)
}
