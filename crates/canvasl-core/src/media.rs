//! Decoded media assets
//!
//! These are the in-memory results of the media attachment stage. Decoding
//! itself lives in `canvasl-pipeline`; the scene only stores what came out.

use serde::{Deserialize, Serialize};

/// Category of attached media. Each category has a fixed anchor in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image on a plane
    Image,
    /// Streaming video on a plane
    Video,
    /// Packaged 3D model
    Model,
    /// Texture built in memory
    Synthetic,
}

impl MediaKind {
    /// All kinds, in attachment declaration order
    pub const ALL: [MediaKind; 4] = [Self::Image, Self::Video, Self::Model, Self::Synthetic];

    /// Lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Model => "model",
            Self::Synthetic => "synthetic",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RGBA8 texture
#[derive(Debug, Clone, Serialize)]
pub struct Texture {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Row-major RGBA pixel data
    #[serde(skip)]
    pixels: Vec<u8>,
    /// Mean color, computed once
    average: [u8; 3],
}

impl Texture {
    /// Build a texture from RGBA data
    ///
    /// Returns `None` when the buffer length does not match the dimensions.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 || pixels.len() != (width as usize * height as usize * 4) {
            return None;
        }
        let average = mean_color(&pixels);
        Some(Self {
            width,
            height,
            pixels,
            average,
        })
    }

    /// Single-color texture
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            pixels.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
        Self {
            width,
            height,
            pixels,
            average: rgb,
        }
    }

    /// Raw RGBA data
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Nearest-neighbour sample at normalized coordinates (clamped to 0..1)
    pub fn sample(&self, u: f64, v: f64) -> [u8; 4] {
        if self.pixels.is_empty() {
            return [0, 0, 0, 0];
        }
        let x = ((u.clamp(0.0, 1.0) * self.width as f64) as u32).min(self.width - 1);
        let y = ((v.clamp(0.0, 1.0) * self.height as f64) as u32).min(self.height - 1);
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Mean RGB over all pixels
    pub fn average_color(&self) -> [u8; 3] {
        self.average
    }
}

fn mean_color(pixels: &[u8]) -> [u8; 3] {
    let count = (pixels.len() / 4) as u64;
    if count == 0 {
        return [0, 0, 0];
    }
    let mut sum = [0u64; 3];
    for px in pixels.chunks_exact(4) {
        sum[0] += px[0] as u64;
        sum[1] += px[1] as u64;
        sum[2] += px[2] as u64;
    }
    [
        (sum[0] / count) as u8,
        (sum[1] / count) as u8,
        (sum[2] / count) as u8,
    ]
}

/// Container format of a video stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoContainer {
    /// WebM / Matroska (EBML)
    WebM,
    /// ISO base media (MP4, MOV)
    Mp4,
    /// Ogg
    Ogg,
}

/// A video stream attached to the scene; frames are decoded by the host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoStream {
    /// Where the stream came from
    pub source: String,
    /// Detected container
    pub container: VideoContainer,
    /// Stream size in bytes
    pub byte_len: usize,
}

/// Summary of a loaded 3D model package
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelAsset {
    /// Where the model came from
    pub source: String,
    /// `asset.generator` from the glTF document, if any
    pub generator: Option<String>,
    /// Number of scene nodes
    pub node_count: usize,
    /// Number of meshes
    pub mesh_count: usize,
    /// Package size in bytes
    pub byte_len: usize,
}
