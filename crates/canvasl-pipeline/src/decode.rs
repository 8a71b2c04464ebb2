//! Media decoding
//!
//! Turns fetched bytes into scene assets. Video frames and full model
//! geometry are left to the host; here a video is only recognised by its
//! container and a model package is summarised from its glTF document.

use crate::media::MediaError;
use canvasl_core::{ModelAsset, Texture, VideoContainer, VideoStream};
use serde_json::Value;

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
const GLB_CHUNK_JSON: u32 = 0x4E4F_534A; // "JSON"
const GLB_HEADER_LEN: usize = 12;
const GLB_CHUNK_HEADER_LEN: usize = 8;

const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];
const OGG_MAGIC: &[u8; 4] = b"OggS";
const MP4_FTYP: &[u8; 4] = b"ftyp";

/// Side length of generated textures
pub const SYNTHETIC_TEXTURE_SIZE: u32 = 32;

/// Decode an encoded image (PNG, JPEG, GIF, BMP, WebP) into a texture
pub fn decode_image(bytes: &[u8]) -> Result<Texture, MediaError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| MediaError::Decode(e.to_string()))?
        .to_rgba8();
    let (width, height) = img.dimensions();
    Texture::from_rgba(width, height, img.into_raw())
        .ok_or_else(|| MediaError::Decode("empty image".to_string()))
}

/// Identify a video container by its leading bytes
pub fn sniff_video(source: &str, bytes: &[u8]) -> Result<VideoStream, MediaError> {
    let container = if bytes.starts_with(&EBML_MAGIC) {
        VideoContainer::WebM
    } else if bytes.starts_with(OGG_MAGIC) {
        VideoContainer::Ogg
    } else if bytes.len() >= 8 && &bytes[4..8] == MP4_FTYP {
        VideoContainer::Mp4
    } else {
        return Err(MediaError::UnsupportedFormat(format!(
            "{source}: not a WebM, MP4 or Ogg stream"
        )));
    };

    Ok(VideoStream {
        source: source.to_string(),
        container,
        byte_len: bytes.len(),
    })
}

/// Summarise a binary glTF (GLB) package or a plain glTF JSON document
pub fn parse_model(source: &str, bytes: &[u8]) -> Result<ModelAsset, MediaError> {
    let document = if bytes.len() >= 4 && read_u32(bytes, 0) == Some(GLB_MAGIC) {
        glb_json_chunk(bytes)?
    } else if bytes.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'{') {
        bytes
    } else {
        return Err(MediaError::UnsupportedFormat(format!(
            "{source}: not a glTF package"
        )));
    };

    let json: Value =
        serde_json::from_slice(document).map_err(|e| MediaError::Decode(e.to_string()))?;
    if json.get("asset").is_none() {
        return Err(MediaError::Decode("glTF document has no asset block".to_string()));
    }

    let count = |key: &str| json.get(key).and_then(Value::as_array).map_or(0, Vec::len);

    Ok(ModelAsset {
        source: source.to_string(),
        generator: json
            .pointer("/asset/generator")
            .and_then(Value::as_str)
            .map(str::to_string),
        node_count: count("nodes"),
        mesh_count: count("meshes"),
        byte_len: bytes.len(),
    })
}

/// Header: magic, version, total length. Then the first chunk must be JSON.
fn glb_json_chunk(bytes: &[u8]) -> Result<&[u8], MediaError> {
    let truncated = || MediaError::Decode("truncated GLB package".to_string());

    let version = read_u32(bytes, 4).ok_or_else(truncated)?;
    if version != 2 {
        return Err(MediaError::UnsupportedFormat(format!(
            "GLB version {version}"
        )));
    }
    let total = read_u32(bytes, 8).ok_or_else(truncated)? as usize;
    if total > bytes.len() {
        return Err(truncated());
    }

    let chunk_len = read_u32(bytes, GLB_HEADER_LEN).ok_or_else(truncated)? as usize;
    let chunk_type = read_u32(bytes, GLB_HEADER_LEN + 4).ok_or_else(truncated)?;
    if chunk_type != GLB_CHUNK_JSON {
        return Err(MediaError::Decode("first GLB chunk is not JSON".to_string()));
    }

    let start = GLB_HEADER_LEN + GLB_CHUNK_HEADER_LEN;
    bytes.get(start..start + chunk_len).ok_or_else(truncated)
}

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let slice = bytes.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

/// Build a texture from an arbitrary payload
///
/// The payload bytes are laid out as a repeating color band so the same
/// payload always produces the same texture.
pub fn synthesize_texture(payload: &[u8]) -> Texture {
    let size = SYNTHETIC_TEXTURE_SIZE;
    if payload.is_empty() {
        return Texture::solid(size, size, [128, 128, 128]);
    }

    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let i = (y * size + x) as usize;
            let b = payload[i % payload.len()];
            let shade = (x * 255 / (size - 1)) as u8;
            pixels.extend_from_slice(&[b, shade ^ b.rotate_left(3), 255 - b, 255]);
        }
    }

    // Dimensions match by construction
    Texture::from_rgba(size, size, pixels).unwrap_or_else(|| Texture::solid(size, size, [128; 3]))
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Minimal GLB with the given JSON chunk
    pub fn glb(json: &str) -> Vec<u8> {
        let mut chunk = json.as_bytes().to_vec();
        while chunk.len() % 4 != 0 {
            chunk.push(b' ');
        }
        let total = 12 + 8 + chunk.len();

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(b"glTF");
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());
        out.extend_from_slice(&(chunk.len() as u32).to_le_bytes());
        out.extend_from_slice(b"JSON");
        out.extend(chunk);
        out
    }

    /// 2x1 PNG, red then blue
    pub fn png() -> Vec<u8> {
        let img = image::RgbaImage::from_raw(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255])
            .expect("valid buffer");
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .expect("png encode");
        out.into_inner()
    }
}
