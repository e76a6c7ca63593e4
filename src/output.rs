//! PNG output and file path generation

use image::imageops::FilterType;
use image::RgbaImage;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Create the parent directories of `path` when missing.
pub(crate) fn ensure_parent(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Save an RGBA image to a PNG file, creating parent directories.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    ensure_parent(path)?;
    image.save(path)?;
    Ok(())
}

/// Scale image by integer factor using nearest-neighbor interpolation.
///
/// This keeps every dot of the panel a crisp square.
pub fn scale_image(image: RgbaImage, factor: u32) -> RgbaImage {
    if factor <= 1 {
        return image;
    }
    let (w, h) = image.dimensions();
    image::imageops::resize(&image, w * factor, h * factor, FilterType::Nearest)
}

/// Generate the output path for a rendered scene.
///
/// | Scenario | Output |
/// |----------|--------|
/// | No `-o` | `{scene_stem}.{ext}` next to the scene |
/// | `-o out.png`, one scene | `out.png` |
/// | `-o out.png`, several scenes | `out_{scene_stem}.png` |
/// | `-o dir/` | `dir/{scene_stem}.{ext}` |
pub fn output_path(scene: &Path, output_arg: Option<&Path>, is_single: bool, extension: &str) -> PathBuf {
    let scene_stem = scene.file_stem().and_then(|s| s.to_str()).unwrap_or("frame");
    match output_arg {
        Some(output) => {
            let is_dir = output.as_os_str().to_string_lossy().ends_with('/') || output.is_dir();
            if is_dir {
                output.join(format!("{}.{}", scene_stem, extension))
            } else if is_single {
                output.to_path_buf()
            } else {
                let stem = output.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
                let ext = output.extension().and_then(|s| s.to_str()).unwrap_or(extension);
                sibling(output, format!("{}_{}.{}", stem, scene_stem, ext))
            }
        }
        None => sibling(scene, format!("{}.{}", scene_stem, extension)),
    }
}

fn sibling(path: &Path, file_name: String) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(file_name),
        _ => PathBuf::from(file_name),
    }
}
