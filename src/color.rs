//! RGB565 palette values and their conversion to displayable images.

use image::{Rgba, RgbaImage};

/// Expand a 16-bit RGB565 color to opaque RGBA8.
///
/// Channels are widened by bit replication so that full-scale values map to
/// 255.
///
/// ```
/// use dmdcolor::color::rgb565_to_rgba;
///
/// assert_eq!(rgb565_to_rgba(0xffff), image::Rgba([255, 255, 255, 255]));
/// assert_eq!(rgb565_to_rgba(0xf800), image::Rgba([255, 0, 0, 255]));
/// ```
pub fn rgb565_to_rgba(color: u16) -> Rgba<u8> {
    let r = ((color >> 11) & 0x1f) as u8;
    let g = ((color >> 5) & 0x3f) as u8;
    let b = (color & 0x1f) as u8;
    Rgba([(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2), 255])
}

/// Convert a rendered RGB565 buffer into an image.
///
/// Returns `None` when the buffer does not hold exactly `width * height`
/// pixels.
pub fn frame_to_image(pixels: &[u16], width: u32, height: u32) -> Option<RgbaImage> {
    if pixels.len() != width as usize * height as usize {
        return None;
    }
    Some(RgbaImage::from_fn(width, height, |x, y| {
        rgb565_to_rgba(pixels[y as usize * width as usize + x as usize])
    }))
}
