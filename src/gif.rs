//! GIF animation rendering

use crate::output::{ensure_parent, OutputError};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Render a sequence of frames, each shown for its own duration, as a looping
/// animated GIF.
///
/// GIF delays are stored in centiseconds; durations are rounded down to that
/// precision with a minimum of one centisecond.
pub fn render_gif(frames: &[(RgbaImage, u32)], path: &Path) -> Result<(), OutputError> {
    if frames.is_empty() {
        return Ok(());
    }
    ensure_parent(path)?;

    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = GifEncoder::new(writer);
    encoder.set_repeat(Repeat::Infinite)?;

    for (image, duration_ms) in frames {
        let delay_cs = (duration_ms / 10).max(1);
        let frame = Frame::from_parts(image.clone(), 0, 0, Delay::from_numer_denom_ms(delay_cs * 10, 1));
        encoder.encode_frame(frame)?;
    }

    Ok(())
}
