use jpeg_encoder::{ColorType, Encoder};
use ndarray::Array2;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::{Error, Result};

/// Write an 8-bit grid as a grayscale JPEG. JPEG caps each side at 65535 pixels.
pub fn write_gray_jpeg(output: &Path, data: &Array2<u8>) -> Result<()> {
    let (rows, cols) = data.dim();
    let too_big = |n: usize| n == 0 || n > u16::MAX as usize;
    if too_big(rows) || too_big(cols) {
        return Err(Error::InvalidArgument {
            arg: "jpeg_size",
            value: format!("{}x{}", cols, rows),
        });
    }
    let pixels: Vec<u8> = data.iter().copied().collect();
    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);
    let encoder = Encoder::new(&mut writer, 100);
    encoder.encode(&pixels, cols as u16, rows as u16, ColorType::Luma)?;
    Ok(())
}
