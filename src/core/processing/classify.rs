use ndarray::Array2;

/// Flag cells strictly above `threshold`.
pub fn classify(ratio: &Array2<f64>, threshold: f64) -> Array2<bool> {
    ratio.mapv(|v| v > threshold)
}

/// Byte mask for overlay renderers: flagged = 255, unflagged = 0.
pub fn to_display_mask(mask: &Array2<bool>) -> Array2<u8> {
    mask.mapv(|m| if m { 255 } else { 0 })
}

/// `(row, col)` of every flagged cell, row-major.
pub fn flagged_pixels(mask: &Array2<bool>) -> Vec<(usize, usize)> {
    mask.indexed_iter()
        .filter_map(|(idx, &m)| if m { Some(idx) } else { None })
        .collect()
}

pub fn flagged_count(mask: &Array2<bool>) -> usize {
    mask.iter().filter(|&&m| m).count()
}
