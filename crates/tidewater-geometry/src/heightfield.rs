//! Height field loading and sampling

use std::path::Path;

use tidewater_core::{Result, TidewaterError};

/// A row-major grid of height samples, origin at the top-left corner
#[derive(Debug, Clone)]
pub struct HeightField {
    /// Samples normalized to [0..1] when loaded from an image
    samples: Vec<f32>,
    pub rows: usize,
    pub cols: usize,
}

impl HeightField {
    /// Load a height field from an image file, using the first channel of
    /// each pixel divided by 255. Image rows become grid rows.
    pub fn from_image(path: &Path) -> Result<Self> {
        let img = image::open(path).map_err(|e| {
            TidewaterError::AssetError(format!(
                "Failed to load heightmap '{}': {}",
                path.display(),
                e
            ))
        })?;

        let gray = img.into_luma8();
        let cols = gray.width() as usize;
        let rows = gray.height() as usize;
        let samples = gray.pixels().map(|p| p.0[0] as f32 / 255.0).collect();

        log::debug!("Heightmap {} is {}x{}", path.display(), rows, cols);
        Ok(Self {
            samples,
            rows,
            cols,
        })
    }

    /// Build a height field from raw samples
    pub fn from_raw(samples: Vec<f32>, rows: usize, cols: usize) -> Result<Self> {
        if samples.len() != rows * cols {
            return Err(TidewaterError::AssetError(format!(
                "height field expects {} samples for {}x{}, got {}",
                rows * cols,
                rows,
                cols,
                samples.len()
            )));
        }
        Ok(Self {
            samples,
            rows,
            cols,
        })
    }

    /// A field of identical samples
    pub fn flat(rows: usize, cols: usize, value: f32) -> Self {
        Self {
            samples: vec![value; rows * cols],
            rows,
            cols,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Sample at grid coordinates. Panics if out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.samples[row * self.cols + col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_field_is_row_major() {
        let field = HeightField::from_raw(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0], 2, 3).unwrap();
        assert_eq!(field.get(0, 2), 2.0);
        assert_eq!(field.get(1, 0), 3.0);
    }

    #[test]
    fn raw_field_rejects_wrong_length() {
        assert!(HeightField::from_raw(vec![0.0; 5], 2, 3).is_err());
    }

    #[test]
    fn missing_image_is_asset_error() {
        let result = HeightField::from_image(Path::new("no/such/heightmap.png"));
        assert!(matches!(result, Err(TidewaterError::AssetError(_))));
    }
}
