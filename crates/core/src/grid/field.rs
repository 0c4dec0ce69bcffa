//! Dense row-major scalar field
//!
//! Every field in a run shares one `width × height` shape. Values live in a
//! flat `Vec<f32>` indexed `row * width + col`, which is also the layout the
//! GPU storage buffers use, so host fields upload without reshaping.

/// 2D `f32` field stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    /// Field values in row-major order (row * width + col)
    pub data: Vec<f32>,
    /// Grid width in cells (columns)
    pub width: usize,
    /// Grid height in cells (rows)
    pub height: usize,
}

impl ScalarField {
    /// Create a new field with given dimensions, initialized to zero
    ///
    /// # Arguments
    ///
    /// * `width` - Grid width in cells
    /// * `height` - Grid height in cells
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_value(width, height, 0.0)
    }

    /// Create a new field with every cell set to `value`
    #[must_use]
    pub fn with_value(width: usize, height: usize, value: f32) -> Self {
        Self {
            data: vec![value; width * height],
            width,
            height,
        }
    }

    /// Wrap existing row-major data
    ///
    /// Returns `None` if `data.len() != width * height`.
    #[must_use]
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == width * height).then_some(Self {
            data,
            width,
            height,
        })
    }

    /// Linear index of `(row, col)`
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    #[inline]
    #[must_use]
    pub fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.height && col < self.width,
            "Coordinates out of bounds"
        );
        row * self.width + col
    }

    /// Value at `(row, col)`
    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[self.index(row, col)]
    }

    /// Set the value at `(row, col)`
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        let idx = self.index(row, col);
        self.data[idx] = value;
    }

    /// Get reference to field data
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Get mutable reference to field data
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// `(width, height)`
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_creation() {
        let field = ScalarField::new(10, 20);
        assert_eq!(field.dimensions(), (10, 20));
        assert_eq!(field.data.len(), 200);
        assert!(field.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_row_major_indexing() {
        let mut field = ScalarField::new(7, 3);
        field.set(2, 4, 1.5);
        assert_eq!(field.get(2, 4), 1.5);
        assert_eq!(field.data[2 * 7 + 4], 1.5);
        assert_eq!(field.index(1, 0), 7);
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(ScalarField::from_vec(3, 3, vec![0.0; 9]).is_some());
        assert!(ScalarField::from_vec(3, 3, vec![0.0; 8]).is_none());
    }

    #[test]
    fn test_with_value() {
        let field = ScalarField::with_value(4, 4, -100.0);
        assert!(field.as_slice().iter().all(|&v| v == -100.0));
    }

    #[test]
    #[should_panic(expected = "Coordinates out of bounds")]
    fn test_bounds_check() {
        let field = ScalarField::new(10, 10);
        let _ = field.get(10, 5);
    }
}
