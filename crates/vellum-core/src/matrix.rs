//! Affine transforms.
//!
//! A [`Matrix`] maps user space to device space:
//!
//! ```text
//! x' = xx * x + xy * y + x0
//! y' = yx * x + yy * y + y0
//! ```

/// A 2D affine transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub xx: f64,
    pub yx: f64,
    pub xy: f64,
    pub yy: f64,
    pub x0: f64,
    pub y0: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    pub fn new(xx: f64, yx: f64, xy: f64, yy: f64, x0: f64, y0: f64) -> Self {
        Self {
            xx,
            yx,
            xy,
            yy,
            x0,
            y0,
        }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    pub fn rotation(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self::new(c, s, -s, c, 0.0, 0.0)
    }

    /// `self` applied first, then `other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            xx: self.xx * other.xx + self.yx * other.xy,
            yx: self.xx * other.yx + self.yx * other.yy,
            xy: self.xy * other.xx + self.yy * other.xy,
            yy: self.xy * other.yx + self.yy * other.yy,
            x0: self.x0 * other.xx + self.y0 * other.xy + other.x0,
            y0: self.x0 * other.yx + self.y0 * other.yy + other.y0,
        }
    }

    pub fn determinant(&self) -> f64 {
        self.xx * self.yy - self.yx * self.xy
    }

    /// Inverse transform, or `None` when the matrix is singular.
    pub fn invert(&self) -> Option<Matrix> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv_det = 1.0 / det;
        let xx = self.yy * inv_det;
        let yx = -self.yx * inv_det;
        let xy = -self.xy * inv_det;
        let yy = self.xx * inv_det;
        let x0 = -(self.x0 * xx + self.y0 * xy);
        let y0 = -(self.x0 * yx + self.y0 * yy);
        Some(Matrix {
            xx,
            yx,
            xy,
            yy,
            x0,
            y0,
        })
    }

    /// Transform a point, including translation.
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.xx * x + self.xy * y + self.x0,
            self.yx * x + self.yy * y + self.y0,
        )
    }

    /// Transform a distance vector, ignoring translation.
    pub fn transform_distance(&self, dx: f64, dy: f64) -> (f64, f64) {
        (self.xx * dx + self.xy * dy, self.yx * dx + self.yy * dy)
    }

    /// True when the matrix has no rotation or shear component.
    pub fn is_scale_only(&self) -> bool {
        self.xy == 0.0 && self.yx == 0.0
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_identity_transform() {
        let m = Matrix::identity();
        assert_eq!(m.transform_point(3.0, -4.0), (3.0, -4.0));
        assert!(m.is_identity());
        assert!(m.is_scale_only());
    }

    #[test]
    fn test_translation_ignored_for_distance() {
        let m = Matrix::translation(10.0, 20.0);
        assert_eq!(m.transform_point(1.0, 2.0), (11.0, 22.0));
        assert_eq!(m.transform_distance(1.0, 2.0), (1.0, 2.0));
    }

    #[test]
    fn test_scale_then_translate() {
        let m = Matrix::scaling(2.0, 3.0).multiply(&Matrix::translation(5.0, 7.0));
        let (x, y) = m.transform_point(1.0, 1.0);
        assert_close(x, 7.0);
        assert_close(y, 10.0);
    }

    #[test]
    fn test_invert_round_trips() {
        let m = Matrix::rotation(0.7)
            .multiply(&Matrix::scaling(3.0, 0.5))
            .multiply(&Matrix::translation(-2.0, 9.0));
        let inv = m.invert().unwrap();
        let (x, y) = m.transform_point(1.25, -3.5);
        let (bx, by) = inv.transform_point(x, y);
        assert_close(bx, 1.25);
        assert_close(by, -3.5);
    }

    #[test]
    fn test_invert_singular() {
        let m = Matrix::scaling(0.0, 1.0);
        assert!(m.invert().is_none());
    }

    #[test]
    fn test_rotation_is_not_scale_only() {
        assert!(!Matrix::rotation(0.3).is_scale_only());
        assert!(Matrix::scaling(4.0, 4.0).is_scale_only());
    }

    #[test]
    fn test_determinant() {
        assert_close(Matrix::scaling(2.0, 3.0).determinant(), 6.0);
        assert_close(Matrix::rotation(1.1).determinant(), 1.0);
    }
}
