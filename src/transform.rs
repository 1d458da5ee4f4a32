/// # A combined cropping and rotation transformation
///
/// Maps output coordinates back into the source plane. The transform is
/// fixed by two corresponding points: `(orig_x, orig_y)` in the source maps
/// to the output origin, and `(one_x, one_y)` maps just past the opposite
/// output corner. The relative signs of the two deltas select one of the
/// four 90-degree rotation cases.
#[derive(Copy, Clone, Debug)]
pub struct Transform {
    output_width: i32,
    output_height: i32,

    // The source point the output origin maps to.
    orig_x: i32,
    orig_y: i32,
    // The source point (output_width, output_height) maps to.
    one_x: i32,
    one_y: i32,

    // Rotational component.
    mat00: i32,
    mat01: i32,
    mat10: i32,
    mat11: i32,
}

impl Transform {
    /// Build a transform from its two defining point pairs.
    ///
    /// When `orig_x == one_x` or `orig_y == one_y` the crop has zero area;
    /// the result is degenerate (zero matrix, zero extents) and must be
    /// checked with [`is_degenerate`](Transform::is_degenerate) before use.
    pub fn new(orig_x: i32, orig_y: i32, one_x: i32, one_y: i32) -> Transform {
        let dx = one_x - orig_x;
        let dy = one_y - orig_y;

        let (mat, output_width, output_height) = if dx == 0 || dy == 0 {
            ((0, 0, 0, 0), 0, 0)
        } else if dx > 0 && dy > 0 {
            // No rotation.
            ((1, 0, 0, 1), dx.abs(), dy.abs())
        } else if dx < 0 && dy > 0 {
            // 90 degrees counter-clockwise.
            ((0, -1, 1, 0), dy.abs(), dx.abs())
        } else if dx > 0 && dy < 0 {
            // 270 degrees counter-clockwise.
            ((0, 1, -1, 0), dy.abs(), dx.abs())
        } else {
            // 180 degrees.
            ((-1, 0, 0, -1), dx.abs(), dy.abs())
        };

        Transform {
            output_width,
            output_height,
            orig_x,
            orig_y,
            one_x,
            one_y,
            mat00: mat.0,
            mat01: mat.1,
            mat10: mat.2,
            mat11: mat.3,
        }
    }

    /// Build the transform for a half-open crop rectangle followed by a
    /// rotation of `rot90` quarter turns counter-clockwise in source space.
    ///
    /// `right` and `bottom` are excluded from the crop. The rectangle corners
    /// are sorted, so inverted inputs describe the same region. Any integer
    /// `rot90` is accepted and reduced with a mathematical modulo, so `-1`
    /// selects the same orientation as `3`.
    pub fn for_crop_followed_by_rotation(
        left: i32,
        top: i32,
        right: i32,
        bottom: i32,
        rot90: i32,
    ) -> Transform {
        // Convert to an inclusive rectangle.
        let x_low = left.min(right - 1);
        let y_low = top.min(bottom - 1);
        let x_high = left.max(right - 1);
        let y_high = top.max(bottom - 1);

        match rot90.rem_euclid(4) {
            0 => Transform::new(x_low, y_low, x_high + 1, y_high + 1),
            1 => Transform::new(x_high, y_low, x_low - 1, y_high + 1),
            2 => Transform::new(x_high, y_high, x_low - 1, y_low - 1),
            _ => Transform::new(x_low, y_high, x_high + 1, y_low - 1),
        }
    }

    pub fn output_width(&self) -> i32 {
        self.output_width
    }

    pub fn output_height(&self) -> i32 {
        self.output_height
    }

    /// True for zero-area crops. The matrix is all zeroes and the output
    /// extents are meaningless.
    pub fn is_degenerate(&self) -> bool {
        self.mat00 == 0 && self.mat01 == 0 && self.mat10 == 0 && self.mat11 == 0
    }

    /// Map an output coordinate to its source-plane coordinate.
    ///
    /// Inputs are clamped into the output extents first, so the result
    /// always lies within the cropped source region no matter what the
    /// caller passes. Row iteration relies on this for edge padding.
    pub fn map(&self, x: i32, y: i32) -> (i32, i32) {
        let x = x.max(0).min(self.output_width - 1);
        let y = y.max(0).min(self.output_height - 1);

        (
            x * self.mat00 + y * self.mat01 + self.orig_x,
            x * self.mat10 + y * self.mat11 + self.orig_y,
        )
    }
}

impl PartialEq for Transform {
    /// Structural equality over the four defining coordinates.
    fn eq(&self, other: &Transform) -> bool {
        self.orig_x == other.orig_x
            && self.orig_y == other.orig_y
            && self.one_x == other.one_x
            && self.one_y == other.one_y
    }
}

impl Eq for Transform {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn map_identity() {
        let transform = Transform::new(0, 0, 5, 5);

        assert_eq!(transform.map(0, 0), (0, 0));
        assert_eq!(transform.map(1, 1), (1, 1));
        assert_eq!(transform.map(2, 3), (2, 3));
        assert_eq!(transform.map(0, 4), (0, 4));
    }

    #[test]
    fn output_size_per_rotation_case() {
        let rot0 = Transform::new(0, 0, 3, 5);
        assert_eq!(rot0.output_width(), 3);
        assert_eq!(rot0.output_height(), 5);

        let rot180 = Transform::new(3, 5, 0, 0);
        assert_eq!(rot180.output_width(), 3);
        assert_eq!(rot180.output_height(), 5);

        let rot90 = Transform::new(3, 0, 0, 5);
        assert_eq!(rot90.output_width(), 5);
        assert_eq!(rot90.output_height(), 3);

        let rot270 = Transform::new(0, 5, 3, 0);
        assert_eq!(rot270.output_width(), 5);
        assert_eq!(rot270.output_height(), 3);
    }

    #[test]
    fn map_clamps_out_of_range_input() {
        let transform = Transform::new(0, 0, 5, 5);

        assert_eq!(transform.map(-1, -1), (0, 0));
        assert_eq!(transform.map(-1, 5), (0, 4));
        assert_eq!(transform.map(8, -3), (4, 0));
    }

    #[test]
    fn map_crop() {
        let transform = Transform::new(10, 10, 20, 20);

        assert_eq!(transform.map(-3, -3), (10, 10));
        assert_eq!(transform.map(0, 0), (10, 10));
        assert_eq!(transform.map(5, 6), (15, 16));
        assert_eq!(transform.map(9, 9), (19, 19));
        assert_eq!(transform.map(43, 42), (19, 19));
    }

    #[test]
    fn map_crop_rotate_180() {
        let transform = Transform::new(49, 49, -1, -1);

        assert_eq!(transform.map(-3, -3), (49, 49));
        assert_eq!(transform.map(0, 0), (49, 49));
        assert_eq!(transform.map(5, 6), (44, 43));
        assert_eq!(transform.map(49, 49), (0, 0));
        assert_eq!(transform.map(142, 3243), (0, 0));
    }

    #[test]
    fn map_crop_rotate_90() {
        // Crop to this rectangle, with origin at '@':
        // (50, 125)      (150, 125)
        //  +-------------+
        //  |             |
        //  +-------------@
        // (50, 75)      (150, 75)
        let transform = Transform::new(150, 75, 50, 125);

        assert_eq!(transform.output_width(), 50);
        assert_eq!(transform.output_height(), 100);

        assert_eq!(transform.map(-3, -3), (150, 75));
        assert_eq!(transform.map(0, 0), (150, 75));
        assert_eq!(transform.map(5, 6), (144, 80));
        assert_eq!(transform.map(49, 99), (51, 124));
        assert_eq!(transform.map(242, 3243), (51, 124));
    }

    #[test]
    fn map_crop_rotate_270() {
        // Crop to this rectangle, with origin at '@':
        // (50, 125)      (150, 125)
        //  @-------------+
        //  |             |
        //  +-------------+
        // (50, 75)      (150, 75)
        let transform = Transform::new(50, 125, 150, 75);

        assert_eq!(transform.output_width(), 50);
        assert_eq!(transform.output_height(), 100);

        assert_eq!(transform.map(-3, -3), (50, 125));
        assert_eq!(transform.map(0, 0), (50, 125));
        assert_eq!(transform.map(5, 6), (56, 120));
        assert_eq!(transform.map(48, 98), (148, 77));
        assert_eq!(transform.map(242, 3243), (149, 76));
    }

    #[test]
    fn degenerate_when_corners_collapse() {
        assert!(Transform::new(3, 0, 3, 5).is_degenerate());
        assert!(Transform::new(0, 2, 5, 2).is_degenerate());
        assert!(!Transform::new(0, 0, 1, 1).is_degenerate());
    }

    #[test]
    fn factory_matches_raw_corner_ordering() {
        assert_eq!(
            Transform::for_crop_followed_by_rotation(1, 1, 3, 3, 2),
            Transform::new(2, 2, 0, 0)
        );
    }

    #[test]
    fn factory_normalizes_rotation_mathematically() {
        for (a, b) in [(-1, 3), (-4, 0), (7, 3), (5, 1)] {
            assert_eq!(
                Transform::for_crop_followed_by_rotation(0, 0, 8, 6, a),
                Transform::for_crop_followed_by_rotation(0, 0, 8, 6, b)
            );
        }
    }

    #[test]
    fn square_crop_rotations_are_bijections() {
        const N: i32 = 5;

        for rot90 in 0..4 {
            let transform = Transform::for_crop_followed_by_rotation(0, 0, N, N, rot90);
            assert_eq!(transform.output_width(), N);
            assert_eq!(transform.output_height(), N);

            let mut seen = HashSet::new();
            for y in 0..N {
                for x in 0..N {
                    let (sx, sy) = transform.map(x, y);
                    assert!((0..N).contains(&sx) && (0..N).contains(&sy));
                    assert!(seen.insert((sx, sy)), "rot {} collides at {},{}", rot90, x, y);
                }
            }
            assert_eq!(seen.len(), (N * N) as usize);
        }
    }
}
