/// Annex K (Clause K.1) sample luminance table, natural (row-major) order.
static ANNEX_K_LUMA: [u16; 64] = [
    16, 11, 10, 16, 24, 40, 51, 61, //
    12, 12, 14, 19, 26, 58, 60, 55, //
    14, 13, 16, 24, 40, 57, 69, 56, //
    14, 17, 22, 29, 51, 87, 80, 62, //
    18, 22, 37, 56, 68, 109, 103, 77, //
    24, 35, 55, 64, 81, 104, 113, 92, //
    49, 64, 78, 87, 103, 121, 120, 101, //
    72, 92, 95, 98, 112, 100, 103, 99,
];

/// Annex K (Clause K.1) sample chrominance table, natural order.
static ANNEX_K_CHROMA: [u16; 64] = [
    17, 18, 24, 47, 99, 99, 99, 99, //
    18, 21, 26, 66, 99, 99, 99, 99, //
    24, 26, 56, 99, 99, 99, 99, 99, //
    47, 66, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99,
];

/// # Quantization table scaled for a quality setting
///
/// Values are stored in natural order; the writer reorders to zigzag when
/// emitting the DQT segment.
#[derive(Clone, Debug)]
pub struct QuantizationTable {
    values: [u16; 64],
}

impl QuantizationTable {
    /// Scale the Annex K luminance table for `quality` (1..=100).
    pub fn luma(quality: u8) -> QuantizationTable {
        Self::scaled(&ANNEX_K_LUMA, quality)
    }

    /// Scale the Annex K chrominance table for `quality` (1..=100).
    pub fn chroma(quality: u8) -> QuantizationTable {
        Self::scaled(&ANNEX_K_CHROMA, quality)
    }

    fn scaled(base: &[u16; 64], quality: u8) -> QuantizationTable {
        let quality = u32::from(quality.clamp(1, 100));

        // Quality 50 is the base table; below 50 the curve steepens fast.
        let scale = if quality < 50 {
            5000 / quality
        } else {
            200 - quality * 2
        };

        let mut values = [0u16; 64];
        for (value, &base) in values.iter_mut().zip(base.iter()) {
            // Baseline streams need 8-bit table entries.
            let scaled = (u32::from(base) * scale + 50) / 100;
            *value = scaled.clamp(1, 255) as u16;
        }

        QuantizationTable { values }
    }

    /// Raw divisor at a natural-order index.
    #[inline]
    pub fn get(&self, index: usize) -> u16 {
        self.values[index]
    }
}

/// Quantize one block of 8x-scaled DCT coefficients in natural order,
/// rounding half away from zero.
pub(crate) fn quantize_block(block: &[i16; 64], table: &QuantizationTable, out: &mut [i16; 64]) {
    for i in 0..64 {
        let value = i32::from(block[i]);
        // The DCT output carries an extra factor of 8.
        let divisor = i32::from(table.get(i)) << 3;

        let half = if value < 0 { -(divisor / 2) } else { divisor / 2 };
        out[i] = ((value + half) / divisor) as i16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_50_returns_base_tables() {
        let luma = QuantizationTable::luma(50);
        for i in 0..64 {
            assert_eq!(luma.get(i), ANNEX_K_LUMA[i]);
        }
    }

    #[test]
    fn quality_100_flattens_to_ones() {
        let luma = QuantizationTable::luma(100);
        let chroma = QuantizationTable::chroma(100);
        for i in 0..64 {
            assert_eq!(luma.get(i), 1);
            assert_eq!(chroma.get(i), 1);
        }
    }

    #[test]
    fn low_quality_saturates_at_255() {
        let luma = QuantizationTable::luma(1);
        assert!((0..64).any(|i| luma.get(i) == 255));
        assert!((0..64).all(|i| (1..=255).contains(&luma.get(i))));
    }

    #[test]
    fn out_of_range_quality_is_clamped() {
        assert_eq!(
            QuantizationTable::luma(0).get(0),
            QuantizationTable::luma(1).get(0)
        );
    }

    #[test]
    fn quantize_rounds_half_away_from_zero() {
        let mut block = [0i16; 64];
        block[0] = 8 * 16; // exactly one table step at quality 50
        block[1] = -8 * 6; // just over half an 11-step

        let mut out = [0i16; 64];
        quantize_block(&block, &QuantizationTable::luma(50), &mut out);

        assert_eq!(out[0], 1);
        assert_eq!(out[1], -1);
        assert!(out[2..].iter().all(|&c| c == 0));
    }
}
