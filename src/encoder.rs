use arrayref::array_ref;

use crate::error::{EncoderResult, EncodingError};
use crate::fdct::forward_dct;
use crate::huffman::{std_ac_chroma, std_ac_luma, std_dc_chroma, std_dc_luma, DerivedTable};
use crate::quantization::{quantize_block, QuantizationTable};
use crate::rowiter::{CHROMA_ROWS, LUMA_ROWS};
use crate::writer::{get_code, Dest, JpegWriter, ZIGZAG};

/// One frame component as written to the headers.
pub(crate) struct Component {
    pub id: u8,
    pub horizontal_sampling_factor: u8,
    pub vertical_sampling_factor: u8,
    pub quantization_table: u8,
    pub dc_huffman_table: u8,
    pub ac_huffman_table: u8,
}

// Y, Cb, Cr with the fixed 2x2 / 1x1 / 1x1 sampling the raw-row interface
// assumes.
pub(crate) const COMPONENTS: [Component; 3] = [
    Component {
        id: 1,
        horizontal_sampling_factor: 2,
        vertical_sampling_factor: 2,
        quantization_table: 0,
        dc_huffman_table: 0,
        ac_huffman_table: 0,
    },
    Component {
        id: 2,
        horizontal_sampling_factor: 1,
        vertical_sampling_factor: 1,
        quantization_table: 1,
        dc_huffman_table: 1,
        ac_huffman_table: 1,
    },
    Component {
        id: 3,
        horizontal_sampling_factor: 1,
        vertical_sampling_factor: 1,
        quantization_table: 1,
        dc_huffman_table: 1,
        ac_huffman_table: 1,
    },
];

/// # Baseline JPEG encoder for raw, pre-subsampled row batches
///
/// Consumes planar YCbCr 4:2:0 data one MCU band at a time: 16 luma rows
/// plus 8 rows per chroma channel per call. Rows must already be padded to
/// the MCU grid; the row iterators produce exactly this shape. Output flows
/// through a [`Dest`], which buffers and flushes compressed bytes.
pub struct RawEncoder<D: Dest> {
    writer: JpegWriter<D>,
    width: u16,
    height: u16,
    quality: u8,

    luma_qtable: QuantizationTable,
    chroma_qtable: QuantizationTable,
    dc_luma: DerivedTable,
    ac_luma: DerivedTable,
    dc_chroma: DerivedTable,
    ac_chroma: DerivedTable,

    // Differential DC predictors, one per component.
    prev_dc: [i16; 3],
    written_rows: u32,
    started: bool,
}

impl<D: Dest> RawEncoder<D> {
    /// Create an encoder for a `width` x `height` image.
    ///
    /// `quality` is clamped into `1..=100` and scales the Annex K
    /// quantization tables. Dimensions must fit the 16-bit frame header.
    pub fn new(dest: D, width: i32, height: i32, quality: u8) -> EncoderResult<RawEncoder<D>> {
        if width < 1 || height < 1 || width > 65535 || height > 65535 {
            return Err(EncodingError::InvalidDimensions { width, height });
        }

        if !(1..=100).contains(&quality) {
            log::warn!("quality {} out of range, clamping", quality);
        }
        let quality = quality.clamp(1, 100);

        Ok(RawEncoder {
            writer: JpegWriter::new(dest),
            width: width as u16,
            height: height as u16,
            quality,
            luma_qtable: QuantizationTable::luma(quality),
            chroma_qtable: QuantizationTable::chroma(quality),
            dc_luma: DerivedTable::new(&std_dc_luma()),
            ac_luma: DerivedTable::new(&std_ac_luma()),
            dc_chroma: DerivedTable::new(&std_dc_chroma()),
            ac_chroma: DerivedTable::new(&std_ac_chroma()),
            prev_dc: [0; 3],
            written_rows: 0,
            started: false,
        })
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Number of 16-pixel MCU columns per band.
    pub fn mcus_per_row(&self) -> usize {
        (usize::from(self.width) + 15) / 16
    }

    /// Total number of MCU bands [`write_raw_rows`](Self::write_raw_rows)
    /// expects.
    pub fn mcu_bands(&self) -> usize {
        (usize::from(self.height) + 15) / 16
    }

    /// Write all header segments. Must be called once before the first band.
    pub fn start(&mut self) -> EncoderResult<()> {
        use crate::marker::Marker;

        self.writer.write_marker(Marker::SOI)?;
        self.writer.write_jfif_header()?;
        self.writer.write_dqt(&self.luma_qtable, &self.chroma_qtable)?;
        self.writer.write_sof(self.width, self.height, &COMPONENTS)?;
        self.writer.write_dht(&[
            (0x00, &std_dc_luma()),
            (0x10, &std_ac_luma()),
            (0x01, &std_dc_chroma()),
            (0x11, &std_ac_chroma()),
        ])?;
        self.writer.write_sos(&COMPONENTS)?;

        self.started = true;
        Ok(())
    }

    /// Encode one MCU band of raw rows.
    ///
    /// Every luma row must hold at least `16 * mcus_per_row()` samples and
    /// every chroma row at least `8 * mcus_per_row()`; excess samples are
    /// ignored. Row content past the image edge is expected to be padding
    /// (the row iterators replicate edge samples there).
    pub fn write_raw_rows(
        &mut self,
        y_rows: &[&[u8]; LUMA_ROWS],
        cb_rows: &[&[u8]; CHROMA_ROWS],
        cr_rows: &[&[u8]; CHROMA_ROWS],
    ) -> EncoderResult<()> {
        debug_assert!(self.started, "write_raw_rows before start");

        let mcus = self.mcus_per_row();
        self.check_row_lengths(y_rows, 16 * mcus)?;
        self.check_row_lengths(cb_rows, 8 * mcus)?;
        self.check_row_lengths(cr_rows, 8 * mcus)?;

        for mcu_x in 0..mcus {
            // Four luma blocks per MCU, left-to-right then top-to-bottom.
            for (block_y, block_x) in [(0, 0), (0, 8), (8, 0), (8, 8)] {
                self.encode_block(y_rows, mcu_x * 16 + block_x, block_y, 0)?;
            }
            self.encode_block(cb_rows, mcu_x * 8, 0, 1)?;
            self.encode_block(cr_rows, mcu_x * 8, 0, 2)?;
        }

        self.written_rows += LUMA_ROWS as u32;
        Ok(())
    }

    /// Finish the scan: pad the bit stream, write EOI and release the
    /// destination with the complete stream delivered.
    pub fn finish(mut self) -> EncoderResult<D> {
        use crate::marker::Marker;

        if (self.written_rows as usize) < self.mcu_bands() * LUMA_ROWS {
            return Err(EncodingError::ImageIncomplete {
                written_rows: self.written_rows,
                height: self.height,
            });
        }

        self.writer.flush_bits()?;
        self.writer.write_marker(Marker::EOI)?;
        self.writer.finish()
    }

    fn check_row_lengths(&self, rows: &[&[u8]], required: usize) -> EncoderResult<()> {
        for row in rows {
            if row.len() < required {
                return Err(EncodingError::BadRowLength {
                    required,
                    actual: row.len(),
                });
            }
        }
        Ok(())
    }

    /// Extract, transform and entropy-code one 8x8 block.
    fn encode_block(
        &mut self,
        rows: &[&[u8]],
        x0: usize,
        y0: usize,
        comp: usize,
    ) -> EncoderResult<()> {
        let mut block = [0i16; 64];
        for r in 0..8 {
            let segment = array_ref![rows[y0 + r], x0, 8];
            for c in 0..8 {
                // Level shift to the DCT's signed range.
                block[r * 8 + c] = i16::from(segment[c]) - 128;
            }
        }

        forward_dct(&mut block);

        let qtable = if comp == 0 {
            &self.luma_qtable
        } else {
            &self.chroma_qtable
        };
        let mut quantized = [0i16; 64];
        quantize_block(&block, qtable, &mut quantized);

        let (dc_table, ac_table) = if comp == 0 {
            (&self.dc_luma, &self.ac_luma)
        } else {
            (&self.dc_chroma, &self.ac_chroma)
        };
        // Clone so no borrow on self is held across the writer calls.
        let dc_table = dc_table.clone();
        let ac_table = ac_table.clone();

        let dc_diff = quantized[0] - self.prev_dc[comp];
        self.prev_dc[comp] = quantized[0];
        self.encode_dc(dc_diff, &dc_table)?;
        self.encode_ac(&quantized, &ac_table)
    }

    fn encode_dc(&mut self, diff: i16, table: &DerivedTable) -> EncoderResult<()> {
        let (num_bits, bits) = get_code(i32::from(diff));

        let (code, code_len) = table.get_code(num_bits);
        self.writer.write_bits(code, code_len)?;
        if num_bits > 0 {
            self.writer.write_bits(bits, num_bits)?;
        }
        Ok(())
    }

    fn encode_ac(&mut self, quantized: &[i16; 64], table: &DerivedTable) -> EncoderResult<()> {
        let mut zero_run = 0u8;

        for &natural in &ZIGZAG[1..] {
            let value = quantized[natural as usize];
            if value == 0 {
                zero_run += 1;
                continue;
            }

            while zero_run > 15 {
                let (code, code_len) = table.get_code(0xF0); // ZRL
                self.writer.write_bits(code, code_len)?;
                zero_run -= 16;
            }

            let (num_bits, bits) = get_code(i32::from(value));
            let symbol = (zero_run << 4) | num_bits;
            let (code, code_len) = table.get_code(symbol);
            self.writer.write_bits(code, code_len)?;
            self.writer.write_bits(bits, num_bits)?;

            zero_run = 0;
        }

        if zero_run > 0 {
            let (code, code_len) = table.get_code(0x00); // EOB
            self.writer.write_bits(code, code_len)?;
        }
        Ok(())
    }
}
