use byteorder::{BigEndian, ByteOrder};

use crate::encoder::Component;
use crate::error::{EncoderResult, EncodingError};
use crate::huffman::HuffmanSpec;
use crate::marker::Marker;
use crate::quantization::QuantizationTable;

/// Natural-order index for each zigzag position.
pub(crate) const ZIGZAG: [u8; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10, //
    17, 24, 32, 25, 18, 11, 4, 5, //
    12, 19, 26, 33, 40, 48, 41, 34, //
    27, 20, 13, 6, 7, 14, 21, 28, //
    35, 42, 49, 56, 57, 50, 43, 36, //
    29, 22, 15, 23, 30, 37, 44, 51, //
    58, 59, 52, 45, 38, 31, 39, 46, //
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// # Compressed-output destination
///
/// The writer produces bytes into the destination's buffer and drives it
/// through three operations: [`init`](Dest::init) before the first byte,
/// [`empty`](Dest::empty) every time the buffer fills, and
/// [`term`](Dest::term) once with the count of tail bytes. Implementations
/// capture whatever state their flushing needs; there is no opaque context
/// pointer.
pub trait Dest {
    /// Prepare for a new stream.
    fn init(&mut self);

    /// The output buffer bytes are produced into.
    fn buffer(&mut self) -> &mut [u8];

    /// The buffer is full; consume all of it.
    fn empty(&mut self) -> EncoderResult<()>;

    /// The stream is complete; the first `used` bytes of the buffer hold its
    /// tail.
    fn term(&mut self, used: usize) -> EncoderResult<()>;

    /// Total bytes delivered so far, including those still in the buffer
    /// after `term`.
    fn total_bytes(&self) -> usize;
}

/// Destination that hands each filled buffer to a flush callback.
///
/// The callback receives the filled portion of the caller's buffer; it is
/// invoked whenever the buffer runs full and exactly once at the end of the
/// stream with the remaining tail.
pub struct CallbackDest<'a, F: FnMut(&[u8])> {
    buf: &'a mut [u8],
    flush: F,
    total: usize,
}

impl<'a, F: FnMut(&[u8])> CallbackDest<'a, F> {
    pub fn new(buf: &'a mut [u8], flush: F) -> CallbackDest<'a, F> {
        CallbackDest {
            buf,
            flush,
            total: 0,
        }
    }
}

impl<'a, F: FnMut(&[u8])> Dest for CallbackDest<'a, F> {
    fn init(&mut self) {
        self.total = 0;
    }

    fn buffer(&mut self) -> &mut [u8] {
        self.buf
    }

    fn empty(&mut self) -> EncoderResult<()> {
        (self.flush)(self.buf);
        self.total += self.buf.len();
        Ok(())
    }

    fn term(&mut self, used: usize) -> EncoderResult<()> {
        (self.flush)(&self.buf[..used]);
        self.total += used;
        Ok(())
    }

    fn total_bytes(&self) -> usize {
        self.total
    }
}

/// Single-shot destination: the whole stream must fit in the buffer.
///
/// Running out of room is an error rather than a silent wrap-around; the
/// bytes stay in place for the caller to slice with the returned count.
pub struct SliceDest<'a> {
    buf: &'a mut [u8],
    total: usize,
}

impl<'a> SliceDest<'a> {
    pub fn new(buf: &'a mut [u8]) -> SliceDest<'a> {
        SliceDest { buf, total: 0 }
    }
}

impl<'a> Dest for SliceDest<'a> {
    fn init(&mut self) {
        self.total = 0;
    }

    fn buffer(&mut self) -> &mut [u8] {
        self.buf
    }

    fn empty(&mut self) -> EncoderResult<()> {
        Err(EncodingError::OutputBufferFull {
            capacity: self.buf.len(),
        })
    }

    fn term(&mut self, used: usize) -> EncoderResult<()> {
        self.total = used;
        Ok(())
    }

    fn total_bytes(&self) -> usize {
        self.total
    }
}

/// Magnitude category and coding bits for a DC difference or AC value.
#[inline]
pub(crate) fn get_code(value: i32) -> (u8, u16) {
    let num_bits = (32 - value.unsigned_abs().leading_zeros()) as u8;
    let bits = if value < 0 {
        ((value - 1) as u32 & ((1u32 << num_bits) - 1)) as u16
    } else {
        value as u16
    };
    (num_bits, bits)
}

/// # JFIF segment and entropy-bit writer over a [`Dest`]
///
/// Owns the bit buffer for entropy-coded data, applying 0xFF byte stuffing,
/// and emits the marker segments of a baseline stream.
pub(crate) struct JpegWriter<D: Dest> {
    dest: D,
    pos: usize,
    bit_buffer: u32,
    bit_count: u8,
}

impl<D: Dest> JpegWriter<D> {
    pub fn new(mut dest: D) -> JpegWriter<D> {
        dest.init();
        JpegWriter {
            dest,
            pos: 0,
            bit_buffer: 0,
            bit_count: 0,
        }
    }

    pub fn finish(mut self) -> EncoderResult<D> {
        let used = self.pos;
        self.dest.term(used)?;
        Ok(self.dest)
    }

    fn write_u8(&mut self, value: u8) -> EncoderResult<()> {
        if self.pos == self.dest.buffer().len() {
            self.dest.empty()?;
            self.pos = 0;
        }
        self.dest.buffer()[self.pos] = value;
        self.pos += 1;
        Ok(())
    }

    fn write_all(&mut self, data: &[u8]) -> EncoderResult<()> {
        for &byte in data {
            self.write_u8(byte)?;
        }
        Ok(())
    }

    fn write_u16(&mut self, value: u16) -> EncoderResult<()> {
        let mut buf = [0u8; 2];
        BigEndian::write_u16(&mut buf, value);
        self.write_all(&buf)
    }

    pub fn write_marker(&mut self, marker: Marker) -> EncoderResult<()> {
        self.write_all(&[0xFF, marker.to_byte()])
    }

    fn write_segment(&mut self, marker: Marker, payload: &[u8]) -> EncoderResult<()> {
        self.write_marker(marker)?;
        self.write_u16(payload.len() as u16 + 2)?;
        self.write_all(payload)
    }

    /// JFIF APP0 header, 1:1 pixel aspect, no thumbnail.
    pub fn write_jfif_header(&mut self) -> EncoderResult<()> {
        self.write_segment(
            Marker::APP0,
            &[
                b'J', b'F', b'I', b'F', 0x00, // identifier
                0x01, 0x02, // version 1.02
                0x00, // density unit: none
                0x00, 0x01, 0x00, 0x01, // density 1x1
                0x00, 0x00, // no thumbnail
            ],
        )
    }

    /// Both quantization tables in one DQT segment, zigzag order, 8-bit
    /// precision.
    pub fn write_dqt(
        &mut self,
        luma: &QuantizationTable,
        chroma: &QuantizationTable,
    ) -> EncoderResult<()> {
        let mut payload = Vec::with_capacity(2 * 65);
        for (table_id, table) in [(0u8, luma), (1u8, chroma)] {
            payload.push(table_id);
            for &natural in ZIGZAG.iter() {
                payload.push(table.get(natural as usize) as u8);
            }
        }
        self.write_segment(Marker::DQT, &payload)
    }

    /// Baseline SOF0 frame header.
    pub fn write_sof(
        &mut self,
        width: u16,
        height: u16,
        components: &[Component],
    ) -> EncoderResult<()> {
        let mut payload = Vec::with_capacity(6 + components.len() * 3);
        payload.push(8); // sample precision
        payload.extend_from_slice(&height.to_be_bytes());
        payload.extend_from_slice(&width.to_be_bytes());
        payload.push(components.len() as u8);
        for component in components {
            payload.push(component.id);
            payload.push(
                component.horizontal_sampling_factor << 4 | component.vertical_sampling_factor,
            );
            payload.push(component.quantization_table);
        }
        self.write_segment(Marker::SOF0, &payload)
    }

    /// All four standard Huffman tables in one DHT segment.
    pub fn write_dht(&mut self, tables: &[(u8, &HuffmanSpec)]) -> EncoderResult<()> {
        let mut payload = Vec::new();
        for (class_and_id, spec) in tables {
            payload.push(*class_and_id);
            payload.extend_from_slice(&spec.bits);
            payload.extend_from_slice(spec.values);
        }
        self.write_segment(Marker::DHT, &payload)
    }

    /// Scan header selecting each component's table pair.
    pub fn write_sos(&mut self, components: &[Component]) -> EncoderResult<()> {
        let mut payload = Vec::with_capacity(4 + components.len() * 2);
        payload.push(components.len() as u8);
        for component in components {
            payload.push(component.id);
            payload.push(component.dc_huffman_table << 4 | component.ac_huffman_table);
        }
        // Full spectral selection, no successive approximation.
        payload.extend_from_slice(&[0, 63, 0]);
        self.write_segment(Marker::SOS, &payload)
    }

    /// Append entropy-coded bits, most significant first, stuffing a zero
    /// byte after every 0xFF.
    pub fn write_bits(&mut self, bits: u16, count: u8) -> EncoderResult<()> {
        debug_assert!(count <= 16);

        self.bit_buffer = (self.bit_buffer << count) | u32::from(bits);
        self.bit_count += count;

        while self.bit_count >= 8 {
            let byte = (self.bit_buffer >> (self.bit_count - 8)) as u8;
            self.write_u8(byte)?;
            if byte == 0xFF {
                self.write_u8(0x00)?;
            }
            self.bit_count -= 8;
        }
        // Keep only the pending bits so the accumulator cannot overflow.
        self.bit_buffer &= (1 << self.bit_count) - 1;

        Ok(())
    }

    /// Pad the pending bits to a byte boundary with 1-bits.
    pub fn flush_bits(&mut self) -> EncoderResult<()> {
        if self.bit_count > 0 {
            let padding = 8 - self.bit_count;
            self.write_bits((1 << padding) - 1, padding)?;
        }
        Ok(())
    }
}
