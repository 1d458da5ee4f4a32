use log::debug;

use crate::encoder::RawEncoder;
use crate::error::{EncoderResult, EncodingError};
use crate::plane::Plane;
use crate::rowiter::{ChromaRowIter, LumaRowIter, RowIterator, LUMA_ROWS};
use crate::transform::Transform;
use crate::writer::{CallbackDest, Dest, SliceDest};

/// Half-open crop rectangle in the unrotated source coordinate space.
///
/// `right` and `bottom` are excluded. Coordinates may be negative or exceed
/// the image bounds; geometry is clamped during encoding, never rejected.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CropRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl CropRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> CropRect {
        CropRect {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The full image, no cropping.
    pub fn full(width: i32, height: i32) -> CropRect {
        CropRect::new(0, 0, width, height)
    }

    /// True when the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.left == self.right || self.top == self.bottom
    }
}

/// Round a row length up to the next multiple of 64, the alignment the
/// encoder-facing scratch rows are kept at.
fn padded_row_length(width: i32) -> usize {
    ((width + 16 + 63) & !63) as usize
}

/// Compress pre-built row iterators into a JPEG stream.
///
/// `width` and `height` are the output dimensions the iterators produce.
/// The encoder writes into `out_buf`; whenever the buffer fills, `flush`
/// receives its contents, and once more at the end with the remaining tail.
/// Returns the total number of compressed bytes.
pub fn compress<F: FnMut(&[u8])>(
    width: i32,
    height: i32,
    y_rows: &mut LumaRowIter<'_>,
    cb_rows: &mut ChromaRowIter<'_>,
    cr_rows: &mut ChromaRowIter<'_>,
    out_buf: &mut [u8],
    flush: F,
    quality: u8,
) -> EncoderResult<usize> {
    if out_buf.is_empty() {
        return Err(EncodingError::OutputBufferFull { capacity: 0 });
    }
    compress_into(
        width,
        height,
        y_rows,
        cb_rows,
        cr_rows,
        CallbackDest::new(out_buf, flush),
        quality,
    )
}

fn compress_into<D: Dest>(
    width: i32,
    height: i32,
    y_rows: &mut LumaRowIter<'_>,
    cb_rows: &mut ChromaRowIter<'_>,
    cr_rows: &mut ChromaRowIter<'_>,
    dest: D,
    quality: u8,
) -> EncoderResult<usize> {
    let mut encoder = RawEncoder::new(dest, width, height, quality)?;
    encoder.start()?;

    // One MCU band per iteration: 16 luma rows, 8 rows per chroma channel.
    // The iterators clamp past-the-end rows, so the last partial band comes
    // back padded with repeats of the bottom row.
    let mut y = 0;
    while y < height {
        let y_batch = y_rows.load_at(y);
        let cb_batch = cb_rows.load_at(y / 2);
        let cr_batch = cr_rows.load_at(y / 2);
        encoder.write_raw_rows(&y_batch, &cb_batch, &cr_batch)?;
        y += LUMA_ROWS as i32;
    }

    let dest = encoder.finish()?;
    Ok(dest.total_bytes())
}

/// Compress three planes with a crop and rotation applied, single-shot.
///
/// The crop rectangle is given in the unrotated image's coordinates and
/// `rot90` counts quarter turns (any integer, negative values normalize
/// mathematically). Chroma planes carry half the luma resolution in both
/// directions; the crop is divided by two for them, so odd crop bounds can
/// shift chroma by up to one sample.
///
/// The whole stream must fit in `out_buf`; the number of bytes written is
/// returned. An empty crop rectangle is an error rather than undefined
/// geometry.
pub fn compress_cropped(
    y_plane: Plane<'_>,
    cb_plane: Plane<'_>,
    cr_plane: Plane<'_>,
    out_buf: &mut [u8],
    quality: u8,
    crop: CropRect,
    rot90: i32,
) -> EncoderResult<usize> {
    if crop.is_empty() {
        return Err(EncodingError::EmptyCropRegion);
    }

    let luma_transform =
        Transform::for_crop_followed_by_rotation(crop.left, crop.top, crop.right, crop.bottom, rot90);
    if luma_transform.is_degenerate() {
        return Err(EncodingError::EmptyCropRegion);
    }

    // The rotation cases already swap the crop extents.
    let width = luma_transform.output_width();
    let height = luma_transform.output_height();

    debug!(
        "compressing {}x{} quality={} rot90={} crop=({},{})..({},{})",
        width, height, quality, rot90, crop.left, crop.top, crop.right, crop.bottom
    );

    let chroma_transform = Transform::for_crop_followed_by_rotation(
        crop.left / 2,
        crop.top / 2,
        crop.right / 2,
        crop.bottom / 2,
        rot90,
    );

    let mut y_rows: LumaRowIter<'_> =
        RowIterator::new(y_plane, luma_transform, padded_row_length(width));
    let mut cb_rows: ChromaRowIter<'_> =
        RowIterator::new(cb_plane, chroma_transform, padded_row_length(width / 2));
    let mut cr_rows: ChromaRowIter<'_> =
        RowIterator::new(cr_plane, chroma_transform, padded_row_length(width / 2));

    compress_into(
        width,
        height,
        &mut y_rows,
        &mut cb_rows,
        &mut cr_rows,
        SliceDest::new(out_buf),
        quality,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Uniform gray/blue test image compressed through the iterator API,
    /// identity transform, mirroring the reference test harness.
    fn compress_test_image(width: i32, height: i32) -> usize {
        let y_data = vec![128u8; (width * height) as usize];
        let cb_data = vec![0u8; ((width / 2) * (height / 2)) as usize];
        let cr_data = vec![255u8; ((width / 2) * (height / 2)) as usize];

        let y_plane = Plane::new(width, height, &y_data, 1, width).unwrap();
        let cb_plane = Plane::new(width / 2, height / 2, &cb_data, 1, width / 2).unwrap();
        let cr_plane = Plane::new(width / 2, height / 2, &cr_data, 1, width / 2).unwrap();

        let mut y_rows: LumaRowIter<'_> = RowIterator::new(
            y_plane,
            Transform::new(0, 0, width, height),
            padded_row_length(width),
        );
        let mut cb_rows: ChromaRowIter<'_> = RowIterator::new(
            cb_plane,
            Transform::new(0, 0, width / 2, height / 2),
            padded_row_length(width / 2),
        );
        let mut cr_rows: ChromaRowIter<'_> = RowIterator::new(
            cr_plane,
            Transform::new(0, 0, width / 2, height / 2),
            padded_row_length(width / 2),
        );

        let mut out = vec![0u8; 64 * 1024];
        compress(
            width,
            height,
            &mut y_rows,
            &mut cb_rows,
            &mut cr_rows,
            &mut out,
            |_| {},
            100,
        )
        .unwrap()
    }

    #[test]
    fn square_images_produce_output() {
        for size in [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 16, 17, 23, 256] {
            assert!(compress_test_image(size, size) > 0, "size {}", size);
        }
    }

    #[test]
    fn wide_strips_produce_output() {
        for height in 1..=17 {
            assert!(compress_test_image(256, height) > 0, "height {}", height);
        }
    }

    #[test]
    fn tall_strips_produce_output() {
        for width in 1..=17 {
            assert!(compress_test_image(width, 256) > 0, "width {}", width);
        }
    }

    fn gradient_image(width: i32, height: i32) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        let mut y = vec![0u8; (width * height) as usize];
        for row in 0..height {
            for col in 0..width {
                y[(row * width + col) as usize] = (row + col) as u8;
            }
        }
        let chroma = vec![128u8; ((width / 2) * (height / 2)) as usize];
        (y, chroma.clone(), chroma)
    }

    #[test]
    fn crop_and_rotation_variants_produce_output() {
        let (y_data, cb_data, cr_data) = gradient_image(64, 48);
        let y_plane = Plane::new(64, 48, &y_data, 1, 64).unwrap();
        let cb_plane = Plane::new(32, 24, &cb_data, 1, 32).unwrap();
        let cr_plane = Plane::new(32, 24, &cr_data, 1, 32).unwrap();

        let mut out = vec![0u8; 64 * 1024];

        for rot90 in -1..=4 {
            // Crop bounds deliberately spill past the image; they clamp.
            for crop in [
                CropRect::full(64, 48),
                CropRect::new(-10, -100, 50, 49),
                CropRect::new(5, 5, 20, 20),
            ] {
                let written = compress_cropped(
                    y_plane, cb_plane, cr_plane, &mut out, 85, crop, rot90,
                )
                .unwrap();
                assert!(written > 0, "crop {:?} rot {}", crop, rot90);
            }
        }
    }

    #[test]
    fn semi_planar_chroma_strides_work() {
        // Y tightly packed; Cb/Cr interleaved in one buffer, pixel stride 2.
        let width = 32;
        let height = 16;
        let y_data = vec![100u8; (width * height) as usize];
        let c_data = vec![128u8; ((width / 2) * (height / 2) * 2) as usize];

        let y_plane = Plane::new(width, height, &y_data, 1, width).unwrap();
        let cb_plane = Plane::new(width / 2, height / 2, &c_data, 2, width).unwrap();
        let cr_plane = Plane::new(width / 2, height / 2, &c_data[1..], 2, width).unwrap();

        let mut out = vec![0u8; 16 * 1024];
        let written = compress_cropped(
            y_plane,
            cb_plane,
            cr_plane,
            &mut out,
            90,
            CropRect::full(width, height),
            0,
        )
        .unwrap();
        assert!(written > 0);
    }

    #[test]
    fn empty_crop_is_an_error() {
        let y_data = vec![0u8; 64];
        let c_data = vec![0u8; 16];
        let y_plane = Plane::new(8, 8, &y_data, 1, 8).unwrap();
        let c_plane = Plane::new(4, 4, &c_data, 1, 4).unwrap();

        let mut out = vec![0u8; 1024];
        assert!(matches!(
            compress_cropped(
                y_plane,
                c_plane,
                c_plane,
                &mut out,
                90,
                CropRect::new(3, 0, 3, 8),
                0
            ),
            Err(EncodingError::EmptyCropRegion)
        ));
    }

    #[test]
    fn undersized_output_buffer_is_an_error() {
        let (y_data, cb_data, cr_data) = gradient_image(64, 48);
        let y_plane = Plane::new(64, 48, &y_data, 1, 64).unwrap();
        let cb_plane = Plane::new(32, 24, &cb_data, 1, 32).unwrap();
        let cr_plane = Plane::new(32, 24, &cr_data, 1, 32).unwrap();

        let mut out = vec![0u8; 128];
        assert!(matches!(
            compress_cropped(
                y_plane,
                cb_plane,
                cr_plane,
                &mut out,
                90,
                CropRect::full(64, 48),
                0
            ),
            Err(EncodingError::OutputBufferFull { .. })
        ));
    }

    #[test]
    fn flush_receives_every_byte_exactly_once() {
        let width = 48;
        let height = 32;
        let (y_data, cb_data, cr_data) = gradient_image(width, height);
        let y_plane = Plane::new(width, height, &y_data, 1, width).unwrap();
        let cb_plane = Plane::new(width / 2, height / 2, &cb_data, 1, width / 2).unwrap();
        let cr_plane = Plane::new(width / 2, height / 2, &cr_data, 1, width / 2).unwrap();

        // Reference: single-shot into a large buffer.
        let mut reference = vec![0u8; 32 * 1024];
        let reference_len = compress_cropped(
            y_plane,
            cb_plane,
            cr_plane,
            &mut reference,
            80,
            CropRect::full(width, height),
            0,
        )
        .unwrap();

        // Streamed: tiny buffer, accumulate chunks from the flush callback.
        let mut streamed = Vec::new();
        let mut small_buf = vec![0u8; 61];

        let mut y_rows: LumaRowIter<'_> = RowIterator::new(
            y_plane,
            Transform::for_crop_followed_by_rotation(0, 0, width, height, 0),
            padded_row_length(width),
        );
        let chroma_transform =
            Transform::for_crop_followed_by_rotation(0, 0, width / 2, height / 2, 0);
        let mut cb_rows: ChromaRowIter<'_> =
            RowIterator::new(cb_plane, chroma_transform, padded_row_length(width / 2));
        let mut cr_rows: ChromaRowIter<'_> =
            RowIterator::new(cr_plane, chroma_transform, padded_row_length(width / 2));

        let written = compress(
            width,
            height,
            &mut y_rows,
            &mut cb_rows,
            &mut cr_rows,
            &mut small_buf,
            |chunk: &[u8]| streamed.extend_from_slice(chunk),
            80,
        )
        .unwrap();

        assert_eq!(written, reference_len);
        assert_eq!(streamed, &reference[..reference_len]);
    }

    #[test]
    fn rotation_swaps_output_dimensions() {
        // Verified through the SOF0 header of the produced stream.
        let (y_data, cb_data, cr_data) = gradient_image(64, 48);
        let y_plane = Plane::new(64, 48, &y_data, 1, 64).unwrap();
        let cb_plane = Plane::new(32, 24, &cb_data, 1, 32).unwrap();
        let cr_plane = Plane::new(32, 24, &cr_data, 1, 32).unwrap();

        let mut out = vec![0u8; 64 * 1024];
        let written = compress_cropped(
            y_plane,
            cb_plane,
            cr_plane,
            &mut out,
            90,
            CropRect::full(64, 48),
            1,
        )
        .unwrap();

        let sof = find_segment(&out[..written], 0xC0).expect("SOF0 present");
        let height = u16::from_be_bytes([sof[3], sof[4]]);
        let width = u16::from_be_bytes([sof[5], sof[6]]);
        assert_eq!((width, height), (48, 64));
    }

    /// Locate a marker segment and return its payload (including length).
    fn find_segment(bytes: &[u8], marker: u8) -> Option<&[u8]> {
        let mut i = 2; // skip SOI
        while i + 4 <= bytes.len() {
            assert_eq!(bytes[i], 0xFF);
            let kind = bytes[i + 1];
            let len = u16::from_be_bytes([bytes[i + 2], bytes[i + 3]]) as usize;
            if kind == marker {
                return Some(&bytes[i + 2..i + 2 + len]);
            }
            if kind == 0xDA {
                return None; // entropy data follows, stop scanning
            }
            i += 2 + len;
        }
        None
    }
}
