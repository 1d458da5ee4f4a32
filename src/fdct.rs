//! Integer forward DCT.
//!
//! Implements the Loeffler, Ligtenberg and Moschytz fast 1-D DCT (Proc.
//! ICASSP '89, pp. 988-991) in scaled fixed-point arithmetic, as used by the
//! Independent JPEG Group's software: a 1-D pass over the rows, then over
//! the columns. Output coefficients are scaled up by a factor of 8 relative
//! to the true DCT, which the quantizer divides back out.

const CONST_BITS: i32 = 13;
const PASS1_BITS: i32 = 2;

// FIX(x) == round(x * 2^13)
const FIX_0_298631336: i32 = 2446;
const FIX_0_390180644: i32 = 3196;
const FIX_0_541196100: i32 = 4433;
const FIX_0_765366865: i32 = 6270;
const FIX_0_899976223: i32 = 7373;
const FIX_1_175875602: i32 = 9633;
const FIX_1_501321110: i32 = 12299;
const FIX_1_847759065: i32 = 15137;
const FIX_1_961570560: i32 = 16069;
const FIX_2_053119869: i32 = 16819;
const FIX_2_562915447: i32 = 20995;
const FIX_3_072711026: i32 = 25172;

#[inline(always)]
fn descale(x: i32, n: i32) -> i32 {
    // Right shift with rounding.
    (x + (1 << (n - 1))) >> n
}

/// One 1-D DCT over eight values.
///
/// The first pass leaves results scaled up by `2^PASS1_BITS` to keep
/// precision; the second pass divides that back out. Both passes share the
/// same butterfly, only the descaling differs.
#[inline(always)]
fn dct_1d<const SECOND_PASS: bool>(v: [i32; 8]) -> [i32; 8] {
    let scaled_shift = if SECOND_PASS {
        CONST_BITS + PASS1_BITS
    } else {
        CONST_BITS - PASS1_BITS
    };

    let tmp0 = v[0] + v[7];
    let tmp7 = v[0] - v[7];
    let tmp1 = v[1] + v[6];
    let tmp6 = v[1] - v[6];
    let tmp2 = v[2] + v[5];
    let tmp5 = v[2] - v[5];
    let tmp3 = v[3] + v[4];
    let tmp4 = v[3] - v[4];

    // Even part.
    let tmp10 = tmp0 + tmp3;
    let tmp13 = tmp0 - tmp3;
    let tmp11 = tmp1 + tmp2;
    let tmp12 = tmp1 - tmp2;

    let mut out = [0i32; 8];

    if SECOND_PASS {
        out[0] = descale(tmp10 + tmp11, PASS1_BITS);
        out[4] = descale(tmp10 - tmp11, PASS1_BITS);
    } else {
        out[0] = (tmp10 + tmp11) << PASS1_BITS;
        out[4] = (tmp10 - tmp11) << PASS1_BITS;
    }

    let z1 = (tmp12 + tmp13) * FIX_0_541196100;
    out[2] = descale(z1 + tmp13 * FIX_0_765366865, scaled_shift);
    out[6] = descale(z1 - tmp12 * FIX_1_847759065, scaled_shift);

    // Odd part, rotations by the remaining four angles.
    let z1 = (tmp4 + tmp7) * -FIX_0_899976223;
    let z2 = (tmp5 + tmp6) * -FIX_2_562915447;
    let z5 = (tmp4 + tmp6 + tmp5 + tmp7) * FIX_1_175875602;
    let z3 = (tmp4 + tmp6) * -FIX_1_961570560 + z5;
    let z4 = (tmp5 + tmp7) * -FIX_0_390180644 + z5;

    let tmp4 = tmp4 * FIX_0_298631336;
    let tmp5 = tmp5 * FIX_2_053119869;
    let tmp6 = tmp6 * FIX_3_072711026;
    let tmp7 = tmp7 * FIX_1_501321110;

    out[7] = descale(tmp4 + z1 + z3, scaled_shift);
    out[5] = descale(tmp5 + z2 + z4, scaled_shift);
    out[3] = descale(tmp6 + z2 + z3, scaled_shift);
    out[1] = descale(tmp7 + z1 + z4, scaled_shift);

    out
}

/// 2-D forward DCT of a level-shifted 8x8 block, in place.
pub(crate) fn forward_dct(block: &mut [i16; 64]) {
    let mut work = [0i32; 64];

    for row in 0..8 {
        let offset = row * 8;
        let mut v = [0i32; 8];
        for (i, value) in v.iter_mut().enumerate() {
            *value = i32::from(block[offset + i]);
        }
        work[offset..offset + 8].copy_from_slice(&dct_1d::<false>(v));
    }

    for col in 0..8 {
        let mut v = [0i32; 8];
        for (i, value) in v.iter_mut().enumerate() {
            *value = work[i * 8 + col];
        }
        let out = dct_1d::<true>(v);
        for (i, value) in out.iter().enumerate() {
            block[i * 8 + col] = *value as i16;
        }
    }
}
