//! PNG predictor reversal for FlateDecode streams.
//!
//! Cross-reference streams almost always use predictor 12 (PNG Up), so
//! the full PNG filter set is implemented. TIFF predictor 2 is not.

use super::DecodeParams;
use crate::error::{Error, Result};

/// Reverse the predictor applied before compression.
///
/// PDF Spec: ISO 32000-1:2008, Section 7.4.4.4. PNG filter algorithms per
/// the PNG specification, Section 9 (Filtering).
pub fn apply_predictor(data: &[u8], params: &DecodeParams) -> Result<Vec<u8>> {
    match params.predictor {
        1 => Ok(data.to_vec()),
        2 => Err(Error::Unsupported(
            "TIFF predictor 2 in FlateDecode stream".to_string(),
        )),
        p if (10..=15).contains(&p) => apply_png_predictor(data, params),
        p => Err(Error::Decode(format!("unknown predictor {}", p))),
    }
}

fn apply_png_predictor(data: &[u8], params: &DecodeParams) -> Result<Vec<u8>> {
    // Bytes per complete pixel, minimum 1.
    let bpp = ((params.colors * params.bits_per_component) / 8).max(1);
    let row_len = (params.columns * params.colors * params.bits_per_component + 7) / 8;

    if row_len == 0 {
        return Err(Error::Decode("predictor row length is zero".to_string()));
    }
    // Each encoded row carries one leading filter-type byte.
    if data.len() % (row_len + 1) != 0 {
        return Err(Error::Decode(format!(
            "predictor data length {} not a multiple of row size {}",
            data.len(),
            row_len + 1
        )));
    }

    let rows = data.len() / (row_len + 1);
    let mut out = vec![0u8; rows * row_len];

    for row in 0..rows {
        let src = &data[row * (row_len + 1)..(row + 1) * (row_len + 1)];
        let filter_type = src[0];
        let src = &src[1..];

        for i in 0..row_len {
            let left = if i >= bpp {
                out[row * row_len + i - bpp]
            } else {
                0
            };
            let up = if row > 0 {
                out[(row - 1) * row_len + i]
            } else {
                0
            };
            let up_left = if row > 0 && i >= bpp {
                out[(row - 1) * row_len + i - bpp]
            } else {
                0
            };

            let reconstructed = match filter_type {
                0 => src[i],
                1 => src[i].wrapping_add(left),
                2 => src[i].wrapping_add(up),
                3 => src[i].wrapping_add(((left as u16 + up as u16) / 2) as u8),
                4 => src[i].wrapping_add(paeth(left, up, up_left)),
                t => {
                    return Err(Error::Decode(format!("invalid PNG filter type {}", t)));
                },
            };
            out[row * row_len + i] = reconstructed;
        }
    }

    Ok(out)
}

/// Paeth predictor function per the PNG specification.
fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let pa = (p - a as i16).abs();
    let pb = (p - b as i16).abs();
    let pc = (p - c as i16).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(columns: usize) -> DecodeParams {
        DecodeParams {
            predictor: 12,
            columns,
            colors: 1,
            bits_per_component: 8,
        }
    }

    #[test]
    fn test_predictor_none_rows() {
        // Two rows of 3 bytes, filter type 0 (None).
        let data = [0, 1, 2, 3, 0, 4, 5, 6];
        let out = apply_predictor(&data, &params(3)).unwrap();
        assert_eq!(out, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_predictor_up_rows() {
        // Row 1: None [1, 2, 3]; row 2: Up with deltas [1, 1, 1].
        let data = [0, 1, 2, 3, 2, 1, 1, 1];
        let out = apply_predictor(&data, &params(3)).unwrap();
        assert_eq!(out, vec![1, 2, 3, 2, 3, 4]);
    }

    #[test]
    fn test_predictor_sub_row() {
        // Single row, Sub filter: each byte adds the byte one pixel left.
        let data = [1, 5, 1, 1];
        let out = apply_predictor(&data, &params(3)).unwrap();
        assert_eq!(out, vec![5, 6, 7]);
    }

    #[test]
    fn test_predictor_identity_when_one() {
        let p = DecodeParams {
            predictor: 1,
            ..Default::default()
        };
        assert_eq!(apply_predictor(&[9, 9], &p).unwrap(), vec![9, 9]);
    }

    #[test]
    fn test_bad_length_rejected() {
        let err = apply_predictor(&[0, 1], &params(3)).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_paeth_prefers_nearest() {
        assert_eq!(paeth(10, 20, 15), 10); // p = 15, closest to a
        assert_eq!(paeth(10, 20, 5), 20); // p = 25, closest to b
    }
}
