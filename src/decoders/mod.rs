//! Stream filter decoders.
//!
//! Only the filters that occur in the documents this crate processes are
//! implemented: FlateDecode (with PNG predictors) and ASCIIHexDecode.
//! Anything else surfaces as [`Error::UnsupportedFilter`].

mod ascii_hex;
mod flate;
mod predictor;

pub use flate::{flate_decode, flate_encode};

use crate::error::{Error, Result};

/// Predictor parameters from a stream's `/DecodeParms` dictionary.
///
/// PDF Spec: ISO 32000-1:2008, Section 7.4.4.4, Table 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeParams {
    /// Predictor algorithm (1 = none, 2 = TIFF, >= 10 = PNG)
    pub predictor: i64,
    /// Samples per row
    pub columns: usize,
    /// Color components per sample
    pub colors: usize,
    /// Bits per color component
    pub bits_per_component: usize,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            predictor: 1,
            columns: 1,
            colors: 1,
            bits_per_component: 8,
        }
    }
}

/// Run `data` through a filter pipeline in order.
///
/// The predictor (if any) applies to the FlateDecode stage, which is the
/// only place PDF writers use one in practice.
pub fn decode_stream_with_params(
    data: &[u8],
    filters: &[String],
    params: Option<&DecodeParams>,
) -> Result<Vec<u8>> {
    let mut current = data.to_vec();

    for filter in filters {
        current = match filter.as_str() {
            "FlateDecode" | "Fl" => {
                let inflated = flate::flate_decode(&current)?;
                match params {
                    Some(p) if p.predictor > 1 => predictor::apply_predictor(&inflated, p)?,
                    _ => inflated,
                }
            },
            "ASCIIHexDecode" | "AHx" => ascii_hex::decode(&current)?,
            other => return Err(Error::UnsupportedFilter(other.to_string())),
        };
    }

    Ok(current)
}
