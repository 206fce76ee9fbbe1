//! # Barcode Decoder
//!
//! Turns image bytes into a barcode string.
//!
//! ## Decode Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UploadedImage (Arc<[u8]>)                                             │
//! │       │                                                                 │
//! │       │  spawn_blocking (pixel work stays off the async workers)       │
//! │       ▼                                                                 │
//! │  image::load_from_memory ──► to_luma8()                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  rxing detect_in_luma_with_hints                                       │
//! │    POSSIBLE_FORMATS = configured symbologies                           │
//! │    TRY_HARDER       = accuracy over speed                              │
//! │       │                                                                 │
//! │       ├── found     → DecodedSymbol { "4006381333931", EAN-13 }        │
//! │       └── not found → DecodeError::NoSymbol                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use rxing::{BarcodeFormat, DecodeHintType, DecodeHintValue, DecodingHintDictionary, Exceptions};
use tracing::{debug, instrument};

use trolley_core::{Barcode, DecodedBarcode, Symbology};

use crate::error::{DecodeError, DecodeResult};
use crate::upload::UploadedImage;

// =============================================================================
// Decoder Trait
// =============================================================================

/// Raw decoder output, before it is validated as a catalog barcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSymbol {
    pub text: String,
    pub symbology: Symbology,
}

impl DecodedSymbol {
    pub fn new(text: impl Into<String>, symbology: Symbology) -> Self {
        DecodedSymbol {
            text: text.into(),
            symbology,
        }
    }

    /// Validates the text as a catalog key.
    ///
    /// This is the only way to get a `DecodedBarcode` out of a decode, so
    /// text that isn't all digits (or is too short) never reaches a lookup.
    pub fn into_barcode(self) -> DecodeResult<DecodedBarcode> {
        match Barcode::parse(&self.text) {
            Ok(barcode) => Ok(DecodedBarcode {
                barcode,
                symbology: self.symbology,
            }),
            Err(reason) => Err(DecodeError::InvalidSymbol {
                text: self.text,
                reason,
            }),
        }
    }
}

/// Reads one barcode from an image.
///
/// Implementations must not hold on to the image beyond the call.
#[async_trait]
pub trait BarcodeDecoder: Send + Sync {
    async fn decode(&self, image: &UploadedImage) -> DecodeResult<DecodedSymbol>;
}

// =============================================================================
// rxing Decoder
// =============================================================================

/// Production decoder backed by rxing.
#[derive(Debug, Clone)]
pub struct SymbolDecoder {
    symbologies: Arc<[Symbology]>,
    try_harder: bool,
}

impl SymbolDecoder {
    pub fn new(symbologies: &[Symbology], try_harder: bool) -> Self {
        let symbologies = if symbologies.is_empty() {
            &Symbology::ALL[..]
        } else {
            symbologies
        };

        SymbolDecoder {
            symbologies: symbologies.into(),
            try_harder,
        }
    }

    pub fn symbologies(&self) -> &[Symbology] {
        &self.symbologies
    }

    pub fn try_harder(&self) -> bool {
        self.try_harder
    }
}

impl Default for SymbolDecoder {
    /// Every retail symbology, try-harder on.
    fn default() -> Self {
        SymbolDecoder::new(&Symbology::ALL, true)
    }
}

#[async_trait]
impl BarcodeDecoder for SymbolDecoder {
    #[instrument(skip_all, fields(preview = %image.preview_url()))]
    async fn decode(&self, image: &UploadedImage) -> DecodeResult<DecodedSymbol> {
        let bytes = image.shared_bytes();
        let symbologies = Arc::clone(&self.symbologies);
        let try_harder = self.try_harder;

        let symbol = tokio::task::spawn_blocking(move || {
            decode_blocking(&bytes, &symbologies, try_harder)
        })
        .await
        .map_err(|e| DecodeError::Worker(e.to_string()))??;

        debug!(text = %symbol.text, symbology = %symbol.symbology, "Symbol decoded");
        Ok(symbol)
    }
}

fn decode_blocking(
    bytes: &[u8],
    symbologies: &[Symbology],
    try_harder: bool,
) -> DecodeResult<DecodedSymbol> {
    let luma = image::load_from_memory(bytes)
        .map_err(|e| DecodeError::UnreadableImage(e.to_string()))?
        .to_luma8();
    let (width, height) = luma.dimensions();

    let mut hints: DecodingHintDictionary = HashMap::new();
    hints.insert(
        DecodeHintType::TRY_HARDER,
        DecodeHintValue::TryHarder(try_harder),
    );
    hints.insert(
        DecodeHintType::POSSIBLE_FORMATS,
        DecodeHintValue::PossibleFormats(
            symbologies.iter().copied().map(to_rxing_format).collect::<HashSet<_>>(),
        ),
    );

    let result = rxing::helpers::detect_in_luma_with_hints(
        luma.into_raw(),
        width,
        height,
        None,
        &mut hints,
    )
    .map_err(|e| match e {
        // a symbol whose checksum or structure fails is as good as absent
        Exceptions::NotFoundException(_)
        | Exceptions::ChecksumException(_)
        | Exceptions::FormatException(_) => DecodeError::NoSymbol,
        other => DecodeError::UnreadableImage(format!("{other:?}")),
    })?;

    let symbology = from_rxing_format(result.getBarcodeFormat())?;
    Ok(DecodedSymbol::new(result.getText(), symbology))
}

fn to_rxing_format(symbology: Symbology) -> BarcodeFormat {
    match symbology {
        Symbology::Ean13 => BarcodeFormat::EAN_13,
        Symbology::Ean8 => BarcodeFormat::EAN_8,
        Symbology::Code128 => BarcodeFormat::CODE_128,
        Symbology::Code39 => BarcodeFormat::CODE_39,
        Symbology::UpcA => BarcodeFormat::UPC_A,
        Symbology::UpcE => BarcodeFormat::UPC_E,
    }
}

fn from_rxing_format(format: &BarcodeFormat) -> DecodeResult<Symbology> {
    match format {
        BarcodeFormat::EAN_13 => Ok(Symbology::Ean13),
        BarcodeFormat::EAN_8 => Ok(Symbology::Ean8),
        BarcodeFormat::CODE_128 => Ok(Symbology::Code128),
        BarcodeFormat::CODE_39 => Ok(Symbology::Code39),
        BarcodeFormat::UPC_A => Ok(Symbology::UpcA),
        BarcodeFormat::UPC_E => Ok(Symbology::UpcE),
        other => Err(DecodeError::UnsupportedSymbology(format!("{other:?}"))),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::PreviewRegistry;
    use image::{GrayImage, ImageFormat, Luma};
    use std::io::Cursor;

    const L_CODES: [&str; 10] = [
        "0001101", "0011001", "0010011", "0111101", "0100011",
        "0110001", "0101111", "0111011", "0110111", "0001011",
    ];
    const G_CODES: [&str; 10] = [
        "0100111", "0110011", "0011011", "0100001", "0011101",
        "0111001", "0000101", "0010001", "0001001", "0010111",
    ];
    const R_CODES: [&str; 10] = [
        "1110010", "1100110", "1101100", "1000010", "1011100",
        "1001110", "1010000", "1000100", "1001000", "1110100",
    ];
    const PARITY: [&str; 10] = [
        "LLLLLL", "LLGLGG", "LLGGLG", "LLGGGL", "LGLLGG",
        "LGGLLG", "LGGGLG", "LGLGLG", "LGLGGL", "LGGLGL",
    ];

    /// Renders a clean EAN-13 symbol as a PNG.
    fn render_ean13(code: &str) -> Vec<u8> {
        let digits: Vec<usize> = code.bytes().map(|b| (b - b'0') as usize).collect();
        assert_eq!(digits.len(), 13);

        let mut modules = String::from("101");
        for (i, parity) in PARITY[digits[0]].chars().enumerate() {
            let table = if parity == 'L' { &L_CODES } else { &G_CODES };
            modules.push_str(table[digits[i + 1]]);
        }
        modules.push_str("01010");
        for digit in &digits[7..] {
            modules.push_str(R_CODES[*digit]);
        }
        modules.push_str("101");

        let module_px = 4;
        let quiet = 12 * module_px;
        let width = (modules.len() as u32) * module_px + 2 * quiet;
        let height = 120;

        let mut img = GrayImage::from_pixel(width, height, Luma([255]));
        for (i, bit) in modules.chars().enumerate() {
            if bit == '1' {
                let x0 = quiet + i as u32 * module_px;
                for x in x0..x0 + module_px {
                    for y in 10..height - 10 {
                        img.put_pixel(x, y, Luma([0]));
                    }
                }
            }
        }

        encode_png(img)
    }

    fn encode_png(img: GrayImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageLuma8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_into_barcode_validates_digits() {
        let ok = DecodedSymbol::new("4006381333931", Symbology::Ean13)
            .into_barcode()
            .unwrap();
        assert_eq!(ok.barcode.as_str(), "4006381333931");

        let err = DecodedSymbol::new("HELLO-42", Symbology::Code39)
            .into_barcode()
            .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidSymbol { ref text, .. } if text == "HELLO-42"));

        assert!(DecodedSymbol::new("1234567", Symbology::Code128)
            .into_barcode()
            .is_err());
    }

    #[test]
    fn test_empty_symbology_list_means_all() {
        let decoder = SymbolDecoder::new(&[], false);
        assert_eq!(decoder.symbologies().len(), Symbology::ALL.len());
        assert!(!decoder.try_harder());
    }

    #[test]
    fn test_format_mapping_round_trips() {
        for symbology in Symbology::ALL {
            assert_eq!(from_rxing_format(&to_rxing_format(symbology)).unwrap(), symbology);
        }
        assert!(matches!(
            from_rxing_format(&BarcodeFormat::QR_CODE),
            Err(DecodeError::UnsupportedSymbology(_))
        ));
    }

    #[tokio::test]
    async fn test_decodes_rendered_ean13() {
        let registry = PreviewRegistry::new();
        let image = registry
            .select(render_ean13("4006381333931"), Some("image/png"))
            .unwrap();

        let symbol = SymbolDecoder::default().decode(&image).await.unwrap();
        assert_eq!(symbol.text, "4006381333931");
        assert_eq!(symbol.symbology, Symbology::Ean13);
    }

    #[tokio::test]
    async fn test_blank_image_has_no_symbol() {
        let registry = PreviewRegistry::new();
        let blank = encode_png(GrayImage::from_pixel(300, 120, Luma([255])));
        let image = registry.select(blank, Some("image/png")).unwrap();

        let err = SymbolDecoder::default().decode(&image).await.unwrap_err();
        assert_eq!(err, DecodeError::NoSymbol);
    }

    #[tokio::test]
    async fn test_garbage_bytes_are_unreadable() {
        let registry = PreviewRegistry::new();
        let image = registry
            .select(b"not really a jpeg".to_vec(), Some("image/jpeg"))
            .unwrap();

        let err = SymbolDecoder::default().decode(&image).await.unwrap_err();
        assert!(matches!(err, DecodeError::UnreadableImage(_)));
    }
}
