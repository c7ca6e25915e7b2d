//! Проверка сканируемости
//!
//! Готовое изображение сводится к оттенкам серого (прозрачность накладывается
//! на белый) и распознаётся через rqrr; при неудаче пробуем инвертированную копию.

use image::{GrayImage, Luma, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matrix::ErrorCorrection;

/// Ошибки распознавания
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("No QR code found in image")]
    NotFound,

    #[error("Failed to decode QR: {0}")]
    DecodeFailed(String),
}

/// Результат распознавания
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanReport {
    pub content: String,
    pub error_correction: Option<ErrorCorrection>,
    /// Версия символа (1-40)
    pub version: usize,
}

/// Распознать изображение и вернуть payload
pub fn scan(image: &RgbaImage) -> Result<String, VerifyError> {
    scan_report(image).map(|report| report.content)
}

/// Распознать изображение с метаданными символа
pub fn scan_report(image: &RgbaImage) -> Result<ScanReport, VerifyError> {
    let gray = flatten(image);
    match decode_gray(&gray) {
        Ok(report) => Ok(report),
        Err(first) => {
            log::debug!("Scan-back failed ({}), trying inverted image", first);
            decode_gray(&invert(&gray)).map_err(|_| first)
        }
    }
}

fn decode_gray(img: &GrayImage) -> Result<ScanReport, VerifyError> {
    let mut prepared = rqrr::PreparedImage::prepare(img.clone());
    let grids = prepared.detect_grids();
    log::debug!("rqrr: detected {} grids on {}x{}", grids.len(), img.width(), img.height());

    let grid = grids.first().ok_or(VerifyError::NotFound)?;
    let (meta, content) = grid
        .decode()
        .map_err(|e| VerifyError::DecodeFailed(format!("{:?}", e)))?;

    // format-info bit order: M=00, L=01, H=10, Q=11
    let error_correction = match meta.ecc_level {
        0 => Some(ErrorCorrection::M),
        1 => Some(ErrorCorrection::L),
        2 => Some(ErrorCorrection::H),
        3 => Some(ErrorCorrection::Q),
        _ => None,
    };

    Ok(ScanReport {
        content,
        error_correction,
        version: meta.version.0,
    })
}

/// Наложение на белый фон и перевод в яркость
fn flatten(image: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let alpha = a as f32 / 255.0;
        let over_white = |c: u8| c as f32 * alpha + 255.0 * (1.0 - alpha);
        let luma = 0.299 * over_white(r) + 0.587 * over_white(g) + 0.114 * over_white(b);
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}

fn invert(img: &GrayImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| Luma([255 - img.get_pixel(x, y).0[0]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::Compositor;
    use crate::matrix::{MatrixEncoder, QrcodeEncoder};
    use crate::style::{Color, StyleConfig};
    use image::Rgba;

    #[test]
    fn test_blank_image_not_found() {
        let blank = RgbaImage::from_pixel(64, 64, Rgba([255, 255, 255, 255]));
        assert_eq!(scan(&blank), Err(VerifyError::NotFound));
    }

    #[test]
    fn test_flatten_transparent_is_white() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        assert_eq!(flatten(&img).get_pixel(0, 0).0[0], 255);
    }

    #[test]
    fn test_scan_default_style() {
        let style = StyleConfig { size: 400, margin: 4, ..StyleConfig::default() };
        let composed = Compositor::new()
            .render(&QrcodeEncoder, "https://example.com", &style)
            .unwrap();
        let report = scan_report(composed.image()).unwrap();
        assert_eq!(report.content, "https://example.com");
        assert!(report.error_correction.is_some());

        let grid = QrcodeEncoder.encode("https://example.com", ErrorCorrection::M).unwrap();
        assert_eq!(report.version, grid.version());
    }

    #[test]
    fn test_scan_inverted_colors() {
        let style = StyleConfig {
            size: 400,
            margin: 4,
            foreground: Color::WHITE,
            background: Color::BLACK,
            ..StyleConfig::default()
        };
        let composed = Compositor::new().render(&QrcodeEncoder, "inverted", &style).unwrap();
        assert_eq!(scan(composed.image()).as_deref(), Ok("inverted"));
    }
}
