//! Граница матричного кодировщика
//!
//! Кодирование данных и Reed-Solomon делегируются крейту `qrcode`; здесь только
//! контракт `payload + уровень коррекции -> сетка модулей`.

use qrcode::types::QrError;
use qrcode::{Color, EcLevel, QrCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ошибки матричного кодировщика
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Payload of {payload_len} bytes exceeds QR capacity at level {level:?}")]
    CapacityExceeded {
        payload_len: usize,
        level: ErrorCorrection,
    },

    #[error("Encoder error: {0}")]
    Encoder(String),
}

/// Уровень коррекции ошибок (от меньшей избыточности к большей)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(from = "String")]
pub enum ErrorCorrection {
    L, // ~7%
    #[default]
    M, // ~15%
    Q, // ~25%
    H, // ~30%
}

impl ErrorCorrection {
    /// Разбор токена из формы; неизвестное значение -> `M`
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_uppercase().as_str() {
            "L" | "LOW" => ErrorCorrection::L,
            "M" | "MEDIUM" => ErrorCorrection::M,
            "Q" | "QUARTILE" => ErrorCorrection::Q,
            "H" | "HIGH" => ErrorCorrection::H,
            other => {
                log::debug!("Unknown error correction token {:?}, using M", other);
                ErrorCorrection::M
            }
        }
    }

    fn ec_level(self) -> EcLevel {
        match self {
            ErrorCorrection::L => EcLevel::L,
            ErrorCorrection::M => EcLevel::M,
            ErrorCorrection::Q => EcLevel::Q,
            ErrorCorrection::H => EcLevel::H,
        }
    }
}

impl From<String> for ErrorCorrection {
    fn from(token: String) -> Self {
        Self::from_token(&token)
    }
}

/// Неизменяемая квадратная сетка модулей N×N, `true` = тёмный модуль
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGrid {
    size: usize,
    modules: Vec<bool>,
}

impl ModuleGrid {
    /// Сетка из модулей в порядке строк. `None`, если размер не вида `4v + 17`
    /// или длина не совпадает с `size * size`.
    pub fn from_modules(size: usize, modules: Vec<bool>) -> Option<Self> {
        if size < 21 || (size - 17) % 4 != 0 || modules.len() != size * size {
            return None;
        }
        Some(Self { size, modules })
    }

    /// Число модулей по стороне (N)
    pub fn size(&self) -> usize {
        self.size
    }

    /// Версия символа, выведенная из N
    pub fn version(&self) -> usize {
        (self.size - 17) / 4
    }

    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.modules[row * self.size + col]
    }

    /// Количество тёмных модулей
    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|&&m| m).count()
    }
}

/// Контракт матричного кодировщика
pub trait MatrixEncoder {
    fn encode(&self, payload: &str, level: ErrorCorrection) -> Result<ModuleGrid, EncodeError>;
}

/// Кодировщик на базе крейта `qrcode`
#[derive(Debug, Clone, Copy, Default)]
pub struct QrcodeEncoder;

impl MatrixEncoder for QrcodeEncoder {
    fn encode(&self, payload: &str, level: ErrorCorrection) -> Result<ModuleGrid, EncodeError> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), level.ec_level())
            .map_err(|e| match e {
                QrError::DataTooLong => EncodeError::CapacityExceeded {
                    payload_len: payload.len(),
                    level,
                },
                other => EncodeError::Encoder(other.to_string()),
            })?;

        let size = code.width();
        let modules = code
            .to_colors()
            .into_iter()
            .map(|c| c == Color::Dark)
            .collect();

        ModuleGrid::from_modules(size, modules)
            .ok_or_else(|| EncodeError::Encoder(format!("Unexpected matrix width {}", size)))
    }
}
