//! Конфигурация внешнего вида QR-кода
//!
//! Строковые токены формы (формы модулей, рамка, цвета) разбираются в закрытые
//! перечисления на границе; неизвестные значения заменяются безопасными умолчаниями.

use std::fmt;
use std::sync::{Arc, OnceLock};

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::logo::{self, LogoError};
use crate::matrix::ErrorCorrection;

pub const MIN_OUTPUT_SIZE: u32 = 128;
pub const MAX_OUTPUT_SIZE: u32 = 4096;
pub const MAX_MARGIN: u32 = 16;

/// Минимальное поле (в модулях), когда поверх символа лежит логотип
pub const LOGO_MIN_MARGIN: u32 = 4;
pub const MIN_LOGO_FRACTION: f32 = 0.05;
pub const MAX_LOGO_FRACTION: f32 = 0.30;

pub const DEFAULT_CAPTION: &str = "Scan me";

/// RGBA цвет, сериализуется как `#rrggbb` / `#rrggbbaa`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Разбор `#rgb`, `#rrggbb`, `#rrggbbaa` или `transparent`
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("transparent") {
            return Some(Color::TRANSPARENT);
        }
        let hex = value.strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, c) in out.iter_mut().zip(hex.chars()) {
                    let v = c.to_digit(16)? as u8;
                    *slot = v * 16 + v;
                }
                Some(Color::rgb(out[0], out[1], out[2]))
            }
            6 => Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Color {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: channel(6)?,
            }),
            _ => None,
        }
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

impl From<Rgba<u8>> for Color {
    fn from(p: Rgba<u8>) -> Self {
        Color { r: p.0[0], g: p.0[1], b: p.0[2], a: p.0[3] }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Цвет из формы: при невалидной строке берётся значение по умолчанию поля
fn lenient_color<'de, D: Deserializer<'de>>(deserializer: D, fallback: Color) -> Result<Color, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(Color::parse(&raw).unwrap_or_else(|| {
        log::warn!("Invalid color {:?}, using {}", raw, fallback);
        fallback
    }))
}

mod defaults {
    use super::*;

    pub const FOREGROUND: Color = Color::rgb(0x05, 0x05, 0x05);
    pub const BACKGROUND: Color = Color::WHITE;
    pub const LABEL_BACKGROUND: Color = Color::rgb(0x05, 0x05, 0x05);
    pub const LABEL_TEXT: Color = Color::rgb(0xf5, 0xf3, 0xee);
    pub const CARD_BACKGROUND: Color = Color::rgb(0xf9, 0xfa, 0xfb);
    pub const CARD_BORDER: Color = Color::rgb(0xe5, 0xe7, 0xeb);
    pub const BAR_TEXT: Color = Color::rgb(0x11, 0x18, 0x27);

    pub fn foreground() -> Color {
        FOREGROUND
    }
    pub fn background() -> Color {
        BACKGROUND
    }
    pub fn label_background() -> Color {
        LABEL_BACKGROUND
    }
    pub fn label_text() -> Color {
        LABEL_TEXT
    }
    pub fn size() -> u32 {
        1000
    }
    pub fn margin() -> u32 {
        2
    }
    pub fn logo_size() -> f32 {
        0.22
    }
    pub fn yes() -> bool {
        true
    }
    pub fn caption() -> String {
        DEFAULT_CAPTION.to_string()
    }

    pub fn de_foreground<'de, D: Deserializer<'de>>(d: D) -> Result<Color, D::Error> {
        lenient_color(d, FOREGROUND)
    }
    pub fn de_background<'de, D: Deserializer<'de>>(d: D) -> Result<Color, D::Error> {
        lenient_color(d, BACKGROUND)
    }
    pub fn de_label_background<'de, D: Deserializer<'de>>(d: D) -> Result<Color, D::Error> {
        lenient_color(d, LABEL_BACKGROUND)
    }
    pub fn de_label_text<'de, D: Deserializer<'de>>(d: D) -> Result<Color, D::Error> {
        lenient_color(d, LABEL_TEXT)
    }
    pub fn de_card_background<'de, D: Deserializer<'de>>(d: D) -> Result<Color, D::Error> {
        lenient_color(d, CARD_BACKGROUND)
    }
    pub fn de_card_border<'de, D: Deserializer<'de>>(d: D) -> Result<Color, D::Error> {
        lenient_color(d, CARD_BORDER)
    }
    pub fn de_bar_text<'de, D: Deserializer<'de>>(d: D) -> Result<Color, D::Error> {
        lenient_color(d, BAR_TEXT)
    }
}

/// Форма модуля (используется и для тела, и для «глаз»)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum ModuleShape {
    #[default]
    Square,
    Rounded,
    Dots,
}

impl From<String> for ModuleShape {
    fn from(token: String) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "square" => ModuleShape::Square,
            "rounded" => ModuleShape::Rounded,
            "dots" | "dot" | "circle" => ModuleShape::Dots,
            other => {
                log::debug!("Unknown module shape {:?}, using square", other);
                ModuleShape::Square
            }
        }
    }
}

/// Рамка вокруг символа и подпись-«пилюля» под ним
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum FrameStyle {
    #[default]
    None,
    /// Только скруглённая обводка
    Border,
    /// Только подпись
    Caption,
    /// Обводка + подпись
    Label,
}

impl FrameStyle {
    pub fn has_border(self) -> bool {
        matches!(self, FrameStyle::Border | FrameStyle::Label)
    }

    pub fn has_caption(self) -> bool {
        matches!(self, FrameStyle::Caption | FrameStyle::Label)
    }
}

impl From<String> for FrameStyle {
    fn from(token: String) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "none" | "" => FrameStyle::None,
            "border" => FrameStyle::Border,
            "caption" => FrameStyle::Caption,
            "label" => FrameStyle::Label,
            other => {
                log::debug!("Unknown frame style {:?}, using none", other);
                FrameStyle::None
            }
        }
    }
}

/// Контур логотипа (и подложки под ним)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum LogoShape {
    #[default]
    Rounded,
    Circle,
}

impl From<String> for LogoShape {
    fn from(token: String) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "circle" => LogoShape::Circle,
            _ => LogoShape::Rounded,
        }
    }
}

/// Пресеты размера логотипа
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogoScale {
    Small,
    Medium,
    Large,
}

impl LogoScale {
    pub fn fraction(self) -> f32 {
        match self {
            LogoScale::Small => 0.14,
            LogoScale::Medium => 0.18,
            LogoScale::Large => 0.22,
        }
    }
}

/// Пресеты качества выгрузки: сторона символа в пикселях
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum Quality {
    Low,
    #[default]
    Medium,
    High,
}

impl Quality {
    pub fn size(self) -> u32 {
        match self {
            Quality::Low => 512,
            Quality::Medium => 1024,
            Quality::High => 2048,
        }
    }
}

impl From<String> for Quality {
    fn from(token: String) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "low" => Quality::Low,
            "high" => Quality::High,
            _ => Quality::Medium,
        }
    }
}

/// Скругление углов карточки
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum CardCorners {
    Square,
    #[default]
    Rounded,
    Pill,
}

impl CardCorners {
    /// Радиус в опорных единицах (1/512 стороны символа)
    pub fn radius(self) -> f32 {
        match self {
            CardCorners::Square => 24.0,
            CardCorners::Rounded => 32.0,
            CardCorners::Pill => 9999.0,
        }
    }
}

impl From<String> for CardCorners {
    fn from(token: String) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "square" => CardCorners::Square,
            "pill" | "soft" => CardCorners::Pill,
            _ => CardCorners::Rounded,
        }
    }
}

/// Линия обводки карточки
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum BorderLine {
    #[default]
    Solid,
    Dashed,
}

impl From<String> for BorderLine {
    fn from(token: String) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "dashed" => BorderLine::Dashed,
            _ => BorderLine::Solid,
        }
    }
}

/// Карточка вокруг готового символа: поля, скруглённый фон, обводка и
/// плашка с подписью
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CardStyle {
    pub corners: CardCorners,
    #[serde(deserialize_with = "defaults::de_card_background")]
    pub background: Color,
    #[serde(deserialize_with = "defaults::de_card_border")]
    pub border_color: Color,
    /// Толщина обводки в опорных единицах; 0 отключает обводку
    pub border_width: f32,
    pub border_line: BorderLine,
    /// Плашка с подписью под символом
    pub caption: bool,
    #[serde(deserialize_with = "defaults::de_card_background")]
    pub bar_background: Color,
    #[serde(deserialize_with = "defaults::de_bar_text")]
    pub bar_text_color: Color,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            corners: CardCorners::Rounded,
            background: defaults::CARD_BACKGROUND,
            border_color: defaults::CARD_BORDER,
            border_width: 8.0,
            border_line: BorderLine::Solid,
            caption: false,
            bar_background: defaults::CARD_BACKGROUND,
            bar_text_color: defaults::BAR_TEXT,
        }
    }
}

/// Изображение (логотип или фирменная метка): исходные байты и результат
/// декодирования, общий для всех клонов
#[derive(Clone)]
pub struct ImageSource(Arc<SourceData>);

struct SourceData {
    bytes: Vec<u8>,
    decoded: OnceLock<Result<RgbaImage, LogoError>>,
}

impl ImageSource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Arc::new(SourceData {
            bytes: bytes.into(),
            decoded: OnceLock::new(),
        }))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0.bytes
    }

    /// Декодированное изображение; байты декодируются не больше одного раза
    pub fn image(&self) -> Result<&RgbaImage, LogoError> {
        self.0
            .decoded
            .get_or_init(|| logo::decode(&self.0.bytes))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn is_decodable(&self) -> bool {
        self.image().is_ok()
    }
}

impl PartialEq for ImageSource {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.bytes() == other.bytes()
    }
}

impl Eq for ImageSource {}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageSource({} bytes)", self.0.bytes.len())
    }
}

/// Визуальная конфигурация QR-кода
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleConfig {
    #[serde(deserialize_with = "defaults::de_foreground")]
    pub foreground: Color,
    #[serde(deserialize_with = "defaults::de_background")]
    pub background: Color,
    pub gradient_enabled: bool,
    #[serde(deserialize_with = "defaults::de_foreground")]
    pub gradient_from: Color,
    #[serde(deserialize_with = "defaults::de_foreground")]
    pub gradient_to: Color,
    pub module_shape: ModuleShape,
    pub eye_shape: ModuleShape,
    /// Сторона символа в пикселях
    pub size: u32,
    /// Пресет качества; если задан, заменяет `size`
    pub quality: Option<Quality>,
    /// Тихая зона в модулях
    pub margin: u32,
    pub error_correction: ErrorCorrection,
    #[serde(skip)]
    pub logo: Option<ImageSource>,
    /// Доля от размера символа
    pub logo_size: f32,
    pub logo_shape: LogoShape,
    pub logo_clear_background: bool,
    /// Фирменная метка в правом нижнем углу
    #[serde(skip)]
    pub mark: Option<ImageSource>,
    pub frame: FrameStyle,
    pub frame_text: String,
    #[serde(deserialize_with = "defaults::de_label_background")]
    pub label_background: Color,
    #[serde(deserialize_with = "defaults::de_label_text")]
    pub label_text_color: Color,
    /// Карточка вокруг символа
    pub card: Option<CardStyle>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            foreground: defaults::foreground(),
            background: defaults::background(),
            gradient_enabled: false,
            gradient_from: defaults::foreground(),
            gradient_to: defaults::foreground(),
            module_shape: ModuleShape::Square,
            eye_shape: ModuleShape::Square,
            size: defaults::size(),
            quality: None,
            margin: defaults::margin(),
            error_correction: ErrorCorrection::M,
            logo: None,
            logo_size: defaults::logo_size(),
            logo_shape: LogoShape::Rounded,
            logo_clear_background: defaults::yes(),
            mark: None,
            frame: FrameStyle::None,
            frame_text: defaults::caption(),
            label_background: defaults::label_background(),
            label_text_color: defaults::label_text(),
            card: None,
        }
    }
}

/// Параметры, реально используемые при рендеринге
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveStyle {
    pub size: u32,
    pub margin: u32,
    pub error_correction: ErrorCorrection,
    pub logo_fraction: f32,
}

impl StyleConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_logo_scale(mut self, scale: LogoScale) -> Self {
        self.logo_size = scale.fraction();
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Подпись под символом; пустая строка заменяется на "Scan me"
    pub fn caption(&self) -> &str {
        let text = self.frame_text.trim();
        if text.is_empty() {
            DEFAULT_CAPTION
        } else {
            text
        }
    }

    /// Нормализация: ограничения диапазонов и связка логотип <-> поле / уровень коррекции.
    ///
    /// Учитываются только изображения, которые удаётся декодировать: битый
    /// логотип не рисуется и ничего не меняет. С логотипом уровень поднимается
    /// минимум до `Q`, а для крупного логотипа (больше пресета `Medium`) до `H`.
    /// Фирменная метка перекрывает угол матрицы и тоже требует `Q`.
    pub fn effective(&self) -> EffectiveStyle {
        let size = self
            .quality
            .map(Quality::size)
            .unwrap_or(self.size)
            .clamp(MIN_OUTPUT_SIZE, MAX_OUTPUT_SIZE);
        let mut margin = self.margin.min(MAX_MARGIN);
        let mut error_correction = self.error_correction;
        let logo_fraction = if self.logo_size.is_finite() {
            self.logo_size.clamp(MIN_LOGO_FRACTION, MAX_LOGO_FRACTION)
        } else {
            defaults::logo_size()
        };

        if self.frame.has_border() {
            margin = margin.max(1);
        }

        let mut floor = None;
        if self.logo.as_ref().is_some_and(ImageSource::is_decodable) {
            margin = margin.max(LOGO_MIN_MARGIN);
            floor = Some(if logo_fraction > LogoScale::Medium.fraction() {
                ErrorCorrection::H
            } else {
                ErrorCorrection::Q
            });
        }
        if self.mark.as_ref().is_some_and(ImageSource::is_decodable) {
            floor = floor.max(Some(ErrorCorrection::Q));
        }
        if let Some(floor) = floor {
            if error_correction < floor {
                log::debug!("Overlay attached: raising error correction {:?} -> {:?}", error_correction, floor);
                error_correction = floor;
            }
        }

        EffectiveStyle {
            size,
            margin,
            error_correction,
            logo_fraction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]))
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_color_parse() {
        assert_eq!(Color::parse("#ff8000"), Some(Color::rgb(255, 128, 0)));
        assert_eq!(Color::parse("#fff"), Some(Color::WHITE));
        assert_eq!(Color::parse("#00000080").map(|c| c.a), Some(0x80));
        assert_eq!(Color::parse("transparent"), Some(Color::TRANSPARENT));
        assert_eq!(Color::parse("red"), None);
        assert_eq!(Color::parse("#12345"), None);
        assert_eq!(Color::rgb(5, 5, 5).to_string(), "#050505");
    }

    #[test]
    fn test_lenient_deserialize() {
        let style = StyleConfig::from_json(
            r##"{"foreground":"nope","moduleShape":"blob","eyeShape":"rounded","frame":"label","errorCorrection":"x"}"##,
        )
        .unwrap();
        assert_eq!(style.foreground, defaults::FOREGROUND);
        assert_eq!(style.module_shape, ModuleShape::Square);
        assert_eq!(style.eye_shape, ModuleShape::Rounded);
        assert_eq!(style.frame, FrameStyle::Label);
        assert_eq!(style.error_correction, ErrorCorrection::M);
        assert_eq!(style.size, 1000);
    }

    #[test]
    fn test_caption_default() {
        let mut style = StyleConfig::default();
        style.frame_text = "   ".into();
        assert_eq!(style.caption(), DEFAULT_CAPTION);
        style.frame_text = " Menu ".into();
        assert_eq!(style.caption(), "Menu");
    }

    #[test]
    fn test_logo_couples_margin_and_level() {
        let mut style = StyleConfig {
            margin: 1,
            error_correction: ErrorCorrection::L,
            ..StyleConfig::default()
        };
        let plain = style.effective();
        assert_eq!(plain.margin, 1);
        assert_eq!(plain.error_correction, ErrorCorrection::L);

        style.logo = Some(ImageSource::new(png(8, 8)));
        style = style.with_logo_scale(LogoScale::Medium);
        let with_logo = style.effective();
        assert_eq!(with_logo.margin, LOGO_MIN_MARGIN);
        assert_eq!(with_logo.error_correction, ErrorCorrection::Q);

        style = style.with_logo_scale(LogoScale::Large);
        assert_eq!(style.effective().error_correction, ErrorCorrection::H);
    }

    #[test]
    fn test_clamps() {
        let style = StyleConfig {
            size: 10,
            margin: 100,
            logo_size: 0.9,
            ..StyleConfig::default()
        };
        let effective = style.effective();
        assert_eq!(effective.size, MIN_OUTPUT_SIZE);
        assert_eq!(effective.margin, MAX_MARGIN);
        assert_eq!(effective.logo_fraction, MAX_LOGO_FRACTION);
    }

    #[test]
    fn test_undecodable_logo_changes_nothing() {
        let style = StyleConfig {
            margin: 1,
            error_correction: ErrorCorrection::L,
            logo: Some(ImageSource::new(vec![0u8; 4])),
            mark: Some(ImageSource::new(Vec::new())),
            ..StyleConfig::default()
        };
        let effective = style.effective();
        assert_eq!(effective.margin, 1);
        assert_eq!(effective.error_correction, ErrorCorrection::L);
    }

    #[test]
    fn test_mark_requires_quartile() {
        let style = StyleConfig {
            error_correction: ErrorCorrection::M,
            mark: Some(ImageSource::new(png(4, 4))),
            ..StyleConfig::default()
        };
        let effective = style.effective();
        assert_eq!(effective.error_correction, ErrorCorrection::Q);
        assert_eq!(effective.margin, 2);
    }

    #[test]
    fn test_image_decoded_once_for_all_clones() {
        let source = ImageSource::new(png(6, 3));
        let copy = source.clone();
        let first = source.image().unwrap() as *const RgbaImage;
        let second = copy.image().unwrap() as *const RgbaImage;
        assert_eq!(first, second);
        assert_eq!(copy.image().unwrap().dimensions(), (6, 3));
        assert_eq!(source, ImageSource::new(source.bytes().to_vec()));

        let broken = ImageSource::new(vec![9u8, 9, 9]);
        assert!(matches!(broken.image(), Err(LogoError::Decode(_))));
        assert!(!broken.is_decodable());
    }

    #[test]
    fn test_quality_presets() {
        let style = StyleConfig::default().with_quality(Quality::High);
        assert_eq!(style.effective().size, 2048);
        assert_eq!(StyleConfig::default().with_quality(Quality::Low).effective().size, 512);

        let style = StyleConfig::from_json(r#"{"size": 300, "quality": "ultra"}"#).unwrap();
        assert_eq!(style.quality, Some(Quality::Medium));
        assert_eq!(style.effective().size, 1024);
        assert_eq!(StyleConfig::from_json(r#"{"size": 300}"#).unwrap().effective().size, 300);
    }

    #[test]
    fn test_card_from_json() {
        let style = StyleConfig::from_json(
            r##"{"card": {"corners": "pill", "borderColor": "bad", "borderWidth": 4, "borderLine": "dashed", "caption": true}}"##,
        )
        .unwrap();
        let card = style.card.unwrap();
        assert_eq!(card.corners, CardCorners::Pill);
        assert_eq!(card.border_color, defaults::CARD_BORDER);
        assert_eq!(card.border_width, 4.0);
        assert_eq!(card.border_line, BorderLine::Dashed);
        assert!(card.caption);
        assert_eq!(card.bar_text_color, Color::rgb(0x11, 0x18, 0x27));
        assert!(StyleConfig::default().card.is_none());
    }
}
