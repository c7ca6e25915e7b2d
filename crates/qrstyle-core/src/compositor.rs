//! Сборка итогового изображения
//!
//! Чистая функция `(ModuleGrid, StyleConfig) -> CompositedImage`: на каждый рендер
//! выделяется новая поверхность, шаги выполняются в фиксированном порядке
//! (фон, рамка, модули, логотип, метка, подпись, карточка, PNG).

use std::io::Cursor;

use ab_glyph::FontArc;
use image::{ImageFormat, RgbaImage};
use thiserror::Error;

use crate::card::{self, CardLayout};
use crate::frame;
use crate::geometry::{self, RenderPlan};
use crate::logo;
use crate::matrix::{EncodeError, MatrixEncoder, ModuleGrid};
use crate::paint;
use crate::raster::Surface;
use crate::render::{self, ModuleStyle};
use crate::style::StyleConfig;

/// Ошибки сборки изображения
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComposeError {
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("PNG encoding failed: {0}")]
    PngEncoding(String),

    #[error("Invalid canvas {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },

    #[error("Invalid font: {0}")]
    Font(String),
}

/// Готовое изображение и его PNG-представление
#[derive(Debug, Clone, PartialEq)]
pub struct CompositedImage {
    image: RgbaImage,
    png: Vec<u8>,
    plan: RenderPlan,
    card: Option<CardLayout>,
}

impl CompositedImage {
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn png(&self) -> &[u8] {
        &self.png
    }

    /// Раскладка символа; координаты отсчитываются от [`Self::symbol_origin`]
    pub fn plan(&self) -> &RenderPlan {
        &self.plan
    }

    pub fn card(&self) -> Option<&CardLayout> {
        self.card.as_ref()
    }

    /// Левый верхний угол символа на итоговом изображении
    pub fn symbol_origin(&self) -> (u32, u32) {
        self.card.map(|c| (c.padding, c.padding)).unwrap_or((0, 0))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_png(self) -> Vec<u8> {
        self.png
    }
}

/// Компоновщик; держит шрифт подписи между рендерами
#[derive(Clone)]
pub struct Compositor {
    font: Option<FontArc>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    /// Компоновщик со встроенным шрифтом подписи
    pub fn new() -> Self {
        Self {
            font: frame::bundled_font(),
        }
    }

    /// Компоновщик со своим шрифтом подписи (TrueType/OpenType)
    pub fn with_font(bytes: Vec<u8>) -> Result<Self, ComposeError> {
        let font = FontArc::try_from_vec(bytes).map_err(|e| ComposeError::Font(e.to_string()))?;
        Ok(Self { font: Some(font) })
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Полный цикл: кодирование payload и сборка
    pub fn render(
        &self,
        encoder: &dyn MatrixEncoder,
        payload: &str,
        style: &StyleConfig,
    ) -> Result<CompositedImage, ComposeError> {
        let level = style.effective().error_correction;
        log::debug!("Encoding {} bytes at level {:?}", payload.len(), level);
        let grid = encoder.encode(payload, level)?;
        self.compose(&grid, style)
    }

    /// Сборка изображения по готовой сетке
    pub fn compose(&self, grid: &ModuleGrid, style: &StyleConfig) -> Result<CompositedImage, ComposeError> {
        let effective = style.effective();
        let plan = geometry::plan(grid.size(), effective.margin, effective.size, style.frame.has_caption());
        if plan.canvas_width == 0 || plan.canvas_height == 0 || plan.cell_size <= 0.0 {
            return Err(ComposeError::InvalidCanvas {
                width: plan.canvas_width,
                height: plan.canvas_height,
            });
        }

        log::info!(
            "Composing v{} symbol: {}x{} px, cell {:.2} px",
            grid.version(),
            plan.canvas_width,
            plan.canvas_height,
            plan.cell_size
        );

        let mut surface = Surface::new(plan.canvas_width, plan.canvas_height, style.background.to_rgba());
        let fill = paint::resolve(style, plan.canvas_width, plan.canvas_height);

        if style.frame.has_border() {
            frame::draw_border(&mut surface, &plan, &fill);
        }

        let shapes = ModuleStyle {
            body: style.module_shape,
            eye: style.eye_shape,
        };
        render::render_modules(&mut surface, grid, &plan, shapes, &fill);

        let patch = style.logo_clear_background.then(|| style.background.to_rgba());
        if let Some(source) = &style.logo {
            match source.image() {
                Ok(image) => {
                    let placement = logo::placement(&plan, effective.logo_fraction, style.logo_shape);
                    logo::apply_logo(&mut surface, image, &placement, patch);
                }
                Err(e) => log::warn!("Skipping logo: {}", e),
            }
        }

        if let Some(source) = &style.mark {
            match source.image() {
                Ok(image) => logo::apply_mark(&mut surface, image, &plan, patch),
                Err(e) => log::warn!("Skipping mark: {}", e),
            }
        }

        if style.frame.has_caption() {
            frame::draw_caption(
                &mut surface,
                &plan,
                style.caption(),
                self.font.as_ref(),
                style.label_background.to_rgba(),
                style.label_text_color.to_rgba(),
            );
        }

        let mut image = surface.into_image();
        let mut card_layout = None;
        if let Some(card_style) = &style.card {
            let (wrapped, layout) =
                card::wrap(&image, plan.symbol_size, card_style, style.caption(), self.font.as_ref());
            image = wrapped;
            card_layout = Some(layout);
        }

        let png = encode_png(&image)?;
        log::debug!("PNG encoded: {} bytes", png.len());

        Ok(CompositedImage {
            image,
            png,
            plan,
            card: card_layout,
        })
    }
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ComposeError> {
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ComposeError::PngEncoding(e.to_string()))?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{ErrorCorrection, QrcodeEncoder};
    use crate::style::{CardStyle, Color, FrameStyle, ImageSource, ModuleShape, Quality};
    use image::Rgba;

    fn grid(payload: &str) -> ModuleGrid {
        QrcodeEncoder.encode(payload, ErrorCorrection::M).unwrap()
    }

    #[test]
    fn test_compose_is_deterministic() {
        let style = StyleConfig {
            size: 300,
            module_shape: ModuleShape::Dots,
            eye_shape: ModuleShape::Rounded,
            gradient_enabled: true,
            gradient_from: Color::rgb(200, 0, 80),
            gradient_to: Color::rgb(0, 40, 200),
            frame: FrameStyle::Label,
            ..StyleConfig::default()
        };
        let compositor = Compositor::new();
        let g = grid("https://example.com");
        let first = compositor.compose(&g, &style).unwrap();
        let second = compositor.compose(&g, &style).unwrap();
        assert_eq!(first.image(), second.image());
        assert_eq!(first.png(), second.png());
    }

    #[test]
    fn test_png_is_decodable() {
        let style = StyleConfig { size: 200, ..StyleConfig::default() };
        let composed = Compositor::new().compose(&grid("hello"), &style).unwrap();
        let decoded = image::load_from_memory(composed.png()).unwrap().to_rgba8();
        assert_eq!(&decoded, composed.image());
    }

    #[test]
    fn test_label_is_additive() {
        let g = grid("https://example.com/label");
        let plain = StyleConfig { size: 400, margin: 2, ..StyleConfig::default() };
        let labeled = StyleConfig { frame: FrameStyle::Caption, ..plain.clone() };

        let compositor = Compositor::new();
        let a = compositor.compose(&g, &plain).unwrap();
        let b = compositor.compose(&g, &labeled).unwrap();

        assert_eq!(a.plan().cell_size, b.plan().cell_size);
        assert_eq!(a.width(), b.width());
        assert!(b.height() > a.height());
        // the symbol area is unchanged
        let symbol = image::imageops::crop_imm(b.image(), 0, 0, a.width(), a.height()).to_image();
        assert_eq!(&symbol, a.image());
    }

    #[test]
    fn test_gradient_shared_by_eye_and_body() {
        let style = StyleConfig {
            size: 290,
            margin: 4,
            gradient_enabled: true,
            gradient_from: Color::rgb(255, 0, 0),
            gradient_to: Color::rgb(0, 0, 255),
            ..StyleConfig::default()
        };
        let g = grid("gradient");
        let composed = Compositor::new().compose(&g, &style).unwrap();
        let fill = paint::resolve(&style, composed.width(), composed.height());
        let plan = *composed.plan();

        let mut checked = (0, 0);
        for row in 0..g.size() {
            for col in 0..g.size() {
                if !g.is_dark(row, col) {
                    continue;
                }
                let (x, y) = plan.module_origin(row, col);
                let (px, py) = ((x + plan.cell_size / 2.0) as u32, (y + plan.cell_size / 2.0) as u32);
                let expected = fill.sample(px as f32 + 0.5, py as f32 + 0.5);
                assert_eq!(*composed.image().get_pixel(px, py), expected);
                if plan.is_eye(row, col) {
                    checked.0 += 1;
                } else {
                    checked.1 += 1;
                }
            }
        }
        assert!(checked.0 > 0 && checked.1 > 0);
    }

    #[test]
    fn test_bad_logo_is_skipped() {
        let style = StyleConfig {
            size: 256,
            logo: Some(ImageSource::new(vec![0u8, 1, 2, 3])),
            ..StyleConfig::default()
        };
        let composed = Compositor::new().compose(&grid("logo"), &style);
        assert!(composed.is_ok());
    }

    #[test]
    fn test_logo_raises_error_correction() {
        let mut logo = Vec::new();
        RgbaImage::from_pixel(16, 16, Rgba([20, 20, 200, 255]))
            .write_to(&mut Cursor::new(&mut logo), ImageFormat::Png)
            .unwrap();
        let style = StyleConfig {
            size: 256,
            error_correction: ErrorCorrection::L,
            logo: Some(ImageSource::new(logo)),
            ..StyleConfig::default()
        };
        let payload = "https://example.com/logo-raises-the-level";
        let composed = Compositor::new().render(&QrcodeEncoder, payload, &style).unwrap();
        let at_h = QrcodeEncoder.encode(payload, ErrorCorrection::H).unwrap();
        assert_eq!(composed.plan().module_count, at_h.size());

        // a logo that cannot be decoded is not drawn and keeps the requested level
        let broken = StyleConfig {
            logo: Some(ImageSource::new(vec![7u8; 12])),
            ..style
        };
        let composed = Compositor::new().render(&QrcodeEncoder, payload, &broken).unwrap();
        let at_l = QrcodeEncoder.encode(payload, ErrorCorrection::L).unwrap();
        assert_eq!(composed.plan().module_count, at_l.size());
        assert_eq!(composed.plan().margin, 2);
    }

    #[test]
    fn test_capacity_error_propagates() {
        let payload = "x".repeat(3000);
        let style = StyleConfig { error_correction: ErrorCorrection::H, ..StyleConfig::default() };
        let err = Compositor::new().render(&QrcodeEncoder, &payload, &style).unwrap_err();
        assert!(matches!(err, ComposeError::Encode(EncodeError::CapacityExceeded { .. })));
    }

    #[test]
    fn test_invalid_font_rejected() {
        assert!(matches!(
            Compositor::with_font(vec![0u8; 16]),
            Err(ComposeError::Font(_))
        ));
    }

    #[test]
    fn test_background_fills_quiet_zone() {
        let style = StyleConfig {
            size: 250,
            background: Color::rgb(250, 240, 230),
            ..StyleConfig::default()
        };
        let composed = Compositor::new().compose(&grid("bg"), &style).unwrap();
        assert_eq!(*composed.image().get_pixel(1, 1), Rgba([250, 240, 230, 255]));
    }

    #[test]
    fn test_default_compositor_draws_caption_text() {
        let style = StyleConfig {
            size: 400,
            frame: FrameStyle::Label,
            frame_text: String::new(),
            label_text_color: Color::rgb(255, 200, 0),
            ..StyleConfig::default()
        };
        let compositor = Compositor::new();
        assert!(compositor.has_font());
        let composed = compositor.render(&QrcodeEncoder, "https://example.com/caption", &style).unwrap();
        let band = composed.plan().label.unwrap();

        let near_text = |px: &Rgba<u8>| {
            let [r, g, b, _] = px.0;
            r > 235 && (180..=220).contains(&g) && b < 40
        };
        let text_pixels = composed
            .image()
            .enumerate_pixels()
            .filter(|(_, y, _)| *y as f32 >= band.top)
            .filter(|(_, _, px)| near_text(px))
            .count();
        assert!(text_pixels > 20, "caption has {} text pixels", text_pixels);
    }

    #[test]
    fn test_card_wraps_symbol() {
        let plain = StyleConfig::default().with_quality(Quality::Low);
        let carded = StyleConfig {
            card: Some(CardStyle { caption: true, ..CardStyle::default() }),
            ..plain.clone()
        };
        let g = grid("https://example.com/card");
        let compositor = Compositor::new();
        let a = compositor.compose(&g, &plain).unwrap();
        let b = compositor.compose(&g, &carded).unwrap();

        assert_eq!((a.width(), a.height()), (512, 512));
        assert_eq!((b.width(), b.height()), (576, 640));
        assert_eq!(b.symbol_origin(), (32, 32));
        assert!(a.card().is_none() && a.symbol_origin() == (0, 0));

        let symbol = image::imageops::crop_imm(b.image(), 32, 32, 512, 512).to_image();
        assert_eq!(&symbol, a.image());
        let decoded = image::load_from_memory(b.png()).unwrap().to_rgba8();
        assert_eq!(&decoded, b.image());
    }
}
