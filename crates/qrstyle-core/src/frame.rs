//! Рамка и подпись
//!
//! Обводка рисуется снаружи матрицы (с отступом в тихую зону), подпись-«пилюля»
//! живёт только в зарезервированной полосе под символом и никогда не заходит в
//! сканируемую область. Подписи по умолчанию набираются встроенным шрифтом
//! DejaVu Sans Bold (`assets/fonts`, лицензия Bitstream Vera).

use ab_glyph::{FontArc, PxScale};
use image::Rgba;
use imageproc::drawing::{draw_text_mut, text_size};

use crate::geometry::RenderPlan;
use crate::paint::Paint;
use crate::raster::{Shape, Surface};

/// Отступ обводки от матрицы и толщина линии, в долях клетки
pub const FRAME_PADDING_RATIO: f32 = 0.6;
pub const FRAME_LINE_RATIO: f32 = 0.4;

/// Параметры подписи, в долях клетки
pub const CAPTION_FONT_RATIO: f32 = 1.2;
pub const CAPTION_PADDING_X_RATIO: f32 = 1.2;
pub const CAPTION_HEIGHT_RATIO: f32 = 2.4;
pub const CAPTION_GAP_RATIO: f32 = 0.8;

/// Оценка ширины символа без шрифта, в долях кегля
const ESTIMATED_GLYPH_WIDTH: f32 = 0.6;

static BUNDLED_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf");

/// Встроенный шрифт подписей
pub fn bundled_font() -> Option<FontArc> {
    match FontArc::try_from_slice(BUNDLED_FONT) {
        Ok(font) => Some(font),
        Err(e) => {
            log::error!("Bundled caption font is unreadable: {}", e);
            None
        }
    }
}

/// Текст по центру прямоугольника (`x`, `y`, `width`, `height`). Если строка шире
/// `max_width`, кегль уменьшается до нужной ширины.
pub fn draw_centered_text(
    surface: &mut Surface,
    font: &FontArc,
    text: &str,
    font_px: f32,
    max_width: f32,
    rect: (f32, f32, f32, f32),
    color: Rgba<u8>,
) {
    let (x, y, width, height) = rect;
    let mut scale = PxScale::from(font_px);
    let (w, _) = text_size(scale, font, text);
    if w as f32 > max_width && w > 0 {
        scale = PxScale::from(font_px * max_width / w as f32);
    }
    let (w, h) = text_size(scale, font, text);
    let left = (x + (width - w as f32) / 2.0).round() as i32;
    let top = (y + (height - h as f32) / 2.0).round() as i32;
    draw_text_mut(surface.image_mut(), color, left, top, scale, font, text);
}

/// Положение пилюли подписи
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptionLayout {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub font_px: f32,
}

impl CaptionLayout {
    pub fn shape(&self) -> Shape {
        Shape::rounded(self.x, self.y, self.width, self.height, self.height / 2.0)
    }
}

/// Скруглённая обводка вокруг матрицы
pub fn border_shape(plan: &RenderPlan) -> Shape {
    let padding = plan.cell_size * FRAME_PADDING_RATIO;
    let extent = plan.matrix_extent() + padding * 2.0;
    Shape::rounded(plan.offset_x - padding, plan.offset_y - padding, extent, extent, padding)
}

pub fn draw_border(surface: &mut Surface, plan: &RenderPlan, paint: &Paint) {
    surface.stroke(&border_shape(plan), plan.cell_size * FRAME_LINE_RATIO, paint);
}

/// Раскладка пилюли для текста шириной `text_width` px
pub fn caption_layout(plan: &RenderPlan, text_width: f32) -> CaptionLayout {
    let cell = plan.cell_size;
    let width = (text_width + cell * CAPTION_PADDING_X_RATIO * 2.0).min(plan.symbol_size);
    let height = cell * CAPTION_HEIGHT_RATIO;
    let top = plan.label.map(|band| band.top).unwrap_or(plan.symbol_size);
    CaptionLayout {
        x: plan.symbol_size / 2.0 - width / 2.0,
        y: top + cell * CAPTION_GAP_RATIO,
        width,
        height,
        font_px: cell * CAPTION_FONT_RATIO,
    }
}

/// Подпись в полосе под символом. Без шрифта рисуется только пилюля.
pub fn draw_caption(
    surface: &mut Surface,
    plan: &RenderPlan,
    text: &str,
    font: Option<&FontArc>,
    pill: Rgba<u8>,
    text_color: Rgba<u8>,
) -> Option<CaptionLayout> {
    if plan.label.is_none() {
        log::debug!("Caption requested without a reserved label band, skipping");
        return None;
    }

    let font_px = plan.cell_size * CAPTION_FONT_RATIO;
    let scale = PxScale::from(font_px);
    let text_width = match font {
        Some(font) => text_size(scale, font, text).0 as f32,
        None => text.chars().count() as f32 * font_px * ESTIMATED_GLYPH_WIDTH,
    };

    let layout = caption_layout(plan, text_width);
    surface.fill(&layout.shape(), &Paint::Solid(pill));

    match font {
        Some(font) => draw_centered_text(
            surface,
            font,
            text,
            font_px,
            layout.width,
            (layout.x, layout.y, layout.width, layout.height),
            text_color,
        ),
        None => log::warn!("No caption font loaded, drawing the caption pill without text"),
    }

    Some(layout)
}
