//! Карточка вокруг готового символа
//!
//! Размеры карточки заданы в опорных единицах (1/512 стороны символа), поэтому
//! при любом пресете качества она выглядит одинаково. Символ копируется внутрь
//! без изменений; обводка толще поля не бывает и на модули не заходит.

use ab_glyph::FontArc;
use image::{Rgba, RgbaImage};

use crate::frame;
use crate::paint::Paint;
use crate::raster::{Shape, Surface};
use crate::style::{BorderLine, CardStyle};

/// Сторона символа, к которой привязаны опорные единицы
pub const REFERENCE_SIDE: f32 = 512.0;

/// Поле вокруг символа и высота полосы подписи, доли стороны символа
pub const PADDING_RATIO: f32 = 1.0 / 16.0;
pub const BAR_RATIO: f32 = 1.0 / 8.0;

/// Штрих и промежуток пунктира, опорные единицы
pub const DASH: f32 = 12.0;
pub const DASH_GAP: f32 = 8.0;

pub const BAR_RADIUS: f32 = 16.0;
pub const BAR_FONT: f32 = 18.0;
/// Суммарный горизонтальный отступ текста внутри плашки
pub const BAR_TEXT_INSET: f32 = 24.0;

/// Предельный радиус скругления в полях: при нём угол символа ещё внутри карточки
pub const MAX_RADIUS_PADDINGS: f32 = 3.0;

/// Прямоугольник в пикселях
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Раскладка карточки
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardLayout {
    pub width: u32,
    pub height: u32,
    /// Отступ символа от края карточки
    pub padding: u32,
    /// Пикселей в опорной единице
    pub unit: f32,
    pub radius: f32,
    pub border_width: f32,
    pub bar: Option<Rect>,
}

impl CardLayout {
    /// Контур карточки
    pub fn outline(&self) -> Shape {
        Shape::rounded(0.0, 0.0, self.width as f32, self.height as f32, self.radius)
    }

    /// Контур, по которому идёт середина обводки
    pub fn border_path(&self) -> Shape {
        let inset = self.border_width / 2.0;
        Shape::rounded(
            inset,
            inset,
            self.width as f32 - self.border_width,
            self.height as f32 - self.border_width,
            (self.radius - inset).max(0.0),
        )
    }
}

/// Раскладка карточки для изображения `inner_width × inner_height`, где символ
/// занимает сторону `symbol_side`
pub fn layout(symbol_side: f32, inner_width: u32, inner_height: u32, card: &CardStyle) -> CardLayout {
    let unit = symbol_side / REFERENCE_SIDE;
    let padding = (symbol_side * PADDING_RATIO).round() as u32;
    let bar_height = if card.caption {
        (symbol_side * BAR_RATIO).round() as u32
    } else {
        0
    };

    let width = inner_width + 2 * padding;
    let height = inner_height + 2 * padding + bar_height;
    let radius = (card.corners.radius() * unit)
        .min(width as f32 / 2.0)
        .min(height as f32 / 2.0)
        .min(padding as f32 * MAX_RADIUS_PADDINGS);
    let border_width = if card.border_width.is_finite() {
        (card.border_width.max(0.0) * unit).min(padding as f32)
    } else {
        0.0
    };

    let bar = card.caption.then(|| {
        let gap = padding as f32 / 2.0;
        Rect {
            x: padding as f32,
            y: (padding + inner_height) as f32 + gap,
            width: inner_width as f32,
            height: bar_height as f32 - gap,
        }
    });

    CardLayout {
        width,
        height,
        padding,
        unit,
        radius,
        border_width,
        bar,
    }
}

/// Помещение изображения символа в карточку
pub fn wrap(
    inner: &RgbaImage,
    symbol_side: f32,
    card: &CardStyle,
    caption: &str,
    font: Option<&FontArc>,
) -> (RgbaImage, CardLayout) {
    let layout = layout(symbol_side, inner.width(), inner.height(), card);
    log::debug!(
        "Card {}x{}: padding {} px, radius {:.1} px, border {:.1} px",
        layout.width,
        layout.height,
        layout.padding,
        layout.radius,
        layout.border_width
    );

    let mut surface = Surface::new(layout.width, layout.height, Rgba([0, 0, 0, 0]));
    let outline = layout.outline();
    surface.fill(&outline, &Paint::Solid(card.background.to_rgba()));

    if layout.border_width > 0.0 {
        let paint = Paint::Solid(card.border_color.to_rgba());
        let path = layout.border_path();
        match card.border_line {
            BorderLine::Solid => surface.stroke(&path, layout.border_width, &paint),
            BorderLine::Dashed => surface.stroke_dashed(
                &path,
                layout.border_width,
                DASH * layout.unit,
                DASH_GAP * layout.unit,
                &paint,
            ),
        }
    }

    let offset = layout.padding as i64;
    surface.draw_image_clipped(inner, offset, offset, &outline);

    if let Some(bar) = layout.bar {
        let plate = Shape::rounded(bar.x, bar.y, bar.width, bar.height, BAR_RADIUS * layout.unit);
        surface.fill(&plate, &Paint::Solid(card.bar_background.to_rgba()));
        match font {
            Some(font) => frame::draw_centered_text(
                &mut surface,
                font,
                caption,
                BAR_FONT * layout.unit,
                bar.width - BAR_TEXT_INSET * layout.unit,
                (bar.x, bar.y, bar.width, bar.height),
                card.bar_text_color.to_rgba(),
            ),
            None => log::warn!("No caption font loaded, drawing the card bar without text"),
        }
    }

    (surface.into_image(), layout)
}
