//! Наложение логотипа и фирменной метки
//!
//! Под логотипом можно очистить «тихую» подложку цветом фона: коррекция ошибок
//! переносит чистую дыру в матрице гораздо лучше, чем наполовину перекрытые модули.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::geometry::RenderPlan;
use crate::raster::{Shape, Surface};
use crate::style::LogoShape;

/// Радиус скругления подложки относительно размера логотипа
pub const LOGO_RADIUS_RATIO: f32 = 0.2;

/// Максимальный размер метки и отступ от угла, доли от стороны символа
pub const MARK_MAX_RATIO: f32 = 0.16;
pub const MARK_PADDING_RATIO: f32 = 0.04;

/// Ошибки загрузки изображения логотипа
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogoError {
    #[error("Logo image is empty")]
    Empty,

    #[error("Failed to decode logo: {0}")]
    Decode(String),
}

/// Место логотипа на холсте
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoPlacement {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    /// Контур подложки и обрезки
    pub clip: Shape,
}

/// Декодирование PNG/JPEG из байтов
pub fn decode(bytes: &[u8]) -> Result<RgbaImage, LogoError> {
    if bytes.is_empty() {
        return Err(LogoError::Empty);
    }
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| LogoError::Decode(e.to_string()))
}

/// Логотип размером `fraction` от стороны символа, по центру символа
pub fn placement(plan: &RenderPlan, fraction: f32, shape: LogoShape) -> LogoPlacement {
    let size = fraction * plan.symbol_size;
    let (cx, cy) = plan.symbol_center();
    let (x, y) = (cx - size / 2.0, cy - size / 2.0);

    let clip = match shape {
        LogoShape::Rounded => Shape::rounded(x, y, size, size, size * LOGO_RADIUS_RATIO),
        LogoShape::Circle => Shape::Circle { cx, cy, radius: size / 2.0 },
    };

    LogoPlacement { x, y, size, clip }
}

/// Наложение логотипа. При `quiet_patch = Some(color)` область под логотипом сначала
/// полностью замещается этим цветом.
pub fn apply_logo(
    surface: &mut Surface,
    logo: &RgbaImage,
    placement: &LogoPlacement,
    quiet_patch: Option<Rgba<u8>>,
) {
    if let Some(color) = quiet_patch {
        surface.erase(&placement.clip, color);
    }

    let fitted = fit_inside(logo, placement.size, placement.size);
    let left = (placement.x + (placement.size - fitted.width() as f32) / 2.0).round() as i64;
    let top = (placement.y + (placement.size - fitted.height() as f32) / 2.0).round() as i64;
    surface.draw_image_clipped(&fitted, left, top, &placement.clip);
}

/// Фирменная метка в правом нижнем углу символа, с сохранением пропорций.
/// Метка заходит на угол матрицы, поэтому под ней, как и под логотипом, можно
/// очистить подложку.
pub fn apply_mark(surface: &mut Surface, mark: &RgbaImage, plan: &RenderPlan, quiet_patch: Option<Rgba<u8>>) {
    let max_side = plan.symbol_size * MARK_MAX_RATIO;
    let padding = plan.symbol_size * MARK_PADDING_RATIO;
    let fitted = fit_inside(mark, max_side, max_side);

    let left = (plan.symbol_size - fitted.width() as f32 - padding).round() as i64;
    let top = (plan.symbol_size - fitted.height() as f32 - padding).round() as i64;
    if let Some(color) = quiet_patch {
        let area = Shape::Rect {
            x: left as f32,
            y: top as f32,
            w: fitted.width() as f32,
            h: fitted.height() as f32,
        };
        surface.erase(&area, color);
    }
    surface.draw_image(&fitted, left, top);
}

/// Масштабирование в прямоугольник `max_w × max_h` с сохранением пропорций
fn fit_inside(img: &RgbaImage, max_w: f32, max_h: f32) -> RgbaImage {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return img.clone();
    }
    let scale = (max_w / w as f32).min(max_h / h as f32);
    let new_w = ((w as f32 * scale).round() as u32).max(1);
    let new_h = ((h as f32 * scale).round() as u32).max(1);
    if (new_w, new_h) == (w, h) {
        return img.clone();
    }
    imageops::resize(img, new_w, new_h, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::plan;
    use crate::paint::Paint;
    use std::io::Cursor;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png).unwrap();
        buf
    }

    fn black_surface(size: u32) -> Surface {
        let mut surface = Surface::new(size, size, WHITE);
        let full = Shape::Rect { x: 0.0, y: 0.0, w: size as f32, h: size as f32 };
        surface.fill(&full, &Paint::Solid(BLACK));
        surface
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(decode(&[]), Err(LogoError::Empty));
        assert!(matches!(decode(&[1u8, 2, 3]), Err(LogoError::Decode(_))));

        let img = RgbaImage::from_pixel(8, 4, RED);
        let decoded = decode(&png_bytes(&img)).unwrap();
        assert_eq!(decoded.dimensions(), (8, 4));
    }

    #[test]
    fn test_placement_is_centered() {
        let p = plan(25, 4, 330, false);
        let place = placement(&p, 0.2, LogoShape::Rounded);
        assert!((place.size - 66.0).abs() < 1e-3);
        assert!((place.x - 132.0).abs() < 1e-3);
        assert!((place.y - 132.0).abs() < 1e-3);
    }

    #[test]
    fn test_quiet_patch_hides_modules() {
        let p = plan(21, 4, 290, false);
        let mut surface = black_surface(290);
        let place = placement(&p, 0.22, LogoShape::Rounded);
        let transparent_logo = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 0]));
        apply_logo(&mut surface, &transparent_logo, &place, Some(WHITE));

        for (x, y, px) in surface.image().enumerate_pixels() {
            if place.clip.signed_distance(x as f32 + 0.5, y as f32 + 0.5) < -1.0 {
                assert_eq!(*px, WHITE, "module visible at ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_logo_without_patch_keeps_modules_under_transparency() {
        let p = plan(21, 4, 290, false);
        let mut surface = black_surface(290);
        let place = placement(&p, 0.22, LogoShape::Circle);
        let transparent_logo = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 0]));
        apply_logo(&mut surface, &transparent_logo, &place, None);
        assert_eq!(*surface.image().get_pixel(145, 145), BLACK);
    }

    #[test]
    fn test_logo_aspect_preserved() {
        let img = RgbaImage::from_pixel(40, 20, RED);
        let fitted = fit_inside(&img, 10.0, 10.0);
        assert_eq!(fitted.dimensions(), (10, 5));
    }

    #[test]
    fn test_mark_bottom_right() {
        let p = plan(21, 2, 250, false);
        let mut surface = Surface::new(250, 250, WHITE);
        let mark = RgbaImage::from_pixel(10, 10, RED);
        apply_mark(&mut surface, &mark, &p, None);
        // 40px mark, 10px padding
        assert_eq!(*surface.image().get_pixel(245, 245), WHITE);
        assert_eq!(*surface.image().get_pixel(239, 239), RED);
        assert_eq!(*surface.image().get_pixel(200, 200), RED);
        assert_eq!(*surface.image().get_pixel(199, 199), WHITE);
    }

    #[test]
    fn test_mark_patch_hides_modules() {
        let p = plan(21, 2, 250, false);
        let mut surface = black_surface(250);
        let hollow = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 0]));
        apply_mark(&mut surface, &hollow, &p, Some(WHITE));
        assert_eq!(*surface.image().get_pixel(220, 220), WHITE);
        assert_eq!(*surface.image().get_pixel(195, 195), BLACK);

        let mut unpatched = black_surface(250);
        apply_mark(&mut unpatched, &hollow, &p, None);
        assert_eq!(*unpatched.image().get_pixel(220, 220), BLACK);
    }
}
