//! Отрисовка модулей матрицы
//!
//! Модули «глаз» (finder patterns) и модули тела рисуются независимо выбранными формами.

use crate::geometry::RenderPlan;
use crate::matrix::ModuleGrid;
use crate::paint::Paint;
use crate::raster::{Shape, Surface};
use crate::style::ModuleShape;

/// Радиус скругления модуля относительно размера клетки
pub const ROUNDED_RADIUS_RATIO: f32 = 0.4;

/// Радиус точки относительно размера клетки
pub const DOT_RADIUS_RATIO: f32 = 0.48;

/// Формы модулей для двух классов
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleStyle {
    pub body: ModuleShape,
    pub eye: ModuleShape,
}

/// Фигура одного модуля с левым верхним углом (x, y)
pub fn module_shape(shape: ModuleShape, x: f32, y: f32, cell: f32) -> Shape {
    match shape {
        ModuleShape::Square => Shape::Rect { x, y, w: cell, h: cell },
        ModuleShape::Rounded => Shape::rounded(x, y, cell, cell, cell * ROUNDED_RADIUS_RATIO),
        ModuleShape::Dots => Shape::Circle {
            cx: x + cell / 2.0,
            cy: y + cell / 2.0,
            radius: cell * DOT_RADIUS_RATIO,
        },
    }
}

/// Рисование всех тёмных модулей; возвращает число нарисованных модулей
pub fn render_modules(
    surface: &mut Surface,
    grid: &ModuleGrid,
    plan: &RenderPlan,
    style: ModuleStyle,
    paint: &Paint,
) -> usize {
    let n = grid.size();
    let mut painted = 0;

    for row in 0..n {
        for col in 0..n {
            if !grid.is_dark(row, col) {
                continue;
            }
            let (x, y) = plan.module_origin(row, col);
            let shape = if plan.is_eye(row, col) { style.eye } else { style.body };
            surface.fill(&module_shape(shape, x, y, plan.cell_size), paint);
            painted += 1;
        }
    }

    log::debug!("Painted {} of {}x{} modules", painted, n, n);
    painted
}
