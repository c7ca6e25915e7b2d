//! QR Style Core - Модуль генерации стилизованных QR-кодов
//!
//! Библиотека превращает введённые пользователем данные и настройки стиля в
//! сканируемое PNG-изображение:
//! - Построение payload по типу контента (URL, Wi-Fi, email, SMS, соцсети, ...)
//! - Формы модулей и «глаз», градиентная заливка
//! - Логотип с чистой подложкой, фирменная метка, рамка и подпись
//! - Карточка вокруг символа и пресеты качества выгрузки
//! - Реактивный конвейер с задержкой (debounce) и отбрасыванием устаревших рендеров
//! - Проверка сканируемости через rqrr

pub mod content;
pub mod matrix;
pub mod style;
pub mod geometry;
pub mod paint;
pub mod raster;
pub mod render;
pub mod logo;
pub mod frame;
pub mod card;
pub mod compositor;
pub mod pipeline;
pub mod verify;

pub use content::{EncodableContent, SocialNetwork, WifiSecurity};
pub use matrix::{EncodeError, ErrorCorrection, MatrixEncoder, ModuleGrid, QrcodeEncoder};
pub use style::{
    BorderLine, CardCorners, CardStyle, Color, EffectiveStyle, FrameStyle, ImageSource, LogoScale, LogoShape,
    ModuleShape, Quality, StyleConfig,
};
pub use geometry::{is_eye_module, plan, RenderPlan};
pub use paint::Paint;
pub use logo::LogoError;
pub use card::CardLayout;
pub use compositor::{ComposeError, CompositedImage, Compositor};
pub use pipeline::{
    Download, ImageHandle, Millis, PipelineConfig, PipelineController, PipelineEffect, PipelineError,
    PipelineEvent, PipelineState,
};
pub use verify::{ScanReport, VerifyError};

use thiserror::Error;

/// Основные ошибки модуля
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StudioError {
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Compose error: {0}")]
    Compose(#[from] ComposeError),

    #[error("Logo error: {0}")]
    Logo(#[from] LogoError),

    #[error("Verify error: {0}")]
    Verify(#[from] VerifyError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Синхронный драйвер конвейера: рендеры выполняются сразу, как только
/// контроллер их запрашивает
pub struct QrStudio {
    controller: PipelineController,
    compositor: Compositor,
    encoder: Box<dyn MatrixEncoder>,
}

impl Default for QrStudio {
    fn default() -> Self {
        Self::new()
    }
}

impl QrStudio {
    /// Создание с настройками по умолчанию
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self::with_encoder(config, Box::new(QrcodeEncoder))
    }

    /// Создание с пользовательским матричным кодировщиком
    pub fn with_encoder(config: PipelineConfig, encoder: Box<dyn MatrixEncoder>) -> Self {
        Self {
            controller: PipelineController::new(config),
            compositor: Compositor::new(),
            encoder,
        }
    }

    /// Замена встроенного шрифта подписи
    pub fn set_font(&mut self, bytes: Vec<u8>) -> Result<(), StudioError> {
        self.compositor = Compositor::with_font(bytes)?;
        Ok(())
    }

    /// Изменение ввода в момент `now`
    pub fn set_input(&mut self, content: EncodableContent, style: StyleConfig, now: Millis) -> Vec<PipelineEffect> {
        self.dispatch(PipelineEvent::InputChanged { content, style, at: now })
    }

    /// Продвижение времени; запущенные рендеры выполняются синхронно
    pub fn advance(&mut self, now: Millis) -> Vec<PipelineEffect> {
        self.dispatch(PipelineEvent::Tick { now })
    }

    fn dispatch(&mut self, event: PipelineEvent) -> Vec<PipelineEffect> {
        let mut queue = vec![event];
        let mut effects = Vec::new();

        while let Some(event) = queue.pop() {
            for effect in self.controller.handle(event) {
                match effect {
                    PipelineEffect::StartRender(job) => {
                        queue.push(job.run(&self.compositor, self.encoder.as_ref()));
                    }
                    other => effects.push(other),
                }
            }
        }

        effects
    }

    /// Разовый рендер в обход конвейера
    pub fn render_now(&self, content: &EncodableContent, style: &StyleConfig) -> Result<CompositedImage, StudioError> {
        let payload = content.encode().ok_or(PipelineError::IncompleteContent)?;
        Ok(self.compositor.render(self.encoder.as_ref(), &payload, style)?)
    }

    pub fn state(&self) -> PipelineState {
        self.controller.state()
    }

    pub fn controller(&self) -> &PipelineController {
        &self.controller
    }

    pub fn current(&self) -> Option<&CompositedImage> {
        self.controller.current()
    }

    pub fn download(&self) -> Result<Download, StudioError> {
        Ok(self.controller.download()?)
    }

    /// Payload для копирования
    pub fn payload(&self) -> Result<&str, StudioError> {
        Ok(self.controller.payload()?)
    }

    pub fn last_error(&self) -> Option<&ComposeError> {
        self.controller.last_error()
    }

    /// Проверка, что текущее изображение читается сканером
    pub fn verify_current(&self) -> Result<ScanReport, StudioError> {
        let image = self.current().ok_or(PipelineError::DownloadUnavailable)?;
        Ok(verify::scan_report(image.image())?)
    }

    pub fn teardown(&mut self) -> Vec<PipelineEffect> {
        self.controller.teardown()
    }
}

/// Проверка и упаковка байтов логотипа или метки; декодированное изображение
/// остаётся в `ImageSource` и переиспользуется каждым рендером
pub fn load_image(bytes: Vec<u8>) -> Result<ImageSource, StudioError> {
    let source = ImageSource::new(bytes);
    source.image()?;
    Ok(source)
}
