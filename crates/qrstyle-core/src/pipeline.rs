//! Реактивный контроллер: Idle → Pending → Rendering → Ready
//!
//! Контроллер не знает о таймерах и потоках. Он принимает события
//! ([`PipelineEvent`]) с явным временем в миллисекундах и возвращает эффекты
//! ([`PipelineEffect`]), которые исполняет окружение: завести таймер, запустить
//! рендер, освободить или опубликовать изображение.
//!
//! Каждое изменение ввода увеличивает номер поколения. Результат рендера
//! принимается только если его поколение совпадает с текущим, поэтому
//! запоздавший рендер старого ввода никогда не перезапишет более новый.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compositor::{ComposeError, CompositedImage, Compositor};
use crate::content::EncodableContent;
use crate::matrix::MatrixEncoder;
use crate::style::StyleConfig;

/// Время в миллисекундах (монотонные часы окружения)
pub type Millis = u64;

/// Ошибки контроллера
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineError {
    #[error("No ready image to download")]
    DownloadUnavailable,

    #[error("Content is incomplete")]
    IncompleteContent,
}

/// Настройки контроллера
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// Пауза после последнего изменения до запуска рендера
    pub debounce_ms: Millis,
    /// Имя файла для скачивания
    pub download_filename: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 250,
            download_filename: "kompi-qr-code.png".to_string(),
        }
    }
}

/// Идентификатор опубликованного изображения (например, object URL в браузере)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(u64);

impl ImageHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Состояние контроллера
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Нет корректного содержимого (или последний рендер упёрся в ёмкость)
    Idle,
    /// Ждём окончания паузы
    Pending { generation: u64, due_at: Millis },
    /// Рендер запущен
    Rendering { generation: u64 },
    /// Текущее изображение готово к скачиванию
    Ready { generation: u64 },
}

impl PipelineState {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Pending { .. } => "pending",
            PipelineState::Rendering { .. } => "rendering",
            PipelineState::Ready { .. } => "ready",
        }
    }
}

/// Задание на рендер, привязанное к поколению ввода
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub generation: u64,
    pub payload: String,
    pub style: StyleConfig,
}

impl RenderJob {
    /// Выполнение рендера; результат возвращается контроллеру как событие
    pub fn run(&self, compositor: &Compositor, encoder: &dyn MatrixEncoder) -> PipelineEvent {
        PipelineEvent::RenderSettled {
            generation: self.generation,
            result: compositor.render(encoder, &self.payload, &self.style),
        }
    }
}

/// Входящие события
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    InputChanged {
        content: EncodableContent,
        style: StyleConfig,
        at: Millis,
    },
    Tick {
        now: Millis,
    },
    RenderSettled {
        generation: u64,
        result: Result<CompositedImage, ComposeError>,
    },
}

/// Исходящие эффекты; исполняются окружением по порядку
#[derive(Debug, Clone)]
pub enum PipelineEffect {
    /// Разбудить контроллер событием `Tick` не раньше указанного времени
    WakeAt(Millis),
    StartRender(RenderJob),
    /// Освободить ресурс прежнего изображения
    Release(ImageHandle),
    /// Новое текущее изображение
    Published(ImageHandle),
}

/// Файл для сохранения
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
struct Published {
    handle: ImageHandle,
    image: CompositedImage,
    payload: String,
}

/// Контроллер конвейера; владеет единственным текущим изображением
#[derive(Debug)]
pub struct PipelineController {
    config: PipelineConfig,
    state: PipelineState,
    generation: u64,
    next_handle: u64,
    pending: Option<RenderJob>,
    input_payload: Option<String>,
    current: Option<Published>,
    /// Текущее изображение показано как устаревшее превью, скачивание запрещено
    stale: bool,
    last_error: Option<ComposeError>,
}

impl Default for PipelineController {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl PipelineController {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            state: PipelineState::Idle,
            generation: 0,
            next_handle: 0,
            pending: None,
            input_payload: None,
            current: None,
            stale: false,
            last_error: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Обработка события
    pub fn handle(&mut self, event: PipelineEvent) -> Vec<PipelineEffect> {
        match event {
            PipelineEvent::InputChanged { content, style, at } => self.on_input(content, style, at),
            PipelineEvent::Tick { now } => self.on_tick(now),
            PipelineEvent::RenderSettled { generation, result } => self.on_settled(generation, result),
        }
    }

    fn on_input(&mut self, content: EncodableContent, style: StyleConfig, at: Millis) -> Vec<PipelineEffect> {
        self.generation += 1;
        let generation = self.generation;

        let Some(payload) = content.encode() else {
            log::debug!("Input #{} is incomplete, going idle", generation);
            self.pending = None;
            self.input_payload = None;
            self.state = PipelineState::Idle;
            self.last_error = None;
            return self.release_current().into_iter().collect();
        };

        let due_at = at.saturating_add(self.config.debounce_ms);
        log::debug!("Input #{} accepted, render due at {} ms", generation, due_at);
        self.input_payload = Some(payload.clone());
        self.pending = Some(RenderJob { generation, payload, style });
        self.state = PipelineState::Pending { generation, due_at };
        vec![PipelineEffect::WakeAt(due_at)]
    }

    fn on_tick(&mut self, now: Millis) -> Vec<PipelineEffect> {
        let PipelineState::Pending { generation, due_at } = self.state else {
            return Vec::new();
        };
        if now < due_at {
            return Vec::new();
        }

        match self.pending.take() {
            Some(job) if job.generation == generation => {
                log::info!("Starting render #{} ({} bytes)", generation, job.payload.len());
                self.state = PipelineState::Rendering { generation };
                vec![PipelineEffect::StartRender(job)]
            }
            _ => {
                log::warn!("Pending state #{} without a matching job", generation);
                self.state = PipelineState::Idle;
                Vec::new()
            }
        }
    }

    fn on_settled(&mut self, generation: u64, result: Result<CompositedImage, ComposeError>) -> Vec<PipelineEffect> {
        if self.state != (PipelineState::Rendering { generation }) {
            log::debug!(
                "Discarding stale render #{} (current generation {})",
                generation,
                self.generation
            );
            return Vec::new();
        }

        match result {
            Ok(image) => {
                let mut effects: Vec<PipelineEffect> = self.release_current().into_iter().collect();
                let handle = ImageHandle(self.next_handle);
                self.next_handle += 1;

                log::info!("Render #{} ready: {}x{}", generation, image.width(), image.height());
                self.current = Some(Published {
                    handle,
                    image,
                    payload: self.input_payload.clone().unwrap_or_default(),
                });
                self.stale = false;
                self.last_error = None;
                self.state = PipelineState::Ready { generation };
                effects.push(PipelineEffect::Published(handle));
                effects
            }
            Err(error @ ComposeError::Encode(_)) => {
                log::warn!("Render #{} cannot be generated: {}", generation, error);
                self.stale = self.current.is_some();
                self.last_error = Some(error);
                self.state = PipelineState::Idle;
                Vec::new()
            }
            Err(error) => {
                log::error!("Render #{} failed: {}", generation, error);
                self.last_error = Some(error);
                self.state = match &self.current {
                    Some(_) if !self.stale => PipelineState::Ready { generation },
                    _ => PipelineState::Idle,
                };
                Vec::new()
            }
        }
    }

    fn release_current(&mut self) -> Option<PipelineEffect> {
        self.stale = false;
        self.current.take().map(|published| {
            log::debug!("Releasing image handle {}", published.handle.id());
            PipelineEffect::Release(published.handle)
        })
    }

    /// Текущее изображение (в том числе устаревшее превью)
    pub fn current(&self) -> Option<&CompositedImage> {
        self.current.as_ref().map(|p| &p.image)
    }

    pub fn current_handle(&self) -> Option<ImageHandle> {
        self.current.as_ref().map(|p| p.handle)
    }

    /// Превью не соответствует последнему вводу
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn last_error(&self) -> Option<&ComposeError> {
        self.last_error.as_ref()
    }

    /// Payload для «копировать значение». В `Ready` это payload показанного
    /// изображения, в остальных состояниях последний корректный ввод.
    pub fn payload(&self) -> Result<&str, PipelineError> {
        match (&self.state, &self.current) {
            (PipelineState::Ready { .. }, Some(published)) => Ok(published.payload.as_str()),
            _ => self.input_payload.as_deref().ok_or(PipelineError::IncompleteContent),
        }
    }

    pub fn can_download(&self) -> bool {
        matches!(self.state, PipelineState::Ready { .. }) && self.current.is_some() && !self.stale
    }

    /// PNG текущего изображения; доступно только в состоянии `Ready`
    pub fn download(&self) -> Result<Download, PipelineError> {
        match &self.current {
            Some(published) if self.can_download() => Ok(Download {
                filename: self.config.download_filename.clone(),
                bytes: published.image.png().to_vec(),
            }),
            _ => Err(PipelineError::DownloadUnavailable),
        }
    }

    /// Сброс при уничтожении владельца: освободить изображение, отменить рендеры
    pub fn teardown(&mut self) -> Vec<PipelineEffect> {
        self.generation += 1;
        self.pending = None;
        self.input_payload = None;
        self.state = PipelineState::Idle;
        self.release_current().into_iter().collect()
    }
}
