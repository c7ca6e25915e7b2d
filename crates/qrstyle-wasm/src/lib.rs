//! WASM bindings для генератора QR-кодов
//!
//! Предоставляет JavaScript API: ввод и стиль передаются объектами, превью
//! доступно как object URL, скачивание запускается через скрытую ссылку.
//! Таймеры остаются на стороне JS: `update`/`tick` возвращают момент, когда
//! нужно снова вызвать `tick`.

use qrstyle_core::{
    load_image, Compositor, EncodableContent, ImageSource, Millis, PipelineConfig, PipelineController,
    PipelineEffect, PipelineEvent, QrcodeEncoder, StyleConfig,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// Инициализация panic hook и логирования
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).ok();
    log::info!("QR Style WASM module initialized");
}

/// JavaScript-доступный генератор
#[wasm_bindgen]
pub struct WasmQrStudio {
    controller: PipelineController,
    compositor: Compositor,
    logo: Option<ImageSource>,
    mark: Option<ImageSource>,
    /// Object URL текущего изображения
    preview_url: Option<String>,
}

#[wasm_bindgen]
impl WasmQrStudio {
    /// Создание генератора; `config` - `{ debounceMs, downloadFilename }` или undefined
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmQrStudio, JsError> {
        let config: PipelineConfig = if config.is_undefined() || config.is_null() {
            PipelineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| JsError::new(&e.to_string()))?
        };

        Ok(Self {
            controller: PipelineController::new(config),
            compositor: Compositor::new(),
            logo: None,
            mark: None,
            preview_url: None,
        })
    }

    /// Шрифт подписи (TTF/OTF) вместо встроенного
    #[wasm_bindgen(js_name = setFont)]
    pub fn set_font(&mut self, font_data: Vec<u8>) -> Result<(), JsError> {
        self.compositor = Compositor::with_font(font_data).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(())
    }

    /// Логотип (PNG/JPEG); `undefined` убирает логотип
    #[wasm_bindgen(js_name = setLogo)]
    pub fn set_logo(&mut self, image_data: Option<Vec<u8>>) -> Result<(), JsError> {
        self.logo = image_data
            .map(load_image)
            .transpose()
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(())
    }

    /// Фирменная метка в углу; `undefined` убирает метку
    #[wasm_bindgen(js_name = setMark)]
    pub fn set_mark(&mut self, image_data: Option<Vec<u8>>) -> Result<(), JsError> {
        self.mark = image_data
            .map(load_image)
            .transpose()
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(())
    }

    /// Новое состояние формы
    ///
    /// @param content - `{ mode: "url", url: "..." }` и т.д.
    /// @param style - настройки стиля (camelCase)
    /// @param now - `performance.now()`
    /// @returns момент следующего вызова `tick` или undefined
    pub fn update(&mut self, content: JsValue, style: JsValue, now: f64) -> Result<Option<f64>, JsError> {
        let content: EncodableContent =
            serde_wasm_bindgen::from_value(content).map_err(|e| JsError::new(&e.to_string()))?;
        let mut style: StyleConfig = if style.is_undefined() || style.is_null() {
            StyleConfig::default()
        } else {
            serde_wasm_bindgen::from_value(style).map_err(|e| JsError::new(&e.to_string()))?
        };
        style.logo = self.logo.clone();
        style.mark = self.mark.clone();

        self.dispatch(PipelineEvent::InputChanged {
            content,
            style,
            at: to_millis(now),
        })
    }

    /// Срабатывание таймера
    pub fn tick(&mut self, now: f64) -> Result<Option<f64>, JsError> {
        self.dispatch(PipelineEvent::Tick { now: to_millis(now) })
    }

    /// "idle" | "pending" | "rendering" | "ready"
    pub fn state(&self) -> String {
        self.controller.state().name().to_string()
    }

    /// Object URL текущего превью
    #[wasm_bindgen(getter, js_name = previewUrl)]
    pub fn preview_url(&self) -> Option<String> {
        self.preview_url.clone()
    }

    /// Превью устарело (последний ввод не удалось отрисовать)
    #[wasm_bindgen(getter, js_name = isStale)]
    pub fn is_stale(&self) -> bool {
        self.controller.is_stale()
    }

    #[wasm_bindgen(getter, js_name = canDownload)]
    pub fn can_download(&self) -> bool {
        self.controller.can_download()
    }

    /// Текст последней ошибки рендера (например, превышение ёмкости)
    #[wasm_bindgen(getter, js_name = lastError)]
    pub fn last_error(&self) -> Option<String> {
        self.controller.last_error().map(|e| e.to_string())
    }

    /// Payload для кнопки «копировать»
    #[wasm_bindgen(getter)]
    pub fn payload(&self) -> Option<String> {
        self.controller.payload().ok().map(str::to_string)
    }

    /// PNG текущего изображения
    #[wasm_bindgen(js_name = downloadBytes)]
    pub fn download_bytes(&self) -> Result<Vec<u8>, JsError> {
        self.controller
            .download()
            .map(|d| d.bytes)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Сохранение PNG через временную ссылку
    pub fn download(&self) -> Result<(), JsError> {
        let download = self.controller.download().map_err(|e| JsError::new(&e.to_string()))?;
        let url = create_png_url(&download.bytes)?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsError::new("No document available"))?;
        let anchor: HtmlAnchorElement = document
            .create_element("a")
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| JsError::new("Failed to create anchor"))?;
        anchor.set_href(&url);
        anchor.set_download(&download.filename);
        anchor.click();

        Url::revoke_object_url(&url).map_err(js_error)?;
        log::info!("Download triggered: {} ({} bytes)", download.filename, download.bytes.len());
        Ok(())
    }

    /// Освобождение ресурсов перед удалением компонента
    pub fn dispose(&mut self) {
        let effects = self.controller.teardown();
        if self.apply(effects).is_err() {
            log::warn!("Failed to release preview on dispose");
        }
    }
}

impl WasmQrStudio {
    /// Обработка события; рендер выполняется сразу
    fn dispatch(&mut self, event: PipelineEvent) -> Result<Option<f64>, JsError> {
        let mut queue = vec![event];
        let mut effects = Vec::new();

        while let Some(event) = queue.pop() {
            for effect in self.controller.handle(event) {
                match effect {
                    PipelineEffect::StartRender(job) => queue.push(job.run(&self.compositor, &QrcodeEncoder)),
                    other => effects.push(other),
                }
            }
        }

        self.apply(effects)
    }

    fn apply(&mut self, effects: Vec<PipelineEffect>) -> Result<Option<f64>, JsError> {
        let mut wake = None;
        for effect in effects {
            match effect {
                PipelineEffect::WakeAt(at) => wake = Some(at as f64),
                PipelineEffect::Release(handle) => {
                    if let Some(url) = self.preview_url.take() {
                        log::debug!("Revoking preview #{}", handle.id());
                        Url::revoke_object_url(&url).map_err(js_error)?;
                    }
                }
                PipelineEffect::Published(handle) => {
                    if let Some(image) = self.controller.current() {
                        self.preview_url = Some(create_png_url(image.png())?);
                        log::debug!("Published preview #{}", handle.id());
                    }
                }
                PipelineEffect::StartRender(job) => {
                    log::warn!("Unexpected render request #{}", job.generation);
                }
            }
        }
        Ok(wake)
    }
}

impl Drop for WasmQrStudio {
    fn drop(&mut self) {
        if let Some(url) = self.preview_url.take() {
            Url::revoke_object_url(&url).ok();
        }
    }
}

fn to_millis(now: f64) -> Millis {
    if now.is_finite() && now > 0.0 {
        now as Millis
    } else {
        0
    }
}

fn js_error(value: JsValue) -> JsError {
    JsError::new(&value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

fn create_png_url(png: &[u8]) -> Result<String, JsError> {
    let bytes = js_sys::Uint8Array::from(png);
    let parts = js_sys::Array::new();
    parts.push(&bytes);

    let options = BlobPropertyBag::new();
    options.set_type("image/png");
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js_error)?;
    Url::create_object_url_with_blob(&blob).map_err(js_error)
}

/// Информация о версии
#[wasm_bindgen(js_name = version)]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
