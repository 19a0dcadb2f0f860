use std::sync::Arc;

use futures::executor::block_on;
use log::{error, info, warn};
use parking_lot::Mutex;

use crate::bitmap::Bitmap;
use crate::compositor::CompositionSnapshot;
use crate::config::EditorConfig;
use crate::file_handler::FileHandler;
use crate::generation::{self, FileSinkGenerator, GenerationRequest, ImageGenerator};
use crate::input::InputHandler;
use crate::panels::{central_panel, tools_panel};
use crate::presets::{JsonFilePresetStorage, PresetStore};
use crate::renderer::Renderer;
use crate::state::{BrushSettings, EditorState};
use crate::tools::InteractionController;

const CONFIG_PATH: &str = "layered_canvas.json";

/// Progress of the last "Generate" click
#[derive(Debug, Clone, Default)]
pub enum GenerationStatus {
    #[default]
    Idle,
    Running,
    Done(Vec<u8>),
    /// The collaborator's message, verbatim
    Failed(String),
}

/// What survives a restart
#[derive(serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(default)]
struct PersistedSettings {
    prompt: String,
    brush: Option<BrushSettings>,
}

pub struct CanvasApp {
    pub(crate) state: EditorState,
    pub(crate) controller: InteractionController,
    pub(crate) renderer: Renderer,
    pub(crate) input: InputHandler,
    pub(crate) files: FileHandler,
    pub(crate) presets: Option<PresetStore<JsonFilePresetStorage>>,
    pub(crate) generator: Arc<dyn ImageGenerator>,
    pub(crate) generation: Arc<Mutex<GenerationStatus>>,
    pub(crate) prompt: String,
    pub(crate) preset_name: String,
    /// Last error or notice shown under the tools
    pub(crate) status: Option<String>,
}

impl CanvasApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = EditorConfig::load_or_default(CONFIG_PATH);
        let mut app = Self::with_config(config);

        if let Some(storage) = cc.storage {
            let settings: PersistedSettings = eframe::get_value(storage, eframe::APP_KEY).unwrap_or_default();
            app.prompt = settings.prompt;
            if let Some(brush) = settings.brush {
                app.state.brush = brush;
            }
        }
        app
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let presets = match PresetStore::open(JsonFilePresetStorage::new(&config.presets_path)) {
            Ok(store) => Some(store),
            Err(err) => {
                error!("❌ Presets unavailable: {}", err);
                None
            }
        };
        let generator: Arc<dyn ImageGenerator> = Arc::new(FileSinkGenerator::new(&config.output_dir));

        Self {
            state: EditorState::new(config),
            controller: InteractionController::new(),
            renderer: Renderer::new(),
            input: InputHandler::new(),
            files: FileHandler::new(),
            presets,
            generator,
            generation: Arc::new(Mutex::new(GenerationStatus::Idle)),
            prompt: String::new(),
            preset_name: String::new(),
            status: None,
        }
    }

    pub(crate) fn report<T, E: std::fmt::Display>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("⚠️ {}", err);
                self.status = Some(err.to_string());
                None
            }
        }
    }

    pub(crate) fn generation_status(&self) -> GenerationStatus {
        self.generation.lock().clone()
    }

    /// Captures the canvas now and composes plus sends it on a worker thread
    pub(crate) fn start_generation(&mut self, ctx: &egui::Context) {
        if self.state.is_empty() {
            self.status = Some("Add an image or draw something first".to_owned());
            return;
        }
        {
            let mut status = self.generation.lock();
            if matches!(*status, GenerationStatus::Running) {
                return;
            }
            *status = GenerationStatus::Running;
        }

        let snapshot = CompositionSnapshot::capture(&self.state);
        let prompt = self.prompt.clone();
        let generator = Arc::clone(&self.generator);
        let slot = Arc::clone(&self.generation);
        let ctx = ctx.clone();
        info!("🚀 Generation started");

        std::thread::spawn(move || {
            let outcome = block_on(async {
                let request = GenerationRequest::from_snapshot(&snapshot, &prompt, Vec::new())
                    .await
                    .map_err(|err| err.to_string())?;
                generation::run(generator.as_ref(), request)
                    .await
                    .map_err(|err| err.to_string())
            });
            *slot.lock() = match outcome {
                Ok(bytes) => GenerationStatus::Done(bytes),
                Err(message) => GenerationStatus::Failed(message),
            };
            ctx.request_repaint();
        });
    }

    /// Puts the generated image on the canvas as a new layer
    pub(crate) fn place_generated(&mut self) {
        let GenerationStatus::Done(bytes) = self.generation_status() else {
            return;
        };
        if let Some(bitmap) = self.report(Bitmap::from_encoded_bytes(bytes)) {
            let id = self.state.add_layer(bitmap, egui::pos2(0.0, 0.0));
            info!("🖼️ Placed generated image as {}", id);
            *self.generation.lock() = GenerationStatus::Idle;
        }
    }
}

impl eframe::App for CanvasApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedSettings {
            prompt: self.prompt.clone(),
            brush: Some(self.state.brush),
        };
        eframe::set_value(storage, eframe::APP_KEY, &settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.renderer.begin_frame();
        tools_panel(self, ctx);
        central_panel(self, ctx);
    }
}
