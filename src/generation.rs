//! Boundary to the image generator.
//!
//! The editor only builds the request (composite first, then any reference images) and the
//! instruction text. What happens to it afterwards belongs to the [`ImageGenerator`].

use std::fs;
use std::path::PathBuf;

use futures::FutureExt;
use futures::future::BoxFuture;
use log::{error, info};
use thiserror::Error;
use uuid::Uuid;

use crate::compositor::{self, CompositionSnapshot};
use crate::error::{CanvasError, CanvasResult};
use crate::state::EditorState;

#[derive(Debug, Error)]
pub enum GenerationError {
    /// The generator's own message, shown to the user unchanged
    #[error("{0}")]
    Failed(String),

    #[error("generator I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// `generate(prompt, images) -> bytes`. Timeouts and retries are the implementor's business.
pub trait ImageGenerator: Send + Sync {
    fn name(&self) -> &str;

    fn generate(&self, prompt: String, images: Vec<Vec<u8>>) -> BoxFuture<'static, Result<Vec<u8>, GenerationError>>;
}

/// Everything sent to the generator
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// The canvas composite comes first
    pub images: Vec<Vec<u8>>,
}

impl GenerationRequest {
    /// Captures the canvas and composes it. Refuses an empty canvas.
    pub async fn from_canvas(state: &EditorState, prompt: &str, references: Vec<Vec<u8>>) -> CanvasResult<Self> {
        let snapshot = CompositionSnapshot::capture(state);
        Self::from_snapshot(&snapshot, prompt, references).await
    }

    /// Same as [`GenerationRequest::from_canvas`] for a snapshot taken earlier, e.g. on the UI
    /// thread before handing the work to a worker.
    pub async fn from_snapshot(
        snapshot: &CompositionSnapshot,
        prompt: &str,
        references: Vec<Vec<u8>>,
    ) -> CanvasResult<Self> {
        if snapshot.is_empty() {
            return Err(CanvasError::NothingToCompose);
        }
        let base = snapshot.base_layer().map(|layer| layer.id());
        let composite = compositor::render_for_generation(snapshot, base).await?;
        let mut images = vec![compositor::encode_png(&composite)?];
        images.extend(references);

        Ok(Self {
            prompt: compose_instruction(prompt, snapshot),
            images,
        })
    }
}

/// The user's prompt plus a short description of what the first image holds
pub fn compose_instruction(prompt: &str, snapshot: &CompositionSnapshot) -> String {
    let mut parts = Vec::new();
    let layers = snapshot.layers().len();
    if layers > 0 {
        parts.push(format!("{} placed image{}", layers, if layers == 1 { "" } else { "s" }));
    }
    let strokes = snapshot.strokes().len();
    if strokes > 0 {
        parts.push(format!("{} hand-drawn mark{}", strokes, if strokes == 1 { "" } else { "s" }));
    }

    let context = format!(
        "The first image is the user's canvas with {}. Keep its arrangement.",
        parts.join(" and ")
    );
    match prompt.trim() {
        "" => context,
        prompt => format!("{}\n\n{}", prompt, context),
    }
}

/// Sends `request` and logs the outcome
pub async fn run(generator: &dyn ImageGenerator, request: GenerationRequest) -> Result<Vec<u8>, GenerationError> {
    info!(
        "🚀 Sending {} image(s) to {}",
        request.images.len(),
        generator.name()
    );
    match generator.generate(request.prompt, request.images).await {
        Ok(bytes) => {
            info!("✅ {} returned {} bytes", generator.name(), bytes.len());
            Ok(bytes)
        }
        Err(err) => {
            error!("❌ {} failed: {}", generator.name(), err);
            Err(err)
        }
    }
}

/// Offline generator: writes each request into a directory and hands the composite back
#[derive(Debug, Clone)]
pub struct FileSinkGenerator {
    output_dir: PathBuf,
}

impl FileSinkGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl ImageGenerator for FileSinkGenerator {
    fn name(&self) -> &str {
        "file sink"
    }

    fn generate(&self, prompt: String, images: Vec<Vec<u8>>) -> BoxFuture<'static, Result<Vec<u8>, GenerationError>> {
        let output_dir = self.output_dir.clone();
        async move {
            let Some(composite) = images.first().cloned() else {
                return Err(GenerationError::Failed("request carried no images".to_owned()));
            };
            fs::create_dir_all(&output_dir)?;
            let request_id = Uuid::new_v4();
            fs::write(output_dir.join(format!("{}.txt", request_id)), &prompt)?;
            for (index, image) in images.iter().enumerate() {
                fs::write(output_dir.join(format!("{}-{}.png", request_id, index)), image)?;
            }
            info!("💾 Request {} written to {}", request_id, output_dir.display());
            Ok(composite)
        }
        .boxed()
    }
}
