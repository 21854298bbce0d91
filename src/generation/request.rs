use crate::errors::{RecorderError, Result};
use crate::generation::client::GenerationBackend;
use crate::steps::{describe, Step};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationState {
    InFlight,
    Completed(String),
    Failed(String),
    Cancelled,
}

impl GenerationState {
    pub fn is_finished(&self) -> bool {
        !matches!(self, GenerationState::InFlight)
    }
}

type StepsHook = Box<dyn Fn(&[Step]) + Send + Sync>;
type TextHook = Box<dyn Fn(&str) + Send + Sync>;

/// Callbacks around one generation request.
#[derive(Default)]
pub struct GenerationHooks {
    on_start: Option<StepsHook>,
    on_chunk: Option<TextHook>,
    on_complete: Option<TextHook>,
    on_error: Option<TextHook>,
}

impl GenerationHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(mut self, hook: impl Fn(&[Step]) + Send + Sync + 'static) -> Self {
        self.on_start = Some(Box::new(hook));
        self
    }

    pub fn on_chunk(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_chunk = Some(Box::new(hook));
        self
    }

    pub fn on_complete(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }

    pub fn on_error(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }
}

#[derive(Debug)]
struct Progress {
    state: GenerationState,
    text: String,
}

/// Starts generation requests against a backend.
pub struct Generator<B: GenerationBackend + 'static> {
    backend: Arc<B>,
    hooks: Arc<GenerationHooks>,
}

impl<B: GenerationBackend + 'static> Generator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            hooks: Arc::new(GenerationHooks::default()),
        }
    }

    pub fn with_hooks(mut self, hooks: GenerationHooks) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Serializes `steps` and starts streaming. Must run inside a tokio runtime.
    ///
    /// The steps are only read; a failed or cancelled request leaves them as they were.
    pub fn generate(&self, steps: &[Step]) -> Result<GenerationRequest> {
        if steps.is_empty() {
            return Err(RecorderError::NoSteps);
        }

        let descriptor = describe(steps);
        if let Some(hook) = &self.hooks.on_start {
            hook(steps);
        }
        info!(steps = steps.len(), "generation started");

        let progress = Arc::new(RwLock::new(Progress {
            state: GenerationState::InFlight,
            text: String::new(),
        }));
        let (cancel, cancel_rx) = watch::channel(false);

        let task = tokio::spawn(run(
            Arc::clone(&self.backend),
            Arc::clone(&self.hooks),
            descriptor,
            Arc::clone(&progress),
            cancel_rx,
        ));

        Ok(GenerationRequest {
            progress,
            cancel: CancelHandle(Arc::new(cancel)),
            task,
        })
    }
}

/// Handle to one in-flight generation.
pub struct GenerationRequest {
    progress: Arc<RwLock<Progress>>,
    cancel: CancelHandle,
    task: JoinHandle<()>,
}

/// Cancels a request from another task.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<watch::Sender<bool>>);

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.0.send(true);
    }
}

impl GenerationRequest {
    pub async fn state(&self) -> GenerationState {
        self.progress.read().await.state.clone()
    }

    /// Text received so far.
    pub async fn text(&self) -> String {
        self.progress.read().await.text.clone()
    }

    /// Stops delivery of further output. Text already received is kept.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub async fn wait(self) -> GenerationState {
        if let Err(e) = self.task.await {
            warn!("generation task ended abnormally: {}", e);
            let mut progress = self.progress.write().await;
            if !progress.state.is_finished() {
                progress.state = GenerationState::Failed(e.to_string());
            }
        }
        self.progress.read().await.state.clone()
    }
}

async fn run<B: GenerationBackend>(
    backend: Arc<B>,
    hooks: Arc<GenerationHooks>,
    descriptor: String,
    progress: Arc<RwLock<Progress>>,
    mut cancel_rx: watch::Receiver<bool>,
) {
    let outcome = tokio::select! {
        biased;
        _ = cancelled(&mut cancel_rx) => None,
        result = stream_into(backend.as_ref(), &descriptor, &progress, &hooks) => Some(result),
    };

    let mut progress = progress.write().await;
    progress.state = match outcome {
        None => {
            info!(chars = progress.text.len(), "generation cancelled");
            GenerationState::Cancelled
        }
        Some(Ok(())) => {
            info!(chars = progress.text.len(), "generation completed");
            if let Some(hook) = &hooks.on_complete {
                hook(&progress.text);
            }
            GenerationState::Completed(progress.text.clone())
        }
        Some(Err(e)) => {
            let message = e.to_string();
            warn!(retryable = e.is_generation_failure(), "generation failed: {}", message);
            if let Some(hook) = &hooks.on_error {
                hook(&message);
            }
            GenerationState::Failed(message)
        }
    };
}

async fn stream_into<B: GenerationBackend + ?Sized>(
    backend: &B,
    descriptor: &str,
    progress: &RwLock<Progress>,
    hooks: &GenerationHooks,
) -> Result<()> {
    let mut stream = backend.stream(descriptor).await?;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if let Some(hook) = &hooks.on_chunk {
            hook(&chunk);
        }
        progress.write().await.text.push_str(&chunk);
    }
    Ok(())
}

async fn cancelled(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow() {
        if rx.changed().await.is_err() {
            // Handle dropped without cancelling: keep generating.
            std::future::pending::<()>().await;
        }
    }
}
