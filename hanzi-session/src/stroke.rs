//! Stroke-order widget integration
//!
//! The widget itself (rendering, stroke matching) lives outside this crate
//! behind [`StrokeWidget`]. Optional features are discovered once through
//! [`StrokeWidget::capabilities`] when the widget is wrapped in a
//! [`ResolvedWidget`], not probed on every call.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    #[error("Widget does not support {0}")]
    Unsupported(&'static str),

    #[error("Unknown character: {0}")]
    UnknownCharacter(String),

    #[error("Widget error: {0}")]
    Widget(String),
}

impl From<WidgetError> for hanzi_core::Error {
    fn from(err: WidgetError) -> Self {
        hanzi_core::Error::Widget(err.to_string())
    }
}

const MAX_STROKE_DELAY_MS: u64 = 10_000;

/// Which canvas the widget renders into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetRole {
    /// The large practice canvas
    Main,
    /// Small preview in the character strip
    Thumbnail,
}

/// Widget rendering options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub width: u32,
    pub height: u32,
    pub padding: u32,
    pub stroke_color: String,
    pub radical_color: String,
    pub outline_color: String,
    /// Animation speed multiplier
    pub stroke_animate_speed: f32,
    /// Milliseconds between strokes
    pub delay_between_strokes: u64,
    pub show_outline: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 300,
            padding: 15,
            stroke_color: "#333333".to_string(),
            radical_color: "#c0392b".to_string(),
            outline_color: "#dddddd".to_string(),
            stroke_animate_speed: 1.0,
            delay_between_strokes: 300,
            show_outline: true,
        }
    }
}

impl WidgetConfig {
    /// Defaults sized for a viewport
    pub fn responsive(viewport_width: u32, role: WidgetRole) -> Self {
        Self::default().sized_for(viewport_width, role)
    }

    /// Square canvas fitted to the viewport, with 5% padding
    pub fn sized_for(mut self, viewport_width: u32, role: WidgetRole) -> Self {
        let size = match role {
            WidgetRole::Main => viewport_width.saturating_sub(48).clamp(200, 400),
            WidgetRole::Thumbnail => (viewport_width / 5).clamp(60, 120),
        };
        self.width = size;
        self.height = size;
        self.padding = ((size as f32) * 0.05).round() as u32;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("Widget size must be positive".to_string());
        }
        if self.padding.saturating_mul(2) >= self.width.min(self.height) {
            return Err("Widget padding leaves no drawing area".to_string());
        }
        if !self.stroke_animate_speed.is_finite() || self.stroke_animate_speed <= 0.0 {
            return Err("Stroke animation speed must be positive".to_string());
        }
        if self.delay_between_strokes > MAX_STROKE_DELAY_MS {
            return Err(format!(
                "Delay between strokes too large (max {} ms)",
                MAX_STROKE_DELAY_MS
            ));
        }
        Ok(())
    }
}

/// Optional widget features
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WidgetCapabilities {
    pub quiz: bool,
    pub outline_toggle: bool,
}

/// Result reported by a widget when the learner finishes a quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOutcome {
    pub total_mistakes: u32,
    pub strokes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    pub character: String,
    pub total_mistakes: u32,
    pub strokes: u32,
}

#[async_trait]
pub trait StrokeWidget: Send + Sync {
    /// Show `character` with the given options
    async fn load(&self, character: &str, config: &WidgetConfig) -> Result<(), WidgetError>;

    /// Play the stroke-order animation once, resolving when it ends
    async fn animate(&self) -> Result<(), WidgetError>;

    fn capabilities(&self) -> WidgetCapabilities {
        WidgetCapabilities::default()
    }

    /// Run a stroke quiz on the loaded character until the learner finishes
    async fn quiz(&self) -> Result<QuizOutcome, WidgetError> {
        Err(WidgetError::Unsupported("quiz"))
    }

    async fn set_outline(&self, _visible: bool) -> Result<(), WidgetError> {
        Err(WidgetError::Unsupported("outline toggle"))
    }
}

/// A widget together with the capabilities it declared at integration time
pub struct ResolvedWidget {
    inner: Arc<dyn StrokeWidget>,
    capabilities: WidgetCapabilities,
}

impl ResolvedWidget {
    pub fn new(inner: Arc<dyn StrokeWidget>) -> Self {
        let capabilities = inner.capabilities();
        debug!("Stroke widget capabilities: {:?}", capabilities);
        Self {
            inner,
            capabilities,
        }
    }

    pub fn capabilities(&self) -> WidgetCapabilities {
        self.capabilities
    }

    pub async fn load(&self, character: &str, config: &WidgetConfig) -> Result<(), WidgetError> {
        self.inner.load(character, config).await
    }

    pub async fn animate(&self) -> Result<(), WidgetError> {
        self.inner.animate().await
    }

    pub async fn quiz(&self) -> Result<QuizOutcome, WidgetError> {
        if !self.capabilities.quiz {
            return Err(WidgetError::Unsupported("quiz"));
        }
        self.inner.quiz().await
    }

    pub async fn set_outline(&self, visible: bool) -> Result<(), WidgetError> {
        if !self.capabilities.outline_toggle {
            return Err(WidgetError::Unsupported("outline toggle"));
        }
        self.inner.set_outline(visible).await
    }
}

/// Load `character` and quiz the learner on it
pub async fn run_quiz(
    widget: &ResolvedWidget,
    character: &str,
    config: &WidgetConfig,
) -> Result<QuizSummary, WidgetError> {
    if !widget.capabilities().quiz {
        return Err(WidgetError::Unsupported("quiz"));
    }

    widget.load(character, config).await?;
    let outcome = widget.quiz().await?;

    info!(
        "Quiz on {} finished with {} mistakes over {} strokes",
        character, outcome.total_mistakes, outcome.strokes
    );

    Ok(QuizSummary {
        character: character.to_string(),
        total_mistakes: outcome.total_mistakes,
        strokes: outcome.strokes,
    })
}

struct DemoLoop {
    character: String,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Repeating stroke-order demonstration for the active character.
///
/// Showing a new character cancels the previous loop first, so at most one
/// loop drives the widget.
pub struct DemoController {
    widget: Arc<ResolvedWidget>,
    config: WidgetConfig,
    pause: Duration,
    current: Mutex<Option<DemoLoop>>,
}

impl DemoController {
    pub fn new(widget: Arc<ResolvedWidget>, config: WidgetConfig, pause: Duration) -> Self {
        Self {
            widget,
            config,
            pause,
            current: Mutex::new(None),
        }
    }

    /// Start looping `character`, replacing any running demonstration
    pub fn show(&self, character: &str) {
        let mut current = self.current.lock();
        if let Some(previous) = current.take() {
            previous.token.cancel();
        }

        let token = CancellationToken::new();
        let widget = self.widget.clone();
        let config = self.config.clone();
        let pause = self.pause;
        let loop_token = token.clone();
        let loop_character = character.to_string();

        let handle = tokio::spawn(async move {
            demo_loop(widget, config, pause, loop_character, loop_token).await;
        });

        *current = Some(DemoLoop {
            character: character.to_string(),
            token,
            handle,
        });
    }

    /// Cancel the running demonstration and wait for it to finish
    pub async fn stop(&self) {
        let current = self.current.lock().take();
        if let Some(demo) = current {
            demo.token.cancel();
            if let Err(e) = demo.handle.await {
                warn!("Demo loop for {} ended abnormally: {}", demo.character, e);
            }
        }
    }

    pub fn showing(&self) -> Option<String> {
        self.current
            .lock()
            .as_ref()
            .filter(|demo| !demo.handle.is_finished())
            .map(|demo| demo.character.clone())
    }
}

impl Drop for DemoController {
    fn drop(&mut self) {
        if let Some(demo) = self.current.get_mut().take() {
            demo.token.cancel();
        }
    }
}

async fn demo_loop(
    widget: Arc<ResolvedWidget>,
    config: WidgetConfig,
    pause: Duration,
    character: String,
    token: CancellationToken,
) {
    let loaded = tokio::select! {
        biased;
        _ = token.cancelled() => return,
        result = widget.load(&character, &config) => result,
    };
    if let Err(e) = loaded {
        warn!("Could not load {} for demonstration: {}", character, e);
        return;
    }

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            result = widget.animate() => {
                if let Err(e) = result {
                    warn!("Demonstration of {} stopped: {}", character, e);
                    break;
                }
            }
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(pause) => {}
        }
    }

    debug!("Demo loop for {} ended", character);
}
