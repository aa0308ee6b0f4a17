// Terminal stand-in for the stroke-order widget

use async_trait::async_trait;
use hanzi_session::{StrokeWidget, WidgetCapabilities, WidgetConfig, WidgetError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;

/// Prints the character instead of drawing it. One animation pass lasts
/// four stroke delays.
pub struct TerminalWidget {
    loaded: Mutex<Option<(String, WidgetConfig)>>,
    outline: AtomicBool,
}

impl TerminalWidget {
    pub fn new() -> Self {
        Self {
            loaded: Mutex::new(None),
            outline: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl StrokeWidget for TerminalWidget {
    async fn load(&self, character: &str, config: &WidgetConfig) -> Result<(), WidgetError> {
        debug!(
            "Loaded {} into a {}x{} canvas (outline {})",
            character,
            config.width,
            config.height,
            self.outline.load(Ordering::SeqCst)
        );
        *self.loaded.lock() = Some((character.to_string(), config.clone()));
        Ok(())
    }

    async fn animate(&self) -> Result<(), WidgetError> {
        let (character, delay) = match self.loaded.lock().as_ref() {
            Some((character, config)) => (character.clone(), config.delay_between_strokes),
            None => return Err(WidgetError::Widget("nothing loaded".to_string())),
        };
        debug!("Animating {}", character);
        tokio::time::sleep(Duration::from_millis(delay).saturating_mul(4)).await;
        Ok(())
    }

    fn capabilities(&self) -> WidgetCapabilities {
        WidgetCapabilities {
            quiz: false,
            outline_toggle: true,
        }
    }

    async fn set_outline(&self, visible: bool) -> Result<(), WidgetError> {
        self.outline.store(visible, Ordering::SeqCst);
        Ok(())
    }
}
