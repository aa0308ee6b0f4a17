#[cfg(test)]
mod stroke_tests {
    use crate::stroke::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Widget that records calls; animation takes a few milliseconds
    #[derive(Default)]
    struct FakeWidget {
        loaded: Mutex<Vec<String>>,
        animations: AtomicU32,
        capabilities: WidgetCapabilities,
    }

    #[async_trait]
    impl StrokeWidget for FakeWidget {
        async fn load(&self, character: &str, _config: &WidgetConfig) -> Result<(), WidgetError> {
            if character == "?" {
                return Err(WidgetError::UnknownCharacter(character.to_string()));
            }
            self.loaded.lock().push(character.to_string());
            Ok(())
        }

        async fn animate(&self) -> Result<(), WidgetError> {
            tokio::time::sleep(Duration::from_millis(2)).await;
            self.animations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn capabilities(&self) -> WidgetCapabilities {
            self.capabilities
        }

        async fn quiz(&self) -> Result<QuizOutcome, WidgetError> {
            Ok(QuizOutcome {
                total_mistakes: 2,
                strokes: 5,
            })
        }
    }

    fn quiz_widget() -> Arc<FakeWidget> {
        Arc::new(FakeWidget {
            capabilities: WidgetCapabilities {
                quiz: true,
                outline_toggle: false,
            },
            ..FakeWidget::default()
        })
    }

    #[test]
    fn test_responsive_main_canvas() {
        let phone = WidgetConfig::responsive(360, WidgetRole::Main);
        assert_eq!(phone.width, 312);
        assert_eq!(phone.height, 312);
        assert_eq!(phone.padding, 16);

        let desktop = WidgetConfig::responsive(1920, WidgetRole::Main);
        assert_eq!(desktop.width, 400);

        let tiny = WidgetConfig::responsive(100, WidgetRole::Main);
        assert_eq!(tiny.width, 200);
        assert!(tiny.validate().is_ok());
    }

    #[test]
    fn test_responsive_thumbnail() {
        assert_eq!(WidgetConfig::responsive(360, WidgetRole::Thumbnail).width, 72);
        assert_eq!(WidgetConfig::responsive(100, WidgetRole::Thumbnail).width, 60);
        assert_eq!(WidgetConfig::responsive(2000, WidgetRole::Thumbnail).width, 120);
    }

    #[test]
    fn test_widget_config_rejects_oversized_padding() {
        let config = WidgetConfig {
            padding: 200,
            ..WidgetConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_widget_config_extreme_values_are_rejected() {
        let padding = WidgetConfig {
            padding: u32::MAX,
            ..WidgetConfig::default()
        };
        assert!(padding.validate().is_err());

        let delay = WidgetConfig {
            delay_between_strokes: u64::MAX,
            ..WidgetConfig::default()
        };
        assert!(delay.validate().unwrap_err().contains("Delay between strokes"));
    }

    #[test]
    fn test_widget_error_converts_to_core_error() {
        let err = hanzi_core::Error::from(WidgetError::Unsupported("quiz"));
        assert_eq!(err.to_string(), "Widget error: Widget does not support quiz");
    }

    #[tokio::test]
    async fn test_unsupported_capabilities_do_not_reach_widget() {
        let widget = ResolvedWidget::new(Arc::new(FakeWidget::default()));

        assert_eq!(widget.quiz().await, Err(WidgetError::Unsupported("quiz")));
        assert_eq!(
            widget.set_outline(false).await,
            Err(WidgetError::Unsupported("outline toggle"))
        );
    }

    #[tokio::test]
    async fn test_default_optional_ops_are_unsupported() {
        let widget = FakeWidget::default();
        assert!(matches!(
            widget.set_outline(true).await,
            Err(WidgetError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_run_quiz_summarizes() {
        let fake = quiz_widget();
        let widget = ResolvedWidget::new(fake.clone());

        let summary = run_quiz(&widget, "永", &WidgetConfig::default()).await.unwrap();
        assert_eq!(
            summary,
            QuizSummary {
                character: "永".to_string(),
                total_mistakes: 2,
                strokes: 5,
            }
        );
        assert_eq!(*fake.loaded.lock(), vec!["永".to_string()]);
    }

    #[tokio::test]
    async fn test_run_quiz_without_capability() {
        let fake = Arc::new(FakeWidget::default());
        let widget = ResolvedWidget::new(fake.clone());

        let result = run_quiz(&widget, "永", &WidgetConfig::default()).await;
        assert!(matches!(result, Err(WidgetError::Unsupported(_))));
        assert!(fake.loaded.lock().is_empty());
    }

    #[tokio::test]
    async fn test_demo_loop_repeats_until_stopped() {
        let fake = Arc::new(FakeWidget::default());
        let controller = DemoController::new(
            Arc::new(ResolvedWidget::new(fake.clone())),
            WidgetConfig::default(),
            Duration::from_millis(1),
        );

        controller.show("永");
        assert_eq!(controller.showing().as_deref(), Some("永"));

        for _ in 0..500 {
            if fake.animations.load(Ordering::SeqCst) >= 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        assert!(fake.animations.load(Ordering::SeqCst) >= 3);

        controller.stop().await;
        assert!(controller.showing().is_none());

        let after_stop = fake.animations.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(fake.animations.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn test_show_replaces_previous_loop() {
        let fake = Arc::new(FakeWidget::default());
        let controller = DemoController::new(
            Arc::new(ResolvedWidget::new(fake.clone())),
            WidgetConfig::default(),
            Duration::from_millis(1),
        );

        controller.show("永");
        controller.show("和");
        assert_eq!(controller.showing().as_deref(), Some("和"));

        for _ in 0..500 {
            if fake.loaded.lock().contains(&"和".to_string()) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        controller.stop().await;

        // The first loop was cancelled before it could load
        assert_eq!(*fake.loaded.lock(), vec!["和".to_string()]);
    }

    #[tokio::test]
    async fn test_demo_loop_ends_on_load_failure() {
        let fake = Arc::new(FakeWidget::default());
        let controller = DemoController::new(
            Arc::new(ResolvedWidget::new(fake.clone())),
            WidgetConfig::default(),
            Duration::from_millis(1),
        );

        controller.show("?");
        for _ in 0..500 {
            if controller.showing().is_none() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        assert!(controller.showing().is_none());
        assert_eq!(fake.animations.load(Ordering::SeqCst), 0);
    }
}
