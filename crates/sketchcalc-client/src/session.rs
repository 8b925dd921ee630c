//! A drawing session: canvas, input, theme and recognition wired together.

use crate::client::{RecognitionClient, RecognitionEvent};
use crate::config::ClientConfig;
use crate::encode::encode_canvas;
use crate::protocol::{CalculateRequest, Variables};
use kurbo::Point;
use sketchcalc_core::canvas::{CanvasConfig, SketchCanvas};
use sketchcalc_core::input::{InputState, KeyEvent, PointerEvent};
use sketchcalc_core::layout::{estimate_label_width, place_results};
use sketchcalc_core::results::RecognitionResult;
use sketchcalc_core::storage::{Storage, StorageResult};
use sketchcalc_core::theme::{Theme, ThemeStore};

/// Everything a front end needs to drive one canvas.
pub struct Session<S: Storage> {
    canvas: SketchCanvas,
    input: InputState,
    themes: ThemeStore<S>,
    system_prefers_dark: bool,
    client: RecognitionClient,
    /// Variables bound by `assign` results, sent with every submission.
    vars: Variables,
    /// Id of the submission whose answer will be shown.
    pending: Option<u64>,
    /// `message` of the last non-success response.
    status_message: Option<String>,
}

impl<S: Storage> Session<S> {
    pub fn new(
        canvas_config: &CanvasConfig,
        client_config: ClientConfig,
        storage: S,
        system_prefers_dark: bool,
    ) -> Self {
        let themes = ThemeStore::load(storage);
        let colors = themes.canvas_colors(system_prefers_dark);
        Self {
            canvas: SketchCanvas::new(canvas_config, colors),
            input: InputState::new(),
            themes,
            system_prefers_dark,
            client: RecognitionClient::new(client_config),
            vars: Variables::new(),
            pending: None,
            status_message: None,
        }
    }

    pub fn canvas(&self) -> &SketchCanvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut SketchCanvas {
        &mut self.canvas
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        self.input.handle_pointer_event(event, &mut self.canvas);
    }

    pub fn handle_key_event(&mut self, event: KeyEvent) {
        self.input.handle_key_event(event);
    }

    pub fn theme(&self) -> Theme {
        self.themes.theme()
    }

    /// Select and persist a theme, repainting the canvas background.
    pub fn set_theme(&mut self, theme: Theme) -> StorageResult<()> {
        let result = self.themes.set(theme);
        self.apply_theme();
        result
    }

    /// Track the operating system preference used by [`Theme::System`].
    pub fn set_system_prefers_dark(&mut self, prefers_dark: bool) {
        self.system_prefers_dark = prefers_dark;
        self.apply_theme();
    }

    fn apply_theme(&mut self) {
        self.canvas
            .set_colors(self.themes.canvas_colors(self.system_prefers_dark));
    }

    pub fn vars(&self) -> &Variables {
        &self.vars
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Message of the last response that did not report success.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Send the canvas for recognition.
    ///
    /// Does nothing on an empty canvas. Clears the shown results; the new
    /// ones arrive through [`Session::poll`]. Returns the request id.
    pub fn submit(&mut self) -> Option<u64> {
        if !self.canvas.has_content() {
            log::debug!("Nothing drawn, skipping submission");
            return None;
        }

        self.canvas.clear_results();
        self.status_message = None;

        let config = self.client.config();
        let encoded =
            encode_canvas(&self.canvas, config.max_image_dimension, config.jpeg_quality);
        let image = match encoded {
            Ok(image) => image,
            Err(e) => {
                log::error!("Failed to encode canvas: {}", e);
                self.pending = None;
                self.canvas.set_results(vec![RecognitionResult::failure()]);
                return None;
            }
        };

        let request_id = self.client.submit(CalculateRequest {
            image,
            dict_of_vars: self.vars.clone(),
        });
        self.pending = Some(request_id);
        Some(request_id)
    }

    /// Apply finished requests. Returns true if the results changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        for event in self.client.poll() {
            changed |= self.apply_event(event);
        }
        changed
    }

    /// Block until the pending request finishes and apply it.
    pub fn wait(&mut self) -> bool {
        while self.pending.is_some() {
            match self.client.wait() {
                Some(event) => {
                    if self.apply_event(event) {
                        return true;
                    }
                }
                None => break,
            }
        }
        false
    }

    fn apply_event(&mut self, event: RecognitionEvent) -> bool {
        if self.pending != Some(event.request_id()) {
            log::debug!("Discarding stale response {}", event.request_id());
            return false;
        }
        self.pending = None;

        match event {
            RecognitionEvent::Completed { response, .. } => {
                if response.is_success() {
                    response.bind_variables(&mut self.vars);
                    let results = response.into_results(self.canvas.last_point());
                    log::info!("Received {} result(s)", results.len());
                    self.canvas.set_results(results);
                } else {
                    log::warn!(
                        "Recognition returned status {}: {}",
                        response.status,
                        response.message
                    );
                    self.status_message = Some(response.message);
                    self.canvas.clear_results();
                }
            }
            RecognitionEvent::Failed { error, .. } => {
                log::error!("Recognition failed: {}", error);
                self.canvas.set_results(vec![RecognitionResult::failure()]);
            }
        }
        true
    }

    pub fn results(&self) -> &[RecognitionResult] {
        self.canvas.results()
    }

    /// Where each result should be drawn, in canvas coordinates.
    pub fn result_positions(&self) -> Vec<Point> {
        place_results(self.canvas.results(), self.canvas.size(), estimate_label_width)
    }

    pub fn undo(&mut self) -> bool {
        self.canvas.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.canvas.redo()
    }

    /// Clear the canvas, results and bound variables.
    pub fn reset(&mut self) {
        self.canvas.reset();
        self.vars.clear();
        self.pending = None;
        self.status_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchcalc_core::raster::Rgba;
    use sketchcalc_core::storage::MemoryStorage;
    use sketchcalc_core::theme::THEME_KEY;
    use std::sync::Arc;

    fn session(storage: Arc<MemoryStorage>) -> Session<Arc<MemoryStorage>> {
        let config = CanvasConfig {
            width: 64,
            height: 64,
            ..CanvasConfig::default()
        };
        Session::new(
            &config,
            ClientConfig::default().with_api_url("http://127.0.0.1:9"),
            storage,
            true,
        )
    }

    fn draw_line(session: &mut Session<Arc<MemoryStorage>>) {
        session.handle_pointer_event(PointerEvent::Down { position: Point::new(5.0, 5.0) });
        session.handle_pointer_event(PointerEvent::Move { position: Point::new(40.0, 5.0) });
        session.handle_pointer_event(PointerEvent::Up { position: Point::new(40.0, 5.0) });
    }

    #[test]
    fn test_submit_empty_canvas_is_skipped() {
        let mut session = session(Arc::new(MemoryStorage::new()));
        assert_eq!(session.submit(), None);
        assert!(!session.is_pending());
    }

    #[test]
    fn test_unreachable_service_yields_error_result() {
        let mut session = session(Arc::new(MemoryStorage::new()));
        draw_line(&mut session);

        assert!(session.submit().is_some());
        assert!(session.wait());

        assert_eq!(session.results().len(), 1);
        assert!(session.results()[0].is_error());
        assert_eq!(session.results()[0].answer, "Failed to process input");
        assert!(!session.is_pending());
    }

    #[test]
    fn test_theme_is_loaded_and_persisted() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(THEME_KEY, "light").unwrap();

        let mut session = session(storage.clone());
        assert_eq!(session.theme(), Theme::Light);
        assert!(session.canvas().pixels().is_uniform(Rgba::WHITE));

        session.set_theme(Theme::Dark).unwrap();
        assert_eq!(storage.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert!(session.canvas().pixels().is_uniform(Rgba::BLACK));
    }

    #[test]
    fn test_ink_stays_visible_after_theme_switch() {
        let mut session = session(Arc::new(MemoryStorage::new()));
        draw_line(&mut session);
        session.set_theme(Theme::Light).unwrap();
        session.handle_pointer_event(PointerEvent::Down { position: Point::new(5.0, 30.0) });
        session.handle_pointer_event(PointerEvent::Move { position: Point::new(40.0, 30.0) });
        session.handle_pointer_event(PointerEvent::Up { position: Point::new(40.0, 30.0) });

        let canvas = session.canvas();
        let colors = canvas.colors();
        assert_eq!(canvas.pen().color, colors.foreground);
        assert_ne!(canvas.pixels().get(20, 5), Some(colors.background));
        assert_ne!(canvas.pixels().get(20, 30), Some(colors.background));
    }

    #[test]
    fn test_system_theme_follows_preference() {
        let mut session = session(Arc::new(MemoryStorage::new()));
        assert_eq!(session.theme(), Theme::System);
        assert!(session.canvas().pixels().is_uniform(Rgba::BLACK));

        session.set_system_prefers_dark(false);
        assert!(session.canvas().pixels().is_uniform(Rgba::WHITE));
    }

    #[test]
    fn test_reset_clears_vars_and_results() {
        let mut session = session(Arc::new(MemoryStorage::new()));
        draw_line(&mut session);
        session.submit();
        session.wait();

        session.reset();
        assert!(session.results().is_empty());
        assert!(session.vars().is_empty());
        assert!(!session.canvas().has_content());
    }
}
