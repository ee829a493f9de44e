mod style_panel;

pub use style_panel::render_style_form;

use crate::callout::controller::{
    ApplyOutcome, CalloutWindow, ContentHandle, HostWindowHandle, PresentationHost,
};
use crate::callout::geometry::{Point, Rect, Size};
use crate::callout::layout::LayoutError;
use crate::callout::paint::{from_egui_rect, to_egui_rect, EguiHost, EguiSurface, TextureCache};
use crate::callout::settings::CalloutSettings;
use crate::callout::settings_store;
use crate::callout::style::StyleParameters;
use eframe::egui;
use std::path::PathBuf;

const DEMO_CONTENT: ContentHandle = ContentHandle(1);
const DEMO_CANVAS: HostWindowHandle = HostWindowHandle(1);

/// Toolkit-independent part of the demo: the settings being edited and the
/// callout they drive.
pub struct DemoState {
    pub settings: CalloutSettings,
    style: StyleParameters,
    window: Option<CalloutWindow>,
    pub last_error: Option<String>,
}

impl DemoState {
    pub fn new(settings: CalloutSettings) -> Self {
        let (style, last_error) = match settings.to_style() {
            Ok(style) => (style, None),
            Err(e) => (
                StyleParameters::default(),
                Some(format!("Failed to load background: {e:#}")),
            ),
        };
        Self {
            settings,
            style,
            window: None,
            last_error,
        }
    }

    pub fn window(&self) -> Option<&CalloutWindow> {
        self.window.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.window.is_some()
    }

    /// Rebuilds the runtime style after the settings form changed.
    pub fn settings_changed(&mut self) {
        match self.settings.to_style() {
            Ok(style) => {
                self.style = style;
                self.last_error = None;
            }
            Err(e) => self.last_error = Some(format!("Failed to load background: {e:#}")),
        }
    }

    pub fn toggle(&mut self) {
        self.window = match self.window.take() {
            Some(_) => None,
            None => Some(
                CalloutWindow::new(DEMO_CONTENT, Size::new(1.0, 1.0), Point::default())
                    .on_side(self.settings.side),
            ),
        };
    }

    /// Pushes the current settings, target and content size into the
    /// callout. Unchanged input leaves the host untouched.
    pub fn sync<H: PresentationHost>(
        &mut self,
        host: &mut H,
        content_size: Size,
        target: Point,
        canvas: Rect,
    ) -> Result<Option<ApplyOutcome>, LayoutError> {
        let Some(window) = self.window.as_mut() else {
            return Ok(None);
        };
        *window.style_mut() = self.style.clone();
        {
            let attachment = window.attachment_mut();
            attachment.view_size = content_size;
            attachment.screen_rect = Some(canvas);
        }
        window
            .attach(host, target, self.settings.side, Some((DEMO_CANVAS, canvas)))
            .map(Some)
    }
}

pub struct CalloutDemoApp {
    state: DemoState,
    host: EguiHost,
    textures: TextureCache,
    settings_path: Option<PathBuf>,
    text: String,
    target: Point,
}

impl CalloutDemoApp {
    pub fn new(ctx: &egui::Context, settings: CalloutSettings, settings_path: Option<PathBuf>) -> Self {
        Self {
            state: DemoState::new(settings),
            host: EguiHost::new(ctx.clone()),
            textures: TextureCache::default(),
            settings_path,
            text: "Floating callout".to_owned(),
            target: Point::new(200.0, 150.0),
        }
    }

    fn persist(&mut self) {
        let result = match &self.settings_path {
            Some(path) => settings_store::save_to_path(path, &self.state.settings),
            None => settings_store::save(&self.state.settings).map(|_| ()),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to save callout settings");
            self.state.last_error = Some(format!("Failed to save settings: {e:#}"));
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("Callout");
        if render_style_form(ui, &mut self.state.settings, "callout_demo") {
            self.state.settings_changed();
        }
        ui.separator();
        ui.horizontal(|ui| {
            ui.label("Text");
            ui.text_edit_singleline(&mut self.text);
        });
        let label = if self.state.is_visible() {
            "Hide window"
        } else {
            "Show window"
        };
        ui.horizontal(|ui| {
            if ui.button(label).clicked() {
                self.state.toggle();
            }
            if ui.button("Save settings").clicked() {
                self.persist();
            }
        });
        if let Some(err) = &self.state.last_error {
            ui.colored_label(egui::Color32::RED, err);
        }
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 4.0, ui.visuals().extreme_bg_color);

        if let Some(pos) = response.interact_pointer_pos() {
            if response.clicked() {
                self.target = Point::new(pos.x - rect.left(), pos.y - rect.top());
            }
        }
        let target_screen = egui::pos2(rect.left() + self.target.x, rect.top() + self.target.y);
        painter.circle_filled(target_screen, 3.0, egui::Color32::LIGHT_RED);

        let galley = painter.layout_no_wrap(
            self.text.clone(),
            egui::FontId::proportional(14.0),
            egui::Color32::WHITE,
        );
        let content_size = Size::new(galley.size().x.max(1.0), galley.size().y.max(1.0));

        if let Err(e) = self
            .state
            .sync(&mut self.host, content_size, self.target, from_egui_rect(rect))
        {
            self.state.last_error = Some(format!("Layout rejected: {e}"));
        }

        let Some(window) = self.state.window.as_mut() else {
            return;
        };
        let Some(layout) = window.layout().cloned() else {
            return;
        };
        let origin = egui::pos2(layout.window_frame.min_x(), layout.window_frame.min_y());
        let mut surface = EguiSurface::new(&painter, origin, &mut self.textures);
        window.paint(&mut surface);

        let content = to_egui_rect(layout.content_frame_in_working_space());
        painter.galley(content.min, galley, egui::Color32::WHITE);
    }
}

impl eframe::App for CalloutDemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("callout_controls")
            .resizable(false)
            .show(ctx, |ui| self.controls(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.canvas(ui));
    }
}

#[cfg(test)]
mod tests {
    use super::DemoState;
    use crate::callout::controller::{ApplyOutcome, RecordingHost};
    use crate::callout::geometry::{Point, Rect, Size};
    use crate::callout::settings::CalloutSettings;
    use crate::callout::side::Side;

    fn canvas() -> Rect {
        Rect::new(100.0, 50.0, 400.0, 300.0)
    }

    #[test]
    fn hidden_window_skips_layout() {
        let mut state = DemoState::new(CalloutSettings::default());
        let mut host = RecordingHost::default();
        let outcome = state
            .sync(&mut host, Size::new(40.0, 20.0), Point::new(10.0, 10.0), canvas())
            .expect("sync");
        assert_eq!(outcome, None);
        assert_eq!(host.frame_changes, 0);
    }

    #[test]
    fn sync_is_idempotent_between_frames() {
        let mut state = DemoState::new(CalloutSettings::default());
        state.toggle();
        let mut host = RecordingHost::default();
        let size = Size::new(40.0, 20.0);
        let first = state
            .sync(&mut host, size, Point::new(200.0, 150.0), canvas())
            .expect("sync");
        let second = state
            .sync(&mut host, size, Point::new(200.0, 150.0), canvas())
            .expect("sync");
        assert_eq!(first, Some(ApplyOutcome::Updated));
        assert_eq!(second, Some(ApplyOutcome::Unchanged));
        assert_eq!(host.redraw_requests, 1);
    }

    #[test]
    fn settings_change_reaches_the_window() {
        let mut state = DemoState::new(CalloutSettings::default());
        state.toggle();
        let mut host = RecordingHost::default();
        let size = Size::new(40.0, 20.0);
        state
            .sync(&mut host, size, Point::new(200.0, 150.0), canvas())
            .expect("sync");

        state.settings.side = Side::Right;
        state.settings.corner_radius = 3.0;
        state.settings_changed();
        state
            .sync(&mut host, size, Point::new(200.0, 150.0), canvas())
            .expect("sync");

        let window = state.window().expect("visible");
        let layout = window.layout().expect("layout");
        assert_eq!(layout.side, Side::Right);
        assert_eq!(layout.corner_radius, 3.0);
        assert_eq!(host.redraw_requests, 2);
    }

    #[test]
    fn toggle_hides_and_shows() {
        let mut state = DemoState::new(CalloutSettings::default());
        assert!(!state.is_visible());
        state.toggle();
        assert!(state.is_visible());
        state.toggle();
        assert!(!state.is_visible());
    }
}
