use eframe::egui;
use floating_callout::callout::settings_store;
use floating_callout::gui::CalloutDemoApp;
use floating_callout::logging;

fn main() -> anyhow::Result<()> {
    let settings_path = settings_store::resolve_settings_path()?;
    let settings = match settings_store::load_from_path(&settings_path) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("failed to load callout settings, using defaults: {e:#}");
            Default::default()
        }
    };
    logging::init(settings.debug_logging, None);
    tracing::info!(path = %settings_path.display(), "starting callout demo");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 560.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Callout Demo",
        native_options,
        Box::new(move |cc| Box::new(CalloutDemoApp::new(&cc.egui_ctx, settings, Some(settings_path)))),
    )
    .map_err(|e| anyhow::anyhow!("run callout demo window: {e}"))
}
