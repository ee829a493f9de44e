use crate::callout::paint::{from_color32, to_color32};
use crate::callout::settings::CalloutSettings;
use crate::callout::side::{Side, ALL_SIDES};
use crate::callout::style::Color;
use eframe::egui;

fn select_side(current: &mut Side, next: Side) -> bool {
    if *current == next {
        false
    } else {
        *current = next;
        true
    }
}

fn color_row(ui: &mut egui::Ui, label: &str, color: &mut Color) -> bool {
    let mut edited = to_color32(*color);
    let changed = ui
        .horizontal(|ui| {
            ui.label(label);
            ui.color_edit_button_srgba(&mut edited).changed()
        })
        .inner;
    if changed {
        *color = from_color32(edited);
    }
    changed
}

/// Controls for every callout style field. Returns true when anything changed.
pub fn render_style_form(ui: &mut egui::Ui, settings: &mut CalloutSettings, id_source: &str) -> bool {
    let mut changed = false;

    ui.horizontal(|ui| {
        ui.label("Side");
        egui::ComboBox::from_id_source(format!("{id_source}_side"))
            .selected_text(settings.side.label())
            .show_ui(ui, |ui| {
                for side in ALL_SIDES {
                    if ui
                        .selectable_label(settings.side == side, side.label())
                        .clicked()
                    {
                        changed |= select_side(&mut settings.side, side);
                    }
                }
            });
    });

    changed |= color_row(ui, "Border color", &mut settings.border_color);
    changed |= color_row(ui, "Background color", &mut settings.background_color);

    changed |= ui
        .add(egui::Slider::new(&mut settings.view_margin, 0.0..=30.0).text("View margin"))
        .changed();
    changed |= ui
        .add(egui::Slider::new(&mut settings.border_width, 0.0..=15.0).text("Border width"))
        .changed();
    changed |= ui
        .add(egui::Slider::new(&mut settings.corner_radius, 0.0..=40.0).text("Corner radius"))
        .changed();

    changed |= ui.checkbox(&mut settings.has_arrow, "Has arrow").changed();
    ui.add_enabled_ui(settings.has_arrow, |ui| {
        changed |= ui
            .checkbox(
                &mut settings.draws_round_corner_beside_arrow,
                "Round corner beside arrow",
            )
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(&mut settings.arrow_base_width, 0.0..=60.0)
                    .text("Arrow base width"),
            )
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut settings.arrow_height, 0.0..=40.0).text("Arrow height"))
            .changed();
    });

    changed |= ui
        .add(egui::Slider::new(&mut settings.distance, 0.0..=40.0).text("Distance"))
        .changed();

    if changed {
        settings.sanitize();
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::select_side;
    use crate::callout::side::Side;

    #[test]
    fn selecting_the_same_side_is_not_a_change() {
        let mut side = Side::Top;
        assert!(!select_side(&mut side, Side::Top));
        assert!(select_side(&mut side, Side::BottomLeft));
        assert_eq!(side, Side::BottomLeft);
    }
}
