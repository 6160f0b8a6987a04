use alloy::primitives::U256;
use eframe::egui;

use rusty_signer_core::{
    format_grouped, Progress, RequestId, RequestRow, RequestState, StatusMessage,
};

use crate::ui::{self, TxSummary};

/// Renders every row. Returns the id of a row the user clicked.
pub fn render_requests(
    ui: &mut egui::Ui,
    rows: &[RequestRow],
    selected: Option<RequestId>,
) -> Option<RequestId> {
    ui::styled_heading(ui, "Requests");
    if rows.is_empty() {
        ui.label("No pending requests.");
        return None;
    }

    let mut clicked = None;
    for row in rows {
        ui.add_space(4.0);
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            if render_row(ui, row, selected == Some(row.id)) {
                clicked = Some(row.id);
            }
        });
    }
    clicked
}

fn render_row(ui: &mut egui::Ui, row: &RequestRow, is_selected: bool) -> bool {
    let mut clicked = false;
    ui.horizontal(|ui| {
        ui::identity_swatch(ui, row.from, 16.0);
        clicked = ui
            .selectable_label(is_selected, egui::RichText::new(row.id.to_string()).strong())
            .clicked();
        ui.label(egui::RichText::new(ui::short_address(row.from)).monospace());
    });
    ui.label(TxSummary::from_payload(&row.transaction).line());

    match row.progress {
        Progress::Hidden => {}
        Progress::Indeterminate => {
            ui.spinner();
        }
        Progress::Determinate { value, max } => {
            let fraction = row.progress.fraction().unwrap_or(1.0);
            ui.add(egui::ProgressBar::new(fraction).text(format!("{value}/{max}")));
        }
    }

    render_status(ui, row);
    clicked
}

fn render_status(ui: &mut egui::Ui, row: &RequestRow) {
    let headline = row.status.headline();
    match &row.status {
        StatusMessage::Failed { title, text } => {
            ui.colored_label(egui::Color32::RED, headline);
            ui::scrollable_value(ui, text, Some(title.as_str()));
        }
        StatusMessage::Sent { .. } => {
            ui.label(headline);
            if let Some(hash) = row.status.detail() {
                ui.horizontal(|ui| {
                    ui::scrollable_value(ui, &hash, None);
                    if ui.small_button("📋").on_hover_text("Copy to clipboard").clicked() {
                        ui::copy_to_clipboard(&hash);
                    }
                });
            }
        }
        StatusMessage::Mined { .. } => {
            ui.colored_label(egui::Color32::LIGHT_GREEN, headline);
            if let RequestState::Done { block_height } = row.state {
                ui.label(egui::RichText::new(depth_label(block_height)).weak());
            }
        }
        StatusMessage::Pending => {
            ui.label(headline);
        }
    }
}

fn depth_label(block_height: U256) -> String {
    if block_height.is_zero() {
        "in the latest block".to_owned()
    } else if block_height == U256::from(1) {
        "1 block ago".to_owned()
    } else {
        format!("{} blocks ago", format_grouped(block_height))
    }
}
