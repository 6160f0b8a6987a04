//! Main application state and update loop

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::U256;
use eframe::egui;

use rusty_signer_core::{
    format_grouped, request_rows, BlockNumberPort, ConfirmForm, ConfirmPayload, PortError,
    RequestId, SignerContext,
};

use crate::bridge::SignerBridge;
use crate::confirm_view::ConfirmView;
use crate::requests_view;
use crate::state::{SignerPrefs, SignerUiState, Slot, PREFS_KEY};
use crate::ui;

pub struct App {
    bridge: SignerBridge,
    ui_state: SignerUiState,
    prefs: SignerPrefs,
    /// Last chain head reported by the poller
    block_number: U256,
    /// Async block poll result receiver
    block_result: Slot<Result<U256, PortError>>,
    /// Stops the poller thread when the app goes away
    poller_stop: Arc<AtomicBool>,
}

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, bridge: SignerBridge) -> Self {
        let prefs = cc
            .storage
            .and_then(|storage| eframe::get_value::<SignerPrefs>(storage, PREFS_KEY))
            .unwrap_or_default();
        let block_result = Slot::new();
        let poller_stop = Arc::new(AtomicBool::new(false));
        spawn_block_poller(
            cc.egui_ctx.clone(),
            bridge.clone(),
            block_result.clone(),
            Arc::clone(&poller_stop),
        );

        Self {
            bridge,
            ui_state: SignerUiState::default(),
            prefs,
            block_number: U256::ZERO,
            block_result,
            poller_stop,
        }
    }

    fn check_block_result(&mut self) {
        let Some(result) = self.block_result.take() else {
            return;
        };
        match result {
            Ok(block_number) => self.block_number = block_number,
            Err(e) => {
                tracing::warn!(error = %e, "block number poll failed");
                self.ui_state
                    .set_error(format!("Unable to fetch the latest block: {e}"));
            }
        }
    }

    fn snapshot(&mut self) -> SignerContext {
        match self.bridge.context(self.block_number) {
            Ok(ctx) => ctx,
            Err(e) => {
                self.ui_state.set_error(format!("Unable to read requests: {e}"));
                SignerContext::new(self.block_number, BTreeMap::new())
            }
        }
    }

    fn submit(&mut self, id: RequestId, payload: ConfirmPayload) {
        match self.bridge.confirm(id, payload) {
            Ok(()) => {
                tracing::info!(request = %id, "request confirmed");
                self.ui_state.sending.insert(id);
                self.ui_state.set_info(format!("Request {id} confirmed"));
            }
            Err(e) => {
                tracing::warn!(request = %id, error = %e, "confirm sink rejected payload");
                self.ui_state.set_error(format!("Unable to confirm request {id}: {e}"));
            }
        }
    }

    fn render_header(&mut self, ui: &mut egui::Ui) {
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.heading(
                egui::RichText::new("🔏 Rusty-Signer")
                    .size(22.0)
                    .color(egui::Color32::from_rgb(0, 212, 170)),
            );
            ui.add_space(30.0);
            ui.separator();
            ui.label(format!("Block #{}", format_grouped(self.block_number)));
            if self.bridge.is_offline() {
                ui.label(egui::RichText::new("offline node").weak());
                if ui.button("Advance block").clicked() {
                    match self.bridge.advance_block(self.block_number) {
                        Ok(next) => self.block_number = next,
                        Err(e) => self.ui_state.set_error(e.to_string()),
                    }
                }
            }
        });
        ui.add_space(4.0);

        if let Some(err) = self.ui_state.last_error.clone() {
            ui.horizontal(|ui| {
                ui.colored_label(egui::Color32::RED, err);
                if ui.small_button("✕").clicked() {
                    self.ui_state.clear_notice();
                }
            });
        }
        if let Some(info) = self.ui_state.last_info.clone() {
            ui.colored_label(egui::Color32::LIGHT_GREEN, info);
        }
    }

    fn render_selected(&mut self, ui: &mut egui::Ui, ctx: &SignerContext) {
        let Some(id) = self.ui_state.selected else {
            ui::styled_heading(ui, "Confirm");
            ui.label("Select a request to confirm it.");
            return;
        };
        let Some(request) = ctx.requests.get(&id) else {
            return;
        };

        ui::styled_heading(ui, &format!("Confirm request {id}"));
        ui.add_space(8.0);

        let is_sending = self.ui_state.sending.contains(&id);
        let bridge = &self.bridge;
        let prefs = &mut self.prefs;
        let view = self.ui_state.views.entry(id).or_insert_with(|| {
            let account = bridge.account_for(request.transaction.from);
            let remembered = prefs
                .keyfile_paths
                .get(&account.address)
                .cloned()
                .unwrap_or_default();
            ConfirmView::new(ConfirmForm::new(id, account, request.transaction.clone()))
                .with_keyfile_path(remembered)
        });
        let payload = view.render(ui, bridge, is_sending, true);
        if let Some((address, path)) = view.loaded_keyfile() {
            prefs.keyfile_paths.insert(address, path.to_owned());
        }

        if self.bridge.is_offline() {
            self.render_simulation(ui, id);
        }
        if let Some(payload) = payload {
            self.submit(id, payload);
        }
    }

    /// Lifecycle controls standing in for the network when no node is configured.
    fn render_simulation(&mut self, ui: &mut egui::Ui, id: RequestId) {
        ui.add_space(12.0);
        egui::CollapsingHeader::new("Offline simulation")
            .default_open(false)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let mut result = Ok(());
                    if ui.button("Mark sent").clicked() {
                        result = self.bridge.simulate_sent(id);
                    }
                    if ui.button("Mark mined").clicked() {
                        result = self.bridge.simulate_mined(id, self.block_number);
                    }
                    if ui.button("Mark failed").clicked() {
                        result = self.bridge.simulate_failed(id);
                    }
                    if let Err(e) = result {
                        self.ui_state.set_error(e.to_string());
                    }
                });
            });
    }
}

impl eframe::App for App {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, PREFS_KEY, &self.prefs);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        self.check_block_result();
        let snapshot = self.snapshot();
        self.ui_state.settle(&snapshot);
        for view in self.ui_state.views.values_mut() {
            view.check_worker_results();
        }
        let rows = request_rows(&snapshot);

        egui::TopBottomPanel::top("header").show(ctx, |ui| self.render_header(ui));

        egui::SidePanel::left("requests")
            .resizable(true)
            .default_width(380.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    if let Some(id) =
                        requests_view::render_requests(ui, &rows, self.ui_state.selected)
                    {
                        self.ui_state.select(id);
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(10.0);
                self.render_selected(ui, &snapshot);
                ui.add_space(20.0);
            });
        });
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.poller_stop.store(true, Ordering::Relaxed);
    }
}

fn spawn_block_poller(
    ctx: egui::Context,
    bridge: SignerBridge,
    slot: Slot<Result<U256, PortError>>,
    stop: Arc<AtomicBool>,
) {
    let node = bridge.node();
    let interval = bridge.poll_interval();
    std::thread::spawn(move || {
        while !stop.load(Ordering::Relaxed) {
            slot.put(node.block_number());
            ctx.request_repaint();
            sleep_unless_stopped(interval, &stop);
        }
        tracing::debug!("block poller stopped");
    });
}

fn sleep_unless_stopped(interval: Duration, stop: &AtomicBool) {
    let step = Duration::from_millis(100);
    let mut slept = Duration::ZERO;
    while slept < interval && !stop.load(Ordering::Relaxed) {
        std::thread::sleep(step);
        slept += step;
    }
}
