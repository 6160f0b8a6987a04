//! Confirmation form for the selected request.
//!
//! The [`ConfirmForm`] model decides what is shown and what a confirmation
//! produces; this view renders it, runs the nonce lookup and keyfile reads on
//! worker threads and hands finished payloads back to the app.

use std::path::PathBuf;

use alloy::primitives::{Address, U256};
use eframe::egui;

use rusty_signer_core::{
    AccountKind, ConfirmForm, ConfirmOutcome, ConfirmPayload, FormError, FormKey, FormProps,
    KeyfileError, NoncePort, NonceRequest, PortError, QrPhase,
};

use crate::bridge::SignerBridge;
use crate::qr_view::{self, QrCache};
use crate::state::Slot;
use crate::ui;

const QR_SIDE: f32 = 260.0;

pub struct ConfirmView {
    form: ConfirmForm,
    hardware_attached: bool,
    keyfile_path: String,
    keyfile_loading: bool,
    scan_input: String,
    nonce_slot: Slot<(u64, Result<U256, PortError>)>,
    keyfile_slot: Slot<Result<String, KeyfileError>>,
    qr_cache: QrCache,
}

impl ConfirmView {
    pub fn new(form: ConfirmForm) -> Self {
        Self {
            form,
            hardware_attached: false,
            keyfile_path: String::new(),
            keyfile_loading: false,
            scan_input: String::new(),
            nonce_slot: Slot::new(),
            keyfile_slot: Slot::new(),
            qr_cache: QrCache::default(),
        }
    }

    /// Prefills the keyfile path without reading it.
    pub fn with_keyfile_path(mut self, path: impl Into<String>) -> Self {
        self.keyfile_path = path.into();
        self
    }

    /// Account and path of a keyfile that parsed, for remembering.
    pub fn loaded_keyfile(&self) -> Option<(Address, &str)> {
        let path = self.keyfile_path.trim();
        (self.form.wallet().is_some() && !path.is_empty())
            .then(|| (self.form.account().address, path))
    }

    pub fn blur(&mut self) {
        let props = FormProps {
            focus: false,
            ..self.form.props()
        };
        self.form.set_props(props);
    }

    /// Hardware accounts stay disabled until the device is marked attached.
    fn props(&self, is_sending: bool, focus: bool) -> FormProps {
        FormProps {
            disabled: matches!(self.form.account().kind, AccountKind::Hardware)
                && !self.hardware_attached,
            is_sending,
            focus,
        }
    }

    /// Applies worker results that arrived since the last frame.
    pub fn check_worker_results(&mut self) {
        if let Some((ticket, result)) = self.nonce_slot.take() {
            let id = self.form.request_id();
            match self.form.nonce_resolved(ticket, result) {
                Ok(phase) => tracing::info!(request = %id, %phase, "qr payload ready"),
                Err(FormError::StaleNonce { ticket }) => {
                    tracing::debug!(request = %id, ticket, "dropped stale nonce result")
                }
                Err(e) => tracing::warn!(request = %id, error = %e, "nonce lookup failed"),
            }
        }

        if let Some(result) = self.keyfile_slot.take() {
            self.keyfile_loading = false;
            match result {
                Ok(text) => self.form.select_keyfile(Some(&text)),
                Err(e) => {
                    tracing::warn!(error = %e, "keyfile read failed");
                    self.form.keyfile_failed(e);
                }
            }
        }
    }

    /// Renders the form. Returns a payload once the user confirmed.
    pub fn render(
        &mut self,
        ui: &mut egui::Ui,
        bridge: &SignerBridge,
        is_sending: bool,
        focus: bool,
    ) -> Option<ConfirmPayload> {
        self.check_worker_results();
        let focus_gained = self.form.set_props(self.props(is_sending, focus));

        self.render_account(ui);
        let mut outcome = None;
        let mut submitted = None;

        if let Some(prompt) = self.form.password_prompt() {
            ui.add_space(6.0);
            ui.label(egui::RichText::new(prompt.label).strong());
            let tooltip = self.form.password_tooltip();
            let mut response = ui.add_enabled(
                !is_sending,
                egui::TextEdit::singleline(self.form.password_mut())
                    .password(true)
                    .hint_text(prompt.hint)
                    .desired_width(280.0),
            );
            if let Some(tooltip) = tooltip {
                response = response.on_hover_text(tooltip);
            }
            if focus_gained {
                response.request_focus();
            }
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                outcome = self.form.on_key_down(FormKey::Enter).transpose();
            }
        }

        if self.form.shows_keyfile_input() {
            self.render_keyfile_input(ui, bridge);
        }

        if let Some(qr_value) = self.form.qr_code_value().map(str::to_owned) {
            self.render_qr(ui, &qr_value);
        }

        if self.form.shows_scanner() {
            submitted = self.render_scanner(ui);
        }

        if self.form.qr_phase() == QrPhase::Completed {
            ui.colored_label(
                egui::Color32::LIGHT_GREEN,
                "Signed transaction forwarded to the signer.",
            );
        }

        if let Some(err) = self.form.last_error().map(str::to_owned) {
            ui.horizontal(|ui| {
                ui.colored_label(egui::Color32::RED, err);
                if ui.small_button("Dismiss").clicked() {
                    self.form.dismiss_error();
                }
            });
        }

        ui.add_space(8.0);
        if let Some(hint) = self.form.hint() {
            ui.label(egui::RichText::new(hint.message()).weak());
        }

        if let Some(label) = self.form.confirm_label() {
            ui.horizontal(|ui| {
                let button = ui.add_enabled(self.form.can_confirm(), egui::Button::new(label));
                if button.clicked() {
                    outcome = Some(self.form.confirm());
                }
                if self.form.is_generating() || is_sending {
                    ui.spinner();
                }
            });
        }

        if let Some(outcome) = outcome {
            submitted = submitted.or(self.apply_outcome(ui.ctx(), bridge, outcome));
        }
        submitted
    }

    fn render_account(&mut self, ui: &mut egui::Ui) {
        let account = self.form.account();
        let kind = match account.kind {
            AccountKind::External => "external signer",
            AccountKind::Hardware => "hardware wallet",
            AccountKind::Unlocked { .. } => "node account",
            AccountKind::Keyfile => "keyfile account",
        };
        let address = account.address;
        let name = account.meta.name.clone();

        ui.horizontal(|ui| {
            ui::identity_swatch(ui, address, 20.0);
            if let Some(name) = name {
                ui.strong(name);
            }
            ui.label(egui::RichText::new(address.to_checksum(None)).monospace());
            ui.label(egui::RichText::new(format!("({kind})")).weak());
        });

        if matches!(self.form.account().kind, AccountKind::Hardware) {
            ui.checkbox(&mut self.hardware_attached, "Hardware device attached");
        }
    }

    fn render_keyfile_input(&mut self, ui: &mut egui::Ui, bridge: &SignerBridge) {
        ui.add_space(6.0);
        ui.label(egui::RichText::new("Wallet file").strong());
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.keyfile_path)
                    .hint_text("path to keyfile, or drop it on the window")
                    .desired_width(280.0),
            );
            let path = self.keyfile_path.trim();
            if ui
                .add_enabled(!path.is_empty(), egui::Button::new("Load"))
                .clicked()
            {
                let path = PathBuf::from(path);
                self.spawn_keyfile_read(ui.ctx(), bridge, path);
            }
            if ui.button("Clear").clicked() {
                self.keyfile_path.clear();
                self.form.select_keyfile(None);
            }
            if self.keyfile_loading {
                ui.spinner();
            }
        });

        let dropped = ui
            .ctx()
            .input(|i| i.raw.dropped_files.iter().find_map(|f| f.path.clone()));
        if let Some(path) = dropped {
            self.keyfile_path = path.display().to_string();
            self.spawn_keyfile_read(ui.ctx(), bridge, path);
        }

        if let Some(err) = self.form.wallet_error() {
            ui.colored_label(egui::Color32::RED, err.to_string());
        } else if self.form.wallet().is_some() {
            ui.colored_label(egui::Color32::LIGHT_GREEN, "Wallet file loaded");
        }
    }

    fn render_qr(&mut self, ui: &mut egui::Ui, value: &str) {
        ui::section_header(ui, "Transaction QR");
        match self.qr_cache.get(value) {
            Some(code) => {
                qr_view::paint_qr(ui, code, QR_SIDE);
            }
            None => {
                ui.colored_label(egui::Color32::RED, "Transaction too large for a QR code");
            }
        }
        if let Some(payload) = self.form.qr_payload() {
            ui.label(format!("nonce {}", payload.nonce));
            ui.horizontal(|ui| {
                ui::scrollable_value(ui, &payload.rlp, Some("unsigned transaction (RLP)"));
                if ui.small_button("📋").on_hover_text("Copy to clipboard").clicked() {
                    ui::copy_to_clipboard(value);
                }
            });
        }
    }

    fn render_scanner(&mut self, ui: &mut egui::Ui) -> Option<ConfirmPayload> {
        ui::section_header(ui, "Signed QR");
        let mut submitted = None;
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.scan_input)
                    .hint_text("scanned signature")
                    .desired_width(320.0)
                    .font(egui::TextStyle::Monospace),
            );
            if ui.button("Submit").clicked() {
                match self.form.scan_received(self.scan_input.trim()) {
                    Ok(payload) => {
                        tracing::info!(request = %self.form.request_id(), "signed qr received");
                        submitted = Some(payload);
                    }
                    Err(e) => tracing::warn!(error = %e, "scan rejected"),
                }
            }
        });
        submitted
    }

    fn apply_outcome(
        &mut self,
        ctx: &egui::Context,
        bridge: &SignerBridge,
        outcome: Result<ConfirmOutcome, FormError>,
    ) -> Option<ConfirmPayload> {
        let id = self.form.request_id();
        match outcome {
            Ok(ConfirmOutcome::FetchNonce(request)) => {
                tracing::info!(request = %id, ticket = request.ticket, "fetching nonce");
                self.spawn_nonce_lookup(ctx, bridge, request);
                None
            }
            Ok(ConfirmOutcome::PhaseChanged(phase)) => {
                tracing::info!(request = %id, %phase, "qr phase changed");
                None
            }
            Ok(ConfirmOutcome::Submit(payload)) => Some(payload),
            Err(FormError::Disabled) => None,
            Err(e) => {
                tracing::warn!(request = %id, error = %e, "confirm rejected");
                None
            }
        }
    }

    fn spawn_nonce_lookup(&self, ctx: &egui::Context, bridge: &SignerBridge, request: NonceRequest) {
        let node = bridge.node();
        let slot = self.nonce_slot.clone();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let result = node.next_nonce(request.address);
            slot.put((request.ticket, result));
            ctx.request_repaint();
        });
    }

    fn spawn_keyfile_read(&mut self, ctx: &egui::Context, bridge: &SignerBridge, path: PathBuf) {
        self.keyfile_loading = true;
        let reader = bridge.keyfiles();
        let slot = self.keyfile_slot.clone();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            slot.put(reader.read(&path));
            ctx.request_repaint();
        });
    }
}
