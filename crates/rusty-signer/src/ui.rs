//! UI helper components

use alloy::primitives::{keccak256, utils::format_ether, Address, U256};
use eframe::egui;

use rusty_signer_core::TxPayload;

/// Styled heading with accent color
pub fn styled_heading(ui: &mut egui::Ui, text: &str) {
    ui.heading(egui::RichText::new(text).color(egui::Color32::from_rgb(0, 212, 170)));
}

/// Section header with separator
pub fn section_header(ui: &mut egui::Ui, text: &str) {
    ui.add_space(10.0);
    ui.label(egui::RichText::new(text).strong().size(14.0));
    ui.separator();
}

pub fn copy_to_clipboard(text: &str) {
    match arboard::Clipboard::new() {
        Ok(mut clipboard) => {
            if let Err(e) = clipboard.set_text(text) {
                tracing::warn!(error = %e, "clipboard write failed");
            }
        }
        Err(e) => tracing::warn!(error = %e, "clipboard unavailable"),
    }
}

/// Compact read-only field for long values. Scrolls horizontally instead of
/// wrapping; `title` is shown on hover.
pub fn scrollable_value(ui: &mut egui::Ui, value: &str, title: Option<&str>) -> egui::Response {
    let response = ui.add(
        egui::TextEdit::singleline(&mut &*value)
            .desired_width(260.0)
            .font(egui::TextStyle::Monospace),
    );
    match title {
        Some(title) => response.on_hover_text(title),
        None => response,
    }
}

/// Color derived from the address hash, so the same sender always looks the same.
pub fn identity_color(address: Address) -> egui::Color32 {
    let hash = keccak256(address);
    egui::Color32::from_rgb(64 + hash[0] / 2, 64 + hash[1] / 2, 64 + hash[2] / 2)
}

pub fn identity_swatch(ui: &mut egui::Ui, address: Address, size: f32) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(egui::Vec2::splat(size), egui::Sense::hover());
    ui.painter()
        .circle_filled(rect.center(), size / 2.0, identity_color(address));
    response.on_hover_text(address.to_checksum(None))
}

pub fn short_address(address: Address) -> String {
    let full = address.to_checksum(None);
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}

/// Ether amount without trailing zeros.
pub fn format_value(wei: U256) -> String {
    let formatted = format_ether(wei);
    let trimmed = if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted.as_str()
    };
    format!("{trimmed} ETH")
}

/// One-line description of what a request does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxSummary {
    pub recipient: String,
    pub value: String,
    pub method: Option<String>,
}

impl TxSummary {
    pub fn from_payload(tx: &TxPayload) -> Self {
        let recipient = match tx.to {
            Some(to) => short_address(to),
            None => "contract creation".to_owned(),
        };
        let method = (tx.to.is_some() && tx.data.len() >= 4)
            .then(|| alloy::primitives::hex::encode_prefixed(&tx.data[..4]));
        Self {
            recipient,
            value: format_value(tx.value),
            method,
        }
    }

    pub fn line(&self) -> String {
        match &self.method {
            Some(method) => format!("{} to {} calling {}", self.value, self.recipient, method),
            None => format!("{} to {}", self.value, self.recipient),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Bytes;

    fn payload(to: Option<Address>, value: U256, data: &'static [u8]) -> TxPayload {
        TxPayload {
            from: Address::ZERO,
            to,
            value,
            gas: U256::ZERO,
            gas_price: U256::ZERO,
            data: Bytes::from_static(data),
            nonce: None,
        }
    }

    #[test]
    fn values_drop_trailing_zeros() {
        assert_eq!(format_value(U256::ZERO), "0 ETH");
        assert_eq!(
            format_value(U256::from(1_500_000_000_000_000_000u128)),
            "1.5 ETH"
        );
        assert_eq!(format_value(U256::from(1)), "0.000000000000000001 ETH");
    }

    #[test]
    fn summary_names_creation_and_selector() {
        let creation = TxSummary::from_payload(&payload(None, U256::ZERO, &[0x60, 0x80, 0x60, 0x40]));
        assert_eq!(creation.recipient, "contract creation");
        assert_eq!(creation.method, None);

        let to = Address::repeat_byte(0xab);
        let call = TxSummary::from_payload(&payload(
            Some(to),
            U256::ZERO,
            &[0xa9, 0x05, 0x9c, 0xbb, 0x00],
        ));
        assert_eq!(call.method.as_deref(), Some("0xa9059cbb"));
        assert!(call.line().ends_with("calling 0xa9059cbb"));

        let short_data = TxSummary::from_payload(&payload(Some(to), U256::ZERO, &[0x01]));
        assert_eq!(short_data.method, None);
    }

    #[test]
    fn identity_color_is_stable_per_address() {
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        assert_eq!(identity_color(a), identity_color(a));
        assert_ne!(identity_color(a), identity_color(b));
    }

    #[test]
    fn short_address_keeps_both_ends() {
        let short = short_address(Address::repeat_byte(0xab));
        assert!(short.starts_with("0x"));
        assert_eq!(short.chars().count(), 11);
    }
}
