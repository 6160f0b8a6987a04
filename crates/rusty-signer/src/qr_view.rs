//! Paints the unsigned transaction QR.

use eframe::egui;
use qrcodegen::{QrCode, QrCodeEcc};

/// Light modules around the code, in module units.
const QUIET_ZONE: i32 = 2;

/// Highest error correction that still fits the payload.
pub fn encode(text: &str) -> Option<QrCode> {
    [QrCodeEcc::Quartile, QrCodeEcc::Medium, QrCodeEcc::Low]
        .into_iter()
        .find_map(|ecc| QrCode::encode_text(text, ecc).ok())
}

/// Encoded code for the last value shown, so the frame loop does not
/// re-encode on every repaint.
#[derive(Default)]
pub struct QrCache {
    entry: Option<(String, Option<QrCode>)>,
}

impl QrCache {
    pub fn get(&mut self, value: &str) -> Option<&QrCode> {
        let stale = self
            .entry
            .as_ref()
            .map_or(true, |(cached, _)| cached != value);
        if stale {
            let code = encode(value);
            if code.is_none() {
                tracing::warn!(len = value.len(), "qr payload too long to encode");
            }
            self.entry = Some((value.to_owned(), code));
        }
        self.entry.as_ref().and_then(|(_, code)| code.as_ref())
    }
}

pub fn paint_qr(ui: &mut egui::Ui, code: &QrCode, side: f32) -> egui::Response {
    let (response, painter) = ui.allocate_painter(egui::Vec2::splat(side), egui::Sense::hover());
    let rect = response.rect;
    painter.rect_filled(rect, 0.0, egui::Color32::WHITE);

    let size = code.size();
    let cell = side / (size + 2 * QUIET_ZONE) as f32;
    for y in 0..size {
        for x in 0..size {
            if !code.get_module(x, y) {
                continue;
            }
            let min = rect.min
                + egui::vec2(
                    (x + QUIET_ZONE) as f32 * cell,
                    (y + QUIET_ZONE) as f32 * cell,
                );
            painter.rect_filled(
                egui::Rect::from_min_size(min, egui::Vec2::splat(cell)),
                0.0,
                egui::Color32::BLACK,
            );
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_sized_payloads_encode() {
        let value = format!(r#"{{"from":"{}","rlp":"{}"}}"#, "ab".repeat(20), "cd".repeat(120));
        let code = encode(&value).expect("fits in a qr code");
        assert!(code.size() >= 21);
    }

    #[test]
    fn oversized_payloads_yield_nothing() {
        assert!(encode(&"x".repeat(8_000)).is_none());
    }

    #[test]
    fn cache_reencodes_only_on_change() {
        let mut cache = QrCache::default();
        let first = cache.get("one").map(QrCode::size);
        assert!(first.is_some());
        assert_eq!(cache.get("one").map(QrCode::size), first);
        assert!(cache.get(&"y".repeat(8_000)).is_none());
    }
}
