//! Device tiles and preview overlay
//!
//! egui drawing for the device grid (one tile per simulated device,
//! painted by kind) and the hand-skeleton overlay on the camera preview.

use egui::{Color32, Pos2, Rect, Stroke, Vec2};

use crate::devices::{DeviceConfig, DeviceKind, DeviceState, TV_CHANNELS};
use crate::tracking::HandLandmarks;

/// Side of a square device tile, in points.
pub const TILE_SIZE: f32 = 150.0;

/// Landmark index pairs forming the hand skeleton.
const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    (5, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    (9, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    (13, 17),
    (17, 18),
    (18, 19),
    (19, 20),
    (0, 17),
];

/// Parse a "#RRGGBB" hex color. Anything malformed falls back to gray.
pub fn parse_hex_color(hex: &str) -> Color32 {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 {
        return Color32::GRAY;
    }
    match (
        u8::from_str_radix(&digits[0..2], 16),
        u8::from_str_radix(&digits[2..4], 16),
        u8::from_str_radix(&digits[4..6], 16),
    ) {
        (Ok(r), Ok(g), Ok(b)) => Color32::from_rgb(r, g, b),
        _ => Color32::GRAY,
    }
}

/// Draw one device tile: label on top, kind-specific artwork in the
/// middle, status text underneath. `time` drives the fan and RGB
/// animations.
pub fn device_tile(
    ui: &mut egui::Ui,
    id: &str,
    config: &DeviceConfig,
    state: DeviceState,
    time: f64,
) {
    let (response, painter) =
        ui.allocate_painter(Vec2::splat(TILE_SIZE), egui::Sense::hover());
    let rect = response.rect;

    let accent = if state.on {
        parse_hex_color(config.color_on)
    } else {
        parse_hex_color(config.color_off)
    };

    painter.rect_filled(rect, 8.0, Color32::from_gray(28));
    painter.rect_stroke(
        rect,
        8.0,
        Stroke::new(2.0, accent),
        egui::StrokeKind::Inside,
    );

    painter.text(
        rect.center_top() + Vec2::new(0.0, 16.0),
        egui::Align2::CENTER_CENTER,
        config.label,
        egui::FontId::proportional(14.0),
        Color32::WHITE,
    );

    let art_center = rect.center() + Vec2::new(0.0, -4.0);
    match config.kind {
        DeviceKind::Led => draw_led(&painter, art_center, accent, state.on),
        DeviceKind::Fan => draw_fan(&painter, art_center, accent, state.on, time),
        DeviceKind::DoorLock => draw_lock(&painter, art_center, accent, state.on),
        DeviceKind::Tv => draw_tv(&painter, art_center, accent, state),
        DeviceKind::Buzzer => draw_buzzer(&painter, art_center, accent, state.on),
        DeviceKind::RgbStrip => draw_rgb_strip(&painter, art_center, state.on, time),
    }

    let status = match config.kind {
        DeviceKind::DoorLock => {
            if state.on {
                "UNLOCKED".to_string()
            } else {
                "LOCKED".to_string()
            }
        }
        DeviceKind::Tv if state.on => TV_CHANNELS[state.channel % TV_CHANNELS.len()].to_string(),
        _ => {
            if state.on {
                "ON".to_string()
            } else {
                "OFF".to_string()
            }
        }
    };
    painter.text(
        rect.center_bottom() - Vec2::new(0.0, 16.0),
        egui::Align2::CENTER_CENTER,
        format!("{} {}", id, status),
        egui::FontId::monospace(12.0),
        if state.on { accent } else { Color32::GRAY },
    );

    if ui.is_rect_visible(rect) && state.on {
        // Lit tiles request continuous repaint so animations run.
        ui.ctx().request_repaint();
    }
}

fn draw_led(painter: &egui::Painter, center: Pos2, color: Color32, on: bool) {
    if on {
        // Soft glow behind the bulb.
        let glow = Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), 40);
        painter.circle_filled(center, 34.0, glow);
        painter.circle_filled(center, 26.0, glow);
    }
    painter.circle_filled(center, 18.0, color);
    painter.circle_stroke(center, 18.0, Stroke::new(1.5, Color32::from_gray(80)));
}

fn draw_fan(painter: &egui::Painter, center: Pos2, color: Color32, on: bool, time: f64) {
    let angle = if on { (time * 6.0) as f32 } else { 0.0 };
    painter.circle_stroke(center, 26.0, Stroke::new(2.0, color));
    for blade in 0..3 {
        let a = angle + blade as f32 * std::f32::consts::TAU / 3.0;
        let tip = center + Vec2::new(a.cos(), a.sin()) * 22.0;
        painter.line_segment([center, tip], Stroke::new(5.0, color));
    }
    painter.circle_filled(center, 5.0, color);
}

fn draw_lock(painter: &egui::Painter, center: Pos2, color: Color32, unlocked: bool) {
    let body = Rect::from_center_size(center + Vec2::new(0.0, 8.0), Vec2::new(32.0, 26.0));
    painter.rect_filled(body, 4.0, color);

    // Shackle swings open to the side when unlocked.
    let shackle_center = if unlocked {
        center + Vec2::new(14.0, -10.0)
    } else {
        center + Vec2::new(0.0, -10.0)
    };
    let stroke = Stroke::new(4.0, color);
    let steps = 16;
    let mut prev = None;
    for i in 0..=steps {
        let t = std::f32::consts::PI * i as f32 / steps as f32;
        let p = shackle_center + Vec2::new(t.cos() * 12.0, -t.sin() * 12.0);
        if let Some(prev) = prev {
            painter.line_segment([prev, p], stroke);
        }
        prev = Some(p);
    }
}

fn draw_tv(painter: &egui::Painter, center: Pos2, color: Color32, state: DeviceState) {
    let screen = Rect::from_center_size(center, Vec2::new(56.0, 36.0));
    painter.rect_filled(screen, 3.0, if state.on { color } else { Color32::BLACK });
    painter.rect_stroke(
        screen,
        3.0,
        Stroke::new(2.0, Color32::from_gray(100)),
        egui::StrokeKind::Outside,
    );
    if state.on {
        painter.text(
            center,
            egui::Align2::CENTER_CENTER,
            format!("CH {}", state.channel + 1),
            egui::FontId::monospace(12.0),
            Color32::WHITE,
        );
    }
    // Stand.
    painter.line_segment(
        [
            center + Vec2::new(-10.0, 22.0),
            center + Vec2::new(10.0, 22.0),
        ],
        Stroke::new(2.0, Color32::from_gray(100)),
    );
}

fn draw_buzzer(painter: &egui::Painter, center: Pos2, color: Color32, on: bool) {
    painter.circle_filled(center, 14.0, color);
    if on {
        for r in [20.0, 26.0] {
            painter.circle_stroke(center, r, Stroke::new(1.5, color));
        }
    }
}

fn draw_rgb_strip(painter: &egui::Painter, center: Pos2, on: bool, time: f64) {
    let cells = 8;
    let cell = Vec2::new(10.0, 18.0);
    let left = center - Vec2::new(cells as f32 * cell.x / 2.0, 0.0);
    for i in 0..cells {
        let rect = Rect::from_min_size(
            left + Vec2::new(i as f32 * cell.x + 1.0, -cell.y / 2.0),
            cell - Vec2::new(2.0, 0.0),
        );
        let color = if on {
            rainbow((time * 0.25 + i as f64 / cells as f64).fract() as f32)
        } else {
            Color32::from_gray(50)
        };
        painter.rect_filled(rect, 2.0, color);
    }
}

/// Hue sweep for the RGB strip, `t` in [0, 1).
fn rainbow(t: f32) -> Color32 {
    let h = t * 6.0;
    let x = (1.0 - (h % 2.0 - 1.0).abs()) * 255.0;
    let x = x as u8;
    match h as u32 {
        0 => Color32::from_rgb(255, x, 0),
        1 => Color32::from_rgb(x, 255, 0),
        2 => Color32::from_rgb(0, 255, x),
        3 => Color32::from_rgb(0, x, 255),
        4 => Color32::from_rgb(x, 0, 255),
        _ => Color32::from_rgb(255, 0, x),
    }
}

/// Draw the landmark skeleton over the preview image occupying `rect`.
/// Landmark coordinates are normalized to the frame, so they map
/// straight onto the rect.
pub fn draw_hand_overlay(painter: &egui::Painter, rect: Rect, hand: &HandLandmarks) {
    let to_screen = |x: f32, y: f32| -> Pos2 {
        Pos2::new(
            rect.left() + x.clamp(0.0, 1.0) * rect.width(),
            rect.top() + y.clamp(0.0, 1.0) * rect.height(),
        )
    };

    let bone = Stroke::new(2.0, Color32::from_rgb(0, 220, 120));
    for (a, b) in HAND_CONNECTIONS {
        let pa = to_screen(hand.points[a].x, hand.points[a].y);
        let pb = to_screen(hand.points[b].x, hand.points[b].y);
        painter.line_segment([pa, pb], bone);
    }
    for point in &hand.points {
        painter.circle_filled(to_screen(point.x, point.y), 3.0, Color32::from_rgb(255, 80, 80));
    }
}
