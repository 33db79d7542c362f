//! Replays a key event script through a built-in keymap and records what the keyboard sends.
//!
//! Script lines, `#` starts a comment:
//!
//! ```text
//! press 0 1
//! release 0 1
//! tap 3 0
//! cw 0
//! ccw 2
//! ```

use core::cell::RefCell;

use anyhow::{Result, anyhow, bail};
use keymap_core::config::{BehaviorConfig, LayerReportConfig};
use keymap_core::event::{Direction, KeyEvent, RotaryEncoderEvent};
use keymap_core::hid::{HidError, HidWriter, RawHidWriter, Report};
use keymap_core::keyboard::Keyboard;
use keymap_core::keyboards::{BuiltinKeyboard, kb16, seven_skb};
use keymap_core::keymap::KeyMap;
use keymap_types::protocol::layer_status::{LayerStatusReport, RAW_REPORT_SIZE};
use log::debug;
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptEvent {
    Key(KeyEvent),
    /// Press then release
    Tap(u8, u8),
    Encoder(RotaryEncoderEvent),
}

impl ScriptEvent {
    fn describe(&self) -> String {
        match self {
            ScriptEvent::Key(e) if e.pressed => format!("press {} {}", e.row, e.col),
            ScriptEvent::Key(e) => format!("release {} {}", e.row, e.col),
            ScriptEvent::Tap(row, col) => format!("tap {} {}", row, col),
            ScriptEvent::Encoder(e) => match e.direction {
                Direction::Clockwise => format!("cw {}", e.id),
                Direction::CounterClockwise => format!("ccw {}", e.id),
            },
        }
    }
}

fn parse_number(token: Option<&str>, what: &str, line_no: usize) -> Result<u8> {
    let token = token.ok_or_else(|| anyhow!("line {}: missing {}", line_no, what))?;
    token
        .parse()
        .map_err(|_| anyhow!("line {}: invalid {} '{}'", line_no, what, token))
}

pub fn parse_script(script: &str) -> Result<Vec<ScriptEvent>> {
    let mut events = Vec::new();
    for (idx, line) in script.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let command = tokens.next().unwrap_or_default();
        let event = match command {
            "press" | "release" | "tap" => {
                let row = parse_number(tokens.next(), "row", line_no)?;
                let col = parse_number(tokens.next(), "col", line_no)?;
                match command {
                    "press" => ScriptEvent::Key(KeyEvent::press(row, col)),
                    "release" => ScriptEvent::Key(KeyEvent::release(row, col)),
                    _ => ScriptEvent::Tap(row, col),
                }
            }
            "cw" | "ccw" => {
                let id = parse_number(tokens.next(), "encoder id", line_no)?;
                let direction = if command == "cw" {
                    Direction::Clockwise
                } else {
                    Direction::CounterClockwise
                };
                ScriptEvent::Encoder(RotaryEncoderEvent { id, direction })
            }
            other => bail!("line {}: unknown event '{}'", line_no, other),
        };
        if let Some(extra) = tokens.next() {
            bail!("line {}: unexpected '{}'", line_no, extra);
        }
        events.push(event);
    }
    Ok(events)
}

/// Collects every report as JSON
#[derive(Debug, Default)]
pub struct JsonReportWriter {
    reports: Vec<Value>,
}

impl JsonReportWriter {
    fn take(&mut self) -> Vec<Value> {
        core::mem::take(&mut self.reports)
    }
}

fn report_json(report: &Report) -> Value {
    match report {
        Report::KeyboardReport(r) => json!({
            "type": "keyboard",
            "modifier": r.modifier,
            "keycodes": r.keycodes,
        }),
        Report::MediaKeyboardReport(r) => json!({"type": "media", "usage_id": r.usage_id}),
        Report::SystemControlReport(r) => json!({"type": "system_control", "usage_id": r.usage_id}),
    }
}

fn raw_json(data: &[u8; RAW_REPORT_SIZE]) -> Value {
    let hex: Vec<String> = data.iter().map(|b| format!("{:02X}", b)).collect();
    let mut value = json!({"type": "raw", "data": hex.join(" ")});
    if let Some(status) = LayerStatusReport::from_bytes(data) {
        value["report_id"] = json!(status.report_id);
        value["layer"] = json!(status.layer);
        value["keyboard_id"] = json!(status.keyboard_id());
    }
    value
}

impl HidWriter for JsonReportWriter {
    async fn write_report(&mut self, report: Report) -> Result<usize, HidError> {
        self.reports.push(report_json(&report));
        Ok(8)
    }
}

impl RawHidWriter for JsonReportWriter {
    async fn write_raw(&mut self, data: [u8; RAW_REPORT_SIZE]) -> Result<usize, HidError> {
        self.reports.push(raw_json(&data));
        Ok(RAW_REPORT_SIZE)
    }
}

async fn replay<const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize>(
    keyboard: &mut Keyboard<'_, JsonReportWriter, ROW, COL, NUM_LAYER, NUM_ENCODER>,
    events: &[ScriptEvent],
) -> Result<Vec<Value>> {
    let check_position = |row: u8, col: u8| -> Result<()> {
        if row as usize >= ROW || col as usize >= COL {
            bail!("Position ({}, {}) is outside the {}x{} matrix", row, col, ROW, COL);
        }
        Ok(())
    };

    let mut steps = Vec::with_capacity(events.len());
    for event in events {
        match *event {
            ScriptEvent::Key(key_event) => {
                check_position(key_event.row, key_event.col)?;
                keyboard.process_key_event(key_event).await;
            }
            ScriptEvent::Tap(row, col) => {
                check_position(row, col)?;
                keyboard.process_key_event(KeyEvent::press(row, col)).await;
                keyboard.process_key_event(KeyEvent::release(row, col)).await;
            }
            ScriptEvent::Encoder(encoder_event) => {
                if encoder_event.id as usize >= NUM_ENCODER {
                    bail!("Encoder {} doesn't exist, the keyboard has {}", encoder_event.id, NUM_ENCODER);
                }
                keyboard.process_encoder_event(encoder_event).await;
            }
        }
        debug!("{} -> layer {}", event.describe(), keyboard.highest_layer());
        steps.push(json!({
            "event": event.describe(),
            "layer": keyboard.highest_layer(),
            "reports": keyboard.writer_mut().take(),
        }));
    }
    Ok(steps)
}

/// Run `events` on a fresh instance of `builtin`, the layer report uses `layer_report`
pub async fn simulate(
    builtin: BuiltinKeyboard,
    layer_report: LayerReportConfig,
    events: &[ScriptEvent],
) -> Result<Vec<Value>> {
    match builtin {
        BuiltinKeyboard::SevenSkb => {
            let mut layers = seven_skb::get_default_keymap();
            let keymap: RefCell<KeyMap<'_, { seven_skb::ROW }, { seven_skb::COL }, { seven_skb::NUM_LAYER }>> =
                RefCell::new(KeyMap::new(&mut layers, None));
            let behavior = BehaviorConfig {
                layer_report,
                ..seven_skb::BEHAVIOR
            };
            let mut keyboard = Keyboard::new(&keymap, behavior, JsonReportWriter::default());
            replay(&mut keyboard, events).await
        }
        BuiltinKeyboard::Kb16 => {
            let mut layers = kb16::get_default_keymap();
            let mut encoders = kb16::get_default_encoder_map();
            let keymap = RefCell::new(KeyMap::new(&mut layers, Some(&mut encoders)));
            let behavior = BehaviorConfig {
                layer_report,
                ..kb16::BEHAVIOR
            };
            let mut keyboard = Keyboard::new(&keymap, behavior, JsonReportWriter::default());
            replay(&mut keyboard, events).await
        }
    }
}
