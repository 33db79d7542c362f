pub mod test_macro;

use core::cell::RefCell;

use keymap_core::action::{EncoderAction, KeyAction};
use keymap_core::config::BehaviorConfig;
use keymap_core::event::KeyEvent;
use keymap_core::hid::{HidError, HidWriter, RawHidWriter, Report};
use keymap_core::keyboard::Keyboard;
use keymap_core::keyboards::{kb16, seven_skb};
use keymap_core::keymap::KeyMap;
use keymap_core::types::protocol::layer_status::RAW_REPORT_SIZE;

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// Everything the keyboard wrote, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sent {
    Hid(Report),
    Raw([u8; RAW_REPORT_SIZE]),
}

#[derive(Debug, Default)]
pub struct RecordingWriter {
    pub sent: Vec<Sent>,
}

impl RecordingWriter {
    pub fn hid_reports(&self) -> Vec<Report> {
        self.sent
            .iter()
            .filter_map(|s| match s {
                Sent::Hid(r) => Some(*r),
                Sent::Raw(_) => None,
            })
            .collect()
    }

    pub fn raw_reports(&self) -> Vec<[u8; RAW_REPORT_SIZE]> {
        self.sent
            .iter()
            .filter_map(|s| match s {
                Sent::Raw(r) => Some(*r),
                Sent::Hid(_) => None,
            })
            .collect()
    }
}

impl HidWriter for RecordingWriter {
    async fn write_report(&mut self, report: Report) -> Result<usize, HidError> {
        self.sent.push(Sent::Hid(report));
        Ok(8)
    }
}

impl RawHidWriter for RecordingWriter {
    async fn write_raw(&mut self, data: [u8; RAW_REPORT_SIZE]) -> Result<usize, HidError> {
        self.sent.push(Sent::Raw(data));
        Ok(RAW_REPORT_SIZE)
    }
}

/// Host which is gone, every write fails
#[derive(Debug, Default)]
pub struct DisconnectedWriter {
    pub attempts: usize,
}

impl HidWriter for DisconnectedWriter {
    async fn write_report(&mut self, _report: Report) -> Result<usize, HidError> {
        self.attempts += 1;
        Err(HidError::Disconnected)
    }
}

impl RawHidWriter for DisconnectedWriter {
    async fn write_raw(&mut self, _data: [u8; RAW_REPORT_SIZE]) -> Result<usize, HidError> {
        self.attempts += 1;
        Err(HidError::Disconnected)
    }
}

pub fn wrap_keymap<const R: usize, const C: usize, const L: usize, const E: usize>(
    keymap: [[[KeyAction; C]; R]; L],
    encoders: Option<[[EncoderAction; E]; L]>,
) -> &'static RefCell<KeyMap<'static, R, C, L, E>> {
    // Box::leak is acceptable in tests
    let leaked_keymap = Box::leak(Box::new(keymap));
    let leaked_encoders = encoders.map(|e| Box::leak(Box::new(e)));

    let keymap = KeyMap::new(leaked_keymap, leaked_encoders);
    Box::leak(Box::new(RefCell::new(keymap)))
}

pub fn create_seven_skb<W: HidWriter + RawHidWriter>(
    writer: W,
) -> Keyboard<'static, W, { seven_skb::ROW }, { seven_skb::COL }, { seven_skb::NUM_LAYER }> {
    let keymap = wrap_keymap(seven_skb::get_default_keymap(), None);
    Keyboard::new(keymap, seven_skb::BEHAVIOR, writer)
}

pub fn create_kb16<W: HidWriter + RawHidWriter>(
    writer: W,
) -> Keyboard<'static, W, { kb16::ROW }, { kb16::COL }, { kb16::NUM_LAYER }, { kb16::NUM_ENCODER }> {
    let keymap = wrap_keymap(kb16::get_default_keymap(), Some(kb16::get_default_encoder_map()));
    Keyboard::new(keymap, kb16::BEHAVIOR, writer)
}

pub fn create_keyboard_with_config<const R: usize, const C: usize, const L: usize>(
    keymap: [[[KeyAction; C]; R]; L],
    behavior: BehaviorConfig<'static>,
) -> Keyboard<'static, RecordingWriter, R, C, L> {
    Keyboard::new(wrap_keymap(keymap, None), behavior, RecordingWriter::default())
}

/// Press then release
pub async fn tap<W: HidWriter + RawHidWriter, const R: usize, const C: usize, const L: usize, const E: usize>(
    keyboard: &mut Keyboard<'static, W, R, C, L, E>,
    row: u8,
    col: u8,
) {
    keyboard.process_key_event(KeyEvent::press(row, col)).await;
    keyboard.process_key_event(KeyEvent::release(row, col)).await;
}
