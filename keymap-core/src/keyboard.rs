use core::cell::RefCell;

use keymap_types::action::{Action, KeyAction};
use keymap_types::keycode::{HidKeyCode, from_ascii};
use keymap_types::layer::LayerState;
use keymap_types::modifier::{HidModifiers, ModifierCombination};
use keymap_types::protocol::layer_status::LayerStatusReport;
use log::{debug, error, info, warn};

use crate::config::{BehaviorConfig, NotifierMode};
use crate::event::{KeyEvent, RotaryEncoderEvent};
use crate::hid::{HidWriter, KeyboardReport, MediaKeyboardReport, RawHidWriter, Report, SystemControlReport};
use crate::keymap::KeyMap;

/// Encoders have no matrix position, their keys are registered on this row with the encoder id as column
const ENCODER_ROW: u8 = u8::MAX;

pub struct Keyboard<
    'a,
    W: HidWriter + RawHidWriter,
    const ROW: usize,
    const COL: usize,
    const NUM_LAYER: usize,
    const NUM_ENCODER: usize = 0,
> {
    /// Keymap
    pub(crate) keymap: &'a RefCell<KeyMap<'a, ROW, COL, NUM_LAYER, NUM_ENCODER>>,

    /// Report sink, both the HID reports and the raw HID layer status
    writer: W,

    /// Options for configurable action behavior
    behavior: BehaviorConfig<'a>,

    /// The modifiers coming from (last) `Action::KeyWithModifier`
    with_modifiers: HidModifiers,

    /// Macro text typing state (affects the effective modifiers)
    macro_texting: bool,
    macro_shift: bool,

    /// the held modifiers for the keyboard hid report
    held_modifiers: HidModifiers,

    /// the held keys for the keyboard hid report, except the modifiers
    held_keycodes: [HidKeyCode; 6],

    /// Registered key position
    registered_keys: [Option<(u8, u8)>; 6],

    /// Internal media report buf
    media_report: MediaKeyboardReport,

    /// Internal system control report buf
    system_control_report: SystemControlReport,

    /// Tap-hold key which is pressed but not decided yet: (press event, tap action, hold action)
    pending_tap_hold: Option<(KeyEvent, Action, Action)>,
}

impl<
    'a,
    W: HidWriter + RawHidWriter,
    const ROW: usize,
    const COL: usize,
    const NUM_LAYER: usize,
    const NUM_ENCODER: usize,
> Keyboard<'a, W, ROW, COL, NUM_LAYER, NUM_ENCODER>
{
    pub fn new(
        keymap: &'a RefCell<KeyMap<'a, ROW, COL, NUM_LAYER, NUM_ENCODER>>,
        behavior: BehaviorConfig<'a>,
        writer: W,
    ) -> Self {
        Keyboard {
            keymap,
            writer,
            behavior,
            with_modifiers: HidModifiers::default(),
            macro_texting: false,
            macro_shift: false,
            held_modifiers: HidModifiers::default(),
            held_keycodes: [HidKeyCode::No; 6],
            registered_keys: [None; 6],
            media_report: MediaKeyboardReport { usage_id: 0 },
            system_control_report: SystemControlReport { usage_id: 0 },
            pending_tap_hold: None,
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn held_keycodes(&self) -> [HidKeyCode; 6] {
        self.held_keycodes
    }

    pub fn held_modifiers(&self) -> HidModifiers {
        self.held_modifiers
    }

    /// The layer which is reported to the host
    pub fn highest_layer(&self) -> u8 {
        self.keymap.borrow().highest_layer()
    }

    pub fn layer_state(&self) -> LayerState {
        self.keymap.borrow().layer_state()
    }

    /// Process key changes at (row, col)
    pub async fn process_key_event(&mut self, key_event: KeyEvent) {
        let before = self.layer_snapshot();

        // Another key is pressed, a pending tap-hold key becomes a hold
        if key_event.pressed {
            self.resolve_pending_tap_hold().await;
        }

        let key_action = self.keymap.borrow_mut().get_action_with_layer_cache(key_event);
        debug!("Process key action: {:?}, {:?}", key_action, key_event);
        self.process_key_action(key_action, key_event).await;

        self.notify_layer_change(before).await;
    }

    /// Process one step of a rotary encoder, the resolved action is tapped
    pub async fn process_encoder_event(&mut self, encoder_event: RotaryEncoderEvent) {
        let before = self.layer_snapshot();
        self.resolve_pending_tap_hold().await;

        let key_action = self.keymap.borrow().get_encoder_action(encoder_event);
        debug!("Process encoder action: {:?}, {:?}", key_action, encoder_event);
        let press = KeyEvent::press(ENCODER_ROW, encoder_event.id);
        self.process_key_action(key_action, press).await;
        self.process_key_action(key_action, KeyEvent { pressed: false, ..press })
            .await;

        self.notify_layer_change(before).await;
    }

    async fn process_key_action(&mut self, key_action: KeyAction, key_event: KeyEvent) {
        match key_action {
            KeyAction::No | KeyAction::Transparent => (),
            KeyAction::Single(a) => {
                if self.process_record_user(a, key_event).await {
                    self.process_action(a, key_event).await;
                }
            }
            KeyAction::TapHold(tap_action, hold_action) => {
                self.process_key_action_tap_hold(tap_action, hold_action, key_event)
                    .await
            }
            KeyAction::OneShot(a) => {
                if key_event.pressed {
                    warn!("One shot action {:?} is not supported", a);
                }
            }
        }
    }

    /// `process_record_user` hook, runs before the default processing of every single action.
    ///
    /// Returns `false` if the action is fully handled and the default processing must be skipped.
    async fn process_record_user(&mut self, action: Action, key_event: KeyEvent) -> bool {
        match action {
            Action::LayerOn(layer) if layer >= 1 && (layer as usize) < NUM_LAYER => {
                if let Some(notifier) = self.behavior.notifier.key_for(layer) {
                    if key_event.pressed {
                        self.register_keycode(notifier, key_event);
                    } else {
                        self.unregister_keycode(notifier, key_event);
                    }
                    self.send_keyboard_report_with_resolved_modifiers(key_event.pressed)
                        .await;
                }
                match self.behavior.notifier.mode {
                    NotifierMode::Intercept => {
                        self.process_action_layer_switch(layer, key_event);
                        false
                    }
                    NotifierMode::PassThrough => true,
                }
            }
            Action::User(index) => match self.behavior.macro_strings.get(index) {
                Some(text) => {
                    // Only on press, the release is swallowed
                    if key_event.pressed {
                        self.type_text(text, key_event).await;
                    }
                    false
                }
                None => true,
            },
            _ => true,
        }
    }

    /// `layer_state_set_user` hook, announces the highest active layer on the raw HID channel.
    pub async fn layer_state_set_user(&mut self, state: LayerState) -> LayerState {
        let default_layer = self.keymap.borrow().get_default_layer();
        let layer = state.highest(default_layer);
        let config = self.behavior.layer_report;
        let report = LayerStatusReport::new(config.report_id, layer, config.keyboard_id);
        debug!("Layer state changed to {:#010b}, report layer {}", state.bits(), layer);

        if let Err(e) = self.writer.write_raw(report.to_bytes()).await {
            error!("Failed to send layer status report: {}", e);
        }
        state
    }

    fn layer_snapshot(&self) -> (LayerState, u8) {
        let keymap = self.keymap.borrow();
        (keymap.layer_state(), keymap.get_default_layer())
    }

    async fn notify_layer_change(&mut self, before: (LayerState, u8)) {
        let after = self.layer_snapshot();
        if after != before {
            self.layer_state_set_user(after.0).await;
        }
    }

    async fn send_report(&mut self, report: Report) {
        if let Err(e) = self.writer.write_report(report).await {
            error!("Failed to send report: {}", e);
        }
    }

    pub(crate) async fn send_keyboard_report_with_resolved_modifiers(&mut self, pressed: bool) {
        // all modifier related effects are combined here to be sent with the hid report:
        let modifiers = self.resolve_modifiers(pressed).into_bits();

        self.send_report(Report::KeyboardReport(KeyboardReport {
            modifier: modifiers,
            reserved: 0,
            keycodes: self.held_keycodes.map(|k| k as u8),
        }))
        .await;
    }

    /// Send system control report if needed
    async fn send_system_control_report(&mut self) {
        self.send_report(Report::SystemControlReport(self.system_control_report))
            .await;
        self.system_control_report.usage_id = 0;
    }

    /// Send media report if needed
    async fn send_media_report(&mut self) {
        self.send_report(Report::MediaKeyboardReport(self.media_report)).await;
        self.media_report.usage_id = 0;
    }

    /// Calculates the combined effect of all modifiers:
    /// - text macro related modifier suppressions + capitalization
    /// - registered (held) modifiers keys
    /// - effect of `Action::KeyWithModifier` (while they are pressed)
    pub fn resolve_modifiers(&self, pressed: bool) -> HidModifiers {
        // text typing macro should not be affected by any modifiers,
        // only its own capitalization
        if self.macro_texting {
            if self.macro_shift {
                return HidModifiers::new().with_left_shift(true);
            } else {
                return HidModifiers::new();
            }
        }

        let mut result = self.held_modifiers;
        if pressed {
            result |= self.with_modifiers;
        }
        result
    }

    /// Default processing of a single action
    async fn process_action(&mut self, action: Action, key_event: KeyEvent) {
        match action {
            Action::No | Action::Transparent => (),
            Action::Key(key) => self.process_action_key(key, key_event).await,
            Action::KeyWithModifier(key, modifiers) => {
                self.process_key_action_with_modifier(key, modifiers, key_event)
                    .await
            }
            Action::Modifier(modifiers) => {
                if key_event.pressed {
                    self.register_modifiers(modifiers);
                } else {
                    self.unregister_modifiers(modifiers);
                }
                //report the modifier press/release in its own hid report
                self.send_keyboard_report_with_resolved_modifiers(key_event.pressed)
                    .await;
            }
            Action::LayerOn(layer_num) => self.process_action_layer_switch(layer_num, key_event),
            Action::LayerOnWithModifier(layer_num, modifiers) => {
                self.process_action_layer_switch(layer_num, key_event);
                if key_event.pressed {
                    self.register_modifiers(modifiers);
                } else {
                    self.unregister_modifiers(modifiers);
                }
                self.send_keyboard_report_with_resolved_modifiers(key_event.pressed)
                    .await;
            }
            Action::LayerToggle(layer_num) => {
                // Toggle a layer when the key is release
                if !key_event.pressed {
                    self.keymap.borrow_mut().toggle_layer(layer_num);
                }
            }
            Action::LayerToggleOnly(layer_num) => {
                // Activate a layer and deactivate all other layers(except default layer)
                if key_event.pressed {
                    self.keymap.borrow_mut().move_to_layer(layer_num);
                }
            }
            Action::DefaultLayer(layer_num) => {
                if key_event.pressed {
                    self.keymap.borrow_mut().set_default_layer(layer_num);
                }
            }
            Action::Quantum(keycode) => {
                if key_event.pressed {
                    info!("QMK feature keycode {:#06X} is left to the host firmware", keycode);
                }
            }
            Action::User(index) => {
                if key_event.pressed {
                    debug!("Custom keycode {} has no action", index);
                }
            }
        }
    }

    async fn process_key_action_with_modifier(
        &mut self,
        key: HidKeyCode,
        modifiers: ModifierCombination,
        key_event: KeyEvent,
    ) {
        if key_event.pressed {
            // These modifiers will be combined into the hid report, so
            // they will be "pressed" the same time as the key (in same hid report)
            self.with_modifiers |= modifiers.to_hid_modifiers();
        } else {
            // The modifiers will not be part of the hid report, so
            // they will be "released" the same time as the key (in same hid report)
            self.with_modifiers &= !(modifiers.to_hid_modifiers());
        }
        self.process_action_key(key, key_event).await;
    }

    /// Process tap/hold action.
    ///
    /// There's no timer, the decision is made by the next event:
    /// - another key is pressed while the tap-hold key is held: hold
    /// - the tap-hold key is released first: tap
    async fn process_key_action_tap_hold(&mut self, tap_action: Action, hold_action: Action, key_event: KeyEvent) {
        if key_event.pressed {
            self.pending_tap_hold = Some((key_event, tap_action, hold_action));
            return;
        }

        match self.pending_tap_hold {
            Some((pending, _, _)) if pending.same_position(&key_event) => {
                self.pending_tap_hold = None;
                debug!("Tap hold key ({}, {}) resolved as tap", key_event.row, key_event.col);
                self.process_action(tap_action, KeyEvent { pressed: true, ..key_event })
                    .await;
                self.process_action(tap_action, key_event).await;
            }
            // Resolved as hold before, release the hold action
            _ => self.process_action(hold_action, key_event).await,
        }
    }

    async fn resolve_pending_tap_hold(&mut self) {
        if let Some((pending, _, hold_action)) = self.pending_tap_hold.take() {
            debug!("Tap hold key ({}, {}) resolved as hold", pending.row, pending.col);
            self.process_action(hold_action, pending).await;
        }
    }

    /// Process a keycode of the QMK basic range.
    async fn process_action_key(&mut self, key: HidKeyCode, key_event: KeyEvent) {
        if let Some(consumer) = key.process_as_consumer() {
            self.media_report.usage_id = if key_event.pressed { consumer as u16 } else { 0 };
            self.send_media_report().await;
        } else if let Some(system) = key.process_as_system_control() {
            if key_event.pressed {
                self.system_control_report.usage_id = system as u8;
            } else {
                self.system_control_report.usage_id = 0;
            }
            self.send_system_control_report().await;
        } else if key.is_modifier() || key.is_simple_key() {
            if key_event.pressed {
                self.register_key(key, key_event);
            } else {
                self.unregister_key(key, key_event);
            }
            self.send_keyboard_report_with_resolved_modifiers(key_event.pressed)
                .await;
        } else {
            warn!("Unsupported key: {:?}", key);
        }
    }

    /// Process layer switch action.
    fn process_action_layer_switch(&mut self, layer_num: u8, key_event: KeyEvent) {
        // Change layer state only when the key's state is changed
        if key_event.pressed {
            self.keymap.borrow_mut().activate_layer(layer_num);
        } else {
            self.keymap.borrow_mut().deactivate_layer(layer_num);
        }
    }

    /// Type an ASCII string, every char is a press report followed by a release report.
    async fn type_text(&mut self, text: &str, key_event: KeyEvent) {
        for &c in text.as_bytes() {
            let (key, shifted) = from_ascii(c);
            if key == HidKeyCode::No {
                warn!("Character {:#04X} can't be typed", c);
                continue;
            }
            self.macro_texting = true;
            self.macro_shift = shifted;
            self.register_keycode(key, key_event);
            self.send_keyboard_report_with_resolved_modifiers(true).await;
            self.unregister_keycode(key, key_event);
            self.send_keyboard_report_with_resolved_modifiers(false).await;
        }

        if self.macro_texting {
            //restore the state of the keyboard (held modifiers, etc.) after text typing
            self.macro_texting = false;
            self.macro_shift = false;
            self.send_keyboard_report_with_resolved_modifiers(false).await;
        }
    }

    /// Register a key, the key can be a basic keycode or a modifier.
    fn register_key(&mut self, key: HidKeyCode, key_event: KeyEvent) {
        if key.is_modifier() {
            self.register_modifier_key(key);
        } else if key.is_simple_key() {
            self.register_keycode(key, key_event);
        }
    }

    /// Unregister a key, the key can be a basic keycode or a modifier.
    fn unregister_key(&mut self, key: HidKeyCode, key_event: KeyEvent) {
        if key.is_modifier() {
            self.unregister_modifier_key(key);
        } else if key.is_simple_key() {
            self.unregister_keycode(key, key_event);
        }
    }

    fn find_slot(&self, key_event: KeyEvent) -> Option<usize> {
        self.registered_keys
            .iter()
            .position(|k| *k == Some((key_event.row, key_event.col)))
    }

    /// Register a key to be sent in hid report.
    fn register_keycode(&mut self, key: HidKeyCode, key_event: KeyEvent) {
        // First, find the key event slot according to the position, otherwise the first free slot
        let slot = self
            .find_slot(key_event)
            .or_else(|| self.held_keycodes.iter().position(|&k| k == HidKeyCode::No));

        match slot {
            Some(index) => {
                self.held_keycodes[index] = key;
                self.registered_keys[index] = Some((key_event.row, key_event.col));
            }
            None => warn!("No free slot for {:?}, 6 keys are already held", key),
        }
    }

    /// Unregister a key from hid report.
    fn unregister_keycode(&mut self, key: HidKeyCode, key_event: KeyEvent) {
        // First, find the key event slot according to the position, otherwise release the first same key
        let slot = self
            .find_slot(key_event)
            .or_else(|| self.held_keycodes.iter().position(|&k| k == key));

        if let Some(index) = slot {
            self.held_keycodes[index] = HidKeyCode::No;
            self.registered_keys[index] = None;
        }
    }

    /// Register a modifier to be sent in hid report.
    fn register_modifier_key(&mut self, key: HidKeyCode) {
        self.held_modifiers |= key.to_hid_modifiers();
    }

    /// Unregister a modifier from hid report.
    fn unregister_modifier_key(&mut self, key: HidKeyCode) {
        self.held_modifiers &= !key.to_hid_modifiers();
    }

    /// Register a modifier combination to be sent in hid report.
    fn register_modifiers(&mut self, modifiers: ModifierCombination) {
        self.held_modifiers |= modifiers.to_hid_modifiers();
    }

    /// Unregister a modifier combination from hid report.
    fn unregister_modifiers(&mut self, modifiers: ModifierCombination) {
        self.held_modifiers &= !modifiers.to_hid_modifiers();
    }
}

#[cfg(test)]
mod test {
    use embassy_futures::block_on;
    use keymap_types::modifier::SHIFT;
    use keymap_types::protocol::layer_status::RAW_REPORT_SIZE;

    use super::*;
    use crate::config::{LayerNotifierConfig, LayerReportConfig, MacroStringConfig};
    use crate::hid::HidError;
    use crate::{a, k, layer, lt, mo, tg, user, wm};

    #[derive(Default)]
    struct TestWriter {
        reports: Vec<Report>,
        raw: Vec<[u8; RAW_REPORT_SIZE]>,
    }

    impl HidWriter for TestWriter {
        async fn write_report(&mut self, report: Report) -> Result<usize, HidError> {
            self.reports.push(report);
            Ok(8)
        }
    }

    impl RawHidWriter for TestWriter {
        async fn write_raw(&mut self, data: [u8; RAW_REPORT_SIZE]) -> Result<usize, HidError> {
            self.raw.push(data);
            Ok(RAW_REPORT_SIZE)
        }
    }

    // Init logger for tests
    #[ctor::ctor]
    fn init_log() {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();
    }

    #[rustfmt::skip]
    const fn get_keymap() -> [[[KeyAction; 3]; 2]; 3] {
        [
            layer!([
                [k!(A), mo!(1), mo!(2)],
                [user!(0), lt!(1, Space), tg!(2)]
            ]),
            layer!([
                [k!(B), a!(Transparent), a!(Transparent)],
                [user!(5), a!(Transparent), a!(Transparent)]
            ]),
            layer!([
                [wm!(Kc1, SHIFT), a!(Transparent), a!(Transparent)],
                [k!(AudioVolUp), a!(Transparent), a!(Transparent)]
            ]),
        ]
    }

    const NOTIFIERS: [Option<HidKeyCode>; 3] = [None, Some(HidKeyCode::F13), Some(HidKeyCode::F14)];
    const STRINGS: [&str; 1] = ["Hi"];

    fn create_test_keyboard(mode: NotifierMode) -> Keyboard<'static, TestWriter, 2, 3, 3> {
        // Box::leak is acceptable in tests
        let leaked_keymap = Box::leak(Box::new(get_keymap()));
        let keymap = KeyMap::new(leaked_keymap, None);
        let keymap_ref = Box::leak(Box::new(RefCell::new(keymap)));

        let behavior = BehaviorConfig {
            notifier: LayerNotifierConfig::new(&NOTIFIERS, mode),
            macro_strings: MacroStringConfig::new(&STRINGS),
            layer_report: LayerReportConfig::new(0x01, 0x05),
        };
        Keyboard::new(keymap_ref, behavior, TestWriter::default())
    }

    fn kb_report(modifier: u8, keycodes: [u8; 6]) -> Report {
        Report::KeyboardReport(KeyboardReport {
            modifier,
            reserved: 0,
            keycodes,
        })
    }

    fn layer_report(layer: u8) -> [u8; RAW_REPORT_SIZE] {
        let mut data = [0; RAW_REPORT_SIZE];
        data[0] = 0x01;
        data[1] = layer;
        data[2] = 0x85;
        data
    }

    #[test]
    fn test_basic_key_press_release() {
        block_on(async {
            let mut keyboard = create_test_keyboard(NotifierMode::Intercept);

            keyboard.process_key_event(KeyEvent::press(0, 0)).await;
            assert_eq!(keyboard.held_keycodes()[0], HidKeyCode::A);
            keyboard.process_key_event(KeyEvent::release(0, 0)).await;
            assert_eq!(keyboard.held_keycodes()[0], HidKeyCode::No);

            assert_eq!(
                keyboard.writer().reports,
                vec![kb_report(0, [0x04, 0, 0, 0, 0, 0]), kb_report(0, [0; 6])]
            );
            assert!(keyboard.writer().raw.is_empty());
        });
    }

    #[test]
    fn test_notifier_intercept() {
        block_on(async {
            let mut keyboard = create_test_keyboard(NotifierMode::Intercept);

            keyboard.process_key_event(KeyEvent::press(0, 1)).await;
            assert!(keyboard.layer_state().is_on(1));
            keyboard.process_key_event(KeyEvent::press(0, 0)).await;
            keyboard.process_key_event(KeyEvent::release(0, 1)).await;
            assert!(!keyboard.layer_state().is_on(1));
            // Released through the layer cache, B is still released after the layer is gone
            keyboard.process_key_event(KeyEvent::release(0, 0)).await;

            assert_eq!(
                keyboard.writer().reports,
                vec![
                    kb_report(0, [0x68, 0, 0, 0, 0, 0]),
                    kb_report(0, [0x68, 0x05, 0, 0, 0, 0]),
                    kb_report(0, [0, 0x05, 0, 0, 0, 0]),
                    kb_report(0, [0; 6]),
                ]
            );
            assert_eq!(keyboard.writer().raw, vec![layer_report(1), layer_report(0)]);
        });
    }

    #[test]
    fn test_notifier_pass_through() {
        block_on(async {
            let mut keyboard = create_test_keyboard(NotifierMode::PassThrough);

            keyboard.process_key_event(KeyEvent::press(0, 2)).await;
            assert!(keyboard.layer_state().is_on(2));
            assert_eq!(keyboard.highest_layer(), 2);
            keyboard.process_key_event(KeyEvent::release(0, 2)).await;
            assert_eq!(keyboard.highest_layer(), 0);

            assert_eq!(
                keyboard.writer().reports,
                vec![kb_report(0, [0x69, 0, 0, 0, 0, 0]), kb_report(0, [0; 6])]
            );
            assert_eq!(keyboard.writer().raw, vec![layer_report(2), layer_report(0)]);
        });
    }

    #[test]
    fn test_macro_string() {
        block_on(async {
            let mut keyboard = create_test_keyboard(NotifierMode::Intercept);

            keyboard.process_key_event(KeyEvent::press(1, 0)).await;
            keyboard.process_key_event(KeyEvent::release(1, 0)).await;

            assert_eq!(
                keyboard.writer().reports,
                vec![
                    kb_report(0x02, [0x0B, 0, 0, 0, 0, 0]),
                    kb_report(0x02, [0; 6]),
                    kb_report(0, [0x0C, 0, 0, 0, 0, 0]),
                    kb_report(0, [0; 6]),
                    kb_report(0, [0; 6]),
                ]
            );
        });
    }

    #[test]
    fn test_user_keycode_without_string() {
        block_on(async {
            let mut keyboard = create_test_keyboard(NotifierMode::Intercept);

            keyboard.process_key_event(KeyEvent::press(0, 1)).await;
            keyboard.process_key_event(KeyEvent::press(1, 0)).await;
            keyboard.process_key_event(KeyEvent::release(1, 0)).await;
            keyboard.process_key_event(KeyEvent::release(0, 1)).await;

            // Only the notifier key is reported
            assert_eq!(
                keyboard.writer().reports,
                vec![kb_report(0, [0x68, 0, 0, 0, 0, 0]), kb_report(0, [0; 6])]
            );
        });
    }

    #[test]
    fn test_tap_hold_tap() {
        block_on(async {
            let mut keyboard = create_test_keyboard(NotifierMode::Intercept);

            keyboard.process_key_event(KeyEvent::press(1, 1)).await;
            assert!(keyboard.writer().reports.is_empty());
            keyboard.process_key_event(KeyEvent::release(1, 1)).await;

            assert_eq!(
                keyboard.writer().reports,
                vec![kb_report(0, [0x2C, 0, 0, 0, 0, 0]), kb_report(0, [0; 6])]
            );
            assert!(keyboard.writer().raw.is_empty());
        });
    }

    #[test]
    fn test_tap_hold_hold_on_other_press() {
        block_on(async {
            let mut keyboard = create_test_keyboard(NotifierMode::Intercept);

            keyboard.process_key_event(KeyEvent::press(1, 1)).await;
            keyboard.process_key_event(KeyEvent::press(0, 0)).await;
            assert!(keyboard.layer_state().is_on(1));
            keyboard.process_key_event(KeyEvent::release(0, 0)).await;
            keyboard.process_key_event(KeyEvent::release(1, 1)).await;
            assert!(!keyboard.layer_state().is_on(1));

            assert_eq!(
                keyboard.writer().reports,
                vec![kb_report(0, [0x05, 0, 0, 0, 0, 0]), kb_report(0, [0; 6])]
            );
            assert_eq!(keyboard.writer().raw, vec![layer_report(1), layer_report(0)]);
        });
    }

    #[test]
    fn test_layer_toggle_and_modified_key() {
        block_on(async {
            let mut keyboard = create_test_keyboard(NotifierMode::Intercept);

            // TG toggles on release
            keyboard.process_key_event(KeyEvent::press(1, 2)).await;
            assert!(!keyboard.layer_state().is_on(2));
            keyboard.process_key_event(KeyEvent::release(1, 2)).await;
            assert!(keyboard.layer_state().is_on(2));
            assert_eq!(keyboard.writer().raw, vec![layer_report(2)]);

            // S(KC_1)
            keyboard.process_key_event(KeyEvent::press(0, 0)).await;
            keyboard.process_key_event(KeyEvent::release(0, 0)).await;
            // KC_VOLU goes to the consumer page
            keyboard.process_key_event(KeyEvent::press(1, 0)).await;
            keyboard.process_key_event(KeyEvent::release(1, 0)).await;

            assert_eq!(
                keyboard.writer().reports,
                vec![
                    kb_report(0x02, [0x1E, 0, 0, 0, 0, 0]),
                    kb_report(0, [0; 6]),
                    Report::MediaKeyboardReport(MediaKeyboardReport { usage_id: 0xE9 }),
                    Report::MediaKeyboardReport(MediaKeyboardReport { usage_id: 0 }),
                ]
            );
        });
    }

    #[test]
    fn test_out_of_matrix_event() {
        block_on(async {
            let mut keyboard = create_test_keyboard(NotifierMode::Intercept);

            keyboard.process_key_event(KeyEvent::press(5, 5)).await;
            keyboard.process_key_event(KeyEvent::release(5, 5)).await;
            assert!(keyboard.writer().reports.is_empty());
            assert!(keyboard.writer().raw.is_empty());
        });
    }

    #[test]
    fn test_layer_state_set_user() {
        block_on(async {
            let mut keyboard = create_test_keyboard(NotifierMode::Intercept);

            let state = keyboard.layer_state_set_user(LayerState::from_bits(0b110)).await;
            assert_eq!(state.bits(), 0b110);
            assert_eq!(keyboard.writer().raw, vec![layer_report(2)]);
        });
    }
}
