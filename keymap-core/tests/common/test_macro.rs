extern crate keymap_core;

// a rust macro to map a key name to its keycode as u8
#[macro_export]
macro_rules! kc8 {
    ($key: ident) => {
        keymap_core::keycode::HidKeyCode::$key as u8
    };
}

// a rust macro to create the keyboard reports that a key sequence is expected to produce
#[macro_export]
macro_rules! key_report {
    ($([$modifier:expr, $keys:expr]),* $(,)?) => {
        vec![
            $(
                keymap_core::hid::Report::KeyboardReport(keymap_core::hid::KeyboardReport {
                    modifier: $modifier,
                    keycodes: $keys,
                    reserved: 0,
                }),
            )*
        ]
    };
}

// a rust macro to create the raw layer status packet: report id, layer, status byte
#[macro_export]
macro_rules! layer_packet {
    ($report_id:expr, $layer:expr, $status:expr) => {{
        let mut data = [0u8; keymap_core::types::protocol::layer_status::RAW_REPORT_SIZE];
        data[0] = $report_id;
        data[1] = $layer;
        data[2] = $status;
        data
    }};
}

// Feed `[row, col, pressed]` events and compare the keyboard reports and raw packets
#[macro_export]
macro_rules! key_sequence_test {
    (
        keyboard: $keyboard:expr,
        sequence: [$([$row:expr, $col:expr, $pressed:expr]),* $(,)?],
        expected_reports: $reports:expr,
        expected_raw: $raw:expr
    ) => {
        embassy_futures::block_on(async {
            let mut keyboard = $keyboard;
            $(
                keyboard
                    .process_key_event(keymap_core::event::KeyEvent::new($row, $col, $pressed))
                    .await;
            )*
            assert_eq!(keyboard.writer().hid_reports(), $reports);
            assert_eq!(keyboard.writer().raw_reports(), $raw);
        });
    };
}
