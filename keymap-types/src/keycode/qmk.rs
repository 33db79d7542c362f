//! The QMK 16-bit keycode space.
//!
//! Ranges and constructors follow `quantum/keycodes.h` of QMK, so that keycodes
//! written by Vial, Vitaly or `keymap.c` can be compared directly.

use core::ops::RangeInclusive;

pub const KC_NO: u16 = 0x0000;
pub const KC_TRNS: u16 = 0x0001;

pub const QK_BASIC: RangeInclusive<u16> = 0x0000..=0x00FF;
pub const QK_MODS: RangeInclusive<u16> = 0x0100..=0x1FFF;
pub const QK_MOD_TAP: RangeInclusive<u16> = 0x2000..=0x3FFF;
pub const QK_LAYER_TAP: RangeInclusive<u16> = 0x4000..=0x4FFF;
pub const QK_LAYER_MOD: RangeInclusive<u16> = 0x5000..=0x51FF;
pub const QK_TO: u16 = 0x5200;
pub const QK_MOMENTARY: u16 = 0x5220;
pub const QK_DEF_LAYER: u16 = 0x5240;
pub const QK_TOGGLE_LAYER: u16 = 0x5260;
pub const QK_ONE_SHOT_LAYER: u16 = 0x5280;
pub const QK_ONE_SHOT_MOD: u16 = 0x52A0;
pub const QK_LAYER_TAP_TOGGLE: u16 = 0x52C0;
pub const QK_LIGHTING: RangeInclusive<u16> = 0x7800..=0x78FF;
pub const QK_BOOT: u16 = 0x7C00;
pub const QK_KB: RangeInclusive<u16> = 0x7E00..=0x7E3F;
pub const QK_USER: RangeInclusive<u16> = 0x7E40..=0x7FFF;

/// First keycode free for keymap-defined custom keycodes.
pub const SAFE_RANGE: u16 = 0x7E40;

/// Each single-layer range (`TO`, `MO`, `DF`, ...) holds 32 layers.
pub const LAYER_RANGE_SIZE: u16 = 0x20;

// RGB matrix keycodes of the lighting range
pub const RM_ON: u16 = 0x7840;
pub const RM_OFF: u16 = 0x7841;
pub const RM_TOGG: u16 = 0x7842;
pub const RM_NEXT: u16 = 0x7843;
pub const RM_PREV: u16 = 0x7844;
pub const RM_HUEU: u16 = 0x7845;
pub const RM_HUED: u16 = 0x7846;
pub const RM_SATU: u16 = 0x7847;
pub const RM_SATD: u16 = 0x7848;
pub const RM_VALU: u16 = 0x7849;
pub const RM_VALD: u16 = 0x784A;
pub const RM_SPDU: u16 = 0x784B;
pub const RM_SPDD: u16 = 0x784C;

/// `TO(layer)`
pub const fn to(layer: u8) -> u16 {
    QK_TO | (layer as u16 & 0x1F)
}

/// `MO(layer)`
pub const fn mo(layer: u8) -> u16 {
    QK_MOMENTARY | (layer as u16 & 0x1F)
}

/// `DF(layer)`
pub const fn df(layer: u8) -> u16 {
    QK_DEF_LAYER | (layer as u16 & 0x1F)
}

/// `TG(layer)`
pub const fn tg(layer: u8) -> u16 {
    QK_TOGGLE_LAYER | (layer as u16 & 0x1F)
}

/// `OSL(layer)`
pub const fn osl(layer: u8) -> u16 {
    QK_ONE_SHOT_LAYER | (layer as u16 & 0x1F)
}

/// `TT(layer)`
pub const fn tt(layer: u8) -> u16 {
    QK_LAYER_TAP_TOGGLE | (layer as u16 & 0x1F)
}

/// `LT(layer, kc)`, only basic keycodes can be tapped
pub const fn lt(layer: u8, keycode: u8) -> u16 {
    0x4000 | ((layer as u16 & 0x0F) << 8) | keycode as u16
}

/// `LM(layer, mods)`, `mods` is the 5-bit QMK modifier mask
pub const fn lm(layer: u8, mods: u8) -> u16 {
    0x5000 | ((layer as u16 & 0x0F) << 5) | (mods as u16 & 0x1F)
}

/// Custom keycode `SAFE_RANGE + index`
pub const fn user(index: u16) -> u16 {
    SAFE_RANGE + index
}

const fn layer_of(keycode: u16, base: u16) -> Option<u8> {
    if keycode >= base && keycode < base + LAYER_RANGE_SIZE {
        Some((keycode - base) as u8)
    } else {
        None
    }
}

/// `QK_MOMENTARY_GET_LAYER`, `None` if the keycode is not a `MO(n)`
pub const fn momentary_layer(keycode: u16) -> Option<u8> {
    layer_of(keycode, QK_MOMENTARY)
}

/// Layer of a `TO(n)`
pub const fn to_layer(keycode: u16) -> Option<u8> {
    layer_of(keycode, QK_TO)
}

pub const fn toggle_layer(keycode: u16) -> Option<u8> {
    layer_of(keycode, QK_TOGGLE_LAYER)
}

pub const fn default_layer(keycode: u16) -> Option<u8> {
    layer_of(keycode, QK_DEF_LAYER)
}

pub const fn one_shot_layer(keycode: u16) -> Option<u8> {
    layer_of(keycode, QK_ONE_SHOT_LAYER)
}

pub const fn layer_tap_toggle(keycode: u16) -> Option<u8> {
    layer_of(keycode, QK_LAYER_TAP_TOGGLE)
}
