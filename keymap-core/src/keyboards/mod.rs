//! Built-in keyboards.

use strum::{EnumCount, FromRepr};

pub mod kb16;
pub mod seven_skb;

/// Keyboards shipped with the crate, the discriminant is the keyboard id sent in layer reports
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, EnumCount)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BuiltinKeyboard {
    SevenSkb = seven_skb::KEYBOARD_ID,
    Kb16 = kb16::KEYBOARD_ID,
}

impl BuiltinKeyboard {
    pub fn from_id(id: u8) -> Option<Self> {
        Self::from_repr(id)
    }

    pub const fn keyboard_id(self) -> u8 {
        self as u8
    }

    /// QMK keyboard path, `-kb` of `qmk compile`
    pub const fn qmk_keyboard(self) -> &'static str {
        match self {
            BuiltinKeyboard::SevenSkb => "salicylic_acid3/7skb",
            BuiltinKeyboard::Kb16 => "doio/kb16/rev2",
        }
    }

    /// `(ROW, COL, NUM_LAYER)`
    pub const fn dimensions(self) -> (usize, usize, usize) {
        match self {
            BuiltinKeyboard::SevenSkb => (seven_skb::ROW, seven_skb::COL, seven_skb::NUM_LAYER),
            BuiltinKeyboard::Kb16 => (kb16::ROW, kb16::COL, kb16::NUM_LAYER),
        }
    }

    pub const fn vial_uid(self) -> [u8; 8] {
        match self {
            BuiltinKeyboard::SevenSkb => seven_skb::VIAL_KEYBOARD_UID,
            BuiltinKeyboard::Kb16 => kb16::VIAL_KEYBOARD_UID,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_keyboard() {
        assert_eq!(BuiltinKeyboard::COUNT, 2);
        assert_eq!(BuiltinKeyboard::from_id(1), Some(BuiltinKeyboard::SevenSkb));
        assert_eq!(BuiltinKeyboard::from_id(2), Some(BuiltinKeyboard::Kb16));
        assert_eq!(BuiltinKeyboard::from_id(3), None);
        assert_eq!(BuiltinKeyboard::Kb16.dimensions(), (4, 5, 4));
        assert_eq!(BuiltinKeyboard::SevenSkb.vial_uid(), seven_skb::VIAL_KEYBOARD_UID);
        assert_ne!(BuiltinKeyboard::SevenSkb.vial_uid(), BuiltinKeyboard::Kb16.vial_uid());
        assert_eq!(BuiltinKeyboard::SevenSkb.qmk_keyboard(), "salicylic_acid3/7skb");
    }
}
