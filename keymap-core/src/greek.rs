//! Greek letter custom keycodes.
//!
//! The letters occupy `SAFE_RANGE..SAFE_RANGE + 24` in alphabetical order. Each one
//! types a `/name` sequence, which the host side input method turns into the letter.

use keymap_types::keycode::qmk::SAFE_RANGE;
use strum::{EnumCount, FromRepr};

#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, EnumCount)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GreekLetter {
    Alpha = 0,
    Beta,
    Gamma,
    Delta,
    Epsilon,
    Zeta,
    Eta,
    Theta,
    Iota,
    Kappa,
    Lambda,
    Mu,
    Nu,
    Xi,
    Omicron,
    Pi,
    Rho,
    Sigma,
    Tau,
    Upsilon,
    Phi,
    Chi,
    Psi,
    Omega,
}

/// Typed text per letter, indexed by the offset from `SAFE_RANGE`
pub const GREEK_STRINGS: [&str; GreekLetter::COUNT] = [
    "/alpha", "/beta", "/gamma", "/delta", "/epsilon", "/zeta", "/eta", "/theta", "/iota", "/kappa", "/lambda", "/mu",
    "/nu", "/xi", "/omicron", "/pi", "/rho", "/sigma", "/tau", "/upsilon", "/phi", "/chi", "/psi", "/omega",
];

impl GreekLetter {
    pub const fn keycode(self) -> u16 {
        SAFE_RANGE + self as u16
    }

    pub fn from_keycode(keycode: u16) -> Option<Self> {
        keycode.checked_sub(SAFE_RANGE).and_then(Self::from_repr)
    }

    pub fn text(self) -> &'static str {
        GREEK_STRINGS[self as usize]
    }

    /// Enum name in `keymap.c`, `KC_ALPHA` .. `KC_OMEGA`
    pub fn c_name(self) -> &'static str {
        const NAMES: [&str; GreekLetter::COUNT] = [
            "KC_ALPHA", "KC_BETA", "KC_GAMMA", "KC_DELTA", "KC_EPSILON", "KC_ZETA", "KC_ETA", "KC_THETA",
            "KC_IOTA", "KC_KAPPA", "KC_LAMBDA", "KC_MU", "KC_NU", "KC_XI", "KC_OMICRON", "KC_PI", "KC_RHO",
            "KC_SIGMA", "KC_TAU", "KC_UPSILON", "KC_PHI", "KC_CHI", "KC_PSI", "KC_OMEGA",
        ];
        NAMES[self as usize]
    }
}
