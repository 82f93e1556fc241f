//! MIDI key numbers and their pitch names.

use std::fmt;

/// Pitch-class spellings, sharps for C#/F#/G#, flats (`-`) for E-/B-.
const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "E-", "E", "F", "F#", "G", "G#", "A", "B-", "B",
];

/// A MIDI key number (0–127). Key 60 is middle C, `C4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pitch(u8);

impl Pitch {
    pub fn new(key: u8) -> Self {
        Self(key)
    }

    pub fn key(self) -> u8 {
        self.0
    }

    /// Pitch class 0–11, C = 0.
    pub fn pitch_class(self) -> u8 {
        self.0 % 12
    }

    /// Octave number, with key 0 in octave -1.
    pub fn octave(self) -> i8 {
        (self.0 / 12) as i8 - 1
    }

    /// Name plus octave, e.g. `C4`, `F#3`, `B-2`.
    pub fn name(self) -> String {
        format!(
            "{}{}",
            PITCH_CLASS_NAMES[self.pitch_class() as usize],
            self.octave()
        )
    }
}

impl From<midly::num::u7> for Pitch {
    fn from(key: midly::num::u7) -> Self {
        Self(key.as_int())
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_c_is_c4() {
        assert_eq!(Pitch::new(60).name(), "C4");
        assert_eq!(Pitch::new(60).pitch_class(), 0);
    }

    #[test]
    fn accidentals_follow_spelling_table() {
        assert_eq!(Pitch::new(61).name(), "C#4");
        assert_eq!(Pitch::new(63).name(), "E-4");
        assert_eq!(Pitch::new(66).name(), "F#4");
        assert_eq!(Pitch::new(70).name(), "B-4");
    }

    #[test]
    fn octave_boundaries() {
        assert_eq!(Pitch::new(0).name(), "C-1");
        assert_eq!(Pitch::new(11).name(), "B-1");
        assert_eq!(Pitch::new(59).name(), "B3");
        assert_eq!(Pitch::new(127).name(), "G9");
    }
}
