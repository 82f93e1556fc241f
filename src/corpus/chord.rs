//! Simultaneous notes and their normal-order pitch-class token.

use super::pitch::Pitch;

/// Two or more pitches sounding from the same onset on one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    pitches: Vec<Pitch>,
}

impl Chord {
    pub fn new(pitches: Vec<Pitch>) -> Self {
        Self { pitches }
    }

    /// Pitches in the order they were added.
    pub fn pitches(&self) -> &[Pitch] {
        &self.pitches
    }

    /// Pitch classes in normal order.
    ///
    /// Of all rotations of the sorted pitch-class set, picks the one with
    /// the smallest span from first to last element. Ties go to the rotation
    /// most packed to the left (smallest interval from the first element to
    /// the second, then the third, ...), then to the lowest first element.
    pub fn normal_order(&self) -> Vec<u8> {
        let mut classes: Vec<u8> = self.pitches.iter().map(|p| p.pitch_class()).collect();
        classes.sort_unstable();
        classes.dedup();

        let n = classes.len();
        if n < 2 {
            return classes;
        }

        let rotations = (0..n).map(|start| {
            let rotation: Vec<u8> = (0..n).map(|i| classes[(start + i) % n]).collect();
            let rank = rotation_rank(&rotation);
            (rank, rotation)
        });

        rotations
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, rotation)| rotation)
            .unwrap_or_default()
    }

    /// Dot-joined normal order, e.g. `4.7.10.0` for a C dominant seventh.
    pub fn token(&self) -> String {
        self.normal_order()
            .iter()
            .map(|pc| pc.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Sort key for one rotation: span, then left-packed intervals, then the
/// starting pitch class.
fn rotation_rank(rotation: &[u8]) -> Vec<u8> {
    let first = rotation[0];
    let interval = |pc: u8| (pc + 12 - first) % 12;
    let last = rotation.len() - 1;

    let mut rank = Vec::with_capacity(rotation.len() + 1);
    rank.push(interval(rotation[last]));
    rank.extend(rotation[1..last].iter().map(|&pc| interval(pc)));
    rank.push(first);
    rank
}
