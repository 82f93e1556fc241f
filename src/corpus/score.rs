//! Score model built from a Standard MIDI File.
//!
//! A [`Score`] keeps, per track, the note onsets and program changes found
//! in the file. Note-ons that share a track, channel and tick are merged
//! into one [`Chord`]; a lone note-on stays a single note.

use std::collections::{BTreeMap, HashMap};

use midly::{MidiMessage, Smf, TrackEventKind};

use super::chord::Chord;
use super::pitch::Pitch;
use crate::Result;

/// MIDI channel 10, reserved for percussion in General MIDI.
pub const PERCUSSION_CHANNEL: u8 = 9;

/// Sound source a part is played on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instrument {
    /// General MIDI program number 0–127.
    Program(u8),
    Percussion,
}

/// One entry of a part's event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Marks the instrument of the part that follows.
    Instrument(Instrument),
    Note(Pitch),
    Chord(Chord),
}

/// Why a score cannot be split into instrument parts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartitionError {
    /// The file carries no program change at all.
    #[error("score has no instrument assignments")]
    NoInstruments,
    /// Instruments are assigned but no notes were played on any of them.
    #[error("score has instruments but no notes")]
    NoParts,
}

/// All elements played on one instrument, in onset order.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub instrument: Instrument,
    elements: Vec<Element>,
}

impl Part {
    /// The part's event stream: its instrument marker, then notes and chords.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }
}

/// Pitches starting together on one channel.
#[derive(Debug, Clone, PartialEq)]
struct Onset {
    tick: u64,
    channel: u8,
    pitches: Vec<Pitch>,
}

impl Onset {
    fn element(&self) -> Element {
        match self.pitches.as_slice() {
            [single] => Element::Note(*single),
            _ => Element::Chord(Chord::new(self.pitches.clone())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ProgramChange {
    tick: u64,
    channel: u8,
    program: u8,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Track {
    onsets: Vec<Onset>,
    programs: Vec<ProgramChange>,
}

impl Track {
    fn from_events(events: &[midly::TrackEvent<'_>]) -> Self {
        let mut tick = 0u64;
        let mut grouped: BTreeMap<(u64, u8), Vec<Pitch>> = BTreeMap::new();
        let mut track = Track::default();

        for event in events {
            tick += event.delta.as_int() as u64;
            let TrackEventKind::Midi { channel, message } = event.kind else {
                continue;
            };
            match message {
                MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                    grouped
                        .entry((tick, channel.as_int()))
                        .or_default()
                        .push(Pitch::from(key));
                }
                MidiMessage::ProgramChange { program } => {
                    track.programs.push(ProgramChange {
                        tick,
                        channel: channel.as_int(),
                        program: program.as_int(),
                    });
                }
                _ => {}
            }
        }

        track.onsets = grouped
            .into_iter()
            .map(|((tick, channel), pitches)| Onset {
                tick,
                channel,
                pitches,
            })
            .collect();
        track
    }
}

/// Parsed MIDI file.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    tracks: Vec<Track>,
}

impl Score {
    /// Parse raw Standard MIDI File bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let smf = Smf::parse(bytes)?;
        Ok(Self::from_smf(&smf))
    }

    pub fn from_smf(smf: &Smf<'_>) -> Self {
        let tracks = smf
            .tracks
            .iter()
            .map(|events| Track::from_events(events))
            .collect();
        Self { tracks }
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Total note and chord onsets across all tracks.
    pub fn onset_count(&self) -> usize {
        self.tracks.iter().map(|t| t.onsets.len()).sum()
    }

    /// Group every onset by the instrument it is played on.
    ///
    /// A note's instrument is the latest program change on its channel at or
    /// before its tick (program 0 if none precedes it); channel 10 is always
    /// percussion. Parts are ordered by discovery: tracks are walked in index
    /// order and, within a track, program changes and onsets in tick order;
    /// an instrument is discovered at its first program change or note.
    /// Instruments that never play a note produce no part.
    pub fn partition_by_instrument(&self) -> std::result::Result<Vec<Part>, PartitionError> {
        let programs = self.program_timeline();
        if programs.is_empty() {
            return Err(PartitionError::NoInstruments);
        }

        let mut discovered: Vec<Instrument> = Vec::new();
        let mut discover = |instrument: Instrument| {
            if !discovered.contains(&instrument) {
                discovered.push(instrument);
            }
        };
        let mut by_instrument: HashMap<Instrument, Vec<(u64, usize, Element)>> = HashMap::new();

        for (track_index, track) in self.tracks.iter().enumerate() {
            let mut changes = track.programs.iter().peekable();
            for onset in &track.onsets {
                // A program change at the same tick precedes the note.
                while let Some(change) = changes.next_if(|c| c.tick <= onset.tick) {
                    discover(program_instrument(change.channel, change.program));
                }
                let instrument = instrument_at(&programs, onset.channel, onset.tick);
                discover(instrument);
                by_instrument.entry(instrument).or_default().push((
                    onset.tick,
                    track_index,
                    onset.element(),
                ));
            }
            for change in changes {
                discover(program_instrument(change.channel, change.program));
            }
        }

        let parts: Vec<Part> = discovered
            .into_iter()
            .filter_map(|instrument| {
                let mut entries = by_instrument.remove(&instrument)?;
                entries.sort_by_key(|&(tick, track_index, _)| (tick, track_index));

                let mut elements = Vec::with_capacity(entries.len() + 1);
                elements.push(Element::Instrument(instrument));
                elements.extend(entries.into_iter().map(|(_, _, element)| element));
                Some(Part {
                    instrument,
                    elements,
                })
            })
            .collect();

        if parts.is_empty() {
            return Err(PartitionError::NoParts);
        }
        Ok(parts)
    }

    /// Every note and chord in the file, ordered by onset then track.
    pub fn flat_notes(&self) -> Vec<Element> {
        let mut entries: Vec<(u64, usize, Element)> = self
            .tracks
            .iter()
            .enumerate()
            .flat_map(|(track_index, track)| {
                track
                    .onsets
                    .iter()
                    .map(move |onset| (onset.tick, track_index, onset.element()))
            })
            .collect();
        entries.sort_by_key(|&(tick, track_index, _)| (tick, track_index));
        entries.into_iter().map(|(_, _, element)| element).collect()
    }

    /// Per-channel program changes across all tracks, ordered by tick.
    fn program_timeline(&self) -> Vec<ProgramChange> {
        let mut programs: Vec<ProgramChange> = self
            .tracks
            .iter()
            .flat_map(|t| t.programs.iter().copied())
            .collect();
        programs.sort_by_key(|p| p.tick);
        programs
    }
}

fn instrument_at(programs: &[ProgramChange], channel: u8, tick: u64) -> Instrument {
    let program = programs
        .iter()
        .filter(|p| p.channel == channel && p.tick <= tick)
        .last()
        .map_or(0, |p| p.program);
    program_instrument(channel, program)
}

fn program_instrument(channel: u8, program: u8) -> Instrument {
    if channel == PERCUSSION_CHANNEL {
        Instrument::Percussion
    } else {
        Instrument::Program(program)
    }
}
