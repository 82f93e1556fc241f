//! Full pipeline on a tiny generated corpus.

use std::path::Path;

use candle_core::Device;
use midi_lstm::config::{ModelConfig, TrainingConfig};
use midi_lstm::corpus::{Token, load_tokens};
use midi_lstm::pipeline::{Stage, TrainingPipeline};
use midly::num::{u4, u7, u15, u28};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};

/// Write a single-track melody; each entry of `onsets` sounds together.
fn write_melody(path: &Path, program: Option<u8>, onsets: &[&[u8]]) {
    let mut track: Vec<TrackEvent<'static>> = Vec::new();
    let midi = |delta: u32, message: MidiMessage| TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(0),
            message,
        },
    };

    if let Some(program) = program {
        track.push(midi(0, MidiMessage::ProgramChange { program: u7::new(program) }));
    }
    for keys in onsets {
        for &key in *keys {
            track.push(midi(0, MidiMessage::NoteOn { key: u7::new(key), vel: u7::new(90) }));
        }
        for (i, &key) in keys.iter().enumerate() {
            let delta = if i == 0 { 480 } else { 0 };
            track.push(midi(delta, MidiMessage::NoteOff { key: u7::new(key), vel: u7::new(0) }));
        }
    }
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let mut smf = Smf::new(Header::new(Format::SingleTrack, Timing::Metrical(u15::new(480))));
    smf.tracks.push(track);
    let mut buf = Vec::new();
    smf.write(&mut buf).unwrap();
    std::fs::write(path, &buf).unwrap();
}

#[test]
fn trains_end_to_end_on_two_files() {
    let root = tempfile::tempdir().unwrap();
    let midi_dir = root.path().join("midi_songs");
    std::fs::create_dir_all(&midi_dir).unwrap();

    // a.mid: instrument-partitioned, b.mid: flat
    write_melody(&midi_dir.join("a.mid"), Some(0), &[&[60], &[64], &[67], &[60, 64, 67]]);
    write_melody(&midi_dir.join("b.mid"), None, &[&[62], &[65], &[69], &[57, 60, 64]]);

    let config = TrainingConfig {
        midi_dir: midi_dir.clone(),
        notes_path: root.path().join("data").join("notes"),
        checkpoint_dir: root.path().join("ckpt"),
        window: 3,
        epochs: 2,
        batch_size: 2,
        model: ModelConfig {
            lstm_units: 4,
            dense_units: 4,
            dropout: 0.4,
        },
        ..Default::default()
    };
    let notes_path = config.notes_path.clone();

    let mut pipeline = TrainingPipeline::new(config, Device::Cpu);
    let summary = pipeline.run().unwrap();
    assert_eq!(pipeline.stage(), Stage::Done);

    let tokens = load_tokens(&notes_path).unwrap();
    let expected: Vec<Token> = ["C4", "E4", "G4", "0.4.7", "D4", "F4", "A4", "9.0.4"]
        .map(Token::from)
        .to_vec();
    assert_eq!(tokens, expected);

    assert_eq!(summary.examples, 5);
    assert_eq!(summary.vocab_size, 8);
    assert_eq!(summary.epochs, 2);
    assert!(!summary.checkpoints.is_empty());
    for path in &summary.checkpoints {
        assert!(path.starts_with(root.path().join("ckpt")));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("weights-improvement-0"), "{name}");
        assert!(name.ends_with("-bigger.safetensors"), "{name}");
    }
}

#[test]
fn corpus_shorter_than_window_fails() {
    let root = tempfile::tempdir().unwrap();
    let midi_dir = root.path().join("midi_songs");
    std::fs::create_dir_all(&midi_dir).unwrap();
    write_melody(&midi_dir.join("short.mid"), None, &[&[60], &[62]]);

    let config = TrainingConfig {
        midi_dir,
        notes_path: root.path().join("notes"),
        checkpoint_dir: root.path().to_path_buf(),
        ..Default::default()
    };
    let mut pipeline = TrainingPipeline::new(config, Device::Cpu);
    let err = pipeline.run().unwrap_err();
    assert!(matches!(
        err,
        midi_lstm::Error::InsufficientTokens {
            tokens: 2,
            window: 160
        }
    ));
}
