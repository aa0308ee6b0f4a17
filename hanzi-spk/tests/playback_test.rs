//! Tests for audio sinks

use hanzi_spk::decoder::{decode_payload, decode_pcm16, DecodeError};
use hanzi_spk::playback::{read_audio_file, AudioSink, NullSink, WavFileSink};
use hanzi_spk::SpeechError;

#[tokio::test]
async fn test_wav_sink_writes_readable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.wav");

    let bytes: Vec<u8> = [0i16, 16384, -16384, 32767]
        .iter()
        .flat_map(|s| s.to_le_bytes())
        .collect();
    let buffer = decode_pcm16(&bytes, 24000, 2).unwrap();

    let sink = WavFileSink::new(&path);
    sink.play(&buffer).await.unwrap();

    let written = std::fs::read(&path).unwrap();
    let decoded = decode_payload(&written, 8000, 1).unwrap();
    assert_eq!(decoded, buffer);
}

#[tokio::test]
async fn test_wav_sink_missing_directory_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let sink = WavFileSink::new(dir.path().join("missing").join("out.wav"));
    let buffer = decode_pcm16(&[0, 0], 24000, 1).unwrap();

    assert!(sink.play(&buffer).await.is_err());
}

#[tokio::test]
async fn test_null_sink_accepts_anything() {
    let buffer = decode_pcm16(&[], 24000, 1).unwrap();
    assert!(NullSink.play(&buffer).await.is_ok());
    assert_eq!(NullSink.name(), "null");
}

#[test]
fn test_read_audio_file_raw_and_errors() {
    let dir = tempfile::tempdir().unwrap();

    let raw = dir.path().join("tone.pcm");
    std::fs::write(&raw, [0u8, 0, 0, 64]).unwrap();
    let buffer = read_audio_file(&raw, 16000, 1).unwrap();
    assert_eq!(buffer.sample_rate(), 16000);
    assert_eq!(buffer.channel(0).unwrap(), &[0.0, 0.5]);

    let odd = dir.path().join("odd.pcm");
    std::fs::write(&odd, [1u8, 2, 3]).unwrap();
    assert!(matches!(
        read_audio_file(&odd, 16000, 1),
        Err(SpeechError::Decode(DecodeError::OddByteLength(3)))
    ));

    assert!(matches!(
        read_audio_file(&dir.path().join("absent.pcm"), 16000, 1),
        Err(SpeechError::Io(_))
    ));
}
