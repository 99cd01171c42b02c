//! Tick timeline reconstruction and duration quantization

pub mod quantize;
pub mod tempo;
pub mod track;

pub use quantize::quantize;
pub use tempo::TempoMap;
pub use track::{scan_track, TickEvent, TickNote, TrackScan};
