//! Piecewise-constant tempo map

/// One constant-tempo span starting at `tick`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    /// First tick governed by this tempo
    tick: u64,
    /// Microseconds per beat
    tempo: u32,
    /// Accumulated `ticks * tempo` up to `tick`
    elapsed: u128,
}

/// Converts absolute ticks to milliseconds, integrating tempo changes
///
/// A tempo change affects only the ticks after it. Conversion is exact in
/// tick-microseconds and divided by `ticks_per_beat * 1000` once at the end.
#[derive(Debug, Clone)]
pub struct TempoMap {
    ticks_per_beat: u16,
    segments: Vec<Segment>,
}

impl TempoMap {
    pub fn new(ticks_per_beat: u16, default_tempo: u32) -> Self {
        Self {
            ticks_per_beat,
            segments: vec![Segment {
                tick: 0,
                tempo: default_tempo,
                elapsed: 0,
            }],
        }
    }

    /// Build a map from `(tick, tempo)` changes in any order
    ///
    /// Changes sharing a tick keep the last one given.
    pub fn from_changes(
        ticks_per_beat: u16,
        default_tempo: u32,
        changes: impl IntoIterator<Item = (u64, u32)>,
    ) -> Self {
        let mut changes: Vec<(u64, u32)> = changes.into_iter().collect();
        changes.sort_by_key(|&(tick, _)| tick);

        let mut map = Self::new(ticks_per_beat, default_tempo);
        for (tick, tempo) in changes {
            map.push(tick, tempo);
        }
        map
    }

    /// Append a tempo change; `tick` must not precede the last change
    pub fn push(&mut self, tick: u64, tempo: u32) {
        let Some(last) = self.segments.last_mut() else {
            return;
        };
        debug_assert!(tick >= last.tick, "tempo changes must be pushed in order");

        if tick <= last.tick {
            last.tempo = tempo;
            return;
        }

        let elapsed = last.elapsed + u128::from(tick - last.tick) * u128::from(last.tempo);
        self.segments.push(Segment {
            tick,
            tempo,
            elapsed,
        });
    }

    /// Tempo in effect at `tick`
    pub fn tempo_at(&self, tick: u64) -> u32 {
        self.segment_at(tick).tempo
    }

    /// Absolute time of `tick` in milliseconds
    pub fn ms_at(&self, tick: u64) -> f64 {
        self.elapsed_at(tick) as f64 / self.divisor()
    }

    /// Length of the span `[start, end)` in milliseconds
    pub fn span_ms(&self, start: u64, end: u64) -> f64 {
        let span = self.elapsed_at(end).saturating_sub(self.elapsed_at(start));
        span as f64 / self.divisor()
    }

    fn segment_at(&self, tick: u64) -> &Segment {
        let idx = self.segments.partition_point(|s| s.tick <= tick);
        &self.segments[idx.saturating_sub(1)]
    }

    fn elapsed_at(&self, tick: u64) -> u128 {
        let seg = self.segment_at(tick);
        seg.elapsed + u128::from(tick - seg.tick) * u128::from(seg.tempo)
    }

    fn divisor(&self) -> f64 {
        f64::from(self.ticks_per_beat.max(1)) * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_tempo() {
        let map = TempoMap::new(480, 500_000);
        assert_eq!(map.span_ms(0, 480), 500.0);
        assert_eq!(map.ms_at(960), 1000.0);
    }

    #[test]
    fn test_tempo_change_is_not_retroactive() {
        let map = TempoMap::from_changes(480, 500_000, [(480, 250_000)]);
        assert_eq!(map.ms_at(480), 500.0);
        assert_eq!(map.ms_at(960), 750.0);
        assert_eq!(map.tempo_at(479), 500_000);
        assert_eq!(map.tempo_at(480), 250_000);
    }

    #[test]
    fn test_span_integrates_segments() {
        let map = TempoMap::from_changes(480, 500_000, [(480, 250_000), (720, 1_000_000)]);
        // 240 ticks at 120 BPM, 240 at 240 BPM, 240 at 60 BPM
        assert_eq!(map.span_ms(240, 960), 250.0 + 125.0 + 500.0);
    }

    #[test]
    fn test_same_tick_last_wins() {
        let map = TempoMap::from_changes(96, 500_000, [(0, 400_000), (0, 600_000)]);
        assert_eq!(map.tempo_at(0), 600_000);
        assert_eq!(map.ms_at(96), 600.0);
    }

    #[test]
    fn test_unsorted_changes() {
        let map = TempoMap::from_changes(480, 500_000, [(960, 500_000), (480, 250_000)]);
        assert_eq!(map.ms_at(1440), 500.0 + 250.0 + 500.0);
    }
}
