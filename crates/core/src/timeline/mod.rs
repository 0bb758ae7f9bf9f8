use serde::{Deserialize, Serialize};

use crate::{LipSyncConfig, Segment, Viseme};

/// Largest grid the synthesizer will allocate, about 46 hours at 60 fps.
/// Longer clips degrade to an empty timeline.
pub const MAX_FRAME_COUNT: usize = 10_000_000;

/// Rounds half-way values toward positive infinity. Used for the frame count
/// and for both ends of every segment's frame range.
fn round_half_up(value: f64) -> f64 {
    let rounded = value.round();
    if rounded - value == -0.5 {
        rounded + 1.0
    } else {
        rounded
    }
}

/// Allocates segment durations and rasterizes them onto a frame grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Synthesizer {
    vowel_weight: f64,
    consonant_weight: f64,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new(&LipSyncConfig::default())
    }
}

impl Synthesizer {
    pub fn new(config: &LipSyncConfig) -> Self {
        Self {
            vowel_weight: config.vowel_weight,
            consonant_weight: config.consonant_weight,
        }
    }

    /// Fills in phoneme durations so that, together with the fixed pauses,
    /// they add up to `total_ms`.
    ///
    /// Each phoneme starts from an equal share of the time left after pauses,
    /// weighted by vowel or consonant, and the weighted values are then
    /// rescaled so their sum is exactly the available time. A negative
    /// available time (pauses longer than the clip) is passed through as is.
    pub fn allocate(&self, segments: &mut [Segment], total_ms: f64) {
        let pause_total_ms: f64 = segments
            .iter()
            .filter(|segment| segment.is_pause())
            .map(Segment::duration_ms)
            .sum();
        let available_ms = total_ms - pause_total_ms;
        if available_ms < 0.0 {
            tracing::warn!(
                total_ms,
                pause_total_ms,
                "pauses exceed the clip length, phonemes get negative durations"
            );
        }

        let phoneme_count = segments.iter().filter(|s| !s.is_pause()).count();
        if phoneme_count == 0 {
            return;
        }

        let base_ms = available_ms / phoneme_count as f64;
        let mut provisional_total = 0.0;
        for segment in segments.iter_mut() {
            if let Segment::Phoneme {
                viseme,
                duration_ms,
                ..
            } = segment
            {
                let weight = if viseme.is_vowel() {
                    self.vowel_weight
                } else {
                    self.consonant_weight
                };
                *duration_ms = base_ms * weight;
                provisional_total += *duration_ms;
            }
        }

        let scale = if provisional_total == 0.0 {
            1.0
        } else {
            available_ms / provisional_total
        };
        for segment in segments.iter_mut() {
            if let Segment::Phoneme { duration_ms, .. } = segment {
                *duration_ms *= scale;
            }
        }
    }

    /// Builds the per-frame viseme sequence for a clip of `duration_seconds`
    /// at `fps` frames per second.
    ///
    /// The grid has `round(duration_seconds * 1000 / ms_per_frame)` frames,
    /// all [`Viseme::MBP`] until segments are written over them in order.
    /// Frames past the grid are dropped. A zero or negative frame count, or
    /// one above [`MAX_FRAME_COUNT`], yields an empty timeline. `fps` must be
    /// positive; see [`LipSyncConfig::validate`].
    pub fn synthesize(
        &self,
        mut segments: Vec<Segment>,
        duration_seconds: f64,
        fps: f64,
    ) -> Timeline {
        let ms_per_frame = 1000.0 / fps;
        let total_ms = duration_seconds * 1000.0;
        let raw_count = round_half_up(total_ms / ms_per_frame);
        let frame_count = if raw_count.is_finite() && raw_count > 0.0 {
            if raw_count > MAX_FRAME_COUNT as f64 {
                tracing::warn!(
                    duration_seconds,
                    fps,
                    max_frames = MAX_FRAME_COUNT,
                    "clip is too long, timeline left empty"
                );
                0
            } else {
                raw_count as usize
            }
        } else {
            0
        };

        self.allocate(&mut segments, total_ms);

        let mut frames = vec![Viseme::MBP; frame_count];
        let mut current_ms = 0.0;
        for segment in &segments {
            let start = round_half_up(current_ms / ms_per_frame).max(0.0);
            let end = round_half_up((current_ms + segment.duration_ms()) / ms_per_frame)
                .min(frame_count as f64);
            if end > start {
                frames[start as usize..end as usize].fill(segment.viseme());
            }
            current_ms += segment.duration_ms();
        }

        tracing::debug!(
            frames = frame_count,
            ms_per_frame,
            segments = segments.len(),
            "synthesized timeline"
        );

        Timeline {
            frames,
            ms_per_frame,
            duration_seconds,
            segments,
        }
    }
}

/// Synthesizes with the default weights.
pub fn synthesize(segments: Vec<Segment>, duration_seconds: f64, fps: f64) -> Timeline {
    Synthesizer::default().synthesize(segments, duration_seconds, fps)
}

/// Frame-accurate viseme sequence for one audio clip. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    frames: Vec<Viseme>,
    ms_per_frame: f64,
    duration_seconds: f64,
    segments: Vec<Segment>,
}

impl Timeline {
    pub fn frames(&self) -> &[Viseme] {
        &self.frames
    }

    pub fn ms_per_frame(&self) -> f64 {
        self.ms_per_frame
    }

    /// Segments with their allocated durations, in playback order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Length of the audio clip the timeline was built for.
    pub fn duration_ms(&self) -> f64 {
        self.duration_seconds * 1000.0
    }

    pub fn into_parts(self) -> (Vec<Viseme>, f64) {
        (self.frames, self.ms_per_frame)
    }

    /// Frame shown `elapsed_ms` after playback started.
    pub fn frame_index_at(&self, elapsed_ms: f64) -> usize {
        (elapsed_ms.max(0.0) / self.ms_per_frame).floor() as usize
    }

    /// Viseme shown `elapsed_ms` after playback started, or `None` once the
    /// last frame has passed.
    pub fn viseme_at(&self, elapsed_ms: f64) -> Option<Viseme> {
        self.frames.get(self.frame_index_at(elapsed_ms)).copied()
    }

    /// Collapses consecutive equal frames.
    pub fn runs(&self) -> Vec<VisemeRun> {
        let mut runs: Vec<VisemeRun> = Vec::new();
        for (index, viseme) in self.frames.iter().enumerate() {
            match runs.last_mut() {
                Some(run) if run.viseme == *viseme => run.frames += 1,
                _ => runs.push(VisemeRun {
                    viseme: *viseme,
                    start_frame: index,
                    frames: 1,
                }),
            }
        }
        runs
    }
}

/// A stretch of identical frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisemeRun {
    pub viseme: Viseme,
    pub start_frame: usize,
    pub frames: usize,
}

/// Consumer-side clock for stepping through a [`Timeline`] in real time.
/// Reports a viseme only when the frame index changes, so a renderer redraws
/// once per frame. Stopping is just dropping the clock.
#[derive(Debug, Default, Clone)]
pub struct PlaybackClock {
    pub elapsed_ms: f64,
    last_frame: Option<usize>,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
        self.last_frame = None;
    }

    pub fn advance(&mut self, delta_ms: f64) {
        self.elapsed_ms = (self.elapsed_ms + delta_ms).max(0.0);
    }

    /// Returns the viseme to draw if the clock has moved onto a new frame.
    pub fn poll(&mut self, timeline: &Timeline) -> Option<Viseme> {
        let frame = timeline.frame_index_at(self.elapsed_ms);
        if self.last_frame == Some(frame) {
            return None;
        }
        let viseme = timeline.frames().get(frame).copied()?;
        self.last_frame = Some(frame);
        Some(viseme)
    }

    pub fn is_finished(&self, timeline: &Timeline) -> bool {
        self.elapsed_ms >= timeline.duration_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment;

    fn expected_len(duration_seconds: f64, fps: f64) -> usize {
        (duration_seconds * 1000.0 / (1000.0 / fps)).round() as usize
    }

    fn phoneme_total(timeline: &Timeline) -> f64 {
        timeline
            .segments()
            .iter()
            .filter(|s| !s.is_pause())
            .map(Segment::duration_ms)
            .sum()
    }

    #[test]
    fn hello_scenario() {
        let timeline = synthesize(segment("hɛloʊ"), 2.0, 24.0);

        assert!((timeline.ms_per_frame() - 41.6667).abs() < 1e-3);
        assert_eq!(timeline.len(), 48);
        assert!((phoneme_total(&timeline) - 2000.0).abs() < 1e-6);

        let durations: Vec<f64> = timeline.segments().iter().map(Segment::duration_ms).collect();
        assert!((durations[0] - durations[2]).abs() < 1e-9);
        assert!((durations[1] / durations[0] - 1.3 / 0.8).abs() < 1e-9);

        let frames = timeline.frames();
        assert!(frames[..9].iter().all(|v| *v == Viseme::MBP));
        assert!(frames[9..24].iter().all(|v| *v == Viseme::E));
        assert!(frames[24..33].iter().all(|v| *v == Viseme::LN));
        assert!(frames[33..].iter().all(|v| *v == Viseme::O));
    }

    #[test]
    fn pause_scenario() {
        let timeline = synthesize(segment("a.b"), 3.0, 30.0);

        assert_eq!(timeline.len(), 90);
        assert!((phoneme_total(&timeline) - 2500.0).abs() < 1e-6);

        let segments = timeline.segments();
        assert!(segments[1].is_pause());
        let pause_start_ms = segments[0].duration_ms();
        let pause_end_ms = pause_start_ms + segments[1].duration_ms();
        let pause_start = (pause_start_ms / timeline.ms_per_frame()).round() as usize;
        let pause_end = (pause_end_ms / timeline.ms_per_frame()).round() as usize;
        assert_eq!(pause_start, 46);
        assert_eq!(pause_end - pause_start, 15);

        let frames = timeline.frames();
        assert!(frames[..pause_start].iter().all(|v| *v == Viseme::A));
        assert!(frames[pause_start..pause_end]
            .iter()
            .all(|v| *v == Viseme::MBP));
        assert!(frames[pause_end..].iter().all(|v| *v == Viseme::MBP));
    }

    #[test]
    fn rounds_half_way_values_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(2.4999), 2.0);
        assert_eq!(round_half_up(0.49999999999999994), 0.0);

        let timeline = synthesize(segment(""), 0.49999999999999994, 1.0);
        assert!(timeline.is_empty());
    }

    #[test]
    fn oversized_clip_gives_empty_timeline() {
        let timeline = synthesize(segment("a"), 1e300, 24.0);
        assert!(timeline.is_empty());

        let just_fits = MAX_FRAME_COUNT as f64 / 1000.0;
        assert_eq!(synthesize(segment("a"), just_fits, 1000.0).len(), MAX_FRAME_COUNT);
    }

    #[test]
    fn frame_count_ignores_segment_content() {
        let cases = [
            ("", 1.0, 24.0),
            (".", 0.3, 30.0),
            ("hɛloʊ", 2.0, 24.0),
            ("ðɪs ɪz ə tɛst", 3.7, 60.0),
            ("a.b.c.d", 1.0, 12.5),
            ("tʃiːz", 0.01, 25.0),
        ];

        for (input, duration, fps) in cases {
            let timeline = synthesize(segment(input), duration, fps);
            assert_eq!(timeline.len(), expected_len(duration, fps), "input {input:?}");
        }
    }

    #[test]
    fn phoneme_durations_fill_available_time() {
        let cases = [
            ("m", 1.0),
            ("hɛloʊ", 2.0),
            ("aaaa", 0.5),
            ("ptk.sfv", 4.2),
            ("ə.ə.ə", 0.8),
        ];

        for (input, duration) in cases {
            let segments = segment(input);
            let pauses: f64 = segments
                .iter()
                .filter(|s| s.is_pause())
                .map(Segment::duration_ms)
                .sum();
            let available = duration * 1000.0 - pauses;

            let timeline = synthesize(segments, duration, 24.0);
            let total = phoneme_total(&timeline);
            let tolerance = 1e-6 * available.abs().max(1.0);
            assert!((total - available).abs() <= tolerance, "input {input:?}");
        }
    }

    #[test]
    fn repeated_synthesis_is_identical() {
        let first = synthesize(segment("ðə kwɪk braʊn fɒks.dʒʌmps"), 3.3, 29.97);
        let second = synthesize(segment("ðə kwɪk braʊn fɒks.dʒʌmps"), 3.3, 29.97);

        assert_eq!(first, second);
    }

    #[test]
    fn no_phonemes_means_closed_mouth() {
        for input in ["", ".", "..."] {
            let timeline = synthesize(segment(input), 2.0, 24.0);
            assert_eq!(timeline.len(), 48);
            assert!(timeline.frames().iter().all(|v| *v == Viseme::MBP));
        }
    }

    #[test]
    fn zero_duration_gives_empty_timeline() {
        let timeline = synthesize(segment("hɛloʊ"), 0.0, 24.0);

        assert!(timeline.is_empty());
        assert!(phoneme_total(&timeline).abs() < 1e-12);
    }

    #[test]
    fn pauses_longer_than_clip_do_not_panic() {
        let timeline = synthesize(segment("a...."), 1.0, 24.0);

        assert_eq!(timeline.len(), 24);
        assert!(timeline.frames().iter().all(|v| *v == Viseme::MBP));
        assert!((phoneme_total(&timeline) + 1000.0).abs() < 1e-9);
    }

    #[test]
    fn equal_weights_split_evenly() {
        let config = LipSyncConfig {
            vowel_weight: 1.0,
            consonant_weight: 1.0,
            ..Default::default()
        };
        let timeline = Synthesizer::new(&config).synthesize(segment("mama"), 1.0, 20.0);

        for segment in timeline.segments() {
            assert!((segment.duration_ms() - 250.0).abs() < 1e-9);
        }
        let runs = timeline.runs();
        assert_eq!(runs.len(), 4);
        assert!(runs.iter().all(|run| run.frames == 5));
    }

    #[test]
    fn runs_cover_every_frame() {
        let timeline = synthesize(segment("hɛloʊ"), 2.0, 24.0);
        let runs = timeline.runs();

        assert_eq!(
            runs.iter().map(|r| r.viseme).collect::<Vec<_>>(),
            vec![Viseme::MBP, Viseme::E, Viseme::LN, Viseme::O]
        );
        assert_eq!(runs.iter().map(|r| r.frames).sum::<usize>(), timeline.len());
        assert_eq!(runs[1].start_frame, 9);
    }

    #[test]
    fn playback_lookup() {
        let timeline = synthesize(segment("hɛloʊ"), 2.0, 24.0);

        assert_eq!(timeline.frame_index_at(0.0), 0);
        assert_eq!(timeline.frame_index_at(-5.0), 0);
        assert_eq!(timeline.viseme_at(500.0), Some(Viseme::E));
        assert_eq!(timeline.viseme_at(1999.0), Some(Viseme::O));
        assert_eq!(timeline.viseme_at(2000.0), None);

        let (frames, ms_per_frame) = timeline.into_parts();
        assert_eq!(frames.len(), 48);
        assert!(ms_per_frame > 41.0);
    }

    #[test]
    fn clock_reports_each_frame_once() {
        let timeline = synthesize(segment("hɛloʊ"), 2.0, 24.0);
        let mut clock = PlaybackClock::new();

        assert_eq!(clock.poll(&timeline), Some(Viseme::MBP));
        clock.advance(10.0);
        assert_eq!(clock.poll(&timeline), None);

        clock.advance(500.0);
        assert_eq!(clock.poll(&timeline), Some(Viseme::E));
        assert!(!clock.is_finished(&timeline));

        clock.advance(5000.0);
        assert_eq!(clock.poll(&timeline), None);
        assert!(clock.is_finished(&timeline));

        clock.reset();
        assert_eq!(clock.elapsed_ms, 0.0);
        assert_eq!(clock.poll(&timeline), Some(Viseme::MBP));
    }
}
