//! Raster sweep encoder
//!
//! Every image row gets its own sine voice. Voices are tabled by ascending
//! pitch: slot `k` always sounds `low_freq * 2^(octaves * k / height)`.
//! Image rows are counted from the top, so row `y` plays through slot
//! `height - 1 - y` and higher rows sound higher.
//!
//! Each voice feeds two panners:
//! - its own amplitude-law row panner, used by the stereo snapshot, whose
//!   azimuth encodes where the row's brightness sits left to right
//! - the shared HRTF master panner, used by the sweep, whose azimuth scans
//!   from -90 to 90 while each row's loudness follows its pixel profile

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{
    check_dimensions, validate_common, Encoder, SweepSchedule, FADE_LENGTH,
    SWEEP_AMPLITUDE_SCALE, SWEEP_GAP,
};
use crate::error::{Result, SonifyError};
use crate::graph::{
    AudioGraph, Envelope, GeneratorId, GeneratorKind, PannerId, PanningStrategy, Param,
};
use crate::image::{luma_brightness, BrightnessFn, ImageGrid, Pixel, MAX_BRIGHTNESS};

/// Hard-left azimuth in degrees
const LEFT: f64 = -90.0;

/// Hard-right azimuth in degrees
const RIGHT: f64 = 90.0;

fn default_low_freq() -> f64 {
    500.0
}

fn default_high_freq() -> f64 {
    5000.0
}

fn default_sweep_delay() -> f64 {
    0.5
}

fn default_sweep_duration() -> f64 {
    4.0
}

fn default_sweep_count() -> usize {
    4
}

/// Construction parameters for [`RasterSweepEncoder`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterSweepConfig {
    pub width: usize,
    pub height: usize,
    /// Pitch of the bottom row (Hz)
    #[serde(default = "default_low_freq")]
    pub low_freq: f64,
    /// Pitch ceiling (Hz); the top row sounds just below it
    #[serde(default = "default_high_freq")]
    pub high_freq: f64,
    /// Seconds the snapshot is heard before the sweep in non-detailed mode
    #[serde(default = "default_sweep_delay")]
    pub sweep_delay: f64,
    /// Seconds per left-to-right sweep
    #[serde(default = "default_sweep_duration")]
    pub sweep_duration: f64,
    #[serde(default = "default_sweep_count")]
    pub sweep_count: usize,
    /// Treat dark pixels as loud, for dark text on a light background
    #[serde(default)]
    pub reverse_brightness: bool,
}

impl RasterSweepConfig {
    /// Config for a `width` x `height` image with every other field defaulted
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            low_freq: default_low_freq(),
            high_freq: default_high_freq(),
            sweep_delay: default_sweep_delay(),
            sweep_duration: default_sweep_duration(),
            sweep_count: default_sweep_count(),
            reverse_brightness: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_common(self.width, self.height, self.low_freq, self.high_freq)?;
        if !(self.sweep_delay.is_finite() && self.sweep_delay >= 0.0) {
            return Err(SonifyError::config(format!(
                "sweep_delay must be non-negative, got {}",
                self.sweep_delay
            )));
        }
        if !(self.sweep_duration.is_finite() && self.sweep_duration > 0.0) {
            return Err(SonifyError::config(format!(
                "sweep_duration must be positive, got {}",
                self.sweep_duration
            )));
        }
        Ok(())
    }

    /// Octaves between `low_freq` and `high_freq`
    pub fn octave_count(&self) -> f64 {
        (self.high_freq / self.low_freq).log2()
    }

    /// Pitch of voice-table slot `k`
    pub fn slot_frequency(&self, slot: usize) -> f64 {
        self.low_freq * 2f64.powf(self.octave_count() * slot as f64 / self.height as f64)
    }
}

#[derive(Debug, Clone, Copy)]
struct RowVoice {
    oscillator: GeneratorId,
    panner: PannerId,
}

/// Horizontal brightness balance of one row
#[derive(Debug, Clone, Copy, PartialEq)]
struct RowBalance {
    left: f64,
    right: f64,
    brightest: f64,
}

impl RowBalance {
    /// Degrees toward the heavier side; rows with no energy sit in the centre
    fn azimuth(&self) -> f64 {
        let heavier = self.left.max(self.right);
        if heavier > 0.0 {
            (self.right - self.left) / heavier * RIGHT
        } else {
            0.0
        }
    }
}

/// Row-per-voice pitch/stereo encoder
pub struct RasterSweepEncoder<G: AudioGraph> {
    config: RasterSweepConfig,
    graph: G,
    master: PannerId,
    voices: Vec<RowVoice>,
    brightness: BrightnessFn,
}

impl<G: AudioGraph> RasterSweepEncoder<G> {
    /// Build one voice per row on `graph` and open its output
    ///
    /// # Errors
    /// `Configuration` for invalid parameters; any graph or device failure is
    /// returned as is.
    pub fn new(config: RasterSweepConfig, mut graph: G) -> Result<Self> {
        config.validate()?;
        if config.sweep_count == 0 {
            warn!("sweep_count is 0, images will only be heard as a snapshot");
        }

        let master = graph.add_panner(PanningStrategy::Hrtf)?;
        let mut voices = Vec::with_capacity(config.height);
        for slot in 0..config.height {
            let panner = graph.add_panner(PanningStrategy::Amplitude)?;
            let oscillator = graph.add_generator(GeneratorKind::Sine)?;
            graph.timeline(Param::Amplitude(oscillator))?.set_now(0.0)?;
            graph
                .timeline(Param::Frequency(oscillator))?
                .set_now(config.slot_frequency(slot))?;
            graph.connect(oscillator, panner)?;
            graph.connect(oscillator, master)?;
            voices.push(RowVoice { oscillator, panner });
        }
        graph.open_output()?;

        debug!(
            width = config.width,
            height = config.height,
            octaves = config.octave_count(),
            "raster sweep encoder ready"
        );
        Ok(Self {
            config,
            graph,
            master,
            voices,
            brightness: luma_brightness,
        })
    }

    /// Replace the brightness function (default: Rec.601 luma)
    pub fn with_brightness(mut self, brightness: BrightnessFn) -> Self {
        self.brightness = brightness;
        self
    }

    pub fn config(&self) -> &RasterSweepConfig {
        &self.config
    }

    /// Voice-table slot that renders image row `y`, `None` past the last row
    pub fn slot_for_row(&self, y: usize) -> Option<usize> {
        (y < self.config.height).then(|| self.config.height - 1 - y)
    }

    /// Voice for row `y` of an image already checked against the config
    fn voice_for_row(&self, y: usize) -> RowVoice {
        debug_assert!(y < self.config.height);
        self.voices[self.config.height - 1 - y]
    }

    /// Oscillator in voice-table slot `slot`
    pub fn oscillator(&self, slot: usize) -> Option<GeneratorId> {
        self.voices.get(slot).map(|v| v.oscillator)
    }

    /// Row panner in voice-table slot `slot`
    pub fn row_panner(&self, slot: usize) -> Option<PannerId> {
        self.voices.get(slot).map(|v| v.panner)
    }

    pub fn master_panner(&self) -> PannerId {
        self.master
    }

    /// Brightness in `[0, 255]`, inverted when configured
    fn level(&self, px: &Pixel) -> f64 {
        let level = (self.brightness)(px).clamp(0.0, MAX_BRIGHTNESS);
        if self.config.reverse_brightness {
            MAX_BRIGHTNESS - level
        } else {
            level
        }
    }

    fn balance(&self, row: &[Pixel]) -> RowBalance {
        let width = self.config.width as f64;
        row.iter().enumerate().fold(
            RowBalance {
                left: 0.0,
                right: 0.0,
                brightest: 0.0,
            },
            |acc, (x, px)| {
                let level = self.level(px);
                let right_ratio = x as f64 / width;
                RowBalance {
                    left: acc.left + level * (1.0 - right_ratio),
                    right: acc.right + level * right_ratio,
                    brightest: acc.brightest.max(level),
                }
            },
        )
    }

    /// Sweep envelope for one row: silent edges around the pixel profile
    fn row_envelope(&self, row: &[Pixel], duration: f64) -> Result<Envelope> {
        let mut values = Vec::with_capacity(row.len() + 2);
        values.push(0.0);
        values.extend(
            row.iter()
                .map(|px| self.level(px) / MAX_BRIGHTNESS * SWEEP_AMPLITUDE_SCALE),
        );
        values.push(0.0);
        Envelope::new(duration, values)
    }

    /// Instant stereo impression of the whole image
    ///
    /// Each row's loudness follows its brightest pixel and its row panner
    /// leans toward the brighter side. The master panner is muted.
    pub fn render_snapshot(&mut self, image: &ImageGrid) -> Result<()> {
        check_dimensions(image, self.config.width, self.config.height)?;
        debug!("rendering stereo snapshot");

        self.graph.timeline(Param::Azimuth(self.master))?.set_now(0.0)?;
        self.graph.timeline(Param::Gain(self.master))?.set_now(0.0)?;

        let height = self.config.height as f64;
        for (y, row) in image.rows().enumerate() {
            let voice = self.voice_for_row(y);
            let balance = self.balance(row);

            self.graph.timeline(Param::Gain(voice.panner))?.set_now(1.0)?;
            self.graph
                .timeline(Param::Amplitude(voice.oscillator))?
                .set_now(balance.brightest / MAX_BRIGHTNESS / height)?;
            self.graph
                .timeline(Param::Azimuth(voice.panner))?
                .set_now(balance.azimuth())?;
        }
        Ok(())
    }

    /// Schedule `count` left-to-right sweeps starting `delay` seconds from now
    ///
    /// Every touched timeline is re-armed first, so automation left over from
    /// an earlier image never leaks into this one.
    pub fn render_sweep(
        &mut self,
        image: &ImageGrid,
        delay: f64,
        duration: f64,
        count: usize,
    ) -> Result<()> {
        check_dimensions(image, self.config.width, self.config.height)?;
        let schedule = SweepSchedule::new(delay, duration, count, SWEEP_GAP);
        debug!(
            delay,
            duration,
            count,
            span = schedule.total_span(),
            "scheduling sweep"
        );

        let scan: Vec<f64> = (LEFT as i32..=RIGHT as i32).map(f64::from).collect();
        let scan = Envelope::new(duration, scan)?;

        let gain = self.graph.timeline(Param::Gain(self.master))?;
        gain.arm_baseline()?;
        gain.set_at(delay, 1.0)?;

        let azimuth = self.graph.timeline(Param::Azimuth(self.master))?;
        azimuth.arm_baseline()?;
        azimuth.set_at(delay, LEFT)?;
        for rep in schedule.repetitions() {
            azimuth.set_at(rep.reset_at, LEFT)?;
            azimuth.play_envelope(rep.envelope_at, &scan)?;
        }

        for (y, row) in image.rows().enumerate() {
            let voice = self.voice_for_row(y);
            let envelope = self.row_envelope(row, duration)?;

            let row_gain = self.graph.timeline(Param::Gain(voice.panner))?;
            row_gain.arm_baseline()?;
            row_gain.set_at(delay, 0.0)?;

            let amplitude = self.graph.timeline(Param::Amplitude(voice.oscillator))?;
            amplitude.arm_baseline()?;
            amplitude.set_at(delay, 0.0)?;
            for rep in schedule.repetitions() {
                amplitude.set_at(rep.reset_at, 0.0)?;
                amplitude.play_envelope(rep.envelope_at, &envelope)?;
            }
        }
        Ok(())
    }

    /// Fade every voice out and centre the master panner
    pub fn render_silence(&mut self) -> Result<()> {
        debug!("fading to silence");
        self.graph.timeline(Param::Azimuth(self.master))?.set_now(0.0)?;
        for voice in &self.voices {
            let amplitude = self.graph.timeline(Param::Amplitude(voice.oscillator))?;
            amplitude.arm_baseline()?;
            amplitude.ramp_to(0.0, FADE_LENGTH)?;
        }
        Ok(())
    }
}

impl<G: AudioGraph> Encoder<G> for RasterSweepEncoder<G> {
    fn present(&mut self, image: Option<&ImageGrid>, detailed: bool) -> Result<()> {
        let Some(image) = image else {
            return self.render_silence();
        };
        check_dimensions(image, self.config.width, self.config.height)?;
        if !detailed {
            self.render_snapshot(image)?;
        }
        let delay = if detailed { 0.0 } else { self.config.sweep_delay };
        self.render_sweep(
            image,
            delay,
            self.config.sweep_duration,
            self.config.sweep_count,
        )
    }

    fn terminate(&mut self) -> Result<()> {
        for voice in &self.voices {
            self.graph
                .timeline(Param::Amplitude(voice.oscillator))?
                .set_now(0.0)?;
        }
        self.graph.close_output()
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.config.width, self.config.height)
    }

    fn graph(&self) -> &G {
        &self.graph
    }

    fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{RecordingGraph, ScheduledEvent};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn encoder(width: usize, height: usize) -> RasterSweepEncoder<RecordingGraph> {
        RasterSweepEncoder::new(RasterSweepConfig::new(width, height), RecordingGraph::new())
            .unwrap()
    }

    fn amplitude(enc: &RasterSweepEncoder<RecordingGraph>, slot: usize) -> f64 {
        let osc = enc.oscillator(slot).unwrap();
        enc.graph().value_now(Param::Amplitude(osc)).unwrap()
    }

    fn row_azimuth(enc: &RasterSweepEncoder<RecordingGraph>, slot: usize) -> f64 {
        let panner = enc.row_panner(slot).unwrap();
        enc.graph().value_now(Param::Azimuth(panner)).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config: RasterSweepConfig =
            serde_json::from_str(r#"{"width": 8, "height": 4}"#).unwrap();
        assert_eq!(config, RasterSweepConfig::new(8, 4));
        assert_eq!(config.low_freq, 500.0);
        assert_eq!(config.high_freq, 5000.0);
        assert_eq!(config.sweep_delay, 0.5);
        assert_eq!(config.sweep_duration, 4.0);
        assert_eq!(config.sweep_count, 4);
        assert!(!config.reverse_brightness);
    }

    #[test]
    fn test_config_validation() {
        let mut config = RasterSweepConfig::new(4, 4);
        config.sweep_duration = 0.0;
        assert!(config.validate().is_err());

        let mut config = RasterSweepConfig::new(4, 4);
        config.sweep_delay = -0.1;
        assert!(config.validate().is_err());

        let err = RasterSweepEncoder::new(RasterSweepConfig::new(4, 0), RecordingGraph::new())
            .err()
            .unwrap();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_voice_table_pitches() {
        let enc = encoder(4, 8);
        let graph = enc.graph();
        assert_eq!(graph.generator_count(), 8);
        assert_eq!(graph.panner_count(), 9);

        let freqs: Vec<f64> = (0..8)
            .map(|k| {
                let osc = enc.oscillator(k).unwrap();
                graph.value_now(Param::Frequency(osc)).unwrap()
            })
            .collect();
        assert!(freqs.windows(2).all(|w| w[1] > w[0]));
        assert_relative_eq!(freqs[0], 500.0);
        // one more slot would reach the ceiling
        let octaves_spanned = (freqs[7] / freqs[0]).log2() * 8.0 / 7.0;
        assert_relative_eq!(octaves_spanned, (10f64).log2(), epsilon = 1e-12);
    }

    #[test]
    fn test_voice_topology() {
        let enc = encoder(2, 3);
        let graph = enc.graph();
        let master = enc.master_panner();
        assert_eq!(graph.panner_strategy(master).unwrap(), PanningStrategy::Hrtf);
        for slot in 0..3 {
            let osc = enc.oscillator(slot).unwrap();
            let panner = enc.row_panner(slot).unwrap();
            assert_eq!(graph.generator_kind(osc).unwrap(), GeneratorKind::Sine);
            assert_eq!(graph.connections(osc).unwrap(), &[panner, master]);
            assert_eq!(
                graph.panner_strategy(panner).unwrap(),
                PanningStrategy::Amplitude
            );
            assert_eq!(amplitude(&enc, slot), 0.0);
        }
    }

    #[test]
    fn test_row_slot_inversion() {
        let enc = encoder(1, 5);
        let slots: Vec<usize> = (0..5).filter_map(|y| enc.slot_for_row(y)).collect();
        assert_eq!(slots, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_row_slot_out_of_range() {
        let enc = encoder(1, 5);
        assert_eq!(enc.slot_for_row(5), None);
        assert_eq!(enc.slot_for_row(usize::MAX), None);
    }

    #[test]
    fn test_device_failure_propagates() {
        let err = RasterSweepEncoder::new(
            RasterSweepConfig::new(2, 2),
            RecordingGraph::without_device(),
        )
        .err()
        .unwrap();
        assert_eq!(err.error_code(), "DEVICE_ERROR");
    }

    #[test]
    fn test_snapshot_black_image() {
        let mut enc = encoder(4, 3);
        let image = ImageGrid::filled(4, 3, Pixel::BLACK).unwrap();
        enc.render_snapshot(&image).unwrap();
        for slot in 0..3 {
            assert_eq!(amplitude(&enc, slot), 0.0);
            assert_eq!(row_azimuth(&enc, slot), 0.0);
        }
    }

    #[test]
    fn test_snapshot_single_left_pixel() {
        let mut enc = encoder(4, 3);
        let mut image = ImageGrid::filled(4, 3, Pixel::BLACK).unwrap();
        image.set(0, 0, Pixel::WHITE).unwrap();
        enc.render_snapshot(&image).unwrap();

        // top row plays through the highest slot
        assert_abs_diff_eq!(row_azimuth(&enc, 2), -90.0);
        assert_relative_eq!(amplitude(&enc, 2), 1.0 / 3.0, epsilon = 1e-9);
        for slot in 0..2 {
            assert_eq!(amplitude(&enc, slot), 0.0);
            assert_eq!(row_azimuth(&enc, slot), 0.0);
        }

        let graph = enc.graph();
        let master = enc.master_panner();
        assert_eq!(graph.value_now(Param::Gain(master)).unwrap(), 0.0);
        assert_eq!(graph.value_now(Param::Azimuth(master)).unwrap(), 0.0);
        let panner = enc.row_panner(2).unwrap();
        assert_eq!(graph.value_now(Param::Gain(panner)).unwrap(), 1.0);
    }

    #[test]
    fn test_snapshot_balance_leans_right() {
        let mut enc = encoder(4, 1);
        let image = ImageGrid::from_rows(vec![vec![
            Pixel::BLACK,
            Pixel::BLACK,
            Pixel::grey(128),
            Pixel::WHITE,
        ]])
        .unwrap();
        enc.render_snapshot(&image).unwrap();
        let azimuth = row_azimuth(&enc, 0);
        assert!(azimuth > 0.0 && azimuth <= 90.0, "azimuth {}", azimuth);
    }

    #[test]
    fn test_reverse_brightness() {
        let mut config = RasterSweepConfig::new(2, 1);
        config.reverse_brightness = true;
        let mut enc = RasterSweepEncoder::new(config, RecordingGraph::new()).unwrap();
        let image = ImageGrid::filled(2, 1, Pixel::WHITE).unwrap();
        enc.render_snapshot(&image).unwrap();
        assert_abs_diff_eq!(amplitude(&enc, 0), 0.0, epsilon = 1e-9);

        let image = ImageGrid::filled(2, 1, Pixel::BLACK).unwrap();
        enc.render_snapshot(&image).unwrap();
        assert_relative_eq!(amplitude(&enc, 0), 1.0);
    }

    #[test]
    fn test_reverse_brightness_sweep() {
        let mut config = RasterSweepConfig::new(3, 2);
        config.reverse_brightness = true;
        let mut enc = RasterSweepEncoder::new(config, RecordingGraph::new()).unwrap();
        let image = ImageGrid::from_rows(vec![vec![Pixel::BLACK; 3], vec![Pixel::WHITE; 3]])
            .unwrap();
        enc.render_sweep(&image, 0.5, 4.0, 1).unwrap();

        let first_envelope = |slot: usize| -> Vec<f64> {
            let osc = enc.oscillator(slot).unwrap();
            let amps = enc.graph().recorded(Param::Amplitude(osc)).unwrap();
            amps.pending()
                .iter()
                .find_map(|e| match e {
                    ScheduledEvent::Envelope { envelope, .. } => {
                        Some(envelope.values().to_vec())
                    }
                    _ => None,
                })
                .unwrap()
        };

        // black top row is loudest once inverted
        let black = first_envelope(1);
        assert_eq!(black.len(), 5);
        assert_eq!(black[0], 0.0);
        assert_eq!(black[4], 0.0);
        for value in &black[1..4] {
            assert_relative_eq!(*value, SWEEP_AMPLITUDE_SCALE, epsilon = 1e-9);
        }

        let white = first_envelope(0);
        assert_eq!(white.len(), 5);
        for value in &white {
            assert_abs_diff_eq!(*value, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_custom_brightness() {
        fn red_only(px: &Pixel) -> f64 {
            f64::from(px.red)
        }
        let mut enc = encoder(1, 1).with_brightness(red_only);
        let image = ImageGrid::filled(1, 1, Pixel::new(255, 0, 0)).unwrap();
        enc.render_snapshot(&image).unwrap();
        assert_relative_eq!(amplitude(&enc, 0), 1.0);
    }

    #[test]
    fn test_sweep_schedules_every_repetition() {
        let mut enc = encoder(3, 2);
        let image = ImageGrid::filled(3, 2, Pixel::WHITE).unwrap();
        enc.render_sweep(&image, 0.5, 4.0, 3).unwrap();

        let graph = enc.graph();
        let master = graph
            .recorded(Param::Azimuth(enc.master_panner()))
            .unwrap();
        let starts: Vec<f64> = master
            .pending()
            .iter()
            .filter_map(|e| match e {
                ScheduledEvent::Envelope { at, envelope } => {
                    assert_eq!(envelope.values().len(), 181);
                    assert_eq!(envelope.first(), -90.0);
                    assert_eq!(envelope.last(), 90.0);
                    Some(*at)
                }
                _ => None,
            })
            .collect();
        assert_eq!(starts.len(), 3);
        assert_abs_diff_eq!(starts[0], 0.7, epsilon = 1e-12);
        assert_abs_diff_eq!(starts[1] - starts[0], 4.2, epsilon = 1e-12);
        assert_abs_diff_eq!(starts[2] - starts[1], 4.2, epsilon = 1e-12);

        for slot in 0..2 {
            let osc = enc.oscillator(slot).unwrap();
            let amps = graph.recorded(Param::Amplitude(osc)).unwrap();
            let envelopes: Vec<&Envelope> = amps
                .pending()
                .iter()
                .filter_map(|e| match e {
                    ScheduledEvent::Envelope { envelope, .. } => Some(envelope),
                    _ => None,
                })
                .collect();
            assert_eq!(envelopes.len(), 3);
            let values = envelopes[0].values();
            assert_eq!(values.len(), 5);
            assert_eq!(values[0], 0.0);
            assert_eq!(values[4], 0.0);
            assert_relative_eq!(values[1], 0.075, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_sweep_routes_through_master() {
        let mut enc = encoder(2, 2);
        let image = ImageGrid::filled(2, 2, Pixel::WHITE).unwrap();
        enc.render_snapshot(&image).unwrap();
        enc.render_sweep(&image, 0.5, 4.0, 1).unwrap();

        let graph = enc.graph();
        let master = enc.master_panner();
        let row = enc.row_panner(0).unwrap();
        assert_eq!(graph.value_at(Param::Gain(master), 0.4).unwrap(), 0.0);
        assert_eq!(graph.value_at(Param::Gain(master), 0.5).unwrap(), 1.0);
        assert_eq!(graph.value_at(Param::Gain(row), 0.4).unwrap(), 1.0);
        assert_eq!(graph.value_at(Param::Gain(row), 0.5).unwrap(), 0.0);
        // azimuth scans during the envelope
        assert_abs_diff_eq!(graph.value_at(Param::Azimuth(master), 0.6).unwrap(), -90.0);
        assert_abs_diff_eq!(
            graph.value_at(Param::Azimuth(master), 2.7).unwrap(),
            0.0,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(graph.value_at(Param::Azimuth(master), 10.0).unwrap(), 90.0);
    }

    #[test]
    fn test_sweep_with_zero_count() {
        let mut enc = encoder(2, 1);
        let image = ImageGrid::filled(2, 1, Pixel::WHITE).unwrap();
        enc.render_sweep(&image, 0.0, 4.0, 0).unwrap();
        let osc = enc.oscillator(0).unwrap();
        let pending = enc.graph().recorded(Param::Amplitude(osc)).unwrap().pending();
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn test_silence_fades_out() {
        let mut enc = encoder(2, 2);
        let image = ImageGrid::filled(2, 2, Pixel::WHITE).unwrap();
        enc.render_snapshot(&image).unwrap();
        assert_relative_eq!(amplitude(&enc, 0), 0.5, epsilon = 1e-9);

        enc.render_silence().unwrap();
        let osc = enc.oscillator(0).unwrap();
        let graph = enc.graph();
        assert_relative_eq!(
            graph.value_at(Param::Amplitude(osc), 0.025).unwrap(),
            0.25,
            epsilon = 1e-9
        );
        assert_eq!(graph.value_at(Param::Amplitude(osc), FADE_LENGTH).unwrap(), 0.0);
        assert_eq!(
            graph.value_now(Param::Azimuth(enc.master_panner())).unwrap(),
            0.0
        );
    }

    #[test]
    fn test_present_detailed_skips_snapshot() {
        let mut enc = encoder(2, 1);
        let image = ImageGrid::filled(2, 1, Pixel::WHITE).unwrap();
        enc.present(Some(&image), true).unwrap();
        let osc = enc.oscillator(0).unwrap();
        let graph = enc.graph();
        // amplitude stays at its construction value until the sweep begins
        assert_eq!(graph.value_at(Param::Amplitude(osc), 0.0).unwrap(), 0.0);
        let first_envelope = graph
            .recorded(Param::Amplitude(osc))
            .unwrap()
            .pending()
            .iter()
            .find_map(|e| match e {
                ScheduledEvent::Envelope { at, .. } => Some(*at),
                _ => None,
            })
            .unwrap();
        assert_abs_diff_eq!(first_envelope, SWEEP_GAP);
    }

    #[test]
    fn test_present_rejects_wrong_size() {
        let mut enc = encoder(2, 2);
        let image = ImageGrid::filled(3, 2, Pixel::WHITE).unwrap();
        assert!(enc.present(Some(&image), false).is_err());
    }

    #[test]
    fn test_terminate_mutes_and_releases() {
        let mut enc = encoder(2, 2);
        let image = ImageGrid::filled(2, 2, Pixel::WHITE).unwrap();
        enc.present(Some(&image), false).unwrap();
        enc.terminate().unwrap();
        for slot in 0..2 {
            let osc = enc.oscillator(slot).unwrap();
            assert_eq!(enc.graph().value_at(Param::Amplitude(osc), 5.0).unwrap(), 0.0);
        }
        assert_eq!(
            enc.graph().device_state(),
            crate::graph::DeviceState::Closed
        );
    }
}
