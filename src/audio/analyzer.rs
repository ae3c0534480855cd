use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{Fft, FftPlanner, num_complex::Complex};

use crate::consts;

/// Rolling frequency-domain view over the most recent mono samples.
///
/// Every buffer is sized once up front; pushing samples and computing the
/// level never allocate, so the analyzer can live inside a capture callback.
pub struct SpectrumAnalyzer {
    ring: Vec<f32>,
    write_pos: usize,
    filled: usize,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl SpectrumAnalyzer {
    pub fn new(size: usize) -> Self {
        let size = size.max(2);
        let fft = FftPlanner::new().plan_fft_forward(size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            ring: vec![0.0; size],
            write_pos: 0,
            filled: 0,
            window: blackman_window(size),
            fft,
            spectrum: vec![Complex::new(0.0, 0.0); size],
            scratch,
        }
    }

    pub fn size(&self) -> usize {
        self.ring.len()
    }

    /// Number of frequency bins averaged into the level.
    pub fn bin_count(&self) -> usize {
        self.ring.len() / 2
    }

    pub fn push(&mut self, sample: f32) {
        let sample = if sample.is_finite() { sample } else { 0.0 };
        self.ring[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.ring.len();
        self.filled = (self.filled + 1).min(self.ring.len());
    }

    pub fn add_samples(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.push(sample);
        }
    }

    /// Mean bin level on a 0..=255 byte scale, or `None` until a full
    /// window has been captured.
    pub fn mean_bin_level(&mut self) -> Option<f32> {
        let size = self.ring.len();
        if self.filled < size {
            return None;
        }

        // Oldest sample first so the window lines up with time order
        for (i, slot) in self.spectrum.iter_mut().enumerate() {
            let sample = self.ring[(self.write_pos + i) % size];
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.spectrum, &mut self.scratch);

        let bins = self.bin_count();
        let total: f32 = self.spectrum[..bins]
            .iter()
            .map(|c| magnitude_to_byte(c.norm() / size as f32))
            .sum();

        Some(total / bins as f32)
    }

    /// Mean bin level divided by a source-dependent normalization constant.
    pub fn loudness(&mut self, normalization: f32) -> f32 {
        match self.mean_bin_level() {
            Some(level) if normalization > 0.0 => level / normalization,
            _ => 0.0,
        }
    }
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new(consts::ANALYSIS_SIZE)
    }
}

/// Map a linear bin magnitude onto the 0..=255 analyser byte scale.
pub fn magnitude_to_byte(magnitude: f32) -> f32 {
    if magnitude <= 0.0 {
        return 0.0;
    }
    let db = 20.0 * magnitude.log10();
    let range = consts::MAX_DECIBELS - consts::MIN_DECIBELS;
    ((db - consts::MIN_DECIBELS) / range * 255.0).clamp(0.0, 255.0)
}

fn blackman_window(size: usize) -> Vec<f32> {
    let n = size as f32;
    (0..size)
        .map(|i| {
            let x = 2.0 * PI * i as f32 / n;
            0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(amplitude: f32, cycles_per_window: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let phase = 2.0 * PI * cycles_per_window * i as f32 / consts::ANALYSIS_SIZE as f32;
                amplitude * phase.sin()
            })
            .collect()
    }

    #[test]
    fn reports_nothing_until_window_is_full() {
        let mut analyzer = SpectrumAnalyzer::default();
        analyzer.add_samples(&sine(0.5, 8.0, consts::ANALYSIS_SIZE - 1));
        assert_eq!(analyzer.mean_bin_level(), None);
        assert_eq!(analyzer.loudness(128.0), 0.0);

        analyzer.push(0.0);
        assert!(analyzer.mean_bin_level().is_some());
    }

    #[test]
    fn silence_is_zero() {
        let mut analyzer = SpectrumAnalyzer::default();
        analyzer.add_samples(&[0.0; consts::ANALYSIS_SIZE]);
        assert_eq!(analyzer.mean_bin_level(), Some(0.0));
    }

    #[test]
    fn analysis_window_has_64_bins() {
        let analyzer = SpectrumAnalyzer::default();
        assert_eq!(analyzer.size(), 128);
        assert_eq!(analyzer.bin_count(), 64);
    }

    #[test]
    fn louder_input_reads_higher() {
        let mut quiet = SpectrumAnalyzer::default();
        quiet.add_samples(&sine(0.01, 8.0, consts::ANALYSIS_SIZE));
        let mut loud = SpectrumAnalyzer::default();
        loud.add_samples(&sine(0.5, 8.0, consts::ANALYSIS_SIZE));

        let quiet_level = quiet.loudness(128.0);
        let loud_level = loud.loudness(128.0);
        assert!(quiet_level > 0.0);
        assert!(
            loud_level > quiet_level,
            "loud {loud_level} should exceed quiet {quiet_level}"
        );
    }

    #[test]
    fn system_divisor_lands_lower_than_mic_for_same_signal() {
        let mut analyzer = SpectrumAnalyzer::default();
        analyzer.add_samples(&sine(0.3, 5.0, consts::ANALYSIS_SIZE));
        let mic = analyzer.loudness(consts::MIC_NORMALIZATION);
        let system = analyzer.loudness(consts::SYSTEM_NORMALIZATION);
        assert!((mic * 128.0 - system * 180.0).abs() < 1e-3);
        assert!(system < mic);
    }

    #[test]
    fn byte_scale_clamps_to_analyser_range() {
        assert_eq!(magnitude_to_byte(0.0), 0.0);
        assert_eq!(magnitude_to_byte(1e-9), 0.0);
        assert_eq!(magnitude_to_byte(1.0), 255.0);
        let mid = magnitude_to_byte(10f32.powf(-65.0 / 20.0));
        assert!((mid - 127.5).abs() < 0.5);
    }

    #[test]
    fn non_finite_samples_are_treated_as_silence() {
        let mut analyzer = SpectrumAnalyzer::default();
        for _ in 0..consts::ANALYSIS_SIZE {
            analyzer.push(f32::NAN);
        }
        assert_eq!(analyzer.mean_bin_level(), Some(0.0));
    }
}
