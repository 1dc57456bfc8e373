//! Spectrum of bit 0
//!
//! A naive bit output aliases into a carpet of inharmonic partials between
//! the real harmonics. The floor estimate below tracks that carpet, so
//! switching anti-alias strategies shows up as a number as well as a trace.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Number of log-spaced points drawn
const SPECTRUM_POINTS: usize = 64;
const MIN_DB: f64 = -120.0;

pub struct SpectrumAnalyzer {
    /// Blackman window, cleaner sidelobes than Hann for gate signals
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// Magnitude of every FFT bin up to Nyquist, in dB
    bins_db: Vec<f64>,
    /// (log10 frequency, dB) points for drawing
    points: Vec<(f64, f64)>,
    point_bins: Vec<usize>,
    bin_hz: f64,
}

impl SpectrumAnalyzer {
    pub fn new(fft_len: usize, sample_rate: f32) -> Self {
        let fft_len = fft_len.max(2);
        let fft = FftPlanner::new().plan_fft_forward(fft_len);

        let denom = (fft_len - 1) as f32;
        let window = (0..fft_len)
            .map(|i| {
                let x = 2.0 * std::f32::consts::PI * i as f32 / denom;
                0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
            })
            .collect();

        let half = fft_len / 2;
        let bin_hz = sample_rate as f64 / fft_len as f64;
        let nyquist = (half - 1) as f64 * bin_hz;
        let lo = 20.0f64.min(nyquist).max(bin_hz);
        let ratio = (nyquist / lo).max(1.0);

        let point_bins: Vec<usize> = (0..SPECTRUM_POINTS)
            .map(|i| {
                let t = i as f64 / (SPECTRUM_POINTS - 1) as f64;
                let hz = lo * ratio.powf(t);
                ((hz / bin_hz).round() as usize).min(half - 1)
            })
            .collect();
        let points = point_bins
            .iter()
            .map(|&bin| (((bin.max(1)) as f64 * bin_hz).log10(), MIN_DB))
            .collect();

        Self {
            window,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_len],
            bins_db: vec![MIN_DB; half],
            points,
            point_bins,
            bin_hz,
        }
    }

    /// Analyze the newest `fft_len` samples. Shorter buffers are ignored.
    pub fn update(&mut self, samples: &[f32]) {
        let len = self.scratch.len();
        if samples.len() < len {
            return;
        }
        let samples = &samples[samples.len() - len..];

        let mean = samples.iter().sum::<f32>() / len as f32;
        for ((bin, &x), &w) in self.scratch.iter_mut().zip(samples).zip(&self.window) {
            *bin = Complex::new((x - mean) * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        for (db, bin) in self.bins_db.iter_mut().zip(&self.scratch) {
            let power = (bin.norm_sqr() as f64).max(1e-12);
            *db = (10.0 * power.log10()).max(MIN_DB);
        }
        for (point, &bin) in self.points.iter_mut().zip(&self.point_bins) {
            point.1 = self.bins_db[bin];
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Median bin level in dB, a rough measure of the alias floor.
    pub fn floor_db(&self) -> f64 {
        let mut sorted = self.bins_db.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        sorted[sorted.len() / 2]
    }

    pub fn bin_hz(&self) -> f64 {
        self.bin_hz
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, analyzer: &SpectrumAnalyzer) {
    let block = Block::default()
        .title(format!(
            " Spectrum out1 (floor {:.0} dB, {:.1} Hz/bin) ",
            analyzer.floor_db(),
            analyzer.bin_hz()
        ))
        .borders(Borders::ALL);

    let data = analyzer.data();
    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(data);

    let lo = data.first().map_or(1.0, |p| p.0);
    let hi = data.last().map_or(4.0, |p| p.0).max(lo + 0.1);
    let peak = data.iter().map(|p| p.1).fold(MIN_DB, f64::max);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([lo, hi])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([MIN_DB, peak.max(0.0) + 10.0])
                .labels(vec!["-120", "-60", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
