//! Track plot rendering
//!
//! Draws the filtered tracks on a frequency/time canvas: F0 as a connected
//! black line, formants as coloured dots, horizontal grid lines every
//! 100 Hz up to 1 kHz and every 500 Hz above.

use crate::channel::{Channel, PerChannel};
use crate::track_filter::Track;
use crate::Result;
use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;

/// Turns filtered tracks into an encoded image
pub trait TrackRenderer {
    fn render(&self, tracks: &PerChannel<Track>) -> Result<Vec<u8>>;
}

/// Options for the track plot
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub width: u32,
    pub height: u32,
    /// Frequency at the top edge of the canvas (Hz)
    pub max_frequency: f64,
    /// Side length of a formant dot in pixels
    pub dot_size: u32,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            max_frequency: 5500.0,
            dot_size: 3,
        }
    }
}

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const GRID: Rgb<u8> = Rgb([220, 220, 220]);
const PITCH: Rgb<u8> = Rgb([0, 0, 0]);

/// Dot colour of a formant channel
pub fn channel_color(channel: Channel) -> Rgb<u8> {
    match channel {
        Channel::F0 => PITCH,
        Channel::F1 => Rgb([214, 39, 40]),
        Channel::F2 => Rgb([44, 160, 44]),
        Channel::F3 => Rgb([31, 119, 180]),
        Channel::F4 => Rgb([255, 127, 14]),
    }
}

/// Grid line frequencies: every 100 Hz to 1000 Hz, then every 500 Hz
pub fn grid_frequencies(max_frequency: f64) -> Vec<f64> {
    let fine = (1..=10).map(|i| i as f64 * 100.0);
    let coarse = (3..).map(|i| i as f64 * 500.0);
    fine.chain(coarse.take_while(move |&f| f <= max_frequency))
        .filter(|&f| f <= max_frequency)
        .collect()
}

/// PNG renderer for filtered tracks
#[derive(Debug, Clone, Default)]
pub struct PlotRenderer {
    options: PlotOptions,
}

impl PlotRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: PlotOptions) -> Self {
        Self { options }
    }

    /// Draw the tracks into an RGB image
    pub fn render_image(&self, tracks: &PerChannel<Track>) -> RgbImage {
        let (width, height) = (self.options.width.max(1), self.options.height.max(1));
        let mut img = ImageBuffer::from_pixel(width, height, BACKGROUND);

        let end_time = tracks
            .iter()
            .filter_map(|(_, track)| track.last_time())
            .fold(0.0, f64::max);
        let end_time = if end_time > 0.0 { end_time } else { 1.0 };

        for frequency in grid_frequencies(self.options.max_frequency) {
            if let Some(y) = self.y_pixel(frequency) {
                for x in 0..width {
                    img.put_pixel(x, y, GRID);
                }
            }
        }

        for &channel in Channel::formants() {
            let color = channel_color(channel);
            for (time, value) in tracks.get(channel).points() {
                if let Some((x, y)) = self.pixel(time, value, end_time) {
                    self.draw_dot(&mut img, x, y, color);
                }
            }
        }

        let mut previous: Option<(u32, u32)> = None;
        for (time, value) in tracks.f0.points() {
            let current = self.pixel(time, value, end_time);
            match (previous, current) {
                (Some(from), Some(to)) => draw_line(&mut img, from, to, PITCH),
                (None, Some((x, y))) => img.put_pixel(x, y, PITCH),
                _ => {}
            }
            previous = current;
        }

        log::info!(
            "Rendered track plot: {}x{} pixels, {:.2}s, {} F0 points",
            width,
            height,
            end_time,
            tracks.f0.len()
        );

        img
    }

    /// Render and write a PNG file
    pub fn save<P: AsRef<Path>>(&self, tracks: &PerChannel<Track>, path: P) -> Result<()> {
        self.render_image(tracks).save_with_format(path.as_ref(), ImageFormat::Png)?;
        log::info!("Saved track plot to {}", path.as_ref().display());
        Ok(())
    }

    fn y_pixel(&self, frequency: f64) -> Option<u32> {
        if !frequency.is_finite() || frequency < 0.0 || frequency > self.options.max_frequency {
            return None;
        }
        let bottom = (self.options.height.max(1) - 1) as f64;
        Some((bottom - frequency / self.options.max_frequency * bottom).round() as u32)
    }

    fn pixel(&self, time: f64, frequency: f64, end_time: f64) -> Option<(u32, u32)> {
        if !time.is_finite() || time < 0.0 || time > end_time {
            return None;
        }
        let right = (self.options.width.max(1) - 1) as f64;
        let x = (time / end_time * right).round() as u32;
        Some((x, self.y_pixel(frequency)?))
    }

    fn draw_dot(&self, img: &mut RgbImage, x: u32, y: u32, color: Rgb<u8>) {
        let half = self.options.dot_size / 2;
        for dy in 0..self.options.dot_size.max(1) {
            for dx in 0..self.options.dot_size.max(1) {
                let (px, py) = ((x + dx).saturating_sub(half), (y + dy).saturating_sub(half));
                if px < img.width() && py < img.height() {
                    img.put_pixel(px, py, color);
                }
            }
        }
    }
}

impl TrackRenderer for PlotRenderer {
    fn render(&self, tracks: &PerChannel<Track>) -> Result<Vec<u8>> {
        let img = self.render_image(tracks);
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// Bresenham line between two pixels
fn draw_line(img: &mut RgbImage, from: (u32, u32), to: (u32, u32), color: Rgb<u8>) {
    let (mut x, mut y) = (from.0 as i64, from.1 as i64);
    let (x1, y1) = (to.0 as i64, to.1 as i64);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        img.put_pixel(x as u32, y as u32, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_plot() -> PlotRenderer {
        PlotRenderer::with_options(PlotOptions {
            width: 201,
            height: 551,
            max_frequency: 5500.0,
            dot_size: 3,
        })
    }

    fn sample_tracks() -> PerChannel<Track> {
        let mut tracks = PerChannel::from_fn(Track::new);
        tracks.f0.push(0.0, 1100.0);
        tracks.f0.push(1.0, 1100.0);
        tracks.f1.push(1.0, 550.0);
        tracks.f4.push(0.5, 9000.0);
        tracks
    }

    #[test]
    fn test_grid_frequencies() {
        let grid = grid_frequencies(5500.0);
        assert_eq!(grid.len(), 19);
        assert_eq!(grid[0], 100.0);
        assert_eq!(grid[9], 1000.0);
        assert_eq!(grid[10], 1500.0);
        assert_eq!(grid[18], 5500.0);

        assert_eq!(grid_frequencies(800.0).len(), 8);
    }

    #[test]
    fn test_render_image() {
        let img = small_plot().render_image(&sample_tracks());
        assert_eq!(img.dimensions(), (201, 551));

        // F0 line across the whole width at 1100 Hz
        assert_eq!(*img.get_pixel(0, 440), PITCH);
        assert_eq!(*img.get_pixel(100, 440), PITCH);
        assert_eq!(*img.get_pixel(200, 440), PITCH);

        // F1 dot at the right edge
        assert_eq!(*img.get_pixel(200, 495), channel_color(Channel::F1));

        // grid line at 1000 Hz, background between lines
        assert_eq!(*img.get_pixel(50, 450), GRID);
        assert_eq!(*img.get_pixel(50, 445), BACKGROUND);
    }

    #[test]
    fn test_render_empty_tracks() {
        let tracks = PerChannel::from_fn(Track::new);
        let img = small_plot().render_image(&tracks);
        assert_eq!(*img.get_pixel(0, 0), GRID);
        assert_eq!(*img.get_pixel(0, 1), BACKGROUND);
    }

    #[test]
    fn test_render_png_bytes() {
        let bytes = small_plot().render(&sample_tracks()).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_save_plot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.png");
        small_plot().save(&sample_tracks(), &path).unwrap();

        let loaded = image::open(&path).unwrap();
        assert_eq!(loaded.width(), 201);
        assert_eq!(loaded.height(), 551);
    }
}
