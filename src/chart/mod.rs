//! Chart rendering to in-memory PNG images.
//!
//! Both renderers share the same shape: filter entries below a visibility
//! threshold, draw onto a scoped in-memory bitmap, and return encoded PNG
//! bytes. The drawing surface lives only inside the rendering scope, so
//! concurrent requests never share backend state.
//!
//! Note the threshold units differ: pies filter on percentage points,
//! bars on the raw aggregated value.

use anyhow::{Context, Result};
use plotters::prelude::*;
use plotters::style::FontTransform;
use std::io::Cursor;
use tracing::debug;

const PIE_SIZE: (u32, u32) = (800, 800);
const BAR_SIZE: (u32, u32) = (1000, 600);

const BAR_FILL: RGBColor = RGBColor(135, 206, 235);

/// Wedge palette, cycled when there are more wedges than colors.
const PALETTE: [RGBColor; 8] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
];

/// Render a pie chart of percentage shares as PNG bytes.
///
/// Keeps entry `i` only when `percentages[i] >= min_percent`. When the
/// filter removes every entry the result is a valid image carrying just
/// the title, not an error.
pub fn render_pie(
    labels: &[String],
    percentages: &[f64],
    title: &str,
    min_percent: f64,
) -> Result<Vec<u8>> {
    let (sizes, kept_labels) = filter_entries(labels, percentages, min_percent);
    debug!("Rendering pie `{}`: {} wedges", title, sizes.len());

    let (width, height) = PIE_SIZE;
    let mut buffer = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, PIE_SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        let root = root.titled(title, ("sans-serif", 28))?;

        if !sizes.is_empty() {
            let dims = root.dim_in_pixel();
            let center = (dims.0 as i32 / 2, dims.1 as i32 / 2);
            // Leave room for the labels placed outside the circle.
            let radius = (dims.0.min(dims.1) as f64) * 0.30;

            let colors: Vec<RGBColor> = (0..sizes.len())
                .map(|i| PALETTE[i % PALETTE.len()])
                .collect();

            let mut pie = Pie::new(&center, &radius, &sizes, &colors, &kept_labels);
            pie.start_angle(140.0);
            pie.label_style(("sans-serif", 18).into_font());
            pie.percentages(("sans-serif", 16).into_font().color(&BLACK));
            root.draw(&pie)?;
        }

        root.present()?;
    }

    encode_png(buffer, width, height)
}

/// Render a bar chart of raw values as PNG bytes.
///
/// Keeps entry `i` only when `values[i] >= min_value`; retained bars stay
/// in their original order. X labels are rotated for legibility and the
/// y axis is the raw value, not a percentage.
pub fn render_bars(
    labels: &[String],
    values: &[f64],
    title: &str,
    min_value: f64,
) -> Result<Vec<u8>> {
    let (kept_values, kept_labels) = filter_entries(labels, values, min_value);
    debug!("Rendering bars `{}`: {} bars", title, kept_values.len());

    let (width, height) = BAR_SIZE;
    let mut buffer = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, BAR_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        if kept_values.is_empty() {
            // Empty chart, title only.
            root.titled(title, ("sans-serif", 28))?.present()?;
        } else {
            let y_max = kept_values.iter().cloned().fold(0.0, f64::max) * 1.1;
            let y_max = if y_max > 0.0 { y_max } else { 1.0 };
            let n = kept_values.len() as u32;

            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 28))
                .margin(20)
                .x_label_area_size(180)
                .y_label_area_size(70)
                .build_cartesian_2d((0u32..n).into_segmented(), 0.0..y_max)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(kept_values.len())
                .x_label_formatter(&|seg| match seg {
                    SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => kept_labels
                        .get(*i as usize)
                        .cloned()
                        .unwrap_or_default(),
                    SegmentValue::Last => String::new(),
                })
                .x_label_style(
                    ("sans-serif", 14)
                        .into_font()
                        .transform(FontTransform::Rotate90),
                )
                .y_desc("Value")
                .draw()?;

            chart.draw_series(
                Histogram::vertical(&chart)
                    .style(BAR_FILL.filled())
                    .data(kept_values.iter().enumerate().map(|(i, v)| (i as u32, *v))),
            )?;

            root.present()?;
        }
    }

    encode_png(buffer, width, height)
}

/// Keep the (value, label) pairs whose value meets the threshold.
fn filter_entries(labels: &[String], values: &[f64], threshold: f64) -> (Vec<f64>, Vec<String>) {
    values
        .iter()
        .zip(labels.iter())
        .filter(|(v, _)| **v >= threshold)
        .map(|(v, l)| (*v, l.clone()))
        .unzip()
}

/// Encode an RGB pixel buffer as PNG.
fn encode_png(buffer: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>> {
    let img = image::RgbImage::from_raw(width, height, buffer)
        .context("Chart buffer has unexpected size")?;

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .context("Failed to encode chart as PNG")?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 4] = [0x89, b'P', b'N', b'G'];

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_render_pie() {
        let png = render_pie(
            &labels(&["0-14", "15-29", "30-44"]),
            &[50.0, 30.0, 20.0],
            "Population by age bracket",
            5.0,
        )
        .unwrap();

        assert_eq!(&png[..4], &PNG_MAGIC);
    }

    #[test]
    fn test_render_pie_filters_small_wedges() {
        // 2.0 falls below the 5% threshold; rendering must still succeed.
        let png = render_pie(
            &labels(&["a", "b", "c"]),
            &[90.0, 8.0, 2.0],
            "Filtered",
            5.0,
        )
        .unwrap();
        assert_eq!(&png[..4], &PNG_MAGIC);
    }

    #[test]
    fn test_render_pie_all_below_threshold() {
        let png = render_pie(&labels(&["a", "b"]), &[1.0, 2.0], "Empty", 5.0).unwrap();
        assert_eq!(&png[..4], &PNG_MAGIC);
    }

    #[test]
    fn test_render_pie_no_entries() {
        let png = render_pie(&[], &[], "Nothing", 5.0).unwrap();
        assert_eq!(&png[..4], &PNG_MAGIC);
    }

    #[test]
    fn test_render_bars() {
        let png = render_bars(
            &labels(&["tumori", "malattie circolatorie"]),
            &[150.0, 80.0],
            "Causes of death",
            5.0,
        )
        .unwrap();

        assert_eq!(&png[..4], &PNG_MAGIC);
    }

    #[test]
    fn test_render_bars_all_below_threshold() {
        let png = render_bars(&labels(&["a", "b"]), &[0.5, 3.0], "Empty", 5.0).unwrap();
        assert_eq!(&png[..4], &PNG_MAGIC);
    }

    #[test]
    fn test_filter_preserves_original_order() {
        let (values, kept) = filter_entries(&labels(&["a", "b", "c", "d"]), &[10.0, 1.0, 7.0, 6.0], 5.0);
        assert_eq!(kept, vec!["a", "c", "d"]);
        assert_eq!(values, vec![10.0, 7.0, 6.0]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let (values, _) = filter_entries(&labels(&["a", "b"]), &[5.0, 4.999], 5.0);
        assert_eq!(values, vec![5.0]);
    }

    #[test]
    fn test_concurrent_rendering() {
        // Each render owns its drawing surface; parallel invocations must
        // not interfere.
        let handles: Vec<_> = (0..4)
            .map(|i| {
                std::thread::spawn(move || {
                    let title = format!("Chart {}", i);
                    render_pie(
                        &[String::from("x"), String::from("y")],
                        &[60.0, 40.0],
                        &title,
                        5.0,
                    )
                })
            })
            .collect();

        for handle in handles {
            let png = handle.join().unwrap().unwrap();
            assert_eq!(&png[..4], &PNG_MAGIC);
        }
    }
}
