//! Signal resolution
//!
//! Turns a palette index into the note, color and status line emitted for
//! one metric in one cycle.

use std::fmt::Write as _;

use crate::color::{Color, NEUTRAL_COLOR};
use crate::registry::{MetricDefinition, Note};
use crate::sample::SampleResult;

/// Fully resolved output of one metric iteration
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    /// Metric name
    pub metric: String,
    /// Palette index the value mapped to
    pub index: usize,
    /// Sampled value
    pub value: f64,
    /// Note frequency in Hz
    pub frequency: f64,
    /// Note label
    pub label: String,
    /// Display color
    pub color: Color,
    /// Single-line status message
    pub message: String,
}

/// Resolve the signal for `definition` at `index`.
///
/// Out-of-range indices clamp to the last palette entry and the last color.
pub fn resolve(definition: &MetricDefinition, index: usize, sample: &SampleResult) -> Signal {
    let note = definition.note(index);
    let color = resolve_color(definition.colors(), index);
    let message = format_message(definition, sample, note, color);

    Signal {
        metric: definition.name().to_string(),
        index,
        value: sample.value,
        frequency: note.frequency,
        label: note.label.clone(),
        color,
        message,
    }
}

/// Palette entry at `index`, clamped to the last entry; `None` for an empty palette.
pub fn resolve_note(palette: &[Note], index: usize) -> Option<&Note> {
    palette.get(index).or_else(|| palette.last())
}

/// Color at `index`, clamped to the last color; [`NEUTRAL_COLOR`] for an empty list.
pub fn resolve_color(colors: &[Color], index: usize) -> Color {
    colors
        .get(index)
        .or_else(|| colors.last())
        .copied()
        .unwrap_or(NEUTRAL_COLOR)
}

/// Build the status line for one signal
pub fn format_message(
    definition: &MetricDefinition,
    sample: &SampleResult,
    note: &Note,
    color: Color,
) -> String {
    let mut message = format!("{}: {:.2}", definition.display_name(), sample.value);
    if !definition.unit().is_empty() {
        message.push(' ');
        message.push_str(definition.unit());
    }
    let _ = write!(
        message,
        " | Note: {} ({} Hz) | Color: {}",
        note.label, note.frequency, color
    );

    if !sample.auxiliary.is_empty() {
        let extra: Vec<String> = sample
            .auxiliary
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        let _ = write!(message, " | Extra: {}", extra.join(", "));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors(hex: &[&str]) -> Vec<Color> {
        hex.iter().map(|h| Color::parse(h).unwrap()).collect()
    }

    fn cpu() -> MetricDefinition {
        MetricDefinition::builder("cpu_usage")
            .display_name("CPU Usage")
            .unit("%")
            .notes(&[(262.0, "C4"), (294.0, "D4"), (330.0, "E4"), (349.0, "F4")])
            .colors(&["#111111", "#222222", "#333333", "#444444"])
            .continuous(0.0, 100.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_resolve_color_in_bounds() {
        let list = colors(&["#111111", "#222222", "#333333"]);
        assert_eq!(resolve_color(&list, 1).to_string(), "#222222");
    }

    #[test]
    fn test_resolve_color_out_of_bounds() {
        let list = colors(&["#111111", "#222222", "#333333"]);
        assert_eq!(resolve_color(&list, 10).to_string(), "#333333");
    }

    #[test]
    fn test_resolve_color_empty() {
        assert_eq!(resolve_color(&[], 0), NEUTRAL_COLOR);
        assert_eq!(resolve_color(&[], 5).to_string(), "#808080");
    }

    #[test]
    fn test_resolve_note_clamps() {
        let palette = vec![Note::new(220.0, "A3"), Note::new(440.0, "A4")];
        assert_eq!(resolve_note(&palette, 0).unwrap().label, "A3");
        assert_eq!(resolve_note(&palette, 9).unwrap().label, "A4");
        assert!(resolve_note(&[], 0).is_none());
    }

    #[test]
    fn test_resolve_signal() {
        let definition = cpu();
        let sample = SampleResult::new(72.5);
        let index = definition.index_for(sample.value);
        let signal = resolve(&definition, index, &sample);

        assert_eq!(signal.index, 2);
        assert_eq!(signal.frequency, 330.0);
        assert_eq!(signal.label, "E4");
        assert_eq!(signal.color.to_string(), "#333333");
        assert_eq!(
            signal.message,
            "CPU Usage: 72.50 % | Note: E4 (330 Hz) | Color: #333333"
        );
    }

    #[test]
    fn test_resolve_mismatched_colors_degrades() {
        let definition = MetricDefinition::builder("short_colors")
            .notes(&[(220.0, "A3"), (262.0, "C4"), (330.0, "E4")])
            .colors(&["#AA0000"])
            .continuous(0.0, 1.0)
            .build()
            .unwrap();

        let signal = resolve(&definition, 2, &SampleResult::new(1.0));
        assert_eq!(signal.label, "E4");
        assert_eq!(signal.color.to_string(), "#AA0000");
    }

    #[test]
    fn test_resolve_out_of_range_index() {
        let signal = resolve(&cpu(), 42, &SampleResult::new(100.0));
        assert_eq!(signal.label, "F4");
        assert_eq!(signal.color.to_string(), "#444444");
    }

    #[test]
    fn test_message_with_aux_and_no_unit() {
        let definition = MetricDefinition::builder("pod_status")
            .display_name("Pod Status")
            .notes(&[(220.0, "A3"), (392.0, "G4")])
            .colors(&["#86EF7D", "#065F46"])
            .categorical(&[("Running", 1)])
            .build()
            .unwrap();
        let sample = SampleResult::new(1.0)
            .with_aux("status", "Running")
            .with_aux("count", 3);

        let signal = resolve(&definition, definition.index_for(sample.value), &sample);
        assert_eq!(
            signal.message,
            "Pod Status: 1.00 | Note: G4 (392 Hz) | Color: #065F46 | Extra: count=3, status=Running"
        );
    }
}
