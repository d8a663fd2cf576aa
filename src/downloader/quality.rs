// Quality selection - fixed option tables, size projection and
// yt-dlp format selector derivation

use super::estimate::estimate;
use super::models::{FormatSpec, Item, Mode, QualityChoice};

/// One selectable quality with its representative bitrate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityOption {
    /// Choice key as typed by the user ("1".."5")
    pub key: &'static str,
    pub label: &'static str,
    /// Representative bitrate used for size projection only
    pub bitrate_kbps: u32,
}

const VIDEO_OPTIONS: [QualityOption; 5] = [
    QualityOption { key: "1", label: "1080p", bitrate_kbps: 5000 },
    QualityOption { key: "2", label: "720p", bitrate_kbps: 2500 },
    QualityOption { key: "3", label: "480p", bitrate_kbps: 1000 },
    QualityOption { key: "4", label: "360p", bitrate_kbps: 700 },
    QualityOption { key: "5", label: "best", bitrate_kbps: 4000 },
];

const AUDIO_OPTIONS: [QualityOption; 4] = [
    QualityOption { key: "1", label: "128", bitrate_kbps: 128 },
    QualityOption { key: "2", label: "192", bitrate_kbps: 192 },
    QualityOption { key: "3", label: "256", bitrate_kbps: 256 },
    QualityOption { key: "4", label: "320", bitrate_kbps: 320 },
];

/// Defaults applied when the user's choice key is not in the table
const DEFAULT_VIDEO: QualityOption = VIDEO_OPTIONS[4];
const DEFAULT_AUDIO: QualityOption = AUDIO_OPTIONS[1];

/// Fixed ordered enumeration of quality options for a mode
pub fn options(mode: Mode) -> &'static [QualityOption] {
    match mode {
        Mode::Video => &VIDEO_OPTIONS,
        Mode::Audio => &AUDIO_OPTIONS,
    }
}

/// Projected total size in MB per choice key, summing the per-item
/// estimate (each rounded before summing) over all items. Presented to
/// the user before committing to a download.
pub fn project(items: &[Item], mode: Mode) -> Vec<(QualityOption, f64)> {
    options(mode)
        .iter()
        .map(|opt| {
            let total: f64 = items
                .iter()
                .map(|item| estimate(item.duration_seconds, opt.bitrate_kbps as f64))
                .sum();
            // Re-round: summing two-decimal values can reintroduce noise
            (*opt, (total * 100.0).round() / 100.0)
        })
        .collect()
}

/// Map a user choice key to a concrete QualityChoice. Unknown keys fall
/// back to the defined default (best video / 192 kbps audio), never fail.
pub fn resolve_choice(mode: Mode, key: &str) -> QualityChoice {
    let opt = options(mode)
        .iter()
        .find(|o| o.key == key.trim())
        .copied()
        .unwrap_or(match mode {
            Mode::Video => DEFAULT_VIDEO,
            Mode::Audio => DEFAULT_AUDIO,
        });

    match mode {
        Mode::Video => QualityChoice::VideoQuality {
            label: opt.label.to_string(),
            target_bitrate_kbps: opt.bitrate_kbps,
        },
        Mode::Audio => QualityChoice::AudioBitrate {
            label: opt.label.to_string(),
            kbps: opt.bitrate_kbps,
        },
    }
}

impl FormatSpec {
    /// Deterministic table lookup from a QualityChoice. Video selectors
    /// prefer H.264/mp4 with m4a audio; unrecognized labels fall back to
    /// the generic best-available selector for the mode.
    pub fn from_choice(choice: &QualityChoice) -> Self {
        match choice {
            QualityChoice::VideoQuality { label, .. } => {
                let selector = match label.as_str() {
                    "1080p" => "bestvideo[height<=1080][vcodec^=avc1][ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]",
                    "720p" => "bestvideo[height<=720][vcodec^=avc1][ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]",
                    "480p" => "bestvideo[height<=480][vcodec^=avc1][ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]",
                    "360p" => "bestvideo[height<=360][vcodec^=avc1][ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]",
                    "best" => "bestvideo[vcodec^=avc1][ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]",
                    _ => "best",
                };
                Self {
                    mode: Mode::Video,
                    selector: selector.to_string(),
                    audio_quality: None,
                }
            }
            QualityChoice::AudioBitrate { label, .. } => Self {
                mode: Mode::Audio,
                selector: "bestaudio/best".to_string(),
                audio_quality: Some(label.clone()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(durations: &[f64]) -> Vec<Item> {
        durations
            .iter()
            .enumerate()
            .map(|(i, &d)| Item::new(format!("item {}", i), format!("https://v/{}", i), d))
            .collect()
    }

    #[test]
    fn option_tables_are_fixed_and_ordered() {
        let video: Vec<_> = options(Mode::Video).iter().map(|o| o.label).collect();
        assert_eq!(video, ["1080p", "720p", "480p", "360p", "best"]);
        let audio: Vec<_> = options(Mode::Audio).iter().map(|o| o.key).collect();
        assert_eq!(audio, ["1", "2", "3", "4"]);
    }

    #[test]
    fn unknown_key_falls_back_to_default() {
        let choice = resolve_choice(Mode::Video, "9");
        assert_eq!(choice.label(), "best");
        assert_eq!(choice.bitrate_kbps(), 4000);

        let choice = resolve_choice(Mode::Audio, "");
        assert_eq!(choice.label(), "192");
        assert_eq!(choice.bitrate_kbps(), 192);
    }

    #[test]
    fn known_keys_resolve_exactly() {
        let choice = resolve_choice(Mode::Video, "2");
        assert_eq!(choice.label(), "720p");
        assert_eq!(choice.bitrate_kbps(), 2500);
        assert_eq!(choice.mode(), Mode::Video);
    }

    #[test]
    fn projection_sums_per_item_estimates() {
        let items = items(&[600.0, 1200.0, 300.0]);
        let projected = project(&items, Mode::Video);

        let (opt, total) = projected
            .iter()
            .find(|(o, _)| o.label == "720p")
            .copied()
            .unwrap();
        assert_eq!(opt.bitrate_kbps, 2500);

        let expected = estimate(600.0, 2500.0) + estimate(1200.0, 2500.0) + estimate(300.0, 2500.0);
        assert_eq!(total, (expected * 100.0).round() / 100.0);
        assert_eq!(total, 531.97);
    }

    #[test]
    fn shallow_items_project_to_zero() {
        let items = items(&[0.0, 0.0]);
        for (_, total) in project(&items, Mode::Audio) {
            assert_eq!(total, 0.0);
        }
    }

    #[test]
    fn video_spec_targets_height() {
        let spec = FormatSpec::from_choice(&resolve_choice(Mode::Video, "2"));
        assert!(spec.selector.contains("height<=720"));
        assert_eq!(spec.audio_quality, None);
        assert_eq!(spec.mode, Mode::Video);
    }

    #[test]
    fn audio_spec_carries_target_bitrate() {
        let spec = FormatSpec::from_choice(&resolve_choice(Mode::Audio, "4"));
        assert_eq!(spec.selector, "bestaudio/best");
        assert_eq!(spec.audio_quality.as_deref(), Some("320"));
    }

    #[test]
    fn unrecognized_label_uses_generic_selector() {
        let choice = QualityChoice::VideoQuality {
            label: "4k".to_string(),
            target_bitrate_kbps: 12000,
        };
        let spec = FormatSpec::from_choice(&choice);
        assert_eq!(spec.selector, "best");
    }
}
