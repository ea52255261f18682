/// Coarse hardware signals read once when a page mounts.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceSignals {
    pub hardware_concurrency: Option<f64>,
    /// `navigator.deviceMemory` in GB; only Chromium exposes it.
    pub device_memory_gb: Option<f64>,
    pub viewport_width: f64,
}

/// UI-only tier. Chooses how hard the progress animation works and nothing else.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeviceClass {
    #[default]
    Standard,
    LowEnd,
}

const LOW_END_MAX_CORES: f64 = 2.0;
const LOW_END_MAX_MEMORY_GB: f64 = 2.0;
const NARROW_VIEWPORT: f64 = 768.0;

impl DeviceClass {
    pub fn classify(signals: &DeviceSignals) -> Self {
        let few_cores = signals
            .hardware_concurrency
            .is_some_and(|cores| cores > 0.0 && cores <= LOW_END_MAX_CORES);
        let little_memory = signals
            .device_memory_gb
            .is_some_and(|gb| gb > 0.0 && gb <= LOW_END_MAX_MEMORY_GB);
        let narrow = signals.viewport_width < NARROW_VIEWPORT;

        if few_cores || little_memory || narrow {
            DeviceClass::LowEnd
        } else {
            DeviceClass::Standard
        }
    }
}

/// The `device_type` property attached to funnel events.
pub fn device_type(viewport_width: f64) -> &'static str {
    if viewport_width <= NARROW_VIEWPORT {
        "mobile"
    } else {
        "desktop"
    }
}

/// How the simulated progress bar moves. Computed once per page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationProfile {
    pub initial_progress: u8,
    pub step: u8,
    pub frame_interval_ms: f64,
    /// The bar never passes this on its own; completion jumps to 100.
    pub ceiling: u8,
}

impl AnimationProfile {
    pub fn for_class(class: DeviceClass) -> Self {
        match class {
            DeviceClass::Standard => Self {
                initial_progress: 15,
                step: 5,
                frame_interval_ms: 50.0,
                ceiling: 90,
            },
            DeviceClass::LowEnd => Self {
                initial_progress: 15,
                step: 10,
                frame_interval_ms: 100.0,
                ceiling: 90,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(cores: Option<f64>, memory: Option<f64>, width: f64) -> DeviceSignals {
        DeviceSignals {
            hardware_concurrency: cores,
            device_memory_gb: memory,
            viewport_width: width,
        }
    }

    #[test]
    fn test_any_weak_signal_makes_low_end() {
        assert_eq!(DeviceClass::classify(&signals(Some(2.0), Some(8.0), 1280.0)), DeviceClass::LowEnd);
        assert_eq!(DeviceClass::classify(&signals(Some(8.0), Some(1.0), 1280.0)), DeviceClass::LowEnd);
        assert_eq!(DeviceClass::classify(&signals(Some(8.0), Some(8.0), 400.0)), DeviceClass::LowEnd);
    }

    #[test]
    fn test_missing_signals_do_not_count_as_weak() {
        assert_eq!(DeviceClass::classify(&signals(None, None, 1280.0)), DeviceClass::Standard);
        assert_eq!(DeviceClass::classify(&signals(Some(0.0), None, 1024.0)), DeviceClass::Standard);
    }

    #[test]
    fn test_low_end_profile_moves_in_bigger_slower_steps() {
        let standard = AnimationProfile::for_class(DeviceClass::Standard);
        let low_end = AnimationProfile::for_class(DeviceClass::LowEnd);
        assert!(low_end.frame_interval_ms > standard.frame_interval_ms);
        assert!(low_end.step > standard.step);
        assert_eq!(low_end.ceiling, standard.ceiling);
    }

    #[test]
    fn test_device_type_boundary() {
        assert_eq!(device_type(768.0), "mobile");
        assert_eq!(device_type(769.0), "desktop");
    }
}
