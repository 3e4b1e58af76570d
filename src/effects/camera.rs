// Camera pulse - Short field-of-view kick on each beat
// Downbeats pulse harder than ordinary beats

/// Camera pulse tuning
#[derive(Debug, Clone, PartialEq)]
pub struct CameraPulseSettings {
    pub base_fov: f64,
    /// FOV added at full intensity
    pub max_fov_delta: f64,
    pub pulse_seconds: f64,
}

impl Default for CameraPulseSettings {
    fn default() -> Self {
        Self {
            base_fov: 70.0,
            max_fov_delta: 6.0,
            pulse_seconds: 0.15,
        }
    }
}

/// One FOV pulse: jumps to `peak_fov` then eases back to `base_fov`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FovPulse {
    pub base_fov: f64,
    pub peak_fov: f64,
    pub start: f64,
    pub duration: f64,
}

impl FovPulse {
    /// FOV at wall time `now` (quadratic ease-out back to base)
    pub fn fov_at(&self, now: f64) -> f64 {
        let elapsed = now - self.start;
        if elapsed < 0.0 || self.duration <= 0.0 || elapsed >= self.duration {
            return self.base_fov;
        }
        let remaining = 1.0 - elapsed / self.duration;
        self.base_fov + (self.peak_fov - self.base_fov) * remaining * remaining
    }
}

#[derive(Debug, Clone)]
pub struct CameraPulseDriver {
    settings: CameraPulseSettings,
    current: Option<FovPulse>,
}

impl CameraPulseDriver {
    pub fn new(settings: CameraPulseSettings) -> Self {
        Self {
            settings,
            current: None,
        }
    }

    /// Start a pulse with magnitude proportional to `intensity` (clamped to 0..=1)
    pub fn pulse(&mut self, intensity: f64, now: f64) -> FovPulse {
        let intensity = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let pulse = FovPulse {
            base_fov: self.settings.base_fov,
            peak_fov: self.settings.base_fov + self.settings.max_fov_delta * intensity,
            start: now,
            duration: self.settings.pulse_seconds,
        };
        self.current = Some(pulse);
        pulse
    }

    pub fn fov_at(&self, now: f64) -> f64 {
        self.current
            .map(|p| p.fov_at(now))
            .unwrap_or(self.settings.base_fov)
    }
}
