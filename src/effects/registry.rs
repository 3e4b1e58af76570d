// Effect registry - Which visual effects fire on which musical event
// Effects are enum variants dispatched by match, not callbacks keyed by string

use super::camera::{CameraPulseDriver, FovPulse};
use super::lighting::{ColorTransition, LightingDriver};
use crate::sync::{Beat, SectionChange};

/// Musical event an effect can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectTrigger {
    /// Beat number 1
    Downbeat,
    /// Any other beat
    Beat,
    SectionChange,
}

impl EffectTrigger {
    pub fn for_beat(beat: &Beat) -> Self {
        if beat.is_downbeat() {
            EffectTrigger::Downbeat
        } else {
            EffectTrigger::Beat
        }
    }
}

/// A visual effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VisualEffect {
    /// FOV kick, magnitude scaled by intensity (0..=1)
    CameraPulse { intensity: f64 },
    /// Ambient light transition toward the current section's color
    AmbientShift,
}

/// Instruction for the host's tweening primitives
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectCommand {
    Fov(FovPulse),
    Ambient(ColorTransition),
}

/// Trigger -> effects bindings, applied in registration order
#[derive(Debug, Clone, Default)]
pub struct EffectRegistry {
    bindings: Vec<(EffectTrigger, VisualEffect)>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard bindings: strong pulse on downbeats, light pulse on beats, lighting on sections
    pub fn standard(downbeat_intensity: f64, beat_intensity: f64) -> Self {
        let mut registry = Self::new();
        registry.register(
            EffectTrigger::Downbeat,
            VisualEffect::CameraPulse {
                intensity: downbeat_intensity,
            },
        );
        registry.register(
            EffectTrigger::Beat,
            VisualEffect::CameraPulse {
                intensity: beat_intensity,
            },
        );
        registry.register(EffectTrigger::SectionChange, VisualEffect::AmbientShift);
        registry
    }

    pub fn register(&mut self, trigger: EffectTrigger, effect: VisualEffect) {
        self.bindings.push((trigger, effect));
    }

    /// Remove every effect bound to a trigger
    pub fn clear(&mut self, trigger: EffectTrigger) {
        self.bindings.retain(|(t, _)| *t != trigger);
    }

    pub fn effects_for(&self, trigger: EffectTrigger) -> impl Iterator<Item = &VisualEffect> {
        self.bindings
            .iter()
            .filter(move |(t, _)| *t == trigger)
            .map(|(_, effect)| effect)
    }
}

/// Registry plus the drivers that realise each effect
#[derive(Debug, Clone)]
pub struct VisualEffects {
    registry: EffectRegistry,
    lighting: LightingDriver,
    camera: CameraPulseDriver,
    section: Option<String>,
}

impl VisualEffects {
    pub fn new(registry: EffectRegistry, lighting: LightingDriver, camera: CameraPulseDriver) -> Self {
        Self {
            registry,
            lighting,
            camera,
            section: None,
        }
    }

    pub fn on_section_changed(&mut self, change: &SectionChange, now: f64) -> Vec<EffectCommand> {
        self.section = change.current.as_ref().map(|s| s.name.clone());
        self.dispatch(EffectTrigger::SectionChange, now)
    }

    pub fn on_beat(&mut self, beat: &Beat, now: f64) -> Vec<EffectCommand> {
        self.dispatch(EffectTrigger::for_beat(beat), now)
    }

    fn dispatch(&mut self, trigger: EffectTrigger, now: f64) -> Vec<EffectCommand> {
        let effects: Vec<VisualEffect> = self.registry.effects_for(trigger).copied().collect();
        effects
            .into_iter()
            .map(|effect| match effect {
                VisualEffect::CameraPulse { intensity } => {
                    EffectCommand::Fov(self.camera.pulse(intensity, now))
                }
                VisualEffect::AmbientShift => EffectCommand::Ambient(
                    self.lighting.on_section_changed(self.section.as_deref(), now),
                ),
            })
            .collect()
    }

    /// Back to base state for a new song
    pub fn reset(&mut self) {
        self.section = None;
        self.lighting.reset();
    }

    pub fn registry_mut(&mut self) -> &mut EffectRegistry {
        &mut self.registry
    }

    pub fn lighting(&self) -> &LightingDriver {
        &self.lighting
    }

    pub fn camera(&self) -> &CameraPulseDriver {
        &self.camera
    }
}
