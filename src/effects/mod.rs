// Visual effects - Lighting and camera reactions to section and beat events

pub mod camera;
pub mod lighting;
pub mod registry;

pub use camera::{CameraPulseDriver, CameraPulseSettings, FovPulse};
pub use lighting::{Color, ColorTransition, LightingDriver, SectionPalette};
pub use registry::{EffectCommand, EffectRegistry, EffectTrigger, VisualEffect, VisualEffects};
