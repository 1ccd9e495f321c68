//! The fixed per-frame pass list
//!
//! Every frame walks the same sequence of pass descriptors. Each pass
//! names the resources it reads and writes so the plan can be checked
//! once, at startup, for a pass consuming something nothing produced yet.

use std::collections::HashSet;
use std::fmt;

use crate::context::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Light view and cascade fitting; touches no target
    CascadeSetup,
    Reflection,
    Refraction,
    Shadow(usize),
    Composite,
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassKind::CascadeSetup => write!(f, "cascade setup"),
            PassKind::Reflection => write!(f, "reflection"),
            PassKind::Refraction => write!(f, "refraction"),
            PassKind::Shadow(i) => write!(f, "shadow {i}"),
            PassKind::Composite => write!(f, "composite"),
        }
    }
}

/// Render target slot a pass writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSlot {
    None,
    Reflection,
    Refraction,
    Shadow(usize),
    Screen,
}

/// Per-frame values flowing between passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Input-driven state available before any pass runs
    Camera,
    Sun,
    WaterLevel,
    MirroredCamera,
    LightSpace(usize),
    ReflectionColor,
    RefractionColor,
    ShadowDepth(usize),
}

impl Resource {
    /// Provided by the caller rather than by a pass
    pub fn is_external(&self) -> bool {
        matches!(self, Resource::Camera | Resource::Sun | Resource::WaterLevel)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PassDescriptor {
    pub kind: PassKind,
    pub target: TargetSlot,
    pub inputs: Vec<Resource>,
    pub outputs: Vec<Resource>,
}

/// Ordered list of passes for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    passes: Vec<PassDescriptor>,
    cascades: usize,
}

impl FramePlan {
    /// Cascade setup, reflection, refraction, one shadow pass per cascade,
    /// then the composite
    pub fn standard(cascades: usize) -> Self {
        let mut passes = vec![
            PassDescriptor {
                kind: PassKind::CascadeSetup,
                target: TargetSlot::None,
                inputs: vec![Resource::Camera, Resource::Sun],
                outputs: (0..cascades).map(Resource::LightSpace).collect(),
            },
            PassDescriptor {
                kind: PassKind::Reflection,
                target: TargetSlot::Reflection,
                inputs: vec![Resource::Camera, Resource::WaterLevel],
                outputs: vec![Resource::MirroredCamera, Resource::ReflectionColor],
            },
            PassDescriptor {
                kind: PassKind::Refraction,
                target: TargetSlot::Refraction,
                inputs: vec![Resource::Camera, Resource::WaterLevel],
                outputs: vec![Resource::RefractionColor],
            },
        ];

        for i in 0..cascades {
            passes.push(PassDescriptor {
                kind: PassKind::Shadow(i),
                target: TargetSlot::Shadow(i),
                inputs: vec![Resource::LightSpace(i)],
                outputs: vec![Resource::ShadowDepth(i)],
            });
        }

        let mut composite_inputs = vec![
            Resource::Camera,
            Resource::Sun,
            Resource::ReflectionColor,
            Resource::RefractionColor,
        ];
        for i in 0..cascades {
            composite_inputs.push(Resource::LightSpace(i));
            composite_inputs.push(Resource::ShadowDepth(i));
        }
        passes.push(PassDescriptor {
            kind: PassKind::Composite,
            target: TargetSlot::Screen,
            inputs: composite_inputs,
            outputs: vec![],
        });

        Self { passes, cascades }
    }

    pub fn passes(&self) -> &[PassDescriptor] {
        &self.passes
    }

    pub fn cascades(&self) -> usize {
        self.cascades
    }

    /// Check that every input is external or written by an earlier pass,
    /// and that nothing is written twice
    pub fn validate(&self) -> Result<(), RenderError> {
        let mut produced: HashSet<Resource> = HashSet::new();
        for pass in &self.passes {
            for input in &pass.inputs {
                if !input.is_external() && !produced.contains(input) {
                    return Err(RenderError::InvalidFramePlan(format!(
                        "{} pass reads {:?} before it is written",
                        pass.kind, input
                    )));
                }
            }
            for output in &pass.outputs {
                if output.is_external() || !produced.insert(*output) {
                    return Err(RenderError::InvalidFramePlan(format!(
                        "{} pass writes {:?} which is already available",
                        pass.kind, output
                    )));
                }
            }
        }
        Ok(())
    }

    #[cfg(test)]
    fn from_passes(passes: Vec<PassDescriptor>) -> Self {
        Self {
            passes,
            cascades: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_plan_order() {
        let plan = FramePlan::standard(3);
        let kinds: Vec<PassKind> = plan.passes().iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PassKind::CascadeSetup,
                PassKind::Reflection,
                PassKind::Refraction,
                PassKind::Shadow(0),
                PassKind::Shadow(1),
                PassKind::Shadow(2),
                PassKind::Composite,
            ]
        );
        assert_eq!(plan.passes().last().map(|p| p.target), Some(TargetSlot::Screen));
    }

    #[test]
    fn standard_plans_validate() {
        for n in 0..=4 {
            let plan = FramePlan::standard(n);
            assert_eq!(plan.cascades(), n);
            assert!(plan.validate().is_ok(), "{n} cascades");
        }
    }

    #[test]
    fn composite_reads_every_shadow_map() {
        let plan = FramePlan::standard(2);
        let composite = plan.passes().last().map(|p| p.inputs.clone()).unwrap_or_default();
        assert!(composite.contains(&Resource::ShadowDepth(0)));
        assert!(composite.contains(&Resource::ShadowDepth(1)));
        assert!(composite.contains(&Resource::ReflectionColor));
    }

    #[test]
    fn reading_before_writing_is_rejected() {
        let mut passes = FramePlan::standard(1).passes().to_vec();
        // Move the composite ahead of the refraction pass
        let composite = passes.pop().unwrap();
        passes.insert(2, composite);
        let err = FramePlan::from_passes(passes).validate().unwrap_err();
        assert!(err.to_string().contains("composite"));
    }

    #[test]
    fn writing_twice_is_rejected() {
        let mut passes = FramePlan::standard(1).passes().to_vec();
        passes[2].outputs.push(Resource::ReflectionColor);
        assert!(FramePlan::from_passes(passes).validate().is_err());
    }
}
