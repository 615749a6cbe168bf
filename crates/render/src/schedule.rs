use std::fmt;

/// The passes a frame runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Fullscreen quad, a pure function of time, into an offscreen color texture.
    Procedural,
    /// Depth-only render of the shadow casters from the light.
    Shadow,
    /// Shaded render of every pool from the camera into the screen targets.
    Main,
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassKind::Procedural => write!(f, "procedural"),
            PassKind::Shadow => write!(f, "shadow"),
            PassKind::Main => write!(f, "main"),
        }
    }
}

/// Textures passed between passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    ProceduralColor,
    ShadowDepth,
    MainColor,
    MainDepth,
}

/// One pass and the textures it consumes and produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassDescriptor {
    pub kind: PassKind,
    pub reads: Vec<TextureSlot>,
    pub writes: Vec<TextureSlot>,
}

impl PassDescriptor {
    pub fn new(kind: PassKind, reads: Vec<TextureSlot>, writes: Vec<TextureSlot>) -> Self {
        Self {
            kind,
            reads,
            writes,
        }
    }
}

/// Errors from validating a pass order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("{pass} pass reads {slot:?} before any earlier pass writes it")]
    MissingInput { pass: PassKind, slot: TextureSlot },
    #[error("{pass} pass writes {slot:?}, already written by the {first} pass")]
    DuplicateOutput {
        pass: PassKind,
        slot: TextureSlot,
        first: PassKind,
    },
    #[error("{0} pass appears more than once")]
    DuplicatePass(PassKind),
}

/// Ordered pass list. Every read is produced by an earlier pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassSchedule {
    passes: Vec<PassDescriptor>,
}

impl PassSchedule {
    /// Validate and adopt `passes` in the given order.
    pub fn new(passes: Vec<PassDescriptor>) -> Result<Self, ScheduleError> {
        let mut written: Vec<(TextureSlot, PassKind)> = Vec::new();
        let mut seen: Vec<PassKind> = Vec::new();

        for pass in &passes {
            if seen.contains(&pass.kind) {
                return Err(ScheduleError::DuplicatePass(pass.kind));
            }
            seen.push(pass.kind);

            for slot in &pass.reads {
                if !written.iter().any(|(s, _)| s == slot) {
                    return Err(ScheduleError::MissingInput {
                        pass: pass.kind,
                        slot: *slot,
                    });
                }
            }
            for slot in &pass.writes {
                if let Some((_, first)) = written.iter().find(|(s, _)| s == slot) {
                    return Err(ScheduleError::DuplicateOutput {
                        pass: pass.kind,
                        slot: *slot,
                        first: *first,
                    });
                }
                written.push((*slot, pass.kind));
            }
        }

        Ok(Self { passes })
    }

    /// Procedural, then shadow, then main.
    pub fn standard() -> Self {
        Self {
            passes: vec![
                PassDescriptor::new(PassKind::Procedural, vec![], vec![TextureSlot::ProceduralColor]),
                PassDescriptor::new(PassKind::Shadow, vec![], vec![TextureSlot::ShadowDepth]),
                PassDescriptor::new(
                    PassKind::Main,
                    vec![TextureSlot::ShadowDepth, TextureSlot::ProceduralColor],
                    vec![TextureSlot::MainColor, TextureSlot::MainDepth],
                ),
            ],
        }
    }

    pub fn passes(&self) -> &[PassDescriptor] {
        &self.passes
    }

    /// Pass kinds in execution order.
    pub fn order(&self) -> impl Iterator<Item = PassKind> + '_ {
        self.passes.iter().map(|p| p.kind)
    }

    pub fn position(&self, kind: PassKind) -> Option<usize> {
        self.passes.iter().position(|p| p.kind == kind)
    }
}

impl Default for PassSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_order() {
        let schedule = PassSchedule::standard();
        let order: Vec<PassKind> = schedule.order().collect();
        assert_eq!(order, vec![PassKind::Procedural, PassKind::Shadow, PassKind::Main]);
    }

    #[test]
    fn standard_schedule_validates() {
        let passes = PassSchedule::standard().passes().to_vec();
        assert!(PassSchedule::new(passes).is_ok());
    }

    #[test]
    fn producers_may_swap_among_themselves() {
        let mut passes = PassSchedule::standard().passes().to_vec();
        passes.swap(0, 1);
        let schedule = PassSchedule::new(passes).unwrap();
        assert_eq!(schedule.position(PassKind::Shadow), Some(0));
        assert_eq!(schedule.position(PassKind::Main), Some(2));
    }

    #[test]
    fn main_before_shadow_is_rejected() {
        let mut passes = PassSchedule::standard().passes().to_vec();
        passes.swap(1, 2);
        assert_eq!(
            PassSchedule::new(passes),
            Err(ScheduleError::MissingInput {
                pass: PassKind::Main,
                slot: TextureSlot::ShadowDepth
            })
        );
    }

    #[test]
    fn double_write_is_rejected() {
        let mut passes = PassSchedule::standard().passes().to_vec();
        passes[1].writes.push(TextureSlot::ProceduralColor);
        assert!(matches!(
            PassSchedule::new(passes),
            Err(ScheduleError::DuplicateOutput {
                pass: PassKind::Shadow,
                first: PassKind::Procedural,
                ..
            })
        ));
    }

    #[test]
    fn repeated_pass_is_rejected() {
        let mut passes = PassSchedule::standard().passes().to_vec();
        passes.push(PassDescriptor::new(PassKind::Shadow, vec![], vec![]));
        assert_eq!(
            PassSchedule::new(passes),
            Err(ScheduleError::DuplicatePass(PassKind::Shadow))
        );
    }
}
