use sprig_render::{PoolError, ScheduleError};

/// Errors that end the frame loop.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("GPU device lost: {0}")]
    DeviceLost(String),
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("pool error: {0}")]
    Pool(#[from] PoolError),
    #[error("pass schedule error: {0}")]
    Schedule(#[from] ScheduleError),
    /// `record` ran before the named setup step.
    #[error("frame recorded before {0}")]
    NotPrepared(&'static str),
}

#[cfg(test)]
mod tests {
    use sprig_render::{PassDescriptor, PassKind, PassSchedule, TextureSlot};

    use super::*;

    #[test]
    fn schedule_errors_convert() {
        let err = PassSchedule::new(vec![PassDescriptor::new(
            PassKind::Main,
            vec![TextureSlot::ShadowDepth],
            vec![TextureSlot::MainColor],
        )])
        .map_err(RenderError::from)
        .unwrap_err();
        assert!(matches!(err, RenderError::Schedule(_)));
        assert!(err.to_string().starts_with("pass schedule error"));
    }

    #[test]
    fn device_lost_carries_reason() {
        let err = RenderError::DeviceLost("Destroyed: gone".into());
        assert_eq!(err.to_string(), "GPU device lost: Destroyed: gone");
    }

    #[test]
    fn not_prepared_names_the_missing_step() {
        let err = RenderError::NotPrepared("prepare");
        assert_eq!(err.to_string(), "frame recorded before prepare");
        assert!(matches!(err, RenderError::NotPrepared("prepare")));
    }
}
