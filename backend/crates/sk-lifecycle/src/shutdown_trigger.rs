use crate::ShutdownCause;

/// Something that can start the coordinated shutdown.
pub trait ShutdownTrigger: Send + Sync {
    fn trigger_shutdown(&self, cause: ShutdownCause);
}
