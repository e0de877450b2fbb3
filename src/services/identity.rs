use tracing::debug;
use uuid::Uuid;

/// Derives local meeting ids from provider-native ids.
///
/// The mapping is a UUIDv5 hash under a fixed namespace, so relisting the same
/// provider meeting always yields the same local id. With a random namespace
/// the ids are stable only for the lifetime of the process; pin the namespace
/// through configuration to keep them stable across restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeetingIdMapper {
    namespace: Uuid,
}

impl MeetingIdMapper {
    pub fn new(namespace: Uuid) -> Self {
        Self { namespace }
    }

    /// Mapper with a fresh per-process namespace.
    pub fn random() -> Self {
        let namespace = Uuid::new_v4();
        debug!("Generated meeting id namespace {}", namespace);
        Self::new(namespace)
    }

    pub fn namespace(&self) -> Uuid {
        self.namespace
    }

    pub fn local_id(&self, native_id: &str) -> Uuid {
        Uuid::new_v5(&self.namespace, native_id.as_bytes())
    }
}

impl Default for MeetingIdMapper {
    fn default() -> Self {
        Self::random()
    }
}
