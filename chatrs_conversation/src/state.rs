use tracing::warn;

use crate::handle::ConversationHandle;

/// Whether a session has a conversation handle yet.
///
/// The only transition is `Uninitialized -> Initialized`, made once through
/// [`ConversationState::initialize`].
#[derive(Debug, Default)]
pub enum ConversationState {
    #[default]
    Uninitialized,
    Initialized(ConversationHandle),
}

impl ConversationState {
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        matches!(self, Self::Initialized(_))
    }

    #[must_use]
    pub const fn handle(&self) -> Option<&ConversationHandle> {
        match self {
            Self::Initialized(handle) => Some(handle),
            Self::Uninitialized => None,
        }
    }

    pub const fn handle_mut(&mut self) -> Option<&mut ConversationHandle> {
        match self {
            Self::Initialized(handle) => Some(handle),
            Self::Uninitialized => None,
        }
    }

    /// Install `handle` if none is present. An existing handle always wins;
    /// returns whether `handle` was installed.
    pub fn initialize(&mut self, handle: ConversationHandle) -> bool {
        match self {
            Self::Uninitialized => {
                *self = Self::Initialized(handle);
                true
            }
            Self::Initialized(existing) => {
                warn!(
                    "Conversation {} already initialized, discarding {}",
                    existing.id(),
                    handle.id()
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::GenerationSettings;
    use chatrs_core::Credential;

    fn handle() -> ConversationHandle {
        ConversationHandle::new(Credential::new("sk-test"), GenerationSettings::default())
    }

    #[test]
    fn starts_uninitialized() {
        let state = ConversationState::default();
        assert!(!state.is_initialized());
        assert!(state.handle().is_none());
    }

    #[test]
    fn initialize_happens_once() {
        let mut state = ConversationState::default();
        let first = handle();
        let first_id = first.id();

        assert!(state.initialize(first));
        assert!(!state.initialize(handle()));
        assert_eq!(state.handle().map(ConversationHandle::id), Some(first_id));
    }
}
