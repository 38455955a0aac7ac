use colloquy_wire::IdentityDescriptor;

/// Construction-time options for a session manager. Fixed for the lifetime
/// of the instance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionConfig {
    /// Identity payload echoed on every request; supplied by the identity
    /// collaborator, opaque to the manager.
    pub identity: Option<IdentityDescriptor>,
    /// Stage attached to turn requests before the server reports one.
    pub initial_stage: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_start_at_stage_zero_without_identity() {
        let config = SessionConfig::default();
        assert_eq!(config.identity, None);
        assert_eq!(config.initial_stage, 0);
    }
}
