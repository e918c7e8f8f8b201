//! Normalization context
//!
//! Holds the installation under normalization and the active options. The
//! target is an explicit `Option`: callers branch on emptiness instead of
//! reading zero values from an uninitialized context.

use crate::options::Options;
use chop_types::Installation;

/// Single-writer handle threaded through one normalization pass
#[derive(Debug, Clone, Default)]
pub struct Context {
    target: Option<Installation>,
    options: Options,
}

impl Context {
    pub fn new(options: Options) -> Self {
        Self {
            target: None,
            options,
        }
    }

    /// Installation under normalization, if one has been set
    pub fn target(&self) -> Option<&Installation> {
        self.target.as_ref()
    }

    pub fn target_mut(&mut self) -> Option<&mut Installation> {
        self.target.as_mut()
    }

    /// Replace the target and hand it back for the walk
    pub fn set_target(&mut self, chi: Installation) -> &mut Installation {
        self.target.insert(chi)
    }

    /// Release the target, leaving the context empty
    pub fn take_target(&mut self) -> Option<Installation> {
        self.target.take()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_context() {
        let mut ctx = Context::default();
        assert!(ctx.target().is_none());
        assert!(ctx.target_mut().is_none());
        assert!(ctx.take_target().is_none());
        assert_eq!(ctx.options(), &Options::default());
    }

    #[test]
    fn test_set_target_replaces() {
        let mut ctx = Context::new(Options {
            replicas_use_fqdn: true,
            ..Default::default()
        });
        ctx.set_target(Installation::new("dev", "first"));
        let target = ctx.set_target(Installation::new("dev", "second"));
        target.namespace = "prod".into();

        let chi = ctx.target().map(|chi| (chi.namespace.as_str(), chi.name.as_str()));
        assert_eq!(chi, Some(("prod", "second")));
        assert!(ctx.options().replicas_use_fqdn);

        assert!(ctx.take_target().is_some());
        assert!(ctx.target().is_none());
    }
}
