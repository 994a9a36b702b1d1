//! Reporter trait for dependency injection
//!
//! This trait allows pipelines and the scheduler to report per-package status
//! without being coupled to a specific terminal implementation. Pipelines run
//! concurrently, so implementations must be safe to call from many tasks.

/// Receives progress from pipelines and batch operations.
pub trait Reporter: Send + Sync {
    /// Announce the packages of a batch and the backend serving them.
    fn prepare_batch(&self, packages: &[String], backend: &str);

    /// A pipeline started retrieving the recipe.
    fn fetching(&self, name: &str);

    /// A pipeline started the build tool.
    fn building(&self, name: &str);

    /// A pipeline started removing or upgrading a local package.
    fn working(&self, name: &str, action: &str);

    /// Marks a package as successfully completed.
    fn done(&self, name: &str, detail: &str);

    /// Marks a package as skipped (nothing to do, not an error).
    fn skipped(&self, name: &str, reason: &str);

    /// Marks a package as failed with a specific reason.
    fn failed(&self, name: &str, reason: &str);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a success message.
    fn success(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);

    /// Log an error message.
    fn error(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn prepare_batch(&self, packages: &[String], backend: &str) {
        (**self).prepare_batch(packages, backend);
    }
    fn fetching(&self, name: &str) {
        (**self).fetching(name);
    }
    fn building(&self, name: &str) {
        (**self).building(name);
    }
    fn working(&self, name: &str, action: &str) {
        (**self).working(name, action);
    }
    fn done(&self, name: &str, detail: &str) {
        (**self).done(name, detail);
    }
    fn skipped(&self, name: &str, reason: &str) {
        (**self).skipped(name, reason);
    }
    fn failed(&self, name: &str, reason: &str) {
        (**self).failed(name, reason);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn success(&self, msg: &str) {
        (**self).success(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
    fn error(&self, msg: &str) {
        (**self).error(msg);
    }
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn prepare_batch(&self, _: &[String], _: &str) {}
    fn fetching(&self, _: &str) {}
    fn building(&self, _: &str) {}
    fn working(&self, _: &str, _: &str) {}
    fn done(&self, _: &str, _: &str) {}
    fn skipped(&self, _: &str, _: &str) {}
    fn failed(&self, _: &str, _: &str) {}
    fn info(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warning(&self, _: &str) {}
    fn error(&self, _: &str) {}
}
