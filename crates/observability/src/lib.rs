//! Tracing and logging setup shared by the binaries.

/// Initialize process-wide tracing from `RUST_LOG` (default `info`).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(None);
}

/// Initialize tracing with an explicit filter directive.
///
/// `None` falls back to `RUST_LOG`, then `info`.
pub fn init_with_filter(directive: Option<&str>) {
    tracing::init(directive);
}

/// Tracing configuration (filters, layers).
pub mod tracing;

#[cfg(test)]
mod tests {
    #[test]
    fn init_after_explicit_filter_is_a_no_op() {
        super::init_with_filter(Some("stockpack_infra=debug"));
        super::init();
    }
}
