//! Filters that can veto telemetry before it reaches the client.
//!
//! A filter sees each item together with the client it is about to be sent
//! to. It may redact the item in place (e.g. scrub PII) and returns `false`
//! to drop it. Filters run in order and the first veto stops the chain.

use std::sync::Arc;

use crate::contracts::{Contract, ExceptionTelemetry, TelemetryClient, TraceTelemetry};

/// Veto capability for one SDK version. Both hooks default to "keep".
pub trait TelemetryFilter<C: Contract>: Send + Sync {
    fn filter_trace(
        &self,
        _trace: &mut TraceTelemetry<C>,
        _client: &dyn TelemetryClient<C>,
    ) -> bool {
        true
    }

    fn filter_exception(
        &self,
        _exception: &mut ExceptionTelemetry<C>,
        _client: &dyn TelemetryClient<C>,
    ) -> bool {
        true
    }
}

/// Filter that keeps everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityFilter;

impl<C: Contract> TelemetryFilter<C> for IdentityFilter {}

/// Trace filter built from a closure. Exceptions pass untouched.
pub struct TraceFilterFn<F>(pub F);

impl<C, F> TelemetryFilter<C> for TraceFilterFn<F>
where
    C: Contract,
    F: Fn(&mut TraceTelemetry<C>, &dyn TelemetryClient<C>) -> bool + Send + Sync,
{
    fn filter_trace(&self, trace: &mut TraceTelemetry<C>, client: &dyn TelemetryClient<C>) -> bool {
        (self.0)(trace, client)
    }
}

/// Exception filter built from a closure. Traces pass untouched.
pub struct ExceptionFilterFn<F>(pub F);

impl<C, F> TelemetryFilter<C> for ExceptionFilterFn<F>
where
    C: Contract,
    F: Fn(&mut ExceptionTelemetry<C>, &dyn TelemetryClient<C>) -> bool + Send + Sync,
{
    fn filter_exception(
        &self,
        exception: &mut ExceptionTelemetry<C>,
        client: &dyn TelemetryClient<C>,
    ) -> bool {
        (self.0)(exception, client)
    }
}

/// Ordered filters for one SDK version.
pub struct FilterChain<C: Contract> {
    filters: Vec<Arc<dyn TelemetryFilter<C>>>,
}

impl<C: Contract> FilterChain<C> {
    /// An empty chain keeps everything.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Append a filter.
    pub fn with(mut self, filter: impl TelemetryFilter<C> + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Append a shared filter.
    pub fn with_shared(mut self, filter: Arc<dyn TelemetryFilter<C>>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Whether every filter keeps the trace. Stops at the first veto.
    pub fn allows_trace(
        &self,
        trace: &mut TraceTelemetry<C>,
        client: &dyn TelemetryClient<C>,
    ) -> bool {
        self.filters.iter().all(|f| f.filter_trace(trace, client))
    }

    /// Whether every filter keeps the exception. Stops at the first veto.
    pub fn allows_exception(
        &self,
        exception: &mut ExceptionTelemetry<C>,
        client: &dyn TelemetryClient<C>,
    ) -> bool {
        self.filters
            .iter()
            .all(|f| f.filter_exception(exception, client))
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl<C: Contract> Default for FilterChain<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Contract> Clone for FilterChain<C> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
        }
    }
}

impl<C: Contract> std::fmt::Debug for FilterChain<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl<C: Contract> FromIterator<Arc<dyn TelemetryFilter<C>>> for FilterChain<C> {
    fn from_iter<I: IntoIterator<Item = Arc<dyn TelemetryFilter<C>>>>(iter: I) -> Self {
        Self {
            filters: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MemoryClient;
    use crate::contracts::V3;
    use crate::severity::SeverityLevel;
    use crate::value::{ErrorValue, PropertyBag};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn trace(message: &str) -> TraceTelemetry<V3> {
        TraceTelemetry {
            message: message.to_string(),
            severity: V3::severity(SeverityLevel::Information),
            properties: PropertyBag::new(),
        }
    }

    struct Counting {
        calls: Arc<AtomicUsize>,
        keep: bool,
    }

    impl TelemetryFilter<V3> for Counting {
        fn filter_trace(&self, _: &mut TraceTelemetry<V3>, _: &dyn TelemetryClient<V3>) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.keep
        }
    }

    #[test]
    fn test_empty_chain_allows() {
        let client = MemoryClient::<V3>::new();
        let chain = FilterChain::<V3>::new();

        assert!(chain.allows_trace(&mut trace("x"), &client));
        let mut exception = ExceptionTelemetry::new(ErrorValue::new("boom"), PropertyBag::new());
        assert!(chain.allows_exception(&mut exception, &client));
    }

    #[test]
    fn test_identity_filter_allows() {
        let client = MemoryClient::<V3>::new();
        let chain = FilterChain::<V3>::new().with(IdentityFilter);

        assert!(chain.allows_trace(&mut trace("x"), &client));
    }

    #[test]
    fn test_veto_short_circuits() {
        let client = MemoryClient::<V3>::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let third = Arc::new(AtomicUsize::new(0));

        let chain = FilterChain::<V3>::new()
            .with(Counting {
                calls: first.clone(),
                keep: true,
            })
            .with(Counting {
                calls: second.clone(),
                keep: false,
            })
            .with(Counting {
                calls: third.clone(),
                keep: true,
            });

        assert!(!chain.allows_trace(&mut trace("x"), &client));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(third.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_closure_filter_can_redact() {
        let client = MemoryClient::<V3>::new();
        let chain = FilterChain::<V3>::new().with(TraceFilterFn(
            |t: &mut TraceTelemetry<V3>, _: &dyn TelemetryClient<V3>| {
                t.message = t.message.replace("secret", "***");
                true
            },
        ));

        let mut item = trace("password is secret");
        assert!(chain.allows_trace(&mut item, &client));
        assert_eq!(item.message, "password is ***");
    }

    #[test]
    fn test_trace_filter_ignores_exceptions() {
        let client = MemoryClient::<V3>::new();
        let chain = FilterChain::<V3>::new().with(TraceFilterFn(
            |_: &mut TraceTelemetry<V3>, _: &dyn TelemetryClient<V3>| false,
        ));

        let mut exception = ExceptionTelemetry::new(ErrorValue::new("boom"), PropertyBag::new());
        assert!(chain.allows_exception(&mut exception, &client));
        assert!(!chain.allows_trace(&mut trace("x"), &client));
    }
}
