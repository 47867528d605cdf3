//! Process-wide resolver handle.
//!
//! The NSS entry points have no context parameter, so the resolver
//! they consult is a single installed handle. The embedding process
//! installs it once with [`install`] before issuing lookups and
//! releases it with [`teardown`]; there is no implicit
//! constructor/destructor lifecycle. While nothing is installed, every
//! lookup is a miss.
//!
//! The handle is read-mostly shared state: many threads take the read
//! side concurrently during lookups, and install/teardown take the
//! write side rarely. Concurrency of the resolution work itself is the
//! [`Resolver`] implementation's responsibility.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;
use ubdns_core::Resolver;

static RESOLVER: RwLock<Option<Arc<dyn Resolver>>> = RwLock::new(None);

/// Installs the process-wide resolver, replacing any previous one.
pub fn install(resolver: Arc<dyn Resolver>) {
    debug!("resolver installed");
    *RESOLVER.write() = Some(resolver);
}

/// Releases the process-wide resolver. Lookups issued afterwards
/// report not-found.
pub fn teardown() {
    debug!("resolver torn down");
    *RESOLVER.write() = None;
}

/// Clones the installed handle, if any.
pub(crate) fn current() -> Option<Arc<dyn Resolver>> {
    RESOLVER.read().clone()
}
