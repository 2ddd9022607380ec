//! Lifecycle of the bridge's single SDK callback registration.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::normalizer::EventNormalizer;
use crate::sdk::callbacks::NotificationHandler;
use crate::sdk::client::{RegistrationId, ThermSdk};

/// Proof that the normalizer is attached to the SDK's callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionHandle {
    registration: RegistrationId,
    tag: String,
}

impl SubscriptionHandle {
    /// The SDK's registration token.
    pub fn registration(&self) -> RegistrationId {
        self.registration
    }

    /// Tag the registration was made under.
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

/// Owns the at-most-one registration of the [`EventNormalizer`] with the SDK.
///
/// The handle slot is locked across the SDK call, so concurrent
/// `subscribe`/`unsubscribe` calls cannot produce a second registration or
/// deregister twice. Dropping the manager unsubscribes.
pub struct SubscriptionManager {
    sdk: Arc<dyn ThermSdk>,
    normalizer: Arc<EventNormalizer>,
    tag: String,
    handle: Mutex<Option<SubscriptionHandle>>,
}

impl SubscriptionManager {
    /// Create an unsubscribed manager.
    pub fn new(sdk: Arc<dyn ThermSdk>, normalizer: Arc<EventNormalizer>, tag: String) -> Self {
        Self {
            sdk,
            normalizer,
            tag,
            handle: Mutex::new(None),
        }
    }

    /// Attach the normalizer to the SDK.
    ///
    /// Returns the existing handle unchanged if already subscribed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Sdk`] if the SDK refuses the registration; the
    /// manager stays unsubscribed.
    pub fn subscribe(&self) -> Result<SubscriptionHandle> {
        let mut slot = self.handle.lock();

        if let Some(handle) = slot.as_ref() {
            debug!("Already subscribed as {}", handle.registration);
            return Ok(handle.clone());
        }

        self.normalizer.attach();
        let handler: Arc<dyn NotificationHandler> = self.normalizer.clone();
        match self.sdk.register_callbacks(handler, &self.tag) {
            Ok(registration) => {
                info!("Subscribed to SDK callbacks as {} ({})", registration, self.tag);
                let handle = SubscriptionHandle {
                    registration,
                    tag: self.tag.clone(),
                };
                *slot = Some(handle.clone());
                Ok(handle)
            }
            Err(e) => {
                self.normalizer.detach();
                Err(Error::sdk("registerCallbacks", e))
            }
        }
    }

    /// Detach the normalizer from the SDK.
    ///
    /// A no-op when not subscribed. Returns whether a registration was
    /// removed.
    pub fn unsubscribe(&self) -> bool {
        let mut slot = self.handle.lock();

        let Some(handle) = slot.take() else {
            debug!("Not subscribed, nothing to remove");
            return false;
        };

        self.normalizer.detach();
        self.sdk.deregister_callbacks(handle.registration);
        info!("Unsubscribed from SDK callbacks {}", handle.registration);
        true
    }

    /// The active handle, if subscribed.
    pub fn current(&self) -> Option<SubscriptionHandle> {
        self.handle.lock().clone()
    }

    /// Check if subscribed.
    pub fn is_subscribed(&self) -> bool {
        self.handle.lock().is_some()
    }
}

impl Drop for SubscriptionManager {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
