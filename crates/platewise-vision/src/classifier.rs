//! Vision classifier: a backend behind the credential gateway

use crate::gateway::{GatewayError, KeyRotationGateway};
use crate::{VisionBackend, VisionRequest};
use std::sync::Arc;
use tracing::debug;

/// Single logical "call the classifier" operation
///
/// Combines a [`VisionBackend`] with a shared [`KeyRotationGateway`]. Cloning
/// is cheap and clones share cooldown state.
#[derive(Clone)]
pub struct VisionClassifier {
    backend: Arc<dyn VisionBackend>,
    gateway: Arc<KeyRotationGateway>,
}

impl VisionClassifier {
    /// Create a classifier
    pub fn new(backend: Arc<dyn VisionBackend>, gateway: Arc<KeyRotationGateway>) -> Self {
        Self { backend, gateway }
    }

    /// Backend name
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// The gateway, for status reporting
    pub fn gateway(&self) -> &Arc<KeyRotationGateway> {
        &self.gateway
    }

    /// Classify an image, returning the model's raw text
    pub async fn classify(&self, request: &VisionRequest) -> Result<String, GatewayError> {
        let backend = self.backend.as_ref();
        debug!(backend = backend.name(), "Classifying image");

        self.gateway
            .invoke(|api_key| async move { backend.generate(&api_key, request).await })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CredentialPool, MockBackend, MockOutcome};

    #[tokio::test]
    async fn test_classify_fails_over_to_next_key() {
        let mut backend = MockBackend::new("ok");
        backend.add_outcome("key-one-1111", MockOutcome::Quota);
        let gateway = Arc::new(KeyRotationGateway::new(CredentialPool::new([
            "key-one-1111",
            "key-two-2222",
        ])));
        let classifier = VisionClassifier::new(Arc::new(backend.clone()), gateway.clone());

        let request = VisionRequest::new("p", vec![1], "image/png");
        assert_eq!(classifier.classify(&request).await.unwrap(), "ok");
        assert_eq!(backend.keys_used(), vec!["key-one-1111", "key-two-2222"]);
        assert!(gateway.cooldown_until(0).is_some());
        assert_eq!(classifier.backend_name(), "mock");
    }
}
