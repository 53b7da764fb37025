use std::sync::Arc;

use tracing::{instrument, warn};

use pawtale_core::{Mood, PetIdentity};
use pawtale_llm::ImageProvider;

/// Requests storybook illustrations for events. Nothing is cached and a
/// failed render only costs the event its picture.
#[derive(Clone)]
pub struct Illustrator {
    provider: Arc<dyn ImageProvider>,
}

impl Illustrator {
    pub fn new(provider: Arc<dyn ImageProvider>) -> Self {
        Self { provider }
    }

    pub fn image_prompt(identity: &PetIdentity, mood: Mood, description: &str) -> String {
        format!(
            "A warm, colorful children's storybook illustration of a {mood} {species} named {name}. \
             Scene: {description} No text in the image.",
            species = identity.species().display_name().to_lowercase(),
            name = identity.name(),
        )
    }

    pub async fn generate_image(
        &self,
        identity: &PetIdentity,
        mood: Mood,
        description: &str,
    ) -> Option<String> {
        self.render_image(&Self::image_prompt(identity, mood, description))
            .await
    }

    #[instrument(skip_all)]
    pub async fn render_image(&self, prompt: &str) -> Option<String> {
        match self.provider.render_image(prompt).await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(error = %e, kind = e.error_kind(), "illustration failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawtale_core::errors::GatewayError;
    use pawtale_core::Species;
    use pawtale_llm::{MockProvider, MockResponse};

    #[tokio::test]
    async fn returns_url_or_nothing() {
        let mock = Arc::new(MockProvider::new(vec![
            MockResponse::ImageUrl("https://img.example/1.png".into()),
            MockResponse::Error(GatewayError::Timeout(std::time::Duration::from_secs(1))),
        ]));
        let illustrator = Illustrator::new(mock.clone());
        let pip = PetIdentity::new("Pip", Species::Bird).unwrap();

        let url = illustrator
            .generate_image(&pip, Mood::Happy, "Pip soars over the hills.")
            .await;
        assert_eq!(url.as_deref(), Some("https://img.example/1.png"));
        assert!(mock.inputs()[0].contains("happy bird named Pip"));

        assert!(illustrator.render_image("again").await.is_none());
        assert_eq!(mock.call_count(), 2);
    }
}
