//! Recipe event publisher over a topic exchange.
//!
//! Each event kind gets its own channel, opened on first use. The
//! `recipe_events` exchange is declared on every new channel before the
//! first publish, so a kind that never fires never touches the broker.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::debug;

use crate::connections::BrokerDriver;
use crate::domain::ports::{EventPublishError, RecipeEventPublisher};
use crate::domain::{
    IngredientId, RECIPE_EVENTS_EXCHANGE, RecipeEvent, RecipeEventKind, RecipeId,
};
use crate::logging::Logger;

/// Publishes recipe events as JSON on the `recipe_events` topic exchange.
pub struct TopicEventPublisher<B: BrokerDriver> {
    driver: B,
    client: B::Client,
    logger: Logger,
    channels: Mutex<HashMap<RecipeEventKind, B::Channel>>,
}

impl<B: BrokerDriver> TopicEventPublisher<B> {
    /// Publisher over an already connected broker client.
    pub fn new(driver: B, client: B::Client, logger: Logger) -> Self {
        Self {
            driver,
            client,
            logger,
            channels: Mutex::new(HashMap::new()),
        }
    }

    async fn channel_for(&self, kind: RecipeEventKind) -> Result<B::Channel, EventPublishError> {
        let mut channels = self.channels.lock().await;
        if let Some(channel) = channels.get(&kind) {
            return Ok(channel.clone());
        }

        let channel = self
            .driver
            .open_channel(&self.client)
            .await
            .map_err(|err| EventPublishError::channel(err.message()))?;
        if let Err(err) = self
            .driver
            .declare_topic_exchange(&channel, RECIPE_EVENTS_EXCHANGE, false)
            .await
        {
            if let Err(close_err) = self.driver.close_channel(channel).await {
                self.logger.warn(
                    "Failed to close channel after exchange declaration failure",
                    Some(&json!({
                        "routingKey": kind.routing_key(),
                        "reason": close_err.message(),
                    })),
                );
            }
            return Err(EventPublishError::exchange(err.message()));
        }

        channels.insert(kind, channel.clone());
        debug!(routing_key = kind.routing_key(), "opened recipe event channel");
        Ok(channel)
    }

    async fn publish(&self, event: RecipeEvent) -> Result<(), EventPublishError> {
        let kind = event.kind();
        let channel = self.channel_for(kind).await?;
        self.driver
            .publish(
                &channel,
                RECIPE_EVENTS_EXCHANGE,
                kind.routing_key(),
                &event.payload(),
            )
            .await
            .map_err(|err| EventPublishError::publish(err.message()))?;
        self.logger.debug(
            "Published recipe event",
            Some(&json!({
                "routingKey": kind.routing_key(),
                "recipeId": event.recipe_id(),
            })),
        );
        Ok(())
    }
}

#[async_trait]
impl<B: BrokerDriver> RecipeEventPublisher for TopicEventPublisher<B> {
    async fn publish_recipe_created(&self, recipe_id: RecipeId) -> Result<(), EventPublishError> {
        self.publish(RecipeEvent::RecipeCreated { recipe_id }).await
    }

    async fn publish_recipe_updated(&self, recipe_id: RecipeId) -> Result<(), EventPublishError> {
        self.publish(RecipeEvent::RecipeUpdated { recipe_id }).await
    }

    async fn publish_ingredient_added(
        &self,
        recipe_id: RecipeId,
        ingredient_id: IngredientId,
    ) -> Result<(), EventPublishError> {
        self.publish(RecipeEvent::IngredientAdded {
            recipe_id,
            ingredient_id,
        })
        .await
    }

    async fn publish_ingredient_removed(
        &self,
        recipe_id: RecipeId,
        ingredient_id: IngredientId,
    ) -> Result<(), EventPublishError> {
        self.publish(RecipeEvent::IngredientRemoved {
            recipe_id,
            ingredient_id,
        })
        .await
    }
}
