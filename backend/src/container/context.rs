//! Process-wide application context with one-shot initialization.
//!
//! [`AppContext`] owns both containers. Each is built at most once: the
//! first successful initializer publishes its result and concurrent callers
//! await that same result. A failed initialization publishes nothing, so a
//! later call retries from scratch.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::OnceCell;

use super::{ConnectionsContainer, InitError, Infrastructure, ServicesContainer};
use crate::config::{ConfigValidationError, Configuration, EnvSource, Environment};
use crate::connections::{ConnectionError, NotInitializedError};
use crate::domain::ports::{RecipeEventPublisher, RecipeService, UserService};
use crate::domain::{RecipeServiceImpl, UserServiceImpl};
use crate::logging::Logger;
use crate::outbound::messaging::TopicEventPublisher;

/// Connections container type for an infrastructure.
pub type ConnectionsOf<I> =
    ConnectionsContainer<<I as Infrastructure>::Database, <I as Infrastructure>::Broker>;

/// Owns configuration sources, drivers, and the cached containers.
pub struct AppContext<I: Infrastructure, E: EnvSource> {
    env: E,
    infrastructure: I,
    configuration: OnceCell<(Arc<Configuration>, Logger)>,
    connections: OnceCell<Arc<ConnectionsOf<I>>>,
    services: OnceCell<Arc<ServicesContainer>>,
}

impl<I: Infrastructure, E: EnvSource> AppContext<I, E> {
    /// Uninitialized context.
    pub fn new(env: E, infrastructure: I) -> Self {
        Self {
            env,
            infrastructure,
            configuration: OnceCell::new(),
            connections: OnceCell::new(),
            services: OnceCell::new(),
        }
    }

    /// Infrastructure wiring in use.
    pub fn infrastructure(&self) -> &I {
        &self.infrastructure
    }

    /// Validate the environment and build the configuration and logger, once.
    ///
    /// Opens no connections, so callers can install logging before
    /// [`Self::init_services`] connects anything.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigValidationError`] listing every environment issue.
    pub async fn init_configuration(
        &self,
    ) -> Result<(Arc<Configuration>, Logger), ConfigValidationError> {
        self.configuration
            .get_or_try_init(|| async {
                let environment = Environment::load(&self.env)?;
                let config = Arc::new(Configuration::new(environment));
                let logger = Logger::from_config(&config);
                Ok((config, logger))
            })
            .await
            .cloned()
    }

    /// Connect the database and then the broker, once.
    ///
    /// Returns the cached container when already established.
    ///
    /// # Errors
    ///
    /// Propagates the first [`ConnectionError`]; nothing is cached on
    /// failure.
    pub async fn init_connections(
        &self,
        config: Arc<Configuration>,
        logger: Logger,
    ) -> Result<Arc<ConnectionsOf<I>>, ConnectionError> {
        self.connections
            .get_or_try_init(|| async move {
                ConnectionsContainer::establish(
                    self.infrastructure.database_driver(),
                    self.infrastructure.broker_driver(),
                    config,
                    logger,
                )
                .await
                .map(Arc::new)
            })
            .await
            .cloned()
    }

    /// Build configuration, logger, connections, and services, once.
    ///
    /// # Errors
    ///
    /// Returns [`InitError`] when the environment is invalid or a connection
    /// cannot be established.
    pub async fn init_services(&self) -> Result<Arc<ServicesContainer>, InitError> {
        self.services
            .get_or_try_init(|| self.build_services())
            .await
            .cloned()
    }

    async fn build_services(&self) -> Result<Arc<ServicesContainer>, InitError> {
        let (config, logger) = self.init_configuration().await?;

        let connections = self
            .init_connections(Arc::clone(&config), logger.clone())
            .await?;
        let database_client = connections.database().get_client()?;
        let broker_client = connections.broker().get_client()?;

        let user_repo = self.infrastructure.user_repository(&database_client);
        let recipe_repo = self.infrastructure.recipe_repository(&database_client);
        let publisher: Arc<dyn RecipeEventPublisher> = Arc::new(TopicEventPublisher::new(
            connections.broker().driver().clone(),
            broker_client,
            logger.clone(),
        ));

        let user_service: Arc<dyn UserService> = Arc::new(UserServiceImpl::new(user_repo));
        let recipe_service: Arc<dyn RecipeService> = Arc::new(RecipeServiceImpl::new(
            recipe_repo,
            publisher,
            logger.clone(),
        ));

        logger.info(
            "Services initialized",
            Some(&json!({ "validationSkipped": config.validation_skipped() })),
        );
        Ok(Arc::new(ServicesContainer::new(
            config,
            logger,
            user_service,
            recipe_service,
        )))
    }

    /// Initialized services.
    ///
    /// # Errors
    ///
    /// Returns [`NotInitializedError`] before [`Self::init_services`] has
    /// succeeded.
    pub fn services(&self) -> Result<Arc<ServicesContainer>, NotInitializedError> {
        self.services
            .get()
            .cloned()
            .ok_or(NotInitializedError::new("services container"))
    }

    /// Established connections.
    ///
    /// # Errors
    ///
    /// Returns [`NotInitializedError`] before connections were established.
    pub fn connections(&self) -> Result<Arc<ConnectionsOf<I>>, NotInitializedError> {
        self.connections
            .get()
            .cloned()
            .ok_or(NotInitializedError::new("connections container"))
    }

    /// Disconnect the broker and then the database.
    ///
    /// Best-effort: failures are logged by the connections and never
    /// returned. Safe to call when nothing was initialized.
    pub async fn shutdown(&self) {
        let Some(connections) = self.connections.get() else {
            return;
        };
        connections.broker().disconnect().await;
        connections.database().disconnect().await;
    }
}
