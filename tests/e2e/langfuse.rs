//! Live Langfuse delivery

#[cfg(test)]
mod tests {
    use crate::common::RecordFactory;
    use crate::skip_without_env;
    use httpscope::config::{ENV_LANGFUSE_PUBLIC_KEY, LangfuseConfig};
    use httpscope::delivery::{DeliveryPipeline, DeliverySettings, EventBuilder};
    use httpscope::sink::{LangfuseClient, SinkClient};
    use httpscope::utils::RandomIdGenerator;
    use httpscope::ObserverConfig;
    use std::sync::Arc;

    fn client() -> LangfuseClient {
        let config = ObserverConfig::default().with_env_overrides();
        let langfuse: LangfuseConfig = config.langfuse.unwrap_or_default();
        LangfuseClient::new(&langfuse).unwrap()
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_health() {
        skip_without_env!(ENV_LANGFUSE_PUBLIC_KEY);

        let health = client().health().await.unwrap();
        assert!(health.is_ok());
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_delivery() {
        skip_without_env!(ENV_LANGFUSE_PUBLIC_KEY);

        let pipeline = DeliveryPipeline::new(
            Arc::new(client()),
            EventBuilder::new(Arc::new(RandomIdGenerator)),
            DeliverySettings::default(),
        );
        assert!(pipeline.deliver(&RecordFactory::double("5", "10")).await);
        assert!(pipeline.health().healthy);
    }
}
