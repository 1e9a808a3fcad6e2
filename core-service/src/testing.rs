use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::sdk::{
    DataInput, Environment, HealthSdk, HealthSourceConfig, PermissionOutcome, Provider, Resource,
    StatusStream, WritableResource,
};
use chrono::{DateTime, Utc};
use mockall::mock;
use uuid::Uuid;

mock! {
    pub Sdk {}

    #[async_trait]
    impl HealthSdk for Sdk {
        async fn configure_client(&self, api_key: &str, environment: Environment);
        async fn configure_health_source(&self, config: HealthSourceConfig);
        async fn set_user_id(&self, user_id: Uuid);
        async fn clean_up(&self);
        fn has_asked_for_permission(&self, resource: Resource) -> bool;
        async fn is_user_connected(&self, provider: Provider) -> Result<bool>;
        async fn ask(
            &self,
            read_resources: Vec<Resource>,
            write_resources: Vec<WritableResource>,
        ) -> PermissionOutcome;
        fn sync_data(&self, resources: Vec<Resource>);
        fn sync_all(&self);
        async fn write(
            &self,
            input: DataInput,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<()>;
        fn status(&self) -> Box<dyn StatusStream>;
    }
}
