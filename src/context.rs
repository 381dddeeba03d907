//! Explicit AWS configuration, loaded once per run and passed to clients.

use aws_credential_types::provider::ProvideCredentials;

use crate::error::VerifyError;

#[derive(Debug, Clone)]
pub struct AwsContext {
    config: aws_config::SdkConfig,
}

impl AwsContext {
    /// Load ambient configuration and resolve credentials eagerly.
    ///
    /// `region` and `profile` override what the environment provides.
    pub async fn load(region: Option<&str>, profile: Option<&str>) -> Result<Self, VerifyError> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region.to_string()));
        }
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        if config.region().is_none() {
            return Err(VerifyError::setup(
                "no AWS region configured (set AWS_REGION or pass --region)",
            ));
        }

        let provider = config
            .credentials_provider()
            .ok_or_else(|| VerifyError::setup("no AWS credentials provider configured"))?;
        provider
            .provide_credentials()
            .await
            .map_err(|e| VerifyError::setup(format!("unable to load AWS credentials: {}", e)))?;

        tracing::debug!(
            region = config.region().map(|r| r.as_ref()).unwrap_or_default(),
            "loaded AWS config"
        );

        Ok(Self { config })
    }

    pub fn sdk_config(&self) -> &aws_config::SdkConfig {
        &self.config
    }

    pub fn region(&self) -> Option<&str> {
        self.config.region().map(|r| r.as_ref())
    }
}
