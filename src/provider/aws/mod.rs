//! # AWS Secrets Manager Client
//!
//! Client for reading secrets from AWS Secrets Manager.
//!
//! This module provides functionality to:
//! - Retrieve the `AWSCURRENT` value of a secret (string or binary)
//! - Assume an IAM role on top of the default credential chain
//! - Delegate retries to the SDK's standard retry mode

use crate::config::AwsConfig;
use crate::constants::AWS_CURRENT_VERSION_STAGE;
use crate::provider::{SecretError, SecretProvider, SecretValue};
use anyhow::{bail, Result};
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::sts::AssumeRoleProvider;
use aws_config::{BehaviorVersion, ConfigLoader, Region, SdkConfig};
use aws_sdk_secretsmanager::config::http::HttpResponse;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueError;
use aws_sdk_secretsmanager::Client as SecretsManagerClient;
use std::time::Instant;
use tracing::{debug, info, Instrument};

const PROVIDER: &str = "aws";

/// Session name reported to STS when assuming a role
const ASSUME_ROLE_SESSION_NAME: &str = "cloud-secrets";

/// AWS Secrets Manager provider implementation
pub struct AwsSecretsManager {
    client: SecretsManagerClient,
    region: String,
}

impl std::fmt::Debug for AwsSecretsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsSecretsManager")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl AwsSecretsManager {
    /// Create a new AWS Secrets Manager client
    ///
    /// Credentials come from the default chain (environment, profile, web identity,
    /// IMDS). When `assume_role` is set, those credentials are used to assume the role.
    ///
    /// # Errors
    /// Returns an error if no credentials provider can be configured.
    pub async fn new(config: &AwsConfig) -> Result<Self> {
        let base_config = Self::loader(config).load().await;

        let sdk_config = match &config.assume_role {
            Some(role_arn) => {
                info!(role_arn = %role_arn, "Assuming AWS role");
                let role_provider = AssumeRoleProvider::builder(role_arn.clone())
                    .session_name(ASSUME_ROLE_SESSION_NAME)
                    .configure(&base_config)
                    .build()
                    .await;
                Self::loader(config)
                    .credentials_provider(role_provider)
                    .load()
                    .await
            }
            None => base_config,
        };

        Self::from_sdk_config(&sdk_config)
    }

    /// Wrap an already loaded SDK configuration
    ///
    /// # Errors
    /// Returns an error if the configuration has no region or no credentials provider.
    pub fn from_sdk_config(sdk_config: &SdkConfig) -> Result<Self> {
        let Some(region) = sdk_config.region() else {
            bail!("AWS configuration has no region");
        };
        if sdk_config.credentials_provider().is_none() {
            bail!("No AWS credentials provider available; configure credentials or an IAM role");
        }

        let region = region.to_string();
        info!(region = %region, "AWS Secrets Manager provider initialized");

        Ok(Self {
            client: SecretsManagerClient::new(sdk_config),
            region,
        })
    }

    /// Wrap a preconfigured client, e.g. one pointed at a local endpoint
    #[must_use]
    pub fn from_client(client: SecretsManagerClient) -> Self {
        let region = client
            .config()
            .region()
            .map_or_else(|| "unknown".to_string(), ToString::to_string);
        Self { client, region }
    }

    fn loader(config: &AwsConfig) -> ConfigLoader {
        // The SDK counts the first attempt, the flag counts retries
        let retry_config =
            RetryConfig::standard().with_max_attempts(config.api_retries.saturating_add(1));

        let loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .retry_config(retry_config);

        match &config.endpoint_url {
            Some(endpoint) => loader.endpoint_url(endpoint.clone()),
            None => loader,
        }
    }
}

#[async_trait]
impl SecretProvider for AwsSecretsManager {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    async fn get_secret(&self, secret_name: &str) -> Result<SecretValue, SecretError> {
        let span = tracing::debug_span!(
            "aws.secret.get",
            secret.name = secret_name,
            region = %self.region
        );
        let start = Instant::now();

        async move {
            let output = self
                .client
                .get_secret_value()
                .secret_id(secret_name)
                .version_stage(AWS_CURRENT_VERSION_STAGE)
                .send()
                .await
                .map_err(|e| map_sdk_error(secret_name, e))?;

            debug!(
                version_id = output.version_id().unwrap_or("unknown"),
                duration_ms = start.elapsed().as_millis(),
                "Retrieved AWS secret"
            );

            // Depending on how the secret was stored, exactly one of these is populated
            if let Some(value) = output.secret_string() {
                Ok(SecretValue::text(value.to_string()))
            } else if let Some(blob) = output.secret_binary() {
                Ok(SecretValue::binary(blob.as_ref().to_vec()))
            } else {
                Err(SecretError::Decode {
                    provider: PROVIDER,
                    name: secret_name.to_string(),
                    message: "secret has neither SecretString nor SecretBinary".to_string(),
                })
            }
        }
        .instrument(span)
        .await
    }
}

fn map_sdk_error(
    secret_name: &str,
    error: SdkError<GetSecretValueError, HttpResponse>,
) -> SecretError {
    let message = DisplayErrorContext(&error).to_string();
    match error {
        SdkError::ServiceError(context) => map_service_error(secret_name, context.into_err()),
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            SecretError::Transport {
                provider: PROVIDER,
                message,
            }
        }
        SdkError::ConstructionFailure(_) => SecretError::InvalidRequest {
            provider: PROVIDER,
            message,
        },
        _ => SecretError::Unexpected {
            provider: PROVIDER,
            message,
        },
    }
}

fn map_service_error(secret_name: &str, error: GetSecretValueError) -> SecretError {
    let message = error.to_string();
    match &error {
        // Secrets Manager can't find the secret or the AWSCURRENT version
        GetSecretValueError::ResourceNotFoundException(_) => SecretError::NotFound {
            provider: PROVIDER,
            name: secret_name.to_string(),
            message,
        },
        // The protected secret text can't be decrypted with the KMS key
        GetSecretValueError::DecryptionFailure(_) => SecretError::DecryptionFailure {
            provider: PROVIDER,
            name: secret_name.to_string(),
            message,
        },
        GetSecretValueError::InternalServiceError(_) => SecretError::InternalService {
            provider: PROVIDER,
            message,
        },
        GetSecretValueError::InvalidParameterException(_) => SecretError::InvalidParameter {
            provider: PROVIDER,
            message,
        },
        // Parameter value not valid for the current state of the resource
        GetSecretValueError::InvalidRequestException(_) => SecretError::InvalidRequest {
            provider: PROVIDER,
            message,
        },
        _ => match error.code() {
            Some(
                "AccessDeniedException"
                | "UnrecognizedClientException"
                | "InvalidSignatureException"
                | "ExpiredTokenException",
            ) => SecretError::PermissionDenied {
                provider: PROVIDER,
                message,
            },
            _ => SecretError::Unexpected {
                provider: PROVIDER,
                message,
            },
        },
    }
}
