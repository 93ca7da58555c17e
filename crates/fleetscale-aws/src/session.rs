//! Region-scoped sessions built from assumed-role credentials.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_sts::config::Credentials;
use aws_sdk_sts::error::DisplayErrorContext;
use tracing::{debug, info};

use fleetscale_core::AuthError;

/// Session name recorded in CloudTrail for every assumed role.
pub const SESSION_NAME: &str = "fleetscale";

/// Clients for one region, all bound to the same assumed-role credentials.
#[derive(Debug, Clone)]
pub struct AwsSession {
    pub region: String,
    pub autoscaling: aws_sdk_autoscaling::Client,
    pub kinesis: aws_sdk_kinesis::Client,
    pub elasticache: aws_sdk_elasticache::Client,
    pub application_autoscaling: aws_sdk_applicationautoscaling::Client,
}

impl AwsSession {
    pub fn from_config(region: &str, config: &SdkConfig) -> Self {
        Self {
            region: region.to_string(),
            autoscaling: aws_sdk_autoscaling::Client::new(config),
            kinesis: aws_sdk_kinesis::Client::new(config),
            elasticache: aws_sdk_elasticache::Client::new(config),
            application_autoscaling: aws_sdk_applicationautoscaling::Client::new(config),
        }
    }
}

/// Assume `role_arn` from the ambient credentials and build a session for `region`.
pub(crate) async fn assume_role(
    region: &str,
    role_arn: &str,
    endpoint_url: Option<&str>,
) -> Result<AwsSession, AuthError> {
    let base = loader(region, endpoint_url).load().await;
    let sts = aws_sdk_sts::Client::new(&base);

    debug!(%region, role = %role_arn, "assuming role");
    let output = sts
        .assume_role()
        .role_arn(role_arn)
        .role_session_name(SESSION_NAME)
        .send()
        .await
        .map_err(|err| AuthError::new(role_arn, DisplayErrorContext(&err).to_string()))?;

    let issued = output
        .credentials()
        .ok_or_else(|| AuthError::new(role_arn, "AssumeRole returned no credentials"))?;
    let credentials = Credentials::new(
        issued.access_key_id(),
        issued.secret_access_key(),
        Some(issued.session_token().to_string()),
        None,
        "AssumeRoleProvider",
    );

    let config = loader(region, endpoint_url)
        .credentials_provider(credentials)
        .load()
        .await;

    info!(%region, role = %role_arn, "assumed role");
    Ok(AwsSession::from_config(region, &config))
}

fn loader(region: &str, endpoint_url: Option<&str>) -> aws_config::ConfigLoader {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
    if let Some(endpoint) = endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }
    loader
}

