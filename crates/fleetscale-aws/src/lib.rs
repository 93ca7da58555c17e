//! fleetscale-aws: the AWS implementation of the engine's provider boundary.
//!
//! Credentials are obtained per region by assuming the configured role via
//! STS. The resulting [`AwsSession`] carries one client per service, all
//! bound to those temporary credentials, and is handed back unchanged to
//! every scaling call made in that region.

pub mod provider;
pub mod session;

pub use provider::AwsProvider;
pub use session::AwsSession;
