pub mod providers;

pub use providers::AwsCloudProvider;
