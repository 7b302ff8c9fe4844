mod aws;

pub use aws::AwsCloudProvider;
