mod cloud_provider;

pub use cloud_provider::CloudProvider;
