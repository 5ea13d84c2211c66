mod env;
pub use env::EnvCredentialProvider;

mod static_provider;
pub use static_provider::StaticCredentialProvider;

mod connection_string;
pub use connection_string::ConnectionStringCredentialProvider;

mod default;
pub use default::DefaultCredentialProvider;
