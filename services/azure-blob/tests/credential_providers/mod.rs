mod connection_string;
mod default;
mod env;
mod static_provider;
