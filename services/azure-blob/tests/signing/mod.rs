mod sas_builder;
mod sas_token;
mod shared_key;
