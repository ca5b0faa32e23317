mod authority;
pub use authority::Authority;

mod authority_config;
pub use authority_config::AuthorityConfig;
