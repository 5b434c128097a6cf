mod activation;
mod connectivity;
mod error;
mod helpers;
mod server_tests;
