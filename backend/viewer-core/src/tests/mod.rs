mod activation;
mod config;
mod identity;
mod launcher;
mod port;
mod request_path;
