mod cli;
mod error;
mod host;
mod logger;
mod watcher;
