mod app;
mod watcher;
