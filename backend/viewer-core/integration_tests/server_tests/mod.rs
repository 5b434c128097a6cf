mod endpoints;
mod has_changed;
mod lifecycle;
mod scenario;
