mod app;
mod dom;
mod files;
mod render;
mod state;

pub use app::run;
