pub mod config;
pub mod error;
pub mod events;
pub mod navigation;
pub mod scan;
pub mod session;
pub mod timers;
pub mod processing {
    pub mod layout;
}
pub mod render {
    pub mod compositor;
    pub mod loader;
}
pub mod tasks {
    pub mod viewer;
    pub mod watcher;
}
