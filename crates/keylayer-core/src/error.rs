#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("Hotkey key must not be empty")]
    EmptyKey,

    /// The options closure read its own hotkey before returning.
    #[error("Hotkey accessed while its options were still being built")]
    ReentrantBuild,

    #[error("Failed to build hotkey options: {0:#}")]
    Options(anyhow::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Hotkey action for '{key}' failed: {error:#}")]
    Action { key: String, error: anyhow::Error },
}
