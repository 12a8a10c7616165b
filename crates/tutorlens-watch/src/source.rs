/// Synchronous read access to the host document.
///
/// Implementations must not block for long: the gate calls this from the
/// event loop and nothing else runs until it returns.
pub trait PromptSource {
    /// Plain text of the most recent user-authored message, without markup.
    ///
    /// `None` means there is no such message yet, which is not an error.
    fn latest_user_text(&self) -> Option<String>;
}
