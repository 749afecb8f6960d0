use ammonia;

/// Clean user-supplied text using the ammonia library.
///
/// Whitelist-based sanitization: safe tags survive, dangerous tags
/// (<script>, <iframe>) and attributes (onclick) are stripped. Applied
/// to post text, comment contents and bios on write as a fail-safe
/// against stored XSS.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
