/// Put `text` on the system clipboard, returning the number of characters.
pub fn copy_text(text: &str) -> Result<usize, String> {
    let mut clipboard = arboard::Clipboard::new().map_err(|e| e.to_string())?;
    clipboard.set_text(text).map_err(|e| e.to_string())?;
    Ok(text.chars().count())
}
