/// Make a label safe to use as a file name prefix
pub fn sanitize_filename(label: &str) -> String {
    let mut name = label.replace(
        ['/', '\\', ':', '?', '&', '=', '#', '%', '*', '"', '<', '>', '|'],
        "_",
    );
    name = name.trim().to_string();

    // Limit filename length
    if name.chars().count() > 100 {
        name.chars().take(100).collect()
    } else {
        name
    }
}

/// Name for the resource at `index`: `${label}-${index}`
pub fn indexed_name(label: &str, index: usize) -> String {
    format!("{}-{}", label, index)
}

/// File extension for an image content type, if it is one we recognise
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/bmp" => Some("bmp"),
        "image/svg+xml" => Some("svg"),
        "image/x-icon" | "image/vnd.microsoft.icon" => Some("ico"),
        "image/webp" => Some("webp"),
        "image/avif" => Some("avif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_name() {
        assert_eq!(indexed_name("Cats", 0), "Cats-0");
        assert_eq!(indexed_name("Cats", 12), "Cats-12");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a/b:c"), "a_b_c");
        assert_eq!(sanitize_filename("Cats"), "Cats");
        assert_eq!(sanitize_filename(&"x".repeat(150)).len(), 100);
    }

    #[test]
    fn test_extension_for_content_type() {
        assert_eq!(extension_for_content_type("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for_content_type("image/PNG; charset=binary"), Some("png"));
        assert_eq!(extension_for_content_type("text/html"), None);
        assert_eq!(extension_for_content_type(""), None);
    }
}
