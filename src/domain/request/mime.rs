//! Supported media types, file-name lookup and magic-byte sniffing.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::ValidationError;

/// Alias some platforms report for `.ico` files.
pub const ICON_ALIAS: &str = "image/vnd.microsoft.icon";

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Extension → media type pairs accepted for inscription.
pub const SUPPORTED_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("ico", "image/x-icon"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("tiff", "image/tiff"),
    ("tif", "image/tiff"),
    ("svg", "image/svg+xml"),
    ("avif", "image/avif"),
    ("jxl", "image/jxl"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("avi", "video/x-msvideo"),
    ("mov", "video/quicktime"),
    ("mkv", "video/x-matroska"),
    ("m4v", "video/mp4"),
    ("mpg", "video/mpeg"),
    ("mpeg", "video/mpeg"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("oga", "audio/ogg"),
    ("flac", "audio/flac"),
    ("aac", "audio/aac"),
    ("m4a", "audio/mp4"),
    ("weba", "audio/webm"),
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("ppt", "application/vnd.ms-powerpoint"),
    (
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    ("rtf", "application/rtf"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("php", "application/x-httpd-php"),
    ("java", "text/x-java-source"),
    ("js", "application/javascript"),
    ("mjs", "application/javascript"),
    ("ts", "application/typescript"),
    ("typescript", "application/typescript"),
    ("jsx", "text/jsx"),
    ("tsx", "text/tsx"),
    ("py", "text/x-python"),
    ("rb", "text/x-ruby"),
    ("go", "text/x-go"),
    ("rs", "text/x-rust"),
    ("sql", "application/sql"),
    ("csv", "text/csv"),
    ("json", "application/json"),
    ("txt", "text/plain"),
    ("xml", "application/xml"),
    ("yaml", "application/yaml"),
    ("yml", "application/yaml"),
    ("toml", "application/toml"),
    ("md", "text/markdown"),
    ("markdown", "text/markdown"),
    ("ics", "text/calendar"),
    ("vcf", "text/vcard"),
    ("glb", "model/gltf-binary"),
    ("gltf", "model/gltf+json"),
    ("usdz", "model/vnd.usdz+zip"),
    ("obj", "model/obj"),
    ("stl", "model/stl"),
    ("fbx", "application/octet-stream"),
    ("zip", "application/zip"),
    ("rar", "application/vnd.rar"),
    ("tar", "application/x-tar"),
    ("gz", "application/gzip"),
    ("7z", "application/x-7z-compressed"),
    ("ttf", "font/ttf"),
    ("otf", "font/otf"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("eot", "application/vnd.ms-fontobject"),
    ("psd", "application/vnd.adobe.photoshop"),
    ("ai", "application/postscript"),
    ("eps", "application/postscript"),
    ("ps", "application/postscript"),
    ("sqlite", "application/x-sqlite3"),
    ("db", "application/x-sqlite3"),
    ("apk", "application/vnd.android.package-archive"),
    ("wasm", "application/wasm"),
];

pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    let extension = extension.to_ascii_lowercase();
    SUPPORTED_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

/// Resolve a media type from a file name's extension.
pub fn mime_from_file_name(file_name: &str) -> Result<&'static str, ValidationError> {
    let extension = match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext,
        _ => return Err(ValidationError::new("File must have an extension")),
    };
    mime_for_extension(extension)
        .ok_or_else(|| ValidationError::new(format!("Unsupported file type: {}", extension)))
}

pub fn normalize_mime_type(mime_type: &str) -> &str {
    if mime_type == ICON_ALIAS {
        "image/x-icon"
    } else {
        mime_type
    }
}

pub fn is_supported_mime(mime_type: &str) -> bool {
    let mime_type = normalize_mime_type(mime_type);
    SUPPORTED_TYPES.iter().any(|(_, mime)| *mime == mime_type)
}

/// Media type without parameters, e.g. `application/json; charset=utf-8` → `application/json`.
pub fn essence(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or("").trim()
}

/// Media type declared by a `data:<mime>;base64,` prefix.
pub fn data_uri_mime(payload: &str) -> Option<&str> {
    let rest = payload.strip_prefix("data:")?;
    let (mime, _) = rest.split_once(";base64,")?;
    if mime.is_empty() {
        None
    } else {
        Some(mime)
    }
}

/// Payload with any `data:...;base64,` prefix removed.
pub fn strip_data_uri(payload: &str) -> &str {
    if let Some(rest) = payload.strip_prefix("data:") {
        if let Some((_, data)) = rest.split_once(";base64,") {
            return data;
        }
    }
    payload
}

/// Decoded size estimate for a base64 payload (prefix excluded).
pub fn estimated_decoded_len(payload: &str) -> usize {
    let data = strip_data_uri(payload);
    (data.len() * 3).div_ceil(4)
}

pub fn decode_base64(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let sanitized: String = strip_data_uri(payload)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    STANDARD.decode(sanitized)
}

/// Media type carried by an inline payload itself: a data-URI prefix wins,
/// then magic bytes.
pub fn detect_inline_mime(payload: &str) -> Option<&str> {
    data_uri_mime(payload).or_else(|| {
        decode_base64(payload)
            .ok()
            .and_then(|bytes| sniff_mime(&bytes))
    })
}

/// Identify a media type from leading magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    let starts = |sig: &[u8]| bytes.starts_with(sig);
    let at = |offset: usize, sig: &[u8]| {
        bytes.len() >= offset + sig.len() && &bytes[offset..offset + sig.len()] == sig
    };

    if starts(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }
    if starts(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if starts(b"GIF87a") || starts(b"GIF89a") {
        return Some("image/gif");
    }
    if starts(b"RIFF") {
        if at(8, b"WEBP") {
            return Some("image/webp");
        }
        if at(8, b"WAVE") {
            return Some("audio/wav");
        }
        if at(8, b"AVI ") {
            return Some("video/x-msvideo");
        }
    }
    if at(4, b"ftyp") {
        return Some(match bytes.get(8..12) {
            Some(b"qt  ") => "video/quicktime",
            Some(b"heic") | Some(b"heix") | Some(b"hevc") => "image/heic",
            Some(b"mif1") | Some(b"msf1") | Some(b"heif") => "image/heif",
            Some(b"avif") | Some(b"avis") => "image/avif",
            Some(b"M4A ") => "audio/mp4",
            _ => "video/mp4",
        });
    }
    if starts(&[0x1A, 0x45, 0xDF, 0xA3]) {
        let head = &bytes[..bytes.len().min(64)];
        if head.windows(4).any(|w| w == b"webm") {
            return Some("video/webm");
        }
        return Some("video/x-matroska");
    }
    if starts(b"%PDF-") {
        return Some("application/pdf");
    }
    if starts(b"%!PS") {
        return Some("application/postscript");
    }
    if starts(&[b'P', b'K', 0x03, 0x04]) {
        return Some("application/zip");
    }
    if starts(&[0x1F, 0x8B]) {
        return Some("application/gzip");
    }
    if starts(&[b'7', b'z', 0xBC, 0xAF, 0x27, 0x1C]) {
        return Some("application/x-7z-compressed");
    }
    if starts(b"Rar!\x1A\x07") {
        return Some("application/vnd.rar");
    }
    if at(257, b"ustar") {
        return Some("application/x-tar");
    }
    if starts(&[0x00, 0x00, 0x01, 0x00]) {
        return Some("image/x-icon");
    }
    if starts(b"II*\0") || starts(b"MM\0*") {
        return Some("image/tiff");
    }
    if starts(&[0xFF, 0x0A]) || starts(&[0, 0, 0, 0x0C, b'J', b'X', b'L', b' ']) {
        return Some("image/jxl");
    }
    if starts(b"OggS") {
        return Some("audio/ogg");
    }
    if starts(b"fLaC") {
        return Some("audio/flac");
    }
    if starts(b"ID3") || starts(&[0xFF, 0xFB]) || starts(&[0xFF, 0xF3]) || starts(&[0xFF, 0xF2]) {
        return Some("audio/mpeg");
    }
    if starts(&[0xFF, 0xF1]) || starts(&[0xFF, 0xF9]) {
        return Some("audio/aac");
    }
    if starts(b"\0asm") {
        return Some("application/wasm");
    }
    if starts(b"glTF") {
        return Some("model/gltf-binary");
    }
    if starts(b"8BPS") {
        return Some("application/vnd.adobe.photoshop");
    }
    if starts(b"SQLite format 3\0") {
        return Some("application/x-sqlite3");
    }
    if starts(b"wOFF") {
        return Some("font/woff");
    }
    if starts(b"wOF2") {
        return Some("font/woff2");
    }
    if starts(b"OTTO") {
        return Some("font/otf");
    }
    if starts(&[0x00, 0x01, 0x00, 0x00, 0x00]) {
        return Some("font/ttf");
    }
    if starts(b"{\\rtf") {
        return Some("application/rtf");
    }
    if starts(b"<?xml") {
        return Some("application/xml");
    }
    if starts(b"BM") && bytes.len() > 14 {
        return Some("image/bmp");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_1X1: &str =
        "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mP8/x8AAwMCAO6nq3UAAAAASUVORK5CYII=";

    #[test]
    fn test_supported_table_size() {
        assert!(SUPPORTED_TYPES.len() >= 90);
    }

    #[test]
    fn test_mime_from_file_name() {
        assert_eq!(mime_from_file_name("art.PNG").unwrap(), "image/png");
        assert_eq!(mime_from_file_name("a.b.tar").unwrap(), "application/x-tar");
        assert_eq!(
            mime_from_file_name("noext").unwrap_err().message(),
            "File must have an extension"
        );
        assert_eq!(
            mime_from_file_name("virus.exe").unwrap_err().message(),
            "Unsupported file type: exe"
        );
    }

    #[test]
    fn test_icon_alias_is_normalized_and_accepted() {
        assert_eq!(normalize_mime_type(ICON_ALIAS), "image/x-icon");
        assert!(is_supported_mime(ICON_ALIAS));
        assert!(!is_supported_mime("application/x-msdownload"));
    }

    #[test]
    fn test_data_uri_helpers() {
        let payload = "data:image/png;base64,AAAA";
        assert_eq!(data_uri_mime(payload), Some("image/png"));
        assert_eq!(strip_data_uri(payload), "AAAA");
        assert_eq!(strip_data_uri("AAAA"), "AAAA");
        assert_eq!(data_uri_mime("AAAA"), None);
    }

    #[test]
    fn test_estimated_decoded_len() {
        assert_eq!(estimated_decoded_len("AAAA"), 3);
        assert_eq!(estimated_decoded_len("data:text/plain;base64,AAAAAA"), 5);
    }

    #[test]
    fn test_detect_inline_mime_sniffs_png() {
        assert_eq!(detect_inline_mime(PNG_1X1), Some("image/png"));
    }

    #[test]
    fn test_detect_inline_mime_prefers_data_uri() {
        let payload = format!("data:image/gif;base64,{}", PNG_1X1);
        assert_eq!(detect_inline_mime(&payload), Some("image/gif"));
    }

    #[test]
    fn test_detect_inline_mime_unknown_is_none() {
        assert_eq!(detect_inline_mime("aGVsbG8gd29ybGQ="), None);
        assert_eq!(detect_inline_mime("!!not base64!!"), None);
    }

    #[test]
    fn test_sniff_ftyp_brands() {
        let mut mp4 = vec![0, 0, 0, 0x18];
        mp4.extend_from_slice(b"ftypmp42");
        assert_eq!(sniff_mime(&mp4), Some("video/mp4"));

        let mut mov = vec![0, 0, 0, 0x14];
        mov.extend_from_slice(b"ftypqt  ");
        assert_eq!(sniff_mime(&mov), Some("video/quicktime"));
    }

    #[test]
    fn test_essence_strips_parameters() {
        assert_eq!(essence("application/json; charset=utf-8"), "application/json");
        assert_eq!(essence("text/plain"), "text/plain");
    }
}
