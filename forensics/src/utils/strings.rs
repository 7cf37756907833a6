use super::encoding::base64_encode_standard;
use encoding_rs::EUC_KR;
use log::debug;

/// Decode bytes trying UTF-8 (with or without signature), EUC-KR, then UTF-16 LE and BE. First success wins
pub(crate) fn decode_text(data: &[u8]) -> Option<String> {
    if let Ok(result) = std::str::from_utf8(data) {
        return Some(result.trim_start_matches('\u{feff}').to_string());
    }

    if let Some(result) = EUC_KR.decode_without_bom_handling_and_without_replacement(data) {
        return Some(result.into_owned());
    }

    for little_endian in [true, false] {
        if let Some(result) = utf16_string(data, little_endian) {
            return Some(result.trim_start_matches('\u{feff}').to_string());
        }
    }

    debug!("[strings] Could not decode {} bytes with any supported encoding", data.len());
    None
}

/// Best effort text. Falls back to lossy UTF-8 when no encoding fits
pub(crate) fn lossy_text(data: &[u8]) -> String {
    match decode_text(data) {
        Some(result) => result,
        None => String::from_utf8_lossy(data).into_owned(),
    }
}

fn utf16_string(data: &[u8], little_endian: bool) -> Option<String> {
    let min_byte_size = 2;
    if data.len() % min_byte_size != 0 {
        return None;
    }

    let wide_chars: Vec<u16> = data
        .chunks(min_byte_size)
        .map(|pair| {
            if little_endian {
                u16::from_le_bytes([pair[0], pair[1]])
            } else {
                u16::from_be_bytes([pair[0], pair[1]])
            }
        })
        .collect();

    String::from_utf16(&wide_chars).ok()
}

/// Short preview of file content for diagnostics. Binary data is base64 encoded
pub(crate) fn content_preview(data: &[u8], limit: usize) -> String {
    match decode_text(data) {
        Some(text) if !text.contains('\0') => text.chars().take(limit).collect(),
        _ => base64_encode_standard(&data[..data.len().min(limit)]),
    }
}

/// Slice of `text` around a byte span, widened by `padding` bytes and snapped to char boundaries
pub(crate) fn context_window(text: &str, start: usize, end: usize, padding: usize) -> String {
    let mut begin = start.saturating_sub(padding);
    while begin > 0 && !text.is_char_boundary(begin) {
        begin -= 1;
    }
    let mut finish = (end + padding).min(text.len());
    while finish < text.len() && !text.is_char_boundary(finish) {
        finish += 1;
    }
    text[begin..finish].to_string()
}
