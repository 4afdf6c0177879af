//! Binary-safe `multipart/form-data` decoding.
//!
//! The upload endpoint needs exactly one thing from a form body: the part
//! submitted under the `file` field, with its filename, declared content
//! type and raw bytes. Parsing works on byte slices throughout so binary
//! payloads survive intact.

use hyper::body::Bytes;

use crate::constants::UPLOAD_FIELD;
use crate::error::PicstashError;

/// File part extracted from an upload form.
#[derive(Debug, Clone)]
pub struct FormFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

struct Disposition {
    name: Option<String>,
    file_name: Option<String>,
}

struct Part<'a> {
    disposition: Disposition,
    content_type: Option<String>,
    content: &'a [u8],
}

/// Locate `needle` in `haystack` starting at `from`.
fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

/// Extract the boundary parameter from a `Content-Type` header value.
fn boundary_from(content_type: &str) -> Result<String, PicstashError> {
    let mut segments = content_type.split(';');
    let kind = segments.next().unwrap_or_default().trim();
    if !kind.eq_ignore_ascii_case("multipart/form-data") {
        return Err(PicstashError::MultipartDecode(format!(
            "unexpected content type '{}'",
            kind
        )));
    }

    for segment in segments {
        if let Some((name, value)) = segment.split_once('=') {
            if name.trim().eq_ignore_ascii_case("boundary") {
                let value = value.trim().trim_matches('"');
                if !value.is_empty() {
                    return Ok(value.to_string());
                }
            }
        }
    }

    Err(PicstashError::MultipartDecode(
        "missing multipart boundary".to_string(),
    ))
}

fn parse_disposition(value: &str) -> Disposition {
    let mut disposition = Disposition {
        name: None,
        file_name: None,
    };
    for segment in value.split(';') {
        if let Some((param, raw)) = segment.split_once('=') {
            let raw = raw.trim().trim_matches('"').to_string();
            match param.trim().to_ascii_lowercase().as_str() {
                "name" => disposition.name = Some(raw),
                "filename" => disposition.file_name = Some(raw),
                _ => {}
            }
        }
    }
    disposition
}

/// Split one between-boundaries segment into headers and content.
fn parse_part(raw: &[u8]) -> Option<Part<'_>> {
    let raw = raw.strip_prefix(b"\r\n").unwrap_or(raw);
    let header_end = find(raw, b"\r\n\r\n", 0)?;

    // Part headers are ASCII; the content after them is arbitrary bytes.
    let headers = std::str::from_utf8(&raw[..header_end]).ok()?;
    let body = &raw[header_end + 4..];
    let content = body.strip_suffix(b"\r\n").unwrap_or(body);

    let mut disposition = None;
    let mut content_type = None;
    for line in headers.split("\r\n") {
        if let Some((name, value)) = line.split_once(':') {
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-disposition") {
                disposition = Some(parse_disposition(value));
            } else if name.eq_ignore_ascii_case("content-type") {
                content_type = Some(value.to_string());
            }
        }
    }

    Some(Part {
        disposition: disposition?,
        content_type,
        content,
    })
}

/// Find the `file` field in a form body.
///
/// Returns `Ok(None)` when the form decodes but carries no usable file —
/// including when the field holds a plain text value rather than a file
/// part. Undecodable bodies are errors and surface the detail.
pub fn extract_file(
    content_type: &str,
    body: &Bytes,
) -> Result<Option<FormFile>, PicstashError> {
    let boundary = boundary_from(content_type)?;
    let delimiter = format!("--{}", boundary);
    let delimiter = delimiter.as_bytes();
    let data = body.as_ref();

    let mut marks = Vec::new();
    let mut at = 0;
    while let Some(pos) = find(data, delimiter, at) {
        marks.push(pos);
        at = pos + delimiter.len();
    }
    if marks.is_empty() {
        return Err(PicstashError::MultipartDecode(
            "boundary not found in body".to_string(),
        ));
    }

    for pair in marks.windows(2) {
        let raw = &data[pair[0] + delimiter.len()..pair[1]];
        if raw.starts_with(b"--") {
            // everything past the closing delimiter is epilogue
            break;
        }

        let Some(part) = parse_part(raw) else {
            continue;
        };
        if part.disposition.name.as_deref() != Some(UPLOAD_FIELD) {
            continue;
        }

        // A text field named `file` does not satisfy the upload contract;
        // only a part carrying a filename counts.
        return Ok(part.disposition.file_name.map(|file_name| FormFile {
            file_name,
            content_type: part.content_type,
            bytes: Bytes::copy_from_slice(part.content),
        }));
    }

    Ok(None)
}
