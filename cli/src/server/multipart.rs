//! Just enough `multipart/form-data` to pull uploaded files out of a request body.

/// Errors produced while splitting a multipart body.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MultipartError {
    #[error("content type is not multipart/form-data")]
    NotMultipart,
    #[error("multipart content type has no boundary parameter")]
    MissingBoundary,
    #[error("multipart body does not end with a closing boundary")]
    MissingClosingBoundary,
    #[error("malformed multipart part: {0}")]
    MalformedPart(&'static str),
}

/// One part of a multipart body. The data borrows from the body it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part<'a> {
    pub name: Option<String>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: &'a [u8],
}

/// Extract the boundary from a `Content-Type` header value.
pub fn boundary(content_type: &str) -> Result<String, MultipartError> {
    let mut params = content_type.split(';');
    let mime = params.next().unwrap_or("").trim();
    if !mime.eq_ignore_ascii_case("multipart/form-data") {
        return Err(MultipartError::NotMultipart);
    }
    params
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| unquote(value.trim()).to_string())
        .filter(|boundary| !boundary.is_empty())
        .ok_or(MultipartError::MissingBoundary)
}

/// Split `body` into its parts. Anything before the first boundary is ignored, the closing
/// `--boundary--` is required.
pub fn parse<'a>(body: &'a [u8], boundary: &str) -> Result<Vec<Part<'a>>, MultipartError> {
    let delimiter = format!("--{boundary}");
    let delimiter = delimiter.as_bytes();
    let next_delimiter = [&b"\r\n"[..], delimiter].concat();

    let mut pos = find(body, delimiter).ok_or(MultipartError::MissingClosingBoundary)? + delimiter.len();
    let mut parts = Vec::new();
    loop {
        let rest = &body[pos..];
        if rest.starts_with(b"--") {
            return Ok(parts);
        }
        if !rest.starts_with(b"\r\n") {
            return Err(MultipartError::MalformedPart("boundary not followed by CRLF"));
        }
        pos += 2;

        let rest = &body[pos..];
        let (headers, data_start) = if rest.starts_with(b"\r\n") {
            ("", pos + 2)
        } else {
            let end = find(rest, b"\r\n\r\n")
                .ok_or(MultipartError::MalformedPart("part headers are not terminated"))?;
            let headers = std::str::from_utf8(&rest[..end])
                .map_err(|_| MultipartError::MalformedPart("part headers are not utf-8"))?;
            (headers, pos + end + 4)
        };

        let data_len = find(&body[data_start..], &next_delimiter)
            .ok_or(MultipartError::MissingClosingBoundary)?;
        let mut part = Part {
            name: None,
            filename: None,
            content_type: None,
            data: &body[data_start..data_start + data_len],
        };
        parse_part_headers(headers, &mut part)?;
        parts.push(part);

        pos = data_start + data_len + next_delimiter.len();
    }
}

/// The part named `file`, or failing that the first part that carries a filename.
pub fn find_file<'p, 'a>(parts: &'p [Part<'a>]) -> Option<&'p Part<'a>> {
    parts
        .iter()
        .find(|part| part.name.as_deref() == Some("file"))
        .or_else(|| parts.iter().find(|part| part.filename.is_some()))
}

fn parse_part_headers(headers: &str, part: &mut Part<'_>) -> Result<(), MultipartError> {
    for line in headers.split("\r\n") {
        let (name, value) = line
            .split_once(':')
            .ok_or(MultipartError::MalformedPart("part header without colon"))?;
        let name = name.trim();
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-disposition") {
            for param in value.split(';').skip(1) {
                let Some((key, value)) = param.split_once('=') else {
                    continue;
                };
                let value = unquote(value.trim()).to_string();
                match key.trim().to_ascii_lowercase().as_str() {
                    "name" => part.name = Some(value),
                    "filename" => part.filename = Some(value),
                    _ => {}
                }
            }
        } else if name.eq_ignore_ascii_case("content-type") {
            part.content_type = Some(value.to_string());
        }
    }
    Ok(())
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
