use http::Version;

/// Parses an `HTTP/x.y` token, ignoring ASCII case.
pub fn parse_version(token: &[u8]) -> Option<Version> {
    const VERSIONS: [(&[u8], Version); 5] = [
        (b"HTTP/0.9", Version::HTTP_09),
        (b"HTTP/1.0", Version::HTTP_10),
        (b"HTTP/1.1", Version::HTTP_11),
        (b"HTTP/2.0", Version::HTTP_2),
        (b"HTTP/3.0", Version::HTTP_3),
    ];

    VERSIONS.iter().find(|(wire, _)| wire.eq_ignore_ascii_case(token)).map(|(_, version)| *version)
}

/// Returns the wire spelling of `version`.
pub fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/1.1",
    }
}
