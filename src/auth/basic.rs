//! Static credential check for `Authorization: Basic ...`.

/// Expected `Authorization` header value for basic mode.
#[derive(Debug, Clone)]
pub struct BasicCredential {
    expected: String,
}

impl BasicCredential {
    /// `credential` is the already base64-encoded `user:password` pair.
    pub fn new(credential: &str) -> Self {
        Self {
            expected: format!("Basic {credential}"),
        }
    }

    /// Byte-exact comparison; neither the scheme nor the payload is case-folded.
    pub fn matches(&self, header: &[u8]) -> bool {
        header == self.expected.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_header_matches() {
        let cred = BasicCredential::new("dXNlcjpwYXNz");
        assert!(cred.matches(b"Basic dXNlcjpwYXNz"));
    }

    #[test]
    fn comparison_is_byte_exact() {
        let cred = BasicCredential::new("dXNlcjpwYXNz");
        assert!(!cred.matches(b"basic dXNlcjpwYXNz"));
        assert!(!cred.matches(b"Basic dXNlcjpwYXNz "));
        assert!(!cred.matches(b"Basic  dXNlcjpwYXNz"));
        assert!(!cred.matches(b"Basic wrong"));
    }
}
