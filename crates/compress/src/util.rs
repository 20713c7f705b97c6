use crate::Compression;
use std::fmt::{Display, Formatter, Result as FmtResult};

impl Display for Compression {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for Compression {
    fn as_ref(&self) -> &'static str {
        self.as_str()
    }
}

impl Compression {
    /// Every encoding compiled into this build, identity first.
    pub const ALL: &'static [Compression] = &[
        Compression::None,
        #[cfg(feature = "brotli")]
        Compression::Brotli,
        Compression::Deflate,
        Compression::Gzip,
        #[cfg(feature = "zstd")]
        Compression::Zstd,
    ];

    /// Returns the HTTP content-coding token for this format.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::None => "identity",
            #[cfg(feature = "brotli")]
            Compression::Brotli => "br",
            Compression::Deflate => "deflate",
            Compression::Gzip => "gzip",
            #[cfg(feature = "zstd")]
            Compression::Zstd => "zstd",
        }
    }

    /// Value for a `Content-Encoding` header, if one should be sent at all.
    ///
    /// Identity is never labelled explicitly.
    #[inline]
    #[must_use]
    pub fn content_encoding(&self) -> Option<&'static str> {
        match self {
            Compression::None => None,
            other => Some(other.as_str()),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        matches!(self, Compression::None)
    }
}

#[cfg(test)]
mod tests {
    use crate::Compression;
    use rstest::rstest;

    #[rstest]
    #[case(Compression::None, None)]
    #[case(Compression::Deflate, Some("deflate"))]
    #[case(Compression::Gzip, Some("gzip"))]
    #[cfg_attr(feature = "brotli", case(Compression::Brotli, Some("br")))]
    #[cfg_attr(feature = "zstd", case(Compression::Zstd, Some("zstd")))]
    fn test_content_encoding(#[case] format: Compression, #[case] expected: Option<&str>) {
        assert_eq!(format.content_encoding(), expected);
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for format in Compression::ALL {
            assert_eq!(format.to_string().parse::<Compression>().unwrap(), *format);
        }
    }
}
