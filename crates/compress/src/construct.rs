use crate::Compression;
use crate::error::{Error, ErrorKind};
use std::str::FromStr;

impl FromStr for Compression {
    type Err = Error;
    /// Parse an HTTP content-coding token (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "identity" | "none" => Ok(Compression::None),
            #[cfg(feature = "brotli")]
            "br" | "brotli" => Ok(Compression::Brotli),
            #[cfg(not(feature = "brotli"))]
            "br" | "brotli" => exn::bail!(ErrorKind::Unavailable(s.to_string())),
            "deflate" => Ok(Compression::Deflate),
            "gzip" | "x-gzip" => Ok(Compression::Gzip),
            #[cfg(feature = "zstd")]
            "zstd" => Ok(Compression::Zstd),
            #[cfg(not(feature = "zstd"))]
            "zstd" => exn::bail!(ErrorKind::Unavailable(s.to_string())),
            _ => exn::bail!(ErrorKind::Unknown(s.to_string())),
        }
    }
}

// Configuration files carry encodings as plain strings.
impl TryFrom<String> for Compression {
    type Error = ErrorKind;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse::<Compression>().map_err(|err| (*err).clone())
    }
}
impl From<Compression> for String {
    fn from(value: Compression) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::Compression;
    use crate::error::ErrorKind;
    use rstest::rstest;

    #[rstest]
    #[case("identity", Compression::None)]
    #[case("none", Compression::None)]
    #[case("gzip", Compression::Gzip)]
    #[case("GZIP", Compression::Gzip)]
    #[case("x-gzip", Compression::Gzip)]
    #[case(" deflate ", Compression::Deflate)]
    #[cfg_attr(feature = "brotli", case("br", Compression::Brotli))]
    #[cfg_attr(feature = "zstd", case("zstd", Compression::Zstd))]
    fn test_from_str(#[case] test: &str, #[case] expected: Compression) {
        assert_eq!(test.parse::<Compression>().unwrap(), expected);
    }

    #[rstest]
    #[case("compress")]
    #[case("definitely not valid")]
    #[case(" ")]
    fn test_from_str_invalid(#[case] test: &str) {
        let err = test.parse::<Compression>().unwrap_err();
        assert!(matches!(*err, ErrorKind::Unknown(_)));
    }

    #[cfg(not(feature = "brotli"))]
    #[test]
    fn test_from_str_disabled() {
        let err = "br".parse::<Compression>().unwrap_err();
        assert_eq!(*err, ErrorKind::Unavailable("br".to_string()));
    }

    #[test]
    fn test_string_conversions() {
        assert_eq!(Compression::try_from("gzip".to_string()), Ok(Compression::Gzip));
        assert!(Compression::try_from("lz4".to_string()).is_err());
        assert_eq!(String::from(Compression::Deflate), "deflate");
    }
}
