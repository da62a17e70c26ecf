use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage provider tags
///
/// Closed set of backends the storage selector knows about. It's defined in
/// core because it's used in configuration. `S3` is reserved for a future
/// provider and currently resolves to the local filesystem driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Local,
    Remote,
    S3,
}

impl FromStr for StorageProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(StorageProvider::Local),
            "remote" | "supabase" => Ok(StorageProvider::Remote),
            "s3" => Ok(StorageProvider::S3),
            _ => Err(anyhow::anyhow!("Invalid storage provider: {}", s)),
        }
    }
}

impl Display for StorageProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageProvider::Local => write!(f, "local"),
            StorageProvider::Remote => write!(f, "remote"),
            StorageProvider::S3 => write!(f, "s3"),
        }
    }
}

/// Output format for transformed images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    WebP,
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn to_mime_type(self) -> &'static str {
        match self {
            OutputFormat::WebP => "image/webp",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::WebP => "webp",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "webp" => Ok(OutputFormat::WebP),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            _ => Err(anyhow::anyhow!("Invalid output format: {}", s)),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse() {
        let parse = |tag: &str| tag.parse::<StorageProvider>().unwrap();

        assert_eq!(parse("local"), StorageProvider::Local);
        assert_eq!(parse("REMOTE"), StorageProvider::Remote);
        assert_eq!(parse("supabase"), StorageProvider::Remote);
        assert_eq!(parse(" s3 "), StorageProvider::S3);
        assert!("gcs".parse::<StorageProvider>().is_err());
        assert!("".parse::<StorageProvider>().is_err());
    }

    #[test]
    fn test_provider_display_matches_parse() {
        for provider in [
            StorageProvider::Local,
            StorageProvider::Remote,
            StorageProvider::S3,
        ] {
            let parsed: StorageProvider = provider.to_string().parse().unwrap();
            assert_eq!(parsed, provider);
        }
    }

    #[test]
    fn test_output_format() {
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("WebP".parse::<OutputFormat>().unwrap(), OutputFormat::WebP);
        assert!("avif".parse::<OutputFormat>().is_err());

        assert_eq!(OutputFormat::default(), OutputFormat::WebP);
        assert_eq!(OutputFormat::WebP.to_mime_type(), "image/webp");
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::Png.to_mime_type(), "image/png");
    }
}
