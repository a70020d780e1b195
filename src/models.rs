use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentType {
    Text,
    Image,
    File,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [ContentType::Text, ContentType::Image, ContentType::File];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Image => "image",
            ContentType::File => "file",
        }
    }
}

/// Clipboard text flavour the capture source read the value as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextFormat {
    Text,
    UnicodeText,
    Rtf,
    Html,
    CommaSeparatedValue,
    Xaml,
}

impl TextFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            TextFormat::Text => "text",
            TextFormat::UnicodeText => "unicode_text",
            TextFormat::Rtf => "rtf",
            TextFormat::Html => "html",
            TextFormat::CommaSeparatedValue => "csv",
            TextFormat::Xaml => "xaml",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageFormat {
    Bmp,
    Png,
    Jpeg,
    Gif,
    Tiff,
}

impl ImageFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageFormat::Bmp => "bmp",
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Tiff => "tiff",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown variant `{0}`")]
pub struct UnknownVariant(pub String);

impl FromStr for ContentType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownVariant(value.to_string()))
    }
}

impl FromStr for TextFormat {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "text" => Ok(TextFormat::Text),
            "unicode_text" => Ok(TextFormat::UnicodeText),
            "rtf" => Ok(TextFormat::Rtf),
            "html" => Ok(TextFormat::Html),
            "csv" => Ok(TextFormat::CommaSeparatedValue),
            "xaml" => Ok(TextFormat::Xaml),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl FromStr for ImageFormat {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "bmp" => Ok(ImageFormat::Bmp),
            "png" => Ok(ImageFormat::Png),
            "jpeg" => Ok(ImageFormat::Jpeg),
            "gif" => Ok(ImageFormat::Gif),
            "tiff" => Ok(ImageFormat::Tiff),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

fn text_column<T: FromStr<Err = UnknownVariant>>(value: ValueRef<'_>) -> FromSqlResult<T> {
    value
        .as_str()?
        .parse()
        .map_err(|err| FromSqlError::Other(Box::new(err)))
}

impl ToSql for ContentType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ContentType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        text_column(value)
    }
}

impl ToSql for TextFormat {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TextFormat {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        text_column(value)
    }
}

impl ToSql for ImageFormat {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ImageFormat {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        text_column(value)
    }
}

/// Payload of a captured clip. File values hold a JSON array of paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClipContent {
    #[serde(rename_all = "camelCase")]
    Text {
        value: String,
        source_text_format: TextFormat,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        value: Vec<u8>,
        format_type: ImageFormat,
    },
    File { value: String },
}

impl ClipContent {
    pub fn kind(&self) -> ContentType {
        match self {
            ClipContent::Text { .. } => ContentType::Text,
            ClipContent::Image { .. } => ContentType::Image,
            ClipContent::File { .. } => ContentType::File,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    /// Zero until the store assigns a row id.
    pub id: i64,
    pub application_name: String,
    pub date_created: DateTime<Utc>,
    pub content: ClipContent,
}

impl Clip {
    pub fn new(application_name: impl Into<String>, content: ClipContent) -> Self {
        Self {
            id: 0,
            application_name: application_name.into(),
            date_created: Utc::now(),
            content,
        }
    }

    pub fn text(
        application_name: impl Into<String>,
        value: impl Into<String>,
        source_text_format: TextFormat,
    ) -> Self {
        Self::new(
            application_name,
            ClipContent::Text {
                value: value.into(),
                source_text_format,
            },
        )
    }

    pub fn image(application_name: impl Into<String>, value: Vec<u8>, format_type: ImageFormat) -> Self {
        Self::new(application_name, ClipContent::Image { value, format_type })
    }

    pub fn file<S: AsRef<str>>(application_name: impl Into<String>, paths: &[S]) -> AppResult<Self> {
        let paths: Vec<&str> = paths.iter().map(AsRef::as_ref).collect();
        let value = serde_json::to_string(&paths).map_err(crate::db::DbError::from)?;
        Ok(Self::new(application_name, ClipContent::File { value }))
    }

    pub fn with_date_created(mut self, date_created: DateTime<Utc>) -> Self {
        self.date_created = date_created;
        self
    }

    pub fn kind(&self) -> ContentType {
        self.content.kind()
    }

    /// Paths of a file clip; `None` for text and image clips.
    pub fn file_paths(&self) -> Option<AppResult<Vec<String>>> {
        match &self.content {
            ClipContent::File { value } => Some(parse_path_list(value)),
            _ => None,
        }
    }
}

pub(crate) fn parse_path_list(value: &str) -> AppResult<Vec<String>> {
    serde_json::from_str(value)
        .map_err(|err| AppError::InvalidContent(format!("file clip is not a path list: {err}")))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: i64,
    pub content_type: ContentType,
    pub favorite_content_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FavoriteContent {
    Text { id: i64, value: String },
    #[serde(rename_all = "camelCase")]
    Image {
        id: i64,
        value: Vec<u8>,
        format_type: ImageFormat,
    },
    File { id: i64, value: String },
}

impl FavoriteContent {
    /// Copies a clip's payload into an unsaved content record.
    pub fn from_clip(clip: &Clip) -> AppResult<Self> {
        Ok(match &clip.content {
            ClipContent::Text { value, .. } => FavoriteContent::Text {
                id: 0,
                value: value.clone(),
            },
            ClipContent::Image { value, format_type } => FavoriteContent::Image {
                id: 0,
                value: value.clone(),
                format_type: *format_type,
            },
            ClipContent::File { value } => {
                let paths = parse_path_list(value)?;
                FavoriteContent::File {
                    id: 0,
                    value: serde_json::to_string(&paths).map_err(crate::db::DbError::from)?,
                }
            }
        })
    }

    pub fn id(&self) -> i64 {
        match self {
            FavoriteContent::Text { id, .. }
            | FavoriteContent::Image { id, .. }
            | FavoriteContent::File { id, .. } => *id,
        }
    }

    pub fn kind(&self) -> ContentType {
        match self {
            FavoriteContent::Text { .. } => ContentType::Text,
            FavoriteContent::Image { .. } => ContentType::Image,
            FavoriteContent::File { .. } => ContentType::File,
        }
    }

    pub(crate) fn with_id(mut self, new_id: i64) -> Self {
        match &mut self {
            FavoriteContent::Text { id, .. }
            | FavoriteContent::Image { id, .. }
            | FavoriteContent::File { id, .. } => *id = new_id,
        }
        self
    }
}

/// A favorite paired with its content; `content` is `None` when the content
/// row has gone missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteItem {
    pub favorite: Favorite,
    pub content: Option<FavoriteContent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blacklist {
    pub id: i64,
    pub application_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub application: String,
    pub total: i64,
    pub text: i64,
    pub image: i64,
    pub file: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastSnapshot {
    pub text: Option<Clip>,
    pub image: Option<Clip>,
    pub file: Option<Clip>,
}

/// Optional filters for bulk clear; both set means both must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipFilter {
    pub application_name: Option<String>,
    pub date_before: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCounts {
    pub text: usize,
    pub image: usize,
    pub file: usize,
}

impl MatchCounts {
    pub fn total(&self) -> usize {
        self.text + self.image + self.file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_format_names_the_bad_value() {
        let err = "webp".parse::<ImageFormat>().expect_err("not a stored format");
        assert_eq!(err, UnknownVariant("webp".to_string()));
        assert_eq!(err.to_string(), "unknown variant `webp`");
    }

    #[test]
    fn file_clip_round_trips_path_list() {
        let clip = Clip::file("Explorer", &["C:\\a.txt", "C:\\b dir\\c.png"]).expect("file clip");
        let paths = clip.file_paths().expect("file variant").expect("parse");
        assert_eq!(paths, vec!["C:\\a.txt".to_string(), "C:\\b dir\\c.png".to_string()]);
        assert!(Clip::text("Notepad", "x", TextFormat::Text).file_paths().is_none());
    }

    #[test]
    fn favorite_content_copies_image_bytes_and_format() {
        let clip = Clip::image("Paint", vec![1, 2, 3], ImageFormat::Png);
        let content = FavoriteContent::from_clip(&clip).expect("copy");
        assert_eq!(
            content,
            FavoriteContent::Image {
                id: 0,
                value: vec![1, 2, 3],
                format_type: ImageFormat::Png
            }
        );
        assert_eq!(content.kind(), ContentType::Image);
    }

    #[test]
    fn favorite_content_rejects_malformed_file_value() {
        let clip = Clip::new(
            "Explorer",
            ClipContent::File {
                value: "not json".to_string(),
            },
        );
        let err = FavoriteContent::from_clip(&clip).expect_err("malformed");
        assert!(matches!(err, AppError::InvalidContent(_)));
    }

    #[test]
    fn enum_names_parse_back() {
        for kind in ContentType::ALL {
            assert_eq!(kind.as_str().parse::<ContentType>(), Ok(kind));
        }
        assert_eq!("csv".parse::<TextFormat>(), Ok(TextFormat::CommaSeparatedValue));
        assert_eq!("jpeg".parse::<ImageFormat>(), Ok(ImageFormat::Jpeg));
        assert!("webp".parse::<ImageFormat>().is_err());
    }
}
