pub const CREATE_CLIP_TEXT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS clip_text (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  value TEXT NOT NULL,
  application_name TEXT NOT NULL,
  date_created INTEGER NOT NULL,
  source_text_format TEXT NOT NULL
);
"#;

pub const CREATE_CLIP_IMAGE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS clip_image (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  value BLOB NOT NULL,
  value_hash TEXT NOT NULL,
  application_name TEXT NOT NULL,
  date_created INTEGER NOT NULL,
  format_type TEXT NOT NULL
);
"#;

pub const CREATE_CLIP_FILE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS clip_file (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  value TEXT NOT NULL,
  application_name TEXT NOT NULL,
  date_created INTEGER NOT NULL
);
"#;

pub const CREATE_FAVORITE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS favorite (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  content_type TEXT NOT NULL CHECK (content_type IN ('text', 'image', 'file')),
  favorite_content_id INTEGER NOT NULL
);
"#;

pub const CREATE_FAVORITE_CONTENT_TEXT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS favorite_content_text (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  value TEXT NOT NULL
);
"#;

pub const CREATE_FAVORITE_CONTENT_IMAGE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS favorite_content_image (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  value BLOB NOT NULL,
  format_type TEXT NOT NULL
);
"#;

pub const CREATE_FAVORITE_CONTENT_FILE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS favorite_content_file (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  value TEXT NOT NULL
);
"#;

pub const CREATE_BLACKLIST_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS blacklist (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  application_name TEXT NOT NULL
);
"#;

pub const CREATE_INDEX_TEXT_CREATED: &str =
    "CREATE INDEX IF NOT EXISTS idx_clip_text_created ON clip_text(date_created);";
pub const CREATE_INDEX_IMAGE_CREATED: &str =
    "CREATE INDEX IF NOT EXISTS idx_clip_image_created ON clip_image(date_created);";
pub const CREATE_INDEX_FILE_CREATED: &str =
    "CREATE INDEX IF NOT EXISTS idx_clip_file_created ON clip_file(date_created);";
pub const CREATE_INDEX_IMAGE_HASH: &str =
    "CREATE INDEX IF NOT EXISTS idx_clip_image_hash ON clip_image(value_hash);";

pub const ALL: [&str; 12] = [
    CREATE_CLIP_TEXT_TABLE,
    CREATE_CLIP_IMAGE_TABLE,
    CREATE_CLIP_FILE_TABLE,
    CREATE_FAVORITE_TABLE,
    CREATE_FAVORITE_CONTENT_TEXT_TABLE,
    CREATE_FAVORITE_CONTENT_IMAGE_TABLE,
    CREATE_FAVORITE_CONTENT_FILE_TABLE,
    CREATE_BLACKLIST_TABLE,
    CREATE_INDEX_TEXT_CREATED,
    CREATE_INDEX_IMAGE_CREATED,
    CREATE_INDEX_FILE_CREATED,
    CREATE_INDEX_IMAGE_HASH,
];
