use super::{Database, DbError};
use crate::models::Summary;

const SUMMARY_QUERY: &str = "
    SELECT application, SUM(text) + SUM(image) + SUM(file) AS total, SUM(text), SUM(image), SUM(file)
    FROM (
        SELECT application_name AS application, COUNT(*) AS text, 0 AS image, 0 AS file
        FROM clip_text GROUP BY application_name
        UNION ALL
        SELECT application_name, 0, COUNT(*), 0 FROM clip_image GROUP BY application_name
        UNION ALL
        SELECT application_name, 0, 0, COUNT(*) FROM clip_file GROUP BY application_name
    )
    GROUP BY application
    ORDER BY total DESC, SUM(text) DESC, SUM(image) DESC, SUM(file) DESC, application ASC
";

impl Database {
    pub fn summary(&self) -> Result<Vec<Summary>, DbError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(SUMMARY_QUERY)?;
        let rows = stmt.query_map([], |row| {
            Ok(Summary {
                application: row.get(0)?,
                total: row.get(1)?,
                text: row.get(2)?,
                image: row.get(3)?,
                file: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Clip, ImageFormat, TextFormat};

    fn summary(application: &str, text: i64, image: i64, file: i64) -> Summary {
        Summary {
            application: application.to_string(),
            total: text + image + file,
            text,
            image,
            file,
        }
    }

    #[test]
    fn groups_counts_by_application() {
        let db = Database::new_in_memory().expect("db init");
        for value in ["a1", "a2", "a3"] {
            db.insert_clip(&Clip::text("A", value, TextFormat::Text), 30).expect("text");
        }
        db.insert_clip(&Clip::text("B", "b1", TextFormat::Text), 30).expect("text");
        db.insert_clip(&Clip::image("A", vec![1], ImageFormat::Png), 30).expect("image");

        assert_eq!(
            db.summary().expect("summary"),
            vec![summary("A", 3, 1, 0), summary("B", 1, 0, 0)]
        );
    }

    #[test]
    fn ties_break_on_text_then_image_then_file() {
        let db = Database::new_in_memory().expect("db init");
        db.insert_clip(&Clip::file("Files", &["/a"]).expect("file"), 30).expect("file");
        db.insert_clip(&Clip::image("Images", vec![1], ImageFormat::Png), 30).expect("image");
        db.insert_clip(&Clip::text("Texts", "t", TextFormat::Text), 30).expect("text");

        let order: Vec<String> = db
            .summary()
            .expect("summary")
            .into_iter()
            .map(|row| row.application)
            .collect();
        assert_eq!(order, vec!["Texts", "Images", "Files"]);
    }

    #[test]
    fn empty_store_has_no_rows() {
        let db = Database::new_in_memory().expect("db init");
        assert!(db.summary().expect("summary").is_empty());
    }
}
