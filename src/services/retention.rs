use rusqlite::{params, Connection, OptionalExtension, Transaction};
use tracing::{debug, warn};

use crate::db::{clip_table, DbError};
use crate::models::ContentType;

/// Trims `kind`'s table so one more row fits under `limit`.
///
/// Keeps the newest `limit - 1` rows plus any row sharing the oldest kept
/// row's timestamp. With `limit` at 1 (or below) the table is emptied
/// outright, so rows sharing a timestamp are not spared. Failures roll back to a savepoint and return `false`;
/// callers insert regardless.
pub fn enforce_capacity(tx: &mut Transaction<'_>, kind: ContentType, limit: i64) -> bool {
    let limit = limit.max(1);
    let outcome = tx.savepoint().map_err(DbError::from).and_then(|savepoint| {
        let evicted = trim_oldest(&savepoint, kind, limit)?;
        savepoint.commit()?;
        Ok(evicted)
    });

    match outcome {
        Ok(0) => true,
        Ok(evicted) => {
            debug!(kind = kind.as_str(), evicted, limit, "evicted clips over capacity");
            true
        }
        Err(err) => {
            warn!(kind = kind.as_str(), limit, "retention check failed: {err}");
            false
        }
    }
}

fn trim_oldest(conn: &Connection, kind: ContentType, limit: i64) -> Result<usize, DbError> {
    let table = clip_table(kind);
    let keep = limit - 1;
    if keep == 0 {
        return Ok(conn.execute(&format!("DELETE FROM {table}"), [])?);
    }

    let cutoff: Option<i64> = conn
        .query_row(
            &format!(
                "SELECT date_created FROM {table} ORDER BY date_created DESC, id DESC LIMIT 1 OFFSET ?1"
            ),
            params![keep - 1],
            |row| row.get(0),
        )
        .optional()?;

    let Some(cutoff) = cutoff else {
        return Ok(0);
    };

    let evicted = conn.execute(
        &format!("DELETE FROM {table} WHERE date_created < ?1"),
        params![cutoff],
    )?;
    Ok(evicted)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::db::Database;
    use crate::models::{Clip, ImageFormat, TextFormat};

    fn at(second: i64) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(second)
    }

    fn text_at(value: &str, second: i64) -> Clip {
        Clip::text("Notepad", value, TextFormat::Text).with_date_created(at(second))
    }

    fn values(db: &Database) -> Vec<String> {
        db.list_clips(ContentType::Text)
            .expect("list")
            .into_iter()
            .filter_map(|clip| match clip.content {
                crate::models::ClipContent::Text { value, .. } => Some(value),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn keeps_the_most_recent_clips_up_to_capacity() {
        let db = Database::new_in_memory().expect("db init");
        for n in 0..12 {
            db.insert_clip(&text_at(&format!("clip-{n}"), n), 5).expect("insert");
            let expected = (n + 1).min(5) as usize;
            assert_eq!(values(&db).len(), expected, "after insert {n}");
        }
        assert_eq!(
            values(&db),
            vec!["clip-11", "clip-10", "clip-9", "clip-8", "clip-7"]
        );
    }

    #[test]
    fn rows_sharing_the_cutoff_timestamp_survive() {
        let db = Database::new_in_memory().expect("db init");
        db.insert_clip(&text_at("old", 0), 3).expect("insert old");
        db.insert_clip(&text_at("tie-a", 5), 3).expect("insert tie-a");
        db.insert_clip(&text_at("tie-b", 5), 3).expect("insert tie-b");

        db.insert_clip(&text_at("new", 9), 3).expect("insert new");
        assert_eq!(values(&db), vec!["new", "tie-b", "tie-a"]);

        db.insert_clip(&text_at("newer", 10), 3).expect("insert newer");
        let survivors = values(&db);
        assert_eq!(survivors.len(), 4);
        assert_eq!(survivors[0], "newer");
        assert!(survivors.contains(&"tie-a".to_string()));
        assert!(survivors.contains(&"tie-b".to_string()));
    }

    #[test]
    fn capacity_is_tracked_per_content_type() {
        let db = Database::new_in_memory().expect("db init");
        for n in 0..4 {
            db.insert_clip(&text_at(&format!("t{n}"), n), 2).expect("text");
            let image = Clip::image("Paint", vec![n as u8], ImageFormat::Png).with_date_created(at(n));
            db.insert_clip(&image, 2).expect("image");
        }
        db.insert_clip(&text_at("last", 99), 2).expect("text");
        assert_eq!(db.count_rows("clip_text").expect("count"), 2);
        assert_eq!(db.count_rows("clip_image").expect("count"), 2);
    }

    #[test]
    fn limit_of_one_replaces_the_previous_clip() {
        let db = Database::new_in_memory().expect("db init");
        db.insert_clip(&text_at("a", 0), 1).expect("a");
        db.insert_clip(&text_at("b", 0), 1).expect("b");
        assert_eq!(values(&db), vec!["b"]);
    }

    #[test]
    fn failed_eviction_does_not_block_insert() {
        let db = Database::new_in_memory().expect("db init");
        for n in 0..3 {
            db.insert_clip(&text_at(&format!("c{n}"), n), 3).expect("insert");
        }
        db.execute_batch(
            "CREATE TRIGGER block_delete BEFORE DELETE ON clip_text BEGIN SELECT RAISE(ABORT, 'locked'); END;",
        )
        .expect("trigger");

        let stored = db.insert_clip(&text_at("c3", 3), 3).expect("insert despite failure");
        assert!(stored.id > 0);
        assert_eq!(db.count_rows("clip_text").expect("count"), 4);
    }

    #[test]
    fn reports_failure_signal() {
        let db = Database::new_in_memory().expect("db init");
        db.insert_clip(&text_at("a", 0), 5).expect("a");
        db.insert_clip(&text_at("b", 1), 5).expect("b");
        db.execute_batch(
            "CREATE TRIGGER block_delete BEFORE DELETE ON clip_text BEGIN SELECT RAISE(ABORT, 'locked'); END;",
        )
        .expect("trigger");

        let outcome = db
            .unit_of_work(|tx| Ok(enforce_capacity(tx, ContentType::Text, 2)))
            .expect("unit of work");
        assert!(!outcome);
        let outcome = db
            .unit_of_work(|tx| Ok(enforce_capacity(tx, ContentType::Image, 2)))
            .expect("unit of work");
        assert!(outcome);
    }
}
