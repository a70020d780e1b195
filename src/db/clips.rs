use chrono::SubsecRound;
use rusqlite::{params, Connection, Row, ToSql};

use super::{clip_table, from_micros, to_micros, Database, DbError};
use crate::models::{Clip, ClipContent, ClipFilter, ContentType, LastSnapshot, MatchCounts};
use crate::services::retention::enforce_capacity;
use crate::utils::hash::image_value_hash;

const MATCH_FILTER: &str = "
    (?1 IS NULL OR application_name = ?1 COLLATE NOCASE)
    AND (?2 IS NULL OR date_created < ?2)
";

fn clip_columns(kind: ContentType) -> &'static str {
    match kind {
        ContentType::Text => "id, application_name, date_created, value, source_text_format",
        ContentType::Image => "id, application_name, date_created, value, format_type",
        ContentType::File => "id, application_name, date_created, value",
    }
}

fn clip_from_row(kind: ContentType, row: &Row<'_>) -> Result<Clip, rusqlite::Error> {
    let content = match kind {
        ContentType::Text => ClipContent::Text {
            value: row.get(3)?,
            source_text_format: row.get(4)?,
        },
        ContentType::Image => ClipContent::Image {
            value: row.get(3)?,
            format_type: row.get(4)?,
        },
        ContentType::File => ClipContent::File { value: row.get(3)? },
    };
    Ok(Clip {
        id: row.get(0)?,
        application_name: row.get(1)?,
        date_created: from_micros(2, row.get(2)?)?,
        content,
    })
}

fn query_clips(
    conn: &Connection,
    kind: ContentType,
    where_clause: &str,
    params: &[&dyn ToSql],
    limit: Option<i64>,
) -> Result<Vec<Clip>, DbError> {
    let limit = limit.map(|n| format!("LIMIT {n}")).unwrap_or_default();
    let mut stmt = conn.prepare(&format!(
        "
        SELECT {}
        FROM {}
        WHERE {where_clause}
        ORDER BY date_created DESC, id DESC
        {limit}
        ",
        clip_columns(kind),
        clip_table(kind),
    ))?;
    let rows = stmt.query_map(params, |row| clip_from_row(kind, row))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
}

fn insert_clip_row(conn: &Connection, clip: &Clip) -> Result<i64, DbError> {
    let date_created = to_micros(&clip.date_created);
    match &clip.content {
        ClipContent::Text {
            value,
            source_text_format,
        } => conn.execute(
            "
            INSERT INTO clip_text (value, application_name, date_created, source_text_format)
            VALUES (?1, ?2, ?3, ?4)
            ",
            params![value, clip.application_name, date_created, source_text_format],
        )?,
        ClipContent::Image { value, format_type } => conn.execute(
            "
            INSERT INTO clip_image (value, value_hash, application_name, date_created, format_type)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                value,
                image_value_hash(value),
                clip.application_name,
                date_created,
                format_type
            ],
        )?,
        ClipContent::File { value } => conn.execute(
            "
            INSERT INTO clip_file (value, application_name, date_created)
            VALUES (?1, ?2, ?3)
            ",
            params![value, clip.application_name, date_created],
        )?,
    };
    Ok(conn.last_insert_rowid())
}

fn filter_params(filter: &ClipFilter) -> (Option<&str>, Option<i64>) {
    (
        filter.application_name.as_deref(),
        filter.date_before.as_ref().map(to_micros),
    )
}

fn per_type(mut count: impl FnMut(ContentType) -> Result<usize, DbError>) -> Result<MatchCounts, DbError> {
    Ok(MatchCounts {
        text: count(ContentType::Text)?,
        image: count(ContentType::Image)?,
        file: count(ContentType::File)?,
    })
}

impl Database {
    /// Evicts over-capacity rows and writes `clip` in one transaction.
    /// Returns the stored clip with its assigned id.
    pub fn insert_clip(&self, clip: &Clip, history_limit: i64) -> Result<Clip, DbError> {
        self.unit_of_work(|tx| {
            enforce_capacity(tx, clip.kind(), history_limit);
            let id = insert_clip_row(tx, clip)?;
            Ok(Clip {
                id,
                date_created: clip.date_created.trunc_subsecs(6),
                ..clip.clone()
            })
        })
    }

    /// Returns whether a row was removed; a missing row is not an error.
    pub fn delete_clip(&self, kind: ContentType, id: i64) -> Result<bool, DbError> {
        self.unit_of_work(|tx| {
            let deleted = tx.execute(
                &format!("DELETE FROM {} WHERE id = ?1", clip_table(kind)),
                params![id],
            )?;
            Ok(deleted > 0)
        })
    }

    pub fn list_clips(&self, kind: ContentType) -> Result<Vec<Clip>, DbError> {
        let conn = self.conn()?;
        query_clips(&conn, kind, "1 = 1", &[], None)
    }

    pub fn find_exact(&self, content: &ClipContent) -> Result<Vec<Clip>, DbError> {
        let conn = self.conn()?;
        match content {
            ClipContent::Text {
                value,
                source_text_format,
            } => query_clips(
                &conn,
                ContentType::Text,
                "value = ?1 AND source_text_format = ?2",
                &[value, source_text_format],
                None,
            ),
            ClipContent::Image { value, format_type } => query_clips(
                &conn,
                ContentType::Image,
                "value_hash = ?1 AND value = ?2 AND format_type = ?3",
                &[&image_value_hash(value), value, format_type],
                None,
            ),
            ClipContent::File { value } => {
                query_clips(&conn, ContentType::File, "value = ?1", &[value], None)
            }
        }
    }

    pub fn count_matching(&self, filter: &ClipFilter) -> Result<MatchCounts, DbError> {
        let conn = self.conn()?;
        let (application_name, date_before) = filter_params(filter);
        per_type(|kind| {
            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE {MATCH_FILTER}", clip_table(kind)),
                params![application_name, date_before],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
    }

    /// Deletes matching rows from all three clip tables, all or nothing.
    pub fn delete_matching(&self, filter: &ClipFilter) -> Result<MatchCounts, DbError> {
        let (application_name, date_before) = filter_params(filter);
        self.unit_of_work(|tx| {
            per_type(|kind| {
                let deleted = tx.execute(
                    &format!("DELETE FROM {} WHERE {MATCH_FILTER}", clip_table(kind)),
                    params![application_name, date_before],
                )?;
                Ok(deleted)
            })
        })
    }

    pub fn last_snapshot(&self) -> Result<LastSnapshot, DbError> {
        let conn = self.conn()?;
        let latest = |kind| -> Result<Option<Clip>, DbError> {
            Ok(query_clips(&conn, kind, "1 = 1", &[], Some(1))?.into_iter().next())
        };
        Ok(LastSnapshot {
            text: latest(ContentType::Text)?,
            image: latest(ContentType::Image)?,
            file: latest(ContentType::File)?,
        })
    }

    #[cfg(test)]
    pub(crate) fn get_clip(&self, kind: ContentType, id: i64) -> Result<Option<Clip>, DbError> {
        use rusqlite::OptionalExtension;

        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM {} WHERE id = ?1",
                clip_columns(kind),
                clip_table(kind)
            ),
            params![id],
            |row| clip_from_row(kind, row),
        )
        .optional()
        .map_err(DbError::from)
    }
}
