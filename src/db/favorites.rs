use rusqlite::{params, Connection, OptionalExtension};

use super::{favorite_content_table, Database, DbError};
use crate::models::{ContentType, Favorite, FavoriteContent, FavoriteItem};

fn insert_content(conn: &Connection, content: &FavoriteContent) -> Result<i64, DbError> {
    match content {
        FavoriteContent::Text { value, .. } => conn.execute(
            "INSERT INTO favorite_content_text (value) VALUES (?1)",
            params![value],
        )?,
        FavoriteContent::Image {
            value, format_type, ..
        } => conn.execute(
            "INSERT INTO favorite_content_image (value, format_type) VALUES (?1, ?2)",
            params![value, format_type],
        )?,
        FavoriteContent::File { value, .. } => conn.execute(
            "INSERT INTO favorite_content_file (value) VALUES (?1)",
            params![value],
        )?,
    };
    Ok(conn.last_insert_rowid())
}

fn update_content(conn: &Connection, content: &FavoriteContent) -> Result<usize, DbError> {
    let updated = match content {
        FavoriteContent::Text { id, value } => conn.execute(
            "UPDATE favorite_content_text SET value = ?1 WHERE id = ?2",
            params![value, id],
        )?,
        FavoriteContent::Image {
            id,
            value,
            format_type,
        } => conn.execute(
            "UPDATE favorite_content_image SET value = ?1, format_type = ?2 WHERE id = ?3",
            params![value, format_type, id],
        )?,
        FavoriteContent::File { id, value } => conn.execute(
            "UPDATE favorite_content_file SET value = ?1 WHERE id = ?2",
            params![value, id],
        )?,
    };
    Ok(updated)
}

fn load_content(
    conn: &Connection,
    kind: ContentType,
    id: i64,
) -> Result<Option<FavoriteContent>, DbError> {
    let content = match kind {
        ContentType::Text => conn
            .query_row(
                "SELECT id, value FROM favorite_content_text WHERE id = ?1",
                params![id],
                |row| {
                    Ok(FavoriteContent::Text {
                        id: row.get(0)?,
                        value: row.get(1)?,
                    })
                },
            )
            .optional()?,
        ContentType::Image => conn
            .query_row(
                "SELECT id, value, format_type FROM favorite_content_image WHERE id = ?1",
                params![id],
                |row| {
                    Ok(FavoriteContent::Image {
                        id: row.get(0)?,
                        value: row.get(1)?,
                        format_type: row.get(2)?,
                    })
                },
            )
            .optional()?,
        ContentType::File => conn
            .query_row(
                "SELECT id, value FROM favorite_content_file WHERE id = ?1",
                params![id],
                |row| {
                    Ok(FavoriteContent::File {
                        id: row.get(0)?,
                        value: row.get(1)?,
                    })
                },
            )
            .optional()?,
    };
    Ok(content)
}

impl Database {
    pub fn list_favorites(&self) -> Result<Vec<FavoriteItem>, DbError> {
        let conn = self.conn()?;
        let favorites = {
            let mut stmt =
                conn.prepare("SELECT id, content_type, favorite_content_id FROM favorite ORDER BY id")?;
            let rows = stmt.query_map([], |row| {
                Ok(Favorite {
                    id: row.get(0)?,
                    content_type: row.get(1)?,
                    favorite_content_id: row.get(2)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        favorites
            .into_iter()
            .map(|favorite| {
                let content =
                    load_content(&conn, favorite.content_type, favorite.favorite_content_id)?;
                Ok(FavoriteItem { favorite, content })
            })
            .collect()
    }

    /// Writes the content row and its owning favorite row together.
    pub fn insert_favorite(&self, content: FavoriteContent) -> Result<FavoriteItem, DbError> {
        self.unit_of_work(|tx| {
            let content_id = insert_content(tx, &content)?;
            let content_type = content.kind();
            tx.execute(
                "INSERT INTO favorite (content_type, favorite_content_id) VALUES (?1, ?2)",
                params![content_type, content_id],
            )?;
            Ok(FavoriteItem {
                favorite: Favorite {
                    id: tx.last_insert_rowid(),
                    content_type,
                    favorite_content_id: content_id,
                },
                content: Some(content.with_id(content_id)),
            })
        })
    }

    /// Persists the loaded content of an existing favorite. A favorite never
    /// changes its content type or content row; a relinked `item` is refused.
    /// A favorite that no longer exists is left alone.
    pub fn update_favorite(&self, item: &FavoriteItem) -> Result<(), DbError> {
        self.unit_of_work(|tx| {
            let stored = tx
                .query_row(
                    "SELECT content_type, favorite_content_id FROM favorite WHERE id = ?1",
                    params![item.favorite.id],
                    |row| Ok((row.get::<_, ContentType>(0)?, row.get::<_, i64>(1)?)),
                )
                .optional()?;
            let Some((content_type, favorite_content_id)) = stored else {
                return Ok(());
            };
            if content_type != item.favorite.content_type
                || favorite_content_id != item.favorite.favorite_content_id
            {
                return Err(DbError::FavoriteRelinked {
                    id: item.favorite.id,
                });
            }
            if let Some(content) = &item.content {
                update_content(tx, content)?;
            }
            Ok(())
        })
    }

    /// Removes the favorite and its content row; returns whether the favorite existed.
    pub fn delete_favorite(&self, favorite: &Favorite) -> Result<bool, DbError> {
        self.unit_of_work(|tx| {
            tx.execute(
                &format!(
                    "DELETE FROM {} WHERE id = ?1",
                    favorite_content_table(favorite.content_type)
                ),
                params![favorite.favorite_content_id],
            )?;
            let deleted = tx.execute("DELETE FROM favorite WHERE id = ?1", params![favorite.id])?;
            Ok(deleted > 0)
        })
    }
}
