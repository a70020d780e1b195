use rusqlite::params;

use super::{Database, DbError};
use crate::models::Blacklist;

impl Database {
    pub fn list_blacklist(&self) -> Result<Vec<Blacklist>, DbError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, application_name FROM blacklist ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Blacklist {
                id: row.get(0)?,
                application_name: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    pub fn insert_blacklist(&self, application_name: &str) -> Result<Blacklist, DbError> {
        self.unit_of_work(|tx| {
            tx.execute(
                "INSERT INTO blacklist (application_name) VALUES (?1)",
                params![application_name],
            )?;
            Ok(Blacklist {
                id: tx.last_insert_rowid(),
                application_name: application_name.to_string(),
            })
        })
    }

    pub fn delete_blacklist(&self, id: i64) -> Result<bool, DbError> {
        self.unit_of_work(|tx| {
            let deleted = tx.execute("DELETE FROM blacklist WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
    }

    pub fn is_blacklisted(&self, application_name: &str) -> Result<bool, DbError> {
        let conn = self.conn()?;
        let found: i64 = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM blacklist WHERE application_name = ?1 COLLATE NOCASE)",
            params![application_name],
            |row| row.get(0),
        )?;
        Ok(found == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_list_delete() {
        let db = Database::new_in_memory().expect("db init");
        let keepass = db.insert_blacklist("KeePass").expect("insert");
        let vault = db.insert_blacklist("1Password").expect("insert");

        assert_eq!(db.list_blacklist().expect("list"), vec![keepass.clone(), vault.clone()]);
        assert!(db.delete_blacklist(keepass.id).expect("delete"));
        assert!(!db.delete_blacklist(keepass.id).expect("delete again"));
        assert_eq!(db.list_blacklist().expect("list"), vec![vault]);
    }

    #[test]
    fn membership_ignores_case() {
        let db = Database::new_in_memory().expect("db init");
        db.insert_blacklist("KeePass").expect("insert");
        assert!(db.is_blacklisted("keepass").expect("check"));
        assert!(!db.is_blacklisted("Notepad").expect("check"));
    }
}
