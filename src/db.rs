use crate::entities::{Department, Seller};
use crate::service::{PersistenceError, PersistenceService};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::debug;

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Departments
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS department (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Sellers
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS seller (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            birth_date TEXT,
            base_salary REAL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_seller_name ON seller(name)",
        [],
    )?;

    Ok(())
}

/// SQLite-backed store for departments and sellers
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        setup_database(&conn).context("Failed to initialize database")?;
        Ok(SqliteStore { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;
        Ok(SqliteStore { conn })
    }

    pub fn count(&self, table: Table) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }

    /// Inserts a few records when both tables are empty. Returns rows added.
    pub fn seed_demo_data(&self) -> Result<usize> {
        if self.count(Table::Department)? > 0 || self.count(Table::Seller)? > 0 {
            return Ok(0);
        }

        let mut inserted = 0;
        for name in ["Computers", "Electronics", "Fashion", "Books"] {
            PersistenceService::<Department>::save_or_update(self, &mut Department::new(name))?;
            inserted += 1;
        }

        let sellers = [
            ("Bob Brown", "bob@gmail.com", (1998, 4, 21), 1000.0),
            ("Maria Green", "maria@gmail.com", (1979, 12, 31), 3500.0),
            ("Alex Grey", "alex@gmail.com", (1988, 1, 15), 2200.0),
            ("Martha Red", "martha@gmail.com", (1993, 11, 30), 3000.0),
        ];
        for (name, email, (y, m, d), salary) in sellers {
            let mut seller = Seller::new(name, email, NaiveDate::from_ymd_opt(y, m, d), Some(salary));
            PersistenceService::<Seller>::save_or_update(self, &mut seller)?;
            inserted += 1;
        }

        Ok(inserted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Department,
    Seller,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Department => "department",
            Table::Seller => "seller",
        }
    }
}

fn missing_row(table: Table, id: i64) -> PersistenceError {
    PersistenceError::new(format!("No {} with id {}", table.name(), id))
}

// ============================================================================
// DEPARTMENTS
// ============================================================================

fn department_from_row(row: &Row) -> rusqlite::Result<Department> {
    Ok(Department {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

impl PersistenceService<Department> for SqliteStore {
    fn save_or_update(&self, entity: &mut Department) -> Result<(), PersistenceError> {
        match entity.id {
            None => {
                self.conn.execute(
                    "INSERT INTO department (name) VALUES (?1)",
                    params![entity.name],
                )?;
                entity.id = Some(self.conn.last_insert_rowid());
                debug!(id = ?entity.id, "inserted department");
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE department SET name = ?1 WHERE id = ?2",
                    params![entity.name, id],
                )?;
                if changed == 0 {
                    return Err(missing_row(Table::Department, id));
                }
                debug!(id, "updated department");
            }
        }
        Ok(())
    }

    fn find_all(&self) -> Result<Vec<Department>, PersistenceError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM department ORDER BY name")?;

        let departments = stmt
            .query_map([], department_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(departments)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Department>, PersistenceError> {
        let department = self
            .conn
            .query_row(
                "SELECT id, name FROM department WHERE id = ?1",
                [id],
                department_from_row,
            )
            .optional()?;

        Ok(department)
    }

    fn delete_by_id(&self, id: i64) -> Result<(), PersistenceError> {
        let changed = self
            .conn
            .execute("DELETE FROM department WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(missing_row(Table::Department, id));
        }
        Ok(())
    }
}

// ============================================================================
// SELLERS
// ============================================================================

fn seller_from_row(row: &Row) -> rusqlite::Result<Seller> {
    Ok(Seller {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        birth_date: row.get(3)?,
        base_salary: row.get(4)?,
    })
}

impl PersistenceService<Seller> for SqliteStore {
    fn save_or_update(&self, entity: &mut Seller) -> Result<(), PersistenceError> {
        match entity.id {
            None => {
                self.conn.execute(
                    "INSERT INTO seller (name, email, birth_date, base_salary)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![entity.name, entity.email, entity.birth_date, entity.base_salary],
                )?;
                entity.id = Some(self.conn.last_insert_rowid());
                debug!(id = ?entity.id, "inserted seller");
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE seller
                     SET name = ?1, email = ?2, birth_date = ?3, base_salary = ?4
                     WHERE id = ?5",
                    params![
                        entity.name,
                        entity.email,
                        entity.birth_date,
                        entity.base_salary,
                        id
                    ],
                )?;
                if changed == 0 {
                    return Err(missing_row(Table::Seller, id));
                }
                debug!(id, "updated seller");
            }
        }
        Ok(())
    }

    fn find_all(&self) -> Result<Vec<Seller>, PersistenceError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, birth_date, base_salary
             FROM seller
             ORDER BY name",
        )?;

        let sellers = stmt
            .query_map([], seller_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(sellers)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Seller>, PersistenceError> {
        let seller = self
            .conn
            .query_row(
                "SELECT id, name, email, birth_date, base_salary FROM seller WHERE id = ?1",
                [id],
                seller_from_row,
            )
            .optional()?;

        Ok(seller)
    }

    fn delete_by_id(&self, id: i64) -> Result<(), PersistenceError> {
        let changed = self.conn.execute("DELETE FROM seller WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(missing_row(Table::Seller, id));
        }
        Ok(())
    }
}
