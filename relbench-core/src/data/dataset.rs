use crate::data::database::Database;
use chrono::NaiveDateTime;

/// A database together with the cutoff timestamps that separate training
/// history from validation and test time.
#[derive(Clone, Debug)]
pub struct Dataset {
    db: Database,
    pub val_timestamp: NaiveDateTime,
    pub test_timestamp: NaiveDateTime,
}

impl Dataset {
    pub fn new(db: Database, val_timestamp: NaiveDateTime, test_timestamp: NaiveDateTime) -> Self {
        Self {
            db,
            val_timestamp,
            test_timestamp,
        }
    }

    pub fn get_db(&self) -> &Database {
        &self.db
    }

    pub fn get_db_mut(&mut self) -> &mut Database {
        &mut self.db
    }
}
