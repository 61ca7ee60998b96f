//! CSV ledger of users who opened the bot.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDateTime};

use crate::{domain::UserId, errors::Error, Result};

pub const LEDGER_HEADER: [&str; 5] = [
    "ID",
    "ID_TG",
    "Имя пользователя",
    "Зарегистрирован",
    "Последний вход",
];

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const COL_ID: usize = 0;
const COL_USER_ID: usize = 1;
const COL_USERNAME: usize = 2;
const COL_REGISTERED: usize = 3;
const COL_LAST_SEEN: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientRecord {
    pub id: u64,
    pub user_id: UserId,
    pub username: String,
    pub registered_at: NaiveDateTime,
    pub last_seen_at: NaiveDateTime,
}

impl ClientRecord {
    fn from_fields(fields: &[String]) -> Option<Self> {
        let field = |col: usize| fields.get(col).map(|s| s.trim());
        let parse_ts = |s: &str| NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok();
        Some(Self {
            id: field(COL_ID)?.parse().ok()?,
            user_id: UserId(field(COL_USER_ID)?.parse().ok()?),
            username: fields.get(COL_USERNAME)?.clone(),
            registered_at: parse_ts(field(COL_REGISTERED)?)?,
            last_seen_at: parse_ts(field(COL_LAST_SEEN)?)?,
        })
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.user_id.0.to_string(),
            self.username.clone(),
            self.registered_at.format(TIMESTAMP_FORMAT).to_string(),
            self.last_seen_at.format(TIMESTAMP_FORMAT).to_string(),
        ]
    }
}

/// File-backed registry. Each visit reads the ledger, patches one row and
/// rewrites the file.
#[derive(Clone, Debug)]
pub struct ClientRegistry {
    path: PathBuf,
}

impl ClientRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record_visit(&self, user_id: UserId, username: &str) -> Result<ClientRecord> {
        self.record_visit_at(user_id, username, Local::now().naive_local())
    }

    /// Update `last_seen_at` of the row for `user_id`, or append a new row
    /// with the next free id.
    pub fn record_visit_at(
        &self,
        user_id: UserId,
        username: &str,
        now: NaiveDateTime,
    ) -> Result<ClientRecord> {
        let mut rows = self.read_rows()?;
        let now_txt = now.format(TIMESTAMP_FORMAT).to_string();
        let user_key = user_id.0.to_string();

        let mut max_id = 0u64;
        let mut matched = None;
        for (idx, row) in rows.iter().enumerate() {
            if let Some(id) = row.get(COL_ID).and_then(|s| s.trim().parse::<u64>().ok()) {
                max_id = max_id.max(id);
            }
            let same_user = row.get(COL_USER_ID).map(|s| s.trim()) == Some(user_key.as_str());
            if matched.is_none() && same_user {
                matched = Some(idx);
            }
        }

        let record = match matched {
            Some(idx) => {
                let row = &mut rows[idx];
                let width = LEDGER_HEADER.len().max(row.len());
                row.resize(width, String::new());
                row[COL_LAST_SEEN] = now_txt;
                // Rows with a broken id or registration date are kept as-is on disk.
                ClientRecord::from_fields(row).unwrap_or_else(|| ClientRecord {
                    id: row[COL_ID].trim().parse().unwrap_or(0),
                    user_id,
                    username: row[COL_USERNAME].clone(),
                    registered_at: now,
                    last_seen_at: now,
                })
            }
            None => {
                let record = ClientRecord {
                    id: max_id + 1,
                    user_id,
                    username: username.to_string(),
                    registered_at: now,
                    last_seen_at: now,
                };
                rows.push(record.to_fields());
                record
            }
        };

        self.write_rows(&rows)?;
        tracing::debug!(id = record.id, user_id = user_id.0, "client visit recorded");
        Ok(record)
    }

    /// All well-formed rows, in file order.
    pub fn records(&self) -> Result<Vec<ClientRecord>> {
        Ok(self
            .read_rows()?
            .iter()
            .filter_map(|row| ClientRecord::from_fields(row))
            .collect())
    }

    fn read_rows(&self) -> Result<Vec<Vec<String>>> {
        let txt = match fs::read_to_string(&self.path) {
            Ok(txt) => txt,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::Io(e)),
        };
        let txt = txt.strip_prefix('\u{feff}').unwrap_or(&txt);

        let mut records = parse_csv(txt).into_iter();
        // First record is the header.
        records.next();
        Ok(records
            .filter(|row| !(row.len() == 1 && row[0].trim().is_empty()))
            .collect())
    }

    fn write_rows(&self, rows: &[Vec<String>]) -> Result<()> {
        let mut out = String::new();
        write_csv_record(&mut out, LEDGER_HEADER.iter().copied());
        for row in rows {
            write_csv_record(&mut out, row.iter().map(String::as_str));
        }
        fs::write(&self.path, out)?;
        Ok(())
    }
}

fn write_csv_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        if field.contains([',', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}

/// Minimal RFC 4180 reader: quoted fields, doubled quotes, CRLF or LF.
fn parse_csv(txt: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = txt.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                other => field.push(other),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            other => field.push(other),
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn registry(dir: &tempfile::TempDir) -> ClientRegistry {
        ClientRegistry::new(dir.path().join("clients.csv"))
    }

    #[test]
    fn first_visit_creates_file_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry(&dir);

        let rec = reg.record_visit_at(UserId(555), "alice", at(10, 0)).unwrap();
        assert_eq!(rec.id, 1);
        assert_eq!(rec.registered_at, rec.last_seen_at);

        let txt = fs::read_to_string(reg.path()).unwrap();
        let mut lines = txt.lines();
        assert_eq!(
            lines.next(),
            Some("ID,ID_TG,Имя пользователя,Зарегистрирован,Последний вход")
        );
        assert_eq!(
            lines.next(),
            Some("1,555,alice,2024-09-01 10:00:00,2024-09-01 10:00:00")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn repeat_visit_updates_last_seen_only() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry(&dir);

        reg.record_visit_at(UserId(555), "alice", at(10, 0)).unwrap();
        let again = reg.record_visit_at(UserId(555), "alice", at(12, 30)).unwrap();

        assert_eq!(again.id, 1);
        assert_eq!(again.registered_at, at(10, 0));
        assert_eq!(again.last_seen_at, at(12, 30));

        let records = reg.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0], again);
    }

    #[test]
    fn new_user_gets_max_id_plus_one() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry(&dir);
        fs::write(
            reg.path(),
            "ID,ID_TG,Имя пользователя,Зарегистрирован,Последний вход\n\
             3,10,a,2024-01-01 00:00:00,2024-01-01 00:00:00\n\
             9,11,b,2024-01-01 00:00:00,2024-01-01 00:00:00\n\
             4,12,c,2024-01-01 00:00:00,2024-01-01 00:00:00\n",
        )
        .unwrap();

        let rec = reg.record_visit_at(UserId(99), "d", at(8, 0)).unwrap();
        assert_eq!(rec.id, 10);
        assert_eq!(reg.records().unwrap().len(), 4);
    }

    #[test]
    fn malformed_ids_are_skipped_and_rows_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry(&dir);
        fs::write(
            reg.path(),
            "ID,ID_TG,Имя пользователя,Зарегистрирован,Последний вход\n\
             abc,10,a,2024-01-01 00:00:00,2024-01-01 00:00:00\n\
             2,11,b,2024-01-01 00:00:00,2024-01-01 00:00:00\n",
        )
        .unwrap();

        let rec = reg.record_visit_at(UserId(12), "c", at(9, 0)).unwrap();
        assert_eq!(rec.id, 3);

        let txt = fs::read_to_string(reg.path()).unwrap();
        assert!(txt.contains("abc,10,a,"));
        assert_eq!(txt.lines().count(), 4);
    }

    #[test]
    fn usernames_with_commas_and_quotes_survive_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry(&dir);

        reg.record_visit_at(UserId(1), "Doe, \"JD\"", at(1, 0)).unwrap();
        reg.record_visit_at(UserId(2), "x", at(2, 0)).unwrap();

        let records = reg.records().unwrap();
        assert_eq!(records[0].username, "Doe, \"JD\"");
        assert_eq!(records[1].id, 2);
    }

    #[test]
    fn parse_csv_handles_crlf_and_missing_trailing_newline() {
        let rows = parse_csv("a,b\r\n\"c,d\",e");
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c,d", "e"]]);
    }
}
