use crate::metrics::data::UserData;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const USERS_FILE: &str = "users.csv";
pub const PAYMENTS_FILE: &str = "payments.csv";

/// Column holding the age in `users.csv`.
pub const AGE_COLUMN: usize = 2;
/// Column holding the amount in cents in `payments.csv`.
pub const AMOUNT_COLUMN: usize = 0;

/// Loads `users.csv` and `payments.csv` from `dir`. Neither file has a header row.
pub fn load_data(dir: &Path) -> Result<UserData, LoadError> {
    let users = open(&dir.join(USERS_FILE))?;
    let payments = open(&dir.join(PAYMENTS_FILE))?;
    load_from_readers(users, payments)
}

pub fn load_from_readers(users: impl Read, payments: impl Read) -> Result<UserData, LoadError> {
    let ages = read_column::<u8>(users, USERS_FILE, AGE_COLUMN)?;
    let amounts = read_column::<u32>(payments, PAYMENTS_FILE, AMOUNT_COLUMN)?;
    tracing::info!(users = ages.len(), payments = amounts.len(), "loaded user data");
    Ok(UserData::new(ages, amounts))
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads one column of a headerless CSV file. Quoted fields may contain commas; fields are
/// trimmed and rows may differ in length. Blank lines are skipped.
fn read_column<T: FromStr>(
    reader: impl Read,
    file: &'static str,
    column: usize,
) -> Result<Vec<T>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut values = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|source| LoadError::Csv { file, source })?;
        let line = record
            .position()
            .map_or(index + 1, |position| position.line() as usize);
        let field_error = |kind| LoadError::Field {
            file,
            line,
            column,
            kind,
        };
        let field = record
            .get(column)
            .ok_or_else(|| field_error(FieldErrorKind::Missing))?;
        let value = field
            .parse()
            .map_err(|_| field_error(FieldErrorKind::Invalid(field.to_string())))?;
        values.push(value);
    }
    Ok(values)
}

#[derive(Debug)]
pub enum LoadError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Csv {
        file: &'static str,
        source: csv::Error,
    },
    Field {
        file: &'static str,
        line: usize,
        column: usize,
        kind: FieldErrorKind,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorKind {
    Missing,
    Invalid(String),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "unable to read {}: {}", path.display(), source)
            }
            LoadError::Csv { file, source } => write!(f, "{}: {}", file, source),
            LoadError::Field {
                file,
                line,
                column,
                kind: FieldErrorKind::Missing,
            } => write!(f, "{}:{}: missing column {}", file, line, column),
            LoadError::Field {
                file,
                line,
                column,
                kind: FieldErrorKind::Invalid(value),
            } => write!(f, "{}:{}: invalid value `{}` in column {}", file, line, value, column),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Csv { source, .. } => Some(source),
            LoadError::Field { .. } => None,
        }
    }
}
