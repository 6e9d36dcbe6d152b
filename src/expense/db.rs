//! Database operations for expenses.

use rusqlite::{Connection, Row, types::Type};
use time::{
    OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::{
    Error,
    expense::{DateRange, Expense, ExpenseId, ExpenseTitle, NewExpense},
};

/// Dates are stored as fixed-width UTC text so that comparing the text
/// compares the instants.
const STORED_DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:9]Z"
);

/// Create an expense and return it with its generated ID.
pub fn create_expense(expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    let date = expense.date.to_offset(UtcOffset::UTC);

    connection.execute(
        "INSERT INTO expense (title, category, type, amount, date) VALUES (?1, ?2, ?3, ?4, ?5);",
        (
            expense.title.as_ref(),
            &expense.category,
            &expense.expense_type,
            expense.amount,
            to_stored_date(date)?,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Expense {
        id,
        title: expense.title,
        category: expense.category,
        expense_type: expense.expense_type,
        amount: expense.amount,
        date,
    })
}

/// Retrieve a single expense by ID.
pub fn get_expense(expense_id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    connection
        .prepare("SELECT id, title, category, type, amount, date FROM expense WHERE id = :id;")?
        .query_row(&[(":id", &expense_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve the expenses within `date_range`, most recent first.
///
/// Expenses on the same date-time are ordered by descending ID so that the
/// order is stable.
pub fn get_expenses(date_range: DateRange, connection: &Connection) -> Result<Vec<Expense>, Error> {
    let start = date_range.start.map(to_stored_date).transpose()?;
    let end = date_range.end.map(to_stored_date).transpose()?;

    connection
        .prepare(
            "SELECT id, title, category, type, amount, date FROM expense \
            WHERE (?1 IS NULL OR date >= ?1) AND (?2 IS NULL OR date <= ?2) \
            ORDER BY date DESC, id DESC;",
        )?
        .query_map((start, end), map_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Overwrite every field of the stored expense with the same ID as `expense`.
///
/// # Errors
/// Returns [Error::UpdateMissingExpense] if the expense doesn't exist.
pub fn update_expense(expense: &Expense, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE expense SET title = ?1, category = ?2, type = ?3, amount = ?4, date = ?5 \
        WHERE id = ?6",
        (
            expense.title.as_ref(),
            &expense.category,
            &expense.expense_type,
            expense.amount,
            to_stored_date(expense.date)?,
            expense.id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingExpense);
    }

    Ok(())
}

/// Delete an expense by ID.
///
/// # Errors
/// Returns [Error::DeleteMissingExpense] if the expense doesn't exist.
pub fn delete_expense(expense_id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [expense_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

/// Initialize the expense table and indexes.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            category TEXT NOT NULL,
            type TEXT NOT NULL DEFAULT 'Debet',
            amount REAL NOT NULL,
            date TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(date);",
    )?;

    Ok(())
}

fn to_stored_date(date: OffsetDateTime) -> Result<String, Error> {
    date.to_offset(UtcOffset::UTC)
        .format(STORED_DATE_FORMAT)
        .map_err(|error| Error::DateConversion(error.to_string()))
}

fn map_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let raw_title: String = row.get(1)?;
    let raw_date: String = row.get(5)?;
    let date = PrimitiveDateTime::parse(&raw_date, STORED_DATE_FORMAT)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(error)))?
        .assume_utc();

    Ok(Expense {
        id: row.get(0)?,
        title: ExpenseTitle::new_unchecked(&raw_title),
        category: row.get(2)?,
        expense_type: row.get(3)?,
        amount: row.get(4)?,
        date,
    })
}
