use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use expense_tracker::{ExpenseData, create_expense, initialize_db};

/// A utility for creating a test database for the expense tracker server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test expenses...");

    let now = OffsetDateTime::now_utc();
    let sample_expenses = [
        ("Coffee", "Food", None, 4.5, 0),
        ("Groceries", "Food", None, 86.2, 2),
        ("Bus pass", "Transport", None, 50.0, 9),
        ("Salary", "Income", Some("Credit"), 3200.0, 14),
        ("Rent", "Housing", None, 1450.0, 31),
    ];

    for (title, category, expense_type, amount, days_ago) in sample_expenses {
        let expense = ExpenseData {
            title: title.to_owned(),
            category: category.to_owned(),
            expense_type: expense_type.map(str::to_owned),
            amount,
            date: now - Duration::days(days_ago),
        }
        .into_new_expense()?;

        create_expense(expense, &conn)?;
    }

    println!("Success!");

    Ok(())
}
