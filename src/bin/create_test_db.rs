use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use expense_tracker::{
    MinorUnits,
    expense::{NewExpense, create_expense},
    initialize_db,
};

/// A utility for creating a test database for the expense_tracker server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const SAMPLE_EXPENSES: [(&str, &str, &str); 6] = [
    ("Flat white", "Food", "5.50"),
    ("Groceries", "Food", "84.37"),
    ("Bus fare", "Transport", "2.80"),
    ("Power bill", "Utilities", "142.00"),
    ("Cinema ticket", "Entertainment", "19.99"),
    ("Refund for returned shoes", "Clothing", "-60.00"),
];

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

    for (name, category, price) in SAMPLE_EXPENSES {
        let price: MinorUnits = price.parse()?;
        let expense = create_expense(
            NewExpense {
                name: name.to_owned(),
                category: category.to_owned(),
                price,
            },
            &conn,
        )?;
        println!("  {} {} {}", expense.id, expense.name, expense.price);
    }

    println!("Success!");

    Ok(())
}
