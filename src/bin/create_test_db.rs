use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use hryvnia::{
    CategoryName, DEFAULT_CATEGORIES, Email, Expense, PasswordHash, ValidatedPassword,
    create_expense, create_user, initialize_db, seed_default_categories,
};

const TEST_EMAIL: &str = "test@example.ua";
const TEST_PASSWORD: &str = "test";

/// A utility for creating a test database for the Hryvnia web server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// How many days of expenses to generate, counting back from today.
    #[arg(long, default_value_t = 120)]
    days: i64,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'test.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'test.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let connection = Connection::open(output_path)?;

    initialize_db(&connection)?;

    println!("Creating test user {TEST_EMAIL} with the password \"{TEST_PASSWORD}\"...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(TEST_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(&Email::new(TEST_EMAIL)?, password_hash, &connection)?;
    seed_default_categories(user.id, &connection)?;

    println!("Creating expenses for the last {} days...", args.days);

    let now = OffsetDateTime::now_utc();
    let mut expense_count = 0;

    for day in 0..args.days.max(0) {
        // One or two expenses a day, cycling through the default categories.
        for slot in 0..(1 + day % 2) {
            let index = (day + slot) as usize % DEFAULT_CATEGORIES.len();
            let category = CategoryName::new(DEFAULT_CATEGORIES[index])?;
            let amount = 50.0 + ((day * 37 + slot * 113) % 950) as f64 + 0.5 * (day % 2) as f64;
            let created_at = now - Duration::days(day) - Duration::hours(slot);
            let comment = (day % 5 == 0).then(|| format!("Тестова витрата №{}", expense_count + 1));

            create_expense(
                Expense::build(amount, category, created_at.date())
                    .comment(comment)
                    .created_at(created_at),
                user.id,
                &connection,
            )?;

            expense_count += 1;
        }
    }

    println!("Created {expense_count} expenses.");
    println!("Success!");

    Ok(())
}
