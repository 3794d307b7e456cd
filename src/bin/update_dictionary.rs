// Bulk-load the bundled word lists into the `word` table.
//
// Usage: update_dictionary <locale>...
// Exits non-zero with one error line per failed locale.

use sqlx::postgres::PgPoolOptions;

use shiritori_be::db;

fn bundled_word_list(locale: &str) -> Option<&'static str> {
    match locale {
        "en" => Some(include_str!("../../assets/en.txt")),
        _ => None,
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let locales: Vec<String> = {
        let args: Vec<String> = std::env::args().skip(1).collect();
        if args.is_empty() {
            vec!["en".to_string()]
        } else {
            args
        }
    };

    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("error: DATABASE_URL is not set");
            std::process::exit(1);
        }
    };

    let pool = match PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("error: could not connect to database: {e}");
            std::process::exit(1);
        }
    };

    let mut failures = 0;
    for locale in &locales {
        println!("Updating '{locale}' dictionary");
        let Some(list) = bundled_word_list(locale) else {
            eprintln!("error: no bundled word list for locale '{locale}'");
            failures += 1;
            continue;
        };

        let words: Vec<String> = list
            .lines()
            .map(|line| line.trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();

        match db::word::replace_locale(&pool, locale, &words).await {
            Ok(count) => println!("Successfully loaded {count} words into '{locale}'"),
            Err(e) => {
                eprintln!("error: failed to update '{locale}' dictionary: {e}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
}
