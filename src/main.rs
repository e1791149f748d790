use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use env_logger::Env;
use otzyv::{
    configuration::get_configuration,
    dal::{review_db, school_db},
    services::scrape_reviews,
};
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let school_name = std::env::args()
        .nth(1)
        .context("usage: otzyv <school name>")?;

    let configuration = get_configuration().expect("Failed to read configuration.");

    let pool_options = PgPoolOptions::new().acquire_timeout(Duration::from_secs(10));
    let connection_pool = pool_options.connect_lazy_with(configuration.database.with_db());

    let school_id = match school_db::find_school_id(&connection_pool, &school_name).await? {
        Some(id) => id,
        None => {
            log::error!("No school matches {:?}", school_name);
            return Ok(());
        }
    };

    let records = scrape_reviews(&school_name, &configuration.scraper).await;
    log::info!("Scraped {} reviews for school {}", records.len(), school_id);

    for record in &records {
        let inserted =
            review_db::insert_review(&connection_pool, school_id, record, Utc::now()).await;
        if let Err(e) = inserted {
            log::error!("Failed to insert review dated {}: {:?}", record.date, e);
        }
    }

    Ok(())
}
