//! Setup shared by the repository tests that run against a live database.
//!
//! Those tests are `#[ignore]`d; run them with `cargo test -- --ignored` and
//! `POSTGRES_URL` pointing at a disposable database.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{Book, NewBook};
use crate::query::BookRepository;
use crate::{PgClient, PgConfig, PgConnection, schema};

/// Connects to `POSTGRES_URL` and applies any pending migrations.
pub(crate) async fn migrated_client() -> PgClient {
    let url = std::env::var("POSTGRES_URL").expect("POSTGRES_URL must be set");
    let client = PgClient::connect(PgConfig::new(url)).await.unwrap();
    client.run_pending_migrations().await.unwrap();
    client
}

/// Inserts an account with a unique username.
pub(crate) async fn create_account(conn: &mut PgConnection) -> Uuid {
    use schema::accounts::{self, dsl};

    let id = Uuid::now_v7();
    diesel::insert_into(accounts::table)
        .values((dsl::id.eq(id), dsl::username.eq(format!("reader-{id}"))))
        .execute(conn)
        .await
        .unwrap();

    id
}

/// Adds a book with `copies` copies on the shelf.
pub(crate) async fn create_book(conn: &mut PgConnection, added_by: Uuid, copies: i32) -> Book {
    let new_book = NewBook {
        total_copies: copies,
        ..NewBook::new("The Dispossessed", "Ursula K. Le Guin", added_by, jiff::Timestamp::now())
    };

    conn.create_book(new_book).await.unwrap()
}
