use super::{connect_and_migrate, load_config};

pub async fn handle() -> anyhow::Result<()> {
    let config = load_config()?;
    let pool = connect_and_migrate(&config).await?;
    pool.close().await;
    println!("Schema is up to date");
    Ok(())
}
