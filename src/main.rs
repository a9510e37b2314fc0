use anyhow::Result;

#[actix_web::main]
async fn main() -> Result<()> {
    agc_adhesion_server::run().await?;
    Ok(())
}
