use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv_cli::main_entry().await
}
