use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    bmlt_mcp::main_entry().await
}
