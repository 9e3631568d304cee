#[tokio::main]
async fn main() -> anyhow::Result<()> {
    casedesk::bootstrapper::run().await
}
