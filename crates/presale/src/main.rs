#[tokio::main]
async fn main() -> anyhow::Result<()> {
    presale::start(std::env::args()).await
}
