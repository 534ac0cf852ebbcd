use showscrape::run;

fn main() -> anyhow::Result<()> {
    // Fetching is strictly sequential; one thread is all it needs.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run())
}
