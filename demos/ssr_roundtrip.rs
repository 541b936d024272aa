//! SSR round trip: server assigns variants, client replays them.
//!
//! Run with: cargo run --example ssr_roundtrip

use std::sync::Arc;
use std::time::Duration;

use trueno_ab::backend::FixedBackend;
use trueno_ab::context::ExecutionContext;
use trueno_ab::cookie::MemoryCookieStore;
use trueno_ab::experiment::ExperimentDefinition;
use trueno_ab::registry::{RegisterOptions, Registry};
use trueno_ab::session::ExperimentSession;
use trueno_ab::SsrData;

fn experiments() -> trueno_ab::Result<Vec<(&'static str, ExperimentDefinition)>> {
    Ok(vec![
        ("hero", ExperimentDefinition::new("exp-hero-banner", 2)?),
        (
            "pricing",
            ExperimentDefinition::builder("exp-pricing-table", 3).testing_id(42).build()?,
        ),
    ])
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    trueno_ab::logging::init();

    // Server: first request, no cookies yet.
    let server = Registry::builder().logging(true).build();
    server.register_experiments(experiments()?, RegisterOptions::ssr());

    let response_cookies = MemoryCookieStore::new();
    let ssr = server.get_ssr_variants(&MemoryCookieStore::new(), |name, value| {
        println!("Set-Cookie: {name}={value}");
        response_cookies.set(name, value.to_string());
    })?;
    let payload = ssr.to_json()?;
    println!("embedded SSR payload: {payload}");

    // Server: second request carries the cookies back, nothing new is set.
    let again = server.get_ssr_variants(&response_cookies, |name, _| {
        println!("unexpected Set-Cookie for {name}");
    })?;
    assert_eq!(again, ssr);

    // Client: replays the payload without touching the backend.
    let client = Arc::new(
        Registry::builder()
            .context(ExecutionContext::browser("https://shop.test/pricing?force=42&variant=2"))
            .timeout_ms(250)
            .logging(true)
            .build(),
    );
    client.register_experiments(experiments()?, RegisterOptions::default());

    let backend = FixedBackend::new(1).with_delay(Duration::from_millis(50));
    let session = ExperimentSession::new(Arc::clone(&client), backend).with_ssr(SsrData::from_json(&payload)?);

    for name in client.names() {
        let state = session.resolve(&name).await?;
        println!("{name}: variant={:?} ssr={}", state.variant, state.is_ssr);
    }

    Ok(())
}
