//! Example: Listing published posts from a Ghost site
//!
//! Demonstrates configuration, NQL filter construction, and a retried
//! content-scoped request.
//!
//! # Setup
//!
//! 1. Set environment variables: ```bash export
//!    GHOST_URL=https://demo.ghost.io export
//!    GHOST_CONTENT_KEY=<your content API key> ```
//!
//! 2. Run this example: ```bash cargo run --example list_posts ```

use ghostwire_core::nql::{Filter, RelativeDate};
use ghostwire_core::{ApiScope, GhostConfig, RequestIntent};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let base_url = std::env::var("GHOST_URL").unwrap_or_else(|_| "https://demo.ghost.io".into());
    let Ok(content_key) = std::env::var("GHOST_CONTENT_KEY") else {
        println!("GHOST_CONTENT_KEY not set; nothing to do");
        println!("  export GHOST_URL=https://your-site.example");
        println!("  export GHOST_CONTENT_KEY=<content API key>");
        return Ok(());
    };

    let config = GhostConfig::builder(&base_url).content_api_key(content_key).build()?;
    let executor = config.build_executor()?;

    // Published posts from the last month, newest first.
    let filter = Filter::and(vec![
        Filter::eq("status", "published"),
        Filter::gt("published_at", RelativeDate::days_ago(30)),
    ]);
    let intent = RequestIntent::get("posts/")
        .with_query("limit", "10")
        .with_query("order", "published_at desc")
        .with_filter(&filter)?;

    println!("Fetching posts from {base_url}");
    let response = executor.execute(ApiScope::Content, &intent).await?;

    println!("HTTP {} after {} attempt(s)\n", response.status, response.attempts);
    if let Some(posts) = response.body.get("posts").and_then(|p| p.as_array()) {
        for post in posts {
            let title = post.get("title").and_then(|t| t.as_str()).unwrap_or("(untitled)");
            let published =
                post.get("published_at").and_then(|p| p.as_str()).unwrap_or("unknown");
            println!("  {published}  {title}");
        }
        println!("\n{} post(s)", posts.len());
    } else {
        println!("unexpected response shape: {}", response.body);
    }

    Ok(())
}
