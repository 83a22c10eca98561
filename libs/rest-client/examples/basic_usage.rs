//! Basic usage of the configurable REST client
//!
//! To run this example:
//! ```bash
//! export REST_CLIENT_BASE_URL="https://jsonplaceholder.typicode.com"
//! export API_TOKEN="your-token-here"  # Optional
//! cargo run --example basic_usage
//! ```

use rest_client::{ClientError, ClientOptions, ConfigurableClient, TransportErrorKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct Post {
    id: u64,
    title: String,
}

#[derive(Debug, Serialize)]
struct NewPost<'a> {
    title: &'a str,
    body: &'a str,
    #[serde(rename = "userId")]
    user_id: u64,
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let client = ConfigurableClient::from_options(ClientOptions::from_env())?;
    if client.base_url().is_empty() {
        client.set_base_url("https://jsonplaceholder.typicode.com");
    }
    if let Ok(token) = std::env::var("API_TOKEN") {
        client.set_token(token);
    }

    let post: Post = client.get("/posts/1").await?;
    println!("Fetched post {}: {}", post.id, post.title);

    let created: Post = client
        .post(
            "/posts",
            &NewPost {
                title: "hello",
                body: "from rest-client",
                user_id: 1,
            },
        )
        .await?;
    println!("Created post {}", created.id);

    match client.get::<Post>("/posts/999999").await {
        Ok(post) => println!("Unexpected post: {post:?}"),
        Err(e) if e.kind() == TransportErrorKind::HttpStatus => {
            println!("Missing post reported as {:?}", e.status());
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
