mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn comment_lifecycle() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (author, author_id) = server.register("Ann").await?;
    let (stranger, _) = server.register("Bob").await?;
    let post_id = server.create_post(&author, "Hello", "World").await?;
    let post_comments = server.url(&format!("/api/comments/{}", post_id));

    let res = server
        .client
        .post(&post_comments)
        .bearer_auth(&author)
        .json(&json!({ "content": "First!" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["comment"]["user"]["id"], author_id);
    assert_eq!(body["comment"]["post"], post_id);
    let comment_url = server.url(&format!("/api/comments/{}", body["comment"]["id"].as_str().unwrap_or_default()));

    let body: Value = server.client.get(&post_comments).send().await?.json().await?;
    assert_eq!(body["comments"].as_array().map(Vec::len), Some(1));

    let res = server
        .client
        .put(&comment_url)
        .bearer_auth(&stranger)
        .json(&json!({ "content": "Mine now" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .put(&comment_url)
        .bearer_auth(&author)
        .json(&json!({ "content": "Edited" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["comment"]["content"], "Edited");

    let res = server.client.delete(&comment_url).bearer_auth(&author).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Comment deleted successfully");

    let body: Value = server.client.get(&post_comments).send().await?.json().await?;
    assert_eq!(body["comments"], json!([]));
    Ok(())
}

#[tokio::test]
async fn commenting_on_missing_post_is_not_found() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (token, _) = server.register("Ann").await?;

    let res = server
        .client
        .post(server.url("/api/comments/00000000-0000-0000-0000-000000000000"))
        .bearer_auth(&token)
        .json(&json!({ "content": "Hello?" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Post not found");
    Ok(())
}

#[tokio::test]
async fn deleting_a_post_removes_its_comments() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (token, _) = server.register("Ann").await?;
    let post_id = server.create_post(&token, "Hello", "World").await?;
    let post_comments = server.url(&format!("/api/comments/{}", post_id));

    server
        .client
        .post(&post_comments)
        .bearer_auth(&token)
        .json(&json!({ "content": "soon gone" }))
        .send()
        .await?;

    server
        .client
        .delete(server.url(&format!("/api/posts/{}", post_id)))
        .bearer_auth(&token)
        .send()
        .await?;

    let body: Value = server.client.get(&post_comments).send().await?.json().await?;
    assert_eq!(body["comments"], json!([]));
    Ok(())
}
