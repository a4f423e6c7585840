//! Serve one request through the worker.

use anyhow::{anyhow, Context as _, Result};
use serde_json::json;
use shelf_core::{Method, Request, RequestDestination};

use super::FetchArgs;
use crate::context::Context;
use crate::output::{format_bytes, status_badge};

/// Run the fetch command.
pub async fn run(args: FetchArgs, ctx: &Context) -> Result<()> {
    let scope = &ctx.config.worker.scope;
    let url = scope
        .join(&args.url)
        .with_context(|| format!("Invalid URL: {}", args.url))?;
    let method = Method::from_bytes(args.method.to_uppercase().as_bytes())
        .with_context(|| format!("Invalid method: {}", args.method))?;

    let mut request = if args.navigate {
        Request::navigate(url)
    } else {
        Request::get(url)
    };
    request = request.with_method(method);
    if let Some(name) = &args.destination {
        let destination = RequestDestination::parse(name)
            .ok_or_else(|| anyhow!("Unknown destination: {}", name))?;
        request = request.with_destination(destination);
    }

    let worker = ctx.worker(ctx.config.worker.clone(), ctx.network(args.offline));
    ctx.output.debug(&format!("{} via {:?}", request, worker));

    let served = worker.handle_fetch(&request).await?;
    worker.settle().await;

    let response = &served.response;
    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "url": request.url().as_str(),
            "status": response.status().as_u16(),
            "source": served.source.to_string(),
            "content_type": response.content_type(),
            "bytes": response.body().len(),
        }));
        return Ok(());
    }

    ctx.output.header(&request.to_string());
    ctx.output.kv("status", response.status().as_str());
    ctx.output
        .kv("source", &status_badge(&served.source.to_string()));
    if let Some(content_type) = response.content_type() {
        ctx.output.kv("content-type", content_type);
    }
    ctx.output
        .kv("size", &format_bytes(response.body().len() as u64));

    if args.body {
        match response.text() {
            Ok(text) => println!("\n{}", text),
            Err(_) => ctx.output.warn("Body is not valid UTF-8"),
        }
    }

    Ok(())
}
