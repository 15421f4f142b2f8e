//! Asset file IO and image decoding.
//!
//! Everything here is CPU-only and runs inside tokio tasks, off the render
//! thread. Files resolve relative to the `assets/` directory next to the
//! executable's working directory.

use std::path::PathBuf;

fn asset_path(file_name: &str) -> PathBuf {
    std::path::Path::new("./").join("assets").join(file_name)
}

pub async fn load_string(file_name: &str) -> anyhow::Result<String> {
    let txt = tokio::fs::read_to_string(asset_path(file_name)).await?;
    Ok(txt)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    let data = tokio::fs::read(asset_path(file_name)).await?;
    Ok(data)
}

/// Read and decode an image asset. The decode dominates the cost, which is
/// why callers run this in a spawned task instead of on the event loop.
pub async fn load_image(file_name: &str) -> anyhow::Result<image::DynamicImage> {
    let data = load_binary(file_name).await?;
    let img = image::load_from_memory(&data)?;
    Ok(img)
}
