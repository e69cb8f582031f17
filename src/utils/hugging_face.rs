use std::path::PathBuf;

use hf_hub::api::tokio;

/// Download model config and weights from Hugging Face Hub
/// If the files exist in the local cache, they will not be downloaded again
pub async fn download_hf_model(model_name: &str) -> anyhow::Result<(PathBuf, PathBuf)> {
    let api = tokio::Api::new()?;
    let repo = api.model(model_name.to_string());

    let model_filepath = repo.get("model.safetensors").await.map_err(|e| {
        anyhow!(
            "Failed to download model.safetensors for {} from the HuggingFace Hub: {}",
            model_name,
            e
        )
    })?;

    let config_filepath = repo.get("config.json").await.map_err(|e| {
        anyhow!(
            "Failed to download config.json for {} from the HuggingFace Hub: {}",
            model_name,
            e
        )
    })?;

    Ok((config_filepath, model_filepath))
}
