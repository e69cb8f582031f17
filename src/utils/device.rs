use burn::backend::libtorch::LibTorchDevice;

/// Resolve a device spec string (e.g. "cpu", "cuda", "cuda:1", "mps") to a
/// LibTorch device. The device is an explicit configuration value handed to
/// training and inference, never a process-wide default.
pub fn parse_device(spec: &str) -> anyhow::Result<LibTorchDevice> {
    match spec {
        "cpu" => Ok(LibTorchDevice::Cpu),
        "mps" => Ok(LibTorchDevice::Mps),
        "cuda" => Ok(LibTorchDevice::Cuda(0)),
        _ => {
            if let Some(index) = spec.strip_prefix("cuda:") {
                let index = index
                    .parse::<usize>()
                    .map_err(|_| anyhow!("Invalid CUDA device index in '{}'", spec))?;

                return Ok(LibTorchDevice::Cuda(index));
            }

            Err(anyhow!(
                "Unsupported device '{}': expected 'cpu', 'mps', 'cuda', or 'cuda:N'",
                spec
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_known_devices() {
        assert_eq!(parse_device("cpu").unwrap(), LibTorchDevice::Cpu);
        assert_eq!(parse_device("cuda").unwrap(), LibTorchDevice::Cuda(0));
        assert_eq!(parse_device("cuda:2").unwrap(), LibTorchDevice::Cuda(2));
        assert_eq!(parse_device("mps").unwrap(), LibTorchDevice::Mps);
    }

    #[test]
    fn rejects_unknown_devices() {
        assert!(parse_device("tpu").is_err());
        assert!(parse_device("cuda:first").is_err());
        assert!(parse_device("").is_err());
    }
}
