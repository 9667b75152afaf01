//! Device spec parsing (`ASR_GPUS` / `TTS_GPUS`, §4.2).

/// A resolved compute device for one engine replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cpu,
    Cuda(u32),
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda(id) => write!(f, "cuda:{id}"),
        }
    }
}

/// Parses a device spec string into the list of devices to construct replicas for.
///
/// - empty or `"auto"` → `[Cuda(0)]` if `cuda_available` else `[Cpu]`
/// - `"cpu"` → `[Cpu]`
/// - comma-separated digits → one replica per listed id; non-numeric entries are logged
///   and skipped rather than failing the whole spec.
#[must_use]
pub fn parse_device_spec(spec: &str, cuda_available: bool) -> Vec<Device> {
    let trimmed = spec.trim();

    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
        return vec![if cuda_available { Device::Cuda(0) } else { Device::Cpu }];
    }

    if trimmed.eq_ignore_ascii_case("cpu") {
        return vec![Device::Cpu];
    }

    let devices: Vec<Device> = trimmed
        .split(',')
        .filter_map(|part| {
            let part = part.trim();
            match part.parse::<u32>() {
                Ok(id) => Some(Device::Cuda(id)),
                Err(_) => {
                    tracing::warn!(device = part, "invalid GPU id in device spec, skipping");
                    None
                }
            }
        })
        .collect();

    if devices.is_empty() { vec![Device::Cpu] } else { devices }
}
