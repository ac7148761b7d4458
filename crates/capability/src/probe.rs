use synapse_common::Tier;
use wgpu::DeviceType;

/// Renderer-name substrings that mark a software rasterizer.
const SOFTWARE_MARKERS: &[&str] = &["llvmpipe", "swiftshader", "basic render"];

/// Renderer-name substrings that mark a high-end part.
const HIGH_MARKERS: &[&str] = &[
    "rtx", "gtx", "quadro", "radeon rx", "vega", "apple m", "arc a",
];

/// Renderer-name substrings that mark a capable mid-range part.
const MEDIUM_MARKERS: &[&str] = &[
    "iris", "intel xe", "uhd graphics", "adreno 6", "adreno 7", "mali-g",
];

/// Classify an adapter by renderer name and device type.
///
/// String heuristics mirror the usual driver naming: known discrete and
/// recent integrated families rank above the fallback, software
/// rasterizers rank below everything.
pub fn classify(renderer_name: &str, device_type: DeviceType) -> Tier {
    let name = renderer_name.to_ascii_lowercase();

    if device_type == DeviceType::Cpu || SOFTWARE_MARKERS.iter().any(|m| name.contains(m)) {
        return Tier::Low;
    }
    if HIGH_MARKERS.iter().any(|m| name.contains(m)) {
        return Tier::High;
    }
    if device_type == DeviceType::DiscreteGpu {
        // Unrecognized discrete part: assume it can keep up.
        return Tier::High;
    }
    if MEDIUM_MARKERS.iter().any(|m| name.contains(m)) {
        return Tier::Medium;
    }
    Tier::Low
}

/// Probe the host GPU tier using a throwaway instance.
///
/// Never fails: no adapter means `Tier::Low`. The instance, and with it the
/// graphics context, is dropped before returning.
pub fn probe() -> Tier {
    probe_with_backends(wgpu::Backends::all())
}

/// Probe restricted to the given backends. `Backends::empty()` exercises the
/// no-adapter path deterministically.
pub fn probe_with_backends(backends: wgpu::Backends) -> Tier {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends,
        ..Default::default()
    });

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }));

    match adapter {
        Some(adapter) => {
            let info = adapter.get_info();
            let tier = classify(&info.name, info.device_type);
            tracing::info!(
                adapter = %info.name,
                backend = %info.backend.to_str(),
                %tier,
                "capability probe"
            );
            tier
        }
        None => {
            tracing::info!("capability probe: no usable adapter, defaulting to low");
            Tier::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn software_rasterizers_are_low() {
        assert_eq!(classify("llvmpipe (LLVM 15.0.7)", DeviceType::Cpu), Tier::Low);
        assert_eq!(
            classify("SwiftShader Device", DeviceType::VirtualGpu),
            Tier::Low
        );
        assert_eq!(
            classify("Microsoft Basic Render Driver", DeviceType::Other),
            Tier::Low
        );
    }

    #[test]
    fn discrete_families_are_high() {
        assert_eq!(
            classify("NVIDIA GeForce RTX 3070", DeviceType::DiscreteGpu),
            Tier::High
        );
        assert_eq!(
            classify("AMD Radeon RX 6800 XT", DeviceType::DiscreteGpu),
            Tier::High
        );
        assert_eq!(
            classify("Apple M2 Pro", DeviceType::IntegratedGpu),
            Tier::High
        );
    }

    #[test]
    fn unknown_discrete_is_high() {
        assert_eq!(
            classify("Mystery Graphics 9000", DeviceType::DiscreteGpu),
            Tier::High
        );
    }

    #[test]
    fn integrated_families_are_medium() {
        assert_eq!(
            classify("Intel(R) Iris(R) Xe Graphics", DeviceType::IntegratedGpu),
            Tier::Medium
        );
        assert_eq!(
            classify("Adreno 660", DeviceType::IntegratedGpu),
            Tier::Medium
        );
    }

    #[test]
    fn unknown_integrated_is_low() {
        assert_eq!(
            classify("Some Old iGPU", DeviceType::IntegratedGpu),
            Tier::Low
        );
    }

    #[test]
    fn cpu_device_type_overrides_name() {
        assert_eq!(
            classify("NVIDIA GeForce RTX 3070", DeviceType::Cpu),
            Tier::Low
        );
    }

    #[test]
    fn probe_without_backends_returns_low() {
        // No backend means no adapter; must not panic.
        assert_eq!(probe_with_backends(wgpu::Backends::empty()), Tier::Low);
    }
}
